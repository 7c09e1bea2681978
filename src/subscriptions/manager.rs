//! Adaptive registration of field observers against a possibly-incomplete
//! status tree.

use crate::error::{Result, WatchError};
use crate::privacy::PrivacySettings;
use crate::status::{StatusField, StatusTree};
use crate::types::{ObserverCallback, ObserverEvent, ObserverId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::plan::{FieldChange, FieldSpec, SubscriptionPlan, UnitSpec};

/// Registration state of one declared unit.
struct UnitState {
    spec: UnitSpec,
    /// True once every observer for this unit has been attached.
    registered: bool,
    /// Configuration defect hit by the last attach attempt, if any.
    defect: Option<WatchError>,
}

/// Mutable manager state, serialized behind one lock.
struct ManagerState {
    units: Vec<UnitState>,
    /// The coarse tree observer, while any unit is pending.
    coarse: Option<ObserverId>,
    /// Every field observer this manager ever attached, for teardown.
    attached: Vec<(Arc<StatusField>, ObserverId)>,
    shut_down: bool,
}

struct ManagerInner {
    tree: Arc<StatusTree>,
    privacy: PrivacySettings,
    state: Mutex<ManagerState>,
}

/// Registers per-field observers as soon as the relevant sub-trees are
/// populated, deferring behind a single coarse tree observer otherwise.
///
/// Each declared unit progresses independently: pending units re-check on
/// every tree-wide update, newly ready units attach their observers, and
/// the coarse observer is removed exactly once when nothing remains
/// pending. A unit never reverts to pending once registered, even if a
/// field later reports disabled.
pub struct AdaptiveSubscriptionManager {
    inner: Arc<ManagerInner>,
}

impl AdaptiveSubscriptionManager {
    /// Build a manager and run the initial registration pass.
    ///
    /// Units whose sub-trees are already populated get their observers
    /// attached immediately; if anything is left pending, one coarse
    /// observer is installed on the tree. A declared field that is
    /// structurally absent from an enabled group is a configuration
    /// defect and fails construction.
    pub fn new(
        tree: Arc<StatusTree>,
        plan: SubscriptionPlan,
        privacy: PrivacySettings,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for unit in &plan.units {
            if !seen.insert(unit.name.clone()) {
                return Err(WatchError::DuplicateUnit(unit.name.clone()));
            }
        }

        let inner = Arc::new(ManagerInner {
            tree,
            privacy,
            state: Mutex::new(ManagerState {
                units: plan
                    .units
                    .into_iter()
                    .map(|spec| UnitState {
                        spec,
                        registered: false,
                        defect: None,
                    })
                    .collect(),
                coarse: None,
                attached: Vec::new(),
                shut_down: false,
            }),
        });

        {
            let mut state = inner.state.lock();

            for idx in 0..state.units.len() {
                let spec = state.units[idx].spec.clone();
                if !ManagerInner::unit_ready(&inner.tree, &spec) {
                    debug!(unit = %spec.name, "status not yet available; deferring registration");
                    continue;
                }

                if let Err(err) = inner.attach_unit(&spec, &mut state) {
                    // Undo everything before surfacing the defect.
                    for (field, id) in state.attached.drain(..) {
                        field.remove_observer(id);
                    }
                    return Err(err);
                }
                state.units[idx].registered = true;
                debug!(unit = %spec.name, "observers registered at construction");
            }

            let pending = state.units.iter().filter(|u| !u.registered).count();
            if pending > 0 {
                let weak = Arc::downgrade(&inner);
                let callback: ObserverCallback = Arc::new(move |_, _| {
                    if let Some(inner) = weak.upgrade() {
                        inner.recheck_pending();
                    }
                });
                let id = inner
                    .tree
                    .add_observer(callback, ObserverEvent::UPDATED_FROM_SERVER);
                state.coarse = Some(id);
                debug!(pending, "watching tree updates for deferred units");
            }
        }

        Ok(Self { inner })
    }

    /// Whether the named unit has all its observers attached.
    pub fn is_registered(&self, unit: &str) -> bool {
        self.inner
            .state
            .lock()
            .units
            .iter()
            .any(|u| u.spec.name == unit && u.registered)
    }

    /// Names of units still waiting for their sub-trees.
    pub fn pending_units(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .units
            .iter()
            .filter(|u| !u.registered)
            .map(|u| u.spec.name.clone())
            .collect()
    }

    /// Whether every declared unit is registered.
    pub fn all_registered(&self) -> bool {
        self.inner.state.lock().units.iter().all(|u| u.registered)
    }

    /// Whether the coarse tree observer is currently installed.
    pub fn watching_tree(&self) -> bool {
        self.inner.state.lock().coarse.is_some()
    }

    /// Configuration defects hit while attaching pending units, by unit
    /// name.
    ///
    /// Distinguishes a unit held back by a schema defect from one whose
    /// data simply has not arrived yet. A defective unit stays pending
    /// and is retried on later tree updates; the entry clears if a retry
    /// succeeds.
    pub fn schema_errors(&self) -> Vec<(String, WatchError)> {
        self.inner
            .state
            .lock()
            .units
            .iter()
            .filter_map(|u| u.defect.clone().map(|err| (u.spec.name.clone(), err)))
            .collect()
    }

    /// Detach every observer this manager ever attached.
    ///
    /// Idempotent; also runs on drop.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl Drop for AdaptiveSubscriptionManager {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

impl ManagerInner {
    /// Whether a unit's sub-trees are populated enough to attach.
    ///
    /// Every group the unit references must be present and enabled, and
    /// every required field present and enabled. A missing group or field
    /// here is the normal pending condition, not an error.
    fn unit_ready(tree: &StatusTree, unit: &UnitSpec) -> bool {
        for spec in &unit.fields {
            let group = match tree.group(&spec.path.domain, &spec.path.group) {
                Some(group) => group,
                None => return false,
            };
            if !group.enabled() {
                return false;
            }
            if spec.required {
                match group.field(&spec.path.field) {
                    Some(field) if field.enabled() => {}
                    _ => return false,
                }
            }
        }
        true
    }

    /// Attach observers for every declared field of a ready unit.
    ///
    /// All-or-nothing: on a structurally absent field the observers
    /// already attached for this unit are rolled back and the defect is
    /// returned. Privacy-suppressed fields are skipped without affecting
    /// the rest of the unit.
    fn attach_unit(&self, unit: &UnitSpec, state: &mut ManagerState) -> Result<()> {
        let mut attached: Vec<(Arc<StatusField>, ObserverId)> = Vec::with_capacity(unit.fields.len());

        for spec in &unit.fields {
            if let Some(flag) = spec.privacy {
                if self.privacy.contains(&flag) {
                    info!(
                        unit = %unit.name,
                        field = %spec.path,
                        restriction = %flag,
                        "privacy restriction active; observer not attached"
                    );
                    continue;
                }
            }

            let field = match self
                .tree
                .group(&spec.path.domain, &spec.path.group)
                .and_then(|group| group.field(&spec.path.field))
            {
                Some(field) => field,
                None => {
                    for (field, id) in attached {
                        field.remove_observer(id);
                    }
                    return Err(WatchError::FieldNotInSchema {
                        group: spec.path.group.clone(),
                        field: spec.path.field.clone(),
                    });
                }
            };

            let id = field.add_observer(Self::field_callback(unit, spec), spec.events);
            attached.push((field, id));
        }

        state.attached.extend(attached);
        Ok(())
    }

    /// Wrap a unit's handler into an observer callback carrying the
    /// declared unit and path.
    fn field_callback(unit: &UnitSpec, spec: &FieldSpec) -> ObserverCallback {
        let handler = spec.handler.clone();
        let unit_name = unit.name.clone();
        let path = spec.path.clone();
        Arc::new(move |_, change| {
            handler.invoke(&FieldChange {
                unit: unit_name.clone(),
                path: path.clone(),
                previous: change.previous.clone(),
                current: change.current.clone(),
            });
        })
    }

    /// Coarse-event pass: re-check every pending unit, attach the newly
    /// ready ones, and drop the coarse observer once nothing is pending.
    fn recheck_pending(&self) {
        let mut state = self.state.lock();
        if state.shut_down || state.coarse.is_none() {
            return;
        }

        // Snapshot before mutating: attaching observers below must not
        // affect which units this pass considers.
        let pending: Vec<usize> = state
            .units
            .iter()
            .enumerate()
            .filter(|(_, u)| !u.registered)
            .map(|(idx, _)| idx)
            .collect();

        for idx in pending {
            let spec = state.units[idx].spec.clone();
            if !Self::unit_ready(&self.tree, &spec) {
                continue;
            }

            match self.attach_unit(&spec, &mut state) {
                Ok(()) => {
                    state.units[idx].registered = true;
                    state.units[idx].defect = None;
                    debug!(unit = %spec.name, "observers registered after tree update");
                }
                Err(err) => {
                    // A schema defect surfacing this late has no caller to
                    // fail; stay pending, record the defect for
                    // `schema_errors`, and retry on later updates in case
                    // the schema materializes the field.
                    error!(unit = %spec.name, %err, "cannot attach observers");
                    state.units[idx].defect = Some(err);
                }
            }
        }

        if state.units.iter().all(|u| u.registered) {
            let id = state.coarse.take().expect("coarse observer present");
            let removed = self.tree.remove_observer(id);
            assert!(removed, "coarse observer missing from tree during removal");
            debug!("all units registered; coarse observer removed");
        }
    }

    fn shutdown(&self) {
        let mut state = self.state.lock();
        if state.shut_down {
            return;
        }
        state.shut_down = true;

        for (field, id) in state.attached.drain(..) {
            field.remove_observer(id);
        }
        if let Some(id) = state.coarse.take() {
            let removed = self.tree.remove_observer(id);
            assert!(removed, "coarse observer missing from tree during shutdown");
        }
        debug!("subscription manager shut down");
    }
}
