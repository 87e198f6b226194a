//! Per-node scan decisions.

use crate::inventory::{AvailabilityType, ResourceNode};

/// Why a node's provider is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckReason {
    /// The platform is checked on every scan.
    Platform,
    /// The node's own schedule fired.
    Due,
    /// The parent just came UP, so assumptions about the child are stale.
    ParentCameUp,
    /// Forced scan while the node was not due.
    Forced,
}

impl CheckReason {
    /// Whether the check consumes the node's schedule and reschedules it.
    pub fn reschedules(self) -> bool {
        matches!(self, CheckReason::Due | CheckReason::ParentCameUp)
    }
}

/// What a scan does with one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Check(CheckReason),
    /// Parent resolved DOWN; the node is DOWN too.
    DeferUp,
    /// Own check disabled; the node takes the parent's availability.
    DeferDisabled,
    /// Not due; left untouched.
    Skip,
}

/// Outcome of a parent, carried down the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentOutcome {
    /// Availability the parent resolved to in this scan.
    pub availability: AvailabilityType,
    /// The parent went from not-UP to UP in this scan.
    pub came_up: bool,
}

/// Decides each node's action, parents before children.
#[derive(Debug, Clone, Copy)]
pub struct ScanPlanner {
    forced: bool,
}

impl ScanPlanner {
    pub fn new(forced: bool) -> Self {
        Self { forced }
    }

    /// Decide the action for `node` given its parent's outcome
    /// (None for the platform).
    pub fn decide(&self, node: &ResourceNode, parent: Option<&ParentOutcome>, now: i64) -> Action {
        let Some(parent) = parent else {
            return Action::Check(CheckReason::Platform);
        };

        // Children are never more available than a down parent, enabled or not.
        if parent.availability == AvailabilityType::Down {
            return Action::DeferUp;
        }
        if !node.check_enabled {
            return Action::DeferDisabled;
        }
        if node.is_due(now) {
            return Action::Check(CheckReason::Due);
        }
        if parent.came_up {
            return Action::Check(CheckReason::ParentCameUp);
        }
        if self.forced {
            return Action::Check(CheckReason::Forced);
        }
        Action::Skip
    }
}

/// Availability a deferred node inherits.
pub fn inherited_availability(action: Action, parent: &ParentOutcome) -> Option<AvailabilityType> {
    match action {
        Action::DeferUp => Some(AvailabilityType::Down),
        Action::DeferDisabled => Some(parent.availability),
        Action::Check(_) | Action::Skip => None,
    }
}
