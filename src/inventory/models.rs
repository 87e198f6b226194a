//! Inventory model types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::provider::AvailabilityProvider;

pub type ResourceId = i64;

/// Measured or inherited availability of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AvailabilityType {
    Up,
    Down,
    Unknown,
}

impl fmt::Display for AvailabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityType::Up => write!(f, "UP"),
            AvailabilityType::Down => write!(f, "DOWN"),
            AvailabilityType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Resource category, which selects the reschedule jitter window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Platform,
    Server,
    Service,
}

/// A node of the inventory tree.
#[derive(Clone)]
pub struct ResourceNode {
    pub id: ResourceId,
    pub name: String,
    /// None only for the platform.
    pub parent: Option<ResourceId>,
    pub category: ResourceCategory,
    /// None until the first resolution.
    pub availability: Option<AvailabilityType>,
    /// Epoch millis after which the node is due for its own check.
    pub next_check_time: Option<i64>,
    pub check_enabled: bool,
    pub provider: Arc<dyn AvailabilityProvider>,
}

impl ResourceNode {
    /// Create the root platform node.
    pub fn platform(id: ResourceId, name: &str, provider: Arc<dyn AvailabilityProvider>) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent: None,
            category: ResourceCategory::Platform,
            availability: None,
            next_check_time: None,
            check_enabled: true,
            provider,
        }
    }

    /// Create a never-checked child node.
    pub fn child(
        id: ResourceId,
        name: &str,
        parent: ResourceId,
        category: ResourceCategory,
        provider: Arc<dyn AvailabilityProvider>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent: Some(parent),
            category,
            availability: None,
            next_check_time: None,
            check_enabled: true,
            provider,
        }
    }

    /// Whether the node's own schedule has fired. A node never scheduled is due.
    pub fn is_due(&self, now: i64) -> bool {
        match self.next_check_time {
            Some(at) => at <= now,
            None => true,
        }
    }

    /// Forget the node's availability and schedule, as if newly inventoried.
    pub fn reset(&mut self) {
        self.availability = None;
        self.next_check_time = None;
    }
}

impl fmt::Debug for ResourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("category", &self.category)
            .field("availability", &self.availability)
            .field("next_check_time", &self.next_check_time)
            .field("check_enabled", &self.check_enabled)
            .finish_non_exhaustive()
    }
}
