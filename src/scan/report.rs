//! Availability reports handed to the transport.

use serde::{Deserialize, Serialize};

use super::record::Scan;
use crate::inventory::{AvailabilityType, ResourceId, ResourceTree};

/// Availability of one resource in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datum {
    pub resource_id: ResourceId,
    pub availability_type: AvailabilityType,
}

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    agent_name: String,
    changes_only: bool,
    data: Vec<Datum>,
}

impl AvailabilityReport {
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn is_changes_only(&self) -> bool {
        self.changes_only
    }

    pub fn data(&self) -> &[Datum] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Availability reported for a resource, if present.
    pub fn availability_of(&self, id: ResourceId) -> Option<AvailabilityType> {
        self.data
            .iter()
            .find(|d| d.resource_id == id)
            .map(|d| d.availability_type)
    }
}

/// Builds reports from scan results.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    agent_name: String,
}

impl ReportAssembler {
    pub fn new(agent_name: &str) -> Self {
        Self {
            agent_name: agent_name.to_string(),
        }
    }

    /// A full scan lists every resource in the tree, parents first;
    /// otherwise only `changed` is reported.
    pub fn assemble(&self, scan: &Scan, tree: &ResourceTree, changed: Vec<Datum>) -> AvailabilityReport {
        let data = if scan.is_full() {
            tree.pre_order()
                .into_iter()
                .filter_map(|id| tree.get(id))
                .map(|node| Datum {
                    resource_id: node.id,
                    availability_type: node.availability.unwrap_or(AvailabilityType::Unknown),
                })
                .collect()
        } else {
            changed
        };

        AvailabilityReport {
            agent_name: self.agent_name.clone(),
            changes_only: !scan.is_full(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{ResourceCategory, ResourceNode};
    use crate::provider::testing::ScriptedProvider;
    use crate::scan::ScanStats;
    use std::sync::Arc;

    fn tree() -> ResourceTree {
        let provider = Arc::new(ScriptedProvider::up());
        let mut platform = ResourceNode::platform(1, "platform", provider.clone());
        platform.availability = Some(AvailabilityType::Up);
        let mut tree = ResourceTree::new(platform);

        let mut server = ResourceNode::child(2, "server", 1, ResourceCategory::Server, provider.clone());
        server.availability = Some(AvailabilityType::Down);
        tree.insert(server).unwrap();
        tree.insert(ResourceNode::child(3, "fresh", 2, ResourceCategory::Service, provider))
            .unwrap();
        tree
    }

    #[test]
    fn test_full_report_lists_every_resource() {
        let scan = ScanStats::new(false, true, 0).finish(0);
        let report = ReportAssembler::new("agent").assemble(&scan, &tree(), Vec::new());

        assert!(!report.is_changes_only());
        assert_eq!(report.agent_name(), "agent");
        assert_eq!(report.len(), 3);
        assert_eq!(report.data()[0].resource_id, 1);
        assert_eq!(report.availability_of(2), Some(AvailabilityType::Down));
        assert_eq!(report.availability_of(3), Some(AvailabilityType::Unknown));
    }

    #[test]
    fn test_changes_only_report_uses_changed_set() {
        let scan = ScanStats::new(false, false, 0).finish(0);
        let changed = vec![Datum {
            resource_id: 2,
            availability_type: AvailabilityType::Down,
        }];
        let report = ReportAssembler::new("agent").assemble(&scan, &tree(), changed);

        assert!(report.is_changes_only());
        assert_eq!(report.len(), 1);
        assert_eq!(report.availability_of(1), None);
    }

    #[test]
    fn test_report_json_shape() {
        let scan = ScanStats::new(false, false, 0).finish(0);
        let changed = vec![Datum {
            resource_id: 2,
            availability_type: AvailabilityType::Up,
        }];
        let report = ReportAssembler::new("agent").assemble(&scan, &tree(), changed);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["changes_only"], true);
        assert_eq!(json["data"][0]["availability_type"], "UP");
    }
}
