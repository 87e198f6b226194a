//! In-memory inventory tree.

use std::collections::HashMap;
use thiserror::Error;

use super::models::*;

/// Inventory mutation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InventoryError {
    #[error("resource {0} is already in inventory")]
    Duplicate(ResourceId),
    #[error("parent {parent} of resource {id} is not in inventory")]
    UnknownParent { id: ResourceId, parent: ResourceId },
    #[error("resource {0} has no parent and the platform is already set")]
    MissingParent(ResourceId),
    #[error("resource {0} not found")]
    NotFound(ResourceId),
    #[error("the platform cannot be removed")]
    PlatformRemoval,
}

/// Resource tree rooted at the platform.
///
/// Parents must be inserted before their children, so the tree stays
/// acyclic and every non-root node has exactly one parent.
#[derive(Debug)]
pub struct ResourceTree {
    root: ResourceId,
    nodes: HashMap<ResourceId, ResourceNode>,
    children: HashMap<ResourceId, Vec<ResourceId>>,
}

impl ResourceTree {
    /// Create a tree holding only the platform.
    pub fn new(mut platform: ResourceNode) -> Self {
        platform.parent = None;
        platform.category = ResourceCategory::Platform;

        let root = platform.id;
        let mut nodes = HashMap::new();
        nodes.insert(root, platform);

        Self {
            root,
            nodes,
            children: HashMap::new(),
        }
    }

    pub fn root(&self) -> ResourceId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: the platform is always present.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ResourceId) -> Option<&ResourceNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut ResourceNode> {
        self.nodes.get_mut(&id)
    }

    /// Children of a node in insertion order.
    pub fn children(&self, id: ResourceId) -> &[ResourceId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Add a node under an existing parent.
    pub fn insert(&mut self, node: ResourceNode) -> Result<(), InventoryError> {
        if self.nodes.contains_key(&node.id) {
            return Err(InventoryError::Duplicate(node.id));
        }

        let parent = node.parent.ok_or(InventoryError::MissingParent(node.id))?;
        if !self.nodes.contains_key(&parent) {
            return Err(InventoryError::UnknownParent { id: node.id, parent });
        }

        self.children.entry(parent).or_default().push(node.id);
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Remove a node and its whole subtree, returning the removed nodes.
    pub fn remove(&mut self, id: ResourceId) -> Result<Vec<ResourceNode>, InventoryError> {
        if id == self.root {
            return Err(InventoryError::PlatformRemoval);
        }
        let parent = self
            .nodes
            .get(&id)
            .ok_or(InventoryError::NotFound(id))?
            .parent;

        if let Some(siblings) = parent.and_then(|p| self.children.get_mut(&p)) {
            siblings.retain(|c| *c != id);
        }

        let mut removed = Vec::new();
        for subtree_id in self.subtree(id) {
            self.children.remove(&subtree_id);
            if let Some(node) = self.nodes.remove(&subtree_id) {
                removed.push(node);
            }
        }
        Ok(removed)
    }

    /// All ids, parents before children.
    pub fn pre_order(&self) -> Vec<ResourceId> {
        self.subtree(self.root)
    }

    /// Ids of the subtree rooted at `id`, parents before children.
    pub fn subtree(&self, id: ResourceId) -> Vec<ResourceId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.nodes.contains_key(&next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Set the next check time of a node.
    pub fn set_next_check_time(&mut self, id: ResourceId, at: Option<i64>) -> Result<(), InventoryError> {
        self.get_mut(id).ok_or(InventoryError::NotFound(id))?.next_check_time = at;
        Ok(())
    }

    /// Enable or disable a node's own availability check.
    pub fn set_check_enabled(&mut self, id: ResourceId, enabled: bool) -> Result<(), InventoryError> {
        let node = self.get_mut(id).ok_or(InventoryError::NotFound(id))?;
        node.check_enabled = enabled;
        if !enabled {
            node.next_check_time = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::ScriptedProvider;
    use std::sync::Arc;

    fn tree() -> ResourceTree {
        let provider = Arc::new(ScriptedProvider::up());
        let mut tree = ResourceTree::new(ResourceNode::platform(1, "platform", provider.clone()));
        tree.insert(ResourceNode::child(10, "server", 1, ResourceCategory::Server, provider.clone()))
            .unwrap();
        tree.insert(ResourceNode::child(100, "service-a", 10, ResourceCategory::Service, provider.clone()))
            .unwrap();
        tree.insert(ResourceNode::child(101, "service-b", 10, ResourceCategory::Service, provider.clone()))
            .unwrap();
        tree.insert(ResourceNode::child(20, "other", 1, ResourceCategory::Server, provider))
            .unwrap();
        tree
    }

    #[test]
    fn test_pre_order_visits_parents_first() {
        let tree = tree();
        assert_eq!(tree.pre_order(), vec![1, 10, 100, 101, 20]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_insert_rejects_bad_parents() {
        let mut tree = tree();
        let provider = Arc::new(ScriptedProvider::up());

        let orphan = ResourceNode::child(30, "orphan", 99, ResourceCategory::Server, provider.clone());
        assert_eq!(
            tree.insert(orphan),
            Err(InventoryError::UnknownParent { id: 30, parent: 99 })
        );

        let dup = ResourceNode::child(10, "dup", 1, ResourceCategory::Server, provider.clone());
        assert_eq!(tree.insert(dup), Err(InventoryError::Duplicate(10)));

        let second_root = ResourceNode::platform(2, "another", provider);
        assert_eq!(tree.insert(second_root), Err(InventoryError::MissingParent(2)));
    }

    #[test]
    fn test_remove_takes_subtree() {
        let mut tree = tree();
        let removed = tree.remove(10).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(tree.pre_order(), vec![1, 20]);
        assert!(tree.children(1).iter().all(|c| *c != 10));

        assert_eq!(tree.remove(1).unwrap_err(), InventoryError::PlatformRemoval);
        assert_eq!(tree.remove(10).unwrap_err(), InventoryError::NotFound(10));
    }

    #[test]
    fn test_disabling_clears_schedule() {
        let mut tree = tree();
        tree.set_next_check_time(100, Some(5_000)).unwrap();
        tree.set_check_enabled(100, false).unwrap();

        let node = tree.get(100).unwrap();
        assert!(!node.check_enabled);
        assert_eq!(node.next_check_time, None);
    }

    #[test]
    fn test_reset_forgets_state() {
        let mut tree = tree();
        tree.set_next_check_time(100, Some(5_000)).unwrap();
        let node = tree.get_mut(100).unwrap();
        node.availability = Some(AvailabilityType::Down);
        assert!(!node.is_due(0));

        node.reset();
        assert_eq!(node.availability, None);
        assert_eq!(node.next_check_time, None);
        assert!(node.is_due(0));
    }
}
