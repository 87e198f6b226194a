//! Test inventory: a platform with four servers, each with two child
//! services, each with two grandchild services (29 resources).

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::AvailabilityExecutor;
use crate::clock::FakeClock;
use crate::config::SchedulerConfig;
use crate::inventory::{ResourceCategory, ResourceId, ResourceNode, ResourceTree};
use crate::provider::testing::ScriptedProvider;

pub struct Fixture {
    pub tree: Arc<Mutex<ResourceTree>>,
    pub clock: FakeClock,
    pub platform: ResourceId,
    pub parents1: Vec<ResourceId>,
    pub parents2: Vec<ResourceId>,
    pub children1: Vec<ResourceId>,
    pub children2: Vec<ResourceId>,
    pub grandchildren1: Vec<ResourceId>,
    pub grandchildren2: Vec<ResourceId>,
    providers: HashMap<ResourceId, Arc<ScriptedProvider>>,
}

impl Fixture {
    pub fn new() -> Self {
        let mut providers = HashMap::new();
        let mut provider_for = |id: ResourceId| {
            let provider = Arc::new(ScriptedProvider::up());
            providers.insert(id, provider.clone());
            provider
        };

        let platform = 1;
        let mut tree = ResourceTree::new(ResourceNode::platform(platform, "platform", provider_for(platform)));

        let mut fx_ids: [Vec<ResourceId>; 6] = Default::default();
        for p in 0..4 {
            // "1" resources live under the first two servers.
            let set = if p < 2 { 0 } else { 1 };
            let parent = 10 + p;
            let node = ResourceNode::child(
                parent,
                &format!("server-{}", parent),
                platform,
                ResourceCategory::Server,
                provider_for(parent),
            );
            tree.insert(node).unwrap();
            fx_ids[set].push(parent);

            for c in 0..2 {
                let child = parent * 10 + c;
                let node = ResourceNode::child(
                    child,
                    &format!("service-{}", child),
                    parent,
                    ResourceCategory::Service,
                    provider_for(child),
                );
                tree.insert(node).unwrap();
                fx_ids[2 + set].push(child);

                for g in 0..2 {
                    let grandchild = child * 10 + g;
                    let node = ResourceNode::child(
                        grandchild,
                        &format!("service-{}", grandchild),
                        child,
                        ResourceCategory::Service,
                        provider_for(grandchild),
                    );
                    tree.insert(node).unwrap();
                    fx_ids[4 + set].push(grandchild);
                }
            }
        }
        assert_eq!(tree.len(), 29);

        let [parents1, parents2, children1, children2, grandchildren1, grandchildren2] = fx_ids;
        Self {
            tree: Arc::new(Mutex::new(tree)),
            clock: FakeClock::new(1_700_000_000_000),
            platform,
            parents1,
            parents2,
            children1,
            children2,
            grandchildren1,
            grandchildren2,
            providers,
        }
    }

    pub fn executor(&self) -> AvailabilityExecutor {
        self.executor_with(SchedulerConfig::default())
    }

    pub fn executor_with(&self, config: SchedulerConfig) -> AvailabilityExecutor {
        AvailabilityExecutor::with_clock(self.tree.clone(), config, Arc::new(self.clock.clone()))
    }

    pub fn provider(&self, id: ResourceId) -> &ScriptedProvider {
        &self.providers[&id]
    }

    pub async fn schedule(&self, ids: &[ResourceId], at: i64) {
        let mut tree = self.tree.lock().await;
        for id in ids {
            tree.set_next_check_time(*id, Some(at)).unwrap();
        }
    }

    pub fn everything_but_parents1(&self) -> Vec<ResourceId> {
        let mut ids = self.children1.clone();
        ids.extend(&self.grandchildren1);
        ids.extend(&self.parents2);
        ids.extend(&self.children2);
        ids.extend(&self.grandchildren2);
        ids
    }
}
