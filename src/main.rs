//! availscan - availability scanning agent
//!
//! Runs periodic availability scans over a demo inventory and logs the
//! reports that would be handed to the server transport.

use availscan::{
    AvailabilityExecutor, AvailabilityProvider, AvailabilityScheduler, AvailabilityType, ProviderError,
    ResourceCategory, ResourceId, ResourceNode, ResourceTree, SchedulerConfig,
};

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated resource that is usually up.
struct SimulatedProvider {
    up_ratio: f64,
}

#[async_trait]
impl AvailabilityProvider for SimulatedProvider {
    async fn get_availability(&self, _resource_id: ResourceId) -> Result<AvailabilityType, ProviderError> {
        let latency = rand::thread_rng().gen_range(1..50);
        tokio::time::sleep(Duration::from_millis(latency)).await;

        let roll: f64 = rand::random();
        if roll < self.up_ratio {
            Ok(AvailabilityType::Up)
        } else if roll < self.up_ratio + (1.0 - self.up_ratio) / 2.0 {
            Ok(AvailabilityType::Down)
        } else {
            Err(ProviderError::Failed("simulated failure".to_string()))
        }
    }
}

fn demo_inventory() -> Result<ResourceTree, availscan::InventoryError> {
    let provider = |up_ratio| -> Arc<dyn AvailabilityProvider> { Arc::new(SimulatedProvider { up_ratio }) };

    let mut tree = ResourceTree::new(ResourceNode::platform(1, "localhost", provider(1.0)));
    for s in 0..3 {
        let server = 10 + s;
        tree.insert(ResourceNode::child(
            server,
            &format!("app-server-{}", s),
            1,
            ResourceCategory::Server,
            provider(0.9),
        ))?;

        for d in 0..4 {
            tree.insert(ResourceNode::child(
                server * 10 + d,
                &format!("datasource-{}-{}", s, d),
                server,
                ResourceCategory::Service,
                provider(0.95),
            ))?;
        }
    }
    Ok(tree)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("availscan=info".parse()?))
        .init();

    // Load configuration
    let cfg = SchedulerConfig::load();
    tracing::info!("Starting availability agent {}...", cfg.agent_name);

    let tree = demo_inventory()?;
    tracing::info!("Inventory holds {} resources", tree.len());

    let executor = Arc::new(AvailabilityExecutor::new(Arc::new(Mutex::new(tree)), cfg.clone()));

    // Stand-in for the server transport
    let (report_tx, mut report_rx) = mpsc::channel(16);
    tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            match serde_json::to_string(&report) {
                Ok(json) => tracing::info!("Sending availability report: {}", json),
                Err(e) => tracing::error!("Failed to encode availability report: {}", e),
            }
        }
    });

    let scheduler = AvailabilityScheduler::new(executor, &cfg, report_tx);
    scheduler.start().await?;

    tokio::signal::ctrl_c().await?;
    scheduler.stop().await;

    Ok(())
}
