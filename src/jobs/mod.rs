// ABOUTME: Background jobs run alongside the mail renderer
// ABOUTME: Defines the job and monitoring service traits and exports concrete jobs

pub mod cleanup;

use async_trait::async_trait;

pub use cleanup::NodeInformationCleanupJob;

/// Monitoring backend operations the jobs depend on
#[async_trait]
pub trait MonitoringService: Send + Sync {
    /// Drop stored information about nodes that have not been seen for a long time
    async fn cleanup_node_information(&self) -> anyhow::Result<()>;
}

/// A scheduled unit of work. Jobs report their own failures and always complete.
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    async fn run(&self);
}
