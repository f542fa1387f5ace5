// ABOUTME: Periodic cleanup of stale node information in the monitoring store
// ABOUTME: Logs failures with monitoring diagnostics tags instead of propagating them

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

use super::{Job, MonitoringService};

pub struct NodeInformationCleanupJob<M: MonitoringService> {
    monitoring: Arc<M>,
}

impl<M: MonitoringService> NodeInformationCleanupJob<M> {
    pub fn new(monitoring: Arc<M>) -> Self {
        Self { monitoring }
    }
}

#[async_trait]
impl<M: MonitoringService> Job for NodeInformationCleanupJob<M> {
    fn name(&self) -> &'static str {
        "NodeInformationCleanupJob"
    }

    fn description(&self) -> &'static str {
        "Cleans up information of nodes that have been offline for a long time."
    }

    async fn run(&self) {
        debug!("Running {}: {}", self.name(), self.description());

        if let Err(e) = self.monitoring.cleanup_node_information().await {
            error!(
                component = "monitoring",
                subcomponent = "information-cleanup",
                "Error cleaning up node data: {}",
                e
            );
        }
    }
}
