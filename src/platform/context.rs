//! Shared, cloneable handle to the orchestrator and its configuration,
//! passed to every spawned service.

use std::sync::Arc;

use crate::orchestrator::PatentOrchestrator;
use crate::platform::config::PatentflowConfig;
use crate::platform::shutdown::ShutdownSignal;

#[derive(Clone)]
pub struct PlatformContext {
    shared: Arc<SharedState>,
    shutdown: ShutdownSignal,
}

struct SharedState {
    config: PatentflowConfig,
    orchestrator: Arc<PatentOrchestrator>,
}

impl PlatformContext {
    pub(crate) fn new(config: PatentflowConfig, orchestrator: Arc<PatentOrchestrator>, shutdown: ShutdownSignal) -> Self {
        Self { shared: Arc::new(SharedState { config, orchestrator }), shutdown }
    }

    pub fn config(&self) -> &PatentflowConfig {
        &self.shared.config
    }

    pub fn orchestrator(&self) -> Arc<PatentOrchestrator> {
        Arc::clone(&self.shared.orchestrator)
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.child()
    }
}
