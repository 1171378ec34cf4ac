//! Boots the orchestrator plus its background services and hands back a
//! handle that shuts everything down cleanly, following the
//! `Platform`/`PlatformRuntime` split the platform workspace uses in
//! `platform::runtime`.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::info;

use crate::orchestrator::PatentOrchestrator;
use crate::platform::config::PatentflowConfig;
use crate::platform::context::PlatformContext;
use crate::platform::service::ServiceRegistration;
use crate::platform::shutdown::ShutdownSignal;
use crate::platform::telemetry::telemetry_service;

pub struct Platform {
    config: PatentflowConfig,
    orchestrator: Arc<PatentOrchestrator>,
    services: Vec<ServiceRegistration>,
}

impl Platform {
    pub fn new(config: PatentflowConfig, orchestrator: Arc<PatentOrchestrator>) -> Self {
        let services = vec![telemetry_service(config.observability.clone())];
        Self { config, orchestrator, services }
    }

    pub fn register_service(&mut self, service: ServiceRegistration) {
        self.services.push(service);
    }

    pub async fn start(self) -> Result<PlatformRuntime> {
        initialize_logging(&self.config);

        let root_signal = ShutdownSignal::new();
        let context = PlatformContext::new(self.config, self.orchestrator, root_signal.child());

        let mut tasks = Vec::new();
        for service in self.services {
            let handle = service.spawn(context.clone(), root_signal.child());
            tasks.push((service.name().to_string(), handle));
        }

        info!("platform boot completed");

        Ok(PlatformRuntime { context, shutdown: root_signal, tasks })
    }
}

pub struct PlatformRuntime {
    context: PlatformContext,
    shutdown: ShutdownSignal,
    tasks: Vec<(String, JoinHandle<Result<()>>)>,
}

impl PlatformRuntime {
    pub fn context(&self) -> PlatformContext {
        self.context.clone()
    }

    pub async fn shutdown(self) -> Result<()> {
        self.shutdown.cancel();

        for (name, handle) in self.tasks {
            match handle.await {
                Ok(Ok(())) => info!(service = %name, "service shutdown cleanly"),
                Ok(Err(err)) => return Err(err),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

fn initialize_logging(config: &PatentflowConfig) {
    let filter = &config.observability.log_level;
    let _ = tracing_subscriber::fmt().with_env_filter(filter.as_str()).try_init();
}
