//! Named, spawnable background services the platform runtime owns for
//! its lifetime (telemetry today; the shape generalizes to any future
//! long-running task).

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::platform::context::PlatformContext;
use crate::platform::shutdown::ShutdownSignal;

pub type ServiceSpawner =
    Arc<dyn Fn(PlatformContext, ShutdownSignal) -> JoinHandle<Result<()>> + Send + Sync + 'static>;

pub struct ServiceRegistration {
    name: String,
    spawner: ServiceSpawner,
}

impl ServiceRegistration {
    pub fn new<N: Into<String>>(name: N, spawner: ServiceSpawner) -> Self {
        Self { name: name.into(), spawner }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spawn(&self, context: PlatformContext, signal: ShutdownSignal) -> JoinHandle<Result<()>> {
        (self.spawner)(context, signal)
    }
}
