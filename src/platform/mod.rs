pub mod config;
pub mod context;
pub mod runtime;
pub mod service;
pub mod shutdown;
pub mod telemetry;

pub use config::PatentflowConfig;
pub use context::PlatformContext;
pub use runtime::{Platform, PlatformRuntime};
pub use service::ServiceRegistration;
pub use shutdown::ShutdownSignal;
