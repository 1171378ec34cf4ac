//! Prometheus text-exposition endpoint (spec SPEC_FULL ambient stack),
//! serving the union of every component's metrics registry the way
//! `platform::telemetry::telemetry_service` serves `/metrics` in the
//! platform workspace.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, TextEncoder};
use tracing::info;

use crate::platform::config::ObservabilitySettings;
use crate::platform::context::PlatformContext;
use crate::platform::service::ServiceRegistration;
use crate::platform::shutdown::ShutdownSignal;

pub fn telemetry_service(settings: ObservabilitySettings) -> ServiceRegistration {
    ServiceRegistration::new(
        "telemetry",
        Arc::new(move |ctx: PlatformContext, signal: ShutdownSignal| {
            let settings = settings.clone();
            tokio::spawn(async move {
                if !settings.enable_metrics {
                    return Ok(());
                }

                let app = Router::new().route("/metrics", get(move || render_metrics(ctx.clone())));
                let addr = SocketAddr::from(([0, 0, 0, 0], settings.metrics_port));

                let listener = tokio::net::TcpListener::bind(addr).await?;
                info!(port = settings.metrics_port, "telemetry server started");

                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        signal.cancelled().await;
                        info!("shutting down telemetry server");
                    })
                    .await?;

                Ok(()) as Result<()>
            })
        }),
    )
}

async fn render_metrics(ctx: PlatformContext) -> String {
    let orchestrator = ctx.orchestrator();
    let encoder = TextEncoder::new();

    let mut families = orchestrator.bus.metrics().registry.gather();
    families.extend(orchestrator.collab.metrics().registry().gather());
    families.extend(orchestrator.search.metrics().registry().gather());
    families.extend(orchestrator.trend.metrics().registry().gather());
    families.extend(orchestrator.competition.metrics().registry().gather());
    families.extend(orchestrator.techclass.metrics().registry().gather());
    families.extend(orchestrator.quality.metrics().registry().gather());
    families.extend(orchestrator.workflow_quality.metrics().registry().gather());
    families.extend(orchestrator.report.metrics().registry().gather());

    let mut buffer = Vec::new();
    if encoder.encode(&families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
