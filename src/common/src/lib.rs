//! # patentflow-common
//!
//! Shared data model, structured error type, and external-collaborator
//! interfaces used by every component of the patent-analysis
//! orchestration kernel. Nothing in this crate talks to the network, a
//! database, or a model: it exists so the component crates (bus,
//! balancer, registry, collaboration manager, search aggregator,
//! analyzers, quality controllers, report pipeline) agree on the same
//! vocabulary without depending on each other directly.

pub mod error;
pub mod fakes;
pub mod interfaces;
pub mod types;

pub use error::{CoreError, CoreResult, ErrorKind};
pub use interfaces::{
    ChartRenderer, Clock, DocumentExporter, MonitoringSink, RawSearchRecord, RenderedChart,
    SearchKind, SearchSource, TemplateRenderer, TextGenerator,
};
pub use types::*;
