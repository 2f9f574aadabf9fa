//! Observability setup for Threadline.

pub mod tracing_setup;
