//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that exposes the latest funding rates.

pub(crate) mod handlers;
mod server;

pub use server::HttpServer;
