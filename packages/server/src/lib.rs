// HAR API Extractor - server core
//
// This crate wires the harlog extraction pipeline behind an HTTP
// surface: chunked capture upload, reassembly, and API-call
// extraction.

pub mod config;
pub mod error;
pub mod server;
pub mod uploads;

pub use config::Config;
pub use error::ApiError;
