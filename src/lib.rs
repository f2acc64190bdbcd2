#![deny(missing_docs)]

//! Core library for the dataset batch uploader.

/// Flag and environment-driven configuration.
pub mod config;
/// Dataset document-ingestion API client and wire types.
pub mod dataset;
/// Structured logging and tracing setup.
pub mod logging;
/// Directory walk and fail-fast upload loop.
pub mod uploader;
