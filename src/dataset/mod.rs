//! Dataset document-ingestion API integration.

pub mod client;
pub mod types;

pub use client::DatasetClient;
pub use types::{
    DatasetClientError, IndexingTechnique, PreProcessingRule, ProcessMode, ProcessRule,
    ProcessRules, ProcessingConfig, Segmentation, ServerResponse, UploadError, UploadTarget,
};
