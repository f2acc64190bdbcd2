//! Shared types used by the dataset client and the upload loop.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Parsed JSON body returned by the document-ingestion endpoint.
///
/// The shape is owned by the remote service; the uploader treats it as opaque.
pub type ServerResponse = Value;

/// Errors returned while uploading a single file.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Local file could not be opened or read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// HTTP layer failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Server answered with a non-success status code.
    #[error("Unexpected dataset API response ({status}): {body}")]
    Server {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Raw body associated with the failing response.
        body: String,
    },
    /// Server reported success but the body was not valid JSON.
    #[error("Failed to decode dataset API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised while constructing a [`crate::dataset::DatasetClient`].
#[derive(Debug, Error)]
pub enum DatasetClientError {
    /// Underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    /// Processing config could not be serialized to JSON.
    #[error("Failed to serialize processing config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination of an upload run: API host, dataset, and bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    /// Host (optionally with port and scheme) of the dataset API.
    pub api_base: String,
    /// Identifier of the dataset receiving the documents.
    pub dataset_id: String,
    /// Bearer credential sent with every request.
    pub api_key: String,
}

impl UploadTarget {
    /// Full URL of the create-by-file endpoint for this target.
    ///
    /// A bare host such as `localhost` or `10.0.0.5:8080` is addressed over plain `http://`.
    /// Values that already carry a scheme are used as-is.
    pub fn endpoint(&self) -> String {
        let base = self.api_base.trim().trim_end_matches('/');
        let base = if base.starts_with("http://") || base.starts_with("https://") {
            base.to_string()
        } else {
            format!("http://{base}")
        };
        format!(
            "{base}/v1/datasets/{}/document/create-by-file",
            self.dataset_id
        )
    }
}

/// Indexing strategy requested from the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexingTechnique {
    /// Embedding-backed indexing.
    HighQuality,
    /// Keyword-only, cheaper indexing.
    Economy,
}

/// Whether the service applies its own rules or the supplied ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessMode {
    /// Service-defined cleaning and segmentation.
    Automatic,
    /// Rules supplied in [`ProcessRules`].
    Custom,
}

/// Named pre-processing toggle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreProcessingRule {
    /// Rule identifier understood by the service (e.g. `remove_extra_spaces`).
    pub id: String,
    /// Whether the rule is applied.
    pub enabled: bool,
}

/// Segmentation policy applied when splitting a document into chunks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Separator string that delimits segments.
    pub separator: String,
    /// Maximum token count per segment.
    pub max_tokens: u32,
}

/// Cleaning and splitting rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRules {
    /// Pre-processing toggles applied before segmentation.
    pub pre_processing_rules: Vec<PreProcessingRule>,
    /// Segmentation policy.
    pub segmentation: Segmentation,
}

/// Rule block of the processing config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRule {
    /// Cleaning and splitting rules.
    pub rules: ProcessRules,
    /// Rule mode.
    pub mode: ProcessMode,
}

/// Document describing how the service should index each uploaded file.
///
/// Sent as the `data` part of every upload request in a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Indexing strategy.
    pub indexing_technique: IndexingTechnique,
    /// Cleaning and segmentation policy.
    pub process_rule: ProcessRule,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            indexing_technique: IndexingTechnique::HighQuality,
            process_rule: ProcessRule {
                rules: ProcessRules {
                    pre_processing_rules: vec![
                        PreProcessingRule {
                            id: "remove_extra_spaces".into(),
                            enabled: true,
                        },
                        PreProcessingRule {
                            id: "remove_urls_emails".into(),
                            enabled: true,
                        },
                    ],
                    segmentation: Segmentation {
                        separator: "###".into(),
                        max_tokens: 500,
                    },
                },
                mode: ProcessMode::Custom,
            },
        }
    }
}
