//! Blocking HTTP client for the dataset create-by-file endpoint.

use crate::dataset::types::{
    DatasetClientError, ProcessingConfig, ServerResponse, UploadError, UploadTarget,
};
use crate::uploader::FileUploader;
use reqwest::blocking::{
    Client,
    multipart::{Form, Part},
};
use std::path::Path;
use std::time::Duration;

/// Uploads files to a single dataset with a fixed processing config.
pub struct DatasetClient {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
    pub(crate) api_key: String,
    pub(crate) config_json: String,
}

impl DatasetClient {
    /// Build a client for `target`, serializing `config` once for the whole run.
    ///
    /// When `timeout` is `None` the HTTP client's default timeout applies.
    pub fn new(
        target: UploadTarget,
        config: &ProcessingConfig,
        timeout: Option<Duration>,
    ) -> Result<Self, DatasetClientError> {
        let mut builder = Client::builder().user_agent("dataset-uploader/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let config_json = serde_json::to_string(config)?;
        let endpoint = target.endpoint();

        tracing::debug!(
            endpoint = %endpoint,
            has_api_key = !target.api_key.is_empty(),
            "Initialized dataset HTTP client"
        );

        Ok(Self {
            client,
            endpoint,
            api_key: target.api_key,
            config_json,
        })
    }

    /// URL every upload is posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Exact JSON sent as the `data` part of each request.
    pub fn processing_config_json(&self) -> &str {
        &self.config_json
    }

    /// Upload one file as a `data` + `file` multipart request.
    ///
    /// The raw response body is logged before the status code is checked, so the server's
    /// payload stays visible even when the request is rejected.
    pub fn upload_file(&self, path: &Path) -> Result<ServerResponse, UploadError> {
        let file_name = base_name(path);
        let form = self.build_form(path, &file_name)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        tracing::info!(file = %file_name, status = %status, response = %body, "Dataset API responded");

        if !status.is_success() {
            return Err(UploadError::Server { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn build_form(&self, path: &Path, file_name: &str) -> Result<Form, UploadError> {
        // Contents are read eagerly so the handle is closed before the request goes out.
        let contents = std::fs::read(path).map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let data = Part::text(self.config_json.clone()).mime_str("application/json")?;
        let file = Part::bytes(contents).file_name(file_name.to_string());

        Ok(Form::new().part("data", data).part("file", file))
    }
}

impl FileUploader for DatasetClient {
    fn upload_file(&self, path: &Path) -> Result<ServerResponse, UploadError> {
        DatasetClient::upload_file(self, path)
    }
}

/// Final path segment, used as the multipart filename.
pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
