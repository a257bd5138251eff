use crate::adapters::storage::LocalStorage;
use crate::config::{PipelineConfig, StorageBackend};
use crate::domain::ports::{CredentialProvider, Storage};
use crate::utils::error::{EtlError, Result};
use serde::Deserialize;

pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Reads the key file path from `GOOGLE_APPLICATION_CREDENTIALS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn credentials_file(&self) -> Option<String> {
        std::env::var(CREDENTIALS_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    path: Option<String>,
}

impl StaticCredentials {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn none() -> Self {
        Self { path: None }
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials_file(&self) -> Option<String> {
        self.path.clone()
    }
}

/// The fields of a Google key file we care about before handing it to the client.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyFileInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub project_id: Option<String>,
    pub client_email: Option<String>,
}

/// Rejects missing, unreadable and malformed key files without any network traffic.
pub fn inspect_key_file(path: &str) -> Result<KeyFileInfo> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        EtlError::authentication_with(format!("Cannot read credentials file {}", path), e)
    })?;

    let info: KeyFileInfo = serde_json::from_str(&content).map_err(|e| {
        EtlError::authentication_with(format!("Malformed credentials file {}", path), e)
    })?;

    if info.kind.trim().is_empty() {
        return Err(EtlError::authentication(format!(
            "Credentials file {} has an empty 'type' field",
            path
        )));
    }

    Ok(info)
}

/// Builds the object-store client for the configured backend.
pub async fn authenticate(
    config: &PipelineConfig,
    credentials: &dyn CredentialProvider,
) -> Result<Box<dyn Storage>> {
    match config.backend {
        StorageBackend::Local => {
            tracing::info!("Local backend selected, no credentials needed");
            Ok(Box::new(LocalStorage::new(config.output_dir.clone())))
        }
        StorageBackend::Gcs => {
            let key_file = credentials.credentials_file();
            match &key_file {
                Some(path) => {
                    let info = inspect_key_file(path)?;
                    tracing::debug!(
                        "Using {} credentials for project {:?}",
                        info.kind,
                        info.project_id
                    );
                }
                None => tracing::info!(
                    "{} not set, falling back to application default credentials",
                    CREDENTIALS_ENV
                ),
            }
            connect_gcs(config, key_file).await
        }
        StorageBackend::S3 => connect_s3(config).await,
    }
}

#[cfg(feature = "gcs")]
async fn connect_gcs(config: &PipelineConfig, key_file: Option<String>) -> Result<Box<dyn Storage>> {
    let storage =
        crate::adapters::storage::GcsStorage::connect(config.bucket.clone(), key_file).await?;
    Ok(Box::new(storage))
}

#[cfg(not(feature = "gcs"))]
async fn connect_gcs(_config: &PipelineConfig, _key_file: Option<String>) -> Result<Box<dyn Storage>> {
    Err(EtlError::config("Built without the 'gcs' feature"))
}

#[cfg(feature = "s3")]
async fn connect_s3(config: &PipelineConfig) -> Result<Box<dyn Storage>> {
    let storage =
        crate::adapters::storage::S3Storage::connect(config.bucket.clone(), config.s3_region.clone())
            .await?;
    Ok(Box::new(storage))
}

#[cfg(not(feature = "s3"))]
async fn connect_s3(_config: &PipelineConfig) -> Result<Box<dyn Storage>> {
    Err(EtlError::config("Built without the 's3' feature"))
}
