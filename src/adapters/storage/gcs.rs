use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use google_cloud_storage::client::google_cloud_auth::credentials::CredentialsFile;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};

/// Google Cloud Storage bucket, written with simple (single request) uploads.
pub struct GcsStorage {
    client: Client,
    bucket: String,
}

impl GcsStorage {
    /// Uses the given key file, or application default credentials when there is none.
    pub async fn connect(bucket: String, key_file: Option<String>) -> Result<Self> {
        let config = match key_file {
            Some(path) => {
                let credentials = CredentialsFile::new_from_file(path.clone())
                    .await
                    .map_err(|e| {
                        EtlError::authentication(format!("Cannot load key file {}: {}", path, e))
                    })?;
                ClientConfig::default()
                    .with_credentials(credentials)
                    .await
                    .map_err(|e| {
                        EtlError::authentication(format!("Rejected key file {}: {}", path, e))
                    })?
            }
            None => ClientConfig::default().with_auth().await.map_err(|e| {
                EtlError::authentication(format!("No application default credentials: {}", e))
            })?,
        };

        tracing::info!("✅ Google Cloud Storage client ready for bucket {}", bucket);
        Ok(Self {
            client: Client::new(config),
            bucket,
        })
    }
}

#[async_trait]
impl Storage for GcsStorage {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let mut media = Media::new(key.to_string());
        media.content_type = content_type.to_string().into();
        media.content_length = Some(data.len() as u64);

        let request = UploadObjectRequest {
            bucket: self.bucket.clone(),
            ..Default::default()
        };

        self.client
            .upload_object(&request, data, &UploadType::Simple(media))
            .await
            .map_err(|e| {
                EtlError::publish(format!("gs://{}/{}: {}", self.bucket, key, e))
            })?;

        Ok(())
    }

    fn location(&self) -> String {
        format!("gs://{}", self.bucket)
    }
}
