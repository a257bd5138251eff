use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Loads the default AWS credential chain; the client itself connects lazily.
    pub async fn connect(bucket: String, region: Option<String>) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;

        if sdk_config.credentials_provider().is_none() {
            return Err(EtlError::authentication(
                "No AWS credentials provider found in the environment",
            ));
        }

        Ok(Self::new(S3Client::new(&sdk_config), bucket))
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await;

        match result {
            Ok(_output) => Ok(()),
            Err(err) => {
                let context = DisplayErrorContext(&err).to_string();
                let detail = match err.into_service_error() {
                    PutObjectError::InvalidRequest(e) => format!("invalid request: {}", e),
                    PutObjectError::EncryptionTypeMismatch(e) => {
                        format!("encryption type mismatch: {}", e)
                    }
                    other => match other.code() {
                        Some(code) => format!("{}: {}", code, context),
                        None => context,
                    },
                };
                Err(EtlError::publish(format!(
                    "s3://{}/{}: {}",
                    self.bucket, key, detail
                )))
            }
        }
    }

    fn location(&self) -> String {
        format!("s3://{}", self.bucket)
    }
}
