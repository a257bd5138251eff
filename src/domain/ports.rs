use crate::domain::model::TransformResult;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Write-only view of an object store. Implementations never list, read or delete.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Human readable location used in logs, e.g. `gs://bucket`.
    fn location(&self) -> String;
}

#[async_trait]
impl<T: Storage + ?Sized> Storage for Box<T> {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        (**self).put_object(key, data, content_type).await
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn sheet_name(&self) -> &str;
    fn skip_rows(&self) -> u32;
    fn date_column(&self) -> u32;
    fn price_column(&self) -> u32;
    fn key_prefix(&self) -> &str;
    fn file_stem(&self) -> &str;
}

/// Source of the credential reference handed to the object-store client.
pub trait CredentialProvider: Send + Sync {
    /// Path of a service-account key file, if one is configured.
    fn credentials_file(&self) -> Option<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<u8>>;
    async fn transform(&self, payload: Vec<u8>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
