use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Naming rules shared by GCS and S3: 3-63 chars of lowercase letters, digits,
/// hyphens, underscores and dots, starting and ending with a letter or digit.
pub fn validate_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    let invalid = |reason: &str| EtlError::InvalidConfigValue {
        field: field_name.to_string(),
        value: bucket_name.to_string(),
        reason: reason.to_string(),
    };

    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid("Bucket name must be between 3 and 63 characters"));
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid(
            "Bucket name can only contain lowercase letters, numbers, hyphens, underscores and dots",
        ));
    }

    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !edge_ok(bucket_name.chars().next()) || !edge_ok(bucket_name.chars().last()) {
        return Err(invalid("Bucket name must start and end with a letter or number"));
    }

    Ok(())
}

/// Object key prefixes are joined with '/', so they must not carry their own slashes at the edges.
pub fn validate_key_prefix(field_name: &str, prefix: &str) -> Result<()> {
    validate_non_empty_string(field_name, prefix)?;
    if prefix.starts_with('/') || prefix.ends_with('/') {
        return Err(EtlError::InvalidConfigValue {
            field: field_name.to_string(),
            value: prefix.to_string(),
            reason: "Prefix must not start or end with '/'".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source_url", "https://example.com/file.xlsx").is_ok());
        assert!(validate_url("source_url", "http://example.com").is_ok());
        assert!(validate_url("source_url", "").is_err());
        assert!(validate_url("source_url", "invalid-url").is_err());
        assert!(validate_url("source_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_bucket_name() {
        assert!(validate_bucket_name("bucket", "fncc-precio-mensual-cop--125kg-cafe-pergamino-seco").is_ok());
        assert!(validate_bucket_name("bucket", "my_bucket.data").is_ok());
        assert!(validate_bucket_name("bucket", "ab").is_err());
        assert!(validate_bucket_name("bucket", "Upper-Case").is_err());
        assert!(validate_bucket_name("bucket", "-leading").is_err());
        assert!(validate_bucket_name("bucket", "trailing.").is_err());
    }

    #[test]
    fn test_validate_key_prefix() {
        assert!(validate_key_prefix("key_prefix", "precio_interno_mensual/limpio").is_ok());
        assert!(validate_key_prefix("key_prefix", "/abs").is_err());
        assert!(validate_key_prefix("key_prefix", "dir/").is_err());
        assert!(validate_key_prefix("key_prefix", "  ").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_dir", "./output").is_ok());
        assert!(validate_path("output_dir", "").is_err());
        assert!(validate_path("output_dir", "a\0b").is_err());
    }
}
