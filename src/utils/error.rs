use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One variant per pipeline stage, plus configuration problems caught before the run.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Download failed: {message}")]
    Fetch {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Transformation failed: {message}")]
    Transform {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Upload failed: {message}")]
    Publish {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Authenticate,
    Fetch,
    Transform,
    Publish,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Config => "config",
            Stage::Authenticate => "authenticate",
            Stage::Fetch => "fetch",
            Stage::Transform => "transform",
            Stage::Publish => "publish",
        };
        f.write_str(name)
    }
}

impl EtlError {
    pub fn authentication(message: impl Into<String>) -> Self {
        EtlError::Authentication {
            message: message.into(),
            source: None,
        }
    }

    pub fn authentication_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EtlError::Authentication {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn fetch_status(url: &str, status: reqwest::StatusCode) -> Self {
        EtlError::Fetch {
            message: format!("GET {} returned {}", url, status),
            status: Some(status.as_u16()),
            source: None,
        }
    }

    pub fn fetch_transport(url: &str, source: reqwest::Error) -> Self {
        EtlError::Fetch {
            message: format!("GET {} failed: {}", url, source),
            status: source.status().map(|s| s.as_u16()),
            source: Some(source),
        }
    }

    pub fn transform(message: impl Into<String>) -> Self {
        EtlError::Transform {
            message: message.into(),
            source: None,
        }
    }

    pub fn publish(message: impl Into<String>) -> Self {
        EtlError::Publish {
            message: message.into(),
            source: None,
        }
    }

    pub fn publish_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EtlError::Publish {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        EtlError::Config {
            message: message.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            EtlError::Authentication { .. } => Stage::Authenticate,
            EtlError::Fetch { .. } => Stage::Fetch,
            EtlError::Transform { .. } => Stage::Transform,
            EtlError::Publish { .. } => Stage::Publish,
            EtlError::Config { .. } | EtlError::InvalidConfigValue { .. } => Stage::Config,
        }
    }

    /// HTTP status of a failed download, when the server answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            EtlError::Fetch { status, .. } => *status,
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.stage() {
            Stage::Config => "Check the config file, CAFE_ETL_* variables and CLI flags",
            Stage::Authenticate => {
                "Check that GOOGLE_APPLICATION_CREDENTIALS (or the AWS credential chain) points to a valid key"
            }
            Stage::Fetch => match self.http_status() {
                Some(404) => "The source spreadsheet moved; update the source URL",
                Some(_) => "The source server rejected the request; retry the whole run later",
                None => "Check network connectivity to the source host",
            },
            Stage::Transform => {
                "The spreadsheet layout changed; check the sheet name, skipped rows and column positions"
            }
            Stage::Publish => "Check that the bucket exists and the credentials can write to it",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.stage() {
            Stage::Config => 2,
            Stage::Authenticate => 3,
            Stage::Fetch | Stage::Transform | Stage::Publish => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
