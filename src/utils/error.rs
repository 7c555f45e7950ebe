use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Client error {status} from {url}")]
    ClientError { status: u16, url: String },

    #[error("Server error {status} from {url}")]
    ServerError { status: u16, url: String },

    #[error("Transient failure after {attempts} attempt(s): {message}")]
    TransientError { attempts: u32, message: String },

    #[error("Unexpected response body from {url}: {message}")]
    DecodeError { url: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Storage write failed for {key}: {message}")]
    StorageError { key: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 單筆資料失敗，可略過
    Medium,
    /// 執行失敗
    High,
    /// 設定或環境問題
    Critical,
}

impl EtlError {
    /// 5xx 與連線層錯誤才值得重試
    pub fn is_retryable(&self) -> bool {
        match self {
            EtlError::ServerError { .. } | EtlError::TransientError { .. } => true,
            EtlError::ApiError(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EtlError::ConfigError { .. }
                | EtlError::MissingConfigError { .. }
                | EtlError::InvalidConfigValueError { .. }
        )
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            e if e.is_config_error() => ErrorSeverity::Critical,
            EtlError::StorageError { .. } | EtlError::IoError(_) => ErrorSeverity::High,
            _ => ErrorSeverity::Medium,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Critical => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::MissingConfigError { .. } => {
                "Set TMDB_API_KEY in the environment or a .env file"
            }
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Check command line flags and environment variables"
            }
            EtlError::ClientError { status: 401, .. } => "Verify the TMDB API key is valid",
            EtlError::ClientError { .. } => "Check the request parameters and API base URL",
            EtlError::ServerError { .. }
            | EtlError::TransientError { .. }
            | EtlError::ApiError(_) => {
                "The upstream API is unavailable, try again later"
            }
            EtlError::DecodeError { .. } => "The upstream API changed its response format",
            EtlError::StorageError { .. } | EtlError::IoError(_) => {
                "Check bucket permissions and AWS credentials"
            }
            EtlError::SerializationError(_) => "Inspect the offending record",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
