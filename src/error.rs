use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Unable to find service board {0}")]
    UnknownBoard(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Page {page} returned {len} records for a page size of {page_size}")]
    InconsistentPage {
        page: u32,
        len: usize,
        page_size: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// 設定エラーかどうか（呼び出し側でレポート単位にスキップするかの判断用）
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfiguration(_)
                | Error::ConfigurationMissing(_)
                | Error::UnknownBoard(_)
                | Error::NotFound(_)
        )
    }

    /// 通信・デコード系のエラーかどうか
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::RequestFailed(_) | Error::ApiError { .. } | Error::JsonParsing(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
