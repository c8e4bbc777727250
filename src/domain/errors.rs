use derive_more::Display;

/// Failures the chart page can surface. Anything touching the user goes
/// through `user_message`; the `Display` form is for logs.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum AppError {
    #[display(fmt = "Invalid input: {}", _0)]
    InvalidInput(String),
    #[display(fmt = "Upstream data error: {}", _0)]
    UpstreamData(String),
    #[display(fmt = "Transport error: {}", _0)]
    Transport(String),
    #[display(fmt = "Storage error: {}", _0)]
    Storage(StorageError),
    #[display(fmt = "Rendering error: {}", _0)]
    Rendering(String),
}

impl AppError {
    /// Text for the alert box.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(_) => "Please enter a valid stock code".to_string(),
            AppError::UpstreamData(msg) => msg.clone(),
            AppError::Transport(_) => "Error retrieving stock data".to_string(),
            AppError::Storage(_) => "Local storage is unavailable".to_string(),
            AppError::Rendering(_) => "Unable to draw the chart".to_string(),
        }
    }
}

impl std::error::Error for AppError {}

/// Key-value persistence failures. Never fatal for the caller.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum StorageError {
    #[display(fmt = "storage unavailable: {}", _0)]
    Unavailable(String),
    #[display(fmt = "quota exceeded: {}", _0)]
    QuotaExceeded(String),
    #[display(fmt = "corrupt record: {}", _0)]
    Corrupt(String),
}

impl std::error::Error for StorageError {}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> Self {
        AppError::Storage(error)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        StorageError::Corrupt(error.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
