use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed client entry: {0}")]
    MalformedEntry(String),

    #[error("Report delivery error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Collector rejected report with status {0}")]
    CollectorStatus(StatusCode),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
