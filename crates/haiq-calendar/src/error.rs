use haiq_ical::IcalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("calendar feed is disabled")]
    Disabled,

    #[error("failed to parse calendar feed: {0}")]
    Parse(#[from] IcalError),

    #[error("parse worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;
