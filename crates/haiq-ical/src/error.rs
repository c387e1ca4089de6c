use thiserror::Error;

/// Stream-level failures. Any of these aborts the current parse attempt.
#[derive(Error, Debug)]
pub enum IcalError {
    #[error("cannot read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line} too long ({length} bytes): {excerpt}")]
    LineTooLong {
        line: usize,
        length: usize,
        excerpt: String,
    },

    #[error("parser input has already been consumed")]
    AlreadyParsed,
}

pub type IcalResult<T> = std::result::Result<T, IcalError>;
