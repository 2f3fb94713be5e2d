use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::block::BlockError;

#[derive(Error, Debug)]
pub enum Error {
    /// The instrument could not be reached or the link could not be created.
    #[error("Could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid resource address: {0}")]
    Address(String),
    #[error("Could not configure session: {0}")]
    Config(#[source] io::Error),
    #[error("Failed in sending phase of {command:?}: {source}")]
    Send {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading response to {command:?}: {source}")]
    Receive {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("Response to {command:?} is {len} bytes, more than the {max} byte limit")]
    ResponseTooLong {
        command: String,
        len: usize,
        max: usize,
    },
    #[error("Failed while parsing response to {command:?}: {reason}")]
    Parse { command: String, reason: String },
    #[error("Malformed block in response to {command:?}: {source}")]
    Block {
        command: String,
        #[source]
        source: BlockError,
    },
    #[error("Preamble has {0} fields, expected 10")]
    Preamble(usize),
    #[error("Could not write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// True when the instrument was never reached, as opposed to answering with bad data.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::Connect { .. } | Error::Address(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
