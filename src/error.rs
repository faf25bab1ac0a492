//! Error taxonomy for the echoline core.
//!
//! Resolution, connection, listen, and transfer failures are distinct so
//! that drivers can branch on them. End-of-stream is never an error: the
//! robust I/O layer reports it as a zero or short count and callers branch
//! on that separately. Signal interruption (`ErrorKind::Interrupted`) is
//! retried inside the core and never reaches this type.

use std::io;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the resolution, connection, and transfer layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Address lookup itself failed; carries the resolver's diagnostic.
    #[error("cannot resolve {endpoint}: {source}")]
    Resolution {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// Every resolved candidate was tried and none could be connected.
    #[error("cannot connect to {endpoint}: all {attempts} candidate address(es) failed")]
    Connect { endpoint: String, attempts: usize },

    /// No candidate could be bound, or listen failed after a successful bind.
    #[error("cannot listen on {endpoint}: {source}")]
    Listen {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// An unrecoverable read or write failure on an established stream.
    #[error("transfer failed: {0}")]
    Transfer(#[from] io::Error),
}

impl Error {
    /// Whether this error came from address resolution (as opposed to a
    /// later connect/bind/transfer stage).
    pub fn is_resolution(&self) -> bool {
        matches!(self, Error::Resolution { .. })
    }
}
