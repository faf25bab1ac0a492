//! echoline: a line-oriented TCP echo client/server toolkit.
//!
//! The core is a robust blocking I/O layer ([`rio`]) — full-transfer
//! read/write loops that tolerate short transfers and interrupted
//! syscalls, plus a buffered line reader — and protocol-independent
//! connection establishment ([`net`]) that walks resolver-ordered
//! candidate addresses until one connects or binds. The [`client`] and
//! [`server`] drivers tie the two together into a newline-delimited echo
//! protocol over plain TCP.
//!
//! Everything is single-threaded and fully blocking: no async, no
//! multiplexing, one connection at a time.

pub mod client;
pub mod config;
pub mod error;
pub mod net;
pub mod rio;
pub mod server;

pub use error::{Error, Result};
pub use net::{connect_to, connect_with, listen_on, ConnectOptions, LISTEN_BACKLOG};
pub use rio::{read_n, write_n, RioStream, RIO_BUFSIZE};
