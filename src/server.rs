//! Iterative echo server driver.
//!
//! Accepts one connection at a time on a single thread and reflects every
//! received line back to the peer. A connection error is logged and the
//! accept loop moves on; the failed connection's descriptor is closed by
//! drop.

use crate::error::{Error, Result};
use crate::net;
use crate::rio::{RioStream, RIO_BUFSIZE};
use bytes::BytesMut;
use std::io::{self, Read, Write};
use tracing::{debug, info, warn};

/// Listen on `service` and serve connections one after another.
pub fn run(service: &str, max_line: usize) -> Result<()> {
    let listener = net::listen_on(service)?;
    let local = listener.local_addr().map_err(Error::Transfer)?;
    info!(addr = %local, "echo server listening");

    loop {
        let (stream, peer) = match listener.accept() {
            Ok(pair) => pair,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        info!(peer = %peer, "accepted connection");

        if let Err(e) = echo_loop(stream, max_line) {
            warn!(peer = %peer, error = %e, "connection ended with error");
        } else {
            debug!(peer = %peer, "connection closed");
        }
    }
}

/// Echo every line from `stream` back to it until end-of-stream.
///
/// Overlong lines are echoed in `max_line - 1` byte pieces, so the byte
/// stream going back is identical to the one received either way.
fn echo_loop<S: Read + Write>(stream: S, max_line: usize) -> Result<()> {
    let mut rio = RioStream::new(stream);
    let mut line = BytesMut::with_capacity(max_line.min(RIO_BUFSIZE));

    loop {
        line.clear();
        let n = rio.append_line(&mut line, max_line)?;
        if n == 0 {
            return Ok(()); // peer closed
        }
        debug!(bytes = n, "echoing line");
        rio.write_n(&line)?;
    }
}
