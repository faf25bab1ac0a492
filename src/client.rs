//! Blocking echo client driver.
//!
//! Copies lines from standard input to the connection and prints each
//! reply line to standard output. Strictly sequential: one line out, one
//! line back, no pipelining. The connection is owned here and closed
//! exactly once, by drop, on every terminal path.

use crate::error::Result;
use crate::net::{self, ConnectOptions};
use crate::rio::RioStream;
use std::io::{self, BufRead, Read, Write};
use tracing::{debug, info};

/// Connect to `host:service` and run the echo session over stdin/stdout.
pub fn run(host: &str, service: &str, nodelay: bool, max_line: usize) -> Result<()> {
    let stream = net::connect_with(host, service, ConnectOptions { nodelay })?;
    let peer = stream.peer_addr().map_err(crate::Error::Transfer)?;
    info!(peer = %peer, "connected to echo server");

    let stdin = io::stdin();
    let stdout = io::stdout();
    session(stdin.lock(), stdout.lock(), stream, max_line)
}

/// One echo session: read a line of input, send it, receive one reply
/// line, print it. Ends at end of input or when the server closes.
fn session<I, O, S>(mut input: I, mut output: O, stream: S, max_line: usize) -> Result<()>
where
    I: BufRead,
    O: Write,
    S: Read + Write,
{
    let mut rio = RioStream::new(stream);
    let mut line = String::new();
    let mut reply = vec![0u8; max_line];

    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("end of input");
            return Ok(());
        }
        rio.write_n(line.as_bytes())?;

        let n = rio.read_line(&mut reply)?;
        if n == 0 {
            info!("server closed the connection");
            return Ok(());
        }
        output.write_all(&reply[..n])?;
        output.flush()?;
    }
}
