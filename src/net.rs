//! Protocol-independent connection establishment.
//!
//! A host/service pair (client) or a bare service (server) resolves to an
//! ordered list of candidate addresses. A single first-success walk is
//! shared by both paths: build a socket for each candidate in resolver
//! order and keep the first attempt that fully succeeds; every abandoned
//! socket is dropped, which closes its descriptor.
//!
//! Services are numeric-only: a string that does not parse as a port
//! number is a resolution failure, not a connect failure.

use crate::error::{Error, Result};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, trace};

/// Fixed backlog for listening sockets.
pub const LISTEN_BACKLOG: i32 = 1024;

/// One resolved (domain, type, protocol, address) tuple usable for a
/// connect or bind attempt.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub domain: Domain,
    pub socktype: Type,
    pub protocol: Protocol,
    pub addr: SockAddr,
}

impl Candidate {
    /// A TCP stream candidate for the given address.
    fn stream(addr: SocketAddr) -> Self {
        Self {
            domain: Domain::for_address(addr),
            socktype: Type::STREAM,
            protocol: Protocol::TCP,
            addr: addr.into(),
        }
    }

    /// Create a blocking socket matching this candidate's tuple.
    fn socket(&self) -> io::Result<Socket> {
        Socket::new(self.domain, self.socktype, Some(self.protocol))
    }
}

/// Socket options applied to a client connection after connect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectOptions {
    /// Set TCP_NODELAY on the connected socket.
    pub nodelay: bool,
}

/// Resolve client-mode candidates for `host:service`.
///
/// Candidates come back in resolver order; this layer never reorders them.
pub fn resolve_client(host: &str, service: &str) -> Result<Vec<Candidate>> {
    let endpoint = format!("{host}:{service}");
    let port = numeric_service(service).map_err(|source| Error::Resolution {
        endpoint: endpoint.clone(),
        source,
    })?;
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| Error::Resolution { endpoint, source })?;
    Ok(addrs.map(Candidate::stream).collect())
}

/// Resolve passive (bind-capable) candidates for a server on `service`:
/// the IPv6 wildcard first, then the IPv4 wildcard.
pub fn resolve_server(service: &str) -> Result<Vec<Candidate>> {
    let port = numeric_service(service).map_err(|source| Error::Resolution {
        endpoint: format!("*:{service}"),
        source,
    })?;
    Ok(vec![
        Candidate::stream(SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), port)),
        Candidate::stream(SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), port)),
    ])
}

/// Connect to `host:service`, trying each candidate in order.
pub fn connect_to(host: &str, service: &str) -> Result<TcpStream> {
    connect_with(host, service, ConnectOptions::default())
}

/// [`connect_to`] with explicit socket options.
pub fn connect_with(host: &str, service: &str, opts: ConnectOptions) -> Result<TcpStream> {
    let candidates = resolve_client(host, service)?;
    let attempts = candidates.len();

    let socket = first_success(&candidates, |cand| {
        let sock = cand.socket()?;
        sock.connect(&cand.addr)?;
        Ok(sock)
    })
    .map_err(|_| Error::Connect {
        endpoint: format!("{host}:{service}"),
        attempts,
    })?;

    if opts.nodelay {
        socket.set_nodelay(true)?;
    }
    let stream: TcpStream = socket.into();
    debug!(peer = ?stream.peer_addr().ok(), "connected");
    Ok(stream)
}

/// Bind and listen on `service`, trying each passive candidate in order.
///
/// SO_REUSEADDR is set before every bind attempt. If listen fails after a
/// successful bind, the bound socket is closed before the error is
/// reported.
pub fn listen_on(service: &str) -> Result<TcpListener> {
    let candidates = resolve_server(service)?;
    let endpoint = format!("*:{service}");

    let socket = first_success(&candidates, |cand| {
        let sock = cand.socket()?;
        sock.set_reuse_address(true)?;
        sock.bind(&cand.addr)?;
        Ok(sock)
    })
    .map_err(|last| Error::Listen {
        endpoint: endpoint.clone(),
        source: last.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no candidate address")
        }),
    })?;

    if let Err(source) = socket.listen(LISTEN_BACKLOG) {
        drop(socket); // close the bound descriptor before reporting
        return Err(Error::Listen { endpoint, source });
    }

    let listener: TcpListener = socket.into();
    debug!(addr = ?listener.local_addr().ok(), "listening");
    Ok(listener)
}

/// Walk candidates in order, returning the first attempt that succeeds.
///
/// Socket creation failures and connect/bind failures alike move on to the
/// next candidate; the failed attempt's socket is dropped either way. On
/// exhaustion the last error (if any attempt ran) is returned for
/// diagnostics.
fn first_success<T>(
    candidates: &[Candidate],
    mut attempt: impl FnMut(&Candidate) -> io::Result<T>,
) -> std::result::Result<T, Option<io::Error>> {
    let mut last_err = None;
    for cand in candidates {
        match attempt(cand) {
            Ok(value) => return Ok(value),
            Err(e) => {
                trace!(addr = ?cand.addr, error = %e, "candidate attempt failed");
                last_err = Some(e);
            }
        }
    }
    Err(last_err)
}

fn numeric_service(service: &str) -> io::Result<u16> {
    service.parse::<u16>().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("service '{service}' is not a numeric port"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_service_is_resolution_error() {
        let err = resolve_client("localhost", "http").unwrap_err();
        assert!(err.is_resolution());

        let err = resolve_server("echo").unwrap_err();
        assert!(err.is_resolution());
    }

    #[test]
    fn test_resolve_client_loopback() {
        let candidates = resolve_client("127.0.0.1", "9000").unwrap();
        assert_eq!(candidates.len(), 1);
        let addr = candidates[0].addr.as_socket().unwrap();
        assert_eq!(addr, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn test_resolve_server_wildcards() {
        let candidates = resolve_server("8080").unwrap();
        assert_eq!(candidates.len(), 2);
        let first = candidates[0].addr.as_socket().unwrap();
        let second = candidates[1].addr.as_socket().unwrap();
        assert!(first.is_ipv6());
        assert!(second.is_ipv4());
        assert_eq!(first.port(), 8080);
        assert_eq!(second.port(), 8080);
    }

    #[test]
    fn test_connect_refused_is_connect_error() {
        // Grab a port that nothing is listening on.
        let port = {
            let probe = TcpListener::bind("127.0.0.1:0").unwrap();
            probe.local_addr().unwrap().port()
        };

        let err = connect_to("127.0.0.1", &port.to_string()).unwrap_err();
        assert!(matches!(err, Error::Connect { attempts: 1, .. }));
        assert!(!err.is_resolution());
    }

    #[test]
    fn test_listen_on_ephemeral() {
        let listener = listen_on("0").unwrap();
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_listen_on_busy_port_is_listen_error() {
        let occupant = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupant.local_addr().unwrap().port();

        let err = listen_on(&port.to_string()).unwrap_err();
        assert!(matches!(err, Error::Listen { .. }));
    }

    #[test]
    fn test_connect_to_own_listener() {
        let listener = listen_on("0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = connect_with(
            "127.0.0.1",
            &port.to_string(),
            ConnectOptions { nodelay: true },
        )
        .unwrap();
        let (accepted, peer) = listener.accept().unwrap();
        assert_eq!(stream.local_addr().unwrap().port(), peer.port());
        drop(accepted);
    }
}
