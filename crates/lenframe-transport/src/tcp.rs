use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::NetStream;

/// Places outbound TCP calls with a connect deadline.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    timeout: Duration,
}

impl TcpDialer {
    /// Default connect deadline.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a dialer with an explicit connect deadline.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The connect deadline applied to each resolved address.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `addr` (`host:port`) and connect to the first address that answers.
    pub fn connect(&self, addr: &str) -> Result<NetStream> {
        let candidates: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|e| TransportError::Resolve {
                addr: addr.to_string(),
                source: e,
            })?
            .collect();

        if candidates.is_empty() {
            return Err(TransportError::Resolve {
                addr: addr.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no addresses resolved",
                ),
            });
        }

        let mut last_err = None;
        for candidate in candidates {
            debug!(%candidate, timeout = ?self.timeout, "dialing");
            match TcpStream::connect_timeout(&candidate, self.timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    info!(%candidate, "connected");
                    return Ok(NetStream::from_tcp(stream));
                }
                Err(err) => {
                    debug!(%candidate, error = %err, "dial attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(TransportError::Connect {
            addr: addr.to_string(),
            source: last_err.unwrap_or_else(|| std::io::Error::other("no address attempted")),
        })
    }
}

impl Default for TcpDialer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

/// Listens for inbound TCP calls.
pub struct TcpAcceptor {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpAcceptor {
    /// Bind and listen on `addr` (`ip:port`; an empty ip binds all interfaces).
    pub fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr()?;

        info!(%local_addr, "listening on tcp socket");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<(NetStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        stream.set_nodelay(true)?;
        debug!(%peer, "accepted connection");
        Ok((NetStream::from_tcp(stream), peer))
    }

    /// The bound address (useful after binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl std::fmt::Debug for TcpAcceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpAcceptor")
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::thread;

    use super::*;

    #[test]
    fn bind_accept_connect_roundtrip() {
        let acceptor = TcpAcceptor::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = acceptor.local_addr().to_string();

        let server = thread::spawn(move || {
            let (mut stream, peer) = acceptor.accept().expect("accept should succeed");
            assert!(peer.ip().is_loopback());
            let mut buf = [0u8; 5];
            stream.read_exact(&mut buf).unwrap();
            stream.write_all(&buf).unwrap();
        });

        let mut client = TcpDialer::default()
            .connect(&addr)
            .expect("connect should succeed");
        assert!(client.peer_addr().is_some());
        client.write_all(b"hello").unwrap();
        let mut echoed = [0u8; 5];
        client.read_exact(&mut echoed).unwrap();
        assert_eq!(&echoed, b"hello");

        server.join().unwrap();
    }

    #[test]
    fn connect_refused_reports_address() {
        let addr = {
            let acceptor = TcpAcceptor::bind("127.0.0.1:0").unwrap();
            acceptor.local_addr().to_string()
        };

        let err = TcpDialer::new(Duration::from_secs(2))
            .connect(&addr)
            .unwrap_err();
        match err {
            TransportError::Connect { addr: reported, .. } => assert_eq!(reported, addr),
            other => panic!("expected connect error, got {other:?}"),
        }
    }

    #[test]
    fn unresolvable_address_is_resolve_error() {
        let err = TcpDialer::default().connect("no-port-here").unwrap_err();
        assert!(matches!(err, TransportError::Resolve { .. }));
    }

    #[test]
    fn bind_conflict_is_bind_error() {
        let first = TcpAcceptor::bind("127.0.0.1:0").unwrap();
        let addr = first.local_addr().to_string();
        let err = TcpAcceptor::bind(&addr).unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));
    }

    #[test]
    fn default_timeout_is_one_minute() {
        assert_eq!(TcpDialer::default().timeout(), Duration::from_secs(60));
    }
}
