use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

use crate::error::Result;

/// A bidirectional byte stream the duplex pump can own.
///
/// Besides `Read + Write`, the pump needs a second handle to the same
/// underlying socket for its reader thread, and a way to close both
/// directions so that a thread blocked in `read` wakes up.
pub trait Connection: Read + Write + Send + Sized + 'static {
    /// Create another handle to the same underlying stream.
    fn duplicate(&self) -> io::Result<Self>;

    /// Shut down both directions of the stream.
    ///
    /// Any read blocked on another handle returns end-of-stream.
    fn close(&self) -> io::Result<()>;
}

impl Connection for TcpStream {
    fn duplicate(&self) -> io::Result<Self> {
        self.try_clone()
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

#[cfg(unix)]
impl Connection for std::os::unix::net::UnixStream {
    fn duplicate(&self) -> io::Result<Self> {
        self.try_clone()
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// A connected stream: implements Read + Write.
///
/// This is the I/O type returned by [`TcpDialer`](crate::TcpDialer) and
/// [`TcpAcceptor`](crate::TcpAcceptor). On Unix it can also wrap a local
/// socket pair, which is handy for in-process peers.
pub struct NetStream {
    inner: NetStreamInner,
}

enum NetStreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for NetStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            NetStreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            NetStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for NetStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            NetStreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            NetStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            NetStreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            NetStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl NetStream {
    /// Wrap an already connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: NetStreamInner::Tcp(stream),
        }
    }

    /// Create a connected pair of local streams.
    #[cfg(unix)]
    pub fn pair() -> Result<(Self, Self)> {
        let (left, right) = std::os::unix::net::UnixStream::pair()?;
        Ok((
            Self {
                inner: NetStreamInner::Unix(left),
            },
            Self {
                inner: NetStreamInner::Unix(right),
            },
        ))
    }

    /// Address of the remote end, if this is a TCP stream.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        match &self.inner {
            NetStreamInner::Tcp(stream) => stream.peer_addr().ok(),
            #[cfg(unix)]
            NetStreamInner::Unix(_) => None,
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        Ok(self.duplicate()?)
    }

    /// Shut down both directions of the stream.
    pub fn shutdown(&self) -> Result<()> {
        Ok(self.close()?)
    }
}

impl Connection for NetStream {
    fn duplicate(&self) -> io::Result<Self> {
        let inner = match &self.inner {
            NetStreamInner::Tcp(stream) => NetStreamInner::Tcp(stream.try_clone()?),
            #[cfg(unix)]
            NetStreamInner::Unix(stream) => NetStreamInner::Unix(stream.try_clone()?),
        };
        Ok(Self { inner })
    }

    fn close(&self) -> io::Result<()> {
        match &self.inner {
            NetStreamInner::Tcp(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(unix)]
            NetStreamInner::Unix(stream) => stream.shutdown(Shutdown::Both),
        }
    }
}

impl std::fmt::Debug for NetStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            NetStreamInner::Tcp(stream) => f
                .debug_struct("NetStream")
                .field("type", &"tcp")
                .field("peer", &stream.peer_addr().ok())
                .finish(),
            #[cfg(unix)]
            NetStreamInner::Unix(_) => f.debug_struct("NetStream").field("type", &"unix").finish(),
        }
    }
}
