//! Connection plumbing for lenframe.
//!
//! Provides the byte-stream layer everything else sits on:
//! - [`TcpDialer`] / [`TcpAcceptor`] to establish TCP connections
//! - [`NetStream`], the connected stream handed to the frame and pump layers
//! - [`Connection`], the minimal capability set the duplex pump needs
//!   (a second handle for the reader thread, and a shutdown that unblocks it)

pub mod error;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use tcp::{TcpAcceptor, TcpDialer};
pub use traits::{Connection, NetStream};
