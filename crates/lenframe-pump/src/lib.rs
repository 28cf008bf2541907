//! Duplex message pump.
//!
//! Owns an established connection and relays messages between it and a
//! local line source until either side closes:
//! - [`run_interactive`] multiplexes network frames and local lines
//!   continuously, one event at a time
//! - [`run_exchange`] performs a single send/receive turn in either order
//!
//! In both modes the connection is closed exactly once on every exit path.

pub mod config;
pub mod error;
pub mod exchange;
pub mod guard;
pub mod interactive;
pub mod sink;

pub use config::{ExchangeConfig, PumpConfig};
pub use error::{PumpError, Result};
pub use exchange::{run_exchange, ExchangeState};
pub use guard::ConnectionGuard;
pub use interactive::{run_interactive, PumpOutcome};
pub use sink::MessageSink;

#[cfg(test)]
pub(crate) mod testing;
