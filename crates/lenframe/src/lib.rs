//! Length-prefixed TCP messaging.
//!
//! lenframe frames messages with a 2- or 4-byte big-endian length prefix and
//! relays them between a TCP connection and a local line source.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP dial/accept and the connection abstraction
//! - [`frame`]: the length-prefix codec
//! - [`pump`]: interactive and turn-based message pumps

/// Re-export transport types.
pub mod transport {
    pub use lenframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use lenframe_frame::*;
}

/// Re-export pump types.
pub mod pump {
    pub use lenframe_pump::*;
}
