use std::io;

use lenframe_transport::Connection;
use tracing::debug;

/// Owns a connection and closes it exactly once.
///
/// Closing happens on the first explicit [`close`](Self::close) or on drop,
/// whichever comes first, so every exit path of a pump run releases the
/// connection.
pub struct ConnectionGuard<C: Connection> {
    conn: C,
    closed: bool,
}

impl<C: Connection> ConnectionGuard<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            closed: false,
        }
    }

    pub fn get_ref(&self) -> &C {
        &self.conn
    }

    pub fn get_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Shut the connection down. Later calls are no-ops.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.conn.close()
    }
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            debug!(error = %err, "connection close reported an error");
        }
    }
}
