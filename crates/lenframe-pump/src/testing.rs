//! Test doubles shared by the pump tests.

use std::io::{self, Read};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::sink::MessageSink;

/// Records everything the pump surfaces.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub messages: Vec<Vec<u8>>,
    pub echoes: Vec<String>,
    pub notices: Vec<String>,
}

impl MessageSink for RecordingSink {
    fn on_message(&mut self, payload: &[u8]) {
        self.messages.push(payload.to_vec());
    }

    fn on_echo(&mut self, line: &str) {
        self.echoes.push(line.to_string());
    }

    fn on_notice(&mut self, notice: &str) {
        self.notices.push(notice.to_string());
    }
}

/// Local input fed from the test thread.
///
/// `read` blocks until the test sends more bytes, and reports end-of-input
/// once every sender is dropped.
pub(crate) struct ChannelInput {
    chunks: Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl ChannelInput {
    pub fn new() -> (Self, Sender<Vec<u8>>) {
        let (tx, rx) = unbounded();
        (
            Self {
                chunks: rx,
                pending: Vec::new(),
            },
            tx,
        )
    }
}

impl Read for ChannelInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.chunks.recv() {
                Ok(chunk) => self.pending = chunk,
                Err(_) => return Ok(0),
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}
