use bytes::Bytes;
use lenframe_frame::{decode_message, encode_message, FrameError};
use lenframe_transport::Connection;
use tracing::{debug, info, warn};

use crate::config::ExchangeConfig;
use crate::error::{PumpError, Result};
use crate::guard::ConnectionGuard;
use crate::sink::MessageSink;

/// Observable states of a turn-based exchange.
///
/// `Start → {AwaitReceive | AwaitSend} → Exchanged → Closed`; any error
/// jumps straight to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Start,
    AwaitReceive,
    AwaitSend,
    Exchanged,
    Closed,
}

enum Step {
    Start,
    AwaitSend { reply: Option<Bytes> },
    AwaitReceive { sent: bool },
    Exchanged(Bytes),
}

impl Step {
    fn state(&self) -> ExchangeState {
        match self {
            Step::Start => ExchangeState::Start,
            Step::AwaitSend { .. } => ExchangeState::AwaitSend,
            Step::AwaitReceive { .. } => ExchangeState::AwaitReceive,
            Step::Exchanged(_) => ExchangeState::Exchanged,
        }
    }
}

/// Send one message and receive one frame, in the configured order.
///
/// With `listen_first` unset the configured message goes out first and one
/// reply is read; with it set, one frame is read first and the message is
/// sent as the reply. Nothing is retried: the first failure is reported to
/// `sink.on_notice` and returned. The received payload is surfaced through
/// `sink.on_message` and also returned.
pub fn run_exchange<C, S>(conn: C, sink: &mut S, config: &ExchangeConfig) -> Result<Bytes>
where
    C: Connection,
    S: MessageSink + ?Sized,
{
    let mut guard = ConnectionGuard::new(conn);
    let mut step = Step::Start;

    loop {
        debug!(state = ?step.state(), "exchange step");

        step = match step {
            Step::Start => {
                if !config.header.is_known() {
                    sink.on_notice("Unknown header type");
                    return Err(FrameError::UnknownHeader.into());
                }
                if config.listen_first {
                    Step::AwaitReceive { sent: false }
                } else {
                    Step::AwaitSend { reply: None }
                }
            }
            Step::AwaitSend { reply } => {
                if let Err(err) = encode_message(
                    guard.get_mut(),
                    config.message.as_bytes(),
                    config.header,
                ) {
                    warn!(error = %err, state = ?ExchangeState::AwaitSend, "exchange aborted");
                    sink.on_notice(&format!("Failed to send: {err}"));
                    return Err(err.into());
                }
                info!(size = config.message.len(), "message sent");
                match reply {
                    Some(payload) => Step::Exchanged(payload),
                    None => Step::AwaitReceive { sent: true },
                }
            }
            Step::AwaitReceive { sent } => {
                let payload = match decode_message(guard.get_mut(), config.header) {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!(error = %err, state = ?ExchangeState::AwaitReceive, "exchange aborted");
                        sink.on_notice(&format!("Failed to receive: {err}"));
                        return Err(PumpError::Receive(err));
                    }
                };
                info!(size = payload.len(), "message received");
                sink.on_message(&payload);
                if sent {
                    Step::Exchanged(payload)
                } else {
                    Step::AwaitSend {
                        reply: Some(payload),
                    }
                }
            }
            Step::Exchanged(payload) => {
                if let Err(err) = guard.close() {
                    debug!(error = %err, "connection close reported an error");
                }
                debug!(state = ?ExchangeState::Closed, "exchange step");
                return Ok(payload);
            }
        };
    }
}
