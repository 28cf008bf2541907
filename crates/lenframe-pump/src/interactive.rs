use std::io::{self, BufRead};
use std::thread;

use bytes::Bytes;
use crossbeam::channel::{bounded, select, Receiver};
use lenframe_frame::{FrameConfig, FrameError, FrameReader, FrameWriter};
use lenframe_transport::Connection;
use tracing::{debug, info, warn};

use crate::config::PumpConfig;
use crate::error::{PumpError, Result};
use crate::guard::ConnectionGuard;
use crate::sink::MessageSink;

/// Why an interactive run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// The peer closed the connection on a frame boundary.
    RemoteClosed,
    /// Local input reached its end.
    LocalClosed,
}

enum NetEvent {
    Frame(Bytes),
    Failed(FrameError),
}

enum LocalEvent {
    Line(Vec<u8>),
    Failed(io::Error),
}

/// Relay frames and local lines over `conn` until either side closes.
///
/// Inbound payloads go to `sink.on_message`. Each local line is echoed to
/// `sink.on_echo` when `config.echo` is set and then sent as one frame.
/// Only this loop writes to the connection, one event per iteration.
///
/// The connection is shut down on return, which releases the network
/// reader thread. The local reader thread is never waited for: if it is
/// blocked on input it exits on its next line, when it finds the pump gone.
pub fn run_interactive<C, L, S>(
    conn: C,
    input: L,
    sink: &mut S,
    config: &PumpConfig,
) -> Result<PumpOutcome>
where
    C: Connection,
    L: BufRead + Send + 'static,
    S: MessageSink + ?Sized,
{
    let mut guard = ConnectionGuard::new(conn);

    if !config.header.is_known() {
        return Err(FrameError::UnknownHeader.into());
    }

    let reader_half = guard.get_ref().duplicate().map_err(PumpError::Setup)?;
    let net_events = spawn_net_reader(reader_half, config)?;
    let local_events = spawn_line_reader(input)?;

    info!(header = %config.header, echo = config.echo, "pump started");
    let mut writer = FrameWriter::new(guard.get_mut(), config.header);

    loop {
        select! {
            recv(net_events) -> event => match event {
                Ok(NetEvent::Frame(payload)) => {
                    debug!(size = payload.len(), "frame received");
                    sink.on_message(&payload);
                }
                Ok(NetEvent::Failed(err)) => {
                    warn!(error = %err, "network read failed");
                    return Err(PumpError::Receive(err));
                }
                Err(_) => {
                    info!("remote side closed");
                    return Ok(PumpOutcome::RemoteClosed);
                }
            },
            recv(local_events) -> event => match event {
                Ok(LocalEvent::Line(line)) => {
                    if config.echo {
                        sink.on_echo(&String::from_utf8_lossy(&line));
                    }
                    if let Err(err) = writer.send(&line) {
                        warn!(error = %err, "sending local line failed");
                        return Err(err.into());
                    }
                    debug!(size = line.len(), "frame sent");
                }
                Ok(LocalEvent::Failed(err)) => {
                    warn!(error = %err, "local input failed");
                    return Err(PumpError::Input(err));
                }
                Err(_) => {
                    info!("local input closed");
                    return Ok(PumpOutcome::LocalClosed);
                }
            },
        }
    }
}

fn spawn_net_reader<C: Connection>(stream: C, config: &PumpConfig) -> Result<Receiver<NetEvent>> {
    let (tx, rx) = bounded(0);
    let frame_config = FrameConfig {
        max_payload_size: config.max_payload_size,
        ..FrameConfig::new(config.header)
    };

    thread::Builder::new()
        .name("lenframe-net-reader".to_string())
        .spawn(move || {
            let mut reader = FrameReader::with_config(stream, frame_config);
            loop {
                match reader.read_frame() {
                    Ok(payload) => {
                        if tx.send(NetEvent::Frame(payload)).is_err() {
                            return;
                        }
                    }
                    Err(FrameError::ConnectionClosed) => return,
                    Err(err) => {
                        let _ = tx.send(NetEvent::Failed(err));
                        return;
                    }
                }
            }
        })
        .map_err(PumpError::Setup)?;

    Ok(rx)
}

fn spawn_line_reader<L: BufRead + Send + 'static>(mut input: L) -> Result<Receiver<LocalEvent>> {
    let (tx, rx) = bounded(0);

    thread::Builder::new()
        .name("lenframe-line-reader".to_string())
        .spawn(move || loop {
            let mut line = Vec::new();
            match input.read_until(b'\n', &mut line) {
                Ok(0) => return,
                Ok(_) => {
                    strip_line_ending(&mut line);
                    if tx.send(LocalEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    let _ = tx.send(LocalEvent::Failed(err));
                    return;
                }
            }
        })
        .map_err(PumpError::Setup)?;

    Ok(rx)
}

fn strip_line_ending(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::{BufReader, Cursor, Read, Write};
    use std::net::Shutdown;
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    use lenframe_frame::{decode_message, encode_message, HeaderKind};
    use lenframe_transport::NetStream;

    use super::*;
    use crate::testing::{ChannelInput, RecordingSink};

    const WAIT: Duration = Duration::from_secs(5);

    type PumpRun = (Result<PumpOutcome>, RecordingSink);

    fn spawn_pump<C: Connection, L: BufRead + Send + 'static>(
        conn: C,
        input: L,
        config: PumpConfig,
    ) -> Receiver<PumpRun> {
        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let mut sink = RecordingSink::default();
            let outcome = run_interactive(conn, input, &mut sink, &config);
            let _ = tx.send((outcome, sink));
        });
        rx
    }

    #[test]
    fn strips_lf_and_crlf() {
        let mut line = b"hello\r\n".to_vec();
        strip_line_ending(&mut line);
        assert_eq!(line, b"hello");

        let mut line = b"hello\n".to_vec();
        strip_line_ending(&mut line);
        assert_eq!(line, b"hello");

        let mut line = b"no newline".to_vec();
        strip_line_ending(&mut line);
        assert_eq!(line, b"no newline");
    }

    #[test]
    fn remote_frame_first_then_two_lines() {
        let header = HeaderKind::TwoByteUnsigned;
        let (local, mut remote) = UnixStream::pair().unwrap();
        let (input, lines) = ChannelInput::new();

        let done = spawn_pump(local, BufReader::new(input), PumpConfig::new(header));

        encode_message(&mut remote, b"from the network", header).unwrap();
        lines.send(b"first\nsecond\n".to_vec()).unwrap();

        assert_eq!(decode_message(&mut remote, header).unwrap().as_ref(), b"first");
        assert_eq!(decode_message(&mut remote, header).unwrap().as_ref(), b"second");
        remote.shutdown(Shutdown::Write).unwrap();

        let (outcome, sink) = done.recv_timeout(WAIT).expect("pump should finish");
        assert_eq!(outcome.unwrap(), PumpOutcome::RemoteClosed);
        assert_eq!(sink.messages, vec![b"from the network".to_vec()]);

        // Exactly two frames went out before the pump closed its side.
        assert!(decode_message(&mut remote, header)
            .unwrap_err()
            .is_clean_close());
        drop(lines);
    }

    #[test]
    fn two_lines_first_then_remote_frame() {
        let header = HeaderKind::FourByteUnsigned;
        let (local, mut remote) = UnixStream::pair().unwrap();
        let (input, lines) = ChannelInput::new();

        let done = spawn_pump(local, BufReader::new(input), PumpConfig::new(header));

        lines.send(b"first\n".to_vec()).unwrap();
        lines.send(b"second\n".to_vec()).unwrap();
        assert_eq!(decode_message(&mut remote, header).unwrap().as_ref(), b"first");
        assert_eq!(decode_message(&mut remote, header).unwrap().as_ref(), b"second");

        encode_message(&mut remote, b"reply", header).unwrap();
        remote.shutdown(Shutdown::Write).unwrap();

        let (outcome, sink) = done.recv_timeout(WAIT).expect("pump should finish");
        assert_eq!(outcome.unwrap(), PumpOutcome::RemoteClosed);
        assert_eq!(sink.messages, vec![b"reply".to_vec()]);
        assert!(decode_message(&mut remote, header)
            .unwrap_err()
            .is_clean_close());
        drop(lines);
    }

    #[test]
    fn remote_close_ends_pump_while_input_blocked() {
        let (local, remote) = NetStream::pair().unwrap();
        let (input, lines) = ChannelInput::new();

        let done = spawn_pump(local, BufReader::new(input), PumpConfig::default());
        drop(remote);

        let (outcome, sink) = done
            .recv_timeout(WAIT)
            .expect("pump must not wait for blocked input");
        assert_eq!(outcome.unwrap(), PumpOutcome::RemoteClosed);
        assert!(sink.messages.is_empty());
        // The input source is still open here.
        drop(lines);
    }

    #[test]
    fn local_eof_closes_connection() {
        let header = HeaderKind::TwoByteUnsigned;
        let (local, mut remote) = NetStream::pair().unwrap();

        let done = spawn_pump(local, Cursor::new(b"only line\n".to_vec()), PumpConfig::new(header));

        assert_eq!(
            decode_message(&mut remote, header).unwrap().as_ref(),
            b"only line"
        );
        let (outcome, _sink) = done.recv_timeout(WAIT).expect("pump should finish");
        assert_eq!(outcome.unwrap(), PumpOutcome::LocalClosed);

        assert!(decode_message(&mut remote, header)
            .unwrap_err()
            .is_clean_close());
    }

    #[test]
    fn echo_surfaces_lines_before_sending() {
        let header = HeaderKind::TwoByteUnsigned;
        let (local, mut remote) = NetStream::pair().unwrap();
        let config = PumpConfig {
            echo: true,
            ..PumpConfig::new(header)
        };

        let done = spawn_pump(local, Cursor::new(b"a\r\nb\n".to_vec()), config);

        assert_eq!(decode_message(&mut remote, header).unwrap().as_ref(), b"a");
        assert_eq!(decode_message(&mut remote, header).unwrap().as_ref(), b"b");
        let (outcome, sink) = done.recv_timeout(WAIT).expect("pump should finish");
        assert_eq!(outcome.unwrap(), PumpOutcome::LocalClosed);
        assert_eq!(sink.echoes, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn truncated_inbound_frame_is_receive_error() {
        let (local, mut remote) = NetStream::pair().unwrap();
        let (input, lines) = ChannelInput::new();

        let done = spawn_pump(local, BufReader::new(input), PumpConfig::default());
        remote.write_all(&[0x00, 0x10, b'p', b'a', b'r']).unwrap();
        drop(remote);

        let (outcome, sink) = done.recv_timeout(WAIT).expect("pump should finish");
        assert!(matches!(
            outcome.unwrap_err(),
            PumpError::Receive(FrameError::Truncated {
                expected: 16,
                received: 3
            })
        ));
        assert!(sink.messages.is_empty());
        drop(lines);
    }

    #[test]
    fn oversized_line_is_frame_error() {
        let (local, _remote) = NetStream::pair().unwrap();
        let mut long = vec![b'x'; 70_000];
        long.push(b'\n');

        let done = spawn_pump(local, Cursor::new(long), PumpConfig::default());
        let (outcome, _sink) = done.recv_timeout(WAIT).expect("pump should finish");
        assert!(matches!(
            outcome.unwrap_err(),
            PumpError::Frame(FrameError::ValueOverflow { size: 70_000, .. })
        ));
    }

    #[test]
    fn failed_write_ends_pump_with_frame_error() {
        let (local, remote) = UnixStream::pair().unwrap();
        let conn = BrokenWriter { inner: local };

        let done = spawn_pump(conn, Cursor::new(b"doomed\n".to_vec()), PumpConfig::default());
        let (outcome, sink) = done.recv_timeout(WAIT).expect("pump should finish");

        assert!(matches!(
            outcome.unwrap_err(),
            PumpError::Frame(FrameError::Write(ref e)) if e.kind() == io::ErrorKind::BrokenPipe
        ));
        assert!(sink.messages.is_empty());
        drop(remote);
    }

    /// Reads from a live socket; every write fails as if the peer went away.
    struct BrokenWriter {
        inner: UnixStream,
    }

    impl Read for BrokenWriter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Connection for BrokenWriter {
        fn duplicate(&self) -> io::Result<Self> {
            Ok(Self {
                inner: self.inner.try_clone()?,
            })
        }

        fn close(&self) -> io::Result<()> {
            self.inner.shutdown(Shutdown::Both)
        }
    }

    #[test]
    fn unknown_header_rejected_and_connection_closed() {
        let (local, mut remote) = NetStream::pair().unwrap();
        let mut sink = RecordingSink::default();

        let err = run_interactive(
            local,
            Cursor::new(b"never sent\n".to_vec()),
            &mut sink,
            &PumpConfig::new(HeaderKind::Unknown),
        )
        .unwrap_err();
        assert!(matches!(err, PumpError::Frame(FrameError::UnknownHeader)));

        let mut buf = [0u8; 1];
        assert_eq!(remote.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn many_lines_arrive_in_order() {
        let header = HeaderKind::TwoByteUnsigned;
        let (local, mut remote) = NetStream::pair().unwrap();
        let script: String = (0..50).map(|i| format!("line-{i}\n")).collect();

        let done = spawn_pump(local, Cursor::new(script.into_bytes()), PumpConfig::new(header));

        for i in 0..50 {
            let payload = decode_message(&mut remote, header).unwrap();
            assert_eq!(payload.as_ref(), format!("line-{i}").as_bytes());
        }
        let (outcome, _sink) = done.recv_timeout(WAIT).expect("pump should finish");
        assert_eq!(outcome.unwrap(), PumpOutcome::LocalClosed);
    }
}
