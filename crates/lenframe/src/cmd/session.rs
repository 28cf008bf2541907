use std::io::{self, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lenframe_frame::HeaderKind;
use lenframe_pump::{run_exchange, run_interactive, ExchangeConfig, PumpConfig};
use lenframe_transport::NetStream;
use tracing::{debug, info};

use crate::cmd::Mode;
use crate::exit::{pump_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{ConsoleSink, OutputFormat};

/// Everything a connected session needs besides the stream.
pub struct SessionOptions<'a> {
    pub mode: Mode,
    pub header: HeaderKind,
    pub echo: bool,
    pub message: &'a str,
    pub listen_first: bool,
    pub format: OutputFormat,
}

/// Run the selected mode on an established connection.
///
/// Ctrl-C shuts the connection down; a session ended that way exits
/// successfully whatever the pump reports.
pub fn run(stream: NetStream, opts: SessionOptions<'_>) -> CliResult<i32> {
    let interrupted = install_interrupt_handler(&stream)?;
    let mut sink = ConsoleSink::new(opts.format);

    let result = match opts.mode {
        Mode::Interactive => {
            let config = PumpConfig {
                echo: opts.echo,
                ..PumpConfig::new(opts.header)
            };
            let input = BufReader::new(io::stdin());
            run_interactive(stream, input, &mut sink, &config).map(|outcome| {
                info!(?outcome, "session ended");
            })
        }
        Mode::Exchange => {
            let config = ExchangeConfig::new(opts.header, opts.listen_first, opts.message);
            run_exchange(stream, &mut sink, &config).map(|reply| {
                debug!(size = reply.len(), "exchange complete");
            })
        }
    };

    match result {
        Ok(()) => Ok(SUCCESS),
        Err(err) if interrupted.load(Ordering::SeqCst) => {
            debug!(error = %err, "session interrupted");
            Ok(SUCCESS)
        }
        Err(err) => Err(pump_error("session failed", err)),
    }
}

fn install_interrupt_handler(stream: &NetStream) -> CliResult<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    let handle = stream
        .try_clone()
        .map_err(|err| transport_error("failed to clone connection", err))?;

    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        if let Err(err) = handle.shutdown() {
            debug!(error = %err, "shutdown on interrupt failed");
        }
    })
    .map_err(|err| CliError::new(INTERNAL, format!("failed to install Ctrl-C handler: {err}")))?;

    Ok(interrupted)
}
