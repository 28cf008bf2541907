use lenframe_transport::TcpDialer;
use tracing::info;

use crate::cmd::session::{self, SessionOptions};
use crate::cmd::ClientArgs;
use crate::config::{parse_duration, socket_addr, GlobalOverrides, Settings, DEFAULT_HOST};
use crate::exit::{transport_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: ClientArgs, overrides: GlobalOverrides, format: OutputFormat) -> CliResult<i32> {
    let settings = Settings::resolve(overrides)?;
    let header = settings.header()?;
    let timeout = parse_duration(&args.connect_timeout)?;

    let host = args
        .host
        .or_else(|| settings.file.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let addr = socket_addr(&host, settings.port);

    let stream = TcpDialer::new(timeout)
        .connect(&addr)
        .map_err(|err| transport_error("connect failed", err))?;
    info!(%addr, %header, "connected");

    session::run(
        stream,
        SessionOptions {
            mode: args.mode,
            header,
            echo: settings.echo,
            message: &args.message,
            listen_first: args.listen,
            format,
        },
    )
}
