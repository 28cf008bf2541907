use lenframe_transport::TcpAcceptor;

use crate::cmd::session::{self, SessionOptions};
use crate::cmd::ServerArgs;
use crate::config::{socket_addr, GlobalOverrides, Settings};
use crate::exit::{transport_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: ServerArgs, overrides: GlobalOverrides, format: OutputFormat) -> CliResult<i32> {
    let settings = Settings::resolve(overrides)?;
    let header = settings.header()?;

    let ip = args
        .ip
        .or_else(|| settings.file.ip.clone())
        .unwrap_or_default();
    let acceptor = TcpAcceptor::bind(&socket_addr(&ip, settings.port))
        .map_err(|err| transport_error("bind failed", err))?;
    println!("Listening on: {}", acceptor.local_addr());

    let (stream, peer) = acceptor
        .accept()
        .map_err(|err| transport_error("accept failed", err))?;
    println!("Got connection from: {peer}");
    drop(acceptor);

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
