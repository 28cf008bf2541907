mod cmd;
mod config;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Command;
use crate::config::GlobalOverrides;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "lenframe",
    version,
    about = "Length-prefixed TCP test client and server"
)]
struct Cli {
    /// Port to connect to or listen on [default: 8080].
    #[arg(long, short = 'p', env = "LENFRAME_PORT", global = true)]
    port: Option<u16>,

    /// Length prefix width in bytes (2 or 4) [default: 2].
    #[arg(long, value_name = "BYTES", env = "LENFRAME_HEADER", global = true)]
    header: Option<u64>,

    /// Echo each local line to stdout before sending it.
    #[arg(long, env = "LENFRAME_ECHO", global = true)]
    echo: bool,

    /// Config file [default: $HOME/.lenframe.json].
    #[arg(long, value_name = "PATH", env = "LENFRAME_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format for received messages.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let overrides = GlobalOverrides {
        port: cli.port,
        header: cli.header,
        echo: cli.echo,
        config: cli.config,
    };
    let result = cmd::run(cli.command, overrides, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.code);
        }
    }
}
