use clap::{ArgAction, Args, Subcommand, ValueEnum};

use crate::config::GlobalOverrides;
use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod client;
pub mod server;
pub mod session;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to a server and exchange messages.
    Client(ClientArgs),
    /// Accept one client and exchange messages.
    Server(ServerArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, overrides: GlobalOverrides, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Client(args) => client::run(args, overrides, format),
        Command::Server(args) => server::run(args, overrides, format),
        Command::Version(args) => version::run(args),
    }
}

/// How a connected session behaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Relay stdin lines and received frames until either side closes.
    #[default]
    Interactive,
    /// Send one message and read one reply, then close.
    Exchange,
}

#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Host to connect to [default: localhost].
    #[arg(long, env = "LENFRAME_HOST")]
    pub host: Option<String>,
    /// Message sent in exchange mode.
    #[arg(long, short = 'm', default_value = "Test message sent from client")]
    pub message: String,
    /// In exchange mode, receive before sending.
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub listen: bool,
    #[arg(long, value_enum, default_value_t = Mode::Interactive)]
    pub mode: Mode,
    /// Dial deadline (e.g. 60s, 500ms).
    #[arg(long, default_value = "60s")]
    pub connect_timeout: String,
}

#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Address to bind [default: all interfaces].
    #[arg(long, env = "LENFRAME_IP")]
    pub ip: Option<String>,
    /// Message sent in exchange mode.
    #[arg(long, short = 'm', default_value = "Got it!")]
    pub message: String,
    /// In exchange mode, receive before sending.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub listen: bool,
    #[arg(long, value_enum, default_value_t = Mode::Interactive)]
    pub mode: Mode,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
