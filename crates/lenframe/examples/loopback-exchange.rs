//! One request/reply exchange over loopback TCP.
//!
//! Run with: `cargo run -p lenframe --example loopback-exchange`

use std::thread;

use lenframe::frame::HeaderKind;
use lenframe::pump::{run_exchange, ExchangeConfig, MessageSink};
use lenframe::transport::{TcpAcceptor, TcpDialer};

struct Printer(&'static str);

impl MessageSink for Printer {
    fn on_message(&mut self, payload: &[u8]) {
        println!("{}: {:?}", self.0, String::from_utf8_lossy(payload));
    }

    fn on_notice(&mut self, notice: &str) {
        eprintln!("{}: {notice}", self.0);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let header = HeaderKind::TwoByteUnsigned;
    let acceptor = TcpAcceptor::bind("127.0.0.1:0")?;
    let addr = acceptor.local_addr().to_string();

    let server = thread::spawn(move || -> Result<(), lenframe::pump::PumpError> {
        let (stream, _peer) = acceptor.accept()?;
        run_exchange(
            stream,
            &mut Printer("server"),
            &ExchangeConfig::new(header, true, "Got it!"),
        )?;
        Ok(())
    });

    let stream = TcpDialer::default().connect(&addr)?;
    run_exchange(
        stream,
        &mut Printer("client"),
        &ExchangeConfig::new(header, false, "Hello World!"),
    )?;

    server.join().map_err(|_| "server thread panicked")??;
    Ok(())
}
