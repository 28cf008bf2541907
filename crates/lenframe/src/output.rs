use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lenframe_pump::MessageSink;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Where a printed event came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// A frame received from the peer.
    Net,
    /// A local line, echoed before sending.
    Stdio,
    /// A status notice from the pump.
    Notice,
}

impl Source {
    fn label(self) -> &'static str {
        match self {
            Source::Net => "net",
            Source::Stdio => "stdio",
            Source::Notice => "notice",
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    source: Source,
    size: usize,
    payload: &'a str,
    timestamp: String,
}

/// Render one event in the given format.
pub fn render_event(source: Source, payload: &[u8], format: OutputFormat) -> Vec<u8> {
    let text = String::from_utf8_lossy(payload);
    match format {
        OutputFormat::Json => {
            let out = EventOutput {
                source,
                size: payload.len(),
                payload: &text,
                timestamp: now_unix_seconds(),
            };
            let mut line = serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string());
            line.push('\n');
            line.into_bytes()
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SOURCE", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    source.label().to_string(),
                    payload.len().to_string(),
                    text.into_owned(),
                ]);
            format!("{table}\n").into_bytes()
        }
        OutputFormat::Pretty => match source {
            Source::Notice => format!("{text}\n").into_bytes(),
            _ => format!("{}>{:?}\n", source.label(), text).into_bytes(),
        },
        OutputFormat::Raw => payload.to_vec(),
    }
}

/// Sink that prints pump events to stdout.
pub struct ConsoleSink {
    format: OutputFormat,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn emit(&self, source: Source, payload: &[u8]) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(&render_event(source, payload, self.format));
        let _ = out.flush();
    }
}

impl MessageSink for ConsoleSink {
    fn on_message(&mut self, payload: &[u8]) {
        self.emit(Source::Net, payload);
    }

    fn on_echo(&mut self, line: &str) {
        self.emit(Source::Stdio, line.as_bytes());
    }

    fn on_notice(&mut self, notice: &str) {
        if self.format == OutputFormat::Raw {
            eprintln!("{notice}");
        } else {
            self.emit(Source::Notice, notice.as_bytes());
        }
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_text(source: Source, payload: &[u8], format: OutputFormat) -> String {
        String::from_utf8(render_event(source, payload, format)).unwrap()
    }

    #[test]
    fn pretty_quotes_payloads() {
        assert_eq!(
            render_text(Source::Net, b"Got it!", OutputFormat::Pretty),
            "net>\"Got it!\"\n"
        );
        assert_eq!(
            render_text(Source::Stdio, b"tab\there", OutputFormat::Pretty),
            "stdio>\"tab\\there\"\n"
        );
    }

    #[test]
    fn pretty_notice_is_plain() {
        assert_eq!(
            render_text(Source::Notice, b"Failed to receive: connection closed", OutputFormat::Pretty),
            "Failed to receive: connection closed\n"
        );
    }

    #[test]
    fn json_event_fields() {
        let line = render_text(Source::Net, b"hello", OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["source"], "net");
        assert_eq!(value["size"], 5);
        assert_eq!(value["payload"], "hello");
    }

    #[test]
    fn raw_is_verbatim() {
        let payload = [0x00, 0xff, b'x'];
        assert_eq!(render_event(Source::Net, &payload, OutputFormat::Raw), payload);
    }

    #[test]
    fn table_has_header_and_row() {
        let table = render_text(Source::Stdio, b"line", OutputFormat::Table);
        assert!(table.contains("SOURCE"));
        assert!(table.contains("stdio"));
        assert!(table.contains("line"));
    }
}
