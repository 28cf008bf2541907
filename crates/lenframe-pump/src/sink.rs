/// Where the pump surfaces what it sees.
///
/// The pump never prints; callers decide how payloads and notices are shown.
pub trait MessageSink {
    /// A payload decoded from the network.
    fn on_message(&mut self, payload: &[u8]);

    /// A local input line about to be sent (only when echo is enabled).
    fn on_echo(&mut self, _line: &str) {}

    /// A human-readable failure notice (turn-based mode).
    fn on_notice(&mut self, _notice: &str) {}
}

impl<S: MessageSink + ?Sized> MessageSink for &mut S {
    fn on_message(&mut self, payload: &[u8]) {
        (**self).on_message(payload);
    }

    fn on_echo(&mut self, line: &str) {
        (**self).on_echo(line);
    }

    fn on_notice(&mut self, notice: &str) {
        (**self).on_notice(notice);
    }
}
