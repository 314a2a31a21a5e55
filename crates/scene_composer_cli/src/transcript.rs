//! Timestamped transcript printing.

use std::io::Write;

use scene_composer::{HostUi, Speaker};
use time::macros::format_description;
use time::OffsetDateTime;

/// Formats one transcript line as `[HH:MM:SS] Speaker: text`.
pub fn format_line(timestamp: OffsetDateTime, from: Speaker, text: &str) -> String {
    let clock = timestamp
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| "--:--:--".to_string());
    format!("[{clock}] {from}: {text}")
}

/// [`HostUi`] that writes transcript lines to any writer.
pub struct TranscriptHost<W: Write> {
    out: W,
    apply_available: bool,
}

impl<W: Write> TranscriptHost<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            apply_available: false,
        }
    }

    pub fn apply_available(&self) -> bool {
        self.apply_available
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(error) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!(%error, "failed to write transcript line");
        }
    }
}

impl<W: Write> HostUi for TranscriptHost<W> {
    fn on_message(&mut self, from: Speaker, text: &str) {
        let line = format_line(OffsetDateTime::now_utc(), from, text);
        self.write_line(&line);
    }

    fn on_apply_availability(&mut self, available: bool) {
        if available && !self.apply_available {
            self.write_line("(type /apply to write these changes)");
        }
        self.apply_available = available;
    }

    fn on_scripts_found(&mut self, count: usize) {
        tracing::debug!(count, "scripts found in response");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn lines_carry_clock_and_speaker() {
        let at = datetime!(2024-03-01 09:05:07 UTC);
        assert_eq!(
            format_line(at, Speaker::User, "make it blue"),
            "[09:05:07] You: make it blue"
        );
    }

    #[test]
    fn apply_hint_is_printed_once_per_availability_change() {
        let mut host = TranscriptHost::new(Vec::new());

        host.on_apply_availability(true);
        host.on_apply_availability(true);
        host.on_apply_availability(false);

        let output = String::from_utf8(host.into_inner()).expect("utf8");
        assert_eq!(output, "(type /apply to write these changes)\n");
    }
}
