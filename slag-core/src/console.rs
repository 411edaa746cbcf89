//! Diagnostic log of ingots in canonical text form

use crate::ingot::Ingot;
use crate::sexp::to_canonical_text;
use std::io::Write;

/// Banner written before the canonical lines
pub const BANNER: &str = "slag · S-Expression Format:";

/// Destination for diagnostic lines
pub trait DiagnosticSink {
    fn line(&mut self, line: &str);
}

/// Forwards lines to the `log` facade at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn line(&mut self, line: &str) {
        log::info!("{}", line);
    }
}

/// Writes lines to any writer; write errors are dropped
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        WriterSink { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn line(&mut self, line: &str) {
        let _ = writeln!(self.inner, "{}", line);
    }
}

impl DiagnosticSink for Vec<String> {
    fn line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Log every ingot's canonical text, preceded by the banner and a blank line
pub fn log_canonical_text(ingots: &[Ingot], sink: &mut dyn DiagnosticSink) {
    sink.line(BANNER);
    sink.line("");
    for ingot in ingots {
        sink.line(&to_canonical_text(ingot));
    }
}
