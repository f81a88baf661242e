//! Console- and file-shaped transport rendering events to line sinks.

use crate::level_gate::LevelGate;
use crate::line_sink::{FileSink, StderrSink, StdoutSink};
use crate::render::{Palette, TimeStyle, render_line, render_raw};
use fanlog_domain::{Severity, StructuredEvent};
use fanlog_ports::{LineSink, Transport};
use fanlog_shared::Result;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Transport writing debug/info/warn to one sink and error/fatal to another.
pub struct IoTransport {
    gate: LevelGate,
    out: Arc<dyn LineSink>,
    err: Arc<dyn LineSink>,
    palette: RwLock<Palette>,
    time_style: TimeStyle,
    raw: bool,
}

impl IoTransport {
    /// Transport over arbitrary sinks with a plain palette.
    #[must_use]
    pub fn new(out: Arc<dyn LineSink>, err: Arc<dyn LineSink>, threshold: Severity) -> Self {
        Self {
            gate: LevelGate::new(threshold),
            out,
            err,
            palette: RwLock::new(Palette::plain()),
            time_style: TimeStyle::Clock,
            raw: false,
        }
    }

    /// Stdout/stderr transport with ANSI colors and clock timestamps.
    #[must_use]
    pub fn console(threshold: Severity) -> Self {
        Self::new(Arc::new(StdoutSink), Arc::new(StderrSink), threshold)
            .with_palette(Palette::ansi())
    }

    /// Append-mode file transport with dated timestamps and no colors.
    ///
    /// `err_path` defaults to `out_path`; equal paths share one handle.
    pub fn file(out_path: &Path, err_path: Option<&Path>, threshold: Severity) -> Result<Self> {
        let out: Arc<dyn LineSink> = Arc::new(FileSink::open_append(out_path)?);
        let err = match err_path {
            Some(path) if path != out_path => Arc::new(FileSink::open_append(path)?),
            _ => Arc::clone(&out),
        };
        Ok(Self::new(out, err, threshold).with_time_style(TimeStyle::DateTime))
    }

    /// Dump events as indented JSON instead of lines.
    #[must_use]
    pub const fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Replace the palette at construction.
    #[must_use]
    pub fn with_palette(self, palette: Palette) -> Self {
        self.set_palette(palette);
        self
    }

    /// Replace the timestamp layout.
    #[must_use]
    pub const fn with_time_style(mut self, time_style: TimeStyle) -> Self {
        self.time_style = time_style;
        self
    }

    /// Replace the palette on a live transport.
    pub fn set_palette(&self, palette: Palette) {
        *self.palette.write().unwrap_or_else(PoisonError::into_inner) = palette;
    }

    /// Current palette.
    #[must_use]
    pub fn palette(&self) -> Palette {
        self.palette
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns true in structured-dump mode.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    fn render(&self, event: &StructuredEvent) -> Result<String> {
        if self.raw {
            return render_raw(event);
        }
        let palette = self.palette.read().unwrap_or_else(PoisonError::into_inner);
        Ok(render_line(event, &palette, self.time_style))
    }
}

impl Transport for IoTransport {
    fn threshold(&self) -> Severity {
        self.gate.get()
    }

    fn set_threshold(&self, threshold: Severity) {
        self.gate.set(threshold);
    }

    fn receive(&self, event: &StructuredEvent) -> Result<()> {
        if !self.gate.admits(event.level()) {
            return Ok(());
        }
        let text = self.render(event)?;
        let sink = if event.level().is_error_stream() {
            &self.err
        } else {
            &self.out
        };
        sink.write_line(&text)
    }

    fn flush(&self, _timeout: Duration) -> bool {
        // Lines are written synchronously; flush errors are not delivery failures.
        let _ = self.out.flush();
        let _ = self.err.flush();
        true
    }
}
