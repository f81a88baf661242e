//! # fanlog-adapters
//!
//! Concrete transports and sinks behind the port traits: console and file
//! line output, remote delivery, and in-memory doubles.
//! This crate depends on `ports`, `domain`, and `shared`.

/// HTTP remote sink.
#[cfg(feature = "http")]
pub mod http_sink;
/// Console and file transport.
pub mod io_transport;
pub mod level_gate;
/// Line sinks (stdout, stderr, file, memory).
pub mod line_sink;
pub mod remote_sinks;
pub mod remote_transport;
/// Line and JSON rendering.
pub mod render;

#[cfg(feature = "http")]
pub use http_sink::HttpRemoteSink;
pub use io_transport::IoTransport;
pub use level_gate::LevelGate;
pub use line_sink::{FileSink, MemorySink, StderrSink, StdoutSink};
pub use remote_sinks::{MemoryRemoteSink, NullRemoteSink};
pub use remote_transport::RemoteTransport;
pub use render::{Palette, TimeStyle, render_line, render_raw};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
