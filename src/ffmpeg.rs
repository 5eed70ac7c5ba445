//! Quieting the decoder.
//!
//! Screen recordings and lecture captures often carry a few damaged packets.
//! FFmpeg recovers from most of them but reports each one on stderr, which
//! buries the `framesift` progress bar. [`set_decoder_log_level`] turns that
//! chatter down; it is the switch behind the CLI's `--log-level` flag.
//!
//! The crate's own diagnostics go through the `log` facade and are
//! configured with whatever logger the application installs.
//!
//! ```no_run
//! use framesift::DecoderLogLevel;
//!
//! let level: DecoderLogLevel = "error".parse().unwrap();
//! framesift::set_decoder_log_level(level);
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use ffmpeg_next::util::log::Level;

/// How much FFmpeg may print while `framesift` decodes, from nothing
/// (`Quiet`) to everything (`Trace`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderLogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    /// FFmpeg's own default.
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

/// Every level with the name accepted by [`FromStr`], quietest first.
static LEVELS: [(DecoderLogLevel, &str, Level); 9] = [
    (DecoderLogLevel::Quiet, "quiet", Level::Quiet),
    (DecoderLogLevel::Panic, "panic", Level::Panic),
    (DecoderLogLevel::Fatal, "fatal", Level::Fatal),
    (DecoderLogLevel::Error, "error", Level::Error),
    (DecoderLogLevel::Warning, "warning", Level::Warning),
    (DecoderLogLevel::Info, "info", Level::Info),
    (DecoderLogLevel::Verbose, "verbose", Level::Verbose),
    (DecoderLogLevel::Debug, "debug", Level::Debug),
    (DecoderLogLevel::Trace, "trace", Level::Trace),
];

impl DecoderLogLevel {
    fn entry(self) -> &'static (DecoderLogLevel, &'static str, Level) {
        // The table covers every variant.
        &LEVELS[self as usize]
    }

    /// Lower-case name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        self.entry().1
    }
}

impl Display for DecoderLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for DecoderLogLevel {
    type Err = String;

    /// Case-insensitive; `warn` is accepted for `warning`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.to_ascii_lowercase();
        let wanted = if value == "warn" { "warning" } else { value.as_str() };
        LEVELS
            .iter()
            .find(|(_, name, _)| *name == wanted)
            .map(|(level, _, _)| *level)
            .ok_or_else(|| format!("unknown FFmpeg log level: {value}"))
    }
}

/// Set how much FFmpeg prints to stderr. Process-wide; `log` output is
/// unaffected.
pub fn set_decoder_log_level(level: DecoderLogLevel) {
    ffmpeg_next::util::log::set_level(level.entry().2);
}
