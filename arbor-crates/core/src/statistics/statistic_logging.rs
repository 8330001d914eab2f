//! Writes statistics as `PREFIX name=value` lines, optionally closed by a postfix line.
//!
//! Nothing is written until [`configure_statistic_logging`] has been called; the configuration
//! is global and can be set only once.

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::stdout;
use std::io::Write;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

struct StatisticSink {
    prefix: &'static str,
    postfix: Option<&'static str>,
    casing: Option<Case>,
    writer: Box<dyn Write + Send>,
}

impl Debug for StatisticSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticSink")
            .field("prefix", &self.prefix)
            .field("postfix", &self.postfix)
            .field("casing", &self.casing)
            .field("writer", &"<Writer>")
            .finish()
    }
}

impl StatisticSink {
    fn write_statistic(&mut self, name: String, value: impl Display) {
        let name = match self.casing {
            Some(casing) => name.to_case(casing),
            None => name,
        };
        let _ = writeln!(self.writer, "{} {name}={value}", self.prefix);
    }
}

static STATISTIC_SINK: OnceLock<Mutex<StatisticSink>> = OnceLock::new();

/// Enable statistic logging.
///
/// Every statistic is written as `{prefix} {name}={value}`, with the name converted to `casing`
/// when one is given. [`log_statistic_postfix`] writes `postfix` to close a block of
/// statistics. When no writer is given, statistics go to stdout.
pub fn configure_statistic_logging(
    prefix: &'static str,
    postfix: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send>>,
) {
    let _ = STATISTIC_SINK.get_or_init(|| {
        Mutex::new(StatisticSink {
            prefix,
            postfix,
            casing,
            writer: writer.unwrap_or_else(|| Box::new(stdout())),
        })
    });
}

/// Log the statistic `name` with `value`, if statistic logging is configured.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if let Some(sink) = STATISTIC_SINK.get() {
        if let Ok(mut sink) = sink.lock() {
            sink.write_statistic(name.to_string(), value);
        }
    }
}

/// Close a block of statistics with the configured postfix line, if there is one.
pub fn log_statistic_postfix() {
    if let Some(sink) = STATISTIC_SINK.get() {
        if let Ok(mut sink) = sink.lock() {
            if let Some(postfix) = sink.postfix {
                let _ = writeln!(sink.writer, "{postfix}");
            }
        }
    }
}

/// Whether [`configure_statistic_logging`] has been called.
pub fn should_log_statistics() -> bool {
    STATISTIC_SINK.get().is_some()
}
