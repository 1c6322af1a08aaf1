//! Run log: every event goes to the append-only `backup.log` and to the console.
//!
//! Both sinks render the same `YYYY-MM-DD HH:MM:SS [LEVEL] - message` line; the
//! console one colors it by severity. `SUCCESS` is an INFO event carrying
//! `success = true`, emitted with the [`success!`] macro.

use crate::backup::result_error::result::Result;
use chrono::Local;
use colored::{ColoredString, Colorize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

pub static TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub static SEPARATOR: &str = "----------------------------------------";

/// Logs a `[SUCCESS]` line.
macro_rules! success {
    ($($arg:tt)+) => {
        ::tracing::info!(success = true, $($arg)+)
    };
}

pub(crate) use success;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Severity {
    Debug,
    Info,
    Success,
    Warn,
    Error,
}

impl Severity {
    fn of(level: &Level, success: bool) -> Self {
        match *level {
            Level::ERROR => Severity::Error,
            Level::WARN => Severity::Warn,
            Level::INFO if success => Severity::Success,
            Level::INFO => Severity::Info,
            _ => Severity::Debug,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    fn paint(self, s: &str) -> ColoredString {
        match self {
            Severity::Debug => s.dimmed(),
            Severity::Info => s.blue(),
            Severity::Success => s.green(),
            Severity::Warn => s.yellow(),
            Severity::Error => s.red(),
        }
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    success: bool,
    extra: Vec<String>,
}

impl Visit for LineVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "success" {
            self.success = value;
        } else {
            self.extra.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.extra.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.extra.push(format!("{}={:?}", field.name(), value));
        }
    }
}

/// `timestamp [LEVEL] - message` event format.
#[derive(Clone, Copy, Debug)]
pub struct LineFormat {
    color: bool,
}

impl LineFormat {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored(color: bool) -> Self {
        Self { color }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let severity = Severity::of(event.metadata().level(), visitor.success);

        let mut body = visitor.message;
        for extra in visitor.extra {
            body.push(' ');
            body.push_str(&extra);
        }
        let timestamp = Local::now().format(TIME_FORMAT);
        let label = format!("[{}]", severity.label());

        if self.color {
            writeln!(
                writer,
                "{} {} - {}",
                timestamp,
                severity.paint(&label).bold(),
                severity.paint(&body)
            )
        } else {
            writeln!(writer, "{} {} - {}", timestamp, label, body)
        }
    }
}

/// Installs the run log for the current thread and returns the guard keeping it active.
///
/// The log file's parent directory is created when missing. Other threads
/// pick the subscriber up through `tracing::dispatcher`.
pub fn install<P: AsRef<Path>>(log_file: P, color: bool) -> Result<DefaultGuard> {
    let log_file = log_file.as_ref();
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(LineFormat::plain())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::INFO),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(LineFormat::colored(color))
                .with_ansi(color)
                .with_writer(std::io::stdout)
                .with_filter(console_filter),
        );

    Ok(tracing::subscriber::set_default(subscriber))
}
