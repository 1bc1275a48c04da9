use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Installs the global subscriber: a colorized console layer for
/// send results and countdown ticks, plus a daily-rolling plain file
/// under `logs/`.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for the life of the process.
pub fn setup_logger() -> Option<WorkerGuard> {
    std::fs::create_dir_all("logs").ok();

    // Daily rotation; campaigns run for hours, not weeks
    let file_appender = tracing_appender::rolling::daily("logs", "campaign");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // File keeps send results and anything worth investigating later.
    // Countdown ticks stay off the file.
    let file_filter = tracing_subscriber::filter::Targets::new()
        .with_target("send_result", tracing::Level::INFO)
        .with_default(tracing::Level::WARN);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    // Console shows per-send progress and rate-limit countdowns
    let console_filter = tracing_subscriber::filter::Targets::new()
        .with_target("send_result", tracing::Level::INFO)
        .with_target("countdown", tracing::Level::INFO)
        .with_default(tracing::Level::ERROR);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(ConsoleFormatter)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    Some(guard)
}

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

pub struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
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
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        let msg = visitor.message;

        let colored = if msg.contains("Sent") {
            let green = Style::new().fg(Color::LightGreen).bold();
            msg.replace("Sent", &format!("{}", green.paint("Sent")))
        } else if msg.contains("Failed") {
            let red = Style::new().fg(Color::LightRed).bold();
            msg.replace("Failed", &format!("{}", red.paint("Failed")))
        } else if msg.contains("Rate limited") {
            let yellow = Style::new().fg(Color::Yellow);
            msg.replace("Rate limited", &format!("{}", yellow.paint("Rate limited")))
        } else {
            msg
        };

        writeln!(writer, "{}", colored)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
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
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();

        write!(writer, "{} [{}] ", timestamp, level)?;

        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        writeln!(writer, "{}", visitor.message)
    }
}
