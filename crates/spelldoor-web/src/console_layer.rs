#![forbid(unsafe_code)]

//! `tracing-subscriber` layer that forwards events to a console sink.
//!
//! In the browser the sink is `console.*`; tests plug in a recorder.

use std::fmt::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Destination for formatted log lines.
pub trait ConsoleSink: Send + Sync + 'static {
    fn write(&self, level: Level, line: &str);
}

/// Formats each event as `LEVEL target: message key=value ...`.
#[derive(Debug)]
pub struct ConsoleLayer<W> {
    sink: W,
    max_level: Level,
}

impl<W: ConsoleSink> ConsoleLayer<W> {
    #[must_use]
    pub const fn new(sink: W, max_level: Level) -> Self {
        Self { sink, max_level }
    }
}

impl<W, S> Layer<S> for ConsoleLayer<W>
where
    W: ConsoleSink,
    S: Subscriber,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.max_level
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let line = format!(
            "{} {}: {}",
            metadata.level(),
            metadata.target(),
            visitor.finish()
        );
        self.sink.write(*metadata.level(), &line);
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_owned()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}
