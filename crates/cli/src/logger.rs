use std::fmt;
use std::future::Future;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, execute};
use owo_colors::OwoColorize;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::field::Visit;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

use pahelink::errors::*;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for LogLevel {
    type Err = PaheError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            _ => Err(PaheError::Message(format!(
                "invalid log level: {raw}. expected one of: error, warn, info, debug"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LogState {
    Success,
    Warning,
    Failed,
    Debug,
}

impl LogState {
    fn icon(self) -> Box<dyn fmt::Display> {
        match self {
            Self::Success => Box::new("✓".green()),
            Self::Warning => Box::new("!".yellow()),
            Self::Failed => Box::new("✗".red()),
            Self::Debug => Box::new("λ".cyan()),
        }
    }
}

/// terminal logger with a single-line spinner for pending work.
#[derive(Debug)]
pub struct CliLogger {
    pub level: LogLevel,
    spinner_step: AtomicUsize,
    loading_active: AtomicBool,
    loading_padded: AtomicBool,
}

impl CliLogger {
    /// unknown levels fall back to info.
    pub fn new(level: &str) -> Self {
        Self::with_level(level.parse().unwrap_or(LogLevel::Info))
    }

    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            spinner_step: AtomicUsize::new(0),
            loading_active: AtomicBool::new(false),
            loading_padded: AtomicBool::new(false),
        }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    fn log(&self, level: LogLevel, state: LogState, message: impl AsRef<str>) {
        if !self.enabled(level) {
            return;
        }

        self.clear_loading_line();
        println!("{} {}", state.icon(), message.as_ref());
    }

    pub fn loading(&self, message: impl AsRef<str>) {
        if self.enabled(LogLevel::Info) {
            self.draw_loading_frame(message.as_ref());
        }
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, LogState::Success, message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, LogState::Warning, message);
    }

    pub fn failed(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, LogState::Failed, message);
    }

    pub fn debug(&self, context: impl AsRef<str>, message: impl AsRef<str>) {
        self.log(
            LogLevel::Debug,
            LogState::Debug,
            format!(
                "{:>15} {}",
                context.as_ref().bold().bright_purple(),
                message.as_ref()
            ),
        );
    }

    /// awaits `future` while animating `message` next to a spinner.
    pub async fn while_loading<F, T>(&self, message: impl Into<String>, future: F) -> T
    where
        F: Future<Output = T>,
    {
        if !self.enabled(LogLevel::Info) {
            return future.await;
        }

        let message = message.into();
        let mut ticker = tokio::time::interval(Duration::from_millis(120));
        let mut future = std::pin::pin!(future);

        loop {
            tokio::select! {
                result = &mut future => {
                    self.clear_loading_line();
                    return result;
                }
                _ = ticker.tick() => self.draw_loading_frame(&message),
            }
        }
    }

    fn draw_loading_frame(&self, message: &str) {
        let step = self.spinner_step.fetch_add(1, Ordering::Relaxed);
        let frame = SPINNER_FRAMES[step % SPINNER_FRAMES.len()];
        let mut stdout = std::io::stdout();

        if !self.loading_padded.swap(true, Ordering::Relaxed) {
            let _ = writeln!(stdout);
        }

        self.loading_active.store(true, Ordering::Relaxed);
        let _ = execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
        let _ = write!(stdout, "{} {message}", frame.yellow());
        let _ = stdout.flush();
    }

    fn clear_loading_line(&self) {
        if !self.loading_active.swap(false, Ordering::Relaxed) {
            return;
        }

        let mut stdout = std::io::stdout();
        let _ = execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
        if self.loading_padded.swap(false, Ordering::Relaxed) {
            let _ = execute!(
                stdout,
                cursor::MoveUp(1),
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine)
            );
        }
        let _ = stdout.flush();
    }
}

#[derive(Default)]
struct EventFieldVisitor {
    message: Option<String>,
    extras: Vec<String>,
}

impl Visit for EventFieldVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.extras.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.extras.push(format!("{}={value:?}", field.name()));
        }
    }
}

impl EventFieldVisitor {
    fn into_line(self) -> String {
        let mut line = self.message.unwrap_or_else(|| "trace event".to_string());
        if !self.extras.is_empty() {
            line.push(' ');
            line.push_str(&self.extras.join(" "));
        }
        line
    }
}

fn is_library_target(target: &str) -> bool {
    ["pahelink", "pahelink_core"].iter().any(|krate| {
        target
            .strip_prefix(krate)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// forwards library events into the [`CliLogger`].
struct CliTracingLayer {
    logger: Arc<CliLogger>,
}

impl<S> Layer<S> for CliTracingLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if !is_library_target(target) {
            return;
        }

        let mut visitor = EventFieldVisitor::default();
        event.record(&mut visitor);
        let line = visitor.into_line();

        match *metadata.level() {
            Level::ERROR | Level::WARN => self.logger.warn(line),
            _ => self.logger.debug(target, line),
        }
    }
}

pub fn init_tracing(logger: Arc<CliLogger>) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = Registry::default().with(CliTracingLayer {
            logger: Arc::clone(&logger),
        });

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            logger.debug(
                "logger",
                format!("failed to initialize tracing subscriber: {err}"),
            );
        }
    });
}
