//! Main logger implementation
//!
//! A [`Logger`] is an immutable value: every `with_*` method returns a new
//! logger that shares the parent's writers, prefixes, formatter and error
//! handler and owns a fresh copy of the fields. Emission is gated by the
//! minimum level and then by any attached conditions; disabled calls do no
//! formatting and touch no writer.

use super::{
    condition::{SharedCondition, SharedContextCondition, SharedLevelCondition},
    context::{attach_logger, Context},
    error::{LoggerError, Result},
    error_handler::{default_error_handler, SharedErrorHandler},
    fields::{FieldValue, Fields},
    formatter::{
        default_formatter, JsonFormatter, KeyValueFormatter, LogfmtFormatter, OutputFormat,
        SharedFormatter,
    },
    log_level::LogLevel,
    prefix::SharedPrefix,
    writer::{LogWriter, SharedWriter},
};
use crate::writers::StdOutWriter;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// Extra gate evaluated after the level check
#[derive(Clone)]
enum Gate {
    Plain(SharedCondition),
    Level(SharedLevelCondition),
    Context(Context, SharedContextCondition),
}

impl Gate {
    fn admits(&self, level: LogLevel, fields: &Fields) -> bool {
        match self {
            Gate::Plain(condition) => condition.check(),
            Gate::Level(condition) => condition.check(level, fields),
            Gate::Context(ctx, condition) => condition.check(Some(ctx)),
        }
    }
}

pub struct Logger {
    /// Serializes render-then-dispatch for this instance
    lock: Mutex<()>,
    level: LogLevel,
    writers: Vec<SharedWriter>,
    prefixes: Vec<SharedPrefix>,
    error_handler: SharedErrorHandler,
    concurrency: bool,
    fields: Fields,
    formatter: SharedFormatter,
    gates: Vec<Gate>,
}

/// Configuration-object form of logger construction
///
/// # Example
/// ```
/// use rust_structured_logger::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::from_config(LoggerConfig {
///     level: LogLevel::Debug,
///     writers: vec![Arc::new(MemoryWriter::new())],
///     concurrency: true,
///     ..LoggerConfig::default()
/// });
/// assert_eq!(logger.level(), LogLevel::Debug);
/// ```
#[derive(Clone, Default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub writers: Vec<SharedWriter>,
    pub prefixes: Vec<SharedPrefix>,
    pub concurrency: bool,
    /// Empty when unset
    pub fields: Option<Fields>,
    /// The process default formatter when unset
    pub formatter: Option<SharedFormatter>,
    /// Discards errors when unset
    pub error_handler: Option<SharedErrorHandler>,
}

impl Logger {
    /// Direct construction.
    ///
    /// With no writer the logger writes to standard output.
    #[must_use]
    pub fn new(
        level: LogLevel,
        writer: Option<SharedWriter>,
        prefixes: impl IntoIterator<Item = SharedPrefix>,
    ) -> Self {
        let writer = writer.unwrap_or_else(|| Arc::new(StdOutWriter::new()));
        Self {
            lock: Mutex::new(()),
            level,
            writers: vec![writer],
            prefixes: prefixes.into_iter().collect(),
            error_handler: default_error_handler(),
            concurrency: false,
            fields: Fields::new(),
            formatter: default_formatter(),
            gates: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            lock: Mutex::new(()),
            level: config.level,
            writers: config.writers,
            prefixes: config.prefixes,
            error_handler: config.error_handler.unwrap_or_else(default_error_handler),
            concurrency: config.concurrency,
            fields: config.fields.unwrap_or_default(),
            formatter: config.formatter.unwrap_or_else(default_formatter),
            gates: Vec::new(),
        }
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Shared parts go by reference, fields are copied.
    fn derive(&self) -> Self {
        Self {
            lock: Mutex::new(()),
            level: self.level,
            writers: self.writers.clone(),
            prefixes: self.prefixes.clone(),
            error_handler: Arc::clone(&self.error_handler),
            concurrency: self.concurrency,
            fields: self.fields.copy(),
            formatter: Arc::clone(&self.formatter),
            gates: self.gates.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------

    /// A logger with `prefixes` appended after the existing ones.
    ///
    /// The receiver keeps its own prefix list.
    #[must_use]
    pub fn with_temporary_prefix(&self, prefixes: impl IntoIterator<Item = SharedPrefix>) -> Self {
        let mut logger = self.derive();
        logger.prefixes.extend(prefixes);
        logger
    }

    #[must_use]
    pub fn with_field<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut logger = self.derive();
        logger.fields = self.fields.with(key, value);
        logger
    }

    #[must_use]
    pub fn with_fields(&self, fields: &Fields) -> Self {
        let mut logger = self.derive();
        logger.fields = self.fields.with_fields(fields);
        logger
    }

    #[must_use]
    pub fn with_fields_formatter(&self, formatter: SharedFormatter) -> Self {
        let mut logger = self.derive();
        logger.formatter = formatter;
        logger
    }

    /// Shortcut for [`JsonFormatter`].
    #[must_use]
    pub fn with_json(&self) -> Self {
        self.with_fields_formatter(Arc::new(JsonFormatter))
    }

    /// Shortcut for [`LogfmtFormatter`].
    #[must_use]
    pub fn with_logfmt(&self) -> Self {
        self.with_fields_formatter(Arc::new(LogfmtFormatter))
    }

    /// Shortcut for [`KeyValueFormatter`] with the default separator.
    #[must_use]
    pub fn with_key_value(&self) -> Self {
        self.with_fields_formatter(Arc::new(KeyValueFormatter::new()))
    }

    #[must_use]
    pub fn with_key_value_separator(&self, separator: impl Into<String>) -> Self {
        self.with_fields_formatter(Arc::new(KeyValueFormatter::with_separator(separator)))
    }

    #[must_use]
    pub fn with_output_format(&self, format: OutputFormat) -> Self {
        self.with_fields_formatter(format.formatter())
    }

    #[must_use]
    pub fn with_error_handler(&self, handler: SharedErrorHandler) -> Self {
        let mut logger = self.derive();
        logger.error_handler = handler;
        logger
    }

    /// A logger that only emits while `condition` holds.
    #[must_use]
    pub fn when(&self, condition: SharedCondition) -> Self {
        let mut logger = self.derive();
        logger.gates.push(Gate::Plain(condition));
        logger
    }

    /// A logger that only emits messages whose level and fields satisfy `condition`.
    #[must_use]
    pub fn when_level(&self, condition: SharedLevelCondition) -> Self {
        let mut logger = self.derive();
        logger.gates.push(Gate::Level(condition));
        logger
    }

    /// A logger that only emits while `condition` holds for `ctx`.
    #[must_use]
    pub fn when_context(&self, ctx: Context, condition: SharedContextCondition) -> Self {
        let mut logger = self.derive();
        logger.gates.push(Gate::Context(ctx, condition));
        logger
    }

    /// Attach this logger to a child of `ctx`.
    ///
    /// See [`from_context`](crate::core::context::from_context).
    pub fn with_context(self: &Arc<Self>, ctx: &Context) -> Context {
        attach_logger(ctx, Arc::clone(self))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// An independent copy of the fields.
    pub fn fields(&self) -> Fields {
        self.fields.copy()
    }

    pub fn writers(&self) -> &[SharedWriter] {
        &self.writers
    }

    pub fn prefixes(&self) -> &[SharedPrefix] {
        &self.prefixes
    }

    pub fn is_concurrent(&self) -> bool {
        self.concurrency
    }

    /// Whether a message at `level` would reach the writers right now.
    ///
    /// Evaluating attached conditions may advance stateful ones.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.is_enabled(self.level) && self.gates.iter().all(|gate| gate.admits(level, &self.fields))
    }

    // ------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------

    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, &message.to_string());
    }

    /// Like [`log`](Self::log) for `format_args!` input; arguments are only
    /// rendered when the message is enabled.
    pub fn log_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, &fmt::format(args));
    }

    #[inline]
    pub fn trace(&self, message: impl fmt::Display) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn trace_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Trace, args);
    }

    #[inline]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn debug_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Debug, args);
    }

    #[inline]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn info_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Info, args);
    }

    #[inline]
    pub fn warning(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn warning_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Warning, args);
    }

    #[inline]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn error_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Error, args);
    }

    /// Log at FATAL, then exit the process with status 1.
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.log(LogLevel::Fatal, message);
        LogLevel::Fatal.exit();
        unreachable!("fatal level always exits")
    }

    pub fn fatal_fmt(&self, args: fmt::Arguments<'_>) -> ! {
        self.log_fmt(LogLevel::Fatal, args);
        LogLevel::Fatal.exit();
        unreachable!("fatal level always exits")
    }

    /// Log at PANIC, then unwind with the message body as payload.
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        let message = message.to_string();
        self.log(LogLevel::Panic, &message);
        LogLevel::Panic.panic(&message);
        unreachable!("panic level always unwinds")
    }

    pub fn panic_fmt(&self, args: fmt::Arguments<'_>) -> ! {
        let message = fmt::format(args);
        self.log(LogLevel::Panic, &message);
        LogLevel::Panic.panic(&message);
        unreachable!("panic level always unwinds")
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Close every writer and fold all failures into one error.
    ///
    /// Writers decide whether a second close is an error. The emission lock
    /// is not taken.
    pub fn close(&self) -> Result<()> {
        let errors = self.dispatch(|writer| writer.close());
        LoggerError::join(errors)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn render_prefixes(&self) -> String {
        self.prefixes
            .iter()
            .map(|prefix| prefix.build())
            .filter(|rendered| !rendered.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `LEVEL [prefixes] [fields] message`
    fn build_message(&self, level: LogLevel, message: &str) -> String {
        let mut parts = vec![level.to_str().to_string()];

        let prefixes = self.render_prefixes();
        if !prefixes.is_empty() {
            parts.push(prefixes);
        }

        if !self.fields.is_empty() {
            let rendered = self.formatter.format(&self.fields);
            if !rendered.is_empty() {
                parts.push(rendered);
            }
        }

        parts.push(message.to_string());
        parts.join(" ")
    }

    fn emit(&self, level: LogLevel, message: &str) {
        let _guard = self.lock.lock();

        let mut line = self.build_message(level, message);
        line.push('\n');
        let payload = line.as_bytes();

        let errors = self.dispatch(|writer| writer.write(payload).map(|_| ()));
        for error in errors {
            self.error_handler.handle(error);
        }
    }

    /// Run `op` against every writer and collect the failures.
    ///
    /// In concurrent mode each writer runs on its own scoped thread and this
    /// call returns only after all of them finish. Otherwise writers run in
    /// order on the calling thread. A failing or panicking writer never stops
    /// its siblings.
    fn dispatch<F>(&self, op: F) -> Vec<LoggerError>
    where
        F: Fn(&dyn LogWriter) -> Result<()> + Sync,
    {
        if self.concurrency && self.writers.len() > 1 {
            let (sender, receiver) = crossbeam_channel::unbounded();
            thread::scope(|scope| {
                for writer in &self.writers {
                    let sender = sender.clone();
                    let op = &op;
                    scope.spawn(move || {
                        if let Err(err) = run_isolated(&**writer, op) {
                            let _ = sender.send(err);
                        }
                    });
                }
            });
            drop(sender);
            receiver.try_iter().collect()
        } else {
            self.writers
                .iter()
                .filter_map(|writer| run_isolated(&**writer, &op).err())
                .collect()
        }
    }
}

/// Per-writer panic isolation: a panic becomes a `WriterPanicked` error.
fn run_isolated<F>(writer: &dyn LogWriter, op: &F) -> Result<()>
where
    F: Fn(&dyn LogWriter) -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| op(writer))) {
        Ok(result) => result,
        Err(panic_info) => Err(LoggerError::writer_panicked(
            writer.name(),
            panic_message(panic_info.as_ref()),
        )),
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("writers", &self.writers.len())
            .field("prefixes", &self.prefixes.len())
            .field("concurrency", &self.concurrency)
            .field("fields", &self.fields)
            .field("gates", &self.gates.len())
            .finish()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::default(), None, Vec::new())
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .writer(MemoryWriter::new())
///     .prefix(with_tag("api"))
///     .field("service", "billing")
///     .output_format(OutputFormat::Logfmt)
///     .concurrency(true)
///     .build();
/// assert_eq!(logger.writers().len(), 1);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Add a writer
    #[must_use = "builder methods return a new value"]
    pub fn writer<W: LogWriter + 'static>(mut self, writer: W) -> Self {
        self.config.writers.push(Arc::new(writer));
        self
    }

    /// Add a writer that is also held elsewhere
    #[must_use = "builder methods return a new value"]
    pub fn shared_writer(mut self, writer: SharedWriter) -> Self {
        self.config.writers.push(writer);
        self
    }

    /// Add a standard output writer
    #[must_use = "builder methods return a new value"]
    pub fn stdout(self) -> Self {
        self.writer(StdOutWriter::new())
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: SharedPrefix) -> Self {
        self.config.prefixes.push(prefix);
        self
    }

    /// Dispatch to writers on parallel threads
    #[must_use = "builder methods return a new value"]
    pub fn concurrency(mut self, enabled: bool) -> Self {
        self.config.concurrency = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let fields = self.config.fields.take().unwrap_or_default();
        self.config.fields = Some(fields.with(key, value));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, fields: &Fields) -> Self {
        let current = self.config.fields.take().unwrap_or_default();
        self.config.fields = Some(current.with_fields(fields));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, formatter: SharedFormatter) -> Self {
        self.config.formatter = Some(formatter);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn output_format(self, format: OutputFormat) -> Self {
        self.formatter(format.formatter())
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_handler(mut self, handler: SharedErrorHandler) -> Self {
        self.config.error_handler = Some(handler);
        self
    }

    /// The configuration built so far
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger::from_config(self.config)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
