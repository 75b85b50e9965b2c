//! Diagnostics log shared by the option validators and the engine
//!
//! A [`Log`] collects every error and warning produced during one build or
//! transform. The handle is cheap to clone and can be written to from the
//! engine's worker threads; appends are serialized behind a mutex. Once all
//! producers are finished the orchestrator drains it with [`Log::done`].
//!
//! Two flavors exist:
//! - deferred: messages are only buffered (used for silent log level)
//! - stderr: messages are buffered *and* printed as they arrive, subject to
//!   a severity filter, a color mode and an error limit

mod tty;

use colored::Colorize;
use oxc_span::Span;
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::sync::Arc;

pub use tty::stderr_is_terminal;

/// Severity of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgKind {
    Error,
    Warning,
}

impl MsgKind {
    fn label(self) -> &'static str {
        match self {
            MsgKind::Error => "error",
            MsgKind::Warning => "warning",
        }
    }
}

/// Minimum severity printed by the stderr log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// Color mode for the stderr log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StderrColor {
    #[default]
    IfTerminal,
    Never,
    Always,
}

/// A source file messages can point into
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    pub index: u32,
    /// Identity used by the engine (usually the absolute path)
    pub key_path: String,
    /// Name shown to users
    pub pretty_path: String,
    pub contents: String,
}

/// A single diagnostic. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Msg {
    pub kind: MsgKind,
    pub text: String,
    pub source: Option<Arc<Source>>,
    /// Byte range inside `source`. Meaningless when `source` is `None`.
    pub span: Span,
}

impl Msg {
    pub fn new(kind: MsgKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            source: None,
            span: Span::new(0, 0),
        }
    }

    pub fn with_source(mut self, source: Arc<Source>, span: Span) -> Self {
        self.source = Some(source);
        self.span = span;
        self
    }

    /// Format the message the way the stderr log prints it
    pub fn render(&self, include_source: bool, use_color: bool) -> String {
        let label = if use_color {
            match self.kind {
                MsgKind::Error => self.kind.label().red().bold().to_string(),
                MsgKind::Warning => self.kind.label().yellow().bold().to_string(),
            }
        } else {
            self.kind.label().to_string()
        };

        let mut out = String::new();
        let Some(source) = self.source.as_ref().filter(|_| include_source) else {
            let _ = writeln!(out, "{}: {}", label, self.text);
            return out;
        };

        let offset = self.span.start as usize;
        let (line_count, column, line_start) = compute_line_and_column(&source.contents, offset);
        let line_text = line_text(&source.contents, line_start);

        let location = format!("{}:{}:{}", source.pretty_path, line_count + 1, column);
        let location = if use_color {
            location.bold().to_string()
        } else {
            location
        };
        let _ = writeln!(out, "{}: {}: {}", location, label, self.text);

        // Marker columns are measured in characters so they line up on screen
        let prefix = line_text.get(..column.min(line_text.len())).unwrap_or(line_text);
        let indent = prefix.chars().count();
        let remaining = line_text.get(prefix.len()..).unwrap_or("");
        let marked = remaining
            .get(..(self.span.size() as usize).min(remaining.len()))
            .map_or(0, |s| s.chars().count());
        let mut marker = String::from("^");
        marker.push_str(&"~".repeat(marked.saturating_sub(1)));
        let marker = if use_color {
            marker.green().to_string()
        } else {
            marker
        };

        let _ = writeln!(out, "{}", line_text);
        let _ = writeln!(out, "{}{}", " ".repeat(indent), marker);
        out
    }
}

/// Count line terminators in `contents[..offset]`.
///
/// Returns `(line_count, column, line_start)` where `line_count` is the
/// 0-based line index, and `column` and `line_start` are byte offsets. `\r\n`
/// counts as one terminator. The offset is clamped to the contents and to a
/// character boundary.
pub fn compute_line_and_column(contents: &str, offset: usize) -> (usize, usize, usize) {
    let mut end = offset.min(contents.len());
    while !contents.is_char_boundary(end) {
        end -= 1;
    }

    let mut line_count = 0;
    let mut line_start = 0;
    let mut prev = '\0';
    for (i, c) in contents[..end].char_indices() {
        match c {
            '\n' => {
                line_start = i + 1;
                if prev != '\r' {
                    line_count += 1;
                }
            }
            '\r' | '\u{2028}' | '\u{2029}' => {
                line_start = i + c.len_utf8();
                line_count += 1;
            }
            _ => {}
        }
        prev = c;
    }

    (line_count, end - line_start, line_start)
}

/// The text of the line beginning at `line_start`, without its terminator
pub fn line_text(contents: &str, line_start: usize) -> &str {
    let rest = contents.get(line_start..).unwrap_or("");
    let end = rest
        .find(['\n', '\r', '\u{2028}', '\u{2029}'])
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Settings for the eager stderr log
#[derive(Debug, Clone, Copy)]
pub struct StderrOptions {
    pub include_source: bool,
    /// Stop printing after this many errors. Zero disables the limit.
    pub error_limit: usize,
    pub color: StderrColor,
    pub log_level: LogLevel,
}

impl Default for StderrOptions {
    fn default() -> Self {
        Self {
            include_source: true,
            error_limit: 0,
            color: StderrColor::IfTerminal,
            log_level: LogLevel::Info,
        }
    }
}

enum LogMode {
    Deferred,
    Stderr { options: StderrOptions, use_color: bool },
}

#[derive(Default)]
struct LogState {
    msgs: Vec<Msg>,
    errors: usize,
    warnings: usize,
    limit_reached: bool,
}

struct Shared {
    mode: LogMode,
    state: Mutex<LogState>,
}

/// Append-only, thread-safe message sink for one invocation
#[derive(Clone)]
pub struct Log {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Log {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Log")
            .field("errors", &state.errors)
            .field("warnings", &state.warnings)
            .finish()
    }
}

impl Log {
    /// A log that only buffers messages
    pub fn new_defer_log() -> Self {
        Self::with_mode(LogMode::Deferred)
    }

    /// A log that also prints messages to stderr as they arrive
    pub fn new_stderr_log(options: StderrOptions) -> Self {
        let use_color = match options.color {
            StderrColor::Always => true,
            StderrColor::Never => false,
            StderrColor::IfTerminal => stderr_is_terminal(),
        };
        Self::with_mode(LogMode::Stderr { options, use_color })
    }

    fn with_mode(mode: LogMode) -> Self {
        Self {
            shared: Arc::new(Shared {
                mode,
                state: Mutex::new(LogState::default()),
            }),
        }
    }

    pub fn add_msg(&self, msg: Msg) {
        let mut state = self.shared.state.lock();
        match msg.kind {
            MsgKind::Error => state.errors += 1,
            MsgKind::Warning => state.warnings += 1,
        }

        if let LogMode::Stderr { options, use_color } = &self.shared.mode {
            let visible = match msg.kind {
                MsgKind::Error => true,
                MsgKind::Warning => options.log_level <= LogLevel::Warning,
            };
            if visible && !state.limit_reached {
                eprint!("{}", msg.render(options.include_source, *use_color));
            }
            if options.error_limit > 0
                && !state.limit_reached
                && state.errors >= options.error_limit
            {
                state.limit_reached = true;
                eprintln!(
                    "{} reached (disable error limit with --error-limit=0)",
                    plural("error", state.errors)
                );
            }
        }

        state.msgs.push(msg);
    }

    pub fn add_error(&self, text: impl Into<String>) {
        self.add_msg(Msg::new(MsgKind::Error, text));
    }

    pub fn add_warning(&self, text: impl Into<String>) {
        self.add_msg(Msg::new(MsgKind::Warning, text));
    }

    pub fn add_error_with_source(&self, source: &Arc<Source>, span: Span, text: impl Into<String>) {
        self.add_msg(Msg::new(MsgKind::Error, text).with_source(Arc::clone(source), span));
    }

    pub fn add_warning_with_source(
        &self,
        source: &Arc<Source>,
        span: Span,
        text: impl Into<String>,
    ) {
        self.add_msg(Msg::new(MsgKind::Warning, text).with_source(Arc::clone(source), span));
    }

    pub fn has_errors(&self) -> bool {
        self.shared.state.lock().errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.shared.state.lock().errors
    }

    pub fn warning_count(&self) -> usize {
        self.shared.state.lock().warnings
    }

    /// Drain every recorded message in the order it was added.
    ///
    /// Must be called once, after every producer holding a clone is done.
    pub fn done(&self) -> Vec<Msg> {
        let mut state = self.shared.state.lock();
        if let LogMode::Stderr { options, .. } = &self.shared.mode {
            let warnings = if options.log_level <= LogLevel::Warning {
                state.warnings
            } else {
                0
            };
            if let Some(summary) = summary(warnings, state.errors) {
                eprintln!("{}", summary);
            }
        }
        std::mem::take(&mut state.msgs)
    }
}

fn plural(noun: &str, count: usize) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn summary(warnings: usize, errors: usize) -> Option<String> {
    match (warnings, errors) {
        (0, 0) => None,
        (w, 0) => Some(plural("warning", w)),
        (0, e) => Some(plural("error", e)),
        (w, e) => Some(format!("{} and {}", plural("warning", w), plural("error", e))),
    }
}
