//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro gated on the global `--verbose` flag
//! - `ProgressLine` for single-line progress display with multiple counters
//!
//! # Example
//!
//! ```ignore
//! log!("inject"; "{} files, {} injected", total, injected);
//!
//! let progress = ProgressLine::new(&[("pages", 42)]);
//! progress.inc("pages");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Active progress bar count (for log coordination)
static BAR_COUNT: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
#[allow(clippy::cast_possible_truncation)] // Safe: bars count is always small
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);

    let mut stdout = stdout().lock();

    let bar_count = BAR_COUNT.load(Ordering::SeqCst);
    if bar_count > 0 {
        execute!(stdout, cursor::MoveUp(bar_count as u16)).ok();
        execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
    } else {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();

    if bar_count > 0 {
        for _ in 0..bar_count {
            writeln!(stdout).ok();
        }
    }

    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "build" => prefix.bright_blue().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "warning" => prefix.bright_yellow().bold().to_string(),
        _ => prefix.bright_green().bold().to_string(),
    }
}

// ============================================================================
// Progress Line (single-line counters)
// ============================================================================

/// Single-line progress display with multiple counters
///
/// Displays: `[build] pages(42/69) partials(3/5)`
///
/// All counters update in place on the same line. Uses `try_lock` to avoid
/// blocking worker threads - if display is busy, the update is skipped
pub struct ProgressLine {
    counters: Vec<Counter>,
    lock: Mutex<()>,
}

struct Counter {
    name: &'static str,
    total: usize,
    current: AtomicUsize,
}

impl ProgressLine {
    /// Create a new progress display.
    ///
    /// Only includes counters with total > 0.
    pub fn new(items: &[(&'static str, usize)]) -> Self {
        let counters: Vec<_> = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|(name, total)| Counter {
                name,
                total: *total,
                current: AtomicUsize::new(0),
            })
            .collect();

        BAR_COUNT.store(1, Ordering::SeqCst);

        let progress = Self {
            counters,
            lock: Mutex::new(()),
        };
        progress.display();
        progress
    }

    /// Increment the counter with the given name.
    ///
    /// Non-blocking: if display lock is held, skips refresh.
    #[inline]
    pub fn inc(&self, name: &str) {
        for counter in &self.counters {
            if counter.name == name {
                counter.current.fetch_add(1, Ordering::Relaxed);
                // Non-blocking: skip display if lock is held
                if self.lock.try_lock().is_some() {
                    self.display();
                }
                return;
            }
        }
    }

    /// Display the current progress line (overwrites current line with \r).
    fn display(&self) {
        let line = self.render();
        let prefix = colorize_prefix("build");

        let mut stdout = stdout().lock();
        // Clear line and write progress (no newline - stays on same line)
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        write!(stdout, "{} {}", prefix, line).ok();
        stdout.flush().ok();
    }

    fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.counters.len());
        for counter in &self.counters {
            let current = counter.current.load(Ordering::Relaxed);
            parts.push(format!("{}({}/{})", counter.name, current, counter.total));
        }
        parts.join(" ")
    }

    /// Finish progress display, preserve line and move to next line.
    pub fn finish(self) {
        BAR_COUNT.store(0, Ordering::SeqCst);

        {
            let _guard = self.lock.lock(); // Wait for any pending display

            let line = self.render();
            let prefix = colorize_prefix("build");

            let mut stdout = stdout().lock();
            // Final line with newline to preserve it
            execute!(
                stdout,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine)
            )
            .ok();
            writeln!(stdout, "{} {}", prefix, line).ok();
            stdout.flush().ok();
        }

        std::mem::forget(self); // Prevent Drop from clearing
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        BAR_COUNT.store(0, Ordering::SeqCst);

        // Clear the line on drop (if not finished properly)
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        stdout.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_render() {
        let progress = ProgressLine::new(&[("pages", 3), ("partials", 0)]);
        // Zero-total counters are filtered out
        assert_eq!(progress.render(), "pages(0/3)");
        progress.inc("pages");
        progress.inc("pages");
        assert_eq!(progress.render(), "pages(2/3)");
        progress.finish();
    }

    #[test]
    fn test_progress_unknown_counter_ignored() {
        let progress = ProgressLine::new(&[("pages", 1)]);
        progress.inc("nope");
        assert_eq!(progress.render(), "pages(0/1)");
        progress.finish();
    }
}
