//! Console spinner
//!
//! Purely cosmetic. The spinner ticks on indicatif's own thread while a
//! blocking call runs. Log records written through `LogWriter` hide the
//! spinner for the duration of the write so lines never interleave.

use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// The spinner currently on screen, if any
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn set_active(bar: Option<ProgressBar>) {
    if let Ok(mut active) = ACTIVE.lock() {
        *active = bar;
    }
}

fn active_spinner() -> Option<ProgressBar> {
    ACTIVE.lock().ok().and_then(|active| active.clone())
}

/// Stderr sink for the logger that suspends the active spinner per record
pub struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let write = || io::stderr().write_all(buf);
        match active_spinner() {
            Some(bar) => bar.suspend(write)?,
            None => write()?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// A running spinner. Cleared from the terminal when stopped or dropped.
pub struct Spinner {
    bar: ProgressBar,
    visible: bool,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("-/|\\ ")
                .template("{msg} {spinner}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(TICK_INTERVAL);
        set_active(Some(bar.clone()));
        Self { bar, visible: true }
    }

    /// A spinner that never draws, for quiet or non-interactive runs
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            visible: false,
        }
    }

    pub fn stop(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
        if self.visible {
            set_active(None);
        }
    }
}

/// Run `work` with a spinner showing `message`; the spinner is gone before
/// this returns.
pub fn with_spinner<T>(message: &str, show: bool, work: impl FnOnce() -> T) -> T {
    let spinner = if show {
        Spinner::start(message)
    } else {
        Spinner::hidden()
    };
    let result = work();
    spinner.stop();
    result
}
