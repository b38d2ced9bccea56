//! Interactive prompting for missing values.
//!
//! Hidden input switches terminal echo off through `termios`, which is the
//! only unsafe code in the crate.

#![allow(unsafe_code)]

use std::io::{self, BufRead, Write};

use async_trait::async_trait;

/// Asks the user for a value.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Shows `message` and reads one line. With `hide_input` set, typed
    /// characters are not echoed.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be read.
    async fn prompt(&self, message: &str, hide_input: bool) -> io::Result<String>;
}

/// Prompts on the controlling terminal: the message goes to stderr, the
/// answer is read from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn prompt(&self, message: &str, hide_input: bool) -> io::Result<String> {
        let message = message.to_string();

        tokio::task::spawn_blocking(move || read_line(&message, hide_input))
            .await
            .map_err(io::Error::other)?
    }
}

fn read_line(message: &str, hide_input: bool) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{message}")?;
    stderr.flush()?;

    let _echo = if hide_input { EchoGuard::disable() } else { None };

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    if hide_input {
        writeln!(stderr)?;
    }

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Restores terminal echo when dropped.
struct EchoGuard {
    #[cfg(unix)]
    original: libc::termios,
}

impl EchoGuard {
    #[cfg(unix)]
    fn disable() -> Option<Self> {
        let fd = libc::STDIN_FILENO;
        let mut original = std::mem::MaybeUninit::<libc::termios>::uninit();

        // SAFETY: tcgetattr fully initialises `original` when it returns 0.
        if unsafe { libc::tcgetattr(fd, original.as_mut_ptr()) } != 0 {
            return None;
        }
        // SAFETY: initialised by the successful call above.
        let original = unsafe { original.assume_init() };

        let mut silent = original;
        silent.c_lflag &= !libc::ECHO;
        silent.c_lflag |= libc::ECHONL;

        // SAFETY: `silent` is a valid termios copied from the current settings.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &silent) } != 0 {
            return None;
        }

        Some(Self { original })
    }

    #[cfg(not(unix))]
    fn disable() -> Option<Self> {
        None
    }
}

impl Drop for EchoGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        // SAFETY: restores settings previously read with tcgetattr.
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &self.original);
        }
    }
}
