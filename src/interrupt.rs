//! User-interrupt plumbing shared by the prompt loops and the install
//! subprocess.
//!
//! A `^C` at a prompt surfaces as `ReadlineError::Interrupted` and is mapped
//! to [`Interrupted`] there. Everywhere else SIGINT only sets a flag; the
//! pipeline checks it between stages and after the blocking install wait so
//! every interrupt funnels through the same cleanup-and-exit path.

use anyhow::{Context, Result};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sentinel error for a user interrupt. Carries no message; the top level
/// prints only the exit banner when it sees one.
#[derive(Debug)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("interrupted")
    }
}

impl std::error::Error for Interrupted {}

/// Flag set by the SIGINT handler.
#[derive(Clone)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn install() -> Result<Self> {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = Arc::clone(&flag);
        ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))
            .context("install SIGINT handler")?;
        Ok(Self(flag))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Convert a pending interrupt into the sentinel error.
    pub fn check(&self) -> Result<()> {
        if self.is_set() {
            return Err(Interrupted.into());
        }
        Ok(())
    }
}
