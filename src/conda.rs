//! Discovery of the conda-compatible environment manager and probing of the
//! target environment.

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use crate::interrupt::InterruptFlag;

/// Package that must be present before a kernel spec is worth writing.
pub const RUNTIME_PACKAGE: &str = "ipykernel";

/// Companion executable expected alongside the package, relative to the
/// environment root.
const COMPANION_EXE: &str = "bin/ipython";

/// Locate the environment manager on `PATH`, preferring mamba over conda
/// because it installs faster. No subprocess is spawned here.
pub fn find_manager() -> Result<PathBuf> {
    for name in ["mamba", "conda"] {
        if let Ok(path) = which::which(name) {
            tracing::debug!(manager = name, path = %path.display(), "resolved environment manager");
            return Ok(path);
        }
    }
    Err(anyhow!("no conda executable on the path"))
}

/// True iff `path/conda-meta` is a directory; every conda environment has
/// one. The ordinary not-found case is `false`, anything else (for example a
/// permission error on the parent) propagates.
pub fn is_environment(path: &Path) -> Result<bool> {
    let marker = path.join("conda-meta");
    match fs::metadata(&marker) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => {
            Err(anyhow::Error::new(err).context(format!("check {}", marker.display())))
        }
    }
}

/// Presence of the two dependency markers inside an environment.
#[derive(Debug, Clone, Copy)]
pub struct ReadyProbe {
    pub ipykernel: bool,
    pub ipython: bool,
}

impl ReadyProbe {
    pub fn is_ready(&self) -> bool {
        self.ipykernel && self.ipython
    }
}

/// Probe the environment for the runtime package and its companion
/// executable. Both must be present for the kernel to be launchable.
pub fn probe_ready(env: &Path) -> ReadyProbe {
    ReadyProbe {
        ipykernel: has_runtime_package(env),
        ipython: env.join(COMPANION_EXE).is_file(),
    }
}

/// Look for `<env>/lib/python3.<minor>/site-packages/ipykernel` for any
/// installed interpreter minor version. Environments are assumed to hold a
/// single interpreter version; the first match wins.
fn has_runtime_package(env: &Path) -> bool {
    let lib = env.join("lib");
    let entries = match fs::read_dir(&lib) {
        Ok(entries) => entries,
        Err(_) => return false,
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with("python3.") {
            continue;
        }
        if entry
            .path()
            .join("site-packages")
            .join(RUNTIME_PACKAGE)
            .exists()
        {
            return true;
        }
    }
    false
}

/// Run `<manager> install -p <env> -y ipykernel`, streaming the manager's
/// output straight to the console and blocking until it exits. A SIGINT seen
/// while waiting is reported as an interrupt rather than an install failure.
pub fn install_runtime_package(
    manager: &Path,
    env: &Path,
    interrupt: &InterruptFlag,
) -> Result<()> {
    let start = Instant::now();
    let status = Command::new(manager)
        .arg("install")
        .arg("-p")
        .arg(env)
        .arg("-y")
        .arg(RUNTIME_PACKAGE)
        .status()
        .with_context(|| format!("run {}", manager.display()))?;
    interrupt.check()?;

    let elapsed_ms = start.elapsed().as_millis();
    tracing::info!(
        elapsed_ms,
        manager = %manager.display(),
        env = %env.display(),
        exit = ?status.code(),
        "install subprocess finished"
    );

    if !status.success() {
        bail!("{RUNTIME_PACKAGE} installation failed: {status}");
    }
    Ok(())
}
