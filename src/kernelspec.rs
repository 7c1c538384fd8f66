//! Kernel registry probing and artifact generation.
//!
//! A kernel is a directory under one of the registry roots holding a
//! launcher script and a `kernel.json` descriptor. We only ever write to the
//! user-local root but probe all roots for name collisions, since the
//! notebook host searches every one of them.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const LAUNCHER_FILE: &str = "kernel-helper.sh";
const DESCRIPTOR_FILE: &str = "kernel.json";

/// The user-local kernel root where new kernels are installed.
pub fn user_kernel_root() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(home.join(".local/share/jupyter/kernels"))
}

/// Every root the notebook host searches for kernels: the user-local root,
/// the two system-wide roots, and the active environment's prefix when one
/// is activated.
pub fn registry_roots(user_root: &Path) -> Vec<PathBuf> {
    let mut roots = vec![
        user_root.to_path_buf(),
        PathBuf::from("/usr/share/jupyter/kernels"),
        PathBuf::from("/usr/local/share/jupyter/kernels"),
    ];
    if let Some(prefix) = std::env::var_os("CONDA_PREFIX") {
        roots.push(PathBuf::from(prefix).join("share/jupyter/kernels"));
    }
    roots
}

/// Why a candidate kernel name was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum NameProblem {
    Empty,
    BadCharacter(char),
    Exists(PathBuf),
}

impl fmt::Display for NameProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameProblem::Empty => f.write_str("kernel name must not be empty"),
            NameProblem::BadCharacter(ch) => write!(
                f,
                "kernel name may only contain letters, digits, '.', '_' and '-' (found {ch:?})"
            ),
            NameProblem::Exists(path) => {
                write!(f, "a kernel with that name already exists at {}", path.display())
            }
        }
    }
}

/// Validate a kernel name against the allowed character set and every
/// registry root. Returns `None` when the name is usable. A probe error on a
/// root counts as a collision for that root so the caller can reprompt
/// instead of aborting.
pub fn name_problem(name: &str, roots: &[PathBuf]) -> Option<NameProblem> {
    if name.is_empty() {
        return Some(NameProblem::Empty);
    }
    if let Some(bad) = name
        .chars()
        .find(|ch| !ch.is_ascii_alphanumeric() && !matches!(ch, '.' | '_' | '-'))
    {
        return Some(NameProblem::BadCharacter(bad));
    }
    for root in roots {
        let candidate = root.join(name);
        match candidate.try_exists() {
            Ok(false) => {}
            Ok(true) | Err(_) => return Some(NameProblem::Exists(candidate)),
        }
    }
    None
}

/// Scoped handle to the destination directory. The directory is removed on
/// drop unless [`commit`](Self::commit) is called after all artifacts are
/// written, so a failed run never leaves a partial kernel behind.
pub struct KernelDirGuard {
    path: PathBuf,
    committed: bool,
}

impl KernelDirGuard {
    /// Create `<user_root>/<name>` and any missing parents. Tolerant of a
    /// directory left over from a previous partial run; collision with a
    /// finished kernel was already rejected during name validation.
    pub fn create(user_root: &Path, name: &str) -> Result<Self> {
        let path = user_root.join(name);
        fs::create_dir_all(&path).with_context(|| format!("create {}", path.display()))?;
        Ok(Self {
            path,
            committed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the directory. Consumes the guard; after this the kernel is
    /// considered complete.
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        self.path.clone()
    }
}

impl Drop for KernelDirGuard {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}

/// Write the launcher script that activates the environment before exec'ing
/// whatever argv the notebook host passes, and mark it executable.
pub fn write_launcher(dir: &Path, env: &Path) -> Result<()> {
    let script = format!(
        "#!/bin/bash\n\nsource activate {}\nexec \"$@\"\n",
        env.display()
    );
    let path = dir.join(LAUNCHER_FILE);
    fs::write(&path, script).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("set permissions on {}", path.display()))?;
    }
    Ok(())
}

/// Write the kernel descriptor. `{resource_dir}` and `{connection_file}` are
/// placeholder tokens substituted by the notebook host at launch time, not by
/// us. The body is a fixed template rather than serialized JSON so the output
/// stays byte-identical across releases; the validated name character set
/// never needs escaping.
pub fn write_descriptor(dir: &Path, name: &str) -> Result<()> {
    let path = dir.join(DESCRIPTOR_FILE);
    fs::write(&path, descriptor_body(name)).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn descriptor_body(name: &str) -> String {
    format!(
        concat!(
            "{{\n",
            "  \"argv\": [\"{{resource_dir}}/kernel-helper.sh\", \"python3\", \"-m\", ",
            "\"ipykernel_launcher\", \"-f\", \"{{connection_file}}\"],\n",
            "  \"display_name\": \"{name}\",\n",
            "  \"language\": \"python\"\n",
            "}}"
        ),
        name = name
    )
}
