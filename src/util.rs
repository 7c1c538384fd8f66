use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` to the user's home directory. Anything else passes
/// through untouched.
fn expand_user(input: &str) -> Result<PathBuf> {
    let rest = match input.strip_prefix("~/") {
        Some(rest) => rest,
        None if input == "~" => "",
        None => return Ok(PathBuf::from(input)),
    };
    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Normalize user-entered path text to an absolute path.
///
/// Trims surrounding whitespace, expands `~`, anchors relative input at the
/// current working directory, and resolves `.`/`..` segments lexically
/// (symlinks are not followed, the path need not exist). Idempotent.
pub fn normalize_path(input: &str) -> Result<PathBuf> {
    let expanded = expand_user(input.trim())?;
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        env::current_dir()
            .context("resolve current working directory")?
            .join(expanded)
    };
    Ok(resolve_dots(&absolute))
}

fn resolve_dots(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // pop() never removes the root component, so "/.." stays "/"
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir");
        let via_tilde = normalize_path("~/foo").expect("normalize ~/foo");
        let via_home = normalize_path(&format!("{}/foo", home.display())).expect("normalize");
        assert_eq!(via_tilde, via_home);
        assert_eq!(normalize_path("~").expect("normalize ~"), home);
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ["~/a/./b/../c", "relative/path", "/x/y/../z", "  /spaced/path  "] {
            let once = normalize_path(input).expect("first pass");
            let twice = normalize_path(&once.display().to_string()).expect("second pass");
            assert_eq!(once, twice, "input {input:?}");
        }
    }

    #[test]
    fn dot_segments_resolve_lexically() {
        assert_eq!(
            normalize_path("/a/b/../c/./d").expect("normalize"),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(normalize_path("/..").expect("normalize"), PathBuf::from("/"));
    }

    #[test]
    fn relative_paths_anchor_at_cwd() {
        let cwd = env::current_dir().expect("cwd");
        assert_eq!(normalize_path("foo").expect("normalize"), cwd.join("foo"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(normalize_path(" /a/b ").expect("normalize"), PathBuf::from("/a/b"));
    }
}
