//! Interactive acquisition loops for the environment path, the kernel name,
//! and the install confirmation.
//!
//! Each loop reprompts on an invalid value and returns only a validated one.
//! `^C` at a prompt maps to the interrupt sentinel. End-of-input is fatal in
//! both the path and name prompts: the stream cannot recover, so retrying
//! would spin forever.

use anyhow::{anyhow, Context, Result};
use rustyline::completion::FilenameCompleter;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Completer, Editor, Helper, Highlighter, Hinter, Validator};
use std::path::PathBuf;

use crate::conda;
use crate::interrupt::Interrupted;
use crate::kernelspec;
use crate::ui;
use crate::util;

/// Line-editor helper providing filename tab completion for path entry.
#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
pub struct PathComplete {
    #[rustyline(Completer)]
    completer: FilenameCompleter,
}

pub type PromptEditor = Editor<PathComplete, DefaultHistory>;

pub fn editor() -> Result<PromptEditor> {
    let mut rl: PromptEditor = Editor::new().context("initialize line editor")?;
    rl.set_helper(Some(PathComplete {
        completer: FilenameCompleter::new(),
    }));
    Ok(rl)
}

fn read_line(rl: &mut PromptEditor, prompt: &str) -> Result<String> {
    match rl.readline(prompt) {
        Ok(line) => Ok(line),
        Err(ReadlineError::Interrupted) => Err(Interrupted.into()),
        Err(ReadlineError::Eof) => Err(anyhow!("input closed before a value was entered")),
        Err(err) => Err(err).context("read input"),
    }
}

/// Prompt until the user supplies a path to a real conda environment.
/// Filesystem errors beyond "not found" abort; a wrong path just reprompts.
pub fn ask_environment(rl: &mut PromptEditor) -> Result<PathBuf> {
    loop {
        let line = read_line(rl, "ENTER PATH TO CONDA ENVIRONMENT: ")?;
        let env = util::normalize_path(&line)?;
        if conda::is_environment(&env)? {
            println!("- found conda env: {}\n", ui::ok(&env.display().to_string()));
            return Ok(env);
        }
        eprintln!(
            "{}",
            ui::fail("given path is not a conda environment (no conda-meta directory)")
        );
    }
}

/// Prompt until the user supplies a syntactically valid, unused kernel name.
pub fn ask_name(rl: &mut PromptEditor, roots: &[PathBuf]) -> Result<String> {
    loop {
        let line = read_line(rl, "ENTER KERNEL NAME: ")?;
        let name = line.trim().to_string();
        match kernelspec::name_problem(&name, roots) {
            None => return Ok(name),
            Some(problem) => eprintln!("{}", ui::fail(&problem.to_string())),
        }
    }
}

/// y/N confirmation for the ipykernel install. Only a leading `y` accepts;
/// everything else, including an empty line, declines.
pub fn confirm_install(rl: &mut PromptEditor) -> Result<bool> {
    let line = read_line(rl, &format!("INSTALL {}? [y/N] ", conda::RUNTIME_PACKAGE))?;
    Ok(matches!(line.trim().chars().next(), Some('y' | 'Y')))
}
