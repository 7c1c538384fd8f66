use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod conda;
mod interrupt;
mod kernelspec;
mod prompt;
mod ui;
mod util;

use interrupt::{Interrupted, InterruptFlag};

#[derive(Parser, Debug)]
#[command(
    name = "kernelgen",
    version,
    about = "Provision a Jupyter kernel backed by an existing conda environment"
)]
struct Cli {
    /// Path to the conda environment backing the kernel
    #[arg(short, long, value_name = "PATH")]
    environment: Option<String>,

    /// Name for the new kernel (letters, digits, '.', '_' and '-')
    #[arg(short, long, value_name = "NAME")]
    name: Option<String>,

    /// Install ipykernel without asking for confirmation
    #[arg(short = 'y', long = "yes")]
    yes: bool,
}

/// How a run ended without error.
enum RunOutcome {
    /// Kernel directory written and committed.
    Installed(PathBuf),
    /// User declined the ipykernel install; nothing was created.
    Declined,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(RunOutcome::Installed(path)) => {
            println!("{}", ui::ok("KERNEL INSTALLATION SUCCESS"));
            tracing::info!(kernel = %path.display(), "kernel installed");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Declined) => ExitCode::SUCCESS,
        // a bare interrupt carries no message
        Err(err) if err.is::<Interrupted>() => {
            eprintln!("EXITING...");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{}", ui::fail(&format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

/// The whole pipeline: resolve manager, acquire environment and name, ensure
/// ipykernel, then write the kernel directory. Any error unwinds through the
/// directory guard so no partial kernel is left behind.
fn run(cli: &Cli) -> Result<RunOutcome> {
    let interrupt = InterruptFlag::install()?;
    let mut rl = prompt::editor()?;

    println!("{}", ui::header("LOOKING FOR CONDA..."));
    let manager = conda::find_manager()?;
    println!(
        "- found conda executable: {}\n",
        ui::ok(&manager.display().to_string())
    );
    interrupt.check()?;

    let env = match &cli.environment {
        Some(raw) => {
            let env = util::normalize_path(raw)?;
            if !conda::is_environment(&env)? {
                bail!(
                    "{} is not a conda environment (no conda-meta directory)",
                    env.display()
                );
            }
            env
        }
        None => prompt::ask_environment(&mut rl)?,
    };
    interrupt.check()?;

    let user_root = kernelspec::user_kernel_root()?;
    let roots = kernelspec::registry_roots(&user_root);
    let name = match &cli.name {
        Some(raw) => {
            let name = raw.trim().to_string();
            if let Some(problem) = kernelspec::name_problem(&name, &roots) {
                bail!("invalid kernel name: {problem}");
            }
            name
        }
        None => prompt::ask_name(&mut rl, &roots)?,
    };
    interrupt.check()?;

    println!("{}", ui::header("CHECKING FOR IPYKERNEL IN CONDA ENV..."));
    let probe = conda::probe_ready(&env);
    report_probe(&probe);
    if !probe.is_ready() {
        let accepted = cli.yes || prompt::confirm_install(&mut rl)?;
        if !accepted {
            eprintln!(
                "{}",
                ui::fail(&format!("not installing {}. Exiting...", conda::RUNTIME_PACKAGE))
            );
            return Ok(RunOutcome::Declined);
        }
        conda::install_runtime_package(&manager, &env, &interrupt)?;
        let probe = conda::probe_ready(&env);
        report_probe(&probe);
        if !probe.is_ready() {
            bail!("{} still missing after installation", conda::RUNTIME_PACKAGE);
        }
    }
    interrupt.check()?;

    println!("{}", ui::header("CREATING KERNEL DIRECTORY..."));
    let guard = kernelspec::KernelDirGuard::create(&user_root, &name)?;
    kernelspec::write_launcher(guard.path(), &env)?;
    kernelspec::write_descriptor(guard.path(), &name)?;
    interrupt.check()?;
    let path = guard.commit();

    Ok(RunOutcome::Installed(path))
}

fn report_probe(probe: &conda::ReadyProbe) {
    for (present, label) in [(probe.ipykernel, "ipykernel"), (probe.ipython, "ipython")] {
        if present {
            println!("- {}", ui::ok(&format!("found {label}")));
        } else {
            println!("- {}", ui::warn(&format!("no {label} found")));
        }
    }
    println!();
}
