use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for devcore")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        #[arg(long)]
        ignored: bool,
        /// Run only device module tests (registry, info, lifecycle)
        #[arg(long)]
        device: bool,
        /// Run only machine module tests (host, descriptions)
        #[arg(long)]
        machine: bool,
        /// Run only the integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Run benchmarks
    Bench,
    /// Run a machine description through the devcore binary
    Run {
        /// Machine description (defaults to the built-in board)
        config: Option<PathBuf>,
        /// Number of machine resets
        #[arg(short = 'r', long, default_value = "1")]
        resets: usize,
        /// Print the device summary as JSON
        #[arg(long)]
        json: bool,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Pre-commit hook (fmt, clippy, test)
    PreCommit,
    /// Install git hooks
    InstallHooks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_pipeline(&CI, verbose),
        Commands::Check { verbose } => run_pipeline(&CHECK, verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            ignored,
            device,
            machine,
            integration,
        } => {
            let selection = TestSelection {
                device,
                machine,
                integration,
            };
            run_test(doc, ignored, selection)
        }
        Commands::Bench => run_bench(),
        Commands::Run {
            config,
            resets,
            json,
            release,
        } => run_machine(config, resets, json, release),
        Commands::PreCommit => run_pipeline(&PRE_COMMIT, false),
        Commands::InstallHooks => install_hooks(),
    }
}

/// One named step of a pipeline
type Step = (&'static str, fn() -> Result<()>);

/// Steps run in order, stopping at the first failure
struct Pipeline {
    title: &'static str,
    done: &'static str,
    steps: &'static [Step],
}

const CI: Pipeline = Pipeline {
    title: "Running CI Pipeline",
    done: "CI passed",
    steps: &[
        ("Format Check", check_format),
        ("Clippy", lint),
        ("Build", build_debug),
        ("Test", test_all),
    ],
};

const CHECK: Pipeline = Pipeline {
    title: "Running Quick Checks",
    done: "Checks passed",
    steps: &[("Format Check", check_format), ("Clippy", lint)],
};

const PRE_COMMIT: Pipeline = Pipeline {
    title: "Pre-commit Checks",
    done: "Pre-commit checks passed",
    steps: &[
        ("Format Check", check_format),
        ("Clippy", lint),
        ("Test", test_all),
    ],
};

fn check_format() -> Result<()> {
    run_fmt(true)
}

fn lint() -> Result<()> {
    run_clippy(false)
}

fn build_debug() -> Result<()> {
    run_build(false)
}

fn test_all() -> Result<()> {
    run_test(false, false, TestSelection::default())
}

fn run_pipeline(pipeline: &Pipeline, verbose: bool) -> Result<()> {
    println!("{}", format!("=== {} ===", pipeline.title).bold().blue());

    let start = Instant::now();

    for &(name, step) in pipeline.steps {
        run_task(name, step, verbose)?;
    }

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        format!("✓ {} in", pipeline.done).green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("clippy").arg("--all-targets").arg("--all-features");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("build");

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

/// Test suites picked on the command line; none selected runs everything
#[derive(Default, Clone, Copy)]
struct TestSelection {
    device: bool,
    machine: bool,
    integration: bool,
}

fn run_test(doc: bool, ignored: bool, selection: TestSelection) -> Result<()> {
    if doc {
        let mut cmd = Command::new("cargo");
        cmd.arg("test").arg("--all-features").arg("--doc");

        if ignored {
            cmd.arg("--").arg("--ignored");
        }

        return execute_command(&mut cmd);
    }

    let TestSelection {
        device,
        machine,
        integration,
    } = selection;
    let selected = [device, machine, integration]
        .iter()
        .filter(|&&f| f)
        .count();

    if selected == 0 {
        let mut cmd = Command::new("cargo");
        cmd.arg("test").arg("--all-features");

        if ignored {
            cmd.arg("--").arg("--ignored");
        }

        return execute_command(&mut cmd);
    }

    // (enabled, cargo target args, test name filter, label)
    let suites: [(bool, &[&str], Option<&str>, &str); 3] = [
        (device, &["--lib"], Some("core::device"), "Device"),
        (machine, &["--lib"], Some("core::machine"), "Machine"),
        (integration, &["--test", "integration_test"], None, "Integration"),
    ];

    let mut all_success = true;

    for (enabled, target, filter, label) in suites {
        if !enabled {
            continue;
        }

        println!("{} Running {} tests...", "→".blue(), label.bold());

        let mut cmd = Command::new("cargo");
        cmd.arg("test").arg("--all-features").args(target);
        if let Some(filter) = filter {
            cmd.arg(filter);
        }

        if ignored {
            cmd.arg("--").arg("--ignored");
        }

        match execute_command(&mut cmd) {
            Ok(_) => {
                println!("{} {} tests passed\n", "✓".green(), label);
            }
            Err(e) => {
                println!("{} {} tests failed\n", "✗".red(), label);
                all_success = false;
                if selected == 1 {
                    return Err(e);
                }
            }
        }
    }

    if all_success {
        Ok(())
    } else {
        anyhow::bail!("Some test suites failed")
    }
}

fn run_bench() -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("bench");

    execute_command(&mut cmd)
}

fn run_machine(config: Option<PathBuf>, resets: usize, json: bool, release: bool) -> Result<()> {
    println!("{}", "=== Machine Run ===".bold().blue());

    if let Some(path) = &config {
        if !path.exists() {
            println!(
                "{} Machine description not found: {}",
                "✗".red().bold(),
                path.display().to_string().yellow()
            );
            anyhow::bail!("Machine description not found");
        }
        println!(
            "{} Description: {}",
            "✓".green(),
            path.display().to_string().cyan()
        );
    } else {
        println!("{} Description: {}", "→".blue(), "built-in board".cyan());
    }
    println!("{} Resets: {}", "→".blue(), resets.to_string().bold());
    println!(
        "{} Build mode: {}",
        "→".blue(),
        if release {
            "release".green().bold()
        } else {
            "debug".yellow().bold()
        }
    );
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("run").arg("--bin").arg("devcore");

    if release {
        cmd.arg("--release");
    }

    cmd.arg("--");
    if let Some(path) = &config {
        cmd.arg(path);
    }
    cmd.arg("--resets").arg(resets.to_string());
    if json {
        cmd.arg("--json");
    }

    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        println!("\n{} Machine run failed", "✗".red().bold());
        anyhow::bail!("Machine run failed with exit code: {}", status);
    }

    let elapsed = start.elapsed();
    println!(
        "\n{} Machine run completed in {}",
        "✓".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn install_hooks() -> Result<()> {
    use std::fs;

    println!("{}", "Installing git hooks...".bold());

    let hook_content = r#"#!/bin/sh
# Auto-generated by cargo x install-hooks
set -e

echo "Running pre-commit checks..."
cargo x pre-commit
"#;

    let hook_path = ".git/hooks/pre-commit";
    fs::write(hook_path, hook_content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(hook_path, perms)?;
    }

    println!("{}", "✓ Git hooks installed".green());
    println!("  Pre-commit hook will run: fmt, clippy, test");

    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(_) => {
            let elapsed = start.elapsed();
            println!(
                "{} {}",
                "✓".green().bold(),
                if verbose {
                    format!("({:.2}s)", elapsed.as_secs_f64())
                } else {
                    String::new()
                }
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
