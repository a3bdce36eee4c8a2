//! PeTTa kernel CLI
//!
//! Serves the MeTTa notebook kernel over a JSON-lines transport and provides
//! helpers for running files and checking the PeTTa installation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use petta_kernel::engine::resolve_program;
use petta_kernel::{
    Config, EXAMPLE_CONFIG, ExecuteRequest, Kernel, PettaEngine, StreamName, serve,
};
use tokio::io::BufReader;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

/// Snippet evaluated by `verify`
const VERIFY_SAMPLE: &str = "!(+ 1 2)";

#[derive(Parser)]
#[command(name = "petta-kernel")]
#[command(about = "A notebook kernel for MeTTa backed by PeTTa")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve kernel requests as JSON lines on stdin/stdout
    Serve,

    /// Execute a MeTTa file through the kernel
    Run {
        /// Source file to run
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Suppress output, only report success or failure
        #[arg(short, long)]
        silent: bool,
    },

    /// Check that SWI-Prolog and PeTTa are set up correctly
    Verify,

    /// Initialize a new configuration file
    Init {
        /// Output path (default: petta-kernel.toml)
        #[arg(short, long, default_value = "petta-kernel.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    // stdout carries the transport and program output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init { output, force } = &cli.command {
        return init_config(output, *force).await;
    }

    if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
    } else {
        debug!("using default configuration");
    }
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Serve => run_serve(&config).await,
        Commands::Run { source, silent } => run_file(&config, &source, silent).await,
        Commands::Verify => verify(&config).await,
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
        Commands::Init { .. } => Ok(()),
    }
}

async fn run_serve(config: &Config) -> Result<()> {
    let kernel = Kernel::start(config).await;
    info!(ready = kernel.is_ready(), "kernel started");

    let stdin = BufReader::new(tokio::io::stdin());
    serve(&kernel, stdin, tokio::io::stdout())
        .await
        .context("transport failed")?;

    info!("kernel stopped");
    Ok(())
}

async fn run_file(config: &Config, source: &Path, silent: bool) -> Result<()> {
    let code = tokio::fs::read_to_string(source)
        .await
        .context("failed to read source file")?;

    info!(?source, "running file");
    let kernel = Kernel::start(config).await;
    let execution = kernel
        .execute(&ExecuteRequest::new(code).silent(silent))
        .await;
    kernel.shutdown(false).await;

    if let Some(stream) = &execution.stream {
        match stream.name {
            StreamName::Stdout => println!("{}", stream.text),
            StreamName::Stderr => eprintln!("{}", stream.text),
        }
    }

    info!(
        status = ?execution.reply.status,
        ename = execution.reply.ename.as_deref(),
        "execution result"
    );

    if execution.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

async fn verify(config: &Config) -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("PeTTa Kernel Verification");
    println!("{}", "=".repeat(60));

    let mut passed = true;

    println!("1. Checking petta_path...");
    let petta_path_ok = match config.petta_path {
        Some(ref path) => {
            println!("   ✓ petta_path is set: {}", path.display());
            true
        }
        None => {
            println!("   ✗ petta_path is not set!");
            println!("     Set PETTA_PATH or petta_path in the configuration file");
            false
        }
    };
    passed &= petta_path_ok;

    println!("\n2. Checking {}...", config.engine.program);
    let program_ok = match resolve_program(&config.engine.program) {
        Ok(program) => {
            println!("   ✓ {} found: {}", config.engine.program, program.display());
            match engine_version(&program).await {
                Some(version) => println!("   {version}"),
                None => println!("   (could not read version)"),
            }
            true
        }
        Err(e) => {
            println!("   ✗ {e}");
            false
        }
    };
    passed &= program_ok;

    println!("\n3. Checking PeTTa sources...");
    let sources_ok = match config.petta_main() {
        Some(main) if main.is_file() => {
            println!("   ✓ found {}", main.display());
            true
        }
        Some(main) => {
            println!("   ✗ {} does not exist", main.display());
            false
        }
        None => {
            println!("   ✗ skipped, petta_path is not set");
            false
        }
    };
    passed &= sources_ok;

    println!("\n4. Starting the engine...");
    let kernel = if petta_path_ok && program_ok && sources_ok {
        match PettaEngine::start(config).await {
            Ok(engine) => {
                println!("   ✓ engine ready (pid {:?})", engine.id());
                Some(Kernel::ready(engine, config))
            }
            Err(e) => {
                println!("   ✗ engine failed to start: {e}");
                None
            }
        }
    } else {
        println!("   ✗ skipped, earlier checks failed");
        None
    };
    passed &= kernel.is_some();

    println!("\n5. Evaluating {VERIFY_SAMPLE}...");
    match kernel {
        Some(kernel) => {
            let execution = kernel.execute(&ExecuteRequest::new(VERIFY_SAMPLE)).await;
            kernel.shutdown(false).await;

            let text = execution
                .stream
                .as_ref()
                .map(|stream| stream.text.as_str())
                .unwrap_or("");
            if execution.is_error() {
                println!("   ✗ evaluation failed:");
                println!("     {text}");
                passed = false;
            } else {
                println!("   ✓ result: {text}");
            }
        }
        None => {
            println!("   ✗ skipped, engine is not running");
            passed = false;
        }
    }

    println!("\n{}", "=".repeat(60));
    if passed {
        println!("✓ All checks passed!");
        println!("\nStart the kernel with:");
        println!("  petta-kernel serve");
        Ok(())
    } else {
        println!("✗ Some checks failed. Please fix the issues above.");
        std::process::exit(1);
    }
}

/// First line of `<program> --version`, if it runs
async fn engine_version(program: &Path) -> Option<String> {
    let output = tokio::process::Command::new(program)
        .arg("--version")
        .output()
        .await
        .ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

fn show_config(config: &Config) {
    match config.petta_path {
        Some(ref path) => println!("PeTTa path: {}", path.display()),
        None => println!("PeTTa path: (not set)"),
    }
    println!("Scratch directory: {}", config.scratch_dir().display());
    println!("Unit extension: {}", config.unit_extension.suffix());
    println!();
    println!("Engine:");
    println!("  Program: {}", config.engine.program);
    println!("  Args: {:?}", config.engine.args);
    match config.engine.driver {
        Some(ref driver) => println!("  Driver: {}", driver.display()),
        None => println!("  Driver: (bundled)"),
    }
    println!("  Startup timeout: {}s", config.engine.startup_timeout);

    let mut env: Vec<_> = config.engine.env.iter().collect();
    env.sort();
    for (key, value) in env {
        println!("  Env {key}={value}");
    }
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
