//! clipqa: watches the clipboard and swaps known questions for their answers.
//!
//! - `clipqa` / `clipqa start`: spawn the monitor in the background
//! - `clipqa stop`: kill the background monitor
//! - `clipqa --background`: run the monitor loop in this process (used by start)

mod clipboard;
mod config;
mod controller;
mod logging;
mod monitor;
mod qa;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clipboard::SystemClipboard;
use colored::*;
use config::Config;
use controller::{Controller, PidFile, StopOutcome};
use monitor::{Monitor, SystemClock};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "clipqa")]
#[command(about = "Replace copied questions with their answers from a Q&A file")]
struct Args {
    /// Run the monitor loop in this process
    #[arg(long, hide = true)]
    background: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the clipboard monitor in the background (default)
    Start,
    /// Stop the background clipboard monitor
    Stop,
}

fn run_monitor(config: &Config) -> Result<()> {
    let store = qa::load_store(&config.qa_file)?;
    if store.is_empty() {
        if config.qa_file.exists() {
            println!(
                "{} No Q&A entries in {}",
                "✗".yellow(),
                config.qa_file.display()
            );
        } else {
            println!("{} File not found: {}", "✗".red(), config.qa_file.display());
        }
        return Ok(());
    }

    let mut clipboard = SystemClipboard::new()?;
    let mut monitor = Monitor::new(store, config.poll_interval);
    println!("Clipboard monitor running... (use `clipqa stop` to quit)");
    monitor.run(&mut clipboard, &mut SystemClock)
}

fn start(config: &Config) -> Result<()> {
    let controller = Controller::system(PidFile::new(&config.pid_file));
    let pid = controller.start()?;
    println!(
        "{} Clipboard monitor started in background at {} (PID {}). You can close this window.",
        "✓".green(),
        chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
        pid
    );
    Ok(())
}

fn stop(config: &Config) -> Result<()> {
    let controller = Controller::system(PidFile::new(&config.pid_file));
    match controller.stop()? {
        StopOutcome::NotRunning => {
            println!("{} No running background process found.", "✗".yellow());
        }
        StopOutcome::Stopped(pid) => {
            println!("{} Clipboard monitor (PID {}) stopped.", "✓".green(), pid);
        }
        StopOutcome::Failed { pid, reason } => {
            let target = pid.map(|p| format!(" (PID {})", p)).unwrap_or_default();
            eprintln!("{} Failed to stop process{}: {}", "✗".red(), target, reason);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::default();

    if args.background {
        let _guard = logging::init_background(&config.log_file)?;
        let result = run_monitor(&config);
        if let Err(e) = &result {
            error!(error = %format!("{:#}", e), "Clipboard monitor exited");
        }
        return result;
    }

    logging::init_foreground();
    match args.command {
        Some(Commands::Stop) => stop(&config),
        Some(Commands::Start) | None => start(&config),
    }
}
