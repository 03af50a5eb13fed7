//! # Rotation - MPD play history & auto-curated playlists
//!
//! Foreground entry point. Parses the CLI, resolves the runtime
//! configuration and routes to the watch loop, the daemon management
//! commands or the chart printer.
//!
//! Exit codes mirror the failure origin: 2 when MPD cannot be reached,
//! 3 when the history database cannot be opened or initialized.

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use rotation::config::RuntimeConfig;
use rotation::daemon::{self, Watcher};
use rotation::mpd::MpdClient;
use rotation::store::Store;
use rotation::{cli, playlist};

const EXIT_MPD_CONNECT: i32 = 2;
const EXIT_STORE_INIT: i32 = 3;

fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config = RuntimeConfig::resolve(args.host, args.port, args.db_path, args.interval_ms)?;

    match args.command {
        cli::Command::Run => {
            info!("starting watch loop against {}:{}", config.mpd_host, config.mpd_port);
            watch(&config);
        }
        cli::Command::Charts { chart } => {
            let store = open_store(&config);
            for (rank, name) in chart.ranking().fetch(&store)?.iter().enumerate() {
                println!("{:3}. {name}", rank + 1);
            }
        }
        cli::Command::Daemon { action } => match action {
            cli::DaemonAction::Start => start_daemon(&config)?,
            cli::DaemonAction::Stop => {
                daemon::stop()?;
                println!("Daemon stopped");
            }
            cli::DaemonAction::Status => {
                if daemon::is_running()? {
                    println!("Daemon is running");
                } else {
                    println!("Daemon is not running");
                }
            }
        },
    }

    Ok(())
}

/// Connect both collaborators and run the watch loop until it dies.
fn watch(config: &RuntimeConfig) -> ! {
    let mut client = match MpdClient::connect(&config.mpd_host, config.mpd_port) {
        Ok(client) => client,
        Err(e) => {
            error!("{e}");
            std::process::exit(EXIT_MPD_CONNECT);
        }
    };
    let store = open_store(config);

    info!(
        "maintaining {} playlists from {}",
        playlist::standard_plans().len(),
        config.db_path.display()
    );

    let mut watcher = Watcher::new(config);
    let outcome = watcher.run(&mut client, &store);
    daemon::remove_pid_file();
    match outcome {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!("watch loop ended: {e}");
            std::process::exit(EXIT_MPD_CONNECT);
        }
    }
}

fn open_store(config: &RuntimeConfig) -> Store {
    match Store::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            error!("{e}");
            std::process::exit(EXIT_STORE_INIT);
        }
    }
}

/// Fork a watch loop into the background, detached from the terminal.
fn start_daemon(config: &RuntimeConfig) -> Result<()> {
    if daemon::is_running()? {
        eprintln!("Daemon is already running");
        return Ok(());
    }

    match unsafe { libc::fork() } {
        0 => {
            // Child: become the daemon.
            daemon::write_pid_file()?;
            watch(config);
        }
        pid if pid > 0 => {
            println!("Starting watch daemon...");
            std::thread::sleep(std::time::Duration::from_millis(500));

            if daemon::is_running()? {
                println!("Daemon started successfully");
            } else {
                eprintln!("Failed to start daemon");
            }
        }
        _ => {
            eprintln!("Failed to fork process");
        }
    }

    Ok(())
}
