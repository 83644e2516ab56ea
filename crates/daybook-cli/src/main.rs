//! Daybook CLI
//!
//! Command-line interface for daybook - a personal journal with a lock.
//! Everything here is glue around the core store: the PIN gate decides
//! whether the store may be invoked at all, the command handlers drive
//! it, and the output layer renders what it returns.

use std::fs::File;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use daybook_core::{AttachmentManager, Config, Store};

mod commands;
mod editor;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Daybook - a personal journal with a lock")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a new journal entry
    Add {
        /// Entry text (opens editor if omitted and no image is given)
        text: Option<String>,
        /// Attach an image by path
        #[arg(short, long)]
        image: Option<String>,
    },
    /// List all entries, most recent first
    #[command(alias = "ls")]
    List,
    /// Show one entry in full
    Show {
        /// Entry id
        id: i64,
    },
    /// Edit an entry's text and/or image
    Edit {
        /// Entry id
        id: i64,
        /// New text (opens editor prefilled if omitted)
        #[arg(long)]
        text: Option<String>,
        /// Replace the attached image
        #[arg(long, conflicts_with = "remove_image")]
        image: Option<String>,
        /// Remove the attached image
        #[arg(long)]
        remove_image: bool,
    },
    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage the unlock PIN
    Pin {
        #[command(subcommand)]
        command: PinCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum PinCommands {
    /// Set (or change) the 4-digit PIN
    Set,
    /// Show whether a PIN is set
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the data dir or the gate
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let config = Config::load()?;
    init_logging(&config);
    tracing::debug!(data_dir = %config.data_dir.display(), "configuration loaded");

    // PIN management has its own verification flow
    if let Commands::Pin { command } = &cli.command {
        return match command {
            PinCommands::Set => commands::pin::set(&config, &output),
            PinCommands::Status => commands::pin::status(&config, &output),
        };
    }

    // Everything below touches the store, so the gate comes first
    commands::pin::ensure_unlocked(&config)?;

    let store = Store::with_config(config.clone());
    let attachments = AttachmentManager::new(&config);

    match cli.command {
        Commands::Add { text, image } => {
            commands::entry::add(&store, &attachments, text, image, &output)
        }
        Commands::List => commands::entry::list(&store, &output),
        Commands::Show { id } => commands::entry::show(&store, &attachments, id, &output),
        Commands::Edit {
            id,
            text,
            image,
            remove_image,
        } => commands::entry::edit(&store, &attachments, id, text, image, remove_image, &output),
        Commands::Delete { id, yes } => commands::entry::delete(&store, id, yes, &output),
        Commands::Pin { .. } | Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

/// Initialize diagnostic logging when DAYBOOK_LOG is set
///
/// Logs go to the configured log file if there is one, otherwise to
/// stderr, so human output on stdout stays clean.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("DAYBOOK_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "daybook_core={},daybook_cli={}",
        log_level, log_level
    ));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false);

    match &config.log_file {
        Some(path) => match File::create(path) {
            Ok(file) => {
                let _ = builder.with_writer(file).try_init();
            }
            Err(e) => {
                eprintln!("Warning: could not create log file {:?}: {}", path, e);
            }
        },
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}
