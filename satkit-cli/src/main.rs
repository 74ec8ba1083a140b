// Satkit CLI - Command-line front end
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # satkit
//!
//! Command-line front end for the satkit test instruments, parameter
//! store and CDAWeb mirror downloads.
//!
//! ## Usage
//!
//! ```bash
//! # Local catalog of the 1-D test instrument
//! satkit list-files --name testing
//!
//! # One day of gridded data as JSON
//! satkit generate --name testing2d --date 2009-01-01 --output day.json
//!
//! # Inspect or change settings
//! satkit params show
//! satkit params set data_dirs /data/satkit
//!
//! # Fetch files from a local CDAWeb mirror
//! satkit cdaweb-download --tags vefi.json --start 2009-01-01 --stop 2009-01-05 --data-path ./vefi
//! ```

mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::{CdawebArgs, InstrumentArgs, OutputFormat, ParamsAction};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// satkit command-line interface
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

/// Test instrument selection
#[derive(clap::Args, Debug)]
struct InstrumentOpts {
    /// Test instrument name (testing, testing2d)
    #[arg(short, long, default_value = "testing")]
    name: String,

    /// Instrument tag
    #[arg(short, long, default_value = "")]
    tag: String,

    /// Instrument id
    #[arg(long, default_value = "")]
    inst_id: String,

    /// Prefix for catalog filenames
    #[arg(long)]
    data_path: Option<String>,

    /// Init keyword, key=value (repeatable)
    #[arg(long = "init", value_parser = commands::parse_kwarg)]
    init_kwargs: Vec<(String, String)>,

    /// Load keyword, key=value (repeatable)
    #[arg(long = "load", value_parser = commands::parse_kwarg)]
    load_kwargs: Vec<(String, String)>,
}

impl From<InstrumentOpts> for InstrumentArgs {
    fn from(opts: InstrumentOpts) -> Self {
        Self {
            name: opts.name,
            tag: opts.tag,
            inst_id: opts.inst_id,
            data_path: opts.data_path,
            init_kwargs: opts.init_kwargs,
            load_kwargs: opts.load_kwargs,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a test instrument's file catalog
    ListFiles {
        #[command(flatten)]
        instrument: InstrumentOpts,

        /// List the remote catalog instead
        #[arg(long)]
        remote: bool,

        /// Remote window start (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Remote window stop (YYYY-MM-DD)
        #[arg(long)]
        stop: Option<NaiveDate>,
    },

    /// Load one day of test data and write it to a file
    Generate {
        #[command(flatten)]
        instrument: InstrumentOpts,

        /// Day to load (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format; inferred from the extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Manage the persisted settings
    Params {
        /// Settings root (defaults to SATKIT_HOME or ~/.satkit)
        #[arg(long)]
        root: Option<PathBuf>,

        #[command(subcommand)]
        action: ParamsCommand,
    },

    /// Run the qualification checks over every test instrument
    Qualify,

    /// Download files for a tag from a CDAWeb mirror
    CdawebDownload {
        /// JSON tag table
        #[arg(long)]
        tags: PathBuf,

        /// Tag to download
        #[arg(short, long, default_value = "")]
        tag: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        stop: NaiveDate,

        /// Local destination directory
        #[arg(long)]
        data_path: PathBuf,

        /// Mirror root (defaults to the user cache directory)
        #[arg(long)]
        mirror: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ParamsCommand {
    /// Print all parameters
    Show,
    /// Set a parameter; the value is parsed as JSON, else taken as a string
    Set { key: String, value: String },
    /// Remove a user parameter
    Remove { key: String },
    /// Reset parameters that have defaults
    RestoreDefaults,
    /// Reset everything, dropping user parameters
    Clear,
}

impl From<ParamsCommand> for ParamsAction {
    fn from(cmd: ParamsCommand) -> Self {
        match cmd {
            ParamsCommand::Show => ParamsAction::Show,
            ParamsCommand::Set { key, value } => ParamsAction::Set { key, value },
            ParamsCommand::Remove { key } => ParamsAction::Remove { key },
            ParamsCommand::RestoreDefaults => ParamsAction::RestoreDefaults,
            ParamsCommand::Clear => ParamsAction::Clear,
        }
    }
}

fn run(command: Command) -> commands::CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    match command {
        Command::ListFiles {
            instrument,
            remote,
            start,
            stop,
        } => {
            commands::list_files(&instrument.into(), remote, start, stop, &mut stdout)?;
        }
        Command::Generate {
            instrument,
            date,
            output,
            format,
        } => {
            commands::generate(&instrument.into(), date, &output, format, &mut stdout)?;
        }
        Command::Params { root, action } => {
            commands::params(root, action.into(), &mut stdout)?;
        }
        Command::Qualify => {
            commands::qualify(&mut stdout)?;
        }
        Command::CdawebDownload {
            tags,
            tag,
            start,
            stop,
            data_path,
            mirror,
        } => {
            let args = CdawebArgs {
                tags_file: tags,
                tag,
                start,
                stop,
                data_path,
                mirror,
            };
            commands::cdaweb_download(&args, &mut stdout)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("satkit v{}", env!("CARGO_PKG_VERSION"));

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
