use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use arcode::{run, run_decode, run_encode, Summary};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arcode")]
#[command(about = "Block arithmetic coder for byte streams")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file into codes and write its model file
    Encode {
        /// Input file path
        source: PathBuf,
        /// Output code file path
        dest: PathBuf,
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Decode a code file back into bytes
    Decode {
        /// Input code file path
        source: PathBuf,
        /// Output file path
        dest: PathBuf,
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Encode or decode, as the configuration's `target` says
    Run {
        /// Input file path
        source: PathBuf,
        /// Output file path
        dest: PathBuf,
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn init_logging(verbose: bool, log_file: Option<&PathBuf>) -> std::io::Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_ref()) {
        eprintln!("cannot open log file: {e}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Commands::Encode {
            source,
            dest,
            config,
        } => run_encode(source, dest, config).map(Summary::Encode),
        Commands::Decode {
            source,
            dest,
            config,
        } => run_decode(source, dest, config).map(Summary::Decode),
        Commands::Run {
            source,
            dest,
            config,
        } => run(source, dest, config),
    };

    match result {
        Ok(Summary::Encode(s)) => {
            println!(
                "encoded {} bytes ({} symbols) into {} codes of {}",
                s.text_len, s.symbols, s.codes, s.block_size
            );
            ExitCode::SUCCESS
        }
        Ok(Summary::Decode(s)) => {
            println!("decoded {} codes into {} bytes", s.codes, s.text_len);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = ?e.kind(), "{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
