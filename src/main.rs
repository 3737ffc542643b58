use clap::{Parser, Subcommand};
use shapecam::{commands, config::AppConfig, logging, status};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "shapecam")]
#[command(version, about = "Upload pictures to an FTP server in passive mode", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        default_value = "shapecam.json"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload one file with STOR
    Upload {
        /// Remote path passed to STOR
        #[arg(short = 'p', long = "path", value_name = "REMOTE")]
        path: String,

        /// Local file to send
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: PathBuf,
    },
    /// Resolve and probe the FTP server without logging in
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::from_file(&cli.config)?;
    logging::init_logging(&config)?;

    let outcome = match cli.command {
        Command::Upload { path, file } => {
            let (outcome, size) = commands::upload_file(&config.ftp, &path, &file).await?;
            println!("{}", status::status_text(outcome, size));
            outcome
        }
        Command::Check => {
            let outcome = commands::check(&config.ftp).await;
            println!(
                "{}",
                if outcome.is_success() {
                    "FTP server is reachable"
                } else {
                    "Failed to connect to the FTP server"
                }
            );
            outcome
        }
    };

    Ok(ExitCode::from(status::exit_code(outcome)))
}
