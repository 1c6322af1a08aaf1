use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use dir_backup::backup::backup_config::ConfigLayer;
use dir_backup::backup::logging;
use dir_backup::backup::orchestrator::Orchestrator;
use dir_backup::backup::result_error::result::Result;
use dir_backup::backup::toolbox::Toolbox;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

/// Archive a directory into a timestamped .tar.gz
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, disable_help_flag = true)]
struct Args {
    /// Directory to back up
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Directory receiving the archive and backup.log
    #[arg(short, long)]
    backup_dir: Option<PathBuf>,

    /// YAML file with default settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gzip compression level
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=9))]
    level: Option<u32>,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Do not color console output
    #[arg(long)]
    no_color: bool,

    /// Print help
    #[arg(short, long)]
    help: bool,
}

impl Args {
    fn into_layer(self) -> Result<ConfigLayer> {
        let file_layer = match &self.config {
            Some(path) => ConfigLayer::load(path)?,
            None => ConfigLayer::default(),
        };
        let cli_layer = ConfigLayer {
            source_dir: self.source,
            backup_dir: self.backup_dir,
            level: self.level,
            progress: self.no_progress.then_some(false),
            color: self.no_color.then_some(false),
        };
        Ok(cli_layer.or(file_layer))
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if args.help {
        let _ = Args::command().print_help();
        return ExitCode::FAILURE;
    }

    let config = match args.into_layer().and_then(ConfigLayer::into_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let color = config.color() && std::io::stdout().is_terminal();
    colored::control::set_override(color);

    let _log = match logging::install(config.log_file(), color) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", config.log_file().display());
            return ExitCode::FAILURE;
        }
    };

    match Orchestrator::new(&config, &Toolbox::builtin(&config)).run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
