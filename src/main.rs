use clap::{ArgGroup, Parser, Subcommand};
use folio_legacy_worker::config::{self, RunConfig};
use folio_legacy_worker::imaging::MagickBackend;
use folio_legacy_worker::naming::NamingConvention;
use folio_legacy_worker::package::ZipArchiveWriter;
use folio_legacy_worker::{output, process};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Error, Debug)]
enum OptionError {
    #[error("option --dir must be defined")]
    MissingDir,
    #[error("option --dir must be a valid directory: {0}")]
    NotADirectory(PathBuf),
    #[error("type must be defined: pass --ringier or --smd")]
    MissingConvention,
}

#[derive(Parser)]
#[command(name = "ff-legacy-worker")]
#[command(about = "Renames PDFs and JPGs in directories to FutureFolio naming convention")]
#[command(long_about = "\
Renames PDFs and JPGs in directories to FutureFolio naming convention

Expects directories with issues to be named <si_YearMonthDay> (e.g. si_20100802).

  legacy/                          # --dir
  ├── si_20100802/
  │   ├── si_20100802_1_1_01.pdf   # SMD: page number is the last field
  │   ├── si_20100802_1_1_01.jpg
  │   └── ...
  └── si_20100809/
      ├── a.pdf                    # Ringier: pages numbered in name order
      └── ...

Files are renamed in place to page-0.pdf, page-0.jpg, page-1.pdf, ...
With --package, <issue>.zip is written next to each issue directory.")]
#[command(version = version_string())]
#[command(group(ArgGroup::new("convention").args(["ringier", "smd"]).multiple(false)))]
struct Cli {
    /// Working directory containing directories with legacy files
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Work on Ringier legacy files (pages numbered by filename order)
    #[arg(long)]
    ringier: bool,

    /// Work on SMD legacy files (page number embedded in the filename)
    #[arg(long)]
    smd: bool,

    /// Render page-<n>.jpg thumbnails from the PDFs instead of renaming JPGs
    #[arg(long)]
    thumbnails: bool,

    /// Write <issue>.zip with pages, backgrounds and manifest.xml
    #[arg(long)]
    package: bool,

    /// Directory holding the package background images (overrides config)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Show planned renames without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Config file (default: <dir>/config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a stock config.toml with all options documented
    GenConfig,
}

impl Cli {
    fn convention(&self) -> Result<NamingConvention, OptionError> {
        match (self.ringier, self.smd) {
            (true, _) => Ok(NamingConvention::Ringier),
            (_, true) => Ok(NamingConvention::Smd),
            _ => Err(OptionError::MissingConvention),
        }
    }

    fn dir(&self) -> Result<PathBuf, OptionError> {
        let dir = self.dir.clone().ok_or(OptionError::MissingDir)?;
        if dir.as_os_str().is_empty() {
            return Err(OptionError::MissingDir);
        }
        if !dir.is_dir() {
            return Err(OptionError::NotADirectory(dir));
        }
        Ok(dir)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    match try_main(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn try_main(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if let Some(Command::GenConfig) = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    init_tracing(cli.verbose);

    let convention = cli.convention()?;
    let dir = cli.dir()?;
    let worker = config::load_config(cli.config.as_deref(), &dir)?;

    let mut run_config = RunConfig::from_worker_config(dir, convention, &worker);
    run_config.thumbnails = cli.thumbnails;
    run_config.package = cli.package;
    run_config.dry_run = cli.dry_run;
    if let Some(assets) = cli.assets {
        run_config.assets_dir = assets;
    }

    let backend = MagickBackend::new(&worker.thumbnails.magick_binary);
    let summary = process::run(
        &run_config,
        &backend,
        &ZipArchiveWriter,
        output::print_process_event,
    )?;
    output::print_run_summary(&summary);

    Ok(if summary.failed() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
