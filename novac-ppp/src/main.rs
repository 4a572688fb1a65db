//! Entry point: normalizes legacy CLI flags, merges them over the hardcoded
//! configuration defaults, loads the run's catalogs, and drives the orchestrator
//! through one complete run.

use clap::Parser;

use novac_model::meta::VolcanoCatalog;
use novac_process::{Config, Orchestrator};

use novac_ppp::cli::{self, Cli};
use novac_ppp::reader::JsonRawScanReader;
use novac_ppp::result::{Error, Result};
use novac_ppp::bootstrap;

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("{err}");
        eprintln!("novac-ppp: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::normalize_legacy_flags(std::env::args());
    let cli = Cli::parse_from(args);

    let from_date = cli::parse_date("fromdate", &cli.fromdate)?;
    let to_date = cli::parse_date("todate", &cli.todate)?;
    let mode = cli::parse_mode(&cli.mode)?;
    let molecule = cli::parse_molecule(&cli.molecule)?;

    let mut config = Config::defaults(from_date, to_date, cli.volcano.clone(), cli.outputdirectory.clone());
    config.mode = mode;
    config.molecule = molecule;
    if let Some(threads) = cli.maxthreadnum {
        config.max_thread_num = threads;
    }
    config.local_directory = cli.localdirectory.clone();
    config.ftp_directory = cli.ftpdirectory.clone();
    config.ftp_username = cli.ftpusername.clone();
    config.ftp_password = cli.ftppassword.clone();
    config.include_subdirs_local = cli.includesubdirs_local;
    config.include_subdirs_ftp = cli.includesubdirs_ftp;
    config.upload_results = cli.uploadresults;
    config.temp_directory = cli.tempdirectory.clone();
    config.wind_field_file = cli.windfieldfile.clone();

    let workdir = match cli.workdir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(Error::Io)?,
    };
    let bootstrap_path = workdir.join("configuration").join("bootstrap.json");
    let bootstrap = if bootstrap_path.exists() {
        bootstrap::load(&bootstrap_path)?
    } else {
        bootstrap::Bootstrap { volcanoes: VolcanoCatalog::new(Vec::new()), locations: Default::default(), fit_windows: Vec::new() }
    };

    let reader = JsonRawScanReader;
    let orchestrator = Orchestrator::new(&config, &bootstrap.volcanoes, &bootstrap.locations, &bootstrap.fit_windows, &reader);

    let statistics = orchestrator.run(chrono::Utc::now())?;
    log::info!("run complete:\n{}", statistics.render());

    Ok(())
}
