use anyhow::Context;
use clap::Parser;
use enroller::config::{Cli, RunConfig};
use enroller::report::{self, ReportDetail};
use enroller::ufo::UfoClient;
use enroller::{loader, session, Enroller};
use log::{error, info};
use std::fs::File;
use std::io::{self, BufWriter};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(1);
        }
        Err(err) => err.exit(),
    };

    if let Err(err) = cli
        .into_run_config()
        .map_err(anyhow::Error::from)
        .and_then(run)
    {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(config: RunConfig) -> anyhow::Result<()> {
    let rows = loader::load(&config.path, config.column_order)
        .with_context(|| format!("could not load {}", config.path.display()))?;
    info!("loaded {} rows from {}", rows.len(), config.path.display());

    let client = UfoClient::new();
    let session = session::establish(&client, &config.tenant_url, config.auth)
        .context("authentication failed")?;

    // must exist before the first row is submitted
    let results_log = match config.detail {
        ReportDetail::FullResultsLog => Some(File::create(&config.log_file).with_context(|| {
            format!("could not create results log {}", config.log_file.display())
        })?),
        ReportDetail::BasicErrorsOnly => None,
    };

    let results = Enroller::new(&client, &config.domain, &config.identity_type)
        .process(&session, rows);

    let summary = match results_log {
        Some(log_file) => {
            let summary = report::report(
                &results,
                config.detail,
                BufWriter::new(log_file),
                io::stdout(),
            )?;
            info!("results written to {}", config.log_file.display());
            summary
        }
        None => report::report(&results, config.detail, io::sink(), io::sink())?,
    };
    info!(
        "finished: {} of {} rows succeeded",
        summary.successes, summary.total
    );
    Ok(())
}
