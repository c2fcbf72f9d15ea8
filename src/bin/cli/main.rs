use std::env;

use anyhow::Result;
use dotenvy::dotenv;
use tracing::{error, info};

use authorbench::{bench, config::Config, logger};

mod command_parser;

async fn run(matches: &clap::ArgMatches) -> Result<()> {
    let mut config = Config::read_config(command_parser::config_path(matches).as_deref())?;
    command_parser::apply_overrides(&mut config, matches)?;
    config.validate()?;

    let _guard = logger::init(&config.log)?;
    info!(
        "Benchmarking {:?} with {} iterations (seed: {:?}).",
        config.backends, config.iterations, config.seed
    );

    match bench::run(&config).await {
        Ok(comparison) => {
            comparison.log_summary();
            if let Some(path) = &config.report.csv {
                comparison.write_csv(path)?;
            }
            Ok(())
        }
        Err(e) => {
            error!("Benchmark failed: {e:#}");
            Err(e)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine.
    dotenv().ok();

    let args_parsed = command_parser::arg_parser().get_matches_from(env::args_os());

    match args_parsed.subcommand() {
        Some(("run", matches)) => run(matches).await?,
        Some(("config", _)) => print!("{}", Config::default_as_string()?),
        Some((name, _)) => unimplemented!("{}", name),
        None => unreachable!("subcommand required"),
    }

    Ok(())
}
