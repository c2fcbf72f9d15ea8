use std::path::PathBuf;

use clap::{builder::PossibleValuesParser, value_parser, Arg, ArgMatches, Command};

use authorbench::config::{BackendSelection, Config};

pub fn arg_parser() -> Command {
    Command::new("authorbench")
        .about("Compare hand-written sqlx queries against sea-orm on an authors table")
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Run the benchmark")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("Config file, defaults to ./authorbench.toml"),
                )
                .arg(
                    Arg::new("iterations")
                        .long("iterations")
                        .short('n')
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .help("Calls per operation and backend"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .value_parser(value_parser!(u64))
                        .help("Seed for the generated authors"),
                )
                .arg(
                    Arg::new("backend")
                        .long("backend")
                        .short('b')
                        .value_parser(PossibleValuesParser::new(["sqlx", "orm", "both"]))
                        .help("Which backends to benchmark"),
                )
                .arg(
                    Arg::new("csv")
                        .long("csv")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write the results as CSV"),
                ),
        )
        .subcommand(Command::new("config").about("Print the default configuration"))
}

pub fn config_path(matches: &ArgMatches) -> Option<PathBuf> {
    matches.get_one::<PathBuf>("config").cloned()
}

/// Applies the command line flags on top of the loaded config.
pub fn apply_overrides(config: &mut Config, matches: &ArgMatches) -> anyhow::Result<()> {
    if let Some(iterations) = matches.get_one::<usize>("iterations") {
        config.iterations = *iterations;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    if let Some(backend) = matches.get_one::<String>("backend") {
        config.backends = backend.parse::<BackendSelection>()?;
    }
    if let Some(csv) = matches.get_one::<PathBuf>("csv") {
        config.report.csv = Some(csv.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_matches(args: &[&str]) -> ArgMatches {
        let matches = arg_parser()
            .try_get_matches_from(args)
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "run");
        sub.clone()
    }

    #[test]
    fn parser_is_valid() {
        arg_parser().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let matches = run_matches(&[
            "authorbench", "run", "-n", "5", "--seed", "3", "--backend", "orm", "--csv", "out.csv",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &matches).unwrap();
        assert_eq!(config.iterations, 5);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.backends, BackendSelection::Orm);
        assert_eq!(config.report.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(config_path(&matches), None);
    }

    #[test]
    fn no_flags_keep_config() {
        let matches = run_matches(&["authorbench", "run", "--config", "bench.toml"]);
        let mut config = Config::default();
        apply_overrides(&mut config, &matches).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config_path(&matches), Some(PathBuf::from("bench.toml")));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(arg_parser()
            .try_get_matches_from(["authorbench", "run", "--backend", "gorm"])
            .is_err());
    }
}
