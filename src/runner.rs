use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use clap::{Args, Command, FromArgMatches as _};

use crate::error::EpiError;
use crate::log::{info, set_log_level, set_module_filters, LevelFilter};
use crate::parameters::Parameters;
use crate::report::CountsReport;
use crate::simulation::Simulation;

/// Name of the counts report written to `--output-dir`.
pub const COUNTS_REPORT_FILE: &str = "counts.csv";

/// Command line arguments of the `epigrid` runner
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path to a JSON parameters file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional directory to write `counts.csv` into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of days to simulate, overriding the parameters' duration
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Enable logging: a level (`error`, `warn`, `info`, `debug`, `trace`), optionally followed
    /// by `module=level` filters, e.g. `warn,epigrid::measures=debug`
    #[arg(short, long)]
    pub log_level: Option<String>,
}

fn create_epigrid_cli() -> Command {
    let cli = Command::new("epigrid").about("Simulates an epidemic on a 2D population grid");
    BaseArgs::augment_args(cli)
}

/// Runs a simulation configured from the process's command line.
///
/// # Errors
/// Returns an error if argument parsing or the run fails
pub fn run() -> Result<Simulation, Box<dyn std::error::Error>> {
    let matches = create_epigrid_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_args(&args)?)
}

fn parse_level(level: &str) -> Result<LevelFilter, EpiError> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| EpiError::ConfigurationError(format!("unknown log level: {level}")))
}

/// Parses a `--log-level` value into the global level and any module filters.
fn parse_log_levels(levels: &str) -> Result<(LevelFilter, Vec<(String, LevelFilter)>), EpiError> {
    let mut global = LevelFilter::Info;
    let mut modules = Vec::new();
    for part in levels.split(',').filter(|part| !part.trim().is_empty()) {
        match part.split_once('=') {
            Some((module, level)) => modules.push((module.trim().to_string(), parse_level(level)?)),
            None => global = parse_level(part)?,
        }
    }
    Ok((global, modules))
}

fn configure_logging(levels: &str) -> Result<(), EpiError> {
    let (global, modules) = parse_log_levels(levels)?;
    set_log_level(global);
    println!("Logging enabled at level {global}");
    let filters: Vec<(&str, LevelFilter)> = modules
        .iter()
        .map(|(module, level)| (module.as_str(), *level))
        .collect();
    set_module_filters(&filters);
    for (module, level) in &filters {
        println!("Logging enabled for {module} at level {level}");
    }
    Ok(())
}

/// Loads parameters, builds and seeds the simulation, and steps it through the configured number
/// of days, writing a counts row for the initial state and after each day.
///
/// # Errors
/// Returns an error if logging, the parameters or the report cannot be set up, or a report row
/// cannot be written
pub fn run_with_args(args: &BaseArgs) -> Result<Simulation, EpiError> {
    if let Some(levels) = &args.log_level {
        configure_logging(levels)?;
    }

    let parameters = match &args.config {
        Some(path) => {
            println!("Loading parameters from: {}", path.display());
            Parameters::load(path)?
        }
        None => Parameters::default(),
    };
    let days = args.days.unwrap_or(parameters.duration);

    let mut report = match &args.output_dir {
        Some(dir) => Some(CountsReport::create(&dir.join(COUNTS_REPORT_FILE))?),
        None => None,
    };

    let mut simulation = Simulation::new(parameters, args.random_seed)?;
    simulation.seed_initial_cases();

    let start = Instant::now();
    if let Some(report) = report.as_mut() {
        report.record(&simulation)?;
    }
    for _ in 0..days {
        simulation.update();
        if let Some(report) = report.as_mut() {
            report.record(&simulation)?;
        }
    }
    info!(
        "simulated {days} days in {:.3}s",
        start.elapsed().as_secs_f64()
    );

    let counts = simulation.status_counts();
    let summary: Vec<String> = counts
        .iter()
        .map(|(status, count)| format!("{status}={count}"))
        .collect();
    println!("day {}: {}", simulation.current_day(), summary.join(" "));
    Ok(simulation)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{tempdir, NamedTempFile};

    use super::*;
    use crate::status::Status;

    #[test]
    fn run_with_defaults() {
        let args = BaseArgs {
            days: Some(5),
            ..BaseArgs::default()
        };
        let simulation = run_with_args(&args).unwrap();
        assert_eq!(simulation.current_day(), 5);
        assert_eq!(simulation.status_counts().total(), 2500);
    }

    #[test]
    fn run_with_random_seed() {
        let args = BaseArgs {
            random_seed: 42,
            days: Some(10),
            ..BaseArgs::default()
        };
        let first = run_with_args(&args).unwrap();
        let second = run_with_args(&args).unwrap();
        assert_eq!(first.base_seed(), 42);
        assert_eq!(first.status_grid(), second.status_grid());
    }

    #[test]
    fn run_with_config_path() {
        let mut config = NamedTempFile::new().unwrap();
        config
            .write_all(br#"{"grid_size": {"width": 8, "height": 6}, "duration": 3}"#)
            .unwrap();
        let args = BaseArgs {
            config: Some(config.path().to_path_buf()),
            ..BaseArgs::default()
        };
        let simulation = run_with_args(&args).unwrap();
        assert_eq!(simulation.current_day(), 3);
        assert_eq!(simulation.status_counts().total(), 48);
    }

    #[test]
    fn run_with_output_dir() {
        let temp_dir = tempdir().unwrap();
        let args = BaseArgs {
            output_dir: Some(temp_dir.path().join("out")),
            days: Some(4),
            ..BaseArgs::default()
        };
        let simulation = run_with_args(&args).unwrap();
        let mut reader =
            csv::Reader::from_path(temp_dir.path().join("out").join(COUNTS_REPORT_FILE)).unwrap();
        let rows: Vec<crate::report::DailyCounts> =
            reader.deserialize().map(Result::unwrap).collect();
        // The initial state plus one row per day.
        assert_eq!(rows.len(), 5);
        let last = rows.last().unwrap();
        assert_eq!(last.day, 4);
        assert_eq!(
            last.infected,
            simulation.status_counts()[Status::Infected]
        );
    }

    #[test]
    fn run_with_missing_config() {
        let args = BaseArgs {
            config: Some(PathBuf::from("no/such/parameters.json")),
            ..BaseArgs::default()
        };
        assert!(matches!(run_with_args(&args), Err(EpiError::IoError(_))));
    }

    #[test]
    fn parses_log_levels() {
        let (global, modules) = parse_log_levels("warn,epigrid::measures=trace").unwrap();
        assert_eq!(global, LevelFilter::Warn);
        assert_eq!(
            modules,
            vec![("epigrid::measures".to_string(), LevelFilter::Trace)]
        );

        let (global, modules) = parse_log_levels("epigrid=debug").unwrap();
        assert_eq!(global, LevelFilter::Info);
        assert_eq!(modules.len(), 1);

        assert!(matches!(
            parse_log_levels("loud"),
            Err(EpiError::ConfigurationError(_))
        ));
    }
}
