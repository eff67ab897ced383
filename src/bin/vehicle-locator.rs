use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use vehicle_locator::{Config, Pruning, RunReport, Strategy, run};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Vehicle position file. Falls back to $VEHICLE_POSITIONS_PATH, then the config.
    path: Option<PathBuf>,

    /// JSON (or TOML with the `toml` feature) configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Index to build: kd_tree, grid or linear.
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Grid cell size in degrees.
    #[arg(long)]
    cell_size: Option<f32>,

    /// K-d tree pruning rule: planar or great_circle.
    #[arg(long)]
    pruning: Option<Pruning>,
}

impl Args {
    fn into_config(self) -> vehicle_locator::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        }
        .with_env_overrides();

        if let Some(path) = self.path {
            config = config.with_data_path(path);
        }
        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy);
        }
        if let Some(cell_size) = self.cell_size {
            config = config.with_cell_size(cell_size);
        }
        if let Some(pruning) = self.pruning {
            config = config.with_pruning(pruning);
        }

        Ok(config)
    }
}

fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        let target = outcome.target;
        match &outcome.matched {
            Some(vehicle) => println!(
                "Closest vehicle to ({}, {}): VehicleId {}",
                target.latitude, target.longitude, vehicle.id
            ),
            None => println!(
                "Closest vehicle to ({}, {}): none",
                target.latitude, target.longitude
            ),
        }
    }
    println!("Execution Time: {} ms", report.elapsed.as_millis());
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let result = args.into_config().and_then(|config| {
        log::info!(
            "Locating {} queries in {} using {}",
            config.queries.len(),
            config.data_path.display(),
            config.strategy
        );
        run(&config)
    });

    match result {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
