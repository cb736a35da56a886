use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, Command};
use rkode_solvers::integrate::{self, Predicate, Status};

mod models;
mod output;
mod run_file;

fn main() -> Result<()> {
    let matches = Command::new("rkode")
        .about("Integrates a built-in ODE model with fixed-step or adaptive Runge-Kutta methods.")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("path")
                .help("Path of the run file (TOML, or JSON with a .json extension)")
                .value_name("PATH")
                .required(true),
        )
        .arg(
            Arg::new("output-dir")
                .help("Directory that receives <model>/<method>_step=<step>.dat")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .default_value("iodata"),
        )
        .arg(
            Arg::new("no-write")
                .help("Skip writing the delimited output file")
                .long("no-write")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .help("Raise the logging level (repeatable)")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count),
        )
        .get_matches();

    let path = matches
        .get_one::<String>("path")
        .ok_or(anyhow!("Failed to specify path argument"))?;
    let run = run_file::load(Path::new(path))?;

    env_logger::builder()
        .filter_level(run.logging.filter(matches.get_count("verbose")))
        .init();

    log::info!("Running {} from {path}", run.model_name());

    let config = run.to_config().context("Invalid run file")?;
    log::info!(
        "Using {} over [{}, {}]",
        output::method_label(&config),
        config.domain()[0],
        config.domain()[1]
    );

    let model = &run.model;
    let events = Predicate(|t: f64, y: &[f64]| model.events(t, y));
    let solution = integrate::solve(model, &config, events)
        .with_context(|| format!("Failed to integrate {}", run.model_name()))?;

    match solution.status {
        Status::Complete => log::info!("Reached the end of the domain"),
        Status::StoppedByEvent => log::info!(
            "Stopped by event after sample {}",
            solution.last_index()
        ),
    }
    log::info!(
        "{} samples, {} steps ({} rejected), {} derivative evaluations",
        solution.trajectory.len(),
        solution.stats.steps,
        solution.stats.rejected,
        solution.stats.evaluations
    );
    if solution.stats.unconverged_correctors > 0 {
        log::warn!(
            "Heun corrector hit its iteration cap on {} steps",
            solution.stats.unconverged_correctors
        );
    }

    if run.print_result.is_on() {
        output::print(&solution.trajectory, &mut io::stdout().lock())
            .context("Failed to print results")?;
    }

    if !matches.get_flag("no-write") {
        let dir = matches
            .get_one::<String>("output-dir")
            .map(PathBuf::from)
            .ok_or(anyhow!("Failed to specify output directory"))?;
        let file = output::output_path(
            &dir,
            run.model_name(),
            output::method_label(&config),
            config.step(),
        );
        output::save(&file, &solution.trajectory)?;
        log::info!("Data written to {}", file.display());
    }

    Ok(())
}
