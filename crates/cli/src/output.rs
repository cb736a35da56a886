//! Printing and saving trajectories.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rkode_solvers::{Config, Mode, Trajectory};

/// Header line of delimited output files.
pub const HEADER: &str = "#Domain,Functions";

/// Writes one tab-separated row per committed sample.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn print<W: Write>(trajectory: &Trajectory, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    for (t, y) in trajectory.iter() {
        write!(out, "{t:12.9}")?;
        for value in y {
            write!(out, "\t{value:12.9}")?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

/// Writes the header then one comma-separated, zero-padded row per sample.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_delimited<W: Write>(trajectory: &Trajectory, out: &mut W) -> io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for (t, y) in trajectory.iter() {
        write!(out, "{t:012.9}")?;
        for value in y {
            write!(out, ",{value:012.9}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Returns the label used for the method in output file names.
#[must_use]
pub fn method_label(config: &Config) -> &'static str {
    match config.mode() {
        Mode::Adaptive(_) => "CashKarpRKF45",
        Mode::Fixed(_) if config.nsys() > 1 => "RK4SYS",
        Mode::Fixed(method) => method.name(),
    }
}

/// Returns `<dir>/<model>/<label>_step=<step>.dat`.
#[must_use]
pub fn output_path(dir: &Path, model: &str, label: &str, step: f64) -> PathBuf {
    dir.join(model)
        .join(format!("{label}_step={}.dat", scientific(step)))
}

/// Formats `value` with two decimals and a signed, two-digit exponent
/// (`1.00e-01`).
fn scientific(value: f64) -> String {
    let formatted = format!("{value:.2e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exponent) => {
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
            }
            Err(_) => formatted,
        },
        None => formatted,
    }
}

/// Writes `trajectory` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written.
pub fn save(path: &Path, trajectory: &Trajectory) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_delimited(trajectory, &mut out)
        .and_then(|()| out.flush())
        .with_context(|| format!("Failed to write {}", path.display()))
}
