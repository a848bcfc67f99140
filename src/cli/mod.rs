//! Command-line parsing for the `nlls` curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "nlls",
    version,
    about = "Gauss-Newton curve fitter for LIF spectra and double-probe I-V traces"
)]
pub struct Cli {
    /// Raise log verbosity (`-v` info, `-vv` debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model to one or more two-column data files.
    Fit(FitArgs),
    /// Generate a synthetic two-column data file from a model.
    Synth(SynthArgs),
    /// Print a previously written JSON fit report.
    Show(ShowArgs),
}

/// Options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Model to fit.
    #[arg(short, long, value_enum, default_value_t = ModelKind::Gaussian)]
    pub model: ModelKind,

    /// Input file with whitespace-separated `x y` columns (repeatable).
    #[arg(short = 'f', long = "file", value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Initial parameters, comma-separated in model order (defaults per model).
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub guess: Vec<f64>,

    /// Maximum number of Gauss-Newton iterations.
    #[arg(long, default_value_t = 100)]
    pub max_iter: usize,

    /// Convergence tolerance on the squared step norm.
    #[arg(long, default_value_t = 1.0e-8)]
    pub tol: f64,

    /// Sample the fitted curve on a fixed x step (default for the Gaussian model: 1e-4).
    #[arg(long, conflicts_with = "at_inputs")]
    pub step: Option<f64>,

    /// Sample the fitted curve at the input x values (default for the tanh model).
    #[arg(long)]
    pub at_inputs: bool,

    /// Do not write `<input>_fit.dat`.
    #[arg(long)]
    pub no_curve: bool,

    /// Write a JSON report of all fits.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    /// Render an ASCII plot of data and fit in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for synthetic data generation.
#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// Model to sample.
    #[arg(short, long, value_enum, default_value_t = ModelKind::Gaussian)]
    pub model: ModelKind,

    /// True parameters, comma-separated in model order (defaults per model).
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub params: Vec<f64>,

    /// Lower end of the x range (defaults per model).
    #[arg(long, allow_negative_numbers = true)]
    pub x_min: Option<f64>,

    /// Upper end of the x range (defaults per model).
    #[arg(long, allow_negative_numbers = true)]
    pub x_max: Option<f64>,

    /// Number of points.
    #[arg(short = 'n', long, default_value_t = 301)]
    pub n_points: usize,

    /// Standard deviation of additive Gaussian noise.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output file.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

/// Options for showing a saved report.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Report JSON produced by `nlls fit --json`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_args_parse_negative_guesses_and_repeated_files() {
        let cli = Cli::try_parse_from([
            "nlls", "fit", "-m", "tanh", "-f", "a.dat", "-f", "b.dat", "--guess=-3.3e-6,3", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.model, ModelKind::Tanh);
        assert_eq!(args.files, vec![PathBuf::from("a.dat"), PathBuf::from("b.dat")]);
        assert_eq!(args.guess, vec![-3.3e-6, 3.0]);
        assert_eq!(args.max_iter, 100);
        assert_eq!(args.tol, 1.0e-8);
    }

    #[test]
    fn fit_requires_a_file() {
        assert!(Cli::try_parse_from(["nlls", "fit"]).is_err());
    }

    #[test]
    fn step_conflicts_with_at_inputs() {
        let res = Cli::try_parse_from(["nlls", "fit", "-f", "a.dat", "--step", "0.1", "--at-inputs"]);
        assert!(res.is_err());
    }
}
