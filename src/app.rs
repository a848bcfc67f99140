//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs the logger
//! - runs fits over the input files
//! - prints summaries/plots
//! - writes fitted curves and optional JSON reports

use clap::Parser;
use log::info;

use crate::cli::{Command, FitArgs, ShowArgs, SynthArgs};
use crate::data::{SampleSpec, generate_sample};
use crate::domain::{CurveSampling, FitConfig};
use crate::error::AppError;
use crate::fit::GaussNewtonSettings;

pub mod pipeline;

/// Entry point for the `nlls` binary.
pub fn run() -> Result<(), AppError> {
    // `nlls -f data.dat` is accepted as shorthand for `nlls fit -f data.dat`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Synth(args) => handle_synth(args),
        Command::Show(args) => handle_show(args),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // A logger may already be installed when running under a test harness.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let outcomes = pipeline::run_fits(&config)?;

    for outcome in &outcomes {
        println!("{}", crate::report::format_fit_outcome(outcome));
        if config.plot {
            let plot = crate::plot::render_ascii_plot(
                &outcome.series,
                outcome.model,
                &outcome.params,
                config.plot_width,
                config.plot_height,
            );
            println!("{plot}");
        }
    }
    if outcomes.len() > 1 {
        print!("{}", crate::report::format_batch_footer(&outcomes));
    }

    if let Some(path) = &config.report_json {
        let reports: Vec<_> = outcomes
            .iter()
            .map(|o| crate::report::build_report(o, &config.settings))
            .collect();
        crate::io::write_reports_json(path, &reports)?;
        info!("wrote {} report(s) to '{}'", reports.len(), path.display());
    }

    pipeline::first_failure(&outcomes)
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let defaults = SampleSpec::for_model(args.model);
    let spec = SampleSpec {
        model: args.model,
        params: if args.params.is_empty() {
            defaults.params
        } else {
            args.params.clone()
        },
        x_min: args.x_min.unwrap_or(defaults.x_min),
        x_max: args.x_max.unwrap_or(defaults.x_max),
        n_points: args.n_points,
        noise_sigma: args.noise,
        seed: args.seed,
    };

    let series = generate_sample(&spec)?;
    let n = crate::io::write_columns(&args.output, series.points())?;
    println!(
        "Wrote {n} {} samples to: {}",
        spec.model.display_name(),
        args.output.display()
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let reports = crate::io::read_reports_json(&args.report)?;
    for report in &reports {
        println!("{}", crate::report::format_report_summary(report));
    }
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let sampling = if args.at_inputs {
        CurveSampling::AtInputs
    } else if let Some(step) = args.step {
        CurveSampling::Step { step }
    } else {
        args.model.default_sampling()
    };

    FitConfig {
        model: args.model,
        inputs: args.files.clone(),
        initial: if args.guess.is_empty() {
            args.model.default_guess()
        } else {
            args.guess.clone()
        },
        settings: GaussNewtonSettings {
            max_iter: args.max_iter,
            tolerance: args.tol,
        },
        sampling,
        write_curve: !args.no_curve,
        report_json: args.json.clone(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}

/// Rewrite argv so a bare flag list defaults to `nlls fit`.
///
/// Rules:
/// - `nlls -f x.dat ...`          -> `nlls fit -f x.dat ...`
/// - `nlls -v -f x.dat`           -> `nlls -v fit -f x.dat`
/// - `nlls`, `nlls --help/-V`     -> unchanged
/// - `nlls <subcommand> ...`      -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let is_verbose_flag = |a: &str| a == "--verbose" || (a.len() > 1 && a.starts_with('-') && a[1..].chars().all(|c| c == 'v'));

    let Some(pos) = argv.iter().skip(1).position(|a| !is_verbose_flag(a.as_str())).map(|p| p + 1) else {
        return argv;
    };

    let first = argv[pos].as_str();
    let is_help_or_version = matches!(first, "-h" | "--help" | "-V" | "--version" | "help");
    let is_subcommand = matches!(first, "fit" | "synth" | "show");
    if is_help_or_version || is_subcommand {
        return argv;
    }

    if first.starts_with('-') {
        argv.insert(pos, "fit".to_string());
    }
    argv
}
