//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - dispatches to the fit / search / catalog handlers
//! - prints reports and plots

use clap::Parser;
use env_logger::Env;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Command, DeleteArgs, FitArgs, PumpMetaArgs, SearchArgs, ShowArgs};
use crate::domain::{
    DEFAULT_TOLERANCE_PERCENT, DutyPoint, FitRequest, FitSource, OperatingEnvelope, PumpRecord, SearchConfig, Units,
};
use crate::error::AppError;
use crate::io::JsonCatalog;
use crate::selection::{SystemCurve, operating_point};

pub mod pipeline;

/// Environment variable holding the default selection tolerance (percent).
pub const TOLERANCE_ENV: &str = "PUMPSEL_TOLERANCE";

/// Entry point for the `pumpsel` binary.
pub fn run() -> Result<(), AppError> {
    // Load .env (if present) so PUMPSEL_* settings can live next to the catalog.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog = JsonCatalog::resolve(cli.catalog.as_deref());
    debug!("Using catalog '{}'", catalog.path().display());

    match cli.command {
        Command::Fit(args) => handle_fit(args, &catalog),
        Command::Search(args) => handle_search(args, &catalog),
        Command::List => handle_list(&catalog),
        Command::Show(args) => handle_show(args, &catalog),
        Command::Delete(args) => handle_delete(args, &catalog),
    }
}

fn init_logging(verbose: u8) {
    let level = verbosity_filter(verbose);
    env_logger::Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .init();
}

fn verbosity_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn handle_fit(args: FitArgs, catalog: &JsonCatalog) -> Result<(), AppError> {
    let request = fit_request_from_args(&args);
    let outcome = pipeline::run_fit(&request)?;
    println!("{}", crate::report::format_fit_outcome(&outcome));

    let duty = duty_from_args(&args)?;
    let system = duty.map(|d| {
        let system = SystemCurve::through(d, args.h_st * request.units.head.to_si());
        let op = operating_point(outcome.curves.head.coeffs(), outcome.envelope.q_max, &system, d);
        (system, op)
    });
    if let Some((_, op)) = &system {
        if op.found {
            println!("Operating point: Q={:.3} m3/h, H={:.3} m", op.q, op.h);
        } else {
            println!("Operating point: no crossing found; using the duty point.");
        }
    }

    if args.plot {
        let plot = crate::plot::render_pump_plot(
            outcome.curves.head.coeffs(),
            &outcome.envelope,
            duty,
            system.as_ref().map(|(s, op)| (s, op)),
            args.width,
            args.height,
        );
        println!("{plot}");
    }

    if args.save {
        let template = record_template(args.id, &args.meta)?;
        let h_st = args.h_st * request.units.head.to_si();
        let record = pipeline::build_record(template, &request, &outcome, duty, h_st)?;
        let saved = catalog.upsert(record)?;
        println!("Saved pump {} to '{}'.", saved.label(), catalog.path().display());
    }
    Ok(())
}

fn handle_search(args: SearchArgs, catalog: &JsonCatalog) -> Result<(), AppError> {
    let tolerance_percent = resolve_tolerance(args.tolerance, std::env::var(TOLERANCE_ENV).ok())?;
    let config = SearchConfig {
        duty: search_duty(&args)?,
        tolerance_percent,
        top_n: args.top,
        export: args.export.clone(),
    };

    let outcome = pipeline::run_search(catalog, &config)?;
    println!(
        "{}",
        crate::report::format_matches(&outcome, config.duty, config.tolerance_percent, config.top_n)
    );
    Ok(())
}

fn handle_list(catalog: &JsonCatalog) -> Result<(), AppError> {
    let pumps = catalog.list()?;
    print!("{}", crate::report::format_pump_list(&pumps));
    Ok(())
}

fn handle_show(args: ShowArgs, catalog: &JsonCatalog) -> Result<(), AppError> {
    let pump = catalog.get(args.id)?;
    let curves = pipeline::decode_record_curves(&pump)
        .map_err(|e| AppError::new(2, format!("Pump {} has corrupt curves: {e}", pump.label())))?;
    let operating = pipeline::pump_operating_point(&pump, &curves);

    println!(
        "{}",
        crate::report::format_pump_detail(&pump, &curves, operating.as_ref().map(|(s, op)| (s, op)))
    );

    if args.plot {
        let duty = operating.as_ref().map(|_| DutyPoint {
            q_req: pump.q_req,
            h_req: pump.h_req,
        });
        let plot = crate::plot::render_pump_plot(
            curves.head.coeffs(),
            &pump.envelope(),
            duty,
            operating.as_ref().map(|(s, op)| (s, op)),
            args.width,
            args.height,
        );
        println!("{plot}");
    }
    Ok(())
}

fn handle_delete(args: DeleteArgs, catalog: &JsonCatalog) -> Result<(), AppError> {
    let removed = catalog.delete(args.id)?;
    println!("Deleted pump {}.", removed.label());
    Ok(())
}

pub fn fit_request_from_args(args: &FitArgs) -> FitRequest {
    FitRequest {
        source: if args.modes { FitSource::Modes } else { FitSource::Points },
        q_text: args.q_text.clone(),
        h_text: args.h_text.clone(),
        eff_text: args.eff_text.clone(),
        p2_text: args.p2_text.clone(),
        npsh_text: args.npsh_text.clone(),
        modes_envelope: OperatingEnvelope {
            q_min: args.q_min,
            q_max: args.q_max,
            h_min: args.h_min,
            h_max: args.h_max,
        },
        units: Units {
            flow: args.units.flow_unit,
            head: args.units.head_unit,
            power: args.units.power_unit,
        },
    }
}

/// Duty point in SI, when both halves are given.
fn duty_from_args(args: &FitArgs) -> Result<Option<DutyPoint>, AppError> {
    match (args.q_req, args.h_req) {
        (Some(q), Some(h)) => Ok(Some(DutyPoint {
            q_req: q * args.units.flow_unit.to_si(),
            h_req: h * args.units.head_unit.to_si(),
        })),
        (None, None) => Ok(None),
        _ => Err(AppError::new(2, "--q-req and --h-req must be given together.")),
    }
}

/// Search duty point in SI. A negative head would turn every deviation negative.
fn search_duty(args: &SearchArgs) -> Result<DutyPoint, AppError> {
    let duty = DutyPoint {
        q_req: args.q_req * args.flow_unit.to_si(),
        h_req: args.h_req * args.head_unit.to_si(),
    };
    if !duty.q_req.is_finite() || !duty.h_req.is_finite() || duty.h_req < 0.0 {
        return Err(AppError::new(
            2,
            format!("Required head must be a non-negative number, got {}.", args.h_req),
        ));
    }
    Ok(duty)
}

fn record_template(id: Option<u64>, meta: &PumpMetaArgs) -> Result<PumpRecord, AppError> {
    let name = meta
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::new(2, "--name is required with --save."))?;

    Ok(PumpRecord {
        id,
        name: name.to_string(),
        oem_name: meta.oem_name.clone(),
        company: meta.company.clone(),
        rpm: meta.rpm.clone(),
        dn_suction: meta.dn_suction.clone(),
        dn_discharge: meta.dn_discharge.clone(),
        p2_nom: meta.p2_nom.clone(),
        impeller: meta.impeller.clone(),
        comment: meta.comment.clone(),
        executor: meta.executor.clone(),
        price: meta.price,
        currency: meta.currency.clone(),
        ..PumpRecord::default()
    })
}

/// Tolerance from the flag, else the environment, else the default.
fn resolve_tolerance(flag: Option<f64>, env: Option<String>) -> Result<f64, AppError> {
    let tolerance = match (flag, env) {
        (Some(t), _) => t,
        (None, Some(raw)) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::new(2, format!("{TOLERANCE_ENV} must be a number, got '{raw}'.")))?,
        _ => DEFAULT_TOLERANCE_PERCENT,
    };
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(AppError::new(2, format!("Tolerance must be a non-negative number, got {tolerance}.")));
    }
    Ok(tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FlowUnit, HeadUnit};

    fn fit_args(argv: &[&str]) -> FitArgs {
        let mut full = vec!["pumpsel", "fit"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Fit(args) => args,
            other => panic!("expected fit, got {other:?}"),
        }
    }

    fn search_args(argv: &[&str]) -> SearchArgs {
        let mut full = vec!["pumpsel", "search"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Search(args) => args,
            other => panic!("expected search, got {other:?}"),
        }
    }

    #[test]
    fn negative_required_head_is_rejected() {
        let err = search_duty(&search_args(&["--q", "10", "--h", "-5"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let zero = search_duty(&search_args(&["--q", "10", "--h", "0"])).unwrap();
        assert_eq!(zero.h_req, 0.0);
        let ft = search_duty(&search_args(&["--q", "10", "--h", "100", "--head-unit", "ft"])).unwrap();
        assert!((ft.h_req - 30.48).abs() < 1e-9);
    }

    #[test]
    fn tolerance_precedence() {
        assert_eq!(resolve_tolerance(Some(5.0), Some("20".to_string())).unwrap(), 5.0);
        assert_eq!(resolve_tolerance(None, Some(" 20 ".to_string())).unwrap(), 20.0);
        assert_eq!(resolve_tolerance(None, None).unwrap(), DEFAULT_TOLERANCE_PERCENT);
        assert_eq!(resolve_tolerance(None, Some(String::new())).unwrap(), DEFAULT_TOLERANCE_PERCENT);
    }

    #[test]
    fn bad_tolerance_is_an_input_error() {
        assert_eq!(resolve_tolerance(None, Some("ten".to_string())).unwrap_err().exit_code(), 2);
        assert_eq!(resolve_tolerance(Some(-1.0), None).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(verbosity_filter(0), LevelFilter::Warn);
        assert_eq!(verbosity_filter(1), LevelFilter::Info);
        assert_eq!(verbosity_filter(5), LevelFilter::Debug);
    }

    #[test]
    fn fit_request_carries_units_and_envelope() {
        let args = fit_args(&["--modes", "--h", "[0, 0, -0.5, 50]", "--q-max", "80", "--flow-unit", "ls", "--head-unit", "ft"]);
        let request = fit_request_from_args(&args);
        assert_eq!(request.source, FitSource::Modes);
        assert_eq!(request.modes_envelope.q_max, 80.0);
        assert_eq!(request.modes_envelope.h_max, 100.0);
        assert_eq!(request.units.flow, FlowUnit::Ls);
        assert_eq!(request.units.head, HeadUnit::Ft);
    }

    #[test]
    fn duty_requires_both_halves_and_converts() {
        let args = fit_args(&["--q-req", "10", "--h-req", "100", "--flow-unit", "ls", "--head-unit", "ft"]);
        let duty = duty_from_args(&args).unwrap().unwrap();
        assert!((duty.q_req - 36.0).abs() < 1e-12);
        assert!((duty.h_req - 30.48).abs() < 1e-9);

        let half = fit_args(&["--q-req", "10"]);
        assert_eq!(duty_from_args(&half).unwrap_err().exit_code(), 2);
        assert!(duty_from_args(&fit_args(&[])).unwrap().is_none());
    }

    #[test]
    fn save_needs_a_name() {
        assert!(record_template(None, &PumpMetaArgs::default()).is_err());
        let meta = PumpMetaArgs {
            name: Some(" CR 10-4 ".to_string()),
            rpm: Some("2900".to_string()),
            executor: Some("Ivanov".to_string()),
            price: 950.0,
            ..PumpMetaArgs::default()
        };
        let record = record_template(Some(3), &meta).unwrap();
        assert_eq!(record.id, Some(3));
        assert_eq!(record.name, "CR 10-4");
        assert_eq!(record.rpm.as_deref(), Some("2900"));
        assert_eq!(record.executor.as_deref(), Some("Ivanov"));
        assert_eq!(record.price, 950.0);
    }
}
