//! Duty-point search over a catalog snapshot.
//!
//! Each pump is screened independently:
//!
//! 1. range filter: skip when `q_max > 0` and `Q_req > 1.15 · q_max`
//! 2. skip pumps without a head curve
//! 3. evaluate head at `Q_req`, compute `|H - H_req| / H_req · 100`
//! 4. keep pumps within tolerance, enriched with power and efficiency at `Q_req`
//!
//! Pumps whose stored coefficients fail to decode are skipped and reported in the
//! diagnostics; one corrupt record never fails the search.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::domain::{CurveKind, DutyPoint, PumpRecord, SelectionMatch};
use crate::error::CurveError;
use crate::io::codec::decode_coefficients;
use crate::models::evaluate;

/// Flow may exceed the rated maximum by this factor and still be eligible.
pub const OVERLOAD_FACTOR: f64 = 1.15;

/// A catalog entry that was skipped because its stored data was unreadable.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub pump: String,
    pub reason: String,
}

/// Counters describing what happened to each scanned pump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchDiagnostics {
    pub scanned: usize,
    pub out_of_range: usize,
    pub no_model: usize,
    pub outside_tolerance: usize,
    /// Set when `H_req == 0`; nothing can match such a query.
    pub degenerate_query: bool,
    pub skipped: Vec<SkippedEntry>,
}

/// Ranked matches plus diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub matches: Vec<SelectionMatch>,
    pub diagnostics: SearchDiagnostics,
}

enum Screen {
    OutOfRange,
    NoModel,
    OutsideTolerance,
    Match(SelectionMatch),
    Corrupt(CurveError),
}

/// Search the catalog for pumps that deliver `duty` within `tolerance_percent`.
///
/// Matches are ordered by ascending deviation; ties keep catalog order.
pub fn search(catalog: &[PumpRecord], duty: DutyPoint, tolerance_percent: f64) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    if duty.h_req == 0.0 {
        debug!("Degenerate duty point (H_req = 0); no pump can match.");
        outcome.diagnostics.degenerate_query = true;
        return outcome;
    }

    let screened: Vec<Screen> = catalog
        .par_iter()
        .map(|pump| screen_pump(pump, duty, tolerance_percent))
        .collect();

    let diag = &mut outcome.diagnostics;
    diag.scanned = catalog.len();
    for (pump, screen) in catalog.iter().zip(screened) {
        match screen {
            Screen::OutOfRange => diag.out_of_range += 1,
            Screen::NoModel => diag.no_model += 1,
            Screen::OutsideTolerance => diag.outside_tolerance += 1,
            Screen::Match(m) => outcome.matches.push(m),
            Screen::Corrupt(err) => {
                warn!("Skipping pump {}: {err}", pump.label());
                diag.skipped.push(SkippedEntry {
                    pump: pump.label(),
                    reason: err.to_string(),
                });
            }
        }
    }

    // `sort_by` is stable, so equal deviations keep catalog order.
    outcome
        .matches
        .sort_by(|a, b| a.deviation_percent.total_cmp(&b.deviation_percent));

    info!(
        "Search Q={} H={} tol={}%: {} match(es) of {} pump(s), {} skipped",
        duty.q_req,
        duty.h_req,
        tolerance_percent,
        outcome.matches.len(),
        diag.scanned,
        diag.skipped.len()
    );
    outcome
}

fn screen_pump(pump: &PumpRecord, duty: DutyPoint, tolerance_percent: f64) -> Screen {
    if pump.q_max > 0.0 && duty.q_req > pump.q_max * OVERLOAD_FACTOR {
        return Screen::OutOfRange;
    }
    match evaluate_pump(pump, duty, tolerance_percent) {
        Ok(screen) => screen,
        Err(err) => Screen::Corrupt(err),
    }
}

fn evaluate_pump(pump: &PumpRecord, duty: DutyPoint, tolerance_percent: f64) -> Result<Screen, CurveError> {
    let Some(head) = stored_curve(pump, CurveKind::Head)? else {
        return Ok(Screen::NoModel);
    };

    let h_at_point = evaluate(&head, duty.q_req);
    let deviation_percent = (h_at_point - duty.h_req).abs() / duty.h_req * 100.0;
    // NaN deviations fall through here as well.
    if !(deviation_percent <= tolerance_percent) {
        return Ok(Screen::OutsideTolerance);
    }

    let power_at_point = stored_curve(pump, CurveKind::Power)?.map(|c| evaluate(&c, duty.q_req));
    let eff_at_point = stored_curve(pump, CurveKind::Efficiency)?.map(|c| evaluate(&c, duty.q_req));

    Ok(Screen::Match(SelectionMatch {
        pump: pump.clone(),
        h_at_point,
        deviation_percent,
        power_at_point,
        eff_at_point,
        rpm: pump.rpm.clone(),
    }))
}

/// Decode a stored curve; blank or empty lists count as absent.
fn stored_curve(pump: &PumpRecord, kind: CurveKind) -> Result<Option<Vec<f64>>, CurveError> {
    let Some(text) = pump.coeff_text(kind).filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };
    let coeffs = decode_coefficients(kind.coeff_field(), text)?;
    Ok((!coeffs.is_empty()).then_some(coeffs))
}
