//! Shared workflow used by the CLI handlers.
//!
//! fit request -> curve set -> catalog record
//! catalog snapshot -> selection -> ranked matches (-> CSV)
//!
//! The handlers in `app` only translate arguments and print.

use log::info;

use crate::domain::{
    CurveKind, CurveSet, DutyPoint, FitOutcome, FitRequest, FitSource, PolynomialModel, PumpRecord, SearchConfig,
};
use crate::error::{AppError, CurveError};
use crate::io::{CatalogSource, decode_coefficients, encode_model, write_matches_csv};
use crate::math::parse_series;
use crate::selection::{OperatingPoint, SearchOutcome, SystemCurve, operating_point, search};

/// Fit (or decode) the curves of a request.
pub fn run_fit(request: &FitRequest) -> Result<FitOutcome, AppError> {
    let outcome = crate::fit::fit_curve_set(request)?;
    info!(
        "Fitted curve set ({:?}): Q=[{:.3}, {:.3}] m3/h",
        outcome.source, outcome.envelope.q_min, outcome.envelope.q_max
    );
    Ok(outcome)
}

/// Fill the curve fields of `record` from a fit.
///
/// `record` carries the descriptive fields (and `id` for an update). Everything
/// stored is SI: sample text is re-emitted in SI units, and a MODES record keeps
/// `q_text = "MODES"` with each curve text holding its SI coefficient list.
pub fn build_record(
    mut record: PumpRecord,
    request: &FitRequest,
    outcome: &FitOutcome,
    duty: Option<DutyPoint>,
    h_st: f64,
) -> Result<PumpRecord, CurveError> {
    match outcome.source {
        FitSource::Points => {
            record.q_text = si_text("q_text", &request.q_text, request.units.flow.to_si())?;
            for kind in CurveKind::ALL {
                let text = si_text(kind.text_field(), request.curve_text(kind), request.units.y_factor(kind))?;
                *record.curve_text_mut(kind) = text;
            }
        }
        FitSource::Modes => {
            record.q_text = Some(MODES_MARKER.to_string());
            for kind in CurveKind::ALL {
                *record.curve_text_mut(kind) = Some(encode_model(outcome.curves.get(kind)));
            }
        }
    }

    record.h_coeffs = Some(encode_model(&outcome.curves.head));
    record.eff_coeffs = Some(encode_model(&outcome.curves.efficiency));
    record.p2_coeffs = Some(encode_model(&outcome.curves.power));
    record.npsh_coeffs = Some(encode_model(&outcome.curves.npsh));

    record.q_min = outcome.envelope.q_min;
    record.q_max = outcome.envelope.q_max;
    record.h_min = outcome.envelope.h_min;
    record.h_max = outcome.envelope.h_max;

    let duty = duty.unwrap_or(DutyPoint { q_req: 0.0, h_req: 0.0 });
    record.q_req = duty.q_req;
    record.h_req = duty.h_req;
    record.h_st = h_st;
    record.save_source = outcome.source;
    Ok(record)
}

/// `q_text` of a record saved from MODES coefficients.
pub const MODES_MARKER: &str = "MODES";

/// Re-emit a sample series scaled to SI, space separated. Blank stays absent.
fn si_text(field: &str, text: &str, factor: f64) -> Result<Option<String>, CurveError> {
    let values = parse_series(field, text)?;
    if values.is_empty() {
        return Ok(None);
    }
    let parts: Vec<String> = values.iter().map(|v| (v * factor).to_string()).collect();
    Ok(Some(parts.join(" ")))
}

/// Rank a catalog snapshot against a duty point and export the matches if asked.
pub fn run_search(source: &dyn CatalogSource, config: &SearchConfig) -> Result<SearchOutcome, AppError> {
    let pumps = source.snapshot()?;
    let outcome = search(&pumps, config.duty, config.tolerance_percent);

    if let Some(path) = &config.export {
        write_matches_csv(path, &outcome.matches)?;
        info!("Exported {} match(es) to '{}'", outcome.matches.len(), path.display());
    }
    Ok(outcome)
}

/// Decode the stored coefficients of a record. Absent curves decode to zero.
pub fn decode_record_curves(pump: &PumpRecord) -> Result<CurveSet, CurveError> {
    let mut curves = CurveSet::default();
    for kind in CurveKind::ALL {
        let Some(text) = pump.coeff_text(kind).filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        let field = kind.coeff_field();
        let coeffs = decode_coefficients(field, text)?;
        *curves.get_mut(kind) = PolynomialModel::from_padded(&coeffs).ok_or(CurveError::CoefficientCount {
            field: field.to_string(),
            found: coeffs.len(),
        })?;
    }
    Ok(curves)
}

/// System curve and operating point of a saved duty, if the record has one.
pub fn pump_operating_point(pump: &PumpRecord, curves: &CurveSet) -> Option<(SystemCurve, OperatingPoint)> {
    if pump.q_req <= 0.0 || pump.h_req <= 0.0 {
        return None;
    }
    let duty = DutyPoint {
        q_req: pump.q_req,
        h_req: pump.h_req,
    };
    let system = SystemCurve::through(duty, pump.h_st);
    let op = operating_point(curves.head.coeffs(), pump.q_max, &system, duty);
    Some((system, op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FlowUnit, HeadUnit, OperatingEnvelope, Units};
    use crate::fit::fit_curve;
    use crate::io::MemoryCatalog;

    fn request() -> FitRequest {
        FitRequest {
            q_text: "0 10 20 30".to_string(),
            h_text: "50 47.5 40 27.5".to_string(),
            p2_text: "2 3 4 5".to_string(),
            ..FitRequest::default()
        }
    }

    #[test]
    fn fit_then_record_then_search() {
        let request = request();
        let outcome = run_fit(&request).unwrap();
        let template = PumpRecord {
            id: Some(7),
            name: "CR 10-4".to_string(),
            ..PumpRecord::default()
        };
        let duty = DutyPoint { q_req: 20.0, h_req: 40.0 };
        let record = build_record(template, &request, &outcome, Some(duty), 5.0).unwrap();

        assert_eq!(record.q_max, 30.0);
        assert_eq!(record.h_max, 50.0);
        assert_eq!(record.save_source, FitSource::Points);
        assert!(record.eff_text.is_none());
        assert!(record.h_coeffs.as_deref().unwrap().starts_with('['));

        let config = SearchConfig {
            duty,
            tolerance_percent: 10.0,
            top_n: None,
            export: None,
        };
        let found = run_search(&MemoryCatalog::new(vec![record]), &config).unwrap();
        assert_eq!(found.matches.len(), 1);
        let m = &found.matches[0];
        assert_eq!(m.pump.id, Some(7));
        assert!(m.deviation_percent.abs() < 1e-6);
        assert!((m.power_at_point.unwrap() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn decodes_both_coefficient_encodings() {
        let pump = PumpRecord {
            h_coeffs: Some("[0, 0, -0.5, 50]".to_string()),
            p2_coeffs: Some("0.1 2".to_string()),
            eff_coeffs: Some("  ".to_string()),
            ..PumpRecord::default()
        };
        let curves = decode_record_curves(&pump).unwrap();
        assert_eq!(curves.head.coeffs(), &[0.0, 0.0, -0.5, 50.0]);
        assert_eq!(curves.power.coeffs(), &[0.0, 0.0, 0.1, 2.0]);
        assert!(curves.efficiency.is_zero());
        assert!(curves.npsh.is_zero());
    }

    #[test]
    fn decode_rejects_too_many_coefficients() {
        let pump = PumpRecord {
            npsh_coeffs: Some("[1, 2, 3, 4, 5]".to_string()),
            ..PumpRecord::default()
        };
        let err = decode_record_curves(&pump).unwrap_err();
        assert_eq!(err.field(), "npsh_coeffs");
    }

    #[test]
    fn operating_point_needs_a_saved_duty() {
        let curves = CurveSet {
            head: PolynomialModel::new([0.0, -0.01, 0.0, 50.0]),
            ..CurveSet::default()
        };
        let mut pump = PumpRecord {
            q_max: 60.0,
            ..PumpRecord::default()
        };
        assert!(pump_operating_point(&pump, &curves).is_none());

        pump.q_req = 20.0;
        pump.h_req = 46.0;
        let (system, op) = pump_operating_point(&pump, &curves).unwrap();
        assert_eq!(system.h_st, 0.0);
        assert!(op.found);
        assert!((op.q - 20.0).abs() < 0.1);
        assert!((op.h - 46.0).abs() < 0.1);
    }

    #[test]
    fn modes_record_keeps_envelope() {
        let request = FitRequest {
            source: FitSource::Modes,
            h_text: "[0, 0, -0.5, 50]".to_string(),
            modes_envelope: OperatingEnvelope {
                q_min: 0.0,
                q_max: 80.0,
                h_min: 10.0,
                h_max: 50.0,
            },
            ..FitRequest::default()
        };
        let outcome = run_fit(&request).unwrap();
        let record = build_record(PumpRecord::default(), &request, &outcome, None, 0.0).unwrap();
        assert_eq!(record.q_max, 80.0);
        assert_eq!(record.save_source, FitSource::Modes);
        assert_eq!(record.q_req, 0.0);
        assert_eq!(record.q_text.as_deref(), Some(MODES_MARKER));
        assert_eq!(record.h_text, record.h_coeffs);
    }

    #[test]
    fn non_si_samples_are_stored_in_si_and_refit_to_the_stored_curve() {
        let request = FitRequest {
            units: Units {
                flow: FlowUnit::Ls,
                head: HeadUnit::Ft,
                ..Units::default()
            },
            ..request()
        };
        let outcome = run_fit(&request).unwrap();
        let record = build_record(PumpRecord::default(), &request, &outcome, None, 0.0).unwrap();

        assert!((record.q_max - 108.0).abs() < 1e-9);
        let q = parse_series("q_text", record.q_text.as_deref().unwrap()).unwrap();
        assert!((q[3] - 108.0).abs() < 1e-9);
        assert!(record.eff_text.is_none());

        let refit = fit_curve("h_text", &q, record.h_text.as_deref().unwrap()).unwrap();
        let stored = decode_coefficients("h_coeffs", record.h_coeffs.as_deref().unwrap()).unwrap();
        for (a, b) in refit.coeffs().iter().zip(&stored) {
            assert!((a - b).abs() < 1e-9 * b.abs().max(1.0), "{a} vs {b}");
        }
    }
}
