//! Formatted terminal output for fits, searches, and catalog listings.
//!
//! Formatting lives here so the fitting and selection code stays free of
//! presentation concerns (and output changes stay localized).

use crate::domain::{CurveKind, CurveSet, DutyPoint, FitOutcome, FitSource, PumpRecord};
use crate::selection::{OperatingPoint, SearchOutcome, SystemCurve};

/// Coefficients, R² and envelope of a fit.
pub fn format_fit_outcome(outcome: &FitOutcome) -> String {
    let mut out = String::new();

    let source = match outcome.source {
        FitSource::Points => "least-squares fit",
        FitSource::Modes => "MODES coefficients",
    };
    out.push_str(&format!("=== pumpsel - curve set ({source}) ===\n"));
    out.push_str(&format_curves(&outcome.curves, |kind| outcome.quality.get(kind)));

    let env = &outcome.envelope;
    out.push_str(&format!(
        "\nEnvelope: Q=[{:.3}, {:.3}] m3/h | H=[{:.3}, {:.3}] m\n",
        env.q_min, env.q_max, env.h_min, env.h_max
    ));
    out
}

fn format_curves(curves: &CurveSet, quality: impl Fn(CurveKind) -> Option<f64>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<8} {:<60} {:>8}\n", "curve", "[a3, a2, a1, a0]", "R2").trim_end());
    out.push('\n');
    for kind in CurveKind::ALL {
        let model = curves.get(kind);
        let r2 = match quality(kind) {
            Some(r2) => format!("{r2:.4}"),
            None if model.is_zero() => "(none)".to_string(),
            None => "-".to_string(),
        };
        out.push_str(&format!("{:<8} {:<60} {:>8}\n", kind.display_name(), fmt_vec(model.coeffs()), r2));
    }
    out
}

/// Ranked match table plus a diagnostics line.
pub fn format_matches(outcome: &SearchOutcome, duty: DutyPoint, tolerance_percent: f64, top_n: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Duty point: Q={:.3} m3/h, H={:.3} m, tolerance {:.1}%\n",
        duty.q_req, duty.h_req, tolerance_percent
    ));

    let diag = &outcome.diagnostics;
    if diag.degenerate_query {
        out.push_str("Requested head is zero; no pump can be ranked against it.\n");
        return out;
    }

    if outcome.matches.is_empty() {
        out.push_str("No matching pumps.\n");
    } else {
        out.push_str(
            format!(
                "{:>4} {:>6} {:<24} {:>6} {:>10} {:>8} {:>9} {:>8}\n",
                "rank", "id", "name", "rpm", "H@Q", "dev%", "P2", "eff"
            )
            .trim_end(),
        );
        out.push('\n');
        out.push_str(
            format!(
                "{:->4} {:->6} {:-<24} {:->6} {:->10} {:->8} {:->9} {:->8}\n",
                "", "", "", "", "", "", "", ""
            )
            .trim_end(),
        );
        out.push('\n');

        let limit = top_n.unwrap_or(usize::MAX);
        for (rank, m) in outcome.matches.iter().take(limit).enumerate() {
            out.push_str(
                format!(
                    "{:>4} {:>6} {:<24} {:>6} {:>10.2} {:>8.2} {:>9} {:>8}\n",
                    rank + 1,
                    m.pump.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
                    truncate(&m.pump.name, 24),
                    truncate(m.rpm.as_deref().unwrap_or("-"), 6),
                    m.h_at_point,
                    m.deviation_percent,
                    fmt_opt(m.power_at_point),
                    fmt_opt(m.eff_at_point),
                )
                .trim_end(),
            );
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "\nScanned {} | matched {} | out of range {} | no head curve {} | outside tolerance {} | skipped {}\n",
        diag.scanned,
        outcome.matches.len(),
        diag.out_of_range,
        diag.no_model,
        diag.outside_tolerance,
        diag.skipped.len()
    ));
    for s in &diag.skipped {
        out.push_str(&format!("  (skipped {}) {}\n", s.pump, s.reason));
    }
    out
}

/// One line per catalogued pump.
pub fn format_pump_list(pumps: &[PumpRecord]) -> String {
    if pumps.is_empty() {
        return "Catalog is empty.\n".to_string();
    }
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:<24} {:<16} {:>6} {:>10} {:>8} {:<16}\n",
            "id", "name", "company", "rpm", "Q max", "source", "updated"
        )
        .trim_end(),
    );
    out.push('\n');
    for p in pumps {
        let source = match p.save_source {
            FitSource::Points => "points",
            FitSource::Modes => "modes",
        };
        out.push_str(
            format!(
                "{:>6} {:<24} {:<16} {:>6} {:>10.2} {:>8} {:<16}\n",
                p.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
                truncate(&p.name, 24),
                truncate(p.company.as_deref().unwrap_or(""), 16),
                truncate(p.rpm.as_deref().unwrap_or("-"), 6),
                p.q_max,
                source,
                p.updated_at.as_deref().unwrap_or(""),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Details of one pump: metadata, decoded curves, and its operating point.
pub fn format_pump_detail(
    pump: &PumpRecord,
    curves: &CurveSet,
    operating: Option<(&SystemCurve, &OperatingPoint)>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", pump.label()));
    let fields = [
        ("OEM", pump.oem_name.as_deref()),
        ("Company", pump.company.as_deref()),
        ("RPM", pump.rpm.as_deref()),
        ("DN suction", pump.dn_suction.as_deref()),
        ("DN discharge", pump.dn_discharge.as_deref()),
        ("P2 nominal", pump.p2_nom.as_deref()),
        ("Impeller", pump.impeller.as_deref()),
        ("Executor", pump.executor.as_deref()),
        ("Comment", pump.comment.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            out.push_str(&format!("{label:<13} {v}\n"));
        }
    }
    if pump.price > 0.0 {
        let currency = pump.currency.as_deref().unwrap_or("");
        out.push_str(format!("{:<13} {:.2} {currency}\n", "Price", pump.price).trim_end());
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format_curves(curves, |_| None));
    out.push_str(&format!(
        "\nEnvelope: Q=[{:.3}, {:.3}] m3/h | H=[{:.3}, {:.3}] m\n",
        pump.q_min, pump.q_max, pump.h_min, pump.h_max
    ));

    if let Some((system, op)) = operating {
        out.push_str(&format!(
            "System: H = {:.3} + {:.6}·Q² (duty Q={:.3}, H={:.3})\n",
            system.h_st, system.k, pump.q_req, pump.h_req
        ));
        if op.found {
            out.push_str(&format!("Operating point: Q={:.3} m3/h, H={:.3} m\n", op.q, op.h));
        } else {
            out.push_str("Operating point: no crossing found; using the duty point.\n");
        }
    }
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6e}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
