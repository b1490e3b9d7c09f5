//! System curve and operating point.
//!
//! A piping system with static head `h_st` that must pass the duty point is modeled
//! as `H_sys(q) = h_st + k·q²` with `k = (H_req - h_st) / Q_req²`. The pump runs
//! where its head curve crosses the system curve from above.

use serde::{Deserialize, Serialize};

use crate::domain::DutyPoint;
use crate::models::evaluate;

/// Quadratic system curve through the duty point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemCurve {
    pub h_st: f64,
    pub k: f64,
}

impl SystemCurve {
    pub fn through(duty: DutyPoint, h_st: f64) -> Self {
        let q2 = duty.q_req * duty.q_req;
        let divisor = if q2 == 0.0 { 1.0 } else { q2 };
        Self {
            h_st,
            k: (duty.h_req - h_st) / divisor,
        }
    }

    pub fn head_at(&self, q: f64) -> f64 {
        self.h_st + self.k * q * q
    }
}

/// Intersection of a pump head curve with a system curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub q: f64,
    pub h: f64,
    /// `false` when no crossing was found and the duty point stands in.
    pub found: bool,
}

/// Scan `[0, 1.5·q_max]` for the first downward crossing of `head` through `system`.
pub fn operating_point(head: &[f64], q_max: f64, system: &SystemCurve, duty: DutyPoint) -> OperatingPoint {
    let fallback = OperatingPoint {
        q: duty.q_req,
        h: duty.h_req,
        found: false,
    };

    let step = (q_max / 2000.0).max(0.05);
    let limit = q_max * 1.5;
    if !(step.is_finite() && limit.is_finite()) {
        return fallback;
    }

    let mut prev_diff: Option<f64> = None;
    let mut i = 0usize;
    loop {
        let q = i as f64 * step;
        if q > limit {
            break;
        }
        let h_pump = evaluate(head, q);
        if h_pump < 0.0 {
            break;
        }
        let diff = h_pump - system.head_at(q);
        match prev_diff {
            None if diff <= 0.0 => break,
            Some(prev) if prev > 0.0 && diff <= 0.0 => {
                let q_cross = (q - step) + prev / (prev - diff) * step;
                return OperatingPoint {
                    q: q_cross,
                    h: evaluate(head, q_cross),
                    found: true,
                };
            }
            _ => {}
        }
        prev_diff = Some(diff);
        i += 1;
    }

    fallback
}
