//! Fit a full pump curve set from one request.
//!
//! Two input paths:
//! - points: one flow series shared by four dependent series, each fitted with
//!   `fit_samples`
//! - MODES: literal `[a3, a2, a1, a0]` lists, validated and used as-is
//!
//! Inputs may be in non-SI units. Fitting happens in input units and the model is
//! then rescaled, which yields the same polynomial as fitting converted samples.

use log::debug;

use crate::domain::{
    CurveKind, CurveSet, FitOutcome, FitQuality, FitRequest, FitSource, OperatingEnvelope,
};
use crate::error::CurveError;
use crate::fit::fitter::{MIN_POINTS, fit_samples};
use crate::io::codec::decode_literal_model;
use crate::math::{parse_series, series_bounds};
use crate::models::r_squared;

/// Fit (or decode) all four curves of a request.
pub fn fit_curve_set(request: &FitRequest) -> Result<FitOutcome, CurveError> {
    match request.source {
        FitSource::Points => fit_points(request),
        FitSource::Modes => decode_modes(request),
    }
}

fn fit_points(request: &FitRequest) -> Result<FitOutcome, CurveError> {
    let q = parse_series("q_text", &request.q_text)?;
    let flow_factor = request.units.flow.to_si();

    let mut curves = CurveSet::default();
    let mut quality = FitQuality::default();
    let mut head_bounds = (0.0, 0.0);

    for kind in CurveKind::ALL {
        let field = kind.text_field();
        let y = parse_series(field, request.curve_text(kind))?;
        let model = fit_samples(field, &q, &y)?;
        let y_factor = request.units.y_factor(kind);

        if y.len() >= MIN_POINTS {
            quality.set(kind, Some(r_squared(&q, &y, model.coeffs())));
        }
        if kind == CurveKind::Head {
            let (lo, hi) = series_bounds(&y);
            head_bounds = (lo * y_factor, hi * y_factor);
        }

        *curves.get_mut(kind) = model.rescale(flow_factor, y_factor);
    }

    let (q_min, q_max) = series_bounds(&q);
    let envelope = OperatingEnvelope {
        q_min: q_min * flow_factor,
        q_max: q_max * flow_factor,
        h_min: head_bounds.0,
        h_max: head_bounds.1,
    };

    Ok(FitOutcome {
        source: FitSource::Points,
        curves,
        envelope,
        quality,
    })
}

fn decode_modes(request: &FitRequest) -> Result<FitOutcome, CurveError> {
    debug!("MODES request: using literal coefficients");
    let flow_factor = request.units.flow.to_si();
    let head_factor = request.units.head.to_si();

    let mut curves = CurveSet::default();
    for kind in CurveKind::ALL {
        let model = decode_literal_model(kind.text_field(), request.curve_text(kind))?;
        *curves.get_mut(kind) = model.rescale(flow_factor, request.units.y_factor(kind));
    }

    let env = request.modes_envelope;
    let envelope = OperatingEnvelope {
        q_min: env.q_min * flow_factor,
        q_max: env.q_max * flow_factor,
        h_min: env.h_min * head_factor,
        h_max: env.h_max * head_factor,
    };

    Ok(FitOutcome {
        source: FitSource::Modes,
        curves,
        envelope,
        quality: FitQuality::default(),
    })
}
