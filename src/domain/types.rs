//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - produced by the fitter and consumed by the selection engine
//! - stored in the pump catalog (JSON)
//! - exported to CSV or printed as reports

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The four performance curves catalogued for every pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    Head,
    Efficiency,
    Power,
    Npsh,
}

impl CurveKind {
    pub const ALL: [CurveKind; 4] = [
        CurveKind::Head,
        CurveKind::Efficiency,
        CurveKind::Power,
        CurveKind::Npsh,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            CurveKind::Head => "H(Q)",
            CurveKind::Efficiency => "Eff(Q)",
            CurveKind::Power => "P2(Q)",
            CurveKind::Npsh => "NPSH(Q)",
        }
    }

    /// Name of the raw sample field (used in error messages).
    pub fn text_field(self) -> &'static str {
        match self {
            CurveKind::Head => "h_text",
            CurveKind::Efficiency => "eff_text",
            CurveKind::Power => "p2_text",
            CurveKind::Npsh => "npsh_text",
        }
    }

    /// Name of the stored coefficient field.
    pub fn coeff_field(self) -> &'static str {
        match self {
            CurveKind::Head => "h_coeffs",
            CurveKind::Efficiency => "eff_coeffs",
            CurveKind::Power => "p2_coeffs",
            CurveKind::Npsh => "npsh_coeffs",
        }
    }
}

/// Cubic polynomial `y = a3·x³ + a2·x² + a1·x + a0`, stored highest degree first.
///
/// Lower-degree fits are left-padded with zeros, so the width is always 4.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolynomialModel([f64; 4]);

impl PolynomialModel {
    pub const ZERO: PolynomialModel = PolynomialModel([0.0; 4]);

    pub fn new(coeffs: [f64; 4]) -> Self {
        Self(coeffs)
    }

    /// Build from a highest-degree-first list of at most 4 coefficients.
    ///
    /// Returns `None` for longer lists.
    pub fn from_padded(coeffs: &[f64]) -> Option<Self> {
        if coeffs.len() > 4 {
            return None;
        }
        let mut out = [0.0; 4];
        out[4 - coeffs.len()..].copy_from_slice(coeffs);
        Some(Self(out))
    }

    pub fn coeffs(&self) -> &[f64; 4] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|c| *c == 0.0)
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        crate::models::evaluate(&self.0, x)
    }

    /// Re-express the polynomial after scaling both axes.
    ///
    /// If the model maps `x` to `y`, the result maps `x·x_factor` to `y·y_factor`.
    pub fn rescale(&self, x_factor: f64, y_factor: f64) -> Self {
        let mut out = [0.0; 4];
        for (i, c) in self.0.iter().enumerate() {
            let power = (3 - i) as i32;
            out[i] = c * y_factor / x_factor.powi(power);
        }
        Self(out)
    }
}

/// A pump's four performance curves over a shared flow domain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveSet {
    pub head: PolynomialModel,
    pub efficiency: PolynomialModel,
    pub power: PolynomialModel,
    pub npsh: PolynomialModel,
}

impl CurveSet {
    pub fn get(&self, kind: CurveKind) -> &PolynomialModel {
        match kind {
            CurveKind::Head => &self.head,
            CurveKind::Efficiency => &self.efficiency,
            CurveKind::Power => &self.power,
            CurveKind::Npsh => &self.npsh,
        }
    }

    pub fn get_mut(&mut self, kind: CurveKind) -> &mut PolynomialModel {
        match kind {
            CurveKind::Head => &mut self.head,
            CurveKind::Efficiency => &mut self.efficiency,
            CurveKind::Power => &mut self.power,
            CurveKind::Npsh => &mut self.npsh,
        }
    }
}

/// Summary of the sampled domain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OperatingEnvelope {
    pub q_min: f64,
    pub q_max: f64,
    pub h_min: f64,
    pub h_max: f64,
}

/// Requested flow and head.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DutyPoint {
    pub q_req: f64,
    pub h_req: f64,
}

/// Flow input units. Stored values are always m³/h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FlowUnit {
    #[default]
    #[value(name = "m3h")]
    M3h,
    Ls,
    Lmin,
    Usgpm,
}

impl FlowUnit {
    pub fn to_si(self) -> f64 {
        match self {
            FlowUnit::M3h => 1.0,
            FlowUnit::Ls => 3.6,
            FlowUnit::Lmin => 0.06,
            FlowUnit::Usgpm => 0.227_124_7,
        }
    }
}

/// Head (and NPSH) input units. Stored values are always metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeadUnit {
    #[default]
    M,
    Ft,
}

impl HeadUnit {
    pub fn to_si(self) -> f64 {
        match self {
            HeadUnit::M => 1.0,
            HeadUnit::Ft => 0.3048,
        }
    }
}

/// Shaft power input units. Stored values are always kW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PowerUnit {
    #[default]
    Kw,
    Hp,
    W,
}

impl PowerUnit {
    pub fn to_si(self) -> f64 {
        match self {
            PowerUnit::Kw => 1.0,
            PowerUnit::Hp => 0.7457,
            PowerUnit::W => 0.001,
        }
    }
}

/// Input units for a fit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Units {
    pub flow: FlowUnit,
    pub head: HeadUnit,
    pub power: PowerUnit,
}

impl Units {
    /// Scale factor to SI for the dependent variable of a curve.
    pub fn y_factor(&self, kind: CurveKind) -> f64 {
        match kind {
            CurveKind::Head | CurveKind::Npsh => self.head.to_si(),
            CurveKind::Power => self.power.to_si(),
            CurveKind::Efficiency => 1.0,
        }
    }
}

/// Where a pump's curves came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitSource {
    /// Least-squares fit of sampled points.
    #[default]
    Points,
    /// Coefficients supplied directly ("MODES").
    #[serde(alias = "coeffs")]
    Modes,
}

/// A fit request: raw samples per curve, or literal coefficients in MODES.
#[derive(Debug, Clone, Default)]
pub struct FitRequest {
    pub source: FitSource,
    /// Flow samples (ignored in MODES).
    pub q_text: String,
    pub h_text: String,
    pub eff_text: String,
    pub p2_text: String,
    pub npsh_text: String,
    /// Envelope supplied with MODES coefficients (input units).
    pub modes_envelope: OperatingEnvelope,
    pub units: Units,
}

impl FitRequest {
    pub fn curve_text(&self, kind: CurveKind) -> &str {
        match kind {
            CurveKind::Head => &self.h_text,
            CurveKind::Efficiency => &self.eff_text,
            CurveKind::Power => &self.p2_text,
            CurveKind::Npsh => &self.npsh_text,
        }
    }
}

/// Coefficient of determination per curve (`None` when not applicable).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FitQuality {
    pub head: Option<f64>,
    pub efficiency: Option<f64>,
    pub power: Option<f64>,
    pub npsh: Option<f64>,
}

impl FitQuality {
    pub fn get(&self, kind: CurveKind) -> Option<f64> {
        match kind {
            CurveKind::Head => self.head,
            CurveKind::Efficiency => self.efficiency,
            CurveKind::Power => self.power,
            CurveKind::Npsh => self.npsh,
        }
    }

    pub fn set(&mut self, kind: CurveKind, value: Option<f64>) {
        match kind {
            CurveKind::Head => self.head = value,
            CurveKind::Efficiency => self.efficiency = value,
            CurveKind::Power => self.power = value,
            CurveKind::Npsh => self.npsh = value,
        }
    }
}

/// Output of a fit request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOutcome {
    pub source: FitSource,
    pub curves: CurveSet,
    pub envelope: OperatingEnvelope,
    pub quality: FitQuality,
}

/// A catalogued pump.
///
/// Coefficient fields hold text in either encoding (space-delimited or bracketed);
/// the catalog always writes the bracketed form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpRecord {
    pub id: Option<u64>,
    pub name: String,
    pub oem_name: Option<String>,
    pub company: Option<String>,
    pub rpm: Option<String>,
    pub dn_suction: Option<String>,
    pub dn_discharge: Option<String>,
    pub p2_nom: Option<String>,
    /// Impeller diameter actually fitted.
    #[serde(rename = "impeller_actual", alias = "impeller")]
    pub impeller: Option<String>,
    pub comment: Option<String>,
    /// Who entered the pump.
    pub executor: Option<String>,
    pub price: f64,
    pub currency: Option<String>,

    pub q_text: Option<String>,
    pub h_text: Option<String>,
    pub eff_text: Option<String>,
    pub p2_text: Option<String>,
    pub npsh_text: Option<String>,

    pub h_coeffs: Option<String>,
    pub eff_coeffs: Option<String>,
    pub p2_coeffs: Option<String>,
    pub npsh_coeffs: Option<String>,

    pub q_min: f64,
    pub q_max: f64,
    pub h_min: f64,
    pub h_max: f64,

    /// Duty point and static head saved with the pump.
    pub q_req: f64,
    pub h_req: f64,
    pub h_st: f64,

    pub save_source: FitSource,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl PumpRecord {
    /// Raw sample text slot for a curve.
    pub fn curve_text_mut(&mut self, kind: CurveKind) -> &mut Option<String> {
        match kind {
            CurveKind::Head => &mut self.h_text,
            CurveKind::Efficiency => &mut self.eff_text,
            CurveKind::Power => &mut self.p2_text,
            CurveKind::Npsh => &mut self.npsh_text,
        }
    }

    /// Stored coefficient text for a curve, if any.
    pub fn coeff_text(&self, kind: CurveKind) -> Option<&str> {
        match kind {
            CurveKind::Head => self.h_coeffs.as_deref(),
            CurveKind::Efficiency => self.eff_coeffs.as_deref(),
            CurveKind::Power => self.p2_coeffs.as_deref(),
            CurveKind::Npsh => self.npsh_coeffs.as_deref(),
        }
    }

    pub fn envelope(&self) -> OperatingEnvelope {
        OperatingEnvelope {
            q_min: self.q_min,
            q_max: self.q_max,
            h_min: self.h_min,
            h_max: self.h_max,
        }
    }

    /// Label used in logs and diagnostics.
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("#{id} {}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A pump that satisfies a duty point within tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionMatch {
    pub pump: PumpRecord,
    pub h_at_point: f64,
    pub deviation_percent: f64,
    pub power_at_point: Option<f64>,
    pub eff_at_point: Option<f64>,
    pub rpm: Option<String>,
}

/// Selection settings as understood by the pipeline.
///
/// The duty point is already converted to SI.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub duty: DutyPoint,
    pub tolerance_percent: f64,
    pub top_n: Option<usize>,
    pub export: Option<PathBuf>,
}

/// Default tolerance for selection requests (percent of requested head).
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 10.0;
