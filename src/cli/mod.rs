//! Command-line parsing for the pump curve catalog.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting and selection code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{FlowUnit, HeadUnit, PowerUnit};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pumpsel", version, about = "Centrifugal pump curve fitting and duty-point selection")]
pub struct Cli {
    /// Catalog JSON file (defaults to $PUMPSEL_CATALOG, then pumps.json).
    #[arg(long, global = true, value_name = "JSON")]
    pub catalog: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit curves from sampled points (or take MODES coefficients) and optionally save.
    Fit(FitArgs),
    /// Find catalog pumps that meet a duty point.
    Search(SearchArgs),
    /// List catalogued pumps, newest first.
    List,
    /// Show one pump with its curves and operating point.
    Show(ShowArgs),
    /// Delete a pump from the catalog.
    Delete(DeleteArgs),
}

/// Input units shared by fit and search.
#[derive(Debug, Args, Clone, Copy)]
pub struct UnitArgs {
    /// Flow unit of the inputs.
    #[arg(long, value_enum, default_value_t = FlowUnit::M3h)]
    pub flow_unit: FlowUnit,

    /// Head (and NPSH) unit of the inputs.
    #[arg(long, value_enum, default_value_t = HeadUnit::M)]
    pub head_unit: HeadUnit,

    /// Power unit of the inputs.
    #[arg(long, value_enum, default_value_t = PowerUnit::Kw)]
    pub power_unit: PowerUnit,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Treat curve inputs as literal [a3, a2, a1, a0] coefficient lists.
    #[arg(long)]
    pub modes: bool,

    /// Flow samples, whitespace separated (points mode).
    #[arg(long = "q", value_name = "TEXT", default_value = "", allow_hyphen_values = true)]
    pub q_text: String,

    /// Head samples, or head coefficients with --modes.
    #[arg(long = "h", value_name = "TEXT", default_value = "", allow_hyphen_values = true)]
    pub h_text: String,

    /// Efficiency samples (%), or coefficients with --modes.
    #[arg(long = "eff", value_name = "TEXT", default_value = "", allow_hyphen_values = true)]
    pub eff_text: String,

    /// Shaft power samples, or coefficients with --modes.
    #[arg(long = "p2", value_name = "TEXT", default_value = "", allow_hyphen_values = true)]
    pub p2_text: String,

    /// NPSH samples, or coefficients with --modes.
    #[arg(long = "npsh", value_name = "TEXT", default_value = "", allow_hyphen_values = true)]
    pub npsh_text: String,

    /// Envelope for --modes: minimum flow.
    #[arg(long, default_value_t = 0.0)]
    pub q_min: f64,

    /// Envelope for --modes: maximum flow.
    #[arg(long, default_value_t = 100.0)]
    pub q_max: f64,

    /// Envelope for --modes: minimum head.
    #[arg(long, default_value_t = 0.0)]
    pub h_min: f64,

    /// Envelope for --modes: maximum head.
    #[arg(long, default_value_t = 100.0)]
    pub h_max: f64,

    /// Duty flow stored with the pump (and used for the plot).
    #[arg(long)]
    pub q_req: Option<f64>,

    /// Duty head stored with the pump (and used for the plot).
    #[arg(long)]
    pub h_req: Option<f64>,

    /// Static head of the system.
    #[arg(long, default_value_t = 0.0)]
    pub h_st: f64,

    #[command(flatten)]
    pub units: UnitArgs,

    /// Render an ASCII plot of the head curve.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Save the pump to the catalog.
    #[arg(long)]
    pub save: bool,

    /// Update this catalog id instead of inserting a new pump.
    #[arg(long)]
    pub id: Option<u64>,

    #[command(flatten)]
    pub meta: PumpMetaArgs,
}

/// Descriptive fields stored with a saved pump.
#[derive(Debug, Args, Clone, Default)]
pub struct PumpMetaArgs {
    /// Pump name (required with --save).
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub oem_name: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub rpm: Option<String>,

    #[arg(long)]
    pub dn_suction: Option<String>,

    #[arg(long)]
    pub dn_discharge: Option<String>,

    /// Nominal motor power as printed on the data sheet.
    #[arg(long)]
    pub p2_nom: Option<String>,

    /// Impeller diameter.
    #[arg(long)]
    pub impeller: Option<String>,

    #[arg(long)]
    pub comment: Option<String>,

    /// Who entered the pump.
    #[arg(long)]
    pub executor: Option<String>,

    /// List price.
    #[arg(long, default_value_t = 0.0)]
    pub price: f64,

    #[arg(long)]
    pub currency: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    /// Required flow.
    #[arg(long = "q")]
    pub q_req: f64,

    /// Required head.
    #[arg(long = "h", allow_negative_numbers = true)]
    pub h_req: f64,

    /// Allowed head deviation in percent (defaults to $PUMPSEL_TOLERANCE, then 10).
    #[arg(long)]
    pub tolerance: Option<f64>,

    #[arg(long, value_enum, default_value_t = FlowUnit::M3h)]
    pub flow_unit: FlowUnit,

    #[arg(long, value_enum, default_value_t = HeadUnit::M)]
    pub head_unit: HeadUnit,

    /// Show only the N closest matches.
    #[arg(long)]
    pub top: Option<usize>,

    /// Export ranked matches to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    pub id: u64,

    /// Render an ASCII plot of the head and system curves.
    #[arg(long)]
    pub plot: bool,

    #[arg(long, default_value_t = 72)]
    pub width: usize,

    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct DeleteArgs {
    pub id: u64,
}
