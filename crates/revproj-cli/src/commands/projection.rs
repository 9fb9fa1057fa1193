use chrono::Datelike;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::info;

use revproj_core::projection::{self, Assumptions, ProjectionInput, QuarterOverride};
use revproj_core::revenue;
use revproj_core::samples;

use crate::input;

/// Arguments for the year projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ProjectArgs {
    /// Path to JSON/YAML projection input (year, monthly_revenue, assumptions)
    #[arg(long)]
    pub input: Option<String>,

    /// Use a built-in sample company instead of an input file (e.g. 2330)
    #[arg(long, conflicts_with = "input")]
    pub sample: Option<String>,

    /// Year to project; defaults to the latest year with data
    #[arg(long)]
    pub year: Option<i32>,

    /// Manual YoY for an unreported month, e.g. --yoy 7=0.12 (repeatable)
    #[arg(long = "yoy", value_name = "MONTH=RATE")]
    pub yoy: Vec<String>,

    /// Per-quarter assumption, e.g. --quarter-override 3:tax_rate=0.15 (repeatable)
    #[arg(long = "quarter-override", value_name = "Q:FIELD=VALUE")]
    pub quarter_override: Vec<String>,

    /// Gross margin (e.g. 0.53 for 53%)
    #[arg(long)]
    pub gross_margin: Option<Decimal>,

    /// Operating expense per quarter
    #[arg(long)]
    pub operating_expense: Option<Decimal>,

    /// Non-operating income per quarter
    #[arg(long)]
    pub non_operating_income: Option<Decimal>,

    /// Income tax rate (e.g. 0.2 for 20%)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Shares outstanding, in the same unit scale as revenue
    #[arg(long)]
    pub shares: Option<Decimal>,

    /// P/E multiple applied to annual EPS
    #[arg(long, alias = "pe")]
    pub per: Option<Decimal>,

    /// Current share price for the upside figure
    #[arg(long)]
    pub current_price: Option<Decimal>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut projection_input = load_input(&args)?;

    for raw in &args.yoy {
        let (month, rate) = parse_manual_yoy(raw)?;
        projection_input.manual_yoy.insert(month, rate);
    }
    for raw in &args.quarter_override {
        apply_quarter_override(&mut projection_input.assumptions, raw)?;
    }
    apply_assumption_flags(&mut projection_input.assumptions, &args);

    info!(
        year = projection_input.year,
        records = projection_input.monthly_revenue.len(),
        manual_yoy = projection_input.manual_yoy.len(),
        overrides = projection_input.assumptions.quarter_overrides.len(),
        "running projection"
    );

    let output = projection::project_year(&projection_input)?;
    Ok(serde_json::to_value(output)?)
}

fn load_input(args: &ProjectArgs) -> Result<ProjectionInput, Box<dyn std::error::Error>> {
    if let Some(ref code) = args.sample {
        let company = samples::lookup_sample(code)
            .ok_or_else(|| format!("Unknown sample company '{}'", code))?;
        let year = revenue::select_year(
            args.year,
            &company.available_years(),
            chrono::Local::now().year(),
        );
        return Ok(company.projection_input(year));
    }

    let mut loaded: ProjectionInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input or --sample is required (or pipe JSON to stdin)".into());
    };

    if let Some(year) = args.year {
        loaded.year = year;
    }
    Ok(loaded)
}

fn apply_assumption_flags(assumptions: &mut Assumptions, args: &ProjectArgs) {
    if let Some(v) = args.gross_margin {
        assumptions.gross_margin = v;
    }
    if let Some(v) = args.operating_expense {
        assumptions.operating_expense = v;
    }
    if let Some(v) = args.non_operating_income {
        assumptions.non_operating_income = v;
    }
    if let Some(v) = args.tax_rate {
        assumptions.tax_rate = v;
    }
    if let Some(v) = args.shares {
        assumptions.shares_outstanding = v;
    }
    if let Some(v) = args.per {
        assumptions.per_multiple = v;
    }
    if let Some(v) = args.current_price {
        assumptions.current_price = v;
    }
}

/// Parse `MONTH=RATE`.
fn parse_manual_yoy(raw: &str) -> Result<(u32, Decimal), Box<dyn std::error::Error>> {
    let (month, rate) = raw
        .split_once('=')
        .ok_or_else(|| format!("Invalid --yoy '{}': expected MONTH=RATE", raw))?;
    let month: u32 = month
        .trim()
        .parse()
        .map_err(|_| format!("Invalid --yoy '{}': month must be a number", raw))?;
    let rate = Decimal::from_str(rate.trim())
        .map_err(|e| format!("Invalid --yoy '{}': {}", raw, e))?;
    Ok((month, rate))
}

/// Parse `Q:FIELD=VALUE` and merge it into the quarter's override.
fn apply_quarter_override(
    assumptions: &mut Assumptions,
    raw: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let invalid = |why: &str| format!("Invalid --quarter-override '{}': {}", raw, why);

    let (quarter, rest) = raw
        .split_once(':')
        .ok_or_else(|| invalid("expected Q:FIELD=VALUE"))?;
    let (field, value) = rest
        .split_once('=')
        .ok_or_else(|| invalid("expected Q:FIELD=VALUE"))?;
    let quarter: u8 = quarter
        .trim()
        .trim_start_matches(['Q', 'q'])
        .parse()
        .map_err(|_| invalid("quarter must be 1-4"))?;
    let value = Decimal::from_str(value.trim()).map_err(|e| invalid(&e.to_string()))?;

    let entry: &mut QuarterOverride = assumptions.quarter_overrides.entry(quarter).or_default();
    match field.trim().replace('-', "_").as_str() {
        "gross_margin" => entry.gross_margin = Some(value),
        "operating_expense" => entry.operating_expense = Some(value),
        "non_operating_income" => entry.non_operating_income = Some(value),
        "tax_rate" => entry.tax_rate = Some(value),
        other => {
            return Err(invalid(&format!(
                "unknown field '{}' (gross_margin, operating_expense, non_operating_income, tax_rate)",
                other
            ))
            .into())
        }
    }
    Ok(())
}
