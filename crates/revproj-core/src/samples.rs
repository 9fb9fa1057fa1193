//! Built-in demonstration datasets.
//!
//! Monthly revenue is in NT$ thousands as published; share counts are in
//! thousands of shares so that net income / shares yields EPS in NT$.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::earnings::{self, QuarterlyReport};
use crate::projection::{Assumptions, ProjectionInput};
use crate::revenue::MonthRecord;
use crate::types::{percent_to_rate, Money, Multiple};

/// Default assumptions as an analyst would type them: margins and tax in
/// percent, amounts in revenue units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDefaults {
    pub gross_margin_pct: Decimal,
    pub operating_expense: Money,
    pub non_operating_income: Money,
    pub tax_rate_pct: Decimal,
    pub shares_outstanding: Decimal,
    pub per_multiple: Multiple,
    pub current_price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleCompany {
    pub stock_no: String,
    pub name: String,
    pub industry: String,
    pub website: String,
    pub description: String,
    pub defaults: SampleDefaults,
    pub revenue: Vec<MonthRecord>,
    pub earnings: Vec<QuarterlyReport>,
}

impl SampleCompany {
    pub fn default_assumptions(&self) -> Assumptions {
        let d = &self.defaults;
        Assumptions {
            gross_margin: percent_to_rate(d.gross_margin_pct),
            operating_expense: d.operating_expense,
            non_operating_income: d.non_operating_income,
            tax_rate: percent_to_rate(d.tax_rate_pct),
            shares_outstanding: d.shares_outstanding,
            per_multiple: d.per_multiple,
            current_price: d.current_price,
            quarter_overrides: BTreeMap::new(),
            actual_quarters: BTreeMap::new(),
        }
    }

    /// Years with at least one revenue record, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.revenue.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Ready-to-run input for `year`, with that year's disclosed quarters
    /// attached as actuals.
    pub fn projection_input(&self, year: i32) -> ProjectionInput {
        let mut assumptions = self.default_assumptions();
        assumptions.actual_quarters = earnings::actual_quarters_for_year(&self.earnings, year);
        ProjectionInput {
            year,
            monthly_revenue: self.revenue.clone(),
            manual_yoy: BTreeMap::new(),
            assumptions,
        }
    }
}

/// All built-in companies, ordered by stock number.
pub fn sample_companies() -> Vec<SampleCompany> {
    let mut companies = vec![tsmc(), hon_hai()];
    companies.sort_by(|a, b| a.stock_no.cmp(&b.stock_no));
    companies
}

pub fn lookup_sample(stock_no: &str) -> Option<SampleCompany> {
    let key = stock_no.trim();
    if key.is_empty() {
        return None;
    }
    sample_companies().into_iter().find(|c| c.stock_no == key)
}

fn months(year: i32, values: &[Money]) -> impl Iterator<Item = MonthRecord> + '_ {
    values.iter().zip(1u32..).map(move |(&revenue, month)| MonthRecord {
        year,
        month,
        revenue,
    })
}

fn report(code: &str, year: i32, quarter: u8, net_income: Money, eps: Decimal) -> QuarterlyReport {
    QuarterlyReport {
        company_code: code.to_string(),
        year,
        quarter,
        net_income,
        basic_eps: eps,
    }
}

fn tsmc() -> SampleCompany {
    let revenue = months(
        2023,
        &[
            dec!(200070000), dec!(163174000), dec!(145407000), dec!(147904000),
            dec!(176536000), dec!(156404000), dec!(186040000), dec!(188693000),
            dec!(211490000), dec!(243208000), dec!(226021000), dec!(241681000),
        ],
    )
    .chain(months(
        2024,
        &[
            dec!(215804000), dec!(181648000), dec!(195207000),
            dec!(236021000), dec!(247194000), dec!(207878000),
        ],
    ))
    .collect();

    SampleCompany {
        stock_no: "2330".into(),
        name: "Taiwan Semiconductor Manufacturing Co., Ltd.".into(),
        industry: "Semiconductors".into(),
        website: "https://www.tsmc.com/".into(),
        description: "Leading pure-play foundry. Monthly revenue as published for 2023-2024 (NT$ thousands).".into(),
        defaults: SampleDefaults {
            gross_margin_pct: dec!(53.0),
            operating_expense: dec!(40000000),
            non_operating_income: dec!(5000000),
            tax_rate_pct: dec!(14.0),
            shares_outstanding: dec!(25930000),
            per_multiple: dec!(24),
            current_price: dec!(610),
        },
        revenue,
        earnings: vec![
            report("2330", 2023, 1, dec!(206991000), dec!(7.98)),
            report("2330", 2023, 2, dec!(181802000), dec!(7.01)),
            report("2330", 2023, 3, dec!(211089000), dec!(8.14)),
            report("2330", 2023, 4, dec!(238706000), dec!(8.14)),
            report("2330", 2024, 1, dec!(225514000), dec!(8.70)),
            report("2330", 2024, 2, dec!(236327000), dec!(9.00)),
        ],
    }
}

fn hon_hai() -> SampleCompany {
    let revenue = months(
        2023,
        &[
            dec!(459132000), dec!(402014000), dec!(400349000), dec!(450706000),
            dec!(486675000), dec!(490688000), dec!(469234000), dec!(441703000),
            dec!(659209000), dec!(741028000), dec!(650088000), dec!(629383000),
        ],
    )
    .chain(months(
        2024,
        &[
            dec!(522093000), dec!(447024000), dec!(474746000),
            dec!(510215000), dec!(450035000), dec!(568080000),
        ],
    ))
    .collect();

    SampleCompany {
        stock_no: "2317".into(),
        name: "Hon Hai Precision Industry Co., Ltd.".into(),
        industry: "Electronics manufacturing services".into(),
        website: "https://www.foxconn.com/".into(),
        description: "Largest contract electronics manufacturer. Monthly revenue as published for 2023-2024 (NT$ thousands).".into(),
        defaults: SampleDefaults {
            gross_margin_pct: dec!(6.5),
            operating_expense: dec!(26000000),
            non_operating_income: dec!(8000000),
            tax_rate_pct: dec!(18.0),
            shares_outstanding: dec!(13880000),
            per_multiple: dec!(12),
            current_price: dec!(105),
        },
        revenue,
        earnings: vec![
            report("2317", 2023, 1, dec!(20021400), dec!(1.46)),
            report("2317", 2023, 2, dec!(33214300), dec!(2.28)),
            report("2317", 2023, 3, dec!(48942500), dec!(3.36)),
            report("2317", 2023, 4, dec!(42164600), dec!(2.90)),
            report("2317", 2024, 1, dec!(22811900), dec!(1.57)),
            report("2317", 2024, 2, dec!(28073500), dec!(1.93)),
        ],
    }
}
