//! Disclosed quarterly earnings and their normalisation.

pub mod record;

pub use record::{
    actual_quarters_for_year, filter_by_stock, latest_eps_reference, normalize_all,
    parse_quarter, sort_quarterly_reports, EpsReference, QuarterlyReport, RawQuarterRecord,
};
