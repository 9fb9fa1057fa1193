//! Monthly revenue records and their normalisation from the open-data feed.

pub mod record;

pub use record::{
    filter_by_stock, group_by_year, normalize_all, select_year, sort_month_records, MonthRecord,
    RawRevenueRecord,
};
