//! Reports: spending totals by category and by month, as charts and JSON.

mod aggregation;
mod charts;
mod data;
mod page;

pub use aggregation::{expense_by_category, monthly_flow};
pub use data::get_report_data;
pub use page::get_reports_page;
