//! `pressbill-statements` — statement periods, rollups and CSV export.

pub mod export;
pub mod period;
pub mod report;

pub use export::render_csv;
pub use period::{DateRange, StatementScope};
pub use report::{company_label, InvoiceSummary, Rollup, StatementReport};
