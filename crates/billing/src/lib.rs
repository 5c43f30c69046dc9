//! `pressbill-billing` — invoice domain: line-item reconciliation, invoice
//! lifecycle, totals policies, invoice numbering, amount-in-words.

pub mod config;
pub mod invoice;
pub mod line_item;
pub mod number;
pub mod words;

pub use config::{BillingConfig, TotalsPolicy};
pub use invoice::{Invoice, InvoiceLine, InvoiceStatus};
pub use line_item::{EditedField, LineItem, ReconcileError};
pub use number::InvoiceNumber;
pub use words::amount_to_words;
