//! `pressbill-parties` — customer records.

pub mod customer;

pub use customer::{auto_reference, Customer, CustomerContact, CustomerDetails};
