//! Request/response DTOs and JSON mapping helpers.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use pressbill_billing::{amount_to_words, EditedField, Invoice};
use pressbill_catalog::CatalogItem;
use pressbill_parties::{Customer, CustomerDetails};

use crate::app::services::{BillListing, NewBillLine};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gst: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
}

impl CreateCustomerRequest {
    pub fn details(&self) -> CustomerDetails {
        CustomerDetails {
            company: self.company.clone(),
            email: self.email.clone(),
            gst: self.gst.clone(),
            address: self.address.clone(),
            business_type: self.business_type.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub hsn: Option<String>,
    pub unit_price: Decimal,
    #[serde(default)]
    pub stock: Option<Decimal>,
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct BillLineRequest {
    pub description: String,
    #[serde(default)]
    pub dc_no: Option<String>,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_rate: Option<Decimal>,
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
}

impl From<BillLineRequest> for NewBillLine {
    fn from(r: BillLineRequest) -> Self {
        Self {
            description: r.description,
            dc_no: r.dc_no,
            quantity: r.quantity,
            unit_rate: r.unit_rate,
            tax_percent: r.tax_percent,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBillRequest {
    pub customer_phone: String,
    pub lines: Vec<BillLineRequest>,
    /// `exact` or `rounded_per_line`; the configured default when omitted.
    #[serde(default)]
    pub totals_policy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBillRequest {
    pub lines: Vec<BillLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ListBillsQuery {
    pub q: Option<String>,
    pub phone: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub start: Option<String>,
    pub end: Option<String>,
    /// `date`, `total`, `invoice` or `customer`; defaults to `date`.
    pub sort: Option<String>,
    /// `asc` or `desc`; defaults to `desc`.
    pub order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    /// `month`, `year` or `custom`; defaults to `month`.
    pub scope: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// `YYYY-MM-DD`, used by the `custom` scope.
    pub start: Option<String>,
    pub end: Option<String>,
    pub phone: Option<String>,
    /// `json` or `csv`; defaults to `json`.
    pub format: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub quantity: Decimal,
    pub unit_rate: Decimal,
    pub tax_percent: Decimal,
    pub line_total: Decimal,
    pub last_edited: EditedField,
    /// The field the user just edited.
    pub field: EditedField,
    pub value: Decimal,
    /// When set, the response also carries the nearest-ten display total.
    #[serde(default)]
    pub rounding: bool,
}

// -------------------------
// Response mapping
// -------------------------

pub fn customer_to_json(c: &Customer) -> serde_json::Value {
    json!({
        "id": c.id.to_string(),
        "name": c.name,
        "phone": c.phone,
        "company": c.details.company,
        "email": c.details.email,
        "gst": c.details.gst,
        "address": c.details.address,
        "business_type": c.details.business_type,
        "created_at": c.created_at,
    })
}

pub fn item_to_json(i: &CatalogItem) -> serde_json::Value {
    json!({
        "id": i.id.to_string(),
        "sku": i.sku.as_str(),
        "name": i.name,
        "hsn": i.hsn,
        "unit_price": i.unit_price,
        "stock": i.stock,
        "tax_percent": i.tax_percent,
        "created_at": i.created_at,
    })
}

/// Compact row for bill listings.
pub fn bill_summary_json(listing: &BillListing) -> serde_json::Value {
    let invoice = &listing.invoice;
    json!({
        "number": invoice.number().as_str(),
        "date": invoice.created_at(),
        "customer": listing.customer.name,
        "company": listing.customer.details.company,
        "phone": listing.customer.phone,
        "status": invoice.status(),
        "subtotal": invoice.subtotal(),
        "grand_total": invoice.grand_total(),
    })
}

/// Full bill payload: lines, totals and the grand total in words.
pub fn bill_detail_json(invoice: &Invoice, customer: &Customer) -> serde_json::Value {
    let lines: Vec<serde_json::Value> = invoice
        .lines()
        .iter()
        .map(|l| {
            json!({
                "line_no": l.line_no,
                "item_id": l.item_id.to_string(),
                "description": l.description,
                "dc_no": l.dc_no,
                "quantity": l.pricing.quantity,
                "unit_rate": l.pricing.unit_rate,
                "tax_percent": l.pricing.tax_percent,
                "line_total": l.pricing.line_total,
                "rounded_total": l.pricing.rounded_total(),
                "last_edited": l.pricing.last_edited,
            })
        })
        .collect();

    json!({
        "number": invoice.number().as_str(),
        "date": invoice.created_at(),
        "status": invoice.status(),
        "totals_policy": invoice.totals_policy(),
        "deleted": invoice.is_deleted(),
        "customer": customer_to_json(customer),
        "lines": lines,
        "subtotal": invoice.subtotal(),
        "grand_total": invoice.grand_total(),
        "total_in_words": amount_to_words(invoice.grand_total()),
    })
}
