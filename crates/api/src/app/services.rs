//! Service layer: store wiring plus the operations the routes call.
//!
//! All state lives behind the store traits so the same operations run against
//! SQLite in production and the in-memory store in tests.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use pressbill_billing::{BillingConfig, Invoice, InvoiceNumber, InvoiceStatus, TotalsPolicy};
use pressbill_catalog::{CatalogItem, LineDefaults};
use pressbill_core::{CustomerId, DomainError, InvoiceId, ItemId};
use pressbill_infra::{
    ActivityLog, BackupPlan, CatalogStore, CustomerStore, InMemoryStore, InvoiceStore, SqliteStore,
    StoreError,
};
use pressbill_parties::{Customer, CustomerContact, CustomerDetails};
use pressbill_statements::{DateRange, InvoiceSummary, StatementReport, StatementScope};

use crate::config::AppConfig;

/// Operation failure: either a domain rule or the store said no.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One line of a bill as the caller describes it. Rate and tax fall back to
/// the catalog item's defaults when omitted.
#[derive(Debug, Clone)]
pub struct NewBillLine {
    pub description: String,
    pub dc_no: Option<String>,
    pub quantity: Decimal,
    pub unit_rate: Option<Decimal>,
    pub tax_percent: Option<Decimal>,
}

/// Sort key for bill listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillSort {
    Date,
    Total,
    Invoice,
    Customer,
}

impl FromStr for BillSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "total" => Ok(Self::Total),
            "invoice" => Ok(Self::Invoice),
            "customer" => Ok(Self::Customer),
            other => Err(DomainError::validation(format!(
                "unknown sort key: {other} (expected date, total, invoice or customer)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::validation(format!(
                "unknown sort order: {other} (expected asc or desc)"
            ))),
        }
    }
}

/// Filters and ordering for the bill list endpoint.
#[derive(Debug, Clone)]
pub struct BillQuery {
    pub query: Option<String>,
    pub phone: Option<String>,
    pub range: Option<DateRange>,
    pub sort: BillSort,
    pub order: SortOrder,
}

impl Default for BillQuery {
    fn default() -> Self {
        Self {
            query: None,
            phone: None,
            range: None,
            sort: BillSort::Date,
            order: SortOrder::Desc,
        }
    }
}

/// Invoice joined with its customer, ready for rendering.
#[derive(Debug, Clone)]
pub struct BillListing {
    pub invoice: Invoice,
    pub customer: Customer,
}

pub struct AppServices {
    customers: Arc<dyn CustomerStore>,
    catalog: Arc<dyn CatalogStore>,
    invoices: Arc<dyn InvoiceStore>,
    activity: Option<ActivityLog>,
    billing: BillingConfig,
}

/// Wire stores and supporting services from configuration.
///
/// With a database path we back up the current file (if retention is
/// configured), then open SQLite; without one, everything runs in memory.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let (customers, catalog, invoices): (
        Arc<dyn CustomerStore>,
        Arc<dyn CatalogStore>,
        Arc<dyn InvoiceStore>,
    ) = match &config.database_path {
        Some(path) => {
            if let Some(backup_dir) = &config.backup_dir {
                if path.exists() {
                    let plan = BackupPlan::new(path, backup_dir, config.backup_keep);
                    match plan.snapshot(Utc::now()) {
                        Ok(target) => info!(backup = %target.display(), "startup backup complete"),
                        Err(err) => warn!(%err, "startup backup failed, continuing"),
                    }
                }
            }
            let store = Arc::new(SqliteStore::connect(path).await?);
            (store.clone(), store.clone(), store)
        }
        None => {
            info!("no database path configured, using in-memory store");
            let store = Arc::new(InMemoryStore::new());
            (store.clone(), store.clone(), store)
        }
    };

    Ok(AppServices {
        customers,
        catalog,
        invoices,
        activity: config.activity_dir.as_ref().map(ActivityLog::new),
        billing: config.billing.clone(),
    })
}

impl AppServices {
    pub fn billing(&self) -> &BillingConfig {
        &self.billing
    }

    fn record_activity(&self, entity: &str, action: &str, data: serde_json::Value) {
        if let Some(log) = &self.activity {
            if let Err(err) = log.record(Utc::now(), entity, action, data) {
                warn!(%err, entity, action, "activity record failed");
            }
        }
    }

    pub async fn create_customer(
        &self,
        name: &str,
        phone: Option<&str>,
        details: CustomerDetails,
    ) -> Result<Customer, OpError> {
        let contact = match phone.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => {
                if let Some(existing) = self.customers.find_by_phone(p).await? {
                    return Err(DomainError::conflict(format!(
                        "customer with phone {p} already exists (id {})",
                        existing.id
                    ))
                    .into());
                }
                CustomerContact::Phone(p.to_string())
            }
            None => CustomerContact::Generated(self.customers.next_reference_seq().await?),
        };

        let customer = Customer::register(CustomerId::new(), name, contact, details, Utc::now())?;
        self.customers.insert(&customer).await?;
        self.record_activity(
            "customer",
            "created",
            serde_json::json!({
                "id": customer.id.to_string(),
                "name": customer.name,
                "phone": customer.phone,
            }),
        );
        Ok(customer)
    }

    pub async fn search_customers(
        &self,
        query: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Customer>, OpError> {
        Ok(self.customers.search(query, limit).await?)
    }

    pub async fn customer_by_phone(&self, phone: &str) -> Result<Customer, OpError> {
        self.customers
            .find_by_phone(phone)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn create_item(
        &self,
        name: &str,
        hsn: Option<String>,
        unit_price: Decimal,
        stock: Decimal,
        tax_percent: Option<Decimal>,
    ) -> Result<CatalogItem, OpError> {
        let tax = tax_percent.unwrap_or(self.billing.default_tax_percent);
        let seq = self.catalog.next_sku_seq().await?;
        let item = CatalogItem::new(
            ItemId::new(),
            seq,
            name,
            hsn,
            unit_price,
            stock,
            tax,
            Utc::now(),
        )?;
        self.catalog.insert(&item).await?;
        self.record_activity(
            "item",
            "created",
            serde_json::json!({
                "id": item.id.to_string(),
                "sku": item.sku.as_str(),
                "name": item.name,
            }),
        );
        Ok(item)
    }

    pub async fn search_items(&self, query: Option<&str>) -> Result<Vec<CatalogItem>, OpError> {
        Ok(self.catalog.search(query).await?)
    }

    /// Price/tax defaults for the bill editor, by item name.
    pub async fn item_defaults(&self, name: &str) -> Result<LineDefaults, OpError> {
        let item = self
            .catalog
            .find_by_name(name)
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok(item.line_defaults())
    }

    pub async fn create_bill(
        &self,
        customer_phone: &str,
        lines: Vec<NewBillLine>,
        totals_policy: Option<TotalsPolicy>,
    ) -> Result<Invoice, OpError> {
        let customer = self.customer_by_phone(customer_phone).await?;
        let policy = totals_policy.unwrap_or(self.billing.totals_policy);

        let now = Utc::now();
        let seq = self.invoices.next_invoice_seq().await?;
        let number = InvoiceNumber::generate(&self.billing.number_prefix, now.date_naive(), seq)?;

        let mut invoice = Invoice::draft(InvoiceId::new(), number, customer.id, now, policy);
        for line in lines {
            let (item_id, rate, tax) = self.resolve_line_item(&line).await?;
            invoice.push_line(item_id, line.description, line.dc_no, line.quantity, rate, tax)?;
        }
        invoice.finalize()?;

        self.invoices.insert(&invoice).await?;
        self.record_activity(
            "invoice",
            "created",
            serde_json::json!({
                "number": invoice.number().as_str(),
                "customer_id": invoice.customer_id().to_string(),
                "grand_total": invoice.grand_total(),
            }),
        );
        Ok(invoice)
    }

    /// Resolve a bill line against the catalog. Unknown descriptions become
    /// placeholder items so they show up for later price maintenance.
    async fn resolve_line_item(
        &self,
        line: &NewBillLine,
    ) -> Result<(ItemId, Decimal, Decimal), OpError> {
        match self.catalog.find_by_name(&line.description).await? {
            Some(item) => {
                let defaults = item.line_defaults();
                Ok((
                    item.id,
                    line.unit_rate.unwrap_or(defaults.unit_price),
                    line.tax_percent.unwrap_or(defaults.tax_percent),
                ))
            }
            None => {
                let rate = line.unit_rate.unwrap_or(Decimal::ZERO);
                let seq = self.catalog.next_sku_seq().await?;
                let item = CatalogItem::placeholder(
                    ItemId::new(),
                    seq,
                    line.description.clone(),
                    rate,
                    Utc::now(),
                )?;
                self.catalog.insert(&item).await?;
                let tax = line.tax_percent.unwrap_or(self.billing.default_tax_percent);
                Ok((item.id, rate, tax))
            }
        }
    }

    pub async fn get_bill(&self, number: &str) -> Result<BillListing, OpError> {
        let invoice = self
            .invoices
            .find_by_number(number)
            .await?
            .ok_or(DomainError::NotFound)?;
        let customer = self.customer_of(&invoice).await?;
        Ok(BillListing { invoice, customer })
    }

    /// Replace a bill's lines: reopen, rebuild through the reconciler,
    /// re-finalize.
    pub async fn update_bill(
        &self,
        number: &str,
        lines: Vec<NewBillLine>,
    ) -> Result<Invoice, OpError> {
        let mut invoice = self
            .invoices
            .find_by_number(number)
            .await?
            .ok_or(DomainError::NotFound)?;

        if invoice.status() == InvoiceStatus::Finalized {
            invoice.reopen()?;
        }
        invoice.clear_lines()?;
        for line in lines {
            let (item_id, rate, tax) = self.resolve_line_item(&line).await?;
            invoice.push_line(item_id, line.description, line.dc_no, line.quantity, rate, tax)?;
        }
        invoice.finalize()?;

        self.invoices.update(&invoice).await?;
        self.record_activity(
            "invoice",
            "updated",
            serde_json::json!({
                "number": invoice.number().as_str(),
                "grand_total": invoice.grand_total(),
            }),
        );
        Ok(invoice)
    }

    pub async fn delete_bill(&self, number: &str) -> Result<(), OpError> {
        let mut invoice = self
            .invoices
            .find_by_number(number)
            .await?
            .ok_or(DomainError::NotFound)?;
        invoice.soft_delete(Utc::now())?;
        self.invoices.update(&invoice).await?;
        self.record_activity(
            "invoice",
            "deleted",
            serde_json::json!({ "number": invoice.number().as_str() }),
        );
        Ok(())
    }

    pub async fn list_bills(&self, params: &BillQuery) -> Result<Vec<BillListing>, OpError> {
        let range = params.range.map(|r| (r.start, r.end));
        let invoices = self.invoices.list(range).await?;

        let mut listings = Vec::new();
        for invoice in invoices {
            let customer = self.customer_of(&invoice).await?;
            if let Some(phone) = &params.phone {
                if &customer.phone != phone {
                    continue;
                }
            }
            if let Some(q) = &params.query {
                let number_hit = invoice
                    .number()
                    .as_str()
                    .to_lowercase()
                    .contains(&q.to_lowercase());
                if !number_hit && !customer.matches_query(q) {
                    continue;
                }
            }
            listings.push(BillListing { invoice, customer });
        }

        listings.sort_by(|a, b| {
            let ordering = match params.sort {
                BillSort::Date => a.invoice.created_at().cmp(&b.invoice.created_at()),
                BillSort::Total => a.invoice.grand_total().cmp(&b.invoice.grand_total()),
                BillSort::Invoice => a.invoice.number().as_str().cmp(b.invoice.number().as_str()),
                BillSort::Customer => a
                    .customer
                    .name
                    .to_lowercase()
                    .cmp(&b.customer.name.to_lowercase()),
            };
            match params.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        Ok(listings)
    }

    /// Build a statement for the resolved period, oldest invoice first.
    pub async fn statement(
        &self,
        scope: StatementScope,
        phone: Option<&str>,
    ) -> Result<StatementReport, OpError> {
        let range = scope.resolve()?;
        let invoices = self.invoices.list(Some((range.start, range.end))).await?;

        let mut rows = Vec::new();
        for invoice in invoices {
            let customer = self.customer_of(&invoice).await?;
            if let Some(p) = phone {
                if customer.phone != p {
                    continue;
                }
            }
            rows.push(InvoiceSummary {
                number: invoice.number().as_str().to_string(),
                created_at: invoice.created_at(),
                company: customer.details.company.clone(),
                phone: customer.phone,
                total: invoice.grand_total(),
            });
        }
        rows.reverse();
        Ok(StatementReport::build(range, rows))
    }

    async fn customer_of(&self, invoice: &Invoice) -> Result<Customer, OpError> {
        self.customers
            .get(invoice.customer_id())
            .await?
            .ok_or_else(|| {
                StoreError::corrupt(format!(
                    "invoice {} references a missing customer",
                    invoice.number()
                ))
                .into()
            })
    }
}
