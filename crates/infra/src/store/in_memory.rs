//! Mutex-backed store used by unit tests and when no database path is
//! configured.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pressbill_billing::Invoice;
use pressbill_catalog::CatalogItem;
use pressbill_core::{CustomerId, ItemId};
use pressbill_parties::Customer;

use super::{CatalogStore, CustomerStore, InvoiceStore, StoreError, StoreResult};

#[derive(Default)]
pub struct InMemoryStore {
    customers: Mutex<Vec<Customer>>,
    items: Mutex<Vec<CatalogItem>>,
    invoices: Mutex<Vec<Invoice>>,
    seqs: Mutex<HashMap<&'static str, u64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning only happens if a holder panicked; the data is still usable.
    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_seq(&self, name: &'static str) -> u64 {
        let mut seqs = Self::lock(&self.seqs);
        let entry = seqs.entry(name).or_insert(0);
        *entry += 1;
        *entry
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn insert(&self, customer: &Customer) -> StoreResult<()> {
        let mut customers = Self::lock(&self.customers);
        if customers.iter().any(|c| c.phone == customer.phone) {
            return Err(StoreError::Conflict(format!(
                "customer with phone {} already exists",
                customer.phone
            )));
        }
        customers.push(customer.clone());
        Ok(())
    }

    async fn get(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        Ok(Self::lock(&self.customers)
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> StoreResult<Option<Customer>> {
        Ok(Self::lock(&self.customers)
            .iter()
            .find(|c| c.phone == phone)
            .cloned())
    }

    async fn search(&self, query: Option<&str>, limit: u32) -> StoreResult<Vec<Customer>> {
        let mut hits: Vec<Customer> = Self::lock(&self.customers)
            .iter()
            .filter(|c| query.is_none_or(|q| c.matches_query(q)))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn next_reference_seq(&self) -> StoreResult<u64> {
        Ok(self.next_seq("customer_reference"))
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert(&self, item: &CatalogItem) -> StoreResult<()> {
        let mut items = Self::lock(&self.items);
        if items.iter().any(|i| i.name.eq_ignore_ascii_case(&item.name)) {
            return Err(StoreError::Conflict(format!(
                "item named {:?} already exists",
                item.name
            )));
        }
        items.push(item.clone());
        Ok(())
    }

    async fn get(&self, id: ItemId) -> StoreResult<Option<CatalogItem>> {
        Ok(Self::lock(&self.items).iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<CatalogItem>> {
        Ok(Self::lock(&self.items)
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name.trim()))
            .cloned())
    }

    async fn search(&self, query: Option<&str>) -> StoreResult<Vec<CatalogItem>> {
        let mut hits: Vec<CatalogItem> = Self::lock(&self.items)
            .iter()
            .filter(|i| query.is_none_or(|q| i.matches_query(q)))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(hits)
    }

    async fn next_sku_seq(&self) -> StoreResult<u64> {
        Ok(self.next_seq("item_sku"))
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn insert(&self, invoice: &Invoice) -> StoreResult<()> {
        let mut invoices = Self::lock(&self.invoices);
        if invoices.iter().any(|i| i.number() == invoice.number()) {
            return Err(StoreError::Conflict(format!(
                "invoice {} already exists",
                invoice.number()
            )));
        }
        invoices.push(invoice.clone());
        Ok(())
    }

    async fn update(&self, invoice: &Invoice) -> StoreResult<()> {
        let mut invoices = Self::lock(&self.invoices);
        match invoices.iter_mut().find(|i| i.number() == invoice.number()) {
            Some(slot) => {
                *slot = invoice.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn find_by_number(&self, number: &str) -> StoreResult<Option<Invoice>> {
        Ok(Self::lock(&self.invoices)
            .iter()
            .find(|i| i.number().as_str() == number)
            .cloned())
    }

    async fn list(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> StoreResult<Vec<Invoice>> {
        let mut hits: Vec<Invoice> = Self::lock(&self.invoices)
            .iter()
            .filter(|i| !i.is_deleted())
            .filter(|i| {
                range.is_none_or(|(start, end)| i.created_at() >= start && i.created_at() <= end)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(hits)
    }

    async fn next_invoice_seq(&self) -> StoreResult<u64> {
        Ok(self.next_seq("invoice_number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pressbill_billing::{InvoiceNumber, TotalsPolicy};
    use pressbill_core::InvoiceId;
    use pressbill_parties::{CustomerContact, CustomerDetails};
    use rust_decimal::Decimal;

    fn customer(name: &str, phone: &str) -> Customer {
        Customer::register(
            CustomerId::new(),
            name,
            CustomerContact::Phone(phone.into()),
            CustomerDetails::default(),
            Utc::now(),
        )
        .unwrap()
    }

    fn finalized_invoice(store_seq: u64, customer_id: CustomerId) -> Invoice {
        let date = NaiveDate::from_ymd_opt(2024, 8, 25).unwrap();
        let number = InvoiceNumber::generate("INV", date, store_seq).unwrap();
        let mut inv = Invoice::draft(
            InvoiceId::new(),
            number,
            customer_id,
            Utc::now(),
            TotalsPolicy::Exact,
        );
        inv.push_line(
            ItemId::new(),
            "Letterheads",
            None,
            Decimal::ONE,
            Decimal::from(100),
            Decimal::ZERO,
        )
        .unwrap();
        inv.finalize().unwrap();
        inv
    }

    #[tokio::test]
    async fn duplicate_phone_is_a_conflict() {
        let store = InMemoryStore::new();
        CustomerStore::insert(&store, &customer("A", "9848000001"))
            .await
            .unwrap();
        let err = CustomerStore::insert(&store, &customer("B", "9848000001"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn customer_search_filters_and_limits() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            CustomerStore::insert(&store, &customer(&format!("Shop {i}"), &format!("98480{i:05}")))
                .await
                .unwrap();
        }

        let all = CustomerStore::search(&store, None, 3).await.unwrap();
        assert_eq!(all.len(), 3);

        let hits = CustomerStore::search(&store, Some("shop 4"), 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Shop 4");
    }

    #[tokio::test]
    async fn item_name_lookup_is_case_insensitive() {
        let store = InMemoryStore::new();
        let item = CatalogItem::new(
            ItemId::new(),
            store.next_sku_seq().await.unwrap(),
            "Wedding Cards",
            None,
            Decimal::from(12),
            Decimal::ZERO,
            Decimal::ZERO,
            Utc::now(),
        )
        .unwrap();
        CatalogStore::insert(&store, &item).await.unwrap();

        let found = store.find_by_name("wedding cards").await.unwrap();
        assert_eq!(found.map(|i| i.id), Some(item.id));

        let dup = CatalogItem::new(
            ItemId::new(),
            2,
            "WEDDING CARDS",
            None,
            Decimal::ONE,
            Decimal::ZERO,
            Decimal::ZERO,
            Utc::now(),
        )
        .unwrap();
        assert!(matches!(
            CatalogStore::insert(&store, &dup).await.unwrap_err(),
            StoreError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn invoice_list_skips_deleted_rows() {
        let store = InMemoryStore::new();
        let cust = CustomerId::new();
        let keep = finalized_invoice(store.next_invoice_seq().await.unwrap(), cust);
        let mut gone = finalized_invoice(store.next_invoice_seq().await.unwrap(), cust);
        InvoiceStore::insert(&store, &keep).await.unwrap();
        InvoiceStore::insert(&store, &gone).await.unwrap();

        gone.soft_delete(Utc::now()).unwrap();
        store.update(&gone).await.unwrap();

        let listed = store.list(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].number(), keep.number());

        // Deleted invoices stay fetchable by number.
        let fetched = store.find_by_number(gone.number().as_str()).await.unwrap();
        assert!(fetched.is_some_and(|i| i.is_deleted()));
    }

    #[tokio::test]
    async fn sequences_are_independent_and_monotonic() {
        let store = InMemoryStore::new();
        assert_eq!(store.next_invoice_seq().await.unwrap(), 1);
        assert_eq!(store.next_invoice_seq().await.unwrap(), 2);
        assert_eq!(store.next_sku_seq().await.unwrap(), 1);
        assert_eq!(store.next_reference_seq().await.unwrap(), 1);
    }
}
