//! Customer registration and lookup matching.
//!
//! The phone column doubles as the customer's unique reference. When a
//! customer has no phone, a generated `ID-NNNNNN` reference is stored in its
//! place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pressbill_core::{CustomerId, DomainError, DomainResult, Entity};

/// Format a generated customer reference from a store sequence value.
pub fn auto_reference(seq: u64) -> String {
    format!("ID-{seq:06}")
}

/// How the customer is reachable/identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerContact {
    /// A real phone number, unique across customers.
    Phone(String),
    /// No phone given; a reference is generated from the store sequence.
    Generated(u64),
}

/// Optional profile fields collected at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub company: Option<String>,
    pub email: Option<String>,
    pub gst: Option<String>,
    pub address: Option<String>,
    pub business_type: Option<String>,
}

/// Entity: Customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Phone number or generated `ID-NNNNNN` reference. Unique.
    pub phone: String,
    pub details: CustomerDetails,
    pub created_at: DateTime<Utc>,
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Customer {
    pub fn register(
        id: CustomerId,
        name: impl Into<String>,
        contact: CustomerContact,
        details: CustomerDetails,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }

        let phone = match contact {
            CustomerContact::Phone(p) => {
                let p = p.trim().to_string();
                if p.is_empty() {
                    return Err(DomainError::validation(
                        "phone is required unless a generated reference is used",
                    ));
                }
                p
            }
            CustomerContact::Generated(seq) => auto_reference(seq),
        };

        Ok(Self {
            id,
            name,
            phone,
            details,
            created_at,
        })
    }

    /// Case-insensitive substring match over name, phone and company.
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&q)
            || self.phone.to_lowercase().contains(&q)
            || self
                .details
                .company
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, contact: CustomerContact) -> DomainResult<Customer> {
        Customer::register(
            CustomerId::new(),
            name,
            contact,
            CustomerDetails::default(),
            Utc::now(),
        )
    }

    #[test]
    fn registers_with_phone() {
        let c = register("Ravi Traders", CustomerContact::Phone("9848000001".into())).unwrap();
        assert_eq!(c.phone, "9848000001");
        assert_eq!(c.name, "Ravi Traders");
    }

    #[test]
    fn generated_reference_is_zero_padded() {
        let c = register("Walk-in", CustomerContact::Generated(123)).unwrap();
        assert_eq!(c.phone, "ID-000123");
        assert_eq!(auto_reference(1), "ID-000001");
    }

    #[test]
    fn rejects_empty_name_and_empty_phone() {
        assert!(register("  ", CustomerContact::Generated(1)).is_err());
        assert!(register("X", CustomerContact::Phone("  ".into())).is_err());
    }

    #[test]
    fn query_matches_name_phone_and_company() {
        let mut c = register("Sri Printers", CustomerContact::Phone("9848000002".into())).unwrap();
        c.details.company = Some("Lakshmi Offset".into());

        assert!(c.matches_query("sri"));
        assert!(c.matches_query("9848"));
        assert!(c.matches_query("offset"));
        assert!(!c.matches_query("unrelated"));
        assert!(c.matches_query(""));
    }
}
