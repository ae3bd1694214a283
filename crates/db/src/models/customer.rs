//! Customer rows.
//!
//! Customers are owned by the CRM; bulkmail only reads them, apart from the
//! insert used to seed records.

use bulkmail_core::recipient::Recipient;
use bulkmail_core::types::{Timestamp, Token};
use serde::Deserialize;
use sqlx::FromRow;

/// A row from the `customers` table.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub id: Token,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub created_at: Timestamp,
}

impl From<CustomerRow> for Recipient {
    fn from(row: CustomerRow) -> Self {
        Recipient {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            company: row.company,
        }
    }
}

/// DTO for inserting a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomer {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub company: Option<String>,
}
