//! Repository for the `customers` table.

use bulkmail_core::types::Token;
use sqlx::PgPool;

use crate::models::customer::{CreateCustomer, CustomerRow};

const COLUMNS: &str = "id, email, first_name, last_name, company, created_at";

/// Read access to CRM customers, plus the insert used for seeding.
pub struct CustomerRepo;

impl CustomerRepo {
    pub async fn create(pool: &PgPool, input: &CreateCustomer) -> Result<CustomerRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (email, first_name, last_name, company) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomerRow>(&query)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.company)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Token) -> Result<Option<CustomerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, CustomerRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Customers whose id is in `ids`, in no particular order.
    pub async fn find_many(pool: &PgPool, ids: &[Token]) -> Result<Vec<CustomerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = ANY($1)");
        sqlx::query_as::<_, CustomerRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
