//! Write seam for committed records.
//!
//! The pipeline only depends on two write shapes: an atomic batch insert
//! (strict mode) and a single-record insert (smart mode). Postgres backs the
//! services; the in-memory store backs tests and dry runs.

use std::future::Future;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::record::DispatchRecord;

/// Storage for committed dispatch records. Writes must be durable once a
/// call returns Ok.
pub trait RecordStore {
    /// Insert a batch atomically: either every record is written or none are.
    fn insert_many(&self, records: &[DispatchRecord]) -> impl Future<Output = Result<()>> + Send;

    /// Insert a single record.
    fn insert_one(&self, record: &DispatchRecord) -> impl Future<Output = Result<()>> + Send;
}

// ============================================================================
// Postgres
// ============================================================================

/// Postgres-backed store over a shared connection pool.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the records table if it does not exist yet, so the services
    /// can start against a fresh database.
    pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dispatch_records (
                record_id UUID PRIMARY KEY,
                company_name TEXT NOT NULL,
                contact_person TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                invoice_no TEXT NOT NULL,
                consignment_no TEXT NOT NULL,
                booking_date TIMESTAMPTZ NOT NULL,
                item_category TEXT NOT NULL,
                item_description TEXT NOT NULL,
                qty BIGINT NOT NULL,
                weight DOUBLE PRECISION NOT NULL,
                rate DOUBLE PRECISION NOT NULL,
                amount DOUBLE PRECISION NOT NULL,
                city TEXT NOT NULL,
                district TEXT NOT NULL,
                state TEXT NOT NULL,
                country TEXT NOT NULL,
                paid_or_to_pay TEXT NOT NULL,
                booking_type TEXT NOT NULL,
                remarks TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .context("failed to create dispatch_records table")?;
        Ok(())
    }
}

async fn insert_record<'e, E>(executor: E, record: &DispatchRecord) -> Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO dispatch_records (
            record_id, company_name, contact_person, email, phone, invoice_no,
            consignment_no, booking_date, item_category, item_description,
            qty, weight, rate, amount, city, district, state, country,
            paid_or_to_pay, booking_type, remarks, created_by, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&record.company_name)
    .bind(&record.contact_person)
    .bind(&record.email)
    .bind(&record.phone)
    .bind(&record.invoice_no)
    .bind(&record.consignment_no)
    .bind(record.booking_date)
    .bind(&record.item_category)
    .bind(&record.item_description)
    .bind(record.qty)
    .bind(record.weight)
    .bind(record.rate)
    .bind(record.amount)
    .bind(&record.city)
    .bind(&record.district)
    .bind(&record.state)
    .bind(&record.country)
    .bind(&record.paid_or_to_pay)
    .bind(&record.booking_type)
    .bind(&record.remarks)
    .bind(&record.created_by)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(executor)
    .await
    .context("failed to insert dispatch record")?;
    Ok(())
}

impl RecordStore for PgRecordStore {
    async fn insert_many(&self, records: &[DispatchRecord]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to open transaction")?;
        for record in records {
            insert_record(&mut *tx, record).await?;
        }
        tx.commit().await.context("failed to commit record batch")?;
        Ok(())
    }

    async fn insert_one(&self, record: &DispatchRecord) -> Result<()> {
        insert_record(&self.pool, record).await
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// In-memory store used by tests and `--dry-run` imports.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<DispatchRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of everything committed so far.
    pub fn records(&self) -> Vec<DispatchRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl RecordStore for MemoryStore {
    async fn insert_many(&self, records: &[DispatchRecord]) -> Result<()> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| anyhow!("record store lock poisoned"))?;
        guard.extend_from_slice(records);
        Ok(())
    }

    async fn insert_one(&self, record: &DispatchRecord) -> Result<()> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| anyhow!("record store lock poisoned"))?;
        guard.push(record.clone());
        Ok(())
    }
}
