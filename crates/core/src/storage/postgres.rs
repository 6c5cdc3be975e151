use crate::domain::record::Record;
use crate::error::StoreError;
use crate::storage::CatalogAccess;

type StockRow = (String, String, String, String, String, String, String, String);

#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: sqlx::PgPool,
}

impl PgCatalog {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogAccess for PgCatalog {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query_as::<_, StockRow>(
            "SELECT ticker, company, brokerage, action, rating_from, rating_to, target_from, target_to \
             FROM stocks \
             ORDER BY ticker ASC",
        )
        .persistent(false)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    async fn upsert(&self, record: &Record) -> Result<bool, StoreError> {
        let res = sqlx::query(
            "INSERT INTO stocks (ticker, company, brokerage, action, rating_from, rating_to, target_from, target_to) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (ticker) DO NOTHING",
        )
        .persistent(false)
        .bind(&record.ticker)
        .bind(&record.company)
        .bind(&record.brokerage)
        .bind(&record.action)
        .bind(&record.rating_from)
        .bind(&record.rating_to)
        .bind(&record.target_from)
        .bind(&record.target_to)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }
}

fn row_to_record(row: StockRow) -> Record {
    let (ticker, company, brokerage, action, rating_from, rating_to, target_from, target_to) = row;
    Record {
        ticker,
        company,
        brokerage,
        action,
        rating_from,
        rating_to,
        target_from,
        target_to,
    }
}
