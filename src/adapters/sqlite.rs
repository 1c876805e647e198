use crate::domain::model::Transaction;
use crate::domain::ports::BulkWriter;
use crate::domain::transaction_type::Sign;
use crate::utils::error::{Result, WriteError};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    type         INTEGER NOT NULL,
    sign         INTEGER NOT NULL,
    date         TEXT    NOT NULL,
    time         TEXT    NOT NULL,
    value_cents  INTEGER NOT NULL,
    tax_id       TEXT    NOT NULL,
    card         TEXT    NOT NULL,
    store_owner  TEXT    NOT NULL,
    store_name   TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_transactions_store_name ON transactions(store_name);
";

const INSERT: &str = "INSERT INTO transactions \
     (type, sign, date, time, value_cents, tax_id, card, store_owner, store_name) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

/// 以 SQLite 作為關聯式儲存。每批在單一 SQL transaction 內完成插入。
#[derive(Clone)]
pub struct SqliteBulkWriter {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBulkWriter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Net balance per store, summed in minor units by the database.
    pub fn balances(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT store_name, SUM(sign * value_cents) \
             FROM transactions GROUP BY store_name ORDER BY store_name",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| WriteError::new("SQLite connection lock poisoned").into())
    }
}

fn insert_batch(conn: &mut Connection, batch: &[Transaction]) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(INSERT)?;
        for t in batch {
            let mut value = t.value;
            value.rescale(2);
            let sign: i32 = match t.kind.sign() {
                Sign::Plus => 1,
                Sign::Minus => -1,
            };
            stmt.execute(params![
                t.kind.code,
                sign,
                t.date.format("%Y-%m-%d").to_string(),
                t.time.format("%H:%M:%S").to_string(),
                value.mantissa() as i64,
                t.tax_id.as_str(),
                t.card,
                t.store_owner,
                t.store_name,
            ])?;
        }
    }
    tx.commit()
}

#[async_trait]
impl BulkWriter for SqliteBulkWriter {
    async fn write(&mut self, batch: Vec<Transaction>) -> std::result::Result<(), WriteError> {
        let conn = Arc::clone(&self.conn);
        let size = batch.len();

        // rusqlite 是同步 API，放到 blocking pool 執行
        let outcome = tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| WriteError::new("SQLite connection lock poisoned"))?;
            insert_batch(&mut conn, &batch)
                .map_err(|e| WriteError::with_source(format!("inserting {} rows", size), e))
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(join_error) => Err(WriteError::with_source("bulk insert task failed", join_error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tax_id::TaxId;
    use crate::domain::transaction_type;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn transaction(code: u8, value: Decimal, store: &str) -> Transaction {
        Transaction {
            kind: transaction_type::lookup(code).unwrap(),
            date: NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
            time: NaiveTime::from_hms_opt(15, 34, 53).unwrap(),
            value,
            tax_id: TaxId::new("09620676017").unwrap(),
            card: "4753****3153".to_string(),
            store_owner: "JOÃO MACEDO".to_string(),
            store_name: store.to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_batches() {
        let mut writer = SqliteBulkWriter::open_in_memory().unwrap();
        writer
            .write(vec![
                transaction(1, dec!(100.00), "Store Name"),
                transaction(9, dec!(30.00), "Store Name"),
            ])
            .await
            .unwrap();
        writer
            .write(vec![transaction(3, dec!(142.00), "BAR DO JOÃO")])
            .await
            .unwrap();

        assert_eq!(writer.count().unwrap(), 3);
        assert_eq!(
            writer.balances().unwrap(),
            vec![
                ("BAR DO JOÃO".to_string(), -14200),
                ("Store Name".to_string(), 7000)
            ]
        );
    }

    #[tokio::test]
    async fn test_write_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("transactions.db");

        let mut writer = SqliteBulkWriter::open(&path).unwrap();
        writer.write(vec![transaction(6, dec!(0.01), "S")]).await.unwrap();
        drop(writer);

        let reopened = SqliteBulkWriter::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
