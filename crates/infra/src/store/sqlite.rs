//! SQLite-backed inventory store.
//!
//! ## Schema
//!
//! ```text
//! Product(product_id TEXT PK, name TEXT)
//! Location(location_id TEXT PK, name TEXT)
//! ProductMovement(movement_id TEXT PK, timestamp TEXT,
//!                 from_location TEXT NULL -> Location,
//!                 to_location TEXT NULL -> Location,
//!                 product_id TEXT -> Product, qty INTEGER)
//! ```
//!
//! Timestamps are stored as fixed-width RFC 3339 text (microseconds, `Z`), so
//! ordering by the text column is chronological.
//!
//! ## Error Mapping
//!
//! | SQLx Error | InventoryError | Scenario |
//! |------------|----------------|----------|
//! | Database (unique violation) | `DuplicateIdentity` | Identifier already registered |
//! | Database (other) | `StorageFailure` | Foreign key violation, check failure, IO |
//! | PoolTimedOut / PoolClosed / Io / other | `StorageFailure` | Connectivity |
//!
//! ## Foreign keys
//!
//! The schema declares the references, but SQLite only enforces them when the
//! connection enables `foreign_keys`. That switch follows the configured
//! reference policy. Under the enforced policy the store also checks
//! references itself, inside the write's transaction, so callers get an
//! `InvalidArgument` naming the missing entry instead of a driver error.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Row, Sqlite, SqlitePool, Transaction};
use tracing::instrument;

use stockbook_core::{InventoryError, InventoryResult, LocationId, MovementId, ProductId};
use stockbook_inventory::{CatalogKind, LedgerSnapshot, Movement, ValidMovement};

use crate::config::ReferencePolicy;

use super::r#trait::{
    CatalogRecord, InventoryStore, movement_references, still_referenced, typed_snapshot,
    unknown_reference,
};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS Product (
        product_id TEXT PRIMARY KEY,
        name       TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Location (
        location_id TEXT PRIMARY KEY,
        name        TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ProductMovement (
        movement_id   TEXT PRIMARY KEY,
        timestamp     TEXT NOT NULL,
        from_location TEXT NULL REFERENCES Location (location_id),
        to_location   TEXT NULL REFERENCES Location (location_id),
        product_id    TEXT NOT NULL REFERENCES Product (product_id),
        qty           INTEGER NOT NULL CHECK (qty > 0),
        CHECK (from_location IS NOT NULL OR to_location IS NOT NULL)
    )
    "#,
];

const MOVEMENT_COLUMNS: &str =
    "movement_id, timestamp, from_location, to_location, product_id, qty";

/// Connection settings for [`SqliteInventoryStore::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteStoreOptions {
    pub max_connections: u32,
    /// Let SQLite enforce the declared foreign keys.
    pub foreign_keys: bool,
}

impl Default for SqliteStoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            foreign_keys: false,
        }
    }
}

/// SQLite-backed inventory store.
///
/// Every write runs in its own transaction, and `snapshot()` runs its three
/// reads inside one transaction so that the balance computation never sees a
/// half-applied edit.
#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    /// Wrap an existing pool. Call [`migrate`](Self::migrate) before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `url` and create the schema if needed.
    ///
    /// In-memory databases live only as long as their connection, so they
    /// get exactly one connection that is never recycled.
    #[instrument(
        skip(options),
        fields(
            max_connections = options.max_connections,
            foreign_keys = options.foreign_keys
        ),
        err
    )]
    pub async fn connect(url: &str, options: SqliteStoreOptions) -> InventoryResult<Self> {
        let connect_options = SqliteConnectOptions::from_str(url)
            .map_err(|e| InventoryError::invalid(format!("invalid sqlite url '{url}': {e}")))?
            .create_if_missing(true)
            .foreign_keys(options.foreign_keys);

        let pool_options = if is_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(options.max_connections.max(1))
                .acquire_timeout(Duration::from_secs(30))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.migrate().await?;
        tracing::info!("sqlite inventory store ready");
        Ok(store)
    }

    /// Create the tables if they do not exist yet.
    pub async fn migrate(&self) -> InventoryResult<()> {
        let mut tx = self.begin("migrate").await?;
        for ddl in SCHEMA {
            sqlx::query(ddl)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        commit(tx, "migrate").await
    }

    async fn begin(&self, operation: &str) -> InventoryResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(&format!("{operation}: begin_transaction"), e))
    }

    /// Run one statement in its own transaction and return rows affected.
    async fn execute_in_tx<'q>(
        &self,
        operation: &str,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> InventoryResult<u64> {
        let mut tx = self.begin(operation).await?;
        let result = query
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        commit(tx, operation).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl InventoryStore for SqliteInventoryStore {
    async fn insert_entry(&self, kind: CatalogKind, record: CatalogRecord) -> InventoryResult<()> {
        let (table, id_col) = catalog_table(kind);
        let sql = format!("INSERT INTO {table} ({id_col}, name) VALUES (?1, ?2)");

        let mut tx = self.begin("insert_entry").await?;
        sqlx::query(&sql)
            .bind(&record.id)
            .bind(&record.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    InventoryError::duplicate(kind.as_str(), record.id.clone())
                } else {
                    map_sqlx_error("insert_entry", e)
                }
            })?;
        commit(tx, "insert_entry").await
    }

    async fn rename_entry(&self, kind: CatalogKind, id: &str, name: &str) -> InventoryResult<u64> {
        let (table, id_col) = catalog_table(kind);
        let sql = format!("UPDATE {table} SET name = ?1 WHERE {id_col} = ?2");
        self.execute_in_tx("rename_entry", sqlx::query(&sql).bind(name).bind(id))
            .await
    }

    async fn delete_entry(
        &self,
        kind: CatalogKind,
        id: &str,
        policy: ReferencePolicy,
    ) -> InventoryResult<u64> {
        let (table, id_col) = catalog_table(kind);
        let sql = format!("DELETE FROM {table} WHERE {id_col} = ?1");

        let mut tx = self.begin("delete_entry").await?;
        if policy.is_enforced() {
            let references = reference_count(&mut tx, kind, id).await?;
            if references > 0 {
                return Err(still_referenced(kind, id, references));
            }
        }
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_entry", e))?;
        commit(tx, "delete_entry").await?;
        Ok(result.rows_affected())
    }

    async fn get_entry(
        &self,
        kind: CatalogKind,
        id: &str,
    ) -> InventoryResult<Option<CatalogRecord>> {
        let (table, id_col) = catalog_table(kind);
        let sql = format!("SELECT {id_col} AS id, name FROM {table} WHERE {id_col} = ?1");

        let row = sqlx::query_as::<_, CatalogRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_entry", e))?;
        Ok(row.map(Into::into))
    }

    async fn list_entries(&self, kind: CatalogKind) -> InventoryResult<Vec<CatalogRecord>> {
        let rows = sqlx::query_as::<_, CatalogRow>(&list_entries_sql(kind))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_entries", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_movement(
        &self,
        movement: &Movement,
        policy: ReferencePolicy,
    ) -> InventoryResult<()> {
        let sql = format!(
            "INSERT INTO ProductMovement ({MOVEMENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        );
        let movement_id = movement.movement_id.to_string();

        let mut tx = self.begin("insert_movement").await?;
        if policy.is_enforced() {
            let references = movement_references(
                &movement.product_id,
                movement.from_location.as_ref(),
                movement.to_location.as_ref(),
            );
            ensure_registered(&mut tx, &references).await?;
        }
        sqlx::query(&sql)
            .bind(&movement_id)
            .bind(format_timestamp(movement.timestamp))
            .bind(movement.from_location.as_ref().map(LocationId::as_str))
            .bind(movement.to_location.as_ref().map(LocationId::as_str))
            .bind(movement.product_id.as_str())
            .bind(movement.qty)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    InventoryError::duplicate("movement", movement_id.clone())
                } else {
                    map_sqlx_error("insert_movement", e)
                }
            })?;
        commit(tx, "insert_movement").await
    }

    async fn update_movement(
        &self,
        id: MovementId,
        edit: &ValidMovement,
        policy: ReferencePolicy,
    ) -> InventoryResult<u64> {
        let movement_id = id.to_string();

        let mut tx = self.begin("update_movement").await?;
        let exists = sqlx::query("SELECT 1 FROM ProductMovement WHERE movement_id = ?1")
            .bind(&movement_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_movement", e))?
            .is_some();
        if !exists {
            return Ok(0);
        }
        if policy.is_enforced() {
            let references = movement_references(
                &edit.product_id,
                edit.from_location.as_ref(),
                edit.to_location.as_ref(),
            );
            ensure_registered(&mut tx, &references).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE ProductMovement
            SET from_location = ?1, to_location = ?2, product_id = ?3, qty = ?4
            WHERE movement_id = ?5
            "#,
        )
        .bind(edit.from_location.as_ref().map(LocationId::as_str))
        .bind(edit.to_location.as_ref().map(LocationId::as_str))
        .bind(edit.product_id.as_str())
        .bind(edit.qty)
        .bind(&movement_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_movement", e))?;
        commit(tx, "update_movement").await?;
        Ok(result.rows_affected())
    }

    async fn delete_movement(&self, id: MovementId) -> InventoryResult<u64> {
        let query =
            sqlx::query("DELETE FROM ProductMovement WHERE movement_id = ?1").bind(id.to_string());
        self.execute_in_tx("delete_movement", query).await
    }

    async fn get_movement(&self, id: MovementId) -> InventoryResult<Option<Movement>> {
        let sql = format!("SELECT {MOVEMENT_COLUMNS} FROM ProductMovement WHERE movement_id = ?1");

        let row = sqlx::query_as::<_, MovementRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_movement", e))?;
        row.map(Movement::try_from).transpose()
    }

    async fn list_movements(&self) -> InventoryResult<Vec<Movement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&list_movements_sql())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_movements", e))?;
        rows.into_iter().map(Movement::try_from).collect()
    }

    #[instrument(skip(self), err)]
    async fn snapshot(&self) -> InventoryResult<LedgerSnapshot> {
        let mut tx = self.begin("snapshot").await?;

        let products = sqlx::query_as::<_, CatalogRow>(&list_entries_sql(CatalogKind::Product))
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("snapshot: products", e))?;
        let locations = sqlx::query_as::<_, CatalogRow>(&list_entries_sql(CatalogKind::Location))
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("snapshot: locations", e))?;
        let movements = sqlx::query_as::<_, MovementRow>(&list_movements_sql())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("snapshot: movements", e))?;

        commit(tx, "snapshot").await?;

        typed_snapshot(
            products.into_iter().map(Into::into).collect(),
            locations.into_iter().map(Into::into).collect(),
            movements
                .into_iter()
                .map(Movement::try_from)
                .collect::<InventoryResult<_>>()?,
        )
    }
}

#[derive(Debug, FromRow)]
struct CatalogRow {
    id: String,
    name: String,
}

impl From<CatalogRow> for CatalogRecord {
    fn from(row: CatalogRow) -> Self {
        CatalogRecord::new(row.id, row.name)
    }
}

#[derive(Debug, FromRow)]
struct MovementRow {
    movement_id: String,
    timestamp: String,
    from_location: Option<String>,
    to_location: Option<String>,
    product_id: String,
    qty: i64,
}

impl TryFrom<MovementRow> for Movement {
    type Error = InventoryError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: InventoryError| {
            InventoryError::storage(format!(
                "corrupt movement row '{}' ({field}): {e}",
                row.movement_id
            ))
        };

        let movement_id =
            MovementId::from_str(&row.movement_id).map_err(|e| corrupt("movement_id", e))?;
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| corrupt("timestamp", InventoryError::invalid(e.to_string())))?;
        let from_location = row
            .from_location
            .as_deref()
            .map(LocationId::parse)
            .transpose()
            .map_err(|e| corrupt("from_location", e))?;
        let to_location = row
            .to_location
            .as_deref()
            .map(LocationId::parse)
            .transpose()
            .map_err(|e| corrupt("to_location", e))?;
        let product_id = ProductId::parse(&row.product_id).map_err(|e| corrupt("product_id", e))?;

        Ok(Movement {
            movement_id,
            timestamp,
            from_location,
            to_location,
            product_id,
            qty: row.qty,
        })
    }
}

fn catalog_table(kind: CatalogKind) -> (&'static str, &'static str) {
    match kind {
        CatalogKind::Product => ("Product", "product_id"),
        CatalogKind::Location => ("Location", "location_id"),
    }
}

fn list_entries_sql(kind: CatalogKind) -> String {
    let (table, id_col) = catalog_table(kind);
    format!("SELECT {id_col} AS id, name FROM {table} ORDER BY {id_col} ASC")
}

fn list_movements_sql() -> String {
    format!(
        "SELECT {MOVEMENT_COLUMNS} FROM ProductMovement \
         ORDER BY timestamp DESC, movement_id DESC"
    )
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Movements naming the entry, counted inside the caller's transaction.
async fn reference_count(
    tx: &mut Transaction<'static, Sqlite>,
    kind: CatalogKind,
    id: &str,
) -> InventoryResult<u64> {
    let sql = match kind {
        CatalogKind::Product => "SELECT COUNT(*) AS n FROM ProductMovement WHERE product_id = ?1",
        CatalogKind::Location => {
            "SELECT COUNT(*) AS n FROM ProductMovement \
             WHERE from_location = ?1 OR to_location = ?1"
        }
    };

    let row = sqlx::query(sql)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("reference_count", e))?;
    let n: i64 = row
        .try_get("n")
        .map_err(|e| map_sqlx_error("reference_count", e))?;
    Ok(n.max(0) as u64)
}

/// Fail with `InvalidArgument` on the first reference the catalog does not hold.
async fn ensure_registered(
    tx: &mut Transaction<'static, Sqlite>,
    references: &[(CatalogKind, &str)],
) -> InventoryResult<()> {
    for &(kind, id) in references {
        let (table, id_col) = catalog_table(kind);
        let sql = format!("SELECT 1 FROM {table} WHERE {id_col} = ?1");
        let found = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("ensure_registered", e))?;
        if found.is_none() {
            return Err(unknown_reference(kind, id));
        }
    }
    Ok(())
}

async fn commit(tx: Transaction<'static, Sqlite>, operation: &str) -> InventoryResult<()> {
    tx.commit()
        .await
        .map_err(|e| map_sqlx_error(&format!("{operation}: commit_transaction"), e))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Map SQLx errors to `InventoryError::StorageFailure`, naming the operation.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> InventoryError {
    match err {
        sqlx::Error::Database(db_err) => InventoryError::storage(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolTimedOut => {
            InventoryError::storage(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            InventoryError::storage(format!("connection pool closed in {operation}"))
        }
        other => InventoryError::storage(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use stockbook_inventory::MovementDraft;

    async fn memory_store(foreign_keys: bool) -> SqliteInventoryStore {
        SqliteInventoryStore::connect(
            "sqlite::memory:",
            SqliteStoreOptions {
                foreign_keys,
                ..SqliteStoreOptions::default()
            },
        )
        .await
        .unwrap()
    }

    fn movement(draft: MovementDraft, seconds: i64) -> Movement {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        draft
            .validate()
            .unwrap()
            .into_movement(MovementId::new(), t0 + Duration::seconds(seconds))
    }

    #[test]
    fn timestamps_are_fixed_width() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = a + Duration::microseconds(1);
        assert_eq!(format_timestamp(a), "2024-01-01T00:00:00.000000Z");
        assert!(format_timestamp(a) < format_timestamp(b));
    }

    #[tokio::test]
    async fn migrate_is_repeatable() {
        let store = memory_store(false).await;
        store.migrate().await.unwrap();
        store.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_ids_map_to_duplicate_identity() {
        let store = memory_store(false).await;
        store
            .insert_entry(CatalogKind::Product, CatalogRecord::new("P1", "Widget"))
            .await
            .unwrap();

        let err = store
            .insert_entry(CatalogKind::Product, CatalogRecord::new("P1", "Again"))
            .await
            .unwrap_err();
        assert_eq!(err, InventoryError::duplicate("product", "P1"));
        assert_eq!(store.list_entries(CatalogKind::Product).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn movements_round_trip_and_sort_newest_first() {
        let store = memory_store(false).await;
        let older = movement(MovementDraft::new("P1", 10).with_to("L1"), 0);
        let newer = movement(MovementDraft::new("P1", 4).with_from("L1").with_to("L2"), 30);
        store.insert_movement(&older, ReferencePolicy::Advisory).await.unwrap();
        store.insert_movement(&newer, ReferencePolicy::Advisory).await.unwrap();

        assert_eq!(store.get_movement(older.movement_id).await.unwrap(), Some(older.clone()));
        assert_eq!(store.list_movements().await.unwrap(), vec![newer, older]);
    }

    #[tokio::test]
    async fn update_keeps_timestamp_and_reports_missing_rows() {
        let store = memory_store(false).await;
        let original = movement(MovementDraft::new("P1", 10).with_to("L1"), 0);
        store.insert_movement(&original, ReferencePolicy::Advisory).await.unwrap();

        let edit = MovementDraft::new("P2", 3).with_from("L2").validate().unwrap();
        let advisory = ReferencePolicy::Advisory;
        let touched = store.update_movement(original.movement_id, &edit, advisory).await.unwrap();
        assert_eq!(touched, 1);
        let touched = store.update_movement(MovementId::new(), &edit, advisory).await.unwrap();
        assert_eq!(touched, 0);

        let stored = store.get_movement(original.movement_id).await.unwrap().unwrap();
        assert_eq!(stored.timestamp, original.timestamp);
        assert_eq!(stored.product_id.as_str(), "P2");
        assert_eq!(stored.to_location, None);
        assert_eq!(stored.qty, 3);
    }

    #[tokio::test]
    async fn dangling_references_are_accepted_without_foreign_keys() {
        let store = memory_store(false).await;
        let m = movement(MovementDraft::new("NOPE", 1).with_to("NOWHERE"), 0);
        store.insert_movement(&m, ReferencePolicy::Advisory).await.unwrap();
        assert_eq!(store.list_movements().await.unwrap(), vec![m]);
    }

    #[tokio::test]
    async fn foreign_keys_reject_dangling_references_when_enabled() {
        let store = memory_store(true).await;
        let err = store
            .insert_movement(
                &movement(MovementDraft::new("NOPE", 1).with_to("NOWHERE"), 0),
                ReferencePolicy::Advisory,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::StorageFailure(_)));
        assert!(store.list_movements().await.unwrap().is_empty());
    }

    async fn seeded(foreign_keys: bool) -> SqliteInventoryStore {
        let store = memory_store(foreign_keys).await;
        store
            .insert_entry(CatalogKind::Product, CatalogRecord::new("P1", "Widget"))
            .await
            .unwrap();
        store
            .insert_entry(CatalogKind::Location, CatalogRecord::new("L1", "Warehouse"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn enforced_writes_name_the_missing_reference() {
        // Without foreign keys the in-transaction check is the only guard.
        let store = seeded(false).await;
        let dangling = movement(MovementDraft::new("P1", 1).with_from("L1").with_to("L9"), 0);

        let err = store
            .insert_movement(&dangling, ReferencePolicy::Enforced)
            .await
            .unwrap_err();
        assert_eq!(err, InventoryError::invalid("unknown location 'L9'"));
        assert!(store.list_movements().await.unwrap().is_empty());

        let valid = movement(MovementDraft::new("P1", 1).with_to("L1"), 0);
        store.insert_movement(&valid, ReferencePolicy::Enforced).await.unwrap();

        let edit = MovementDraft::new("P9", 1).with_to("L1").validate().unwrap();
        let err = store
            .update_movement(valid.movement_id, &edit, ReferencePolicy::Enforced)
            .await
            .unwrap_err();
        assert_eq!(err, InventoryError::invalid("unknown product 'P9'"));
        assert_eq!(store.get_movement(valid.movement_id).await.unwrap(), Some(valid));
    }

    #[tokio::test]
    async fn enforced_delete_refuses_referenced_entries() {
        let store = seeded(true).await;
        let m = movement(MovementDraft::new("P1", 1).with_to("L1"), 0);
        store.insert_movement(&m, ReferencePolicy::Enforced).await.unwrap();

        let err = store
            .delete_entry(CatalogKind::Product, "P1", ReferencePolicy::Enforced)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InventoryError::invalid("product 'P1' is still referenced by 1 movement(s)")
        );

        store.delete_movement(m.movement_id).await.unwrap();
        let deleted = store
            .delete_entry(CatalogKind::Product, "P1", ReferencePolicy::Enforced)
            .await
            .unwrap();
        assert_eq!(deleted, 1);
    }

    #[test]
    fn memory_urls_are_detected() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite://file.db?mode=memory"));
        assert!(!is_memory_url("sqlite://inventory.db?mode=rwc"));
    }
}
