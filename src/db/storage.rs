use crate::db::models::{DigitalDisplay, Model};
use crate::db::schema::INVENTORY_INIT;
use crate::error::{InventoryError, OperationContext};
use sqlx::{Any, AnyPool, Transaction};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

const DISPLAY_COLUMNS: &str = "serialNo, schedulerSystem, modelNo";
const MODEL_COLUMNS: &str = "modelNo, width, height, weight, depth, screenSize";

/// Result of `insert_display`: a missing model is not an error, the caller
/// sends the user to the add-model form instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    ModelMissing,
}

/// Every statement the handlers issue, bound to one session's pool.
#[derive(Clone)]
pub struct InventoryStorage {
    pool: AnyPool,
    query_timeout: Duration,
}

impl InventoryStorage {
    pub fn new(pool: AnyPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Run `op` under the configured query timeout. Dropping the future on
    /// timeout drops any open transaction, which rolls it back.
    async fn bounded<T, F>(&self, action: &'static str, op: F) -> Result<T, InventoryError>
    where
        F: Future<Output = Result<T, InventoryError>>,
    {
        tokio::time::timeout(self.query_timeout, op)
            .await
            .map_err(|_| InventoryError::QueryTimeout { action })?
    }

    /// The no-op query used to validate login credentials.
    pub async fn probe(&self) -> Result<(), InventoryError> {
        const ACTION: &str = "connecting to the database";
        self.bounded(ACTION, async {
            sqlx::query("SELECT 1").execute(&self.pool).await.during(ACTION)?;
            Ok(())
        })
        .await
    }

    /// Create both tables if they are absent.
    pub async fn init_schema(&self) -> Result<(), InventoryError> {
        const ACTION: &str = "initializing the schema";
        self.bounded(ACTION, async {
            // sqlx::query runs one statement at a time
            for stmt in INVENTORY_INIT.split(';') {
                let s = stmt.trim();
                if s.is_empty() {
                    continue;
                }
                sqlx::query(s).execute(&self.pool).await.during(ACTION)?;
            }
            Ok(())
        })
        .await
    }

    pub async fn list_displays(&self) -> Result<Vec<DigitalDisplay>, InventoryError> {
        const ACTION: &str = "fetching digital displays";
        self.bounded(ACTION, async {
            sqlx::query_as::<_, DigitalDisplay>(&format!(
                "SELECT {DISPLAY_COLUMNS} FROM DigitalDisplay"
            ))
            .fetch_all(&self.pool)
            .await
            .during(ACTION)
        })
        .await
    }

    pub async fn get_model(&self, model_no: &str) -> Result<Model, InventoryError> {
        const ACTION: &str = "fetching model details";
        self.bounded(ACTION, async {
            sqlx::query_as::<_, Model>(&format!(
                "SELECT {MODEL_COLUMNS} FROM Model WHERE modelNo = ?"
            ))
            .bind(model_no)
            .fetch_optional(&self.pool)
            .await
            .during(ACTION)?
            .ok_or_else(|| InventoryError::ModelNotFound(model_no.to_string()))
        })
        .await
    }

    /// Exact match on `schedulerSystem`; no pattern matching.
    pub async fn search_by_scheduler(
        &self,
        scheduler_system: &str,
    ) -> Result<Vec<DigitalDisplay>, InventoryError> {
        const ACTION: &str = "searching digital displays";
        self.bounded(ACTION, async {
            sqlx::query_as::<_, DigitalDisplay>(&format!(
                "SELECT {DISPLAY_COLUMNS} FROM DigitalDisplay WHERE schedulerSystem = ?"
            ))
            .bind(scheduler_system)
            .fetch_all(&self.pool)
            .await
            .during(ACTION)
        })
        .await
    }

    pub async fn get_display(&self, serial_no: &str) -> Result<DigitalDisplay, InventoryError> {
        const ACTION: &str = "fetching digital display";
        self.bounded(ACTION, async {
            sqlx::query_as::<_, DigitalDisplay>(&format!(
                "SELECT {DISPLAY_COLUMNS} FROM DigitalDisplay WHERE serialNo = ?"
            ))
            .bind(serial_no)
            .fetch_optional(&self.pool)
            .await
            .during(ACTION)?
            .ok_or_else(|| InventoryError::DisplayNotFound(serial_no.to_string()))
        })
        .await
    }

    /// Insert a display whose model already exists. Model check, duplicate
    /// check and insert share one transaction.
    pub async fn insert_display(
        &self,
        row: &DigitalDisplay,
    ) -> Result<InsertOutcome, InventoryError> {
        const ACTION: &str = "inserting digital display";
        self.bounded(ACTION, async {
            let mut tx = self.pool.begin().await.during(ACTION)?;

            if !model_exists(&mut tx, &row.model_no).await.during(ACTION)? {
                debug!(model_no = %row.model_no, "model missing; insert deferred to add-model");
                return Ok(InsertOutcome::ModelMissing);
            }
            if display_exists(&mut tx, &row.serial_no).await.during(ACTION)? {
                return Err(InventoryError::DuplicateSerial(row.serial_no.clone()));
            }
            insert_display_row(&mut tx, row).await.during(ACTION)?;

            tx.commit().await.during(ACTION)?;
            info!(serial_no = %row.serial_no, "digital display inserted");
            Ok(InsertOutcome::Inserted)
        })
        .await
    }

    /// Insert a model and the display that prompted it, atomically.
    pub async fn add_model_with_display(
        &self,
        model: &Model,
        row: &DigitalDisplay,
    ) -> Result<(), InventoryError> {
        const ACTION: &str = "adding model and inserting digital display";
        self.bounded(ACTION, async {
            let mut tx = self.pool.begin().await.during(ACTION)?;

            if model_exists(&mut tx, &model.model_no).await.during(ACTION)? {
                return Err(InventoryError::DuplicateModel(model.model_no.clone()));
            }
            if display_exists(&mut tx, &row.serial_no).await.during(ACTION)? {
                return Err(InventoryError::DuplicateSerial(row.serial_no.clone()));
            }

            sqlx::query(
                "INSERT INTO Model (modelNo, width, height, weight, depth, screenSize) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&model.model_no)
            .bind(model.width)
            .bind(model.height)
            .bind(model.weight)
            .bind(model.depth)
            .bind(model.screen_size)
            .execute(&mut *tx)
            .await
            .during(ACTION)?;

            insert_display_row(&mut tx, row).await.during(ACTION)?;

            tx.commit().await.during(ACTION)?;
            info!(
                model_no = %model.model_no,
                serial_no = %row.serial_no,
                "model and digital display inserted"
            );
            Ok(())
        })
        .await
    }

    /// Rewrite all three columns of the row keyed by `old_serial_no`, which
    /// may rename the serial itself. An unknown `old_serial_no` updates nothing.
    pub async fn update_display(
        &self,
        old_serial_no: &str,
        updated: &DigitalDisplay,
    ) -> Result<(), InventoryError> {
        const ACTION: &str = "updating digital display";
        self.bounded(ACTION, async {
            let mut tx = self.pool.begin().await.during(ACTION)?;

            if !model_exists(&mut tx, &updated.model_no).await.during(ACTION)? {
                return Err(InventoryError::UnknownModel(updated.model_no.clone()));
            }
            if updated.serial_no != old_serial_no
                && display_exists(&mut tx, &updated.serial_no).await.during(ACTION)?
            {
                return Err(InventoryError::DuplicateSerial(updated.serial_no.clone()));
            }

            let result = sqlx::query(
                "UPDATE DigitalDisplay SET serialNo = ?, schedulerSystem = ?, modelNo = ? \
                 WHERE serialNo = ?",
            )
            .bind(&updated.serial_no)
            .bind(&updated.scheduler_system)
            .bind(&updated.model_no)
            .bind(old_serial_no)
            .execute(&mut *tx)
            .await
            .during(ACTION)?;

            tx.commit().await.during(ACTION)?;
            info!(
                old_serial_no = %old_serial_no,
                serial_no = %updated.serial_no,
                rows = result.rows_affected(),
                "digital display updated"
            );
            Ok(())
        })
        .await
    }

    /// Delete a display and, if it was the last one referencing its model,
    /// the model too.
    pub async fn delete_display(&self, serial_no: &str) -> Result<(), InventoryError> {
        const ACTION: &str = "deleting digital display";
        self.bounded(ACTION, async {
            let mut tx = self.pool.begin().await.during(ACTION)?;

            let model_no: String =
                sqlx::query_scalar("SELECT modelNo FROM DigitalDisplay WHERE serialNo = ?")
                    .bind(serial_no)
                    .fetch_optional(&mut *tx)
                    .await
                    .during(ACTION)?
                    .ok_or_else(|| InventoryError::DisplayNotFound(serial_no.to_string()))?;

            sqlx::query("DELETE FROM DigitalDisplay WHERE serialNo = ?")
                .bind(serial_no)
                .execute(&mut *tx)
                .await
                .during(ACTION)?;

            let remaining: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM DigitalDisplay WHERE modelNo = ?")
                    .bind(&model_no)
                    .fetch_one(&mut *tx)
                    .await
                    .during(ACTION)?;

            let model_removed = remaining == 0;
            if model_removed {
                sqlx::query("DELETE FROM Model WHERE modelNo = ?")
                    .bind(&model_no)
                    .execute(&mut *tx)
                    .await
                    .during(ACTION)?;
            }

            tx.commit().await.during(ACTION)?;
            info!(
                serial_no = %serial_no,
                model_no = %model_no,
                model_removed,
                "digital display deleted"
            );
            Ok(())
        })
        .await
    }
}

async fn model_exists(tx: &mut Transaction<'_, Any>, model_no: &str) -> Result<bool, sqlx::Error> {
    let found: Option<String> = sqlx::query_scalar("SELECT modelNo FROM Model WHERE modelNo = ?")
        .bind(model_no)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(found.is_some())
}

async fn display_exists(
    tx: &mut Transaction<'_, Any>,
    serial_no: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT serialNo FROM DigitalDisplay WHERE serialNo = ?")
            .bind(serial_no)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(found.is_some())
}

async fn insert_display_row(
    tx: &mut Transaction<'_, Any>,
    display: &DigitalDisplay,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO DigitalDisplay (serialNo, schedulerSystem, modelNo) VALUES (?, ?, ?)")
        .bind(&display.serial_no)
        .bind(&display.scheduler_system)
        .bind(&display.model_no)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
