//! Postgres 执行日志实现

use crate::error::StorageError;
use crate::models::{
    ExecutionAttemptRecord, ExecutionLogPage, ExecutionLogQuery, NewExecutionAttempt,
};
use crate::traits::ExecutionLogStore;
use domain::{ResultStatus, TriggerType};
use sqlx::{PgPool, Row};

pub struct PgExecutionLogStore {
    pub pool: PgPool,
}

impl PgExecutionLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

const FILTERS: &str = "($1::text is null or device_id = $1) \
                       and ($2::text is null or space_id = $2) \
                       and ($3::text is null or status = $3) \
                       and ($4::bigint is null or ts_ms >= $4) \
                       and ($5::bigint is null or ts_ms <= $5)";

#[async_trait::async_trait]
impl ExecutionLogStore for PgExecutionLogStore {
    async fn append(
        &self,
        attempt: NewExecutionAttempt,
    ) -> Result<ExecutionAttemptRecord, StorageError> {
        let row = sqlx::query(
            "insert into execution_logs \
             (device_id, space_id, command_id, actor_id, trigger_type, status, message, ts_ms) \
             values ($1, $2, $3, $4, $5, $6, $7, $8) \
             returning log_id",
        )
        .bind(&attempt.device_id)
        .bind(&attempt.space_id)
        .bind(&attempt.command_id)
        .bind(&attempt.actor_id)
        .bind(attempt.trigger.as_str())
        .bind(attempt.status.as_str())
        .bind(&attempt.message)
        .bind(attempt.ts_ms)
        .fetch_one(&self.pool)
        .await?;
        let log_id: i64 = row.try_get("log_id")?;
        Ok(ExecutionAttemptRecord::from_new(log_id, attempt))
    }

    async fn list(&self, query: &ExecutionLogQuery) -> Result<ExecutionLogPage, StorageError> {
        let query = query.clone().normalized();
        let status = query.status.map(|status| status.as_str());

        let count_sql = format!("select count(*) as total from execution_logs where {FILTERS}");
        let total: i64 = sqlx::query(&count_sql)
            .bind(query.device_id.as_deref())
            .bind(query.space_id.as_deref())
            .bind(status)
            .bind(query.from_ms)
            .bind(query.to_ms)
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;

        let list_sql = format!(
            "select log_id, device_id, space_id, command_id, actor_id, trigger_type, status, \
             message, ts_ms \
             from execution_logs where {FILTERS} \
             order by ts_ms desc, log_id desc \
             limit $6 offset $7"
        );
        let rows = sqlx::query(&list_sql)
            .bind(query.device_id.as_deref())
            .bind(query.space_id.as_deref())
            .bind(status)
            .bind(query.from_ms)
            .bind(query.to_ms)
            .bind(i64::from(query.limit))
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let trigger: String = row.try_get("trigger_type")?;
            let status: String = row.try_get("status")?;
            items.push(ExecutionAttemptRecord {
                log_id: row.try_get("log_id")?,
                device_id: row.try_get("device_id")?,
                space_id: row.try_get("space_id")?,
                command_id: row.try_get("command_id")?,
                actor_id: row.try_get("actor_id")?,
                trigger: trigger
                    .parse::<TriggerType>()
                    .map_err(|err| StorageError::new(err.to_string()))?,
                status: status
                    .parse::<ResultStatus>()
                    .map_err(|err| StorageError::new(err.to_string()))?,
                message: row.try_get("message")?,
                ts_ms: row.try_get("ts_ms")?,
            });
        }
        Ok(ExecutionLogPage::new(items, total.max(0) as u64, &query))
    }
}
