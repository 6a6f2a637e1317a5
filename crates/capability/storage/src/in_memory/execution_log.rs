//! 执行日志内存实现
//!
//! 序列号由原子计数器分配，并发追加安全。

use crate::error::StorageError;
use crate::models::{
    ExecutionAttemptRecord, ExecutionLogPage, ExecutionLogQuery, NewExecutionAttempt,
};
use crate::traits::ExecutionLogStore;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

pub struct InMemoryExecutionLogStore {
    logs: RwLock<Vec<ExecutionAttemptRecord>>,
    next_id: AtomicI64,
}

impl Default for InMemoryExecutionLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryExecutionLogStore {
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// 当前记录数
    pub fn len(&self) -> Result<usize, StorageError> {
        let logs = self
            .logs
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(logs.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// 全部记录（按写入顺序）
    pub fn snapshot(&self) -> Result<Vec<ExecutionAttemptRecord>, StorageError> {
        let logs = self
            .logs
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(logs.clone())
    }
}

#[async_trait::async_trait]
impl ExecutionLogStore for InMemoryExecutionLogStore {
    async fn append(
        &self,
        attempt: NewExecutionAttempt,
    ) -> Result<ExecutionAttemptRecord, StorageError> {
        let mut logs = self
            .logs
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let log_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = ExecutionAttemptRecord::from_new(log_id, attempt);
        logs.push(record.clone());
        Ok(record)
    }

    async fn list(&self, query: &ExecutionLogQuery) -> Result<ExecutionLogPage, StorageError> {
        let query = query.clone().normalized();
        let logs = self
            .logs
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<ExecutionAttemptRecord> = logs
            .iter()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.ts_ms.cmp(&a.ts_ms).then_with(|| b.log_id.cmp(&a.log_id)));
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();
        Ok(ExecutionLogPage::new(items, total, &query))
    }
}
