//! Postgres 库存只读实现
//!
//! 库存表由外部系统维护，`isdel = true` 的记录视为已删除。

use crate::error::StorageError;
use crate::models::{CommandRecord, DeviceRecord, PresetRecord, SpaceRecord};
use crate::traits::InventoryStore;
use domain::DeviceStatus;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgInventoryStore {
    pub pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

const DEVICE_COLUMNS: &str = "device_id, space_id, preset_id, name, address, port, mac_address, \
                              status, display_order";

const COMMAND_COLUMNS: &str = "command_id, preset_id, name, payload, command_type, display_order";

fn port_from_row(row: &PgRow) -> Result<Option<u16>, StorageError> {
    let port: Option<i32> = row.try_get("port")?;
    port.map(|value| {
        u16::try_from(value).map_err(|_| StorageError::new(format!("invalid port {value}")))
    })
    .transpose()
}

/// 库存中无法识别的状态值按停用处理，只影响该设备本身。
fn stored_device_status(value: &str) -> DeviceStatus {
    value.parse().unwrap_or(DeviceStatus::Inactive)
}

fn device_from_row(row: &PgRow) -> Result<DeviceRecord, StorageError> {
    let status: String = row.try_get("status")?;
    let status = stored_device_status(&status);
    Ok(DeviceRecord {
        device_id: row.try_get("device_id")?,
        space_id: row.try_get("space_id")?,
        preset_id: row.try_get("preset_id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        port: port_from_row(row)?,
        mac_address: row.try_get("mac_address")?,
        status,
        display_order: row.try_get("display_order")?,
    })
}

fn command_from_row(row: &PgRow) -> Result<CommandRecord, StorageError> {
    Ok(CommandRecord {
        command_id: row.try_get("command_id")?,
        preset_id: row.try_get("preset_id")?,
        name: row.try_get("name")?,
        payload: row.try_get("payload")?,
        command_type: row.try_get("command_type")?,
        display_order: row.try_get("display_order")?,
    })
}

#[async_trait::async_trait]
impl InventoryStore for PgInventoryStore {
    async fn find_device(&self, device_id: &str) -> Result<Option<DeviceRecord>, StorageError> {
        let sql = format!(
            "select {DEVICE_COLUMNS} from devices where device_id = $1 and isdel = false"
        );
        let row = sqlx::query(&sql)
            .bind(device_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(device_from_row).transpose()
    }

    async fn find_preset(&self, preset_id: &str) -> Result<Option<PresetRecord>, StorageError> {
        let row = sqlx::query(
            "select preset_id, name, protocol, address, port, description \
             from presets where preset_id = $1 and isdel = false",
        )
        .bind(preset_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(PresetRecord {
            preset_id: row.try_get("preset_id")?,
            name: row.try_get("name")?,
            protocol: row.try_get("protocol")?,
            address: row.try_get("address")?,
            port: port_from_row(&row)?,
            description: row.try_get("description")?,
        }))
    }

    async fn find_command(&self, command_id: &str) -> Result<Option<CommandRecord>, StorageError> {
        let sql = format!(
            "select {COMMAND_COLUMNS} from commands where command_id = $1 and isdel = false"
        );
        let row = sqlx::query(&sql)
            .bind(command_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(command_from_row).transpose()
    }

    async fn list_commands(&self, preset_id: &str) -> Result<Vec<CommandRecord>, StorageError> {
        let sql = format!(
            "select {COMMAND_COLUMNS} from commands \
             where preset_id = $1 and isdel = false \
             order by display_order asc, command_id asc"
        );
        let rows = sqlx::query(&sql)
            .bind(preset_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(command_from_row).collect()
    }

    async fn find_space(&self, space_id: &str) -> Result<Option<SpaceRecord>, StorageError> {
        let row = sqlx::query(
            "select space_id, name from spaces where space_id = $1 and isdel = false",
        )
        .bind(space_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(SpaceRecord {
            space_id: row.try_get("space_id")?,
            name: row.try_get("name")?,
        }))
    }

    async fn list_space_devices(&self, space_id: &str) -> Result<Vec<DeviceRecord>, StorageError> {
        let sql = format!(
            "select {DEVICE_COLUMNS} from devices \
             where space_id = $1 and isdel = false \
             order by display_order asc, device_id asc"
        );
        let rows = sqlx::query(&sql)
            .bind(space_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(device_from_row).collect()
    }
}
