//! 库存内存存储实现
//!
//! 使用 RwLock + HashMap 提供线程安全的内存存储，
//! `upsert_*` 方法供测试和演示装载数据。

use crate::error::StorageError;
use crate::models::{CommandRecord, DeviceRecord, PresetRecord, SpaceRecord};
use crate::traits::InventoryStore;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryInventoryStore {
    presets: RwLock<HashMap<String, PresetRecord>>,
    commands: RwLock<HashMap<String, CommandRecord>>,
    devices: RwLock<HashMap<String, DeviceRecord>>,
    spaces: RwLock<HashMap<String, SpaceRecord>>,
}

fn upsert<T>(
    map: &RwLock<HashMap<String, T>>,
    id: String,
    record: T,
) -> Result<(), StorageError> {
    let mut map = map
        .write()
        .map_err(|_| StorageError::new("lock failed"))?;
    map.insert(id, record);
    Ok(())
}

fn find<T: Clone>(map: &RwLock<HashMap<String, T>>, id: &str) -> Result<Option<T>, StorageError> {
    let map = map.read().map_err(|_| StorageError::new("lock failed"))?;
    Ok(map.get(id).cloned())
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_preset(&self, record: PresetRecord) -> Result<(), StorageError> {
        upsert(&self.presets, record.preset_id.clone(), record)
    }

    pub fn upsert_command(&self, record: CommandRecord) -> Result<(), StorageError> {
        upsert(&self.commands, record.command_id.clone(), record)
    }

    pub fn upsert_device(&self, record: DeviceRecord) -> Result<(), StorageError> {
        upsert(&self.devices, record.device_id.clone(), record)
    }

    pub fn upsert_space(&self, record: SpaceRecord) -> Result<(), StorageError> {
        upsert(&self.spaces, record.space_id.clone(), record)
    }

    /// 删除设备（模拟软删除后的不可见）
    pub fn remove_device(&self, device_id: &str) -> Result<bool, StorageError> {
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(devices.remove(device_id).is_some())
    }
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn find_device(&self, device_id: &str) -> Result<Option<DeviceRecord>, StorageError> {
        find(&self.devices, device_id)
    }

    async fn find_preset(&self, preset_id: &str) -> Result<Option<PresetRecord>, StorageError> {
        find(&self.presets, preset_id)
    }

    async fn find_command(&self, command_id: &str) -> Result<Option<CommandRecord>, StorageError> {
        find(&self.commands, command_id)
    }

    async fn list_commands(&self, preset_id: &str) -> Result<Vec<CommandRecord>, StorageError> {
        let commands = self
            .commands
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<CommandRecord> = commands
            .values()
            .filter(|item| item.preset_id == preset_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.command_id.cmp(&b.command_id))
        });
        Ok(items)
    }

    async fn find_space(&self, space_id: &str) -> Result<Option<SpaceRecord>, StorageError> {
        find(&self.spaces, space_id)
    }

    async fn list_space_devices(&self, space_id: &str) -> Result<Vec<DeviceRecord>, StorageError> {
        let devices = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<DeviceRecord> = devices
            .values()
            .filter(|item| item.space_id == space_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.device_id.cmp(&b.device_id))
        });
        Ok(items)
    }
}
