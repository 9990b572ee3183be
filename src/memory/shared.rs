//! 跨任务共享的记忆存储
//!
//! `get` / `get_by_category` / `search` 都会修改访问统计，读写没有本质区别，
//! 因此整个 [`MemoryStore`] 只用一把互斥锁保护，每个操作持锁完成。
//! 读取结果以克隆返回，调用方拿不到存储内部记录的可变引用。

use super::record::{Category, Record};
use super::store::{MemoryStats, MemoryStore};
use crate::error::StoreError;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// [`MemoryStore`] 的可克隆句柄
#[derive(Clone, Default)]
pub struct SharedMemoryStore {
    inner: Arc<Mutex<MemoryStore>>,
}

impl SharedMemoryStore {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn insert(&self, record: Record) -> Result<String, StoreError> {
        self.inner.lock().await.insert(record)
    }

    pub async fn get(&self, id: &str) -> Option<Record> {
        self.inner.lock().await.get(id).cloned()
    }

    pub async fn get_by_category(&self, category: Category) -> Vec<Record> {
        let mut store = self.inner.lock().await;
        store.get_by_category(category).into_iter().cloned().collect()
    }

    pub async fn search(&self, query: &str) -> Vec<Record> {
        let mut store = self.inner.lock().await;
        store.search(query).into_iter().cloned().collect()
    }

    pub async fn stats(&self) -> MemoryStats {
        self.inner.lock().await.stats()
    }

    pub async fn associate(&self, from: &str, to: &str) -> bool {
        self.inner.lock().await.associate(from, to)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// 按索引顺序克隆全部记录，不记录访问
    pub async fn snapshot(&self) -> Vec<Record> {
        self.inner.lock().await.records().cloned().collect()
    }

    pub async fn export(&self) -> Vec<Value> {
        self.inner.lock().await.export()
    }
}
