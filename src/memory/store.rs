//! 进程内记忆存储
//!
//! [`MemoryStore`] 是所有 [`Record`] 的唯一所有者，主表按 id 组织，
//! 另维护一个按分类的二级索引（插入顺序）。
//!
//! 注意 `get` / `get_by_category` / `search` 看似只读，实则会更新命中记录的
//! 访问统计，因此都需要 `&mut self`；只有 [`MemoryStore::stats`] 是真正只读的。
//! 需要跨任务共享时使用 [`SharedMemoryStore`](super::shared::SharedMemoryStore)。
//!
//! ```rust
//! use minerva::memory::{Category, MemoryStore, Payload, Record};
//!
//! let mut store = MemoryStore::new();
//! let mut content = Payload::new();
//! content.insert("description".into(), "python flask application".into());
//! let id = store.insert(Record::new(Category::CodebaseAnalysis, content)).unwrap();
//!
//! assert_eq!(store.search("FLASK").len(), 1);
//! assert_eq!(store.get(&id).unwrap().access_count(), 2);
//! ```

use super::record::{Category, Record};
use crate::error::StoreError;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

// ── MemoryStats ──────────────────────────────────────────────────────────────

/// 存储的聚合统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    pub total_memories: usize,
    /// 每个分类的记录数（包含计数为 0 的分类）
    pub type_counts: BTreeMap<Category, usize>,
    /// 访问次数最多的记录，并列时取遍历中最先遇到的
    pub most_accessed: Option<Record>,
    /// 创建时间最新的记录
    pub most_recent: Option<Record>,
}

// ── MemoryStore ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MemoryStore {
    records: HashMap<String, Record>,
    /// category → ids（插入顺序）
    category_index: HashMap<Category, Vec<String>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            category_index: Category::ALL.into_iter().map(|c| (c, Vec::new())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// 写入一条记录并返回其 id
    ///
    /// id 已存在时返回 [`StoreError::Conflict`]，存储保持不变。
    pub fn insert(&mut self, record: Record) -> Result<String, StoreError> {
        let id = record.id().to_string();
        if self.records.contains_key(&id) {
            return Err(StoreError::Conflict(id));
        }
        self.category_index
            .entry(record.category())
            .or_default()
            .push(id.clone());
        self.records.insert(id.clone(), record);
        Ok(id)
    }

    /// 按 id 查询，命中时记录一次访问
    pub fn get(&mut self, id: &str) -> Option<&Record> {
        let record = self.records.get_mut(id)?;
        record.record_access();
        Some(record)
    }

    /// 按分类查询，按插入顺序返回，每条记录访问一次
    pub fn get_by_category(&mut self, category: Category) -> Vec<&Record> {
        let ids: &[String] = self
            .category_index
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for id in ids {
            if let Some(record) = self.records.get_mut(id) {
                record.record_access();
            }
        }
        ids.iter().filter_map(|id| self.records.get(id)).collect()
    }

    /// 不区分大小写的子串搜索（`content` 与 `semantic_info`）
    ///
    /// 结果按 `(importance_score, last_accessed)` 降序排列；空查询匹配全部记录。
    /// 两个字段都命中时也只计一次访问。
    pub fn search(&mut self, query: &str) -> Vec<&Record> {
        let query = query.to_lowercase();
        let matched: Vec<String> = self
            .iter_indexed()
            .filter(|record| {
                searchable_text(&record.content).contains(&query)
                    || searchable_text(&record.semantic_info).contains(&query)
            })
            .map(|record| record.id().to_string())
            .collect();

        for id in &matched {
            if let Some(record) = self.records.get_mut(id) {
                record.record_access();
            }
        }

        let mut results: Vec<&Record> = matched
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect();
        results.sort_by(|a, b| {
            b.importance_score()
                .total_cmp(&a.importance_score())
                .then_with(|| b.last_accessed().total_cmp(&a.last_accessed()))
        });
        results
    }

    /// 只读聚合统计，不改变任何访问统计
    pub fn stats(&self) -> MemoryStats {
        let type_counts: BTreeMap<Category, usize> = Category::ALL
            .into_iter()
            .map(|c| (c, self.category_index.get(&c).map_or(0, Vec::len)))
            .collect();

        let most_accessed = self
            .iter_indexed()
            .reduce(|best, r| if r.access_count() > best.access_count() { r } else { best })
            .cloned();
        let most_recent = self
            .iter_indexed()
            .reduce(|best, r| if r.created_at() > best.created_at() { r } else { best })
            .cloned();

        MemoryStats {
            total_memories: self.records.len(),
            type_counts,
            most_accessed,
            most_recent,
        }
    }

    /// 为 `from` 添加指向 `to` 的关联；`from` 不存在时返回 `false`
    ///
    /// 不校验 `to` 是否存在，也不建立反向关联。
    pub fn associate(&mut self, from: &str, to: &str) -> bool {
        match self.records.get_mut(from) {
            Some(record) => {
                record.add_association(to);
                true
            }
            None => false,
        }
    }

    /// 按索引顺序遍历全部记录，不记录访问
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.iter_indexed()
    }

    /// 导出全部记录的结构化形式
    pub fn export(&self) -> Vec<Value> {
        self.iter_indexed().map(Record::to_value).collect()
    }

    /// 分类声明顺序 × 桶内插入顺序，保证遍历结果确定
    fn iter_indexed(&self) -> impl Iterator<Item = &Record> {
        Category::ALL
            .into_iter()
            .filter_map(move |c| self.category_index.get(&c))
            .flatten()
            .filter_map(move |id| self.records.get(id))
    }
}

// ── 私有工具函数 ──────────────────────────────────────────────────────────────

/// 将载荷渲染为宽松的小写文本（保留键名），用于子串匹配
fn searchable_text(payload: &serde_json::Map<String, Value>) -> String {
    payload
        .iter()
        .map(|(k, v)| format!("{}: {}", k, value_to_searchable_text(v)))
        .collect::<Vec<_>>()
        .join(", ")
        .to_lowercase()
}

fn value_to_searchable_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(arr) => arr
            .iter()
            .map(value_to_searchable_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => searchable_text(map),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}
