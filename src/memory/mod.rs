//! 记忆系统
//!
//! | 层次 | 实现 | 说明 |
//! |------|------|------|
//! | 记录 | [`Record`] | 身份 + 开放载荷 + 访问统计 |
//! | 存储 | [`MemoryStore`] | 单一所有者，按 id / 分类索引，子串搜索 |
//! | 共享 | [`SharedMemoryStore`] | 单把互斥锁包装，跨任务使用 |
//!
//! ## 快速上手
//!
//! ```rust
//! use minerva::memory::{Category, MemoryStore, Payload, Record};
//!
//! let mut store = MemoryStore::new();
//! let id = store.insert(Record::new(Category::Conversation, Payload::new())).unwrap();
//! assert!(store.get(&id).is_some());
//! assert!(store.get("missing").is_none());
//! ```

pub mod record;
pub mod shared;
pub mod store;

pub use record::{Category, Payload, Record};
pub use shared::SharedMemoryStore;
pub use store::{MemoryStats, MemoryStore};
