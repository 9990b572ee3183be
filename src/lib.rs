pub mod cli;
pub mod config;
pub mod error;
pub mod memory;

pub mod prelude {
    pub use crate::config::MinervaConfig;
    pub use crate::error::{MinervaError, Result};
    pub use crate::memory::{
        Category, MemoryStats, MemoryStore, Payload, Record, SharedMemoryStore,
    };
}
