//! 运行配置
//!
//! YAML 格式，所有字段都有默认值：
//!
//! ```yaml
//! default_category: conversation
//! default_importance: 0.5
//! search_limit: 10        # 0 表示不限制，最大 1000
//! history_file: ~/.minerva/history
//! seed_file: ./memories.json
//! ```

use crate::error::{ConfigError, Result};
use crate::memory::Category;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 未显式指定配置文件时尝试加载的路径
pub const DEFAULT_CONFIG_FILE: &str = "minerva.yaml";

/// `search_limit` 的上限；更多结果请用 0（不限制）
pub const MAX_SEARCH_LIMIT: usize = 1000;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MinervaConfig {
    /// 自由文本添加记忆时使用的分类
    pub default_category: Category,
    pub default_importance: f64,
    /// 查询结果最多展示条数（0 = 不限制）
    pub search_limit: usize,
    /// 交互模式的历史记录文件
    pub history_file: Option<String>,
    /// 启动时导入的记录文件（JSON 数组）
    pub seed_file: Option<String>,
}

impl Default for MinervaConfig {
    fn default() -> Self {
        Self {
            default_category: Category::BasicInfo,
            default_importance: 0.0,
            search_limit: 10,
            history_file: None,
            seed_file: None,
        }
    }
}

impl MinervaConfig {
    pub fn load(path: &str) -> Result<Self> {
        let file = std::fs::File::open(expand_tilde(Path::new(path)))
            .map_err(|_| ConfigError::FileNotFound(path.to_string()))?;
        let config: MinervaConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        info!(path = %path, "⚙️ 配置已加载");
        Ok(config)
    }

    /// 显式路径必须存在；未指定时尝试 [`DEFAULT_CONFIG_FILE`]，不存在则用默认值
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => {
                debug!("未找到配置文件，使用默认配置");
                Ok(Self::default())
            }
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: MinervaConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.default_importance.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "default_importance".to_string(),
                message: "must be a finite number".to_string(),
            });
        }
        if self.search_limit > MAX_SEARCH_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "search_limit".to_string(),
                message: format!("must be 0 (unlimited) or at most {MAX_SEARCH_LIMIT}"),
            });
        }
        for (field, value) in [
            ("history_file", &self.history_file),
            ("seed_file", &self.seed_file),
        ] {
            if value.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.as_deref().map(|p| expand_tilde(Path::new(p)))
    }

    pub fn seed_path(&self) -> Option<PathBuf> {
        self.seed_file.as_deref().map(|p| expand_tilde(Path::new(p)))
    }
}

pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.starts_with("~/")
        && let Some(home) = std::env::var("HOME")
            .ok()
            .or_else(|| std::env::var("USERPROFILE").ok())
    {
        return PathBuf::from(home).join(&s[2..]);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MinervaError;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = MinervaConfig::from_yaml("{}").unwrap();
        assert_eq!(config, MinervaConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = MinervaConfig::from_yaml(
            "default_category: error_experience\nsearch_limit: 0\n",
        )
        .unwrap();
        assert_eq!(config.default_category, Category::ErrorExperience);
        assert_eq!(config.search_limit, 0);
        assert_eq!(config.default_importance, 0.0);
    }

    #[test]
    fn test_unknown_category_fails() {
        let err = MinervaConfig::from_yaml("default_category: dreams\n").unwrap_err();
        assert!(matches!(err, MinervaError::Config(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let err = MinervaConfig::from_yaml("seed_file: \"  \"\n").unwrap_err();
        assert!(matches!(
            err,
            MinervaError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "seed_file"
        ));
    }

    #[test]
    fn test_search_limit_bounds() {
        assert!(MinervaConfig::from_yaml("search_limit: 1000\n").is_ok());
        let err = MinervaConfig::from_yaml("search_limit: 1001\n").unwrap_err();
        assert!(matches!(
            err,
            MinervaError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "search_limit"
        ));
        let err = MinervaConfig::from_yaml("search_limit: -1\n").unwrap_err();
        assert!(matches!(err, MinervaError::Config(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn test_non_finite_default_importance_is_rejected() {
        let err = MinervaConfig::from_yaml("default_importance: .inf\n").unwrap_err();
        assert!(matches!(err, MinervaError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = MinervaConfig::resolve(Some("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, MinervaError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde(Path::new("a/b")), PathBuf::from("a/b"));
    }
}
