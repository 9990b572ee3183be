//! 命令行界面
//!
//! 每个命令都作用于 `main` 显式构造并持有的 [`SharedMemoryStore`]；
//! 单次命令模式下存储只活一个进程，配合 `--seed` 导入已有记录使用，
//! 或进入 `shell` 在一个会话内连续操作。

pub mod display;
pub mod shell;

use crate::config::MinervaConfig;
use crate::error::{CommandError, Result, ValidationError};
use crate::memory::{Category, Payload, Record, SharedMemoryStore};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(
    name = "minerva",
    version,
    about = "Minerva - A memory-based coding assistant inspired by human memory mechanisms"
)]
pub struct Cli {
    /// YAML 配置文件路径
    #[arg(long, global = true, env = "MINERVA_CONFIG")]
    pub config: Option<String>,

    /// 启动时导入的记录文件（JSON 数组），覆盖配置中的 seed_file
    #[arg(long, global = true, env = "MINERVA_SEED")]
    pub seed: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum Command {
    /// Add a new memory to the system
    #[command(name = "add-memory", visible_alias = "add")]
    AddMemory(AddArgs),
    /// Ask a question and retrieve relevant memories
    Ask {
        /// 查询文本（不区分大小写的子串匹配）
        query: String,
    },
    /// Show a single memory by id
    Get { id: String },
    /// List all memories of one category
    List {
        #[arg(value_parser = parse_category)]
        category: Category,
    },
    /// Link one memory to another
    Associate { from: String, to: String },
    /// Show memory statistics and system status
    Stats {
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// Print every memory in its serialized form
    Export,
    /// Start an interactive session
    Shell,
}

#[derive(Debug, Args, Clone, PartialEq)]
pub struct AddArgs {
    /// 记忆内容（自由文本）
    pub content: String,

    #[arg(long, short = 'c', value_parser = parse_category)]
    pub category: Option<Category>,

    #[arg(long, short = 'i', allow_negative_numbers = true, value_parser = parse_importance)]
    pub importance: Option<f64>,

    /// 语义标签，可重复
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,

    /// 情境信息 `key=value`，value 可以是 JSON
    #[arg(long = "context", value_parser = parse_key_value)]
    pub context: Vec<(String, Value)>,

    /// 关联到已有记忆的 id，可重复
    #[arg(long = "associate")]
    pub associations: Vec<String>,
}

impl AddArgs {
    /// 把自由文本输入组装成一条记录
    pub fn into_record(self, config: &MinervaConfig) -> std::result::Result<Record, ValidationError> {
        let mut content = Payload::new();
        content.insert("description".to_string(), Value::String(self.content));

        let mut semantic_info = Payload::new();
        if !self.tags.is_empty() {
            semantic_info.insert(
                "keywords".to_string(),
                Value::Array(self.tags.into_iter().map(Value::String).collect()),
            );
        }

        Ok(
            Record::new(self.category.unwrap_or(config.default_category), content)
                .with_importance(self.importance.unwrap_or(config.default_importance))?
                .with_context(self.context.into_iter().collect())
                .with_semantic_info(semantic_info)
                .with_associations(self.associations),
        )
    }
}

fn parse_category(raw: &str) -> std::result::Result<Category, ValidationError> {
    raw.parse()
}

fn parse_importance(raw: &str) -> std::result::Result<f64, ValidationError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| ValidationError::Malformed(format!("'{raw}' is not a number")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite("importance_score"))
    }
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, Value), CommandError> {
    let (key, value) = raw
        .split_once('=')
        .filter(|(k, _)| !k.trim().is_empty())
        .ok_or_else(|| CommandError::InvalidArgument {
            name: "context".to_string(),
            message: format!("expected key=value, got '{raw}'"),
        })?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}

/// 从 JSON 文件导入记录，返回导入条数
pub async fn load_seed(store: &SharedMemoryStore, path: &Path) -> Result<usize> {
    let raw = std::fs::read_to_string(path)?;
    let values: Vec<Value> =
        serde_json::from_str(&raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    let count = values.len();
    for value in values {
        let record = Record::from_value(value)?;
        store.insert(record).await?;
    }
    info!(path = %path.display(), records = count, "📥 已导入记忆");
    Ok(count)
}

/// 执行一条命令并返回要展示给用户的文本
///
/// `Shell` 只能由入口处理，这里视为无效命令。
pub async fn execute(
    store: &SharedMemoryStore,
    config: &MinervaConfig,
    command: Command,
) -> Result<String> {
    match command {
        Command::AddMemory(args) => {
            let record = args.into_record(config)?;
            let category = record.category();
            let id = store.insert(record).await?;
            debug!(id = %id, category = %category, "💾 记忆已写入");
            Ok(display::render_added(&id, category))
        }
        Command::Ask { query } => {
            let results = store.search(&query).await;
            debug!(query = %query, hits = results.len(), "🔍 检索记忆");
            Ok(display::render_search(
                &query,
                &results,
                config.search_limit,
                store.len().await,
            ))
        }
        Command::Get { id } => Ok(match store.get(&id).await {
            Some(record) => display::render_record_detail(&record),
            None => display::render_not_found(&id),
        }),
        Command::List { category } => {
            let records = store.get_by_category(category).await;
            Ok(display::render_category(category, &records))
        }
        Command::Associate { from, to } => {
            if store.associate(&from, &to).await {
                debug!(from = %from, to = %to, "🔗 已建立关联");
                Ok(format!("🔗 {} → {}", from, to))
            } else {
                Ok(display::render_not_found(&from))
            }
        }
        Command::Stats { json: false } => Ok(display::render_stats(&store.stats().await)),
        Command::Stats { json: true } => Ok(serde_json::to_string_pretty(&store.stats().await)?),
        Command::Export => Ok(serde_json::to_string_pretty(&Value::Array(
            store.export().await,
        ))?),
        Command::Shell => Err(CommandError::UnknownCommand("shell".to_string()).into()),
    }
}

/// 入口：解析配置、导入种子数据，然后执行命令或进入交互模式
pub async fn run(cli: Cli) -> Result<()> {
    let config = MinervaConfig::resolve(cli.config.as_deref())?;
    let store = SharedMemoryStore::default();

    let seed = cli
        .seed
        .map(|p| crate::config::expand_tilde(Path::new(&p)))
        .or_else(|| config.seed_path());
    if let Some(path) = seed {
        load_seed(&store, &path).await?;
    }

    match cli.command {
        Command::Shell => shell::run(&store, &config).await,
        command => {
            println!("{}", display::banner());
            println!("{}", execute(&store, &config, command).await?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MinervaError;
    use serde_json::json;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("minerva").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_parse_add_memory() {
        let command = parse(&[
            "add-memory",
            "prefers tabs",
            "--category",
            "coding_style_preference",
            "-i",
            "0.8",
            "-t",
            "style",
            "--context",
            "repo=minerva",
            "--context",
            "lines=120",
        ]);
        let Command::AddMemory(args) = command else {
            panic!("应解析为 add-memory");
        };
        assert_eq!(args.category, Some(Category::CodingStyle));
        assert_eq!(args.importance, Some(0.8));
        assert_eq!(args.tags, vec!["style".to_string()]);
        assert_eq!(
            args.context,
            vec![
                ("repo".to_string(), json!("minerva")),
                ("lines".to_string(), json!(120)),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let result = Cli::try_parse_from(["minerva", "list", "dreams"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_non_finite_importance() {
        for bad in ["inf", "-inf", "NaN", "lots"] {
            let result = Cli::try_parse_from(["minerva", "add", "x", "-i", bad]);
            assert!(result.is_err(), "{bad} 不应被接受");
        }
        assert_eq!(parse_importance("-2.5"), Ok(-2.5));
        assert_eq!(
            parse_importance("inf"),
            Err(ValidationError::NonFinite("importance_score"))
        );
    }

    #[tokio::test]
    async fn test_stats_json() -> Result<()> {
        let store = SharedMemoryStore::default();
        let config = MinervaConfig::default();
        execute(&store, &config, parse(&["add", "hello", "-c", "conversation"])).await?;

        let output = execute(&store, &config, parse(&["stats", "--json"])).await?;
        let value: Value = serde_json::from_str(&output)?;
        assert_eq!(value["total_memories"], 1);
        assert_eq!(value["type_counts"]["conversation"], 1);
        assert_eq!(value["type_counts"]["basic_info"], 0);
        assert_eq!(value["most_recent"]["content"]["description"], "hello");
        assert_eq!(value["most_accessed"]["access_count"], 0);
        Ok(())
    }

    #[test]
    fn test_parse_key_value_requires_key() {
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("novalue").is_err());
    }

    #[test]
    fn test_into_record_uses_config_defaults() {
        let config = MinervaConfig {
            default_category: Category::Conversation,
            default_importance: 0.3,
            ..MinervaConfig::default()
        };
        let Command::AddMemory(args) = parse(&["add", "hello", "--associate", "x"]) else {
            panic!("应解析为 add-memory");
        };

        let record = args.into_record(&config).unwrap();
        assert_eq!(record.category(), Category::Conversation);
        assert_eq!(record.importance_score(), 0.3);
        assert_eq!(record.content["description"], "hello");
        assert!(record.semantic_info.is_empty());
        assert_eq!(record.associations(), ["x".to_string()]);
    }

    #[tokio::test]
    async fn test_add_then_ask() -> Result<()> {
        let store = SharedMemoryStore::default();
        let config = MinervaConfig::default();

        execute(&store, &config, parse(&["add", "python flask application"])).await?;
        execute(&store, &config, parse(&["add", "javascript react component"])).await?;
        execute(&store, &config, parse(&["add", "unit tests", "-t", "python"])).await?;

        let output = execute(&store, &config, parse(&["ask", "Python"])).await?;
        assert!(output.contains("python flask application"));
        assert!(output.contains("unit tests"));
        assert!(!output.contains("react"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_is_not_an_error() -> Result<()> {
        let store = SharedMemoryStore::default();
        let output = execute(
            &store,
            &MinervaConfig::default(),
            parse(&["get", "nope"]),
        )
        .await?;
        assert!(output.contains("nope"));
        Ok(())
    }

    #[tokio::test]
    async fn test_shell_is_not_executable_here() {
        let store = SharedMemoryStore::default();
        let err = execute(&store, &MinervaConfig::default(), Command::Shell)
            .await
            .unwrap_err();
        assert!(matches!(err, MinervaError::Command(_)));
    }

    #[tokio::test]
    async fn test_export_round_trips_through_seed() -> Result<()> {
        let store = SharedMemoryStore::default();
        let config = MinervaConfig::default();
        execute(&store, &config, parse(&["add", "remember me", "-t", "seed"])).await?;
        let exported = execute(&store, &config, Command::Export).await?;

        let path = std::env::temp_dir().join(format!("minerva-seed-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, &exported)?;

        let restored = SharedMemoryStore::default();
        let count = load_seed(&restored, &path).await;
        std::fs::remove_file(&path)?;

        assert_eq!(count?, 1);
        assert_eq!(restored.export().await, store.export().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_rejects_duplicates() -> Result<()> {
        let record = json!({"id": "dup", "created_at": 1.0});
        let path = std::env::temp_dir().join(format!("minerva-dup-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, json!([record, record]).to_string())?;

        let store = SharedMemoryStore::default();
        let result = load_seed(&store, &path).await;
        std::fs::remove_file(&path)?;

        assert!(matches!(result, Err(MinervaError::Store(_))));
        Ok(())
    }
}
