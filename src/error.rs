use std::fmt;

/// Minerva 的统一错误类型
///
/// 注意：按 id 查询不到记录不是错误，而是 `Option::None`。
#[derive(Debug)]
pub enum MinervaError {
    /// 结构化输入校验失败（反序列化）
    Validation(ValidationError),
    /// 存储操作冲突
    Store(StoreError),
    /// 配置错误
    Config(ConfigError),
    /// 命令行 / 交互式命令错误
    Command(CommandError),
    /// IO 错误
    Io(std::io::Error),
    /// 其他错误
    Other(String),
}

/// 记录反序列化时的校验错误
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// 未知的分类值
    UnknownCategory(String),
    /// 缺少必需字段（`id` / `created_at`）
    MissingField(&'static str),
    /// 数值字段必须是有限数
    NonFinite(&'static str),
    /// 结构不合法（类型错误、负数计数等）
    Malformed(String),
}

/// 存储错误
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// 插入了已存在的 id
    Conflict(String),
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),
    /// 配置解析失败
    ParseFailed(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
}

/// 命令解析错误
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// 未知命令
    UnknownCommand(String),
    /// 参数缺失或格式错误
    InvalidArgument { name: String, message: String },
}

// 实现 Display trait
impl fmt::Display for MinervaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinervaError::Validation(e) => write!(f, "Validation Error: {}", e),
            MinervaError::Store(e) => write!(f, "Store Error: {}", e),
            MinervaError::Config(e) => write!(f, "Config Error: {}", e),
            MinervaError::Command(e) => write!(f, "Command Error: {}", e),
            MinervaError::Io(e) => write!(f, "IO Error: {}", e),
            MinervaError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownCategory(value) => {
                write!(f, "Unknown category: '{}'", value)
            }
            ValidationError::MissingField(field) => write!(f, "Missing field: {}", field),
            ValidationError::NonFinite(field) => {
                write!(f, "Field '{}' must be a finite number", field)
            }
            ValidationError::Malformed(msg) => write!(f, "Malformed record: {}", msg),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(id) => write!(f, "Record '{}' already exists", id),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(name) => write!(f, "Unknown command: {}", name),
            CommandError::InvalidArgument { name, message } => {
                write!(f, "Invalid argument '{}': {}", name, message)
            }
        }
    }
}

// 实现 std::error::Error trait
impl std::error::Error for MinervaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MinervaError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ValidationError {}
impl std::error::Error for StoreError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CommandError {}

// From 转换实现
impl From<std::io::Error> for MinervaError {
    fn from(err: std::io::Error) -> Self {
        MinervaError::Io(err)
    }
}

impl From<serde_json::Error> for MinervaError {
    fn from(err: serde_json::Error) -> Self {
        MinervaError::Validation(ValidationError::from(err))
    }
}

impl From<serde_yaml::Error> for MinervaError {
    fn from(err: serde_yaml::Error) -> Self {
        MinervaError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<rustyline::error::ReadlineError> for MinervaError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        match err {
            rustyline::error::ReadlineError::Io(e) => MinervaError::Io(e),
            other => MinervaError::Other(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}

impl From<ValidationError> for MinervaError {
    fn from(err: ValidationError) -> Self {
        MinervaError::Validation(err)
    }
}

impl From<StoreError> for MinervaError {
    fn from(err: StoreError) -> Self {
        MinervaError::Store(err)
    }
}

impl From<ConfigError> for MinervaError {
    fn from(err: ConfigError) -> Self {
        MinervaError::Config(err)
    }
}

impl From<CommandError> for MinervaError {
    fn from(err: CommandError) -> Self {
        MinervaError::Command(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, MinervaError>;
