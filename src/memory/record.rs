//! 记忆记录（Record）
//!
//! 一条记忆由不可变的身份（`id` / `created_at`）和可变的访问统计组成，
//! 其余字段是开放结构的 JSON 映射，核心层不解释其内容。
//!
//! ## 结构化形式
//!
//! [`Record::to_value`] / [`Record::from_value`] 是持久化与交换的契约：
//!
//! ```json
//! {
//!   "id": "…", "created_at": 1718000000.25, "category": "error_experience",
//!   "content": {}, "context": {}, "emotions": {}, "importance_score": 0.0,
//!   "sensory_data": {}, "semantic_info": {}, "associations": [],
//!   "access_count": 0, "last_accessed": 1718000000.25
//! }
//! ```

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// 开放结构的键值载荷
pub type Payload = Map<String, Value>;

// ── Category ─────────────────────────────────────────────────────────────────

/// 记忆分类（封闭枚举）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    BasicInfo,
    CodebaseAnalysis,
    ErrorExperience,
    #[serde(rename = "coding_style_preference")]
    CodingStyle,
    Conversation,
}

impl Category {
    /// 全部分类，顺序即索引遍历顺序
    pub const ALL: [Category; 5] = [
        Category::BasicInfo,
        Category::CodebaseAnalysis,
        Category::ErrorExperience,
        Category::CodingStyle,
        Category::Conversation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BasicInfo => "basic_info",
            Category::CodebaseAnalysis => "codebase_analysis",
            Category::ErrorExperience => "error_experience",
            Category::CodingStyle => "coding_style_preference",
            Category::Conversation => "conversation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 按取值查找，未命中返回 [`ValidationError::UnknownCategory`]
impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

// ── Record ───────────────────────────────────────────────────────────────────

/// 一条记忆
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    id: String,
    /// 创建时间（Unix 秒，带小数）
    created_at: f64,
    category: Category,
    /// 主要载荷
    pub content: Payload,
    /// 情境元数据
    pub context: Payload,
    /// 情绪 / 显著性元数据，核心层不解释
    pub emotions: Payload,
    /// 重要程度，搜索排序的第一关键字；不设上下界，但必须是有限数
    importance_score: f64,
    /// 原始感知数据
    pub sensory_data: Payload,
    /// 派生的语义标签
    pub semantic_info: Payload,
    associations: Vec<String>,
    access_count: u64,
    last_accessed: f64,
}

impl Record {
    /// 创建新记录：生成 UUID v4，`last_accessed = created_at`，`access_count = 0`
    pub fn new(category: Category, content: Payload) -> Self {
        let now = now_secs();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            category,
            content,
            context: Payload::new(),
            emotions: Payload::new(),
            importance_score: 0.0,
            sensory_data: Payload::new(),
            semantic_info: Payload::new(),
            associations: Vec::new(),
            access_count: 0,
            last_accessed: now,
        }
    }

    pub fn with_context(mut self, context: Payload) -> Self {
        self.context = context;
        self
    }

    pub fn with_emotions(mut self, emotions: Payload) -> Self {
        self.emotions = emotions;
        self
    }

    /// 非有限值（NaN / ±inf）无法进入结构化形式，直接拒绝
    pub fn with_importance(mut self, importance_score: f64) -> Result<Self, ValidationError> {
        self.set_importance(importance_score)?;
        Ok(self)
    }

    pub fn set_importance(&mut self, importance_score: f64) -> Result<(), ValidationError> {
        self.importance_score = check_importance(importance_score)?;
        Ok(())
    }

    pub fn with_sensory_data(mut self, sensory_data: Payload) -> Self {
        self.sensory_data = sensory_data;
        self
    }

    pub fn with_semantic_info(mut self, semantic_info: Payload) -> Self {
        self.semantic_info = semantic_info;
        self
    }

    /// 设置关联列表，重复 id 只保留第一次出现
    pub fn with_associations<I, S>(mut self, associations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associations.clear();
        for id in associations {
            self.add_association(id);
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn importance_score(&self) -> f64 {
        self.importance_score
    }

    pub fn associations(&self) -> &[String] {
        &self.associations
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn last_accessed(&self) -> f64 {
        self.last_accessed
    }

    /// 记录一次访问
    ///
    /// 时钟回拨时 `last_accessed` 保持不变，保证单调不减。
    pub fn record_access(&mut self) {
        self.access_count += 1;
        self.last_accessed = self.last_accessed.max(now_secs());
    }

    /// 添加关联（幂等），返回是否真的新增
    pub fn add_association(&mut self, other_id: impl Into<String>) -> bool {
        let other_id = other_id.into();
        if self.associations.contains(&other_id) {
            return false;
        }
        self.associations.push(other_id);
        true
    }

    /// 序列化为扁平的结构化形式，`category` 输出为字符串取值
    pub fn to_value(&self) -> Value {
        // 浮点字段均为有限数，所有字段都能无损表示为 JSON
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// 从结构化形式还原
    ///
    /// `id` 与 `created_at` 必须存在；其余字段缺省时取默认值，
    /// 缺少 `last_accessed` 时取 `created_at`。
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        let repr: RecordRepr = serde_json::from_value(value)?;
        repr.try_into()
    }

    pub fn from_json(raw: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }
}

/// 反序列化中间形态，兼容旧字段名 `timestamp` / `memory_type`
#[derive(Deserialize)]
struct RecordRepr {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "timestamp")]
    created_at: Option<f64>,
    #[serde(default, alias = "memory_type")]
    category: Option<String>,
    #[serde(default)]
    content: Payload,
    #[serde(default)]
    context: Payload,
    #[serde(default)]
    emotions: Payload,
    #[serde(default)]
    importance_score: f64,
    #[serde(default)]
    sensory_data: Payload,
    #[serde(default)]
    semantic_info: Payload,
    #[serde(default)]
    associations: Vec<String>,
    #[serde(default)]
    access_count: u64,
    #[serde(default)]
    last_accessed: Option<f64>,
}

impl TryFrom<RecordRepr> for Record {
    type Error = ValidationError;

    fn try_from(repr: RecordRepr) -> Result<Self, Self::Error> {
        let id = repr.id.ok_or(ValidationError::MissingField("id"))?;
        let created_at = repr
            .created_at
            .ok_or(ValidationError::MissingField("created_at"))?;
        let category = match repr.category.as_deref() {
            Some(raw) => raw.parse()?,
            None => Category::default(),
        };
        let record = Record {
            id,
            created_at,
            category,
            content: repr.content,
            context: repr.context,
            emotions: repr.emotions,
            importance_score: check_importance(repr.importance_score)?,
            sensory_data: repr.sensory_data,
            semantic_info: repr.semantic_info,
            associations: Vec::new(),
            access_count: repr.access_count,
            last_accessed: repr.last_accessed.unwrap_or(created_at),
        };
        Ok(record.with_associations(repr.associations))
    }
}

fn check_importance(value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite("importance_score"))
    }
}

pub(crate) fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
