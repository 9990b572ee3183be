//! 终端输出格式
//!
//! 所有函数只生成字符串，打印由调用方负责。

use crate::memory::{Category, MemoryStats, Payload, Record};
use serde_json::Value;

const WIDTH: usize = 62;

pub fn banner() -> String {
    format!(
        "{line}\n  🧠 Minerva - Memory-Based Coding Assistant\n     Learning from every interaction\n{line}",
        line = "═".repeat(WIDTH)
    )
}

pub fn render_added(id: &str, category: Category) -> String {
    format!("✓ Memory stored: {id}\n💾 Saved to memory store ({category})")
}

pub fn render_not_found(id: &str) -> String {
    format!("未找到 ID 为「{id}」的记忆。")
}

/// 单行摘要：`[id前8位] category ★importance 👁 次数  内容`
pub fn render_record_line(record: &Record) -> String {
    format!(
        "[{}] {} ★{:.2} 👁 {}  {}",
        short_id(record.id()),
        record.category(),
        record.importance_score(),
        record.access_count(),
        summarize(&record.content),
    )
}

pub fn render_record_detail(record: &Record) -> String {
    let mut lines = vec![
        format!("🧠 {}", record.id()),
        format!("   category:    {}", record.category()),
        format!("   importance:  {}", record.importance_score()),
        format!("   accessed:    {} 次", record.access_count()),
        format!("   content:     {}", Value::Object(record.content.clone())),
    ];
    for (label, payload) in [
        ("context", &record.context),
        ("emotions", &record.emotions),
        ("sensory", &record.sensory_data),
        ("semantic", &record.semantic_info),
    ] {
        if !payload.is_empty() {
            lines.push(format!("   {label:<12} {}", Value::Object(payload.clone())));
        }
    }
    if !record.associations().is_empty() {
        lines.push(format!("   associations: {}", record.associations().join(", ")));
    }
    lines.join("\n")
}

/// `limit = 0` 表示全部展示
pub fn render_search(query: &str, results: &[Record], limit: usize, total: usize) -> String {
    if total == 0 {
        return "I don't have any memories yet! Add some with 'minerva add-memory'".to_string();
    }
    if results.is_empty() {
        return format!("🔍 未找到与「{query}」相关的记忆。");
    }
    let shown = if limit == 0 { results.len() } else { limit.min(results.len()) };
    let mut lines = vec![format!("🔍 找到 {} 条相关记忆：", results.len())];
    for (i, record) in results.iter().take(shown).enumerate() {
        lines.push(format!("{}. {}", i + 1, render_record_line(record)));
    }
    if shown < results.len() {
        lines.push(format!("   …其余 {} 条未展示", results.len() - shown));
    }
    lines.join("\n")
}

pub fn render_category(category: Category, records: &[Record]) -> String {
    if records.is_empty() {
        return format!("📂 {category}: 暂无记忆");
    }
    let mut lines = vec![format!("📂 {category}: {} 条", records.len())];
    lines.extend(records.iter().map(|r| format!("  - {}", render_record_line(r))));
    lines.join("\n")
}

pub fn render_stats(stats: &MemoryStats) -> String {
    let mut lines = vec![
        "🧠 Memory Statistics".to_string(),
        "─".repeat(WIDTH),
        format!("{:<28}{:>8}", "Total memories", stats.total_memories),
    ];
    for (category, count) in &stats.type_counts {
        lines.push(format!("{:<28}{:>8}", category.as_str(), count));
    }
    lines.push("─".repeat(WIDTH));
    match (&stats.most_accessed, &stats.most_recent) {
        (Some(accessed), Some(recent)) => {
            lines.push(format!("Most accessed: {}", render_record_line(accessed)));
            lines.push(format!("Most recent:   {}", render_record_line(recent)));
        }
        _ => lines.push("💡 Tip: Start by adding a memory with 'minerva add-memory'".to_string()),
    }
    lines.join("\n")
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// 优先展示 `description`，否则输出紧凑 JSON
fn summarize(content: &Payload) -> String {
    match content.get("description") {
        Some(Value::String(text)) => text.clone(),
        _ => Value::Object(content.clone()).to_string(),
    }
}
