//! 交互模式
//!
//! 存储在整个会话内存活，每行输入按与命令行相同的子命令解析：
//!
//! ```text
//! minerva> add "prefers 4-space indent" -c coding_style_preference -t style
//! minerva> ask indent
//! minerva> stats
//! minerva> exit
//! ```

use super::{Command, display, execute};
use crate::config::MinervaConfig;
use crate::error::{CommandError, Result};
use crate::memory::SharedMemoryStore;
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

const PROMPT: &str = "minerva> ";

#[derive(Debug, Parser)]
#[command(name = "minerva", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// 单行输入的解析结果
#[derive(Debug, PartialEq)]
enum Input {
    Empty,
    Exit,
    Run(Command),
    /// clap 生成的帮助或错误文本
    Message(String),
}

pub async fn run(store: &SharedMemoryStore, config: &MinervaConfig) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let history = config.history_path();
    if let Some(path) = &history
        && editor.load_history(path).is_err()
    {
        debug!(path = %path.display(), "历史记录不存在，从空历史开始");
    }

    println!("{}", display::banner());
    println!("输入 help 查看命令，exit 退出\n");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }

        match parse_input(&line) {
            Input::Empty => {}
            Input::Exit => break,
            Input::Message(text) => println!("{text}"),
            Input::Run(Command::Shell) => println!("已经在交互模式中"),
            Input::Run(command) => match execute(store, config, command).await {
                Ok(output) => println!("{output}\n"),
                Err(e) => println!("⚠️  {e}\n"),
            },
        }
    }

    if let Some(path) = &history {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = editor.save_history(path) {
            warn!(path = %path.display(), "保存历史记录失败: {e}");
        }
    }
    println!("👋 Bye");
    Ok(())
}

fn parse_input(line: &str) -> Input {
    let words = match split_words(line) {
        Ok(words) => words,
        Err(e) => return Input::Message(format!("⚠️  {e}")),
    };
    match words.first().map(String::as_str) {
        None => Input::Empty,
        Some("exit") | Some("quit") => Input::Exit,
        Some(_) => match ShellLine::try_parse_from(words) {
            Ok(parsed) => Input::Run(parsed.command),
            Err(e) => Input::Message(e.to_string()),
        },
    }
}

/// 按空白切分，支持单/双引号和反斜杠转义
fn split_words(line: &str) -> std::result::Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (_, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CommandError::InvalidArgument {
            name: "input".to_string(),
            message: "unterminated quote".to_string(),
        });
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Category;

    #[test]
    fn test_split_words_handles_quotes() {
        assert_eq!(
            split_words(r#"add "python flask app" -t 'web dev' a\ b"#).unwrap(),
            vec!["add", "python flask app", "-t", "web dev", "a b"]
        );
        assert_eq!(split_words(r#"ask """#).unwrap(), vec!["ask", ""]);
        assert!(split_words("ask \"open").is_err());
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input("quit"), Input::Exit);
        assert_eq!(
            parse_input("stats"),
            Input::Run(Command::Stats { json: false })
        );
        assert_eq!(
            parse_input("stats --json"),
            Input::Run(Command::Stats { json: true })
        );
        assert_eq!(
            parse_input("list conversation"),
            Input::Run(Command::List {
                category: Category::Conversation
            })
        );
        assert!(matches!(parse_input("fly away"), Input::Message(_)));
        assert!(matches!(parse_input("help"), Input::Message(_)));
    }
}
