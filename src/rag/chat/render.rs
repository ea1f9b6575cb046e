//! 会话文本渲染
//!
//! 截断长度等属于展示策略，不影响数据本身。

use crate::rag::chat::models::{ConversationTurn, Role, SessionSnapshot};
use std::fmt::Write;

/// 请求在途时展示的占位消息
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

/// 相似度转百分比，保留一位小数
pub fn format_similarity(similarity: f64) -> String {
    format!("{:.1}%", similarity * 100.0)
}

/// 按字符截断引用片段，截断时追加省略号
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn role_label(turn: &ConversationTurn) -> &'static str {
    match (turn.role, turn.error) {
        (Role::User, _) => "You",
        (Role::Assistant, false) => "Assistant",
        (Role::Assistant, true) => "Assistant ⚠",
    }
}

/// 渲染单条消息（含引用来源）
pub fn render_turn(turn: &ConversationTurn, excerpt_chars: usize) -> String {
    let mut out = format!("{}: {}", role_label(turn), turn.content);
    if !turn.sources.is_empty() {
        let _ = write!(out, "\n  📚 Sources ({})", turn.sources.len());
        for source in &turn.sources {
            let _ = write!(
                out,
                "\n    - {} ({} relevant)\n      {}",
                source.title,
                format_similarity(source.similarity),
                truncate_excerpt(&source.excerpt, excerpt_chars)
            );
        }
    }
    out
}

/// 渲染整个会话；会话为空时展示建议问题，在途时追加占位消息
pub fn render_transcript(
    snapshot: &SessionSnapshot,
    excerpt_chars: usize,
    suggestions: &[String],
) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if snapshot.turns.is_empty() && !snapshot.busy {
        let mut welcome = String::from("👋 Ask me anything about the documents in the knowledge base.");
        if !suggestions.is_empty() {
            welcome.push_str("\nTry asking:");
            for q in suggestions {
                let _ = write!(welcome, "\n  • {}", q);
            }
        }
        blocks.push(welcome);
    }

    blocks.extend(
        snapshot
            .turns
            .iter()
            .map(|turn| render_turn(turn, excerpt_chars)),
    );

    if snapshot.busy {
        blocks.push(format!("Assistant: {}", THINKING_PLACEHOLDER));
    }

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::chat::models::SourceCitation;

    #[test]
    fn similarity_percentage() {
        assert_eq!(format_similarity(0.8734), "87.3%");
        assert_eq!(format_similarity(1.0), "100.0%");
        assert_eq!(format_similarity(0.0), "0.0%");
    }

    #[test]
    fn excerpt_truncation_is_char_safe() {
        assert_eq!(truncate_excerpt("short", 150), "short");
        assert_eq!(truncate_excerpt("abcdef", 3), "abc...");
        assert_eq!(truncate_excerpt("héllo wörld", 7), "héllo w...");
        assert_eq!(truncate_excerpt("简历内容很长", 2), "简历...");
        assert_eq!(truncate_excerpt("exact", 5), "exact");
    }

    #[test]
    fn transcript_with_placeholder_and_sources() {
        let snapshot = SessionSnapshot {
            thread_id: Some("abc".into()),
            turns: vec![
                ConversationTurn::user("What skills?"),
                ConversationTurn::assistant(
                    "Rust and Python.",
                    vec![SourceCitation {
                        title: "Resume".into(),
                        similarity: 0.912,
                        excerpt: "x".repeat(200),
                    }],
                ),
                ConversationTurn::user("And patents?"),
            ],
            busy: true,
        };

        let text = render_transcript(&snapshot, 150, &[]);
        assert!(text.starts_with("You: What skills?"));
        assert!(text.contains("📚 Sources (1)"));
        assert!(text.contains("Resume (91.2% relevant)"));
        assert!(text.contains(&format!("{}...", "x".repeat(150))));
        assert!(!text.contains(&"x".repeat(151)));
        assert!(text.ends_with("Assistant: Thinking..."));
    }

    #[test]
    fn empty_transcript_shows_suggestions() {
        let text = render_transcript(
            &SessionSnapshot::default(),
            150,
            &["What projects?".to_string()],
        );
        assert!(text.contains("Try asking:"));
        assert!(text.contains("• What projects?"));
        assert!(!text.contains(THINKING_PLACEHOLDER));
    }

    #[test]
    fn error_turn_label() {
        let turn = ConversationTurn::assistant_error("Sorry");
        assert_eq!(render_turn(&turn, 150), "Assistant ⚠: Sorry");
    }
}
