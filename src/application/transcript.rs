//! # Transcript
//!
//! Ordered record of a run. Optionally echoes each entry to stdout as it is
//! recorded (the verbose step view), and renders the whole run afterwards.

use crate::domain::types::{EntryKind, ToolCall, TranscriptEntry};
use crate::strings::messages;

/// Tool outputs longer than this are shortened in the live view.
const LIVE_OUTPUT_LIMIT: usize = 600;

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    echo: bool,
}

impl Transcript {
    pub fn new(echo: bool) -> Self {
        Self {
            entries: Vec::new(),
            echo,
        }
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        if self.echo
            && let Some(line) = format_live(&entry)
        {
            println!("{}", line);
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Every entry with something to show, one `[kind]: content` block each.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .filter_map(|entry| {
                let content = display_content(entry);
                (!content.is_empty())
                    .then(|| messages::transcript_line(entry.kind.as_str(), &content))
            })
            .collect()
    }
}

/// Full content of an entry, including the tool calls of an ai entry.
pub fn display_content(entry: &TranscriptEntry) -> String {
    let mut parts = Vec::new();
    if !entry.content.trim().is_empty() {
        parts.push(entry.content.trim().to_string());
    }
    parts.extend(entry.tool_calls.iter().map(describe_call));
    parts.join("\n")
}

fn describe_call(call: &ToolCall) -> String {
    format!("-> {}({})", call.name, call.arguments)
}

/// Verbose view of one entry; `None` for entries that are not echoed.
pub fn format_live(entry: &TranscriptEntry) -> Option<String> {
    match entry.kind {
        EntryKind::System => Some(entry.content.clone()),
        // The task header already shows what was asked.
        EntryKind::Human => None,
        EntryKind::Ai if entry.tool_calls.is_empty() => {
            Some(messages::final_answer(entry.content.trim()))
        }
        EntryKind::Ai => {
            let mut lines = Vec::new();
            if !entry.content.trim().is_empty() {
                lines.push(entry.content.trim().to_string());
            }
            lines.extend(entry.tool_calls.iter().map(|call| {
                messages::tool_call_line(&call.name, &call.arguments.to_string())
            }));
            Some(lines.join("\n"))
        }
        EntryKind::Tool => Some(messages::tool_result_line(
            entry.tool_name.as_deref().unwrap_or("tool"),
            &truncate(entry.content.trim(), LIVE_OUTPUT_LIMIT),
        )),
    }
}

/// Cut at a char boundary, preferring the last space before `limit`.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let cut_idx = text
        .char_indices()
        .nth(limit)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let safe_cut = text[..cut_idx].rfind(' ').unwrap_or(cut_idx);
    format!("{}...", &text[..safe_cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call() -> ToolCall {
        ToolCall::new("call_1", "ayni_identify", json!({"name": "LangChainExplorer"}))
    }

    #[test]
    fn test_render_skips_empty_entries() {
        let mut transcript = Transcript::new(false);
        transcript.push(TranscriptEntry::human("Join the agora"));
        transcript.push(TranscriptEntry::ai(""));
        transcript.push(TranscriptEntry::tool("ayni_agora", "3 messages"));
        transcript.push(TranscriptEntry::ai("Done."));

        assert_eq!(transcript.entries().len(), 4);
        assert_eq!(
            transcript.render(),
            "\n[human]: Join the agora\n[tool]: 3 messages\n[ai]: Done."
        );
    }

    #[test]
    fn test_ai_entry_shows_tool_calls() {
        let entry = TranscriptEntry::ai_with_calls("Registering.", vec![call()]);
        assert_eq!(
            display_content(&entry),
            r#"Registering.
-> ayni_identify({"name":"LangChainExplorer"})"#
        );

        let bare = TranscriptEntry::ai_with_calls("", vec![call()]);
        assert!(display_content(&bare).starts_with("-> ayni_identify"));
    }

    #[test]
    fn test_live_format() {
        assert!(format_live(&TranscriptEntry::human("prompt")).is_none());
        assert_eq!(
            format_live(&TranscriptEntry::ai("All done")).unwrap(),
            "## Final Answer:\nAll done"
        );

        let live = format_live(&TranscriptEntry::ai_with_calls("", vec![call()])).unwrap();
        assert!(live.starts_with("## Using tool: ayni_identify"));
        assert!(live.contains(r#"## Tool Input: {"name":"LangChainExplorer"}"#));

        let output = format_live(&TranscriptEntry::tool("ayni_agora", "3 messages")).unwrap();
        assert_eq!(output, "## Tool Output (ayni_agora):\n3 messages");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("one two three four", 9), "one two...");
        assert_eq!(truncate("ñññññ", 3), "ñññ...");
    }
}
