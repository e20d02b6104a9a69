use regex::Regex;
use std::sync::OnceLock;

fn thinking_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<think(?:ing)?>.*?</think(?:ing)?>").expect("valid thinking regex")
    })
}

fn blank_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+\n").expect("valid blank-line regex"))
}

/// Strip reasoning blocks some models emit and collapse runs of blank lines.
pub fn clean_answer(text: &str) -> String {
    let without_thoughts = thinking_block().replace_all(text, "");
    let collapsed = blank_run().replace_all(&without_thoughts, "\n\n");
    collapsed.trim().to_string()
}
