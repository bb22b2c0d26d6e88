//! Condensed "context brief" of a conversation, meant to be pasted into a
//! fresh session as background.
//!
//! Sections, in order, each left out when it would be empty:
//! header, original request, referenced attachments, per-turn digest,
//! code produced by the assistant, and the final assistant response.

use std::collections::BTreeSet;

use crate::fence::{CodeBlock, extract_code_blocks};
use crate::model::{Conversation, SenderRole};
use crate::timestamp::display_timestamp;

pub const TRUNCATION_MARKER: &str = "\n\n*[...truncated]*";

const UNTITLED_BRIEF: &str = "Untitled";
const REQUEST_LIMIT: usize = 2_000;
const TURN_LIMIT: usize = 800;
const SNIPPET_LIMIT: usize = 3_000;
const OUTCOME_LIMIT: usize = 2_000;
const MAX_SNIPPETS: usize = 10;

/// Keeps the first `limit` characters and appends [`TRUNCATION_MARKER`]
/// when `text` is longer than that; otherwise returns it unchanged.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn render_context_brief(conversation: &Conversation) -> String {
    let mut lines = Vec::new();

    push_header(&mut lines, conversation);
    push_original_request(&mut lines, conversation);
    push_attachments(&mut lines, conversation);
    push_discussion(&mut lines, conversation);
    push_code(&mut lines, &assistant_code_blocks(conversation));
    push_outcome(&mut lines, conversation);

    lines.join("\n")
}

fn push_header(lines: &mut Vec<String>, conversation: &Conversation) {
    let title = if conversation.name.is_empty() {
        UNTITLED_BRIEF
    } else {
        conversation.name.as_str()
    };

    lines.push(format!("# Context Brief: {title}"));
    lines.push(String::new());
    lines.push(format!(
        "*Exported from Claude conversation on {}*",
        display_timestamp(&conversation.created_at)
    ));
    lines.push(format!(
        "*{} messages in original conversation*",
        conversation.message_count()
    ));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());
}

fn push_section(lines: &mut Vec<String>, heading: &str, body: String) {
    lines.push(format!("## {heading}"));
    lines.push(String::new());
    lines.push(body);
    lines.push(String::new());
}

fn push_original_request(lines: &mut Vec<String>, conversation: &Conversation) {
    let Some(first_human) = conversation.chat_messages.iter().find(|m| m.is_human()) else {
        return;
    };

    let text = first_human.joined_text();
    if text.trim().is_empty() {
        return;
    }

    push_section(lines, "Original Request", truncate(&text, REQUEST_LIMIT));
}

fn push_attachments(lines: &mut Vec<String>, conversation: &Conversation) {
    let names: BTreeSet<&str> = conversation
        .chat_messages
        .iter()
        .flat_map(|message| &message.attachments)
        .map(|attachment| attachment.file_name.as_str())
        .collect();

    if names.is_empty() {
        return;
    }

    lines.push("## Files/Attachments Referenced".to_string());
    lines.push(String::new());
    lines.extend(names.into_iter().map(|name| format!("- {name}")));
    lines.push(String::new());
}

fn push_discussion(lines: &mut Vec<String>, conversation: &Conversation) {
    let turns: Vec<_> = conversation
        .chat_messages
        .iter()
        .map(|message| (message, message.joined_text()))
        .filter(|(_, text)| !text.trim().is_empty())
        .collect();

    if turns.is_empty() {
        return;
    }

    lines.push("## Key Discussion Points".to_string());
    lines.push(String::new());

    for (turn, (message, text)) in turns.iter().enumerate() {
        lines.push(format!(
            "**{} (turn {}):**",
            turn_label(&message.sender),
            turn + 1
        ));
        lines.push(truncate(text, TURN_LIMIT));
        lines.push(String::new());
    }
}

/// Briefs name the assistant after the model it was talking to.
fn turn_label(sender: &SenderRole) -> &str {
    match sender {
        SenderRole::Assistant => "Claude",
        other => other.label(),
    }
}

fn assistant_code_blocks(conversation: &Conversation) -> Vec<CodeBlock> {
    conversation
        .chat_messages
        .iter()
        .filter(|message| message.is_assistant())
        .flat_map(|message| message.text_items())
        .flat_map(extract_code_blocks)
        .collect()
}

fn push_code(lines: &mut Vec<String>, blocks: &[CodeBlock]) {
    if blocks.is_empty() {
        return;
    }

    lines.push("## Code Produced".to_string());
    lines.push(String::new());

    for (idx, block) in blocks.iter().take(MAX_SNIPPETS).enumerate() {
        if block.language.is_empty() {
            lines.push(format!("### Snippet {}", idx + 1));
        } else {
            lines.push(format!("### Snippet {} ({})", idx + 1, block.language));
        }
        lines.push(String::new());
        lines.push(format!("```{}", block.language));
        lines.push(truncate(&block.body, SNIPPET_LIMIT));
        lines.push("```".to_string());
        lines.push(String::new());
    }

    if blocks.len() > MAX_SNIPPETS {
        lines.push(format!(
            "*({} additional code blocks omitted)*",
            blocks.len() - MAX_SNIPPETS
        ));
        lines.push(String::new());
    }
}

fn push_outcome(lines: &mut Vec<String>, conversation: &Conversation) {
    let Some(last_assistant) = conversation
        .chat_messages
        .iter()
        .rev()
        .find(|m| m.is_assistant())
    else {
        return;
    };

    let text = last_assistant.joined_text();
    if text.trim().is_empty() {
        return;
    }

    push_section(lines, "Final Response / Outcome", truncate(&text, OUTCOME_LIMIT));
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::brief::{TRUNCATION_MARKER, render_context_brief, truncate};
    use crate::model::Conversation;

    fn message(uuid: &str, sender: &str, texts: &[&str]) -> serde_json::Value {
        let content: Vec<_> = texts
            .iter()
            .map(|text| json!({"type": "text", "text": text}))
            .collect();
        json!({"uuid": uuid, "sender": sender, "content": content})
    }

    fn conversation(messages: Vec<serde_json::Value>) -> Conversation {
        serde_json::from_value(json!({
            "uuid": "c1",
            "name": "Brief test",
            "created_at": "2024-01-15T10:30:00Z",
            "chat_messages": messages,
        }))
        .expect("decode conversation")
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn truncate_cuts_on_characters() {
        assert_eq!(truncate("hello world", 5), format!("hello{TRUNCATION_MARKER}"));
        assert_eq!(truncate("ééééé", 2), format!("éé{TRUNCATION_MARKER}"));
    }

    #[test]
    fn full_brief_shape() {
        let mut first = message("m1", "human", &["Build a parser", "for CSV"]);
        first["attachments"] = json!([{"file_name": "z.csv"}, {"file_name": "a.txt"}]);
        let mut third = message("m3", "human", &["thanks"]);
        third["attachments"] = json!([{"file_name": "a.txt"}]);

        let conversation = conversation(vec![
            first,
            message("m2", "assistant", &["Here:\n```rust\nfn parse() {}\n```"]),
            third,
            message("m4", "assistant", &["You're welcome."]),
        ]);

        let expected = "\
# Context Brief: Brief test

*Exported from Claude conversation on Jan 15, 2024 at 10:30 AM*
*4 messages in original conversation*

---

## Original Request

Build a parser

for CSV

## Files/Attachments Referenced

- a.txt
- z.csv

## Key Discussion Points

**Human (turn 1):**
Build a parser

for CSV

**Claude (turn 2):**
Here:
```rust
fn parse() {}
```

**Human (turn 3):**
thanks

**Claude (turn 4):**
You're welcome.

## Code Produced

### Snippet 1 (rust)

```rust
fn parse() {}
```

## Final Response / Outcome

You're welcome.
";

        assert_eq!(render_context_brief(&conversation), expected);
    }

    #[test]
    fn turns_skip_messages_without_text() {
        let conversation = conversation(vec![
            message("m1", "human", &["hi"]),
            message("m2", "assistant", &[""]),
            message("m3", "human", &["bye"]),
        ]);
        let brief = render_context_brief(&conversation);

        assert!(brief.contains("**Human (turn 1):**\nhi"));
        assert!(brief.contains("**Human (turn 2):**\nbye"));
        assert!(!brief.contains("turn 3"));
        assert!(!brief.contains("## Final Response / Outcome"));
    }

    #[test]
    fn code_is_capped_at_ten_snippets() {
        let text: String = (1..=12)
            .map(|n| format!("```\nblock {n}\n```\n"))
            .collect();
        let conversation = conversation(vec![message("m1", "assistant", &[text.as_str()])]);
        let brief = render_context_brief(&conversation);

        let (_, code) = brief.split_once("## Code Produced").expect("code section");
        let (code, _) = code.split_once("## Final Response").expect("outcome section");

        assert!(code.contains("### Snippet 10\n\n```\nblock 10\n```"));
        assert!(!code.contains("### Snippet 11"));
        assert!(!code.contains("block 11"));
        assert!(code.contains("*(2 additional code blocks omitted)*"));
    }

    #[test]
    fn code_only_comes_from_assistant_messages() {
        let conversation = conversation(vec![
            message("m1", "human", &["```py\nprint('human')\n```"]),
            message("m2", "assistant", &["no code here"]),
        ]);
        assert!(!render_context_brief(&conversation).contains("## Code Produced"));
    }

    #[test]
    fn long_sections_are_truncated() {
        let long = "x".repeat(2_500);
        let conversation = conversation(vec![
            message("m1", "human", &[long.as_str()]),
            message("m2", "assistant", &[long.as_str()]),
        ]);
        let brief = render_context_brief(&conversation);

        let request = format!("## Original Request\n\n{}{TRUNCATION_MARKER}\n", "x".repeat(2_000));
        let turn = format!("**Human (turn 1):**\n{}{TRUNCATION_MARKER}\n", "x".repeat(800));
        assert!(brief.contains(&request));
        assert!(brief.contains(&turn));
        assert!(brief.ends_with(&format!("{}{TRUNCATION_MARKER}\n", "x".repeat(2_000))));
    }

    #[test]
    fn empty_conversation_has_only_header() {
        let conversation = conversation(Vec::new());
        assert_eq!(
            render_context_brief(&conversation),
            "# Context Brief: Brief test\n\n*Exported from Claude conversation on Jan 15, 2024 at 10:30 AM*\n*0 messages in original conversation*\n\n---\n"
        );
    }

    #[test]
    fn unknown_sender_turns_use_raw_label() {
        let conversation = conversation(vec![message("m1", "system", &["maintenance"])]);
        let brief = render_context_brief(&conversation);

        assert!(brief.contains("**system (turn 1):**\nmaintenance"));
        assert!(!brief.contains("## Original Request"));
    }
}
