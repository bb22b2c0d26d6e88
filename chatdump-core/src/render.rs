use crate::fence::{Segment, split_segments};
use crate::model::{Attachment, ChatMessage, Conversation};
use crate::timestamp::display_timestamp;

const UNTITLED_TRANSCRIPT: &str = "Untitled Conversation";
const SEPARATOR: &str = "---";
const CODE_INDENT: &str = "    ";

/// Full markdown transcript: every human/assistant text turn and every
/// attachment, with thinking and tool traffic left out.
pub fn render_transcript(conversation: &Conversation) -> String {
    let title = if conversation.name.is_empty() {
        UNTITLED_TRANSCRIPT
    } else {
        conversation.name.as_str()
    };

    let mut lines = vec![
        format!("# {title}"),
        String::new(),
        format!("**Date:** {}", display_timestamp(&conversation.created_at)),
        format!("**Messages:** {}", conversation.message_count()),
        String::new(),
        SEPARATOR.to_string(),
        String::new(),
    ];

    for message in &conversation.chat_messages {
        push_transcript_message(&mut lines, message);
    }

    lines.join("\n")
}

fn push_transcript_message(lines: &mut Vec<String>, message: &ChatMessage) {
    lines.push(format!("### **{}**", message.sender.label()));
    lines.push(String::new());

    for attachment in &message.attachments {
        push_attachment(lines, attachment);
    }

    for text in message.text_items() {
        if text.trim().is_empty() {
            continue;
        }
        lines.push(text.to_string());
        lines.push(String::new());
    }

    lines.push(SEPARATOR.to_string());
    lines.push(String::new());
}

fn push_attachment(lines: &mut Vec<String>, attachment: &Attachment) {
    lines.push(format!("> **Attachment:** {}", attachment.file_name));
    if let Some(content) = attachment.content() {
        lines.push(">".to_string());
        lines.push("```".to_string());
        lines.push(content.to_string());
        lines.push("```".to_string());
    }
    lines.push(String::new());
}

/// Plain-text reading view for a terminal. Code blocks are set off by a
/// language caption and indentation; nothing from a message's text items
/// is dropped, including an unterminated trailing fence.
pub fn render_terminal_view(conversation: &Conversation) -> String {
    let mut output = String::new();

    for (idx, message) in conversation.chat_messages.iter().enumerate() {
        output.push_str(&format!("== {}. {} ==\n\n", idx + 1, message.sender.label()));

        for attachment in &message.attachments {
            output.push_str(&format!("[attachment] {}\n\n", attachment.file_name));
        }

        for text in message.text_items() {
            for segment in split_segments(text) {
                push_segment(&mut output, &segment);
            }
        }
    }

    output
}

fn push_segment(output: &mut String, segment: &Segment) {
    match segment {
        Segment::Text(text) => {
            if text.trim().is_empty() {
                return;
            }
            output.push_str(text.trim_end());
            output.push_str("\n\n");
        }
        Segment::Code { block, .. } => {
            if !block.language.is_empty() {
                output.push_str(&format!("{CODE_INDENT}[{}]\n", block.language));
            }
            for line in block.body.lines() {
                output.push_str(CODE_INDENT);
                output.push_str(line);
                output.push('\n');
            }
            output.push('\n');
        }
    }
}
