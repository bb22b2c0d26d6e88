use crate::model::Conversation;

const MAX_FILE_STEM_CHARS: usize = 80;
const FALLBACK_FILE_STEM: &str = "conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Transcript,
    Brief,
}

impl ExportKind {
    fn suffix(self) -> &'static str {
        match self {
            Self::Transcript => ".md",
            Self::Brief => "-brief.md",
        }
    }
}

/// Turns a conversation title into a file stem: path and drive separators
/// become `-`, quotes are removed, and the result is trimmed and capped.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|ch| !matches!(ch, '"' | '\''))
        .map(|ch| match ch {
            '/' | ':' | '\\' => '-',
            other => other,
        })
        .collect();

    let capped: String = cleaned.trim().chars().take(MAX_FILE_STEM_CHARS).collect();
    if capped.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        capped
    }
}

pub fn export_file_name(conversation: &Conversation, kind: ExportKind) -> String {
    format!("{}{}", sanitize_filename(&conversation.name), kind.suffix())
}
