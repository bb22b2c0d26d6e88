use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::timestamp::parse_iso8601;
use crate::value::FlexibleValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderRole {
    Human,
    Assistant,
    /// Any sender the export does not document. Kept verbatim for display.
    Other(String),
}

impl SenderRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Human => "human",
            Self::Assistant => "assistant",
            Self::Other(raw) => raw,
        }
    }

    /// Heading label used by the transcript and the terminal view.
    pub fn label(&self) -> &str {
        match self {
            Self::Human => "Human",
            Self::Assistant => "Assistant",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for SenderRole {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "human" => Self::Human,
            "assistant" => Self::Assistant,
            _ => Self::Other(raw),
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for SenderRole {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for SenderRole {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub account: Option<ConversationAccount>,
    #[serde(default)]
    pub chat_messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn created_date(&self) -> Option<DateTime<Utc>> {
        parse_iso8601(&self.created_at)
    }

    pub fn updated_date(&self) -> Option<DateTime<Utc>> {
        parse_iso8601(&self.updated_at)
    }

    pub fn message_count(&self) -> usize {
        self.chat_messages.len()
    }

    /// Case-insensitive substring match over the name and each message's
    /// flat text. An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&query)
            || self
                .chat_messages
                .iter()
                .any(|message| message.text.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub uuid: String,
    pub sender: SenderRole,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub files: Vec<MessageFile>,
}

impl ChatMessage {
    pub fn is_human(&self) -> bool {
        self.sender == SenderRole::Human
    }

    pub fn is_assistant(&self) -> bool {
        self.sender == SenderRole::Assistant
    }

    /// Text of every `text` content item, in order.
    pub fn text_items(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(ContentItem::text)
    }

    /// All `text` items joined by a blank line.
    pub fn joined_text(&self) -> String {
        self.text_items().collect::<Vec<_>>().join("\n\n")
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|file| file.file_name.as_str())
    }
}

/// One unit of a message body, keyed by its `type` tag. Only the tag is
/// mandatory; every variant field may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text(TextContent),
    Thinking(ThinkingContent),
    ToolUse(ToolUseContent),
    ToolResult(ToolResultContent),
    #[serde(other)]
    Unknown,
}

impl ContentItem {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(content) => content.text.as_deref(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Thinking(_) => "thinking",
            Self::ToolUse(_) => "tool_use",
            Self::ToolResult(_) => "tool_result",
            Self::Unknown => "unknown",
        }
    }
}

/// Fields every content item may carry regardless of its `type`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "FlexibleValue::is_null")]
    pub flags: FlexibleValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub citations: Option<Vec<Citation>>,
    #[serde(flatten)]
    pub meta: ItemMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinkingContent {
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub summaries: Option<Vec<ThinkingSummary>>,
    #[serde(default)]
    pub cut_off: Option<bool>,
    #[serde(default)]
    pub alternative_display_type: Option<String>,
    #[serde(flatten)]
    pub meta: ItemMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolUseContent {
    #[serde(default, rename = "id")]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub input: FlexibleValue,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub integration_name: Option<String>,
    #[serde(flatten)]
    pub meta: ItemMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultContent {
    #[serde(default)]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: FlexibleValue,
    #[serde(default)]
    pub is_error: Option<bool>,
    #[serde(flatten)]
    pub meta: ItemMeta,
}

impl ToolResultContent {
    /// A missing or null `is_error` counts as success.
    pub fn failed(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub start_index: Option<i64>,
    #[serde(default)]
    pub end_index: Option<i64>,
    #[serde(default)]
    pub details: Option<CitationDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationDetails {
    #[serde(default, rename = "type")]
    pub detail_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingSummary {
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub extracted_content: Option<String>,
}

impl Attachment {
    /// Structural identity: attachments carry no uuid of their own.
    pub fn id(&self) -> String {
        format!("{}{}", self.file_name, self.file_type.as_deref().unwrap_or(""))
    }

    /// Extracted text when it holds anything besides whitespace.
    pub fn content(&self) -> Option<&str> {
        self.extracted_content
            .as_deref()
            .filter(|content| !content.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFile {
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use crate::model::{ChatMessage, ContentItem, Conversation, SenderRole};
    use crate::value::FlexibleValue;

    const CONVERSATION: &str = r#"{
        "uuid": "8f2c1e4a-1b2c-4d5e-8f90-123456789abc",
        "name": "Parser help",
        "summary": "",
        "created_at": "2024-01-15T10:30:00.000000Z",
        "updated_at": "2024-01-15T11:00:00Z",
        "account": {"uuid": "acc-1"},
        "chat_messages": [
            {
                "uuid": "m1",
                "text": "How do I parse this?",
                "sender": "human",
                "created_at": "2024-01-15T10:30:00Z",
                "updated_at": "2024-01-15T10:30:00Z",
                "content": [
                    {"type": "text", "text": "How do I parse this?", "citations": [], "start_timestamp": "x"}
                ],
                "attachments": [
                    {"file_name": "input.csv", "file_size": 120, "file_type": "text/csv", "extracted_content": "a,b"}
                ],
                "files": [{"file_name": "input.csv"}]
            },
            {
                "uuid": "m2",
                "text": "",
                "sender": "assistant",
                "content": [
                    {"type": "thinking", "thinking": "consider csv", "summaries": [{"summary": "csv"}], "cut_off": false},
                    {"type": "tool_use", "id": "toolu_1", "name": "read", "input": {"path": "input.csv"}, "integration_name": "fs"},
                    {"type": "tool_result", "content": [{"type": "text", "text": "a,b"}], "is_error": false},
                    {"type": "token_budget"},
                    {"type": "text", "text": "Use a reader."}
                ],
                "attachments": [],
                "files": []
            }
        ]
    }"#;

    #[test]
    fn decodes_every_content_variant() {
        let conversation: Conversation = serde_json::from_str(CONVERSATION).expect("decode");
        assert_eq!(conversation.message_count(), 2);

        let assistant = &conversation.chat_messages[1];
        let kinds: Vec<_> = assistant.content.iter().map(ContentItem::kind).collect();
        assert_eq!(
            kinds,
            vec!["thinking", "tool_use", "tool_result", "unknown", "text"]
        );

        let ContentItem::ToolUse(tool) = &assistant.content[1] else {
            panic!("expected tool_use");
        };
        assert_eq!(tool.tool_use_id.as_deref(), Some("toolu_1"));
        assert_eq!(tool.integration_name.as_deref(), Some("fs"));
        assert_eq!(
            tool.input.get("path").and_then(FlexibleValue::as_str),
            Some("input.csv")
        );

        assert_eq!(assistant.joined_text(), "Use a reader.");
    }

    #[test]
    fn content_item_with_only_type_is_inert() {
        let item: ContentItem = serde_json::from_str(r#"{"type":"text"}"#).expect("decode");
        assert_eq!(item.text(), None);

        let item: ContentItem = serde_json::from_str(r#"{"type":"tool_result"}"#).expect("decode");
        let ContentItem::ToolResult(result) = item else {
            panic!("expected tool_result");
        };
        assert!(result.content.is_null());
        assert!(!result.failed());
    }

    #[test]
    fn null_optional_fields_decode_as_absent() {
        let raw = r#"{"uuid":"c1","chat_messages":[{"uuid":"m1","sender":"assistant","content":[
            {"type":"text","text":"hi","citations":null,"flags":null,"start_timestamp":null},
            {"type":"thinking","thinking":"hmm","summaries":null,"cut_off":null},
            {"type":"tool_result","content":null,"is_error":null}
        ]}]}"#;
        let conversation: Conversation = serde_json::from_str(raw).expect("nulls are tolerated");
        let content = &conversation.chat_messages[0].content;

        let ContentItem::Text(text) = &content[0] else {
            panic!("expected text");
        };
        assert_eq!(text.citations, None);
        assert_eq!(text.meta.start_timestamp, None);

        let ContentItem::Thinking(thinking) = &content[1] else {
            panic!("expected thinking");
        };
        assert_eq!(thinking.summaries, None);
        assert_eq!(thinking.cut_off, None);

        let ContentItem::ToolResult(result) = &content[2] else {
            panic!("expected tool_result");
        };
        assert_eq!(result.is_error, None);
        assert!(!result.failed());
    }

    #[test]
    fn item_timestamps_and_flags_survive_reencoding() {
        let raw = r#"{"type":"text","text":"hi","start_timestamp":"2024-01-15T10:30:00Z","stop_timestamp":"2024-01-15T10:30:02Z","flags":{"pinned":true}}"#;
        let item: ContentItem = serde_json::from_str(raw).expect("decode");

        let ContentItem::Text(text) = &item else {
            panic!("expected text");
        };
        assert_eq!(text.meta.stop_timestamp.as_deref(), Some("2024-01-15T10:30:02Z"));
        assert_eq!(text.meta.flags.get("pinned"), Some(&FlexibleValue::Bool(true)));

        let encoded = serde_json::to_value(&item).expect("encode");
        assert_eq!(encoded["type"], "text");
        assert_eq!(encoded["start_timestamp"], "2024-01-15T10:30:00Z");
        assert_eq!(encoded["flags"]["pinned"], true);

        let bare: ContentItem = serde_json::from_str(r#"{"type":"text"}"#).expect("decode");
        let bare = serde_json::to_value(&bare).expect("encode");
        assert!(bare.get("flags").is_none());
    }

    #[test]
    fn content_item_without_type_fails() {
        let err = serde_json::from_str::<ContentItem>(r#"{"text":"orphan"}"#)
            .expect_err("type tag is mandatory");
        assert!(err.to_string().contains("type"));
    }

    #[test]
    fn missing_type_fails_the_whole_conversation() {
        let raw = r#"{"uuid":"c1","chat_messages":[{"uuid":"m1","sender":"human","content":[{"text":"no tag"}]}]}"#;
        assert!(serde_json::from_str::<Conversation>(raw).is_err());
    }

    #[test]
    fn unknown_sender_is_preserved() {
        let message: ChatMessage =
            serde_json::from_str(r#"{"uuid":"m1","sender":"system"}"#).expect("decode");
        assert_eq!(message.sender, SenderRole::Other("system".to_string()));
        assert!(!message.is_human());
        assert!(!message.is_assistant());
        assert_eq!(message.sender.label(), "system");
    }

    #[test]
    fn invalid_timestamps_are_not_fatal() {
        let conversation: Conversation =
            serde_json::from_str(r#"{"uuid":"c1","created_at":"not a date"}"#).expect("decode");
        assert!(conversation.created_date().is_none());
        assert_eq!(conversation.created_at, "not a date");
    }

    #[test]
    fn attachment_identity_and_blank_content() {
        let conversation: Conversation = serde_json::from_str(CONVERSATION).expect("decode");
        let attachment = &conversation.chat_messages[0].attachments[0];
        assert_eq!(attachment.id(), "input.csvtext/csv");
        assert_eq!(attachment.content(), Some("a,b"));

        let blank: crate::model::Attachment =
            serde_json::from_str(r#"{"file_name":"empty.txt","extracted_content":"  \n"}"#)
                .expect("decode");
        assert_eq!(blank.content(), None);
    }

    #[test]
    fn search_matches_name_and_flat_text() {
        let conversation: Conversation = serde_json::from_str(CONVERSATION).expect("decode");
        assert!(conversation.matches_query("PARSER"));
        assert!(conversation.matches_query("parse this"));
        assert!(conversation.matches_query("   "));
        assert!(!conversation.matches_query("kubernetes"));
    }
}
