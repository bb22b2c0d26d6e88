pub mod brief;
pub mod bundle;
pub mod error;
pub mod fence;
pub mod filename;
pub mod model;
pub mod render;
pub mod selector;
pub mod service;
pub mod timestamp;
pub mod tokens;
pub mod value;

pub use brief::{render_context_brief, truncate};
pub use bundle::{ExportBundle, export_root, load_conversations, locate_bundle};
pub use error::{ChatdumpError, Result};
pub use fence::{CodeBlock, Segment, extract_code_blocks, join_segments, split_segments};
pub use filename::{ExportKind, export_file_name, sanitize_filename};
pub use model::{
    Attachment, ChatMessage, ContentItem, Conversation, ItemMeta, SenderRole, TextContent,
    ThinkingContent, ToolResultContent, ToolUseContent,
};
pub use render::{render_terminal_view, render_transcript};
pub use selector::ConversationSelector;
pub use service::{
    ConversationListItem, conversation_to_raw_json, find_conversation, list_conversations,
    render_export, write_export,
};
pub use timestamp::{display_timestamp, parse_iso8601};
pub use tokens::{estimate_tokens, token_count_label};
pub use value::FlexibleValue;
