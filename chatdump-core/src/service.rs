use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::brief::render_context_brief;
use crate::error::{ChatdumpError, Result};
use crate::filename::{ExportKind, export_file_name};
use crate::model::Conversation;
use crate::render::render_transcript;
use crate::selector::ConversationSelector;
use crate::timestamp::display_timestamp;
use crate::tokens::{estimate_tokens, token_count_label};

/// One row of the conversation listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationListItem {
    pub uuid: String,
    pub name: String,
    pub updated: String,
    pub message_count: usize,
    pub transcript_tokens: usize,
}

impl ConversationListItem {
    pub fn from_conversation(conversation: &Conversation) -> Self {
        Self {
            uuid: conversation.uuid.clone(),
            name: conversation.name.clone(),
            updated: display_timestamp(&conversation.updated_at),
            message_count: conversation.message_count(),
            transcript_tokens: estimate_tokens(&render_transcript(conversation)),
        }
    }

    pub fn token_label(&self) -> String {
        token_count_label(self.transcript_tokens)
    }
}

/// Newest-first by `updated_at`, filtered by `query`. Conversations whose
/// timestamp does not parse go last; ties keep file order.
pub fn list_conversations<'a>(
    conversations: &'a [Conversation],
    query: Option<&str>,
) -> Vec<&'a Conversation> {
    let mut listed: Vec<_> = conversations
        .iter()
        .filter(|conversation| query.is_none_or(|query| conversation.matches_query(query)))
        .collect();

    listed.sort_by_key(|conversation| Reverse(conversation.updated_date()));
    listed
}

pub fn find_conversation<'a>(
    conversations: &'a [Conversation],
    selector: &ConversationSelector,
) -> Result<&'a Conversation> {
    let mut candidates = conversations
        .iter()
        .filter(|conversation| selector.matches(&conversation.uuid));

    let Some(found) = candidates.next() else {
        return Err(ChatdumpError::ConversationNotFound {
            id: selector.to_string(),
        });
    };

    let extra = candidates.count();
    if extra > 0 {
        return Err(ChatdumpError::AmbiguousConversationId {
            id: selector.to_string(),
            candidates: extra + 1,
        });
    }

    debug!(selector = %selector, uuid = %found.uuid, "resolved conversation");
    Ok(found)
}

pub fn render_export(conversation: &Conversation, kind: ExportKind) -> String {
    match kind {
        ExportKind::Transcript => render_transcript(conversation),
        ExportKind::Brief => render_context_brief(conversation),
    }
}

/// Writes the rendered export into `out_dir` under its sanitized name and
/// returns the path written.
pub fn write_export(
    conversation: &Conversation,
    kind: ExportKind,
    out_dir: &Path,
) -> Result<PathBuf> {
    let path = out_dir.join(export_file_name(conversation, kind));
    fs::write(&path, render_export(conversation, kind)).map_err(|source| ChatdumpError::Io {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), ?kind, "wrote export");
    Ok(path)
}

pub fn conversation_to_raw_json(conversation: &Conversation) -> Result<String> {
    serde_json::to_string_pretty(conversation)
        .map(|json| format!("{json}\n"))
        .map_err(|err| ChatdumpError::Serialization(err.to_string()))
}
