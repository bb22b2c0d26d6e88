use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatdumpError {
    #[error("invalid conversation id: {0}")]
    InvalidConversationId(String),

    #[error("conversation not found: {id}")]
    ConversationNotFound { id: String },

    #[error("conversation id {id} is ambiguous: {candidates} conversations match")]
    AmbiguousConversationId { id: String, candidates: usize },

    #[error("no export bundle (conversations.json) found under {root}")]
    BundleNotFound { root: PathBuf },

    #[error("could not find {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot determine home directory")]
    HomeDirectoryNotFound,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ChatdumpError>;
