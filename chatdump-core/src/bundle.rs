use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs::home_dir;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ChatdumpError, Result};
use crate::model::Conversation;

pub const USERS_FILE: &str = "users.json";
pub const MEMORIES_FILE: &str = "memories.json";
pub const PROJECTS_FILE: &str = "projects.json";
pub const CONVERSATIONS_FILE: &str = "conversations.json";

pub const EXPORT_DIR_ENV: &str = "CHATDUMP_EXPORT_DIR";
const SEARCH_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedUser {
    pub uuid: String,
    pub full_name: String,
    pub email_address: String,
    #[serde(default)]
    pub verified_phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedMemories {
    #[serde(default)]
    pub conversations_memory: String,
    #[serde(default)]
    pub project_memories: BTreeMap<String, String>,
    pub account_uuid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedProject {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_starter_project: bool,
    #[serde(default)]
    pub prompt_template: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    pub creator: ProjectCreator,
    #[serde(default)]
    pub docs: Vec<ProjectDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCreator {
    pub uuid: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub uuid: String,
    pub filename: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportBundle {
    pub root: PathBuf,
    pub users: Vec<ExportedUser>,
    pub memories: Vec<ExportedMemories>,
    pub projects: Vec<ExportedProject>,
    pub conversations: Vec<Conversation>,
}

impl ExportBundle {
    /// Decodes all four export files. Any missing or malformed file fails
    /// the whole load.
    pub fn load(bundle_dir: &Path) -> Result<Self> {
        let users = load_file(bundle_dir, USERS_FILE)?;
        let memories = load_file(bundle_dir, MEMORIES_FILE)?;
        let projects = load_file(bundle_dir, PROJECTS_FILE)?;
        let conversations = load_conversations(bundle_dir)?;

        Ok(Self {
            root: bundle_dir.to_path_buf(),
            users,
            memories,
            projects,
            conversations,
        })
    }
}

pub fn load_conversations(bundle_dir: &Path) -> Result<Vec<Conversation>> {
    load_file(bundle_dir, CONVERSATIONS_FILE)
}

fn load_file<T: DeserializeOwned>(bundle_dir: &Path, file_name: &str) -> Result<Vec<T>> {
    let path = bundle_dir.join(file_name);
    if !path.is_file() {
        return Err(ChatdumpError::FileNotFound { path });
    }

    let raw = fs::read(&path).map_err(|source| ChatdumpError::Io {
        path: path.clone(),
        source,
    })?;
    let records: Vec<T> = serde_json::from_slice(&raw)
        .map_err(|source| ChatdumpError::Decode {
            path: path.clone(),
            source,
        })?;

    debug!(path = %path.display(), records = records.len(), "decoded export file");
    Ok(records)
}

/// Picks the folder to read from.
///
/// Precedence:
/// 1) explicit path (the `--dir` flag)
/// 2) `CHATDUMP_EXPORT_DIR`
/// 3) current directory
pub fn export_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return expand_home(path);
    }

    if let Some(path) = env::var_os(EXPORT_DIR_ENV).filter(|path| !path.is_empty()) {
        return expand_home(Path::new(&path));
    }

    env::current_dir().map_err(|source| ChatdumpError::Io {
        path: PathBuf::from("."),
        source,
    })
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = home_dir().ok_or(ChatdumpError::HomeDirectoryNotFound)?;
    Ok(home.join(rest))
}

/// Finds the directory holding `conversations.json`: `root` itself, or
/// the first match a few levels down in sorted walk order. Unpacked
/// export archives often nest the files one folder deep.
pub fn locate_bundle(root: &Path) -> Result<PathBuf> {
    if root.join(CONVERSATIONS_FILE).is_file() {
        debug!(root = %root.display(), "export bundle found at root");
        return Ok(root.to_path_buf());
    }

    let found = WalkDir::new(root)
        .min_depth(1)
        .max_depth(SEARCH_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == CONVERSATIONS_FILE)
        .and_then(|entry| entry.path().parent().map(Path::to_path_buf));

    match found {
        Some(bundle_dir) => {
            debug!(root = %root.display(), bundle = %bundle_dir.display(), "export bundle found below root");
            Ok(bundle_dir)
        }
        None => Err(ChatdumpError::BundleNotFound {
            root: root.to_path_buf(),
        }),
    }
}
