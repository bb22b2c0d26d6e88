use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ChatdumpError, Result};

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid regex")
});
static UUID_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[0-9a-f][0-9a-f-]{3,35}$").expect("valid regex"));

/// How a conversation is picked on the command line: a full uuid, or a
/// unique prefix of one (at least four characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationSelector {
    Exact(String),
    Prefix(String),
}

impl ConversationSelector {
    pub fn parse(input: &str) -> Result<Self> {
        input.parse()
    }

    pub fn matches(&self, uuid: &str) -> bool {
        match self {
            Self::Exact(id) => uuid.eq_ignore_ascii_case(id),
            Self::Prefix(prefix) => uuid
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(id) | Self::Prefix(id) => id,
        }
    }
}

impl fmt::Display for ConversationSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConversationSelector {
    type Err = ChatdumpError;

    fn from_str(input: &str) -> Result<Self> {
        let input = input.trim();

        if UUID_RE.is_match(input) {
            return Ok(Self::Exact(input.to_string()));
        }
        if UUID_PREFIX_RE.is_match(input) {
            return Ok(Self::Prefix(input.to_string()));
        }

        Err(ChatdumpError::InvalidConversationId(input.to_string()))
    }
}
