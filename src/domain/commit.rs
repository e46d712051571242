use chrono::{DateTime, Utc};

use crate::config::CommitConfig;
use crate::conventional::{self, ParsedMessage};

/// Commit type after vocabulary resolution.
///
/// `Known` only for types present in the configured vocabulary; anything
/// else, including structurally malformed messages, is `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitKind {
    Known(String),
    Unknown,
}

impl CommitKind {
    /// Returns the type name if it is in the configured vocabulary.
    pub fn as_known(&self) -> Option<&str> {
        match self {
            CommitKind::Known(t) => Some(t),
            CommitKind::Unknown => None,
        }
    }
}

/// Structured, immutable record of one commit.
///
/// Every commit reachable in a ref range is represented exactly once; parse
/// failures degrade to `CommitKind::Unknown` rather than being dropped, so
/// totals always reconcile against the raw log count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub authored_at: DateTime<Utc>,
    /// First line of the raw message, untouched
    pub raw_subject: String,
    /// Everything after the first line, untouched
    pub raw_body: String,
    pub kind: CommitKind,
    pub scope: Option<String>,
    /// False when a scope is present but matches neither the configured
    /// scope list nor a package name. Recorded here so bump policy can act
    /// on it without re-parsing.
    pub scope_valid: bool,
    pub is_breaking: bool,
    /// Free text after the type/scope prefix; the full raw subject line
    /// when the message is not conventional
    pub subject: String,
}

impl Commit {
    /// Build a commit record from raw message and metadata. Never fails.
    ///
    /// `extra_scopes` carries package names, which count as valid scopes.
    pub fn parse(
        hash: impl Into<String>,
        authored_at: DateTime<Utc>,
        raw_message: &str,
        config: &CommitConfig,
        extra_scopes: &[String],
    ) -> Self {
        let mut lines = raw_message.splitn(2, '\n');
        let raw_subject = lines.next().unwrap_or("").trim_end().to_string();
        let raw_body = lines.next().unwrap_or("").to_string();

        let body_breaking =
            conventional::body_marks_breaking(&raw_body, &config.breaking_change_indicators);

        match conventional::parse_message(&raw_subject) {
            ParsedMessage::Parsed {
                r#type,
                scope,
                breaking_bang,
                subject,
            } => {
                let kind = if config.types.iter().any(|t| t == &r#type) {
                    CommitKind::Known(r#type)
                } else {
                    CommitKind::Unknown
                };
                let scope_valid = match &scope {
                    Some(s) => {
                        config.scopes.iter().any(|c| c == s)
                            || extra_scopes.iter().any(|c| c == s)
                    }
                    None => true,
                };

                Commit {
                    hash: hash.into(),
                    authored_at,
                    raw_subject,
                    raw_body,
                    kind,
                    scope,
                    scope_valid,
                    is_breaking: breaking_bang || body_breaking,
                    subject,
                }
            }
            ParsedMessage::Malformed => Commit {
                hash: hash.into(),
                authored_at,
                subject: raw_subject.clone(),
                raw_subject,
                raw_body,
                kind: CommitKind::Unknown,
                scope: None,
                scope_valid: true,
                is_breaking: body_breaking,
            },
        }
    }

    /// Shortened hash for display (first 7 characters).
    pub fn short_hash(&self) -> &str {
        if self.hash.len() > 7 {
            &self.hash[..7]
        } else {
            &self.hash
        }
    }
}
