//! Conventional commit grammar and validation.
//!
//! Parsing is structural and never fails: a message either matches the
//! `type(scope)?!?: subject` grammar or it is reported as [ParsedMessage::Malformed].
//! Vocabulary checks (is the type configured, is the scope known) are a separate
//! concern handled by [validate], which reports every violation found so callers
//! decide what is fatal.

use crate::config::CommitConfig;
use regex::Regex;

/// Structural parse result for a commit subject line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Parsed {
        r#type: String,
        scope: Option<String>,
        /// `!` immediately before the colon
        breaking_bang: bool,
        subject: String,
    },
    Malformed,
}

/// Parse the first line of a commit message against the conventional grammar.
///
/// Supports `type(scope)!: subject`, `type(scope): subject`, `type!: subject`
/// and `type: subject`. Anything else is [ParsedMessage::Malformed].
pub fn parse_message(first_line: &str) -> ParsedMessage {
    let re = match Regex::new(
        r"^(?P<type>[a-z][a-z0-9]*)(?:\((?P<scope>[^()]+)\))?(?P<bang>!)?:\s*(?P<subject>.*)$",
    ) {
        Ok(re) => re,
        Err(_) => return ParsedMessage::Malformed,
    };

    match re.captures(first_line) {
        Some(captures) => ParsedMessage::Parsed {
            r#type: captures
                .name("type")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            scope: captures.name("scope").map(|m| m.as_str().to_string()),
            breaking_bang: captures.name("bang").is_some(),
            subject: captures
                .name("subject")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        },
        None => ParsedMessage::Malformed,
    }
}

/// Check whether a commit body or footer marks the change as breaking.
///
/// A line beginning with any configured indicator (e.g. `BREAKING CHANGE:`)
/// sets the flag regardless of the commit type.
pub fn body_marks_breaking(body: &str, indicators: &[String]) -> bool {
    body.lines().any(|line| {
        let line = line.trim_start();
        indicators.iter().any(|marker| line.starts_with(marker.as_str()))
    })
}

/// A single rule violation found in a commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Type is not in the configured vocabulary
    InvalidType(String),
    /// Scope is neither a configured scope nor a package name
    InvalidScope(String),
    /// Subject is empty or shorter than the configured minimum
    MissingSubject,
    /// Subject exceeds the configured maximum length
    SubjectTooLong { length: usize, max: usize },
    /// Message does not match the conventional grammar at all
    MalformedFormat,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::InvalidType(t) => write!(f, "invalid type '{}'", t),
            Violation::InvalidScope(s) => write!(f, "invalid scope '{}'", s),
            Violation::MissingSubject => write!(f, "missing subject"),
            Violation::SubjectTooLong { length, max } => {
                write!(f, "subject too long ({} > {} characters)", length, max)
            }
            Violation::MalformedFormat => {
                write!(f, "message does not match 'type(scope): subject'")
            }
        }
    }
}

/// Validate a raw commit message against the configured vocabularies.
///
/// Returns every violation found, not just the first. Package names count as
/// valid scopes and are supplied via `extra_scopes`.
pub fn validate(raw_message: &str, config: &CommitConfig, extra_scopes: &[String]) -> Vec<Violation> {
    let first_line = raw_message.lines().next().unwrap_or("");

    let (r#type, scope, subject) = match parse_message(first_line) {
        ParsedMessage::Parsed {
            r#type,
            scope,
            subject,
            ..
        } => (r#type, scope, subject),
        ParsedMessage::Malformed => return vec![Violation::MalformedFormat],
    };

    let mut violations = Vec::new();

    if !config.types.iter().any(|t| t == &r#type) {
        violations.push(Violation::InvalidType(r#type));
    }

    if let Some(scope) = scope {
        let known = config.scopes.iter().any(|s| s == &scope)
            || extra_scopes.iter().any(|s| s == &scope);
        if !known {
            violations.push(Violation::InvalidScope(scope));
        }
    }

    let subject_len = subject.trim().chars().count();
    if subject_len < config.min_subject_length {
        violations.push(Violation::MissingSubject);
    } else if subject_len > config.max_subject_length {
        violations.push(Violation::SubjectTooLong {
            length: subject_len,
            max: config.max_subject_length,
        });
    }

    violations
}

/// Check a branch name against the configured prefixes.
///
/// An empty prefix list disables the check.
pub fn branch_has_valid_prefix(branch: &str, prefixes: &[String]) -> bool {
    prefixes.is_empty() || prefixes.iter().any(|p| branch.starts_with(p.as_str()))
}
