//! # Playlist Rules
//!
//! Semantic checks that run over an already classified token sequence.
//!
//! Every rule sees every token once, in playlist order, through
//! [`PlaylistRule::observe`]. Rules keep whatever state they need between
//! tokens (the declared version, the renditions seen so far, ...) and report
//! problems as [`Diagnostic`]s through a sink. They never change the token
//! stream and never talk to each other.
//!
//! Rule state belongs to one playlist: build a new [`RuleEngine`] for every
//! playlist you check.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::tag::Tag;
use crate::token::Token;

pub mod media;
pub mod version;

pub use media::{MediaIssue, MediaRule};
pub use version::{VersionIssue, VersionRule};

/// How serious a [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What a rule found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Issue {
    Version(VersionIssue),
    Media(MediaIssue),
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::Version(issue) => issue.fmt(f),
            Issue::Media(issue) => issue.fmt(f),
        }
    }
}

impl From<VersionIssue> for Issue {
    fn from(issue: VersionIssue) -> Self {
        Issue::Version(issue)
    }
}

impl From<MediaIssue> for Issue {
    fn from(issue: MediaIssue) -> Self {
        Issue::Media(issue)
    }
}

/// A problem reported by a rule for the tag at `index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule: &'static str,
    pub severity: Severity,
    pub index: usize,
    pub issue: Issue,
    pub tag: Tag,
}

impl Diagnostic {
    pub fn error(rule: &'static str, index: usize, tag: &Tag, issue: impl Into<Issue>) -> Self {
        Self {
            rule,
            severity: Severity::Error,
            index,
            issue: issue.into(),
            tag: tag.clone(),
        }
    }

    pub fn warning(rule: &'static str, index: usize, tag: &Tag, issue: impl Into<Issue>) -> Self {
        Self {
            rule,
            severity: Severity::Warning,
            index,
            issue: issue.into(),
            tag: tag.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} [{}] {}: {}",
            self.index + 1,
            self.severity,
            self.rule,
            self.issue,
            self.tag.raw()
        )
    }
}

/// A semantic check over the token sequence.
pub trait PlaylistRule: Send {
    /// Looks at the next token. `index` is the token's line index.
    fn observe(&mut self, token: &Token, index: usize, sink: &mut dyn FnMut(Diagnostic));

    /// Name used in diagnostics and logs.
    fn name(&self) -> &'static str;
}

/// Runs a set of rules over one playlist.
pub struct RuleEngine {
    rules: Vec<Box<dyn PlaylistRule>>,
}

impl Default for RuleEngine {
    /// The built-in rules: [`VersionRule`] and [`MediaRule`].
    fn default() -> Self {
        Self::new(vec![
            Box::new(VersionRule::new()),
            Box::new(MediaRule::new()),
        ])
    }
}

impl RuleEngine {
    pub fn new(rules: Vec<Box<dyn PlaylistRule>>) -> Self {
        Self { rules }
    }

    /// An engine that reports nothing.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn push(&mut self, rule: impl PlaylistRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Forwards `token` to every rule, in registration order.
    pub fn observe(&mut self, token: &Token, index: usize, sink: &mut dyn FnMut(Diagnostic)) {
        for rule in &mut self.rules {
            rule.observe(token, index, &mut |diagnostic| {
                debug!(rule = diagnostic.rule, %diagnostic, "rule violation");
                sink(diagnostic)
            });
        }
    }
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}
