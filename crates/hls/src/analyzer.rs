//! # Playlist Analyzer
//!
//! Runs the tokenizer and the rule engine over a playlist in a single pass and
//! keeps counts of what it saw.
//!
//! Rules always see every token, including blank lines and errors. The detail
//! filter only decides which tokens are handed back to the caller.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::rules::{Diagnostic, RuleEngine};
use crate::token::Token;
use crate::tokenizer::{Details, Tokenizer};

/// Counters collected while analyzing one playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenStats {
    pub lines: usize,
    pub tags: usize,
    pub uris: usize,
    pub comments: usize,
    pub blank_lines: usize,
    pub parse_errors: usize,
    pub rule_errors: usize,
    pub rule_warnings: usize,
}

impl TokenStats {
    pub fn record_token(&mut self, token: &Token) {
        self.lines += 1;
        match token {
            Token::Tag(_) => self.tags += 1,
            Token::Uri(_) => self.uris += 1,
            Token::Comment(_) => self.comments += 1,
            Token::BlankLine => self.blank_lines += 1,
            Token::Error(_) => self.parse_errors += 1,
        }
    }

    pub fn record_diagnostic(&mut self, diagnostic: &Diagnostic) {
        if diagnostic.is_error() {
            self.rule_errors += 1;
        } else {
            self.rule_warnings += 1;
        }
    }

    /// Parse errors or error diagnostics.
    pub fn has_errors(&self) -> bool {
        self.parse_errors > 0 || self.rule_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.rule_warnings > 0
    }
}

impl fmt::Display for TokenStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Playlist Statistics:")?;
        writeln!(f, "  Lines: {}", self.lines)?;
        writeln!(f, "  Tags: {}", self.tags)?;
        writeln!(f, "  URIs: {}", self.uris)?;
        writeln!(f, "  Comments: {}", self.comments)?;
        writeln!(f, "  Blank lines: {}", self.blank_lines)?;
        writeln!(f, "  Parse errors: {}", self.parse_errors)?;
        writeln!(f, "  Rule errors: {}", self.rule_errors)?;
        write!(f, "  Rule warnings: {}", self.rule_warnings)
    }
}

/// Everything [`PlaylistAnalyzer::analyze`] found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub tokens: Vec<(usize, Token)>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: TokenStats,
}

type RuleFactory = Box<dyn Fn() -> RuleEngine + Send + Sync>;

/// Tokenizes playlists and checks them against a set of rules, the built-in
/// ones unless configured otherwise.
pub struct PlaylistAnalyzer {
    tokenizer: Tokenizer,
    details: Details,
    rules: RuleFactory,
}

impl fmt::Debug for PlaylistAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistAnalyzer")
            .field("tokenizer", &self.tokenizer)
            .field("details", &self.details)
            .field("rules", &(self.rules)().rule_names())
            .finish()
    }
}

impl Default for PlaylistAnalyzer {
    fn default() -> Self {
        Self::new(Tokenizer::default())
    }
}

impl PlaylistAnalyzer {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            details: Details::default(),
            rules: Box::new(RuleEngine::default),
        }
    }

    /// Filter for the tokens handed back to the caller.
    pub fn with_details(mut self, details: Details) -> Self {
        self.details = details;
        self
    }

    /// Switches between the built-in rules and none at all. Without rules
    /// only tokenizer errors are reported.
    pub fn with_rules(mut self, enabled: bool) -> Self {
        self.rules = if enabled {
            Box::new(RuleEngine::default)
        } else {
            Box::new(RuleEngine::empty)
        };
        self
    }

    /// Uses the engines built by `factory`, one per analyzed playlist.
    pub fn with_rule_engine<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> RuleEngine + Send + Sync + 'static,
    {
        self.rules = Box::new(factory);
        self
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Analyzes `data`, streaming tokens and diagnostics to the callbacks as
    /// they are produced.
    pub fn analyze_with<T, D>(
        &self,
        data: &[u8],
        mut on_token: T,
        mut on_diagnostic: D,
    ) -> TokenStats
    where
        T: FnMut(usize, &Token),
        D: FnMut(&Diagnostic),
    {
        let mut engine = (self.rules)();
        let mut stats = TokenStats::default();

        for (index, token) in self.tokenizer.tokens(data, Details::Complete) {
            stats.record_token(&token);
            engine.observe(&token, index, &mut |diagnostic| {
                stats.record_diagnostic(&diagnostic);
                on_diagnostic(&diagnostic);
            });
            if self.details.accepts(&token) {
                on_token(index, &token);
            }
        }

        debug!(
            lines = stats.lines,
            parse_errors = stats.parse_errors,
            rule_errors = stats.rule_errors,
            rule_warnings = stats.rule_warnings,
            "playlist analyzed"
        );
        stats
    }

    /// Analyzes `data` and collects the results.
    pub fn analyze(&self, data: &[u8]) -> Analysis {
        let mut tokens = Vec::new();
        let mut diagnostics = Vec::new();
        let stats = self.analyze_with(
            data,
            |index, token| tokens.push((index, token.clone())),
            |diagnostic| diagnostics.push(diagnostic.clone()),
        );
        Analysis {
            tokens,
            diagnostics,
            stats,
        }
    }
}
