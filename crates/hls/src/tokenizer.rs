//! Line classification.
//!
//! [`Tokenizer`] splits a playlist buffer into lines and turns every line into
//! exactly one [`Token`]. Tag lines are handed to the configured
//! [`TagResolver`]s; parse failures become [`Token::Error`] so the rest of the
//! playlist is still classified.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::TokenizerError;
use crate::lines::{Lines, lines};
use crate::resolver::{ExtTagResolver, TagResolver};
use crate::token::{Token, Uri};

/// Which tokens are handed to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Details {
    /// Tags, URIs and comments.
    ValidOnly,
    /// Everything except parse errors.
    IncludeBlankLines,
    /// Every token, one per line.
    #[default]
    Complete,
}

impl Details {
    /// Whether `token` passes this filter.
    pub fn accepts(&self, token: &Token) -> bool {
        match self {
            Details::ValidOnly => !matches!(token, Token::BlankLine | Token::Error(_)),
            Details::IncludeBlankLines => !token.is_error(),
            Details::Complete => true,
        }
    }
}

impl fmt::Display for Details {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Details::ValidOnly => write!(f, "valid-only"),
            Details::IncludeBlankLines => write!(f, "include-blank-lines"),
            Details::Complete => write!(f, "complete"),
        }
    }
}

/// Classifies playlist lines into tokens.
pub struct Tokenizer {
    resolvers: Vec<Box<dyn TagResolver>>,
    base_url: Option<Url>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolvers: Vec<_> = self.resolvers.iter().map(|r| r.name()).collect();
        f.debug_struct("Tokenizer")
            .field("resolvers", &resolvers)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Tokenizer {
    /// A tokenizer with the given resolvers, tried in order.
    pub fn new(resolvers: Vec<Box<dyn TagResolver>>) -> Self {
        Self {
            resolvers,
            base_url: None,
        }
    }

    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::default()
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Classifies a single line.
    pub fn classify(&self, line: &str) -> Token {
        let Some(first) = line.chars().next() else {
            return Token::BlankLine;
        };

        if first == '#' {
            let Some(resolver) = self.resolvers.iter().find(|r| r.can_resolve(line)) else {
                return Token::Comment(line.to_string());
            };
            return match resolver.resolve(line) {
                Ok(tag) => Token::Tag(tag),
                Err(error) => {
                    debug!(resolver = resolver.name(), %error, "failed to resolve tag");
                    Token::Error(error)
                }
            };
        }

        match Uri::parse(line, self.base_url.as_ref()) {
            Some(uri) => Token::Uri(uri),
            None => {
                debug!(line, "invalid uri");
                Token::Error(TokenizerError::InvalidUri {
                    token: line.to_string(),
                })
            }
        }
    }

    /// Classifies a line and applies the detail filter. Undecodable lines
    /// (`None`) are treated as blank.
    pub fn classify_with(&self, line: Option<&str>, details: Details) -> Option<Token> {
        let token = match line {
            Some(line) => self.classify(line),
            None => Token::BlankLine,
        };
        details.accepts(&token).then_some(token)
    }

    /// Lazily tokenizes `data`, yielding `(line index, token)` pairs.
    pub fn tokens<'a>(&'a self, data: &'a [u8], details: Details) -> Tokens<'a> {
        Tokens {
            tokenizer: self,
            lines: lines(data),
            details,
            index: 0,
        }
    }

    /// Tokenizes `data` and hands every token that passes `details` to
    /// `callback`, in line order.
    pub fn process<F>(&self, data: &[u8], details: Details, mut callback: F)
    where
        F: FnMut(usize, Token),
    {
        for (index, token) in self.tokens(data, details) {
            callback(index, token);
        }
    }
}

/// Configures a [`Tokenizer`].
#[derive(Default)]
pub struct TokenizerBuilder {
    resolvers: Vec<Box<dyn TagResolver>>,
    base_url: Option<Url>,
}

impl TokenizerBuilder {
    /// Adds a resolver after the ones already registered.
    pub fn resolver(mut self, resolver: impl TagResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Base for resolving relative URI lines.
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Builds the tokenizer. Without explicit resolvers the
    /// [`ExtTagResolver`] is installed.
    pub fn build(self) -> Tokenizer {
        let resolvers = if self.resolvers.is_empty() {
            vec![Box::new(ExtTagResolver::new()) as Box<dyn TagResolver>]
        } else {
            self.resolvers
        };
        Tokenizer {
            resolvers,
            base_url: self.base_url,
        }
    }
}

/// Iterator returned by [`Tokenizer::tokens`].
pub struct Tokens<'a> {
    tokenizer: &'a Tokenizer,
    lines: Lines<'a>,
    details: Details,
    index: usize,
}

impl Iterator for Tokens<'_> {
    type Item = (usize, Token);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            let index = self.index;
            self.index += 1;

            if line.is_none() {
                warn!(line = index + 1, "skipping line that is not valid UTF-8");
            }
            if let Some(token) = self.tokenizer.classify_with(line, self.details) {
                return Some((index, token));
            }
        }
    }
}
