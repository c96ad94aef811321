//! HLS (HTTP Live Streaming) playlist tokenizer and conformance checker.
//!
//! A playlist buffer is split into lines and every line becomes exactly one
//! [`Token`]: a resolved [`Tag`], a [`Uri`], a comment, a blank line or an
//! error. A [`RuleEngine`] can watch the token sequence and report protocol
//! problems as [`Diagnostic`]s without changing it.
//!
//! ```
//! use hls::{Details, Token, Tokenizer};
//!
//! let tokenizer = Tokenizer::default();
//! let tags = tokenizer
//!     .tokens(b"#EXTM3U\n#EXT-X-VERSION:7\nsegment.ts", Details::Complete)
//!     .filter(|(_, token)| matches!(token, Token::Tag(_)))
//!     .count();
//! assert_eq!(tags, 2);
//! ```
//!
//! ## License
//!
//! MIT License
//!
//! ## Authors
//!
//! - hua0512
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]

pub mod analyzer;
pub mod attributes;
pub mod error;
pub mod lines;
pub mod resolver;
pub mod rules;
pub mod tag;
pub mod token;
pub mod tokenizer;

#[cfg(test)]
mod test_utils;

pub use analyzer::{Analysis, PlaylistAnalyzer, TokenStats};
pub use attributes::{Attribute, AttributeList, AttributeValue};
pub use error::TokenizerError;
pub use resolver::{ExtTagResolver, TagResolver};
pub use rules::{
    Diagnostic, Issue, MediaIssue, MediaRule, PlaylistRule, RuleEngine, Severity, VersionIssue,
    VersionRule,
};
pub use tag::{ExtInfTag, ExtTag, Tag, TagPayload};
pub use token::{Token, Uri};
pub use tokenizer::{Details, Tokenizer, TokenizerBuilder, Tokens};
