use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::TokenizerError;
use crate::tag::Tag;

/// A URI line of the playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Uri {
    /// Has a scheme, or was resolved against the tokenizer's base URL.
    Absolute(Url),
    /// A relative reference with no base to resolve it against.
    Relative(String),
}

impl Uri {
    /// Characters that can never appear in a URI reference.
    fn is_forbidden(character: char) -> bool {
        character.is_whitespace()
            || character.is_control()
            || matches!(character, '"' | '<' | '>' | '\\' | '^' | '`' | '{' | '|' | '}')
    }

    /// Parses a URI line, resolving relative references against `base`.
    ///
    /// Returns `None` when `line` is not a URI reference.
    pub fn parse(line: &str, base: Option<&Url>) -> Option<Self> {
        if line.is_empty() || line.chars().any(Self::is_forbidden) {
            return None;
        }

        match Url::parse(line) {
            Ok(url) => Some(Uri::Absolute(url)),
            Err(url::ParseError::RelativeUrlWithoutBase) => match base {
                Some(base) => base.join(line).ok().map(Uri::Absolute),
                None => Some(Uri::Relative(line.to_string())),
            },
            Err(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Uri::Absolute(url) => url.as_str(),
            Uri::Relative(reference) => reference,
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified playlist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "token", content = "data", rename_all = "snake_case")]
pub enum Token {
    Tag(Tag),
    Uri(Uri),
    Comment(String),
    BlankLine,
    Error(TokenizerError),
}

impl Token {
    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Token::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Token::Error(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Tag(tag) => write!(f, "TAG - {tag}"),
            Token::Uri(uri) => write!(f, "URI - {uri}"),
            Token::Comment(comment) => write!(f, "CMT - {comment}"),
            Token::BlankLine => f.write_str("BLN"),
            Token::Error(error) => write!(f, "ERR - {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_uri() {
        let uri = Uri::parse("https://example.com/live/index.m3u8", None).unwrap();
        assert!(matches!(uri, Uri::Absolute(_)));
        assert_eq!(uri.as_str(), "https://example.com/live/index.m3u8");
    }

    #[test]
    fn test_relative_uri() {
        let uri = Uri::parse("test-video=252000.m3u8?vbegin=1538555580", None).unwrap();
        assert_eq!(
            uri,
            Uri::Relative("test-video=252000.m3u8?vbegin=1538555580".to_string())
        );
    }

    #[test]
    fn test_relative_uri_with_base() {
        let base = Url::parse("https://example.com/live/master.m3u8").unwrap();
        let uri = Uri::parse("video/720p.m3u8", Some(&base)).unwrap();
        assert_eq!(uri.as_str(), "https://example.com/live/video/720p.m3u8");
    }

    #[test]
    fn test_invalid_uri() {
        assert!(Uri::parse("not a uri", None).is_none());
        assert!(Uri::parse("segment{1}.ts", None).is_none());
        assert!(Uri::parse("http://[::1", None).is_none());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::BlankLine.to_string(), "BLN");
        assert_eq!(
            Token::Comment("# variants".to_string()).to_string(),
            "CMT - # variants"
        );
        assert_eq!(
            Token::Uri(Uri::Relative("a.ts".to_string())).to_string(),
            "URI - a.ts"
        );
    }
}
