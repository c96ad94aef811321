//! Tag resolvers.
//!
//! A resolver claims a `#` line by prefix and turns it into a [`Tag`]. The
//! tokenizer offers every `#` line to its resolvers in order; a line no
//! resolver claims is a comment.

use tracing::trace;

use crate::attributes::{AttributeList, AttributeValue, Grammar, scan_collect};
use crate::error::TokenizerError;
use crate::tag::{ExtInfTag, ExtTag, Tag, TagPayload};

/// Recognizes and parses one family of tags.
pub trait TagResolver: Send + Sync {
    /// Whether this resolver is responsible for `line`.
    fn can_resolve(&self, line: &str) -> bool;

    /// Parses a line previously accepted by [`can_resolve`](Self::can_resolve).
    fn resolve(&self, line: &str) -> Result<Tag, TokenizerError>;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// Resolver for every `#EXT` tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtTagResolver;

impl ExtTagResolver {
    pub const PREFIX: &'static str = "#EXT";
    pub const EXTINF_PREFIX: &'static str = "EXTINF";

    pub fn new() -> Self {
        Self
    }

    fn resolve_extinf(line: &str, name: &str, values: &str) -> Result<Tag, TokenizerError> {
        let scanned = scan_collect(values, line, Grammar::ExtInf)?;
        let mut values = scanned.values.into_iter();

        let Some(value) = values.next() else {
            return Err(TokenizerError::MissingValueInExtinf {
                token: line.to_string(),
            });
        };
        let description = values.next().map(|description| description.text.to_string());

        Ok(Tag::ExtInf(ExtInfTag {
            raw: line.to_string(),
            name: name.to_string(),
            value: value.text.to_string(),
            description,
        }))
    }

    fn resolve_list(line: &str, name: &str, values: &str) -> Result<Tag, TokenizerError> {
        let scanned = scan_collect(values, line, Grammar::List)?;

        let payload = if scanned.keys.is_empty() {
            match scanned.values.as_slice() {
                [value] => TagPayload::Value(value.text.to_string()),
                values => {
                    return Err(TokenizerError::UnexpectedValueCount {
                        count: values.len(),
                        token: line.to_string(),
                    });
                }
            }
        } else {
            if scanned.keys.len() != scanned.values.len() {
                return Err(TokenizerError::KeyValueMismatch {
                    keys: scanned.keys.iter().map(|key| key.to_string()).collect(),
                    values: scanned
                        .values
                        .iter()
                        .map(|value| value.text.to_string())
                        .collect(),
                    token: line.to_string(),
                });
            }

            let mut attributes = AttributeList::new();
            for (key, value) in scanned.keys.into_iter().zip(scanned.values) {
                attributes
                    .insert(key.to_string(), AttributeValue::from(value))
                    .map_err(|duplicate| TokenizerError::DuplicateAttribute {
                        name: duplicate.name,
                        token: line.to_string(),
                    })?;
            }
            TagPayload::Attributes(attributes)
        };

        Ok(Tag::Ext(ExtTag {
            raw: line.to_string(),
            name: name.to_string(),
            payload,
        }))
    }
}

impl TagResolver for ExtTagResolver {
    fn can_resolve(&self, line: &str) -> bool {
        line.len() >= Self::PREFIX.len() && line.starts_with(Self::PREFIX)
    }

    fn resolve(&self, line: &str) -> Result<Tag, TokenizerError> {
        let body = line.strip_prefix('#').unwrap_or(line);

        let Some((name, values)) = body.split_once(':') else {
            if body.starts_with(Self::EXTINF_PREFIX) {
                return Err(TokenizerError::MissingValueInExtinf {
                    token: line.to_string(),
                });
            }
            return Ok(Tag::Ext(ExtTag {
                raw: line.to_string(),
                name: body.to_string(),
                payload: TagPayload::None,
            }));
        };

        // Only reachable when called directly; `can_resolve` needs `#EXT`.
        if name.is_empty() {
            return Err(TokenizerError::MissingTagType {
                token: line.to_string(),
            });
        }

        trace!(name, values, "resolving tag");
        if name.starts_with(Self::EXTINF_PREFIX) {
            Self::resolve_extinf(line, name, values)
        } else {
            Self::resolve_list(line, name, values)
        }
    }

    fn name(&self) -> &'static str {
        "ext-tag"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(line: &str) -> Result<Tag, TokenizerError> {
        let resolver = ExtTagResolver::new();
        assert!(resolver.can_resolve(line));
        resolver.resolve(line)
    }

    fn ext(line: &str) -> ExtTag {
        match resolve(line) {
            Ok(Tag::Ext(tag)) => tag,
            other => panic!("expected an ext tag for {line}, got {other:?}"),
        }
    }

    #[test]
    fn test_can_resolve() {
        let resolver = ExtTagResolver::new();
        assert!(resolver.can_resolve("#EXT"));
        assert!(resolver.can_resolve("#EXTM3U"));
        assert!(!resolver.can_resolve("#EX"));
        assert!(!resolver.can_resolve("# AUDIO groups"));
        assert!(!resolver.can_resolve("EXTM3U"));
    }

    #[test]
    fn test_bare_tag() {
        let tag = ext("#EXTM3U");
        assert_eq!(tag.name, "EXTM3U");
        assert_eq!(tag.payload, TagPayload::None);
        assert_eq!(tag.raw, "#EXTM3U");
    }

    #[test]
    fn test_single_value_tag() {
        let tag = ext("#EXT-X-MEDIA-SEQUENCE:266886250");
        assert_eq!(tag.name, "EXT-X-MEDIA-SEQUENCE");
        assert_eq!(tag.value(), Some("266886250"));
    }

    #[test]
    fn test_attribute_tag() {
        let tag = ext(
            "#EXT-X-STREAM-INF:BANDWIDTH=401000,CODECS=\"mp4a.40.2,avc1.4D400D\",RESOLUTION=384x216",
        );
        assert_eq!(tag.name, "EXT-X-STREAM-INF");
        let attributes = tag.attributes().unwrap();
        assert_eq!(attributes.len(), 3);
        assert_eq!(attributes.get_str("BANDWIDTH"), Some("401000"));
        assert_eq!(attributes.get_str("CODECS"), Some("mp4a.40.2,avc1.4D400D"));
        assert!(attributes.get("CODECS").unwrap().is_quoted());
        let names: Vec<_> = attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["BANDWIDTH", "CODECS", "RESOLUTION"]);
    }

    #[test]
    fn test_extinf() {
        match resolve("#EXTINF:10.5,Title").unwrap() {
            Tag::ExtInf(tag) => {
                assert_eq!(tag.name, "EXTINF");
                assert_eq!(tag.value, "10.5");
                assert_eq!(tag.description.as_deref(), Some("Title"));
            }
            other => panic!("expected EXTINF, got {other:?}"),
        }

        match resolve("#EXTINF:6,").unwrap() {
            Tag::ExtInf(tag) => {
                assert_eq!(tag.value, "6");
                assert!(tag.description.is_none());
            }
            other => panic!("expected EXTINF, got {other:?}"),
        }
    }

    #[test]
    fn test_extinf_requires_value() {
        assert!(matches!(
            resolve("#EXTINF"),
            Err(TokenizerError::MissingValueInExtinf { .. })
        ));
        assert!(matches!(
            resolve("#EXTINF:"),
            Err(TokenizerError::MissingValueInExtinf { .. })
        ));
    }

    #[test]
    fn test_unexpected_value_count() {
        assert!(matches!(
            resolve("#EXT-X-VERSION:"),
            Err(TokenizerError::UnexpectedValueCount { count: 0, .. })
        ));
    }

    #[test]
    fn test_key_value_mismatch() {
        match resolve("#EXT-X-VERSION:VER=1=2") {
            Err(TokenizerError::KeyValueMismatch { keys, values, .. }) => {
                assert_eq!(keys, vec!["VER", "1"]);
                assert_eq!(values, vec!["2"]);
            }
            other => panic!("expected a key/value mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_attribute() {
        assert!(matches!(
            resolve("#EXT-X-MEDIA:TYPE=AUDIO,TYPE=VIDEO"),
            Err(TokenizerError::DuplicateAttribute { name, .. }) if name == "TYPE"
        ));
    }

    #[test]
    fn test_scanner_errors_carry_the_line() {
        let err = resolve("#EXT-X-ERROR:VER\"http\"").unwrap_err();
        assert_eq!(err.token(), "#EXT-X-ERROR:VER\"http\"");
        assert!(matches!(
            err,
            TokenizerError::UnexpectedCharacter {
                character: '"',
                index: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_tag_name() {
        let resolver = ExtTagResolver::new();
        assert!(!resolver.can_resolve("#:foo"));
        assert!(matches!(
            resolver.resolve("#:foo"),
            Err(TokenizerError::MissingTagType { token }) if token == "#:foo"
        ));
    }

    #[test]
    fn test_names_are_kept_verbatim() {
        let tag = ext("#EXT-X-A:a b=1");
        assert_eq!(tag.attributes().unwrap().get_str("a b"), Some("1"));

        match resolve("#EXTINF :1,").unwrap() {
            Tag::ExtInf(tag) => assert_eq!(tag.name, "EXTINF "),
            other => panic!("expected EXTINF, got {other:?}"),
        }
    }

    #[test]
    fn test_value_may_contain_colon() {
        let tag = ext("#EXT-X-PROGRAM-DATE-TIME:2018-10-03T08:33:00.000Z");
        assert_eq!(tag.value(), Some("2018-10-03T08:33:00.000Z"));
    }
}
