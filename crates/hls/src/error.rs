use serde::Serialize;

/// Errors raised while turning a single playlist line into a token.
///
/// Every variant carries the raw line it was raised for. These never abort a
/// pass: the tokenizer turns them into [`Token::Error`](crate::Token::Error)
/// and moves on to the next line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenizerError {
    /// A tag line without a name in front of its `:`.
    #[error("missing tag type in `{token}`")]
    MissingTagType { token: String },
    /// A line that is neither a tag, a comment nor a blank line and does not
    /// form a valid URI reference.
    #[error("invalid uri `{token}`")]
    InvalidUri { token: String },
    /// `=`, `,` or `"` found where the attribute-list grammar forbids it.
    /// `index` is the byte offset inside the attribute list.
    #[error("unexpected character '{character}' at index {index} in `{token}`")]
    UnexpectedCharacter {
        character: char,
        index: usize,
        token: String,
    },
    /// An EXTINF tag without its duration.
    #[error("missing value in EXTINF tag `{token}`")]
    MissingValueInExtinf { token: String },
    /// A single-value tag with zero or several values.
    #[error("expected exactly one value, found {count} in `{token}`")]
    UnexpectedValueCount { count: usize, token: String },
    /// An attribute list where the number of keys and values differ.
    #[error("{} keys but {} values in `{token}`", keys.len(), values.len())]
    KeyValueMismatch {
        keys: Vec<String>,
        values: Vec<String>,
        token: String,
    },
    /// A bare comma-separated value list outside of EXTINF.
    #[error("comma separated values are only allowed in EXTINF: `{token}`")]
    InvalidPatternInNonExtinf { token: String },
    /// The same attribute name appears twice in one attribute list.
    #[error("duplicate attribute {name} in `{token}`")]
    DuplicateAttribute { name: String, token: String },
}

impl TokenizerError {
    /// Stable numeric code for this kind of error.
    pub fn code(&self) -> u16 {
        match self {
            TokenizerError::MissingTagType { .. } => 1001,
            TokenizerError::InvalidUri { .. } => 1002,
            TokenizerError::UnexpectedCharacter { .. } => 1003,
            TokenizerError::MissingValueInExtinf { .. } => 1004,
            TokenizerError::UnexpectedValueCount { .. } => 1005,
            TokenizerError::KeyValueMismatch { .. } => 1006,
            TokenizerError::InvalidPatternInNonExtinf { .. } => 1007,
            TokenizerError::DuplicateAttribute { .. } => 1008,
        }
    }

    /// The raw line the error was raised for.
    pub fn token(&self) -> &str {
        match self {
            TokenizerError::MissingTagType { token }
            | TokenizerError::InvalidUri { token }
            | TokenizerError::UnexpectedCharacter { token, .. }
            | TokenizerError::MissingValueInExtinf { token }
            | TokenizerError::UnexpectedValueCount { token, .. }
            | TokenizerError::KeyValueMismatch { token, .. }
            | TokenizerError::InvalidPatternInNonExtinf { token }
            | TokenizerError::DuplicateAttribute { token, .. } => token,
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let cases = [
            (
                TokenizerError::MissingTagType {
                    token: "#:1".to_string(),
                },
                "missing tag type in `#:1`",
            ),
            (
                TokenizerError::UnexpectedCharacter {
                    character: '=',
                    index: 4,
                    token: "#EXT-X-A:A=1,B=".to_string(),
                },
                "unexpected character '=' at index 4 in `#EXT-X-A:A=1,B=`",
            ),
            (
                TokenizerError::UnexpectedValueCount {
                    count: 0,
                    token: "#EXT-X-VERSION:".to_string(),
                },
                "expected exactly one value, found 0 in `#EXT-X-VERSION:`",
            ),
            (
                TokenizerError::KeyValueMismatch {
                    keys: vec!["A".to_string(), "B".to_string()],
                    values: vec!["1".to_string()],
                    token: "#EXT-X-A:A=1,B=\"2".to_string(),
                },
                "2 keys but 1 values in `#EXT-X-A:A=1,B=\"2`",
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_error_codes_and_token() {
        let err = TokenizerError::InvalidPatternInNonExtinf {
            token: "#EXT-X-VERSION:CDE,".to_string(),
        };
        assert_eq!(err.code(), 1007);
        assert_eq!(err.token(), "#EXT-X-VERSION:CDE,");

        let err = TokenizerError::DuplicateAttribute {
            name: "TYPE".to_string(),
            token: "#EXT-X-MEDIA:TYPE=AUDIO,TYPE=VIDEO".to_string(),
        };
        assert_eq!(err.code(), 1008);
        assert_eq!(
            err.to_string(),
            "duplicate attribute TYPE in `#EXT-X-MEDIA:TYPE=AUDIO,TYPE=VIDEO`"
        );
    }
}
