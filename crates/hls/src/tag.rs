use std::fmt;

use serde::Serialize;

use crate::attributes::{AttributeList, AttributeValue};

/// Names of the tags the built-in rules look at.
pub mod names {
    pub const VERSION: &str = "EXT-X-VERSION";
    pub const KEY: &str = "EXT-X-KEY";
    pub const EXTINF: &str = "EXTINF";
    pub const BYTERANGE: &str = "EXT-X-BYTERANGE";
    pub const I_FRAMES_ONLY: &str = "EXT-X-I-FRAMES-ONLY";
    pub const MAP: &str = "EXT-X-MAP";
    pub const MEDIA: &str = "EXT-X-MEDIA";
    pub const ALLOW_CACHE: &str = "EXT-X-ALLOW-CACHE";
    pub const STREAM_INF: &str = "EXT-X-STREAM-INF";
    pub const I_FRAME_STREAM_INF: &str = "EXT-X-I-FRAME-STREAM-INF";
}

/// What follows the `:` of an `#EXT` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPayload {
    /// `#EXTM3U`
    None,
    /// `#EXT-X-VERSION:7`
    Value(String),
    /// `#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aac"`
    Attributes(AttributeList),
}

/// A generic `#EXT` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtTag {
    pub raw: String,
    pub name: String,
    pub payload: TagPayload,
}

impl ExtTag {
    pub fn value(&self) -> Option<&str> {
        match &self.payload {
            TagPayload::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&AttributeList> {
        match &self.payload {
            TagPayload::Attributes(attributes) => Some(attributes),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes().and_then(|attributes| attributes.get(name))
    }
}

/// `#EXTINF:<duration>,[<title>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtInfTag {
    pub raw: String,
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

/// A resolved playlist tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tag {
    Ext(ExtTag),
    ExtInf(ExtInfTag),
}

impl Tag {
    /// Tag name without the leading `#`.
    pub fn name(&self) -> &str {
        match self {
            Tag::Ext(tag) => &tag.name,
            Tag::ExtInf(tag) => &tag.name,
        }
    }

    /// The source line, verbatim.
    pub fn raw(&self) -> &str {
        match self {
            Tag::Ext(tag) => &tag.raw,
            Tag::ExtInf(tag) => &tag.raw,
        }
    }

    pub fn attributes(&self) -> Option<&AttributeList> {
        match self {
            Tag::Ext(tag) => tag.attributes(),
            Tag::ExtInf(_) => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes().and_then(|attributes| attributes.get(name))
    }
}

impl fmt::Display for ExtTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            TagPayload::None => f.write_str(&self.name),
            TagPayload::Value(value) => write!(f, "{}:{}", self.name, value),
            TagPayload::Attributes(attributes) => write!(f, "{}:{}", self.name, attributes),
        }
    }
}

impl fmt::Display for ExtInfTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value)?;
        if let Some(description) = &self.description {
            write!(f, ",{description}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Ext(tag) => tag.fmt(f),
            Tag::ExtInf(tag) => tag.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_source() {
        let mut attributes = AttributeList::new();
        attributes
            .insert("TYPE".to_string(), AttributeValue::Enumerated("AUDIO".to_string()))
            .unwrap();
        attributes
            .insert("GROUP-ID".to_string(), AttributeValue::Quoted("aac".to_string()))
            .unwrap();
        let tag = Tag::Ext(ExtTag {
            raw: "#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aac\"".to_string(),
            name: names::MEDIA.to_string(),
            payload: TagPayload::Attributes(attributes),
        });
        assert_eq!(tag.to_string(), "EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aac\"");
        assert_eq!(tag.attribute("GROUP-ID").map(AttributeValue::as_str), Some("aac"));

        let tag = Tag::ExtInf(ExtInfTag {
            raw: "#EXTINF:10.5,Title".to_string(),
            name: names::EXTINF.to_string(),
            value: "10.5".to_string(),
            description: Some("Title".to_string()),
        });
        assert_eq!(tag.to_string(), "EXTINF:10.5,Title");
        assert_eq!(tag.raw(), "#EXTINF:10.5,Title");
        assert!(tag.attributes().is_none());
    }

    #[test]
    fn test_bare_and_value_tags() {
        let bare = ExtTag {
            raw: "#EXTM3U".to_string(),
            name: "EXTM3U".to_string(),
            payload: TagPayload::None,
        };
        assert_eq!(bare.to_string(), "EXTM3U");
        assert!(bare.value().is_none());

        let version = ExtTag {
            raw: "#EXT-X-VERSION:7".to_string(),
            name: names::VERSION.to_string(),
            payload: TagPayload::Value("7".to_string()),
        };
        assert_eq!(version.value(), Some("7"));
        assert!(version.attributes().is_none());
    }
}
