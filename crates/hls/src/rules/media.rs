//! `EXT-X-MEDIA` rendition checks.
//!
//! Renditions are grouped by `(TYPE, GROUP-ID)`. Each new rendition is
//! checked on its own and against the renditions already in its group, then
//! joins the group.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::{Diagnostic, PlaylistRule};
use crate::attributes::AttributeList;
use crate::tag::{Tag, names};
use crate::token::Token;

const TYPE: &str = "TYPE";
const GROUP_ID: &str = "GROUP-ID";
const NAME: &str = "NAME";
const DEFAULT: &str = "DEFAULT";
const AUTOSELECT: &str = "AUTOSELECT";
const FORCED: &str = "FORCED";
const INSTREAM_ID: &str = "INSTREAM-ID";
const URI: &str = "URI";
const CHANNELS: &str = "CHANNELS";

/// Problems found by [`MediaRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaIssue {
    MissingAttributeList,
    UnsupportedType { value: String },
    Missing { attribute: &'static str },
    Unexpected { attribute: &'static str },
    UnexpectedValue { value: String, attribute: &'static str },
    Nonunique { value: String, attribute: &'static str },
}

impl fmt::Display for MediaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaIssue::MissingAttributeList => write!(f, "EXT-X-MEDIA without attributes"),
            MediaIssue::UnsupportedType { value } => write!(f, "unsupported TYPE {value}"),
            MediaIssue::Missing { attribute } => write!(f, "missing {attribute}"),
            MediaIssue::Unexpected { attribute } => write!(f, "{attribute} not allowed here"),
            MediaIssue::UnexpectedValue { value, attribute } => {
                write!(f, "unexpected {attribute} value {value}")
            }
            MediaIssue::Nonunique { value, attribute } => {
                write!(f, "{attribute}={value} already used in this group")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaType {
    Audio,
    Video,
    Subtitles,
    ClosedCaptions,
}

impl MediaType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "AUDIO" => Some(MediaType::Audio),
            "VIDEO" => Some(MediaType::Video),
            "SUBTITLES" => Some(MediaType::Subtitles),
            "CLOSED-CAPTIONS" => Some(MediaType::ClosedCaptions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Rendition {
    name: Option<String>,
    default: bool,
}

/// Checks `EXT-X-MEDIA` renditions and their groups.
#[derive(Debug, Default)]
pub struct MediaRule {
    groups: HashMap<(String, String), Vec<Rendition>>,
}

impl MediaRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of renditions recorded for `(media_type, group_id)`.
    pub fn group_len(&self, media_type: &str, group_id: &str) -> usize {
        self.groups
            .get(&(media_type.to_string(), group_id.to_string()))
            .map_or(0, Vec::len)
    }

    fn check(&mut self, tag: &Tag, report: &mut dyn FnMut(MediaIssue, bool)) {
        let Some(attributes) = tag.attributes() else {
            report(MediaIssue::MissingAttributeList, true);
            return;
        };
        let Some(media_type) = attributes.get_str(TYPE) else {
            report(MediaIssue::Missing { attribute: TYPE }, true);
            return;
        };
        let group_id = attributes.get_str(GROUP_ID);
        if group_id.is_none() {
            report(MediaIssue::Missing { attribute: GROUP_ID }, true);
        }

        let key = group_id.map(|group_id| (media_type.to_string(), group_id.to_string()));
        let group = key
            .as_ref()
            .and_then(|key| self.groups.get(key))
            .map_or(&[][..], Vec::as_slice);

        let name = attributes.get_str(NAME);
        match name {
            None => report(MediaIssue::Missing { attribute: NAME }, true),
            Some(name) => {
                if group.iter().any(|r| r.name.as_deref() == Some(name)) {
                    report(
                        MediaIssue::Nonunique {
                            value: name.to_string(),
                            attribute: NAME,
                        },
                        true,
                    );
                }
            }
        }

        let default = match attributes.get_str(DEFAULT) {
            None | Some("NO") => false,
            Some("YES") => true,
            Some(other) => {
                report(
                    MediaIssue::UnexpectedValue {
                        value: other.to_string(),
                        attribute: DEFAULT,
                    },
                    true,
                );
                false
            }
        };
        if default {
            if group.iter().any(|r| r.default) {
                report(
                    MediaIssue::Nonunique {
                        value: "YES".to_string(),
                        attribute: DEFAULT,
                    },
                    true,
                );
            }
            if let Some(autoselect) = attributes.get_str(AUTOSELECT)
                && autoselect != "YES"
            {
                report(
                    MediaIssue::UnexpectedValue {
                        value: autoselect.to_string(),
                        attribute: AUTOSELECT,
                    },
                    true,
                );
            }
        }

        match MediaType::parse(media_type) {
            Some(MediaType::Audio) => {
                forbid(attributes, &[FORCED, INSTREAM_ID], report);
                if !attributes.contains(CHANNELS) {
                    report(MediaIssue::Missing { attribute: CHANNELS }, false);
                }
            }
            Some(MediaType::Video) => forbid(attributes, &[FORCED, INSTREAM_ID], report),
            Some(MediaType::Subtitles) => {
                if !attributes.contains(URI) {
                    report(MediaIssue::Missing { attribute: URI }, true);
                }
                forbid(attributes, &[INSTREAM_ID], report);
            }
            Some(MediaType::ClosedCaptions) => {
                forbid(attributes, &[URI, FORCED], report);
                match attributes.get_str(INSTREAM_ID) {
                    None => report(MediaIssue::Missing { attribute: INSTREAM_ID }, true),
                    Some(instream) if !is_valid_instream_id(instream) => report(
                        MediaIssue::UnexpectedValue {
                            value: instream.to_string(),
                            attribute: INSTREAM_ID,
                        },
                        true,
                    ),
                    Some(_) => {}
                }
            }
            None => report(
                MediaIssue::UnsupportedType {
                    value: media_type.to_string(),
                },
                true,
            ),
        }

        if let Some(key) = key {
            self.groups.entry(key).or_default().push(Rendition {
                name: name.map(str::to_string),
                default,
            });
        }
    }
}

fn forbid(
    attributes: &AttributeList,
    forbidden: &[&'static str],
    report: &mut dyn FnMut(MediaIssue, bool),
) {
    for &attribute in forbidden {
        if attributes.contains(attribute) {
            report(MediaIssue::Unexpected { attribute }, true);
        }
    }
}

/// `CC1` to `CC4`, or a `SERVICEn` caption service.
fn is_valid_instream_id(value: &str) -> bool {
    matches!(value, "CC1" | "CC2" | "CC3" | "CC4") || value.starts_with("SERVICE")
}

impl PlaylistRule for MediaRule {
    fn observe(&mut self, token: &Token, index: usize, sink: &mut dyn FnMut(Diagnostic)) {
        let Token::Tag(tag) = token else {
            return;
        };
        if tag.name() != names::MEDIA {
            return;
        }

        let rule = self.name();
        self.check(tag, &mut |issue, is_error| {
            let diagnostic = if is_error {
                Diagnostic::error(rule, index, tag, issue)
            } else {
                Diagnostic::warning(rule, index, tag, issue)
            };
            sink(diagnostic);
        });
    }

    fn name(&self) -> &'static str {
        "media"
    }
}
