//! Protocol version compatibility.
//!
//! A playlist declares its protocol version once with `EXT-X-VERSION`. Some
//! tags and attributes need a minimum version and some were removed in later
//! versions; this rule checks each of them against the version declared so
//! far.

use std::fmt;

use serde::Serialize;

use super::{Diagnostic, PlaylistRule};
use crate::tag::{Tag, names};
use crate::token::Token;

/// Problems found by [`VersionRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionIssue {
    /// `EXT-X-VERSION` without a single integer value.
    MalformedVersionTag,
    /// A second `EXT-X-VERSION` tag.
    MultipleVersions,
    /// The tag needs a newer version than the one declared. `reported` is
    /// `None` when no version was declared before the tag.
    IncompatibleTag { required: u32, reported: Option<u32> },
    /// The tag was removed in version `removed_in`.
    DeprecatedTag { removed_in: u32, reported: Option<u32> },
}

impl fmt::Display for VersionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionIssue::MalformedVersionTag => write!(f, "malformed EXT-X-VERSION tag"),
            VersionIssue::MultipleVersions => write!(f, "multiple EXT-X-VERSION tags"),
            VersionIssue::IncompatibleTag {
                required,
                reported: Some(reported),
            } => write!(f, "requires version {required}, playlist declares {reported}"),
            VersionIssue::IncompatibleTag {
                required,
                reported: None,
            } => write!(f, "requires version {required}, no version declared"),
            VersionIssue::DeprecatedTag {
                removed_in,
                reported,
            } => {
                write!(f, "removed in version {removed_in}")?;
                if let Some(reported) = reported {
                    write!(f, ", playlist declares {reported}")?;
                }
                Ok(())
            }
        }
    }
}

/// Checks version-gated tags against the declared `EXT-X-VERSION`.
#[derive(Debug, Default)]
pub struct VersionRule {
    declared_version: Option<u32>,
    i_frames_only: bool,
}

impl VersionRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// The version declared so far.
    pub fn declared_version(&self) -> Option<u32> {
        self.declared_version
    }

    fn require(&self, required: u32) -> Option<VersionIssue> {
        match self.declared_version {
            Some(version) if version >= required => None,
            reported => Some(VersionIssue::IncompatibleTag { required, reported }),
        }
    }

    fn removed_in(&self, removed_in: u32) -> Option<VersionIssue> {
        match self.declared_version {
            Some(version) if version >= removed_in => Some(VersionIssue::DeprecatedTag {
                removed_in,
                reported: Some(version),
            }),
            _ => None,
        }
    }

    fn check(&mut self, tag: &Tag) -> Option<VersionIssue> {
        match tag.name() {
            names::VERSION => self.declare(tag),
            // KEYFORMAT and KEYFORMATVERSIONS need 5, IV alone needs 2
            names::KEY => {
                if tag.attribute("KEYFORMAT").is_some()
                    && tag.attribute("KEYFORMATVERSIONS").is_some()
                {
                    self.require(5)
                } else if tag.attribute("IV").is_some() {
                    self.require(2)
                } else {
                    None
                }
            }
            names::EXTINF => match tag {
                Tag::ExtInf(extinf) if is_floating_point(&extinf.value) => self.require(3),
                _ => None,
            },
            names::BYTERANGE => self.require(4),
            names::I_FRAMES_ONLY => {
                self.i_frames_only = true;
                self.require(4)
            }
            names::MAP => {
                if self.i_frames_only {
                    self.require(5)
                } else {
                    self.require(6)
                }
            }
            names::MEDIA => match tag.attribute("INSTREAM-ID") {
                Some(instream) if instream.as_str().contains("SERVICE") => self.require(7),
                _ => None,
            },
            names::STREAM_INF | names::I_FRAME_STREAM_INF => {
                if tag.attribute("PROGRAM-ID").is_some() {
                    self.removed_in(6)
                } else {
                    None
                }
            }
            names::ALLOW_CACHE => self.removed_in(7),
            _ => None,
        }
    }

    fn declare(&mut self, tag: &Tag) -> Option<VersionIssue> {
        let version = match tag {
            Tag::Ext(ext) => ext.value().and_then(|value| value.parse::<u32>().ok()),
            Tag::ExtInf(_) => None,
        };
        let Some(version) = version else {
            return Some(VersionIssue::MalformedVersionTag);
        };
        if self.declared_version.is_some() {
            return Some(VersionIssue::MultipleVersions);
        }
        self.declared_version = Some(version);
        None
    }
}

/// An EXTINF duration written as a decimal fraction: digits around a single
/// `.`, optionally signed. Exponents and `inf`/`NaN` do not count.
fn is_floating_point(duration: &str) -> bool {
    let unsigned = duration.strip_prefix('-').unwrap_or(duration);
    let Some((whole, fraction)) = unsigned.split_once('.') else {
        return false;
    };
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    !(whole.is_empty() && fraction.is_empty()) && digits(whole) && digits(fraction)
}

impl PlaylistRule for VersionRule {
    fn observe(&mut self, token: &Token, index: usize, sink: &mut dyn FnMut(Diagnostic)) {
        let Token::Tag(tag) = token else {
            return;
        };
        if let Some(issue) = self.check(tag) {
            sink(Diagnostic::error(self.name(), index, tag, issue));
        }
    }

    fn name(&self) -> &'static str {
        "version"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run;

    fn issues(playlist: &str) -> Vec<(usize, VersionIssue)> {
        run(VersionRule::new(), playlist)
            .into_iter()
            .map(|diagnostic| match diagnostic.issue {
                crate::rules::Issue::Version(issue) => (diagnostic.index, issue),
                other => panic!("unexpected issue {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_declared_version_satisfies_requirement() {
        let playlist = "#EXTM3U
#EXT-X-VERSION:7
#EXT-X-KEY:METHOD=SAMPLE-AES,URI=\"skd://key\",KEYFORMAT=\"com.apple.streamingkeydelivery\",KEYFORMATVERSIONS=\"1\"
#EXT-X-MAP:URI=\"init.mp4\"
#EXTINF:9.009,
segment.m4s";
        assert!(issues(playlist).is_empty());
    }

    #[test]
    fn test_gated_tag_before_declaration() {
        let playlist = "#EXTM3U
#EXT-X-KEY:METHOD=SAMPLE-AES,URI=\"skd://key\",KEYFORMAT=\"com.apple\",KEYFORMATVERSIONS=\"1\"
#EXT-X-VERSION:7";
        assert_eq!(
            issues(playlist),
            vec![(
                1,
                VersionIssue::IncompatibleTag {
                    required: 5,
                    reported: None
                }
            )]
        );
    }

    #[test]
    fn test_multiple_versions() {
        let playlist = "#EXT-X-VERSION:3\n#EXT-X-VERSION:3";
        assert_eq!(issues(playlist), vec![(1, VersionIssue::MultipleVersions)]);
    }

    #[test]
    fn test_malformed_version() {
        let playlist = "#EXT-X-VERSION:three\n#EXT-X-VERSION:VER=\"TEST\"\n#EXT-X-VERSION:4";
        assert_eq!(
            issues(playlist),
            vec![
                (0, VersionIssue::MalformedVersionTag),
                (1, VersionIssue::MalformedVersionTag)
            ]
        );
    }

    #[test]
    fn test_floating_point_extinf() {
        let playlist = "#EXT-X-VERSION:2\n#EXTINF:10,\na.ts\n#EXTINF:10.5,Title\nb.ts";
        assert_eq!(
            issues(playlist),
            vec![(
                3,
                VersionIssue::IncompatibleTag {
                    required: 3,
                    reported: Some(2)
                }
            )]
        );
    }

    #[test]
    fn test_key_iv_needs_version_two() {
        let playlist = "#EXT-X-VERSION:1\n#EXT-X-KEY:METHOD=AES-128,URI=\"k\",IV=0x1234";
        assert_eq!(
            issues(playlist),
            vec![(
                1,
                VersionIssue::IncompatibleTag {
                    required: 2,
                    reported: Some(1)
                }
            )]
        );
    }

    #[test]
    fn test_byterange_and_iframes_only() {
        let playlist = "#EXT-X-VERSION:3\n#EXT-X-I-FRAMES-ONLY\n#EXT-X-BYTERANGE:1000@0";
        assert_eq!(
            issues(playlist),
            vec![
                (
                    1,
                    VersionIssue::IncompatibleTag {
                        required: 4,
                        reported: Some(3)
                    }
                ),
                (
                    2,
                    VersionIssue::IncompatibleTag {
                        required: 4,
                        reported: Some(3)
                    }
                )
            ]
        );
    }

    #[test]
    fn test_map_depends_on_iframes_only() {
        let playlist = "#EXT-X-VERSION:5\n#EXT-X-MAP:URI=\"init.mp4\"";
        assert_eq!(
            issues(playlist),
            vec![(
                1,
                VersionIssue::IncompatibleTag {
                    required: 6,
                    reported: Some(5)
                }
            )]
        );

        let playlist = "#EXT-X-VERSION:5\n#EXT-X-I-FRAMES-ONLY\n#EXT-X-MAP:URI=\"init.mp4\"";
        assert!(issues(playlist).is_empty());
    }

    #[test]
    fn test_service_instream_id() {
        let playlist = "#EXT-X-VERSION:6\n#EXT-X-MEDIA:TYPE=CLOSED-CAPTIONS,GROUP-ID=\"cc\",NAME=\"CC\",INSTREAM-ID=\"SERVICE3\"";
        assert_eq!(
            issues(playlist),
            vec![(
                1,
                VersionIssue::IncompatibleTag {
                    required: 7,
                    reported: Some(6)
                }
            )]
        );
    }

    #[test]
    fn test_program_id_removed_in_six() {
        let playlist = "#EXT-X-VERSION:6\n#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=1000\nlow.m3u8\n#EXT-X-I-FRAME-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=100,URI=\"i.m3u8\"";
        assert_eq!(
            issues(playlist),
            vec![
                (
                    1,
                    VersionIssue::DeprecatedTag {
                        removed_in: 6,
                        reported: Some(6)
                    }
                ),
                (
                    3,
                    VersionIssue::DeprecatedTag {
                        removed_in: 6,
                        reported: Some(6)
                    }
                )
            ]
        );

        let playlist = "#EXT-X-VERSION:5\n#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=1000\nlow.m3u8";
        assert!(issues(playlist).is_empty());
    }

    #[test]
    fn test_allow_cache_removed_in_seven() {
        assert_eq!(
            issues("#EXT-X-VERSION:7\n#EXT-X-ALLOW-CACHE:YES"),
            vec![(
                1,
                VersionIssue::DeprecatedTag {
                    removed_in: 7,
                    reported: Some(7)
                }
            )]
        );
        assert!(issues("#EXT-X-ALLOW-CACHE:YES").is_empty());
        assert!(issues("#EXT-X-VERSION:6\n#EXT-X-ALLOW-CACHE:YES").is_empty());
    }

    #[test]
    fn test_floating_point_detection() {
        assert!(is_floating_point("10.5"));
        assert!(is_floating_point("10.0"));
        assert!(!is_floating_point("10"));
        assert!(!is_floating_point("-1"));
        assert!(!is_floating_point("abc"));
        assert!(is_floating_point(".5"));
        assert!(!is_floating_point("."));
        assert!(!is_floating_point("1.2.3"));
        assert!(!is_floating_point("inf"));
        assert!(!is_floating_point("NaN"));
        assert!(!is_floating_point("1e1"));
        assert!(!is_floating_point("1.5e1"));
    }

    #[test]
    fn test_non_decimal_durations_need_no_version() {
        let playlist = "#EXT-X-VERSION:2\n#EXTINF:inf,\na.ts\n#EXTINF:1e1,\nb.ts\n#EXTINF:NaN,";
        assert!(issues(playlist).is_empty());
    }

    #[test]
    fn test_issue_display() {
        assert_eq!(
            VersionIssue::IncompatibleTag {
                required: 5,
                reported: None
            }
            .to_string(),
            "requires version 5, no version declared"
        );
        assert_eq!(
            VersionIssue::DeprecatedTag {
                removed_in: 7,
                reported: Some(7)
            }
            .to_string(),
            "removed in version 7, playlist declares 7"
        );
    }
}
