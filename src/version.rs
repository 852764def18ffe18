//! Git tag to version triple.
//!
//! Accepted grammar: `[v]MAJOR.MINOR.PATCH[-suffix][.anything...]`. Only one leading `v` is
//! stripped, anything after the first `-` in the patch segment is discarded, and tokens past
//! the third are ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionTriple {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        VersionTriple {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionTriple {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_version(s)
    }
}

/// Parse a git tag such as `v2.10.4` or `2.10.4-beta.1` into its version triple.
pub fn parse_version(tag: &str) -> Result<VersionTriple, ParseError> {
    let err = || ParseError {
        tag: tag.to_string(),
    };

    let trimmed = tag.strip_prefix('v').unwrap_or(tag);
    let mut tokens = trimmed.split('.');
    let (Some(major), Some(minor), Some(patch_segment)) =
        (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(err());
    };

    let patch = match patch_segment.split_once('-') {
        Some((prefix, _suffix)) => prefix,
        None => patch_segment,
    };

    Ok(VersionTriple {
        major: parse_component(major).ok_or_else(err)?,
        minor: parse_component(minor).ok_or_else(err)?,
        patch: parse_component(patch).ok_or_else(err)?,
    })
}

/// `u32::from_str` accepts a leading `+`, so digits are checked first.
fn parse_component(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_prefixed_tags() {
        assert_eq!(parse_version("v1.2.3").unwrap(), VersionTriple::new(1, 2, 3));
        assert_eq!(parse_version("1.2.3").unwrap(), VersionTriple::new(1, 2, 3));
        assert_eq!(
            parse_version("v2.10.4").unwrap(),
            VersionTriple::new(2, 10, 4)
        );
        assert_eq!(parse_version("0.0.0").unwrap(), VersionTriple::default());
    }

    #[test]
    fn test_suffix_is_discarded() {
        assert_eq!(
            parse_version("v1.2.3-rc1").unwrap(),
            VersionTriple::new(1, 2, 3)
        );
        // The suffix may contain dots; they become extra tokens that are ignored.
        assert_eq!(
            parse_version("v2.10.4-beta.1").unwrap(),
            VersionTriple::new(2, 10, 4)
        );
        // Only the first `-` is considered.
        assert_eq!(
            parse_version("1.2.3-rc-1").unwrap(),
            VersionTriple::new(1, 2, 3)
        );
    }

    #[test]
    fn test_extra_tokens_ignored() {
        assert_eq!(
            parse_version("v1.2.3.4").unwrap(),
            VersionTriple::new(1, 2, 3)
        );
        assert_eq!(
            parse_version("1.2.3.whatever").unwrap(),
            VersionTriple::new(1, 2, 3)
        );
    }

    #[test]
    fn test_only_one_v_is_stripped() {
        assert!(parse_version("vv1.2.3").is_err());
        assert!(parse_version("V1.2.3").is_err());
    }

    #[test]
    fn test_too_few_tokens() {
        for tag in ["", "v", "1", "v1.2", "1.2-rc1"] {
            let err = parse_version(tag).unwrap_err();
            assert_eq!(err.tag, tag);
        }
    }

    #[test]
    fn test_non_numeric_components() {
        for tag in [
            "notasemver",
            "va.b.c",
            "v1.x.3",
            "v1.2.x",
            "v1.2.-rc1",
            "v1..3",
            "v+1.2.3",
            "v-1.2.3",
            "v1.2. 3",
            "release-1.2.3",
        ] {
            let err = parse_version(tag).unwrap_err();
            assert_eq!(err.tag, tag, "tag {tag:?} should carry itself in the error");
        }
    }

    #[test]
    fn test_integer_range() {
        let max = u32::MAX;
        assert_eq!(
            parse_version(&format!("v{max}.{max}.{max}")).unwrap(),
            VersionTriple::new(max, max, max)
        );
        assert!(parse_version("v4294967296.0.0").is_err());
    }

    #[test]
    fn test_leading_zeros_are_decimal() {
        assert_eq!(
            parse_version("v01.002.0003").unwrap(),
            VersionTriple::new(1, 2, 3)
        );
    }

    #[test]
    fn test_display_and_from_str() {
        let v: VersionTriple = "v3.1.4-hotfix".parse().unwrap();
        assert_eq!(v.to_string(), "3.1.4");
    }
}
