//! Seed token resolution
//!
//! The OGP image is seeded by a short revision token: an explicit token wins,
//! otherwise the current git commit, otherwise a fixed fallback. Whatever the
//! source, the token is cut to 7 characters and fed through the same
//! generation path.

use std::process::{Command, Stdio};

use crate::consts::{DEFAULT_SEED_TOKEN, SEED_TOKEN_LEN};

/// Where a seed token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    Explicit,
    Git,
    Fallback,
}

/// Resolved, normalized seed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedToken {
    pub token: String,
    pub source: SeedSource,
}

/// Keep the first 7 characters; shorter tokens pass through verbatim
pub fn normalize_token(token: &str) -> String {
    token.chars().take(SEED_TOKEN_LEN).collect()
}

/// Short hash of `HEAD`, or `None` when git is unavailable
pub fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!hash.is_empty()).then_some(hash)
}

/// Resolve using git for the environment lookup
pub fn resolve_seed(explicit: Option<&str>) -> SeedToken {
    resolve_seed_with(explicit, git_short_hash)
}

/// Resolve with an injectable environment lookup
pub fn resolve_seed_with(explicit: Option<&str>, lookup: impl FnOnce() -> Option<String>) -> SeedToken {
    if let Some(token) = explicit.filter(|t| !t.is_empty()) {
        return SeedToken {
            token: normalize_token(token),
            source: SeedSource::Explicit,
        };
    }
    match lookup() {
        Some(hash) => SeedToken {
            token: normalize_token(&hash),
            source: SeedSource::Git,
        },
        None => {
            log::warn!(
                "Could not read git commit hash, using fallback seed `{}`",
                DEFAULT_SEED_TOKEN
            );
            SeedToken {
                token: DEFAULT_SEED_TOKEN.to_string(),
                source: SeedSource::Fallback,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation() {
        assert_eq!(normalize_token("0123456789abcdef"), "0123456");
        assert_eq!(normalize_token("abc1234"), "abc1234");
        assert_eq!(normalize_token("abc"), "abc");
        assert_eq!(normalize_token(""), "");
        // Character-wise, never splits a code point
        assert_eq!(normalize_token("ßßßßßßßßß"), "ßßßßßßß");
    }

    #[test]
    fn test_explicit_wins() {
        let seed = resolve_seed_with(Some("deadbeefcafe"), || panic!("lookup must not run"));
        assert_eq!(seed.token, "deadbee");
        assert_eq!(seed.source, SeedSource::Explicit);
    }

    #[test]
    fn test_empty_explicit_falls_through() {
        let seed = resolve_seed_with(Some(""), || Some("1a2b3c4d5e".to_string()));
        assert_eq!(seed.token, "1a2b3c4");
        assert_eq!(seed.source, SeedSource::Git);
    }

    #[test]
    fn test_fallback() {
        let seed = resolve_seed_with(None, || None);
        assert_eq!(seed.token, "dev");
        assert_eq!(seed.source, SeedSource::Fallback);
    }
}
