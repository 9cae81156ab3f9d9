//! Build-time metadata embedded by the build script.
//!
//! Used for `--version` output and the `User-Agent` header.

/// The git commit hash at build time (short form).
pub const GIT_HASH: &str = env!("YASYNC_GIT_HASH");

/// The build profile (`debug` or `release`).
pub const BUILD_PROFILE: &str = env!("YASYNC_BUILD_PROFILE");

/// The crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version string including git hash and profile, e.g. `"0.1.0 (abc1234, debug)"`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("YASYNC_GIT_HASH"),
    ", ",
    env!("YASYNC_BUILD_PROFILE"),
    ")"
);

/// `User-Agent` sent with every request, e.g. `"yasync-cli/0.1.0"`.
pub const USER_AGENT: &str = concat!("yasync-cli/", env!("CARGO_PKG_VERSION"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_version_contains_parts() {
        assert!(LONG_VERSION.starts_with(VERSION));
        assert!(LONG_VERSION.contains(GIT_HASH));
        assert!(LONG_VERSION.contains(BUILD_PROFILE));
    }

    #[test]
    fn test_git_hash_not_empty() {
        assert!(!GIT_HASH.is_empty());
    }

    #[test]
    fn test_user_agent() {
        assert_eq!(USER_AGENT, format!("yasync-cli/{VERSION}"));
    }
}
