//! Compile-time build information.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// One-line version banner used by `simulate --version`.
pub fn version_string() -> String {
    format!("droprate {} ({} {})", PKG_VERSION, BUILD_COMMIT, BUILD_DATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_commit_format() {
        // Should be 7 chars or "unknown"
        assert!(BUILD_COMMIT == "unknown" || BUILD_COMMIT.len() == 7);
    }

    #[test]
    fn test_build_date_format() {
        // YYYY-MM-DD unless overridden
        assert!(BUILD_DATE.len() == 10 || BUILD_DATE == "unknown");
    }

    #[test]
    fn test_version_string_mentions_package_version() {
        let banner = version_string();
        assert!(banner.starts_with("droprate "));
        assert!(banner.contains(PKG_VERSION));
        assert!(banner.contains(BUILD_COMMIT));
    }
}
