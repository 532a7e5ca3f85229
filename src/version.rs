//! Build identity shown in the dashboard header.

/// Short commit SHA baked in by the build script; "unknown" outside a git
/// checkout.
pub const GIT_SHA: &str = env!("GIT_SHA");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `"0.1.0 (abc123def456)"`, for headers and `--version` output.
pub fn long_version() -> String {
    format!("{VERSION} ({GIT_SHA})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_version_carries_both_parts() {
        let v = long_version();
        assert!(v.starts_with(VERSION));
        assert!(v.contains(GIT_SHA));
    }
}
