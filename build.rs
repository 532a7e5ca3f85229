//! Build script exporting git metadata for the dashboard header.
//!
//! Demo recordings should always show the commit they were built from, so the
//! short SHA is baked into the binary at compile time. Builds outside a git
//! checkout get "unknown" rather than failing.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    let sha = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let sha = if sha.is_empty() { "unknown".to_string() } else { sha };
    println!("cargo:rustc-env=GIT_SHA={sha}");
}
