// Build script to inject the `slag --version` string from git tags,
// falling back to the package version when git is unavailable

use std::process::Command;

fn main() {
    let pkg_version = env!("CARGO_PKG_VERSION");
    let version = git_describe()
        .map(|described| version_from_describe(&described, pkg_version))
        .unwrap_or_else(|| pkg_version.to_string());

    println!("cargo:rustc-env=SLAG_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

/// `git describe --tags --always --dirty`, e.g. "v0.1.0", "v0.1.0-5-gabc123", "abc123-dirty"
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    Some(described.trim().to_string())
}

fn version_from_describe(described: &str, pkg_version: &str) -> String {
    match described.strip_prefix('v') {
        // Tagged: keep the tag's version, drop commit distance and dirty marker
        Some(tagged) => tagged.split('-').next().unwrap_or(tagged).to_string(),
        // Untagged: package version plus commit id
        None => format!("{}-{}", pkg_version, described),
    }
}
