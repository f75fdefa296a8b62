use std::path::PathBuf;
use std::process::Command;

/// Stamp `--version` with the short commit hash, or "unknown" outside git.
fn main() {
    let root = std::env::var("CARGO_MANIFEST_DIR")
        .map(|d| PathBuf::from(d).join(".."))
        .unwrap_or_else(|_| PathBuf::from(".."));

    let sha = Command::new("git")
        .arg("-C")
        .arg(&root)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rerun-if-changed={}", root.join(".git/HEAD").display());
    println!("cargo:rustc-env=QUESTLOG_BUILD_SHA={sha}");
}
