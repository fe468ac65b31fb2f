use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() {
    println!(
        "cargo:rustc-env=PAGE_WATCH_GIT_HASH={}",
        git_short_hash().unwrap_or_default()
    );
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
