use std::process::Command;

fn git(args: &[&str]) -> String {
    Command::new("git").args(args).output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown".into())
}

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", git(&["rev-parse", "--short", "HEAD"]));
    println!("cargo:rustc-env=GIT_BRANCH={}", git(&["rev-parse", "--abbrev-ref", "HEAD"]));
}
