use std::path::PathBuf;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    let sha = git(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".into());
    println!("cargo:rustc-env=GIT_SHA={sha}");

    // Commit date, falling back to UNIX seconds outside a checkout
    let date = git(&["show", "-s", "--format=%ci", "HEAD"]).unwrap_or_else(|| {
        match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            Ok(d) => d.as_secs().to_string(),
            Err(_) => "unknown".into(),
        }
    });
    println!("cargo:rustc-env=BUILD_DATE={date}");

    // Game data shipped with the workspace, used when no --data is given
    let manifest = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let data_dir = manifest.join("../../data");
    println!("cargo:rustc-env=BUNDLED_DATA_DIR={}", data_dir.display());
    for file in ["config.json", "planner-ready-data.json"] {
        println!("cargo:rerun-if-changed={}", data_dir.join(file).display());
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
}
