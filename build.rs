fn main() {
    // Release pipelines set TAGSTAMP_BUILD explicitly; otherwise describe the checkout.
    println!("cargo:rerun-if-env-changed=TAGSTAMP_BUILD");
    if let Ok(build) = std::env::var("TAGSTAMP_BUILD") {
        println!("cargo:rustc-env=TAGSTAMP_BUILD={build}");
        return;
    }

    let describe = std::process::Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .unwrap_or_default()
        .trim()
        .to_string();

    let pkg = env!("CARGO_PKG_VERSION");
    if describe.is_empty() {
        println!("cargo:rustc-env=TAGSTAMP_BUILD={pkg}");
    } else {
        println!("cargo:rustc-env=TAGSTAMP_BUILD={pkg} ({describe})");
    }
}
