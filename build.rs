use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

fn hash_file(path: &Path) -> String {
    let content = fs::read(path).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())[..8].to_string()
}

fn main() {
    // Re-run build script if relevant files change
    println!("cargo:rerun-if-changed=static/css/app.css");
    println!("cargo:rerun-if-changed=templates/");

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");

    // Hash static assets for cache busting
    let css_hash = hash_file(&Path::new(&manifest_dir).join("static/css/app.css"));

    // Write generated code to OUT_DIR
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    fs::write(
        Path::new(&out_dir).join("asset_hashes.rs"),
        format!(
            r#"/// Hash of app.css for cache busting
pub const APP_CSS_HASH: &str = "{}";"#,
            css_hash
        ),
    )
    .expect("failed to write asset_hashes.rs");
}
