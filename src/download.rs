use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

/// Download the selected asset into `dir` under its exact release name.
pub fn fetch(client: &Client, url: &str, asset_name: &str, dir: &Path) -> Result<PathBuf, String> {
    println!("downloading {asset_name}");

    let resp = client
        .get(url)
        .header("User-Agent", "codex-install")
        .send()
        .map_err(|e| format!("failed to download asset: {e}"))?;

    if !resp.status().is_success() {
        return Err(format!("GET {url} returned {}", resp.status()));
    }

    let bytes = resp
        .bytes()
        .map_err(|e| format!("failed to read asset body: {e}"))?;

    let path = dir.join(asset_name);
    fs::write(&path, &bytes).map_err(|e| format!("failed to write {}: {e}", path.display()))?;

    Ok(path)
}
