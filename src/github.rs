use reqwest::blocking::Client;
use serde::Deserialize;

use crate::platform::OsFamily;
use crate::BINARY_NAME;

/// Public GitHub REST endpoint; tests substitute a local server.
pub const API_BASE: &str = "https://api.github.com";

/// Asset extensions the release scan tries, in priority order. The scan is
/// extension-major: every release is tried for `tar.gz` before any release
/// is tried for `zst`.
const EXTENSIONS: &[&str] = &["tar.gz", "zst"];

const USER_AGENT: &str = "codex-install";

/// One release record as the hosting API reports it; never mutated.
#[derive(Debug, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A single downloadable file attached to a release.
#[derive(Debug, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub browser_download_url: String,
}

/// Resolve the release tag to install. An explicit tag is returned verbatim
/// with no network query; otherwise the newest published release exposing a
/// wanted asset wins.
pub fn select_tag(
    client: &Client,
    api_base: &str,
    repo: &str,
    target: &str,
    tag: Option<&str>,
) -> Result<String, String> {
    if let Some(t) = tag {
        return Ok(t.to_string());
    }

    let url = format!("{api_base}/repos/{repo}/releases?per_page=100");
    let resp = client
        .get(&url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github+json")
        .send()
        .map_err(|e| format!("failed to fetch releases: {e}"))?;

    if !resp.status().is_success() {
        return Err(format!("GitHub API returned {}", resp.status()));
    }

    let text = resp
        .text()
        .map_err(|e| format!("failed to read response body: {e}"))?;
    let mut releases: Vec<Release> = serde_json::from_str(&text)
        .map_err(|e| format!("failed to parse releases JSON: {e}"))?;

    releases.retain(|r| !r.draft);
    // ISO-8601 UTC timestamps order lexicographically.
    releases.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    for ext in EXTENSIONS {
        let wanted = format!("{BINARY_NAME}-{target}.{ext}");
        if let Some(release) = releases
            .iter()
            .find(|r| r.assets.iter().any(|a| a.name == wanted))
        {
            return Ok(release.tag_name.clone());
        }
    }

    Err(format!("no suitable release found for {target}"))
}

/// Fetch one release record by its tag.
pub fn release_by_tag(
    client: &Client,
    api_base: &str,
    repo: &str,
    tag: &str,
) -> Result<Release, String> {
    let url = format!("{api_base}/repos/{repo}/releases/tags/{tag}");
    let resp = client
        .get(&url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github+json")
        .send()
        .map_err(|e| format!("failed to fetch release {tag}: {e}"))?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(format!("no release tagged {tag} in {repo}"));
    }
    if !resp.status().is_success() {
        return Err(format!("GitHub API returned {}", resp.status()));
    }

    let text = resp
        .text()
        .map_err(|e| format!("failed to read response body: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("failed to parse release JSON: {e}"))
}

/// Pick the asset to download: the first candidate name present in the
/// release's asset set. Exactly one asset is ever selected.
pub fn select_asset<'a>(release: &'a Release, target: &str) -> Result<&'a Asset, String> {
    for name in asset_candidates(target) {
        if let Some(asset) = release.assets.iter().find(|a| a.name == name) {
            return Ok(asset);
        }
    }

    Err(format!(
        "no suitable asset found for {target} in {}",
        release.tag_name
    ))
}

/// Candidate asset filenames for a target, most preferred first. Windows
/// binaries ship under `.exe` variants; every other family gets the bare
/// name.
pub fn asset_candidates(target: &str) -> Vec<String> {
    let exts: &[&str] = if OsFamily::of(target) == OsFamily::Windows {
        &["exe.tar.gz", "exe.zst", "exe.zip"]
    } else {
        EXTENSIONS
    };

    exts.iter()
        .map(|ext| format!("{BINARY_NAME}-{target}.{ext}"))
        .collect()
}
