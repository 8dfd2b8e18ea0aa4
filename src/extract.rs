use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::read::GzDecoder;

/// Unpack a downloaded asset inside `work` and return the path of the
/// extracted binary. The binary's file name is the asset name with the
/// archive suffix stripped.
pub fn unpack(archive: &Path, work: &Path) -> Result<PathBuf, String> {
    let asset_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("asset path {} has no file name", archive.display()))?;

    let binary = if let Some(base) = asset_name.strip_suffix(".tar.gz") {
        let dir = work.join("unpacked");
        unpack_tar_gz(archive, &dir)?;
        dir.join(base)
    } else if let Some(base) = asset_name.strip_suffix(".zst") {
        let out = work.join(base);
        unzstd(archive, &out)?;
        out
    } else if let Some(base) = asset_name.strip_suffix(".zip") {
        let dir = work.join("unpacked");
        unpack_zip(archive, &dir)?;
        dir.join(base)
    } else {
        // The asset selector only hands out these three suffixes.
        return Err(format!("unsupported asset format: {asset_name}"));
    };

    if !binary.is_file() {
        return Err(format!("binary not found after unpack: {}", binary.display()));
    }

    Ok(binary)
}

fn unpack_tar_gz(archive: &Path, dir: &Path) -> Result<(), String> {
    let file =
        fs::File::open(archive).map_err(|e| format!("failed to open {}: {e}", archive.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.unpack(dir).map_err(|e| format!("failed to unpack tar.gz: {e}"))
}

fn unpack_zip(archive: &Path, dir: &Path) -> Result<(), String> {
    let file =
        fs::File::open(archive).map_err(|e| format!("failed to open {}: {e}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| format!("failed to read zip: {e}"))?;
    zip.extract(dir).map_err(|e| format!("failed to unpack zip: {e}"))
}

/// Decompress a `.zst` asset via the external `zstd` tool; the other
/// formats are handled in-process.
fn unzstd(archive: &Path, out: &Path) -> Result<(), String> {
    let result = Command::new("zstd")
        .args(["-d", "-q", "-f"])
        .arg(archive)
        .arg("-o")
        .arg(out)
        .status();

    match result {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(format!("zstd -d exited with {status}")),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err("zstd is required to unpack .zst assets and was not found on PATH".to_string())
        }
        Err(e) => Err(format!("failed to run zstd: {e}")),
    }
}
