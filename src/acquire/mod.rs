//! Acquisition boundary: resolving a source URL to a local media file.
//!
//! The downloader is an opaque collaborator; we hand it a URL, an output
//! template, and optional credentials, and get a file back. Recovering the
//! actual output path from its free-text completion message is inherently
//! fragile, so the parse lives behind small testable helpers with a
//! directory-scan fallback.

use crate::config::{DownloadConfig, ToolsConfig};
use anyhow::{Context, Result};
use moshforge_av::ToolCommand;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extensions the downloader is known to produce, used by the scan fallback.
const DOWNLOAD_EXTENSIONS: &[&str] = &["mp4", "webm", "flv", "mkv"];

/// A single download request.
#[derive(Debug, Clone)]
pub struct DownloadRequest<'a> {
    /// Source URL.
    pub url: &'a str,
    /// Directory the downloader writes into.
    pub output_dir: &'a Path,
    /// Optional cookie file for sites that require a session.
    pub cookies: Option<&'a Path>,
}

/// Download the video behind `request.url`, returning the local file path.
pub fn download(
    request: &DownloadRequest<'_>,
    settings: &DownloadConfig,
    tools: &ToolsConfig,
) -> Result<PathBuf> {
    let stem = video_stem(request.url, &settings.fallback_stem);
    let template = request.output_dir.join(format!("{stem}.%(ext)s"));

    info!("Downloading {}", request.url);

    let ytdlp = moshforge_av::get_tool_path("yt-dlp", tools.ytdlp.as_deref())?;
    let mut cmd = ToolCommand::new(ytdlp);
    cmd.arg(request.url)
        .arg("--output")
        .arg(template.to_string_lossy())
        .arg("--format")
        .arg(settings.format.as_str())
        .arg("--merge-output-format")
        .arg(settings.merge_format.as_str());

    match request.cookies {
        Some(cookies) if cookies.exists() => {
            info!("Using cookie file {:?}", cookies);
            cmd.arg("--cookies").arg(cookies.to_string_lossy());
        }
        Some(cookies) => {
            warn!("Cookie file {:?} does not exist, downloading without it", cookies);
        }
        None => {
            debug!("No cookie file supplied");
        }
    }

    let output = cmd.execute().context("download failed")?;

    if let Some(path) = parse_merger_line(&output.stdout) {
        let path = resolve_reported_path(path);
        if path.exists() {
            info!("Download complete: {:?}", path);
            return Ok(path);
        }
        warn!("Downloader reported {:?} but the file is missing", path);
    }

    if let Some(path) = scan_for_download(request.output_dir, &stem)? {
        info!("Download complete (directory scan): {:?}", path);
        return Ok(path);
    }

    anyhow::bail!(
        "downloader finished but no output file was found\nstdout: {}\nstderr: {}",
        output.stdout,
        output.stderr
    );
}

/// Derive a base filename from the source URL.
///
/// Matches the site's video id scheme when present; otherwise falls back to a
/// configured stem.
fn video_stem(url: &str, fallback: &str) -> String {
    Regex::new(r"(sm|nm|so)\d+")
        .ok()
        .and_then(|re| re.find(url).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| fallback.to_string())
}

/// Recover the merged output path from the downloader's completion message.
///
/// Best-effort: returns `None` when the line is absent so the caller can fall
/// back to scanning the output directory.
fn parse_merger_line(stdout: &str) -> Option<PathBuf> {
    let re = Regex::new(r#"\[Merger\] Merging formats into "(.*?)""#).ok()?;
    re.captures(stdout)
        .and_then(|c| c.get(1))
        .map(|m| PathBuf::from(m.as_str()))
}

/// The downloader reports paths relative to its own working directory.
fn resolve_reported_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&path))
            .unwrap_or(path)
    }
}

/// Scan `dir` for a downloaded file named after `stem`.
fn scan_for_download(dir: &Path, stem: &str) -> Result<Option<PathBuf>> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to scan download directory {dir:?}"))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let name_matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(stem));
            let ext_matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| DOWNLOAD_EXTENSIONS.contains(&e));
            name_matches && ext_matches
        })
        .collect();

    candidates.sort();
    Ok(candidates.into_iter().next())
}
