use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub glitch: GlitchConfig,

    #[serde(default)]
    pub encode: EncodeConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Path the final deliverable is written to.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("glitched_video.mp4")
}

/// Default corruption parameters, overridable per run from the CLI.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlitchConfig {
    /// Corruption passes per run.
    #[serde(default = "default_passes")]
    pub passes: u32,

    /// Bytes overwritten per pass.
    #[serde(default = "default_strength")]
    pub strength: usize,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            passes: default_passes(),
            strength: default_strength(),
        }
    }
}

fn default_passes() -> u32 {
    5
}

fn default_strength() -> usize {
    5000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncodeConfig {
    /// Keyframe interval for the intermediate encode. Very large by default
    /// so corruption propagates across predicted frames instead of being
    /// repaired at the next keyframe.
    #[serde(default = "default_keyframe_interval")]
    pub keyframe_interval: u32,

    /// `-q:v` value for the intermediate encode (0 = best).
    #[serde(default)]
    pub intermediate_quality: u32,

    /// x264 preset for the final encode.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// CRF for the final encode.
    #[serde(default = "default_crf")]
    pub crf: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            keyframe_interval: default_keyframe_interval(),
            intermediate_quality: 0,
            preset: default_preset(),
            crf: default_crf(),
        }
    }
}

fn default_keyframe_interval() -> u32 {
    99999
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_crf() -> u32 {
    23
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Format selection passed to the downloader, widest-compatibility first.
    #[serde(default = "default_format")]
    pub format: String,

    /// Container the downloader merges split streams into.
    #[serde(default = "default_merge_format")]
    pub merge_format: String,

    /// Base filename when no video id can be derived from the URL.
    #[serde(default = "default_fallback_stem")]
    pub fallback_stem: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            merge_format: default_merge_format(),
            fallback_stem: default_fallback_stem(),
        }
    }
}

fn default_format() -> String {
    "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string()
}

fn default_merge_format() -> String {
    "mp4".to_string()
}

fn default_fallback_stem() -> String {
    "video".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit path to ffmpeg (default: PATH lookup).
    #[serde(default)]
    pub ffmpeg: Option<PathBuf>,

    /// Explicit path to yt-dlp (default: PATH lookup).
    #[serde(default)]
    pub ytdlp: Option<PathBuf>,
}
