//! The two ffmpeg invocations around the corruption step.
//!
//! The intermediate encode pushes the keyframe interval out so a corrupted
//! byte range smears across many predicted frames instead of being repaired
//! at the next keyframe. The final encode turns the damaged intermediate back
//! into a standards-compliant deliverable, keeping whatever artifacts the
//! decoder surfaces.

use crate::config::{EncodeConfig, ToolsConfig};
use anyhow::{Context, Result};
use moshforge_av::ToolCommand;
use std::path::Path;
use tracing::info;

/// Build the argument list for the sparse-keyframe intermediate encode.
fn intermediate_args(input: &Path, output: &Path, encode: &EncodeConfig) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-vf".to_string(),
        "setpts=PTS/1.0".to_string(),
        "-q:v".to_string(),
        encode.intermediate_quality.to_string(),
        "-g".to_string(),
        encode.keyframe_interval.to_string(),
        "-f".to_string(),
        "avi".to_string(),
        "-y".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Build the argument list for the final re-encode of the corrupted stream.
fn final_args(input: &Path, output: &Path, encode: &EncodeConfig) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        encode.preset.clone(),
        "-crf".to_string(),
        encode.crf.to_string(),
        "-y".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Convert the acquired media into a long-GOP AVI amenable to raw corruption.
pub fn to_intermediate(
    input: &Path,
    output: &Path,
    encode: &EncodeConfig,
    tools: &ToolsConfig,
) -> Result<()> {
    info!(
        "Re-encoding to intermediate AVI (keyframe interval {})",
        encode.keyframe_interval
    );
    run_ffmpeg(intermediate_args(input, output, encode), tools)
        .context("intermediate re-encode failed")
}

/// Re-encode the corrupted intermediate into the deliverable format.
///
/// ffmpeg is expected to decode what it can of the malformed stream; if it
/// rejects the file outright the corruption exceeded decodability and the run
/// fails without retrying.
pub fn to_final(
    input: &Path,
    output: &Path,
    encode: &EncodeConfig,
    tools: &ToolsConfig,
) -> Result<()> {
    info!(
        "Re-encoding corrupted stream to deliverable (preset {}, crf {})",
        encode.preset, encode.crf
    );
    run_ffmpeg(final_args(input, output, encode), tools).context("final re-encode failed")
}

fn run_ffmpeg(args: Vec<String>, tools: &ToolsConfig) -> Result<()> {
    let ffmpeg = moshforge_av::get_tool_path("ffmpeg", tools.ffmpeg.as_deref())?;
    ToolCommand::new(ffmpeg).args(args).execute()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn contains_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn intermediate_args_suppress_keyframes() {
        let args = intermediate_args(
            &PathBuf::from("in.mp4"),
            &PathBuf::from("inter.avi"),
            &EncodeConfig::default(),
        );

        assert_eq!(args[0], "-i");
        assert_eq!(args[1], "in.mp4");
        assert!(contains_pair(&args, "-g", "99999"));
        assert!(contains_pair(&args, "-q:v", "0"));
        assert!(contains_pair(&args, "-f", "avi"));
        assert_eq!(args.last().unwrap(), "inter.avi");
    }

    #[test]
    fn intermediate_args_respect_config() {
        let encode = EncodeConfig {
            keyframe_interval: 500,
            ..EncodeConfig::default()
        };
        let args = intermediate_args(
            &PathBuf::from("in.mp4"),
            &PathBuf::from("inter.avi"),
            &encode,
        );
        assert!(contains_pair(&args, "-g", "500"));
    }

    #[test]
    fn final_args_use_fixed_quality_settings() {
        let args = final_args(
            &PathBuf::from("glitched.avi"),
            &PathBuf::from("out.mp4"),
            &EncodeConfig::default(),
        );

        assert!(contains_pair(&args, "-c:v", "libx264"));
        assert!(contains_pair(&args, "-preset", "medium"));
        assert!(contains_pair(&args, "-crf", "23"));
        assert!(args.contains(&"-y".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }
}
