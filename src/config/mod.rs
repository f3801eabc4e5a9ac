mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./moshforge.toml",
        "~/.config/moshforge/config.toml",
        "/etc/moshforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.glitch.passes == 0 {
        anyhow::bail!("Glitch pass count cannot be 0");
    }
    if config.glitch.strength == 0 {
        anyhow::bail!("Glitch strength cannot be 0");
    }

    if config.encode.keyframe_interval == 0 {
        anyhow::bail!("Keyframe interval cannot be 0");
    }
    if config.encode.crf > 51 {
        anyhow::bail!("CRF must be at most 51, got {}", config.encode.crf);
    }

    if config.download.format.is_empty() {
        anyhow::bail!("Download format selection cannot be empty");
    }

    if config.output.path.file_name().is_none() {
        anyhow::bail!("Output path has no file name: {:?}", config.output.path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_tool() {
        let config = Config::default();
        assert_eq!(config.output.path, Path::new("glitched_video.mp4"));
        assert_eq!(config.glitch.passes, 5);
        assert_eq!(config.glitch.strength, 5000);
        assert_eq!(config.encode.keyframe_interval, 99999);
        assert_eq!(config.encode.preset, "medium");
        assert_eq!(config.encode.crf, 23);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
[output]
path = "out/mosh.mp4"

[encode]
keyframe_interval = 600
crf = 18

[tools]
ffmpeg = "/opt/ffmpeg/bin/ffmpeg"
"#,
        )
        .unwrap();

        assert_eq!(config.output.path, Path::new("out/mosh.mp4"));
        assert_eq!(config.encode.keyframe_interval, 600);
        assert_eq!(config.encode.crf, 18);
        assert_eq!(config.encode.preset, "medium");
        assert_eq!(
            config.tools.ffmpeg.as_deref(),
            Some(Path::new("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert!(config.tools.ytdlp.is_none());
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = Config::default();
        config.glitch.strength = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.encode.crf = 52;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.download.format = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn load_config_missing_file_errors() {
        let result = load_config(Path::new("/nonexistent/moshforge.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moshforge.toml");
        std::fs::write(&path, "[glitch]\npasses = 2\nstrength = 128\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.glitch.passes, 2);
        assert_eq!(config.glitch.strength, 128);
    }
}
