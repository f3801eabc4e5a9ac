//! Pipeline integration tests
//!
//! Drives the full mosh path with stub transcoders standing in for ffmpeg,
//! covering both the success path and the guaranteed-cleanup discipline on
//! transcoder failure.

#![cfg(unix)]

use moshforge::config::Config;
use moshforge::corrupt::GlitchParams;
use moshforge::pipeline::{execute, MoshJob, Source};
use std::path::{Path, PathBuf};

/// Write an executable stub script into `dir`.
fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Stub that mimics a transcoder by copying input (after `-i`) to the last
/// argument.
const COPY_STUB: &str = "#!/bin/sh\nfor last; do :; done\ncp \"$2\" \"$last\"\n";

/// Stub that always fails, like ffmpeg rejecting an undecodable stream.
const FAIL_STUB: &str = "#!/bin/sh\necho 'stub: cannot decode' >&2\nexit 1\n";

/// Stub that handles the intermediate encode (`-f avi`) but rejects the final
/// re-encode, simulating corruption that exceeded decodability.
const FAIL_FINAL_STUB: &str = "#!/bin/sh\n\
case \"$*\" in\n\
  *\"-f avi\"*)\n\
    for last; do :; done\n\
    cp \"$2\" \"$last\"\n\
    ;;\n\
  *)\n\
    echo 'stub: moov atom not found' >&2\n\
    exit 1\n\
    ;;\n\
esac\n";

fn patterned_input(dir: &Path, len: usize) -> PathBuf {
    let path = dir.join("input.mp4");
    let data: Vec<u8> = (0..len).map(|i| (i * 31 % 256) as u8).collect();
    std::fs::write(&path, data).unwrap();
    path
}

fn config_with_ffmpeg(stub: PathBuf) -> Config {
    let mut config = Config::default();
    config.tools.ffmpeg = Some(stub);
    config
}

#[test]
fn test_full_mosh_with_stub_transcoder() {
    let temp = tempfile::tempdir().unwrap();
    let ffmpeg = write_stub(temp.path(), "ffmpeg", COPY_STUB);
    let input = patterned_input(temp.path(), 8192);
    let output = temp.path().join("glitched.mp4");

    let job = MoshJob {
        source: Source::File(input.clone()),
        params: GlitchParams {
            passes: 2,
            strength: 256,
        },
        output: output.clone(),
    };

    let report = execute(&job, &config_with_ffmpeg(ffmpeg)).unwrap();

    assert_eq!(report.output, output);
    assert_eq!(report.source, input);
    assert_eq!(report.intermediate_bytes, 8192);
    assert_eq!(report.regions.len(), 2);

    let produced = std::fs::read(&output).unwrap();
    let original = std::fs::read(&input).unwrap();
    assert_eq!(produced.len(), original.len());
    // The stub copies bytes verbatim, so the deliverable is exactly the
    // corrupted intermediate; it must differ from the source.
    assert_ne!(produced, original);
    // The input file itself is never touched.
    assert_eq!(original[0], 0);
}

#[test]
fn test_transcoder_failure_leaves_no_artifacts() {
    let temp = tempfile::tempdir().unwrap();
    let ffmpeg = write_stub(temp.path(), "ffmpeg", FAIL_STUB);
    let input = patterned_input(temp.path(), 4096);
    let output = temp.path().join("glitched.mp4");

    let job = MoshJob {
        source: Source::File(input.clone()),
        params: GlitchParams {
            passes: 1,
            strength: 64,
        },
        output: output.clone(),
    };

    let result = execute(&job, &config_with_ffmpeg(ffmpeg.clone()));
    assert!(result.is_err());

    assert!(!output.exists());
    // Only the stub and the untouched input remain next to the destination.
    let mut names: Vec<String> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["ffmpeg", "input.mp4"]);
}

#[test]
fn test_final_reencode_failure_leaves_no_artifacts() {
    let temp = tempfile::tempdir().unwrap();
    let ffmpeg = write_stub(temp.path(), "ffmpeg", FAIL_FINAL_STUB);
    let input = patterned_input(temp.path(), 4096);
    let output = temp.path().join("glitched.mp4");

    let job = MoshJob {
        source: Source::File(input),
        params: GlitchParams {
            passes: 1,
            strength: 64,
        },
        output: output.clone(),
    };

    let result = execute(&job, &config_with_ffmpeg(ffmpeg));
    let err = format!("{:?}", result.unwrap_err());
    assert!(err.contains("final re-encode failed"), "unexpected error: {err}");

    assert!(!output.exists());
    let mut names: Vec<String> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["ffmpeg", "input.mp4"]);
}

#[test]
fn test_precondition_violation_fails_before_encoding_output() {
    let temp = tempfile::tempdir().unwrap();
    let ffmpeg = write_stub(temp.path(), "ffmpeg", COPY_STUB);
    // 64 bytes cannot host a 4096-byte glitch.
    let input = patterned_input(temp.path(), 64);
    let output = temp.path().join("glitched.mp4");

    let job = MoshJob {
        source: Source::File(input),
        params: GlitchParams {
            passes: 1,
            strength: 4096,
        },
        output: output.clone(),
    };

    let result = execute(&job, &config_with_ffmpeg(ffmpeg));
    let err = format!("{:?}", result.unwrap_err());
    assert!(err.contains("too small"), "unexpected error: {err}");
    assert!(!output.exists());
}

#[test]
fn test_missing_local_input_fails_fast() {
    let temp = tempfile::tempdir().unwrap();
    let ffmpeg = write_stub(temp.path(), "ffmpeg", COPY_STUB);
    let output = temp.path().join("glitched.mp4");

    let job = MoshJob {
        source: Source::File(temp.path().join("missing.mp4")),
        params: GlitchParams {
            passes: 1,
            strength: 64,
        },
        output: output.clone(),
    };

    let result = execute(&job, &config_with_ffmpeg(ffmpeg));
    let err = format!("{:?}", result.unwrap_err());
    assert!(err.contains("file not found"), "unexpected error: {err}");
    assert!(!output.exists());
}
