//! Orchestration of a full datamosh run.
//!
//! Sequences acquisition, the intermediate re-encode, in-memory corruption,
//! and the final re-encode. Every intermediate artifact (downloaded source,
//! intermediate AVI, corrupted AVI, staged deliverable) lives inside a
//! [`Workspace`] temp directory, so cleanup is guaranteed on success and on
//! every failure path.

use crate::acquire::{self, DownloadRequest};
use crate::config::Config;
use crate::corrupt::{self, GlitchParams, GlitchRegion};
use crate::transcode;
use anyhow::{Context, Result};
use moshforge_av::Workspace;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the media comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Download via the external downloader first.
    Url {
        url: String,
        cookies: Option<PathBuf>,
    },
    /// An already-local media file.
    File(PathBuf),
}

/// A single datamosh job.
#[derive(Debug, Clone)]
pub struct MoshJob {
    pub source: Source,
    pub params: GlitchParams,
    pub output: PathBuf,
}

/// What a completed run produced, for reporting.
#[derive(Debug, Serialize)]
pub struct MoshReport {
    /// Final deliverable path.
    pub output: PathBuf,
    /// The local media file that was corrupted.
    pub source: PathBuf,
    /// Size of the intermediate buffer that was corrupted.
    pub intermediate_bytes: usize,
    /// Regions overwritten, in pass order.
    pub regions: Vec<GlitchRegion>,
}

/// Run a job to completion, returning the report on success.
pub fn execute(job: &MoshJob, config: &Config) -> Result<MoshReport> {
    let deliverable_name = job
        .output
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("output path has no file name: {:?}", job.output))?;

    let workspace = Workspace::new(deliverable_name)?;

    let source_path = match &job.source {
        Source::Url { url, cookies } => {
            let request = DownloadRequest {
                url,
                output_dir: workspace.temp_dir(),
                cookies: cookies.as_deref(),
            };
            acquire::download(&request, &config.download, &config.tools)?
        }
        Source::File(path) => {
            if !path.exists() {
                return Err(moshforge_av::Error::file_not_found(path.clone()).into());
            }
            path.clone()
        }
    };

    let intermediate = workspace.temp_file("intermediate.avi");
    transcode::to_intermediate(&source_path, &intermediate, &config.encode, &config.tools)?;

    let (regions, intermediate_bytes) =
        corrupt_file(&intermediate, &workspace.temp_file("glitched.avi"), &job.params)?;

    transcode::to_final(
        &workspace.temp_file("glitched.avi"),
        workspace.output(),
        &config.encode,
        &config.tools,
    )?;

    let output = workspace.finalize(&job.output)?;
    info!("Datamosh complete: {:?}", output);

    Ok(MoshReport {
        output,
        source: source_path,
        intermediate_bytes,
        regions,
    })
}

/// Load the intermediate into memory, corrupt it, and write it out once.
fn corrupt_file(
    input: &Path,
    output: &Path,
    params: &GlitchParams,
) -> Result<(Vec<GlitchRegion>, usize)> {
    let mut data =
        std::fs::read(input).with_context(|| format!("failed to read intermediate {input:?}"))?;
    info!(
        "Applying {} corruption passes of {} bytes to a {} byte buffer",
        params.passes,
        params.strength,
        data.len()
    );

    let mut rng = rand::thread_rng();
    let regions = corrupt::corrupt_buffer(&mut data, params, &mut rng)?;

    std::fs::write(output, &data)
        .with_context(|| format!("failed to write corrupted stream {output:?}"))?;
    Ok((regions, data.len()))
}
