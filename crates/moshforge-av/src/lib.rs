//! # moshforge-av
//!
//! External tool plumbing for the moshforge pipeline.
//!
//! This crate provides the pieces the pipeline needs to drive external
//! binaries safely:
//! - Detecting tools on the system (ffmpeg, yt-dlp) and resolving their paths
//! - Running a tool to completion with captured stdout/stderr
//! - A temp-directory workspace for intermediate files with atomic
//!   finalization of the deliverable
//!
//! Tool execution is deliberately blocking and without timeouts; the pipeline
//! is sequential end to end and an external process is always run to
//! completion.

mod error;
pub mod command;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use tools::{check_tool, check_tool_with_arg, check_tools, get_tool_path, require_tool, ToolInfo};
pub use workspace::Workspace;
