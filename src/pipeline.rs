//! Invoking the external OCR pipeline.
//!
//! The pipeline is an opaque collaborator: we hand it an input PDF, an
//! output directory and a base name for its artifacts, and it prints a
//! single JSON report to standard output when it finishes. Anything it
//! logs before the report is ignored.

use serde::Deserialize;
use tokio::process::Command;

use crate::{job::Job, prelude::*};

/// The JSON report the OCR tool prints to standard output.
///
/// Only `success` is mandatory. A failing run may carry nothing but
/// `success` and `error`, and older pipelines omit the statistics fields,
/// so everything else is optional and unknown fields are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct PipelineReport {
    /// Did the pipeline succeed?
    pub success: bool,

    /// Path of the plain-text extraction.
    #[serde(default)]
    pub text_file: Option<PathBuf>,

    /// Path of the searchable PDF.
    #[serde(default)]
    pub pdf_file: Option<PathBuf>,

    /// Path of the processing log, if the pipeline wrote one.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Error message, present on failure.
    #[serde(default)]
    pub error: Option<String>,

    /// Size of the input PDF, in KiB.
    #[serde(default)]
    pub original_kb: Option<f64>,

    /// Size of the searchable PDF, in KiB.
    #[serde(default)]
    pub output_kb: Option<f64>,

    /// Output size over input size.
    #[serde(default)]
    pub ratio: Option<f64>,

    /// Which PDF post-processing method the pipeline used.
    #[serde(default)]
    pub method: Option<String>,

    /// The job id we passed on the command line, echoed back.
    #[serde(default)]
    pub job_id: Option<String>,

    /// Right-to-left text statistics.
    #[serde(default)]
    pub rtl_stats: Option<RtlStats>,
}

/// Statistics about right-to-left text handling, reported per run.
#[derive(Clone, Debug, Deserialize)]
pub struct RtlStats {
    /// Words seen across all pages.
    pub total_words: u64,
    /// Words detected as right-to-left.
    pub rtl_words: u64,
    /// Lines whose word order was reversed.
    pub lines_reversed: u64,
    /// Share of right-to-left words, as a percentage.
    pub rtl_percentage: f64,
}

/// Run the OCR pipeline on a job's uploaded file and parse its report.
///
/// This suspends the calling task for the full OCR duration. There is no
/// timeout and no retry, and the child runs to completion even if the
/// client goes away.
#[instrument(level = "debug", skip_all, fields(job = %job.base_name()))]
pub async fn run_pipeline(ocr_tool: &Path, job: &Job) -> Result<PipelineReport> {
    // The pipeline expects absolute paths, whatever our working directory.
    let input = tokio::fs::canonicalize(job.upload_path())
        .await
        .with_context(|| {
            format!("cannot resolve uploaded file {:?}", job.upload_path())
        })?;
    let output_dir = tokio::fs::canonicalize(job.output_dir())
        .await
        .with_context(|| {
            format!("cannot resolve output directory {:?}", job.output_dir())
        })?;

    info!(tool = %ocr_tool.display(), input = %input.display(), "running OCR pipeline");
    let output = Command::new(ocr_tool)
        .arg(&input)
        .arg(&output_dir)
        .arg(job.output_base_name())
        .arg(job.base_name())
        .output()
        .await
        .with_context(|| format!("cannot run OCR tool {ocr_tool:?}"))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!(%stdout, %stderr, "OCR tool finished");

    if !output.status.success() {
        bail!(
            "OCR tool failed ({}):\n{}{}",
            describe_exit(output.status),
            stdout,
            stderr,
        );
    }

    parse_report(&stdout)
}

/// Parse the pipeline's report out of its standard output.
///
/// The tool may print warnings before the report, so we look for the
/// first `{` and parse from there.
pub fn parse_report(stdout: &str) -> Result<PipelineReport> {
    let start = stdout
        .find('{')
        .ok_or_else(|| anyhow!("no JSON report in OCR tool output:\n{stdout}"))?;
    serde_json::from_str(&stdout[start..])
        .with_context(|| format!("malformed JSON report in OCR tool output:\n{stdout}"))
}

/// Describe how a child process exited.
fn describe_exit(status: std::process::ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_owned(),
    }
}
