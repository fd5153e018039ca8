//! Runtime configuration.

use std::net::SocketAddr;

use clap::Parser;

use crate::prelude::*;

/// Accept PDF uploads, OCR them with an external pipeline, and serve the
/// results for download.
#[derive(Debug, Clone, Parser)]
#[clap(
    version,
    after_help = r#"
Environment Variables:
  - OCR_RELAY_LISTEN (optional): Override the listen address.
  - OCR_RELAY_TOOL (optional): Override the OCR pipeline executable.
  - RUST_LOG (optional): Logging filter, e.g. `ocr_relay=debug`.

  These variables may be set in a standard `.env` file.
"#
)]
pub struct Config {
    /// Address to listen on.
    #[clap(long, default_value = "127.0.0.1:8080", env = "OCR_RELAY_LISTEN")]
    pub listen: SocketAddr,

    /// The OCR pipeline executable. Invoked as `<tool> <input-pdf>
    /// <output-dir> <output-base-name> <job-id>`, and expected to print a
    /// JSON result object to standard output when it finishes.
    #[clap(long, default_value = "./ocr_pipeline.py", env = "OCR_RELAY_TOOL")]
    pub ocr_tool: PathBuf,

    /// Directory receiving uploaded PDFs, one subdirectory per job.
    #[clap(long, default_value = "user_file", env = "OCR_RELAY_UPLOADS")]
    pub uploads_dir: PathBuf,

    /// Directory receiving OCR output, one subdirectory per job.
    #[clap(
        long,
        default_value = "user_file_searchable",
        env = "OCR_RELAY_OUTPUTS"
    )]
    pub outputs_dir: PathBuf,

    /// Maximum size of an upload form, in MiB.
    #[clap(long, default_value = "32", env = "OCR_RELAY_MAX_UPLOAD_MIB")]
    pub max_upload_mib: usize,
}

impl Config {
    /// The upload form size cap, in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mib * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::parse_from(["ocr-relay"]);
        assert_eq!(config.listen, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.uploads_dir, Path::new("user_file"));
        assert_eq!(config.outputs_dir, Path::new("user_file_searchable"));
        assert_eq!(config.max_upload_bytes(), 32 * 1024 * 1024);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::parse_from([
            "ocr-relay",
            "--listen",
            "0.0.0.0:9999",
            "--ocr-tool",
            "/opt/ocr/run",
            "--max-upload-mib",
            "8",
        ]);
        assert_eq!(config.listen, "0.0.0.0:9999".parse().unwrap());
        assert_eq!(config.ocr_tool, Path::new("/opt/ocr/run"));
        assert_eq!(config.max_upload_bytes(), 8 * 1024 * 1024);
    }
}
