//! Per-upload jobs.

use crate::{config::Config, prelude::*};

/// One upload-to-output processing unit, keyed by the uploaded file's
/// base name.
///
/// The filesystem path is the record: a job owns `<uploads>/<base>/` and
/// `<outputs>/<base>/`, and nothing else remembers it. Uploading another
/// file with the same base name reuses the same directories, and the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct Job {
    /// The original name of the uploaded file.
    original_filename: String,
    /// The filename without its extension. Keys everything below.
    base_name: String,
    /// Directory receiving the uploaded PDF.
    upload_dir: PathBuf,
    /// Directory the pipeline writes its artifacts into.
    output_dir: PathBuf,
}

impl Job {
    /// Create a job for an uploaded filename.
    ///
    /// Fails unless the filename ends in `.pdf` (case-insensitive). Does
    /// not touch the filesystem.
    pub fn from_filename(config: &Config, filename: &str) -> Result<Self> {
        // Browsers send a bare filename, but don't count on it.
        let filename = Path::new(filename)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("upload has no usable filename"))?;
        if !filename.to_ascii_lowercase().ends_with(".pdf") {
            bail!("please upload a PDF file (got {filename:?})");
        }
        let base_name = filename[..filename.len() - ".pdf".len()].to_owned();
        if base_name.is_empty() {
            bail!("cannot derive a job name from {filename:?}");
        }
        Ok(Self {
            original_filename: filename.to_owned(),
            upload_dir: config.uploads_dir.join(&base_name),
            output_dir: config.outputs_dir.join(&base_name),
            base_name,
        })
    }

    /// Look up a job by its base name, for progress queries.
    ///
    /// Rejects names that could escape the configured roots.
    pub fn from_base_name(config: &Config, base_name: &str) -> Result<Self> {
        if base_name.is_empty()
            || base_name == "."
            || base_name == ".."
            || base_name.contains(['/', '\\'])
        {
            bail!("invalid job name {base_name:?}");
        }
        Ok(Self {
            original_filename: format!("{base_name}.pdf"),
            upload_dir: config.uploads_dir.join(base_name),
            output_dir: config.outputs_dir.join(base_name),
            base_name: base_name.to_owned(),
        })
    }

    /// The original name of the uploaded file.
    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    /// The job key, also passed to the pipeline as its job id.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Directory the pipeline writes its artifacts into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the uploaded bytes are stored.
    pub fn upload_path(&self) -> PathBuf {
        self.upload_dir.join(&self.original_filename)
    }

    /// Base name the pipeline uses for its output artifacts.
    pub fn output_base_name(&self) -> String {
        format!("{}_searchable", self.base_name)
    }

    /// The progress file the pipeline rewrites while it works.
    pub fn progress_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("progress_{}.json", self.base_name))
    }

    /// Create the upload and output directories if absent.
    pub async fn prepare_dirs(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.upload_dir).await.unwrap_or(false) {
            warn!(
                job = %self.base_name,
                "job directory already exists, overwriting previous files"
            );
        }
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .with_context(|| {
                format!("cannot create upload directory {:?}", self.upload_dir)
            })?;
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| {
                format!("cannot create output directory {:?}", self.output_dir)
            })?;
        Ok(())
    }

    /// Write the uploaded bytes to disk.
    pub async fn save_upload(&self, data: &[u8]) -> Result<PathBuf> {
        let path = self.upload_path();
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("cannot save uploaded file {path:?}"))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;

    fn test_config() -> Config {
        Config::parse_from([
            "ocr-relay",
            "--uploads-dir",
            "uploads",
            "--outputs-dir",
            "outputs",
        ])
    }

    #[test]
    fn accepts_pdf_case_insensitively() {
        let config = test_config();
        for filename in ["scan.pdf", "Scan.PDF", "scan.Pdf"] {
            let job = Job::from_filename(&config, filename).unwrap();
            assert_eq!(job.base_name(), &filename[..4]);
            assert_eq!(job.original_filename(), filename);
        }
    }

    #[test]
    fn rejects_non_pdf_filenames() {
        let config = test_config();
        for filename in ["notes.txt", "scan", "archive.pdf.zip", ".pdf"] {
            assert!(
                Job::from_filename(&config, filename).is_err(),
                "accepted {filename:?}"
            );
        }
    }

    #[test]
    fn strips_directory_components() {
        let config = test_config();
        let job = Job::from_filename(&config, "../../evil.pdf").unwrap();
        assert_eq!(job.base_name(), "evil");
        assert_eq!(job.upload_path(), Path::new("uploads/evil/evil.pdf"));
    }

    #[test]
    fn keeps_inner_dots_in_base_name() {
        let config = test_config();
        let job = Job::from_filename(&config, "report.v2.pdf").unwrap();
        assert_eq!(job.base_name(), "report.v2");
        assert_eq!(job.output_base_name(), "report.v2_searchable");
    }

    #[test]
    fn layout_follows_base_name() {
        let config = test_config();
        let job = Job::from_filename(&config, "scan.pdf").unwrap();
        assert_eq!(job.upload_path(), Path::new("uploads/scan/scan.pdf"));
        assert_eq!(job.output_dir(), Path::new("outputs/scan"));
        assert_eq!(
            job.progress_path(),
            Path::new("outputs/scan/progress_scan.json")
        );
    }

    #[test]
    fn progress_lookup_rejects_traversal() {
        let config = test_config();
        for name in ["", ".", "..", "a/b", "a\\b"] {
            assert!(
                Job::from_base_name(&config, name).is_err(),
                "accepted {name:?}"
            );
        }
        assert!(Job::from_base_name(&config, "scan").is_ok());
    }
}
