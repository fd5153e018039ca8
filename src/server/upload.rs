//! The upload handler.

use axum::{
    extract::{Multipart, State},
    response::{Html, Redirect},
};

use crate::{
    job::Job,
    pipeline::{self, PipelineReport},
    prelude::*,
    server::{pages::PageData, state::AppState},
};

/// The multipart field carrying the PDF.
const PDF_FIELD: &str = "pdffile";

/// `POST /upload`: accept a PDF, OCR it, and show the results.
///
/// Always answers with the rendered page: any failure becomes the error
/// view carrying the full message, not a bare HTTP error.
pub async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Html<String> {
    match process_upload(&state, multipart).await {
        Ok(page) => Html(page),
        Err(err) => {
            warn!(error = ?err, "upload failed");
            let message = format!("{err:#}");
            let page = state.pages().error(&message).unwrap_or_else(|render_err| {
                error!(error = ?render_err, "cannot render error page");
                message
            });
            Html(page)
        }
    }
}

/// Non-POST requests to `/upload` go back to the form.
pub async fn upload_redirect() -> Redirect {
    Redirect::to("/")
}

/// Do the actual upload work, returning the rendered success page.
async fn process_upload(state: &AppState, mut multipart: Multipart) -> Result<String> {
    let config = state.config();

    // Pull the PDF out of the form.
    let (filename, data) = read_pdf_field(&mut multipart).await?;
    info!(%filename, bytes = data.len(), "received upload");

    // Arrange the job's scratch space and persist the upload.
    let job = Job::from_filename(config, &filename)?;
    job.prepare_dirs().await?;
    job.save_upload(&data).await?;

    // Hand the file to the OCR pipeline. This holds the request open for
    // the full OCR duration.
    let report = pipeline::run_pipeline(&config.ocr_tool, &job).await?;
    if !report.success {
        bail!(
            "OCR processing failed: {}",
            report.error.as_deref().unwrap_or("(no error reported)")
        );
    }
    info!(job = %job.base_name(), "OCR pipeline succeeded");

    state.pages().render(&success_page_data(&report)?)
}

/// Find the `pdffile` field and read its name and contents.
async fn read_pdf_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .context("cannot parse upload form")?
    {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(|name| name.to_owned())
            .ok_or_else(|| anyhow!("upload field has no filename"))?;
        let data = field.bytes().await.context("cannot read uploaded file")?;
        return Ok((filename, data.to_vec()));
    }
    Err(anyhow!("no `{PDF_FIELD}` file in upload form"))
}

/// Build the success view from a pipeline report.
fn success_page_data(report: &PipelineReport) -> Result<PageData> {
    let text_file = report
        .text_file
        .as_deref()
        .ok_or_else(|| anyhow!("OCR report has no text file path"))?;
    let pdf_file = report
        .pdf_file
        .as_deref()
        .ok_or_else(|| anyhow!("OCR report has no PDF file path"))?;

    let cwd = std::env::current_dir().context("cannot get working directory")?;
    Ok(PageData {
        message: Some("OCR processing completed successfully!".to_owned()),
        text_file: Some(download_href(text_file, &cwd)),
        pdf_file: Some(download_href(pdf_file, &cwd)),
        log_file: report.log_file.as_deref().map(|p| download_href(p, &cwd)),
        summary: summary_line(report),
        show_result: true,
        error: None,
    })
}

/// Turn a pipeline output path into a `/download/` link: relative to the
/// working directory when possible, with forward slashes.
fn download_href(path: &Path, cwd: &Path) -> String {
    let relative = path.strip_prefix(cwd).unwrap_or(path);
    format!(
        "/download/{}",
        relative.display().to_string().replace('\\', "/")
    )
}

/// One human-readable line about the conversion, when the pipeline
/// reports sizes.
fn summary_line(report: &PipelineReport) -> Option<String> {
    let original = report.original_kb?;
    let output = report.output_kb?;
    let mut line = format!("Input {original:.1} KiB, searchable PDF {output:.1} KiB");
    if let Some(ratio) = report.ratio {
        line.push_str(&format!(" ({ratio:.2}x)"));
    }
    if let Some(method) = &report.method {
        line.push_str(&format!(", via {method}"));
    }
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrefs_are_relative_to_the_working_directory() {
        let cwd = Path::new("/srv/ocr");
        assert_eq!(
            download_href(Path::new("/srv/ocr/out/doc/doc_searchable.txt"), cwd),
            "/download/out/doc/doc_searchable.txt"
        );
    }

    #[test]
    fn hrefs_fall_back_to_the_raw_path() {
        let cwd = Path::new("/srv/ocr");
        assert_eq!(
            download_href(Path::new("/elsewhere/doc_searchable.pdf"), cwd),
            "/download//elsewhere/doc_searchable.pdf"
        );
    }

    #[test]
    fn summary_needs_both_sizes() {
        let mut report = crate::pipeline::parse_report(
            r#"{"success": true, "original_kb": 100.0}"#,
        )
        .unwrap();
        assert_eq!(summary_line(&report), None);

        report.output_kb = Some(210.0);
        report.ratio = Some(2.1);
        report.method = Some("pikepdf".to_owned());
        assert_eq!(
            summary_line(&report).unwrap(),
            "Input 100.0 KiB, searchable PDF 210.0 KiB (2.10x), via pikepdf"
        );
    }
}
