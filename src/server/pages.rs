//! The single HTML page, rendered in three states.

use handlebars::Handlebars;
use serde::Serialize;

use crate::prelude::*;

/// The page template, compiled into the binary.
static PAGE_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Bindings for the page template.
///
/// Two fields pick the display state: a present `error` shows only the
/// error; otherwise `show_result` picks between the download links and
/// the upload form.
#[derive(Debug, Default, Serialize)]
pub struct PageData {
    /// Status line shown above the form or the results.
    pub message: Option<String>,
    /// Error text, shown verbatim.
    pub error: Option<String>,
    /// Download link for the text extraction.
    pub text_file: Option<String>,
    /// Download link for the searchable PDF.
    pub pdf_file: Option<String>,
    /// Download link for the processing log, if any.
    pub log_file: Option<String>,
    /// One-line size summary of the conversion, if known.
    pub summary: Option<String>,
    /// Show the download links?
    pub show_result: bool,
}

/// Renders the upload page.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    /// Compile the page template.
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string("index", PAGE_TEMPLATE)
            .context("cannot compile page template")?;
        Ok(Self { registry })
    }

    /// Render the initial upload form.
    pub fn home(&self) -> Result<String> {
        self.render(&PageData {
            message: Some("Upload your PDF file for OCR processing".to_owned()),
            ..PageData::default()
        })
    }

    /// Render the error state. `error` appears verbatim (HTML-escaped).
    pub fn error(&self, error: &str) -> Result<String> {
        self.render(&PageData {
            error: Some(error.to_owned()),
            ..PageData::default()
        })
    }

    /// Render the page with the given bindings.
    pub fn render(&self, data: &PageData) -> Result<String> {
        self.registry
            .render("index", data)
            .context("cannot render page template")
    }
}
