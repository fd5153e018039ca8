//! Shared server state.

use std::sync::Arc;

use crate::{config::Config, prelude::*, server::pages::PageRenderer};

/// State shared by all request handlers.
///
/// Cheap to clone; everything lives behind one `Arc`. There is
/// deliberately no per-job bookkeeping here: the filesystem is the only
/// record of a job, so request handling stays stateless.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Runtime configuration.
    config: Config,
    /// The HTML page renderer.
    pages: PageRenderer,
}

impl AppState {
    /// Create the shared state, compiling the page template.
    pub fn new(config: Config) -> Result<Self> {
        let pages = PageRenderer::new()?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, pages }),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the page renderer.
    pub fn pages(&self) -> &PageRenderer {
        &self.inner.pages
    }
}
