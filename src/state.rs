//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::ocr::DocumentOcr;
use crate::scratch::ScratchSpace;

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to prepare scratch directory: {0}")]
    ScratchInit(#[from] std::io::Error),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    scratch: ScratchSpace,
    document_ocr: DocumentOcr,
}

impl AppState {
    /// Create the application state around an already initialized engine.
    ///
    /// The engine is shared by every request for the life of the process.
    pub fn new(config: Config, engine: Arc<dyn OcrEngine>) -> Result<Self, StateError> {
        let scratch = ScratchSpace::new(&config.scratch.dir)?;
        let document_ocr = DocumentOcr::new(engine, scratch.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                scratch,
                document_ocr,
            }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the scratch space for staged uploads
    pub fn scratch(&self) -> &ScratchSpace {
        &self.inner.scratch
    }

    /// Get the document OCR pipeline
    pub fn document_ocr(&self) -> &DocumentOcr {
        &self.inner.document_ocr
    }
}
