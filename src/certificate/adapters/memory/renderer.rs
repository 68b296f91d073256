//! In-memory certificate document generator for issuance tests.

use async_trait::async_trait;
use minijinja::Environment;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::certificate::{
    domain::CertificateNumber,
    ports::{
        CertificateMetadata, DocumentRenderer, RenderedDocument, RendererError, RendererResult,
    },
};

/// Plain-text body rendered for each certificate.
const CERTIFICATE_TEMPLATE: &str = "\
CERTIFICATE OF COMPLETION

Certificate no. {{ certificate_number }}

This certifies that volunteer {{ volunteer_id }} completed
{{ hours_completed }} hour(s) of volunteer work on
\"{{ task_title }}\" at {{ task_location }} on {{ task_date }}.
";

/// In-memory document generator.
///
/// Renders certificate bodies from an embedded template, allocates
/// sequential certificate numbers, and keeps every rendered document
/// retrievable by URL. A failing mode can be switched on to exercise the
/// no-half-created-certificate contract.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentRenderer {
    state: Arc<RwLock<RendererState>>,
}

#[derive(Debug, Default)]
struct RendererState {
    issued_serials: u64,
    documents: HashMap<String, String>,
    failure: Option<String>,
}

impl InMemoryDocumentRenderer {
    /// Creates an empty in-memory generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rendered document body stored under `url`, if any.
    ///
    /// # Errors
    ///
    /// Returns generation errors when lock acquisition fails.
    pub fn document(&self, url: &str) -> RendererResult<Option<String>> {
        let state = self
            .state
            .read()
            .map_err(|err| RendererError::failed(std::io::Error::other(err.to_string())))?;
        Ok(state.documents.get(url).cloned())
    }

    /// Makes every subsequent render fail with the given message.
    ///
    /// # Errors
    ///
    /// Returns generation errors when lock acquisition fails.
    pub fn set_failing(&self, message: impl Into<String>) -> RendererResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| RendererError::failed(std::io::Error::other(err.to_string())))?;
        state.failure = Some(message.into());
        Ok(())
    }
}

#[async_trait]
impl DocumentRenderer for InMemoryDocumentRenderer {
    async fn render(&self, metadata: &CertificateMetadata) -> RendererResult<RenderedDocument> {
        let mut state = self
            .state
            .write()
            .map_err(|err| RendererError::failed(std::io::Error::other(err.to_string())))?;
        if let Some(message) = &state.failure {
            return Err(RendererError::failed(std::io::Error::other(
                message.clone(),
            )));
        }

        let serial = state.issued_serials.wrapping_add(1);
        let number = CertificateNumber::new(format!("VOL-{serial:06}"))
            .map_err(RendererError::failed)?;
        let url = format!("memory://certificates/{number}");

        let body = render_body(&number, metadata)?;
        state.issued_serials = serial;
        state.documents.insert(url.clone(), body);

        Ok(RenderedDocument {
            certificate_number: number,
            url,
        })
    }
}

fn render_body(
    number: &CertificateNumber,
    metadata: &CertificateMetadata,
) -> RendererResult<String> {
    let environment = Environment::new();
    let mut context = Map::new();
    context.insert(
        "certificate_number".to_owned(),
        Value::String(number.as_str().to_owned()),
    );
    context.insert(
        "volunteer_id".to_owned(),
        Value::String(metadata.volunteer_id.to_string()),
    );
    context.insert(
        "task_title".to_owned(),
        Value::String(metadata.task_title.clone()),
    );
    context.insert(
        "task_location".to_owned(),
        Value::String(metadata.task_location.clone()),
    );
    context.insert(
        "task_date".to_owned(),
        Value::String(metadata.task_date.to_string()),
    );
    context.insert(
        "hours_completed".to_owned(),
        Value::from(metadata.hours_completed.value()),
    );

    environment
        .render_str(CERTIFICATE_TEMPLATE, context)
        .map_err(RendererError::failed)
}
