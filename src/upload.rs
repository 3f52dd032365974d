//! Image upload pipeline: pre-flight validation, preview registration and
//! asynchronous submission to the extraction backend.
//!
//! Uploads are fire-and-forget from the UI's point of view: `submit` spawns
//! a task on the shared runtime and completions come back through
//! [`UploadAdapter::poll_events`] on the UI thread. Failures leave the store
//! untouched; there are no automatic retries.

use crate::api::{parse_response, ExtractionResult};
use crate::store::PolygonRecord;

use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use thiserror::Error;

/// Path of the extraction endpoint on the backend host
pub const PROCESS_ENDPOINT: &str = "/api/process";

/// Upload failure taxonomy. All variants are non-fatal; messages are shown
/// to the user as-is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UploadError {
    #[error("Veuillez sélectionner un fichier image (JPG, PNG, etc.)")]
    InvalidInputFile,

    #[error("Impossible de se connecter au serveur backend. Vérifiez que le serveur est démarré sur {0}")]
    NetworkUnreachable(String),

    #[error("Erreur 404: L'endpoint /api/process n'existe pas sur le serveur.")]
    EndpointNotFound,

    #[error("Erreur serveur {0}: Problème lors du traitement de l'image.")]
    ServerProcessing(u16),

    #[error("Erreur: Format de réponse invalide du serveur.")]
    MalformedResponse,

    #[error("Erreur HTTP {0}")]
    Http(u16),

    #[error("Erreur: {0}")]
    Transport(String),
}

/// A file handed over by the user, before any network activity
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<Vec<u8>>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Pre-flight MIME check; anything outside `image/*` is rejected before
    /// a request is sent
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Handle to a registered preview; previews appear immediately on submit,
/// before the backend answers
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    pub index: usize,
    pub file_name: String,
    pub bytes: Arc<Vec<u8>>,
}

/// Completion of one submitted upload
#[derive(Debug)]
pub enum UploadEvent {
    Processed(PolygonRecord),
    Failed(UploadError),
}

/// Seam for the extraction backend, mockable in tests
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    async fn process(&self, upload: &ImageUpload) -> Result<ExtractionResult, UploadError>;
}

/// HTTP client for the extraction backend: POST multipart with a single
/// `image` field to `/api/process`
pub struct HttpProcessor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProcessor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> UploadError {
        if err.is_connect() {
            UploadError::NetworkUnreachable(self.base_url.clone())
        } else {
            UploadError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ImageProcessor for HttpProcessor {
    async fn process(&self, upload: &ImageUpload) -> Result<ExtractionResult, UploadError> {
        let part = reqwest::multipart::Part::bytes(upload.bytes.as_ref().clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime)
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let url = format!("{}{}", self.base_url, PROCESS_ENDPOINT);
        log::info!("submitting {} to {}", upload.file_name, url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(UploadError::EndpointNotFound);
        }
        if status.is_server_error() {
            return Err(UploadError::ServerProcessing(status.as_u16()));
        }
        if !status.is_success() {
            return Err(UploadError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        parse_response(&body)
    }
}

/// Bridges UI-thread submissions and async backend processing.
///
/// `in_flight` is only touched on the UI thread: it is raised in `submit`
/// and lowered when `poll_events` drains the matching completion, so the
/// busy indicator stays accurate without locks.
pub struct UploadAdapter {
    processor: Arc<dyn ImageProcessor>,
    tx: Sender<UploadEvent>,
    rx: Receiver<UploadEvent>,
    handle: tokio::runtime::Handle,
    previews: Vec<PreviewHandle>,
    in_flight: usize,
}

impl UploadAdapter {
    pub fn new(processor: Arc<dyn ImageProcessor>, handle: tokio::runtime::Handle) -> Self {
        let (tx, rx) = unbounded();
        Self {
            processor,
            tx,
            rx,
            handle,
            previews: Vec::new(),
            in_flight: 0,
        }
    }

    /// Submits an upload. Non-image files fail pre-flight and no request is
    /// sent; valid files register a preview immediately and resolve later
    /// through `poll_events`.
    pub fn submit(&mut self, upload: ImageUpload) -> Result<PreviewHandle, UploadError> {
        if !upload.is_image() {
            log::warn!("rejected non-image upload: {} ({})", upload.file_name, upload.mime);
            return Err(UploadError::InvalidInputFile);
        }

        let preview = PreviewHandle {
            index: self.previews.len(),
            file_name: upload.file_name.clone(),
            bytes: Arc::clone(&upload.bytes),
        };
        self.previews.push(preview.clone());
        self.in_flight += 1;

        let processor = Arc::clone(&self.processor);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let event = match processor.process(&upload).await {
                Ok(result) => UploadEvent::Processed(result.into_record()),
                Err(err) => {
                    log::error!("upload {} failed: {}", upload.file_name, err);
                    UploadEvent::Failed(err)
                }
            };
            // Receiver dropped means the adapter is gone; discard
            let _ = tx.send(event);
        });

        Ok(preview)
    }

    /// Drains all completions that have arrived since the last call
    pub fn poll_events(&mut self) -> Vec<UploadEvent> {
        let events: Vec<UploadEvent> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(events.len());
        events
    }

    pub fn previews(&self) -> &[PreviewHandle] {
        &self.previews
    }

    /// True while at least one submission has not completed
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}
