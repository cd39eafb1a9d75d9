use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use crossbeam_channel::{unbounded, Sender};
use thiserror::Error;

use crate::response::InferenceResult;
use crate::session::{Generation, Session};

/// One upload request from the GUI to the worker thread.
pub struct UploadRequest {
    pub generation: Generation,
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("API Error {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("could not decode inference response: {0}")]
    Decode(String),
}

impl From<ureq::Error> for InferenceError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => InferenceError::Status { status },
            ureq::Error::Transport(t) => InferenceError::Transport(t.to_string()),
        }
    }
}

/// Blocking client for the opaque inference endpoint: audio bytes go out
/// base64-encoded in a JSON envelope, an [`InferenceResult`] comes back.
pub struct InferenceClient {
    endpoint: String,
    agent: ureq::Agent,
}

impl InferenceClient {
    pub fn new(endpoint: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            // Inference on a cold backend can take a while
            .timeout(Duration::from_secs(60))
            .build();
        Self {
            endpoint: endpoint.to_string(),
            agent,
        }
    }

    /// Submit raw audio file bytes for classification.
    pub fn classify(&self, audio: &[u8]) -> Result<InferenceResult, InferenceError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(request_payload(audio))?;

        response
            .into_json::<InferenceResult>()
            .map_err(|e| InferenceError::Decode(e.to_string()))
    }
}

/// The wire envelope the backend expects.
fn request_payload(audio: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "audio_data": general_purpose::STANDARD.encode(audio),
    })
}

// ========================================================================
// INFERENCE WORKER THREAD
// ========================================================================

/// Spawn the worker that performs blocking inference calls off the GUI
/// thread. Requests arrive over the returned channel; outcomes are written
/// straight into the shared session, where the generation check drops
/// anything a newer upload has superseded. The thread exits when the GUI
/// drops the sender.
pub fn spawn_worker(endpoint: String, session: Arc<Mutex<Session>>) -> Sender<UploadRequest> {
    let (tx, rx) = unbounded::<UploadRequest>();

    thread::spawn(move || {
        tracing::info!("[Worker] Inference worker started ({})", endpoint);
        let client = InferenceClient::new(&endpoint);

        while let Ok(mut request) = rx.recv() {
            // Skip straight to the newest queued upload; anything older is
            // already superseded and the session would discard its outcome.
            while let Ok(newer) = rx.try_recv() {
                tracing::debug!("[Worker] Skipping superseded {:?}", request.file_name);
                request = newer;
            }

            tracing::info!(
                "[Worker] Analyzing {:?} (gen {})",
                request.file_name,
                request.generation
            );

            let outcome = std::fs::read(&request.path)
                .map_err(InferenceError::from)
                .and_then(|bytes| client.classify(&bytes));

            if let Ok(mut session) = session.lock() {
                match outcome {
                    Ok(result) => {
                        tracing::info!(
                            "[Worker] ✓ {} predictions, {} layers",
                            result.predictions.len(),
                            result.visualization.len()
                        );
                        session.complete(request.generation, result);
                    }
                    Err(e) => {
                        tracing::warn!("[Worker] Inference failed: {}", e);
                        session.fail(request.generation, e.to_string());
                    }
                }
            }
        }

        tracing::info!("[Worker] Shutting down...");
    });

    tx
}

// ===========  Tests ===============
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape_and_encoding() {
        let payload = request_payload(b"hello");
        assert_eq!(payload["audio_data"], "aGVsbG8=");
        // Exactly one field; the backend ignores nothing we send
        assert_eq!(payload.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_file_encodes_to_empty_string() {
        let payload = request_payload(b"");
        assert_eq!(payload["audio_data"], "");
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        let err = InferenceError::Status { status: 503 };
        assert_eq!(err.to_string(), "API Error 503");

        let err = InferenceError::Transport("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
    }
}
