pub mod acquire;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod runner;
pub mod session;
pub mod storage;
pub mod view;

// Re-export commonly used types
pub use acquire::{Acquired, ImageSelection, ImageSource};
pub use client::HealthAssessmentClient;
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::{AssessError, Result};
pub use model::{AssessmentRequest, AssessmentResult, DiseaseSuggestion, HealthMode};
pub use runner::SubmissionRunner;
pub use session::{Phase, SessionEvent, SessionState};
pub use storage::{InMemorySessionStorage, Session, SessionStorage};
pub use view::{ContentAnchor, ViewState};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    struct FixedSource {
        selection: ImageSelection,
    }

    #[async_trait]
    impl ImageSource for FixedSource {
        async fn pick_from_library(&self) -> Result<Acquired> {
            Ok(Acquired::Selected(self.selection.clone()))
        }

        async fn capture_photo(&self) -> Result<Acquired> {
            Ok(Acquired::Selected(self.selection.clone()))
        }
    }

    struct CancelingSource;

    #[async_trait]
    impl ImageSource for CancelingSource {
        async fn pick_from_library(&self) -> Result<Acquired> {
            Ok(Acquired::Canceled)
        }

        async fn capture_photo(&self) -> Result<Acquired> {
            Ok(Acquired::Canceled)
        }
    }

    fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Minimal one-shot HTTP server returning a canned response, so client
    /// failure modes can be exercised without the real endpoint.
    async fn spawn_stub_server(status_line: &'static str, body: &'static str) -> String {
        spawn_stub_server_with_delay(status_line, body, Duration::ZERO).await
    }

    async fn spawn_stub_server_with_delay(
        status_line: &'static str,
        body: &'static str,
        delay: Duration,
    ) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 65536];
                let mut read_total = 0;
                loop {
                    let n = socket.read(&mut buf[read_total..]).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    read_total += n;
                    if let Some(header_end) = find_subslice(&buf[..read_total], b"\r\n\r\n") {
                        let headers = String::from_utf8_lossy(&buf[..header_end]);
                        let content_length = headers
                            .lines()
                            .find_map(|line| {
                                let (name, value) = line.split_once(':')?;
                                if name.eq_ignore_ascii_case("content-length") {
                                    value.trim().parse::<usize>().ok()
                                } else {
                                    None
                                }
                            })
                            .unwrap_or(0);
                        if read_total >= header_end + 4 + content_length {
                            break;
                        }
                    }
                }
                tokio::time::sleep(delay).await;
                let response = format!(
                    "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{addr}")
    }

    fn runner_for(endpoint: String) -> (SubmissionRunner, Arc<InMemorySessionStorage>) {
        let client = Arc::new(HealthAssessmentClient::new(ClientConfig::new(
            endpoint,
            "test-key",
        )));
        let storage = Arc::new(InMemorySessionStorage::new());
        (SubmissionRunner::new(client, storage.clone()), storage)
    }

    const SAMPLE_RESPONSE: &str = r#"{
        "result": {
            "is_plant": {"binary": true},
            "is_healthy": {"binary": true, "probability": 0.93},
            "disease": {"suggestions": [{
                "name": "leaf rust",
                "probability": 0.4,
                "details": {
                    "description": "fungal infection",
                    "local_name": null,
                    "treatment": {
                        "biological": ["remove affected leaves"],
                        "prevention": ["avoid overhead watering"]
                    }
                }
            }]}
        }
    }"#;

    #[tokio::test]
    async fn successful_submission_normalizes_result() {
        let endpoint = spawn_stub_server("HTTP/1.1 200 OK", SAMPLE_RESPONSE).await;
        let (runner, _) = runner_for(endpoint);

        let source = FixedSource {
            selection: ImageSelection::new("file:///photo.jpg", "dGVzdA=="),
        };
        let session = runner.acquire_from_library("s1", &source).await.unwrap();

        assert_eq!(session.state.phase(), Phase::Succeeded);
        let result = session.state.result.as_ref().unwrap();
        assert!(result.is_plant);
        assert!(result.is_healthy);
        assert!((result.health_probability - 0.93).abs() < 1e-9);
        assert_eq!(result.disease_suggestions.len(), 1);
        let suggestion = &result.disease_suggestions[0];
        assert_eq!(suggestion.name, "leaf rust");
        assert!((suggestion.probability - 0.4).abs() < 1e-9);
        assert_eq!(
            suggestion.details.treatment.as_ref().unwrap().biological,
            vec!["remove affected leaves".to_string()]
        );

        let view = ViewState::from(&session.state);
        assert_eq!(view.content_anchor, ContentAnchor::Top);
        assert!(!view.show_instructions);
        assert!(!view.show_spinner);
    }

    #[tokio::test]
    async fn server_error_yields_fixed_message() {
        let endpoint =
            spawn_stub_server("HTTP/1.1 500 Internal Server Error", r#"{"detail":"boom"}"#).await;
        let (runner, _) = runner_for(endpoint);

        let selection = ImageSelection::new("file:///photo.jpg", "dGVzdA==");
        let session = runner.submit("s1", selection).await.unwrap();

        assert_eq!(session.state.phase(), Phase::Failed);
        assert_eq!(
            session.state.error.as_deref(),
            Some("Failed to fetch data. Please check your API key and URL.")
        );
        assert!(session.state.result.is_none());
        // Prior selection stays visible next to the error
        let view = ViewState::from(&session.state);
        assert_eq!(view.selected_image.as_deref(), Some("file:///photo.jpg"));
        assert!(view.show_instructions);
        assert_eq!(view.content_anchor, ContentAnchor::Center);
        assert!(view.error_text.is_some());
    }

    #[tokio::test]
    async fn malformed_body_yields_parse_failure() {
        let endpoint = spawn_stub_server("HTTP/1.1 200 OK", "this is not json").await;
        let (runner, _) = runner_for(endpoint);

        let selection = ImageSelection::new("file:///photo.jpg", "dGVzdA==");
        let session = runner.submit("s1", selection).await.unwrap();

        assert_eq!(session.state.phase(), Phase::Failed);
        assert!(session.state.error.is_some());
        assert!(session.state.result.is_none());
    }

    #[tokio::test]
    async fn canceled_acquisition_is_a_no_op() {
        let endpoint = spawn_stub_server("HTTP/1.1 200 OK", SAMPLE_RESPONSE).await;
        let (runner, _) = runner_for(endpoint);

        // Cancel on a fresh session: state stays Idle
        let session = runner
            .acquire_from_library("s1", &CancelingSource)
            .await
            .unwrap();
        assert_eq!(session.state, SessionState::new());

        // Cancel after a successful submission: state unchanged
        let source = FixedSource {
            selection: ImageSelection::new("file:///photo.jpg", "dGVzdA=="),
        };
        let before = runner.acquire_from_library("s1", &source).await.unwrap();
        let after = runner
            .acquire_via_camera("s1", &CancelingSource)
            .await
            .unwrap();
        assert_eq!(before.state, after.state);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_submissions_newest_wins() {
        // A's endpoint fails slowly; B's succeeds immediately. B is issued
        // while A's request is still in flight, so A's resolution arrives
        // last carrying a stale generation.
        let slow = spawn_stub_server_with_delay(
            "HTTP/1.1 500 Internal Server Error",
            "",
            Duration::from_millis(400),
        )
        .await;
        let fast = spawn_stub_server("HTTP/1.1 200 OK", SAMPLE_RESPONSE).await;

        let storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
        let runner_a = SubmissionRunner::new(
            Arc::new(HealthAssessmentClient::new(ClientConfig::new(
                slow, "test-key",
            ))),
            storage.clone(),
        );
        let runner_b = SubmissionRunner::new(
            Arc::new(HealthAssessmentClient::new(ClientConfig::new(
                fast, "test-key",
            ))),
            storage.clone(),
        );

        let submission_a = tokio::spawn(async move {
            runner_a
                .submit("s1", ImageSelection::new("file:///a.jpg", "YQ=="))
                .await
        });
        // Let A persist its Pending state and put the request on the wire
        tokio::time::sleep(Duration::from_millis(100)).await;

        let session_b = runner_b
            .submit("s1", ImageSelection::new("file:///b.jpg", "Yg=="))
            .await
            .unwrap();
        assert_eq!(session_b.state.generation, 2);
        assert_eq!(session_b.state.phase(), Phase::Succeeded);

        // A's late failure is discarded; its returned session already shows
        // B's outcome
        let session_a = submission_a.await.unwrap().unwrap();
        assert_eq!(session_a.state.generation, 2);
        assert_eq!(session_a.state.phase(), Phase::Succeeded);
        assert!(session_a.state.error.is_none());

        let stored = storage.get("s1").await.unwrap().unwrap();
        assert!(stored.state.result.is_some());
        assert!(stored.state.error.is_none());
        assert_eq!(
            stored.state.selection.as_ref().unwrap().display_uri,
            "file:///b.jpg"
        );
    }

    struct FailingSource;

    #[async_trait]
    impl ImageSource for FailingSource {
        async fn pick_from_library(&self) -> Result<Acquired> {
            Err(AssessError::Acquisition(
                "photo library unavailable".to_string(),
            ))
        }

        async fn capture_photo(&self) -> Result<Acquired> {
            Err(AssessError::Acquisition("camera unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn failing_source_propagates_acquisition_error() {
        let endpoint = spawn_stub_server("HTTP/1.1 200 OK", SAMPLE_RESPONSE).await;
        let (runner, storage) = runner_for(endpoint);

        let error = runner
            .acquire_via_camera("s1", &FailingSource)
            .await
            .unwrap_err();
        assert!(matches!(error, AssessError::Acquisition(_)));
        assert_eq!(error.to_string(), "Image acquisition failed: camera unavailable");

        // No submission started, so no session record was created
        assert!(storage.get("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn new_submission_replaces_prior_error() {
        let failing = spawn_stub_server("HTTP/1.1 503 Service Unavailable", "").await;
        let (runner, storage) = runner_for(failing);

        let selection = ImageSelection::new("file:///a.jpg", "YQ==");
        let session = runner.submit("s1", selection).await.unwrap();
        assert_eq!(session.state.phase(), Phase::Failed);

        // Second submission against a healthy endpoint clears the error
        let healthy = spawn_stub_server("HTTP/1.1 200 OK", SAMPLE_RESPONSE).await;
        let client = Arc::new(HealthAssessmentClient::new(ClientConfig::new(
            healthy, "test-key",
        )));
        let runner = SubmissionRunner::new(client, storage);
        let selection = ImageSelection::new("file:///b.jpg", "Yg==");
        let session = runner.submit("s1", selection).await.unwrap();

        assert_eq!(session.state.phase(), Phase::Succeeded);
        assert!(session.state.error.is_none());
        assert_eq!(session.state.generation, 2);
    }
}
