//! Core `DocumentAnalyzer` trait and `ApiDocumentAnalyzer` implementation.
//!
//! The remote service runs analysis as an asynchronous job: the submission
//! returns `202 Accepted` with an `Operation-Location` header (the job
//! handle), which is then polled until the job reaches a terminal status.
//! The poll loop is bounded by `config.max_polls`; exhaustion surfaces as
//! [`DocIntError::Timeout`] instead of spinning forever.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DocIntConfig;

use super::types::{classify_status, DocumentAnalysis, JobResponse, JobState};

/// Header carrying the subscription key on every request.
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
/// Response header carrying the job handle after submission.
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

// ---------------------------------------------------------------------------
// DocIntError
// ---------------------------------------------------------------------------

/// All errors that can arise from the document-analysis subsystem.
#[derive(Debug, Error)]
pub enum DocIntError {
    /// The image file could not be read.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The submission was not accepted (anything but `202 Accepted`).
    #[error("submission rejected with status {0}")]
    Rejected(u16),

    /// The `202` response did not carry a usable job handle.
    #[error("submission response is missing the Operation-Location header")]
    MissingJobHandle,

    /// A poll request answered with a non-success HTTP status.
    #[error("job poll returned status {0}")]
    PollStatus(u16),

    /// A poll body could not be parsed.
    #[error("failed to parse job response: {0}")]
    Parse(String),

    /// The job reached a terminal status other than `succeeded`.
    #[error("analysis job failed with status {0:?}")]
    JobFailed(String),

    /// The job stayed in progress for `max_polls` consecutive polls.
    #[error("analysis job still running after {0} polls")]
    Timeout(u32),

    /// The job succeeded but the body carried no analyze result.
    #[error("succeeded job carried no analyze result")]
    MissingResult,
}

impl From<reqwest::Error> for DocIntError {
    fn from(e: reqwest::Error) -> Self {
        DocIntError::Request(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// DocumentAnalyzer trait
// ---------------------------------------------------------------------------

/// Async trait for document layout analysis.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn DocumentAnalyzer>`).
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Analyze the image at `image` and return the structured layout.
    async fn analyze(&self, image: &Path) -> Result<DocumentAnalysis, DocIntError>;
}

// ---------------------------------------------------------------------------
// ApiDocumentAnalyzer
// ---------------------------------------------------------------------------

/// Production analyzer that drives the remote two-phase job protocol.
pub struct ApiDocumentAnalyzer {
    client: reqwest::Client,
    config: DocIntConfig,
}

impl ApiDocumentAnalyzer {
    /// Build an `ApiDocumentAnalyzer` from application config.
    pub fn from_config(config: &DocIntConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Submit the image bytes and return the job handle URL.
    async fn submit(&self, image_bytes: Vec<u8>) -> Result<String, DocIntError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "image/*")
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.api_key)
            .body(image_bytes)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::ACCEPTED {
            return Err(DocIntError::Rejected(status.as_u16()));
        }

        response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or(DocIntError::MissingJobHandle)
    }

    /// Poll the job handle until a terminal status or the poll budget runs out.
    async fn poll(&self, job_url: &str) -> Result<DocumentAnalysis, DocIntError> {
        for attempt in 0..self.config.max_polls {
            let response = self
                .client
                .get(job_url)
                .header(SUBSCRIPTION_KEY_HEADER, &self.config.api_key)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                // Per contract: a failing poll is terminal, no retry.
                return Err(DocIntError::PollStatus(status.as_u16()));
            }

            let job: JobResponse = response
                .json()
                .await
                .map_err(|e| DocIntError::Parse(e.to_string()))?;

            match classify_status(&job.status) {
                JobState::InProgress => {
                    log::debug!(
                        "docint: job in progress ({}), poll {}/{}",
                        job.status,
                        attempt + 1,
                        self.config.max_polls
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
                }
                JobState::Succeeded => {
                    let result = job.analyze_result.ok_or(DocIntError::MissingResult)?;
                    return Ok(result.into_analysis());
                }
                JobState::Failed(status) => {
                    return Err(DocIntError::JobFailed(status));
                }
            }
        }

        Err(DocIntError::Timeout(self.config.max_polls))
    }
}

#[async_trait]
impl DocumentAnalyzer for ApiDocumentAnalyzer {
    async fn analyze(&self, image: &Path) -> Result<DocumentAnalysis, DocIntError> {
        let image_bytes = tokio::fs::read(image).await?;

        log::debug!(
            "docint: submitting {} ({} bytes)",
            image.display(),
            image_bytes.len()
        );
        let job_url = self.submit(image_bytes).await?;

        log::debug!("docint: job accepted, polling {job_url}");
        self.poll(&job_url).await
    }
}

// ---------------------------------------------------------------------------
// MockDocumentAnalyzer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without any network.
#[cfg(test)]
pub struct MockDocumentAnalyzer {
    response: std::sync::Mutex<Option<Result<DocumentAnalysis, DocIntError>>>,
    /// Number of `analyze` calls observed so far.
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockDocumentAnalyzer {
    /// Create a mock that returns `Ok(analysis)` on the first call.
    pub fn ok(analysis: DocumentAnalysis) -> Self {
        Self {
            response: std::sync::Mutex::new(Some(Ok(analysis))),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns `Err(error)` on the first call.
    pub fn err(error: DocIntError) -> Self {
        Self {
            response: std::sync::Mutex::new(Some(Err(error))),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl DocumentAnalyzer for MockDocumentAnalyzer {
    async fn analyze(&self, _image: &Path) -> Result<DocumentAnalysis, DocIntError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(DocIntError::MissingResult))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use crate::docint::types::Paragraph;

    fn sample_analysis() -> DocumentAnalysis {
        DocumentAnalysis {
            paragraphs: vec![Paragraph {
                content: "계약서".into(),
                polygon: vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            }],
            full_text: "계약서".into(),
        }
    }

    #[tokio::test]
    async fn mock_returns_configured_analysis() {
        let analyzer = MockDocumentAnalyzer::ok(sample_analysis());
        let result = analyzer.analyze(Path::new("doc.png")).await.unwrap();
        assert_eq!(result.full_text, "계약서");
        assert_eq!(
            analyzer.calls.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn mock_returns_configured_error() {
        let analyzer = MockDocumentAnalyzer::err(DocIntError::Rejected(403));
        let err = analyzer.analyze(Path::new("doc.png")).await.unwrap_err();
        assert!(matches!(err, DocIntError::Rejected(403)));
    }

    /// Reading a missing image must fail before any network activity.
    #[tokio::test]
    async fn analyze_missing_image_is_io_error() {
        let analyzer = ApiDocumentAnalyzer::from_config(&DocIntConfig::default());
        let err = analyzer
            .analyze(Path::new("/nonexistent/doc.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocIntError::Io(_)));
    }

    // --- DocIntError display ---

    #[test]
    fn rejected_error_includes_status() {
        assert!(DocIntError::Rejected(400).to_string().contains("400"));
    }

    #[test]
    fn timeout_error_includes_poll_count() {
        assert!(DocIntError::Timeout(60).to_string().contains("60"));
    }

    #[test]
    fn analyzer_is_object_safe() {
        let analyzer: Box<dyn DocumentAnalyzer> =
            Box::new(ApiDocumentAnalyzer::from_config(&DocIntConfig::default()));
        drop(analyzer);
    }

    // --- submit/poll protocol against an in-process HTTP stub ---

    /// Serve one scripted response per connection and count the requests.
    ///
    /// Every response carries `Connection: close`, so the client opens a
    /// fresh connection per request and the connection count equals the
    /// request count.  `script` receives the stub's base URL so responses
    /// can point the job handle back at the stub.
    async fn spawn_stub(script: impl FnOnce(&str) -> Vec<String>) -> (String, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub");
        let base = format!("http://{}", listener.local_addr().expect("stub addr"));
        let hits = Arc::new(AtomicUsize::new(0));
        let responses = Arc::new(Mutex::new(VecDeque::from(script(&base))));

        let task_hits = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                task_hits.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let reply = responses
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| plain_status(500, "Internal Server Error"));
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (base, hits)
    }

    /// Drain one HTTP request: headers plus any declared body.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = [0u8; 4096];
        let mut seen: Vec<u8> = Vec::new();
        let mut header_end = None;
        while header_end.is_none() {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => {
                    seen.extend_from_slice(&buf[..n]);
                    header_end = seen
                        .windows(4)
                        .position(|w| w == b"\r\n\r\n")
                        .map(|p| p + 4);
                }
            }
        }
        let header_end = header_end.expect("found above");
        let head = String::from_utf8_lossy(&seen[..header_end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while seen.len() < header_end + body_len {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => seen.extend_from_slice(&buf[..n]),
            }
        }
    }

    fn accepted(job_url: &str) -> String {
        format!(
            "HTTP/1.1 202 Accepted\r\n{OPERATION_LOCATION_HEADER}: {job_url}\r\n\
             Content-Length: 0\r\nConnection: close\r\n\r\n"
        )
    }

    fn json_ok(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn plain_status(code: u16, reason: &str) -> String {
        format!("HTTP/1.1 {code} {reason}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
    }

    fn stub_config(base: &str) -> DocIntConfig {
        DocIntConfig {
            endpoint: format!("{base}/analyze"),
            api_key: "test-key".into(),
            poll_interval_ms: 1,
            max_polls: 3,
            timeout_secs: 5,
        }
    }

    fn write_image(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("doc.png");
        std::fs::write(&path, b"image bytes").expect("write image");
        path
    }

    const RUNNING_BODY: &str = r#"{"status":"running"}"#;

    #[tokio::test]
    async fn rejected_submission_makes_no_poll() {
        let dir = tempfile::tempdir().unwrap();
        let img = write_image(&dir);

        let (base, hits) = spawn_stub(|_| vec![plain_status(403, "Forbidden")]).await;
        let analyzer = ApiDocumentAnalyzer::from_config(&stub_config(&base));

        let err = analyzer.analyze(&img).await.unwrap_err();
        assert!(matches!(err, DocIntError::Rejected(403)));
        // The submission only; no poll was attempted.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn accepted_submission_without_job_handle_fails() {
        let dir = tempfile::tempdir().unwrap();
        let img = write_image(&dir);

        let (base, hits) = spawn_stub(|_| {
            vec!["HTTP/1.1 202 Accepted\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".into()]
        })
        .await;
        let analyzer = ApiDocumentAnalyzer::from_config(&stub_config(&base));

        let err = analyzer.analyze(&img).await.unwrap_err();
        assert!(matches!(err, DocIntError::MissingJobHandle));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn running_polls_retry_until_succeeded() {
        let dir = tempfile::tempdir().unwrap();
        let img = write_image(&dir);

        let succeeded =
            r#"{"status":"succeeded","analyzeResult":{"content":"계약서","paragraphs":[]}}"#;
        let (base, hits) = spawn_stub(|base| {
            vec![
                accepted(&format!("{base}/job/1")),
                json_ok(RUNNING_BODY),
                json_ok(RUNNING_BODY),
                json_ok(succeeded),
            ]
        })
        .await;
        let analyzer = ApiDocumentAnalyzer::from_config(&stub_config(&base));

        let analysis = analyzer.analyze(&img).await.unwrap();
        assert_eq!(analysis.full_text, "계약서");
        // One submission plus three polls.
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn poll_budget_exhaustion_is_a_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let img = write_image(&dir);

        let (base, hits) = spawn_stub(|base| {
            vec![
                accepted(&format!("{base}/job/1")),
                json_ok(RUNNING_BODY),
                json_ok(RUNNING_BODY),
                json_ok(RUNNING_BODY),
            ]
        })
        .await;
        let analyzer = ApiDocumentAnalyzer::from_config(&stub_config(&base));

        let err = analyzer.analyze(&img).await.unwrap_err();
        assert!(matches!(err, DocIntError::Timeout(3)));
        // One submission plus exactly max_polls polls, then the loop stops.
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn terminal_job_status_fails_without_retry() {
        let dir = tempfile::tempdir().unwrap();
        let img = write_image(&dir);

        let (base, hits) = spawn_stub(|base| {
            vec![
                accepted(&format!("{base}/job/1")),
                json_ok(r#"{"status":"failed"}"#),
            ]
        })
        .await;
        let analyzer = ApiDocumentAnalyzer::from_config(&stub_config(&base));

        let err = analyzer.analyze(&img).await.unwrap_err();
        assert!(matches!(err, DocIntError::JobFailed(s) if s == "failed"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failing_poll_status_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let img = write_image(&dir);

        let (base, hits) = spawn_stub(|base| {
            vec![
                accepted(&format!("{base}/job/1")),
                plain_status(500, "Internal Server Error"),
            ]
        })
        .await;
        let analyzer = ApiDocumentAnalyzer::from_config(&stub_config(&base));

        let err = analyzer.analyze(&img).await.unwrap_err();
        assert!(matches!(err, DocIntError::PollStatus(500)));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
