//! HTTP client for the external classification endpoint.
//!
//! One `POST` per submission, JSON body keyed by feature name, response
//! `{ "prediction": <number> }`. Failures never escape this module as errors:
//! they come back as [`PredictionResult::NoPrediction`] with the reason
//! attached, and are logged here.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{MappedInputs, Verdict};
use crate::error::AppError;

/// Endpoint the classifier was published at.
pub const DEFAULT_ENDPOINT: &str = "https://c-backend-sy90.onrender.com/predict";

/// Why a submission produced no prediction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("endpoint answered with status {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("request aborted: {0}")]
    Aborted(String),
}

/// Raw classification code returned by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionCode(pub f64);

impl PredictionCode {
    pub fn verdict(self) -> Verdict {
        Verdict::from_code(self.0)
    }
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionResult {
    Predicted(PredictionCode),
    NoPrediction(PredictError),
}

impl PredictionResult {
    pub fn code(&self) -> Option<PredictionCode> {
        match self {
            PredictionResult::Predicted(code) => Some(*code),
            PredictionResult::NoPrediction(_) => None,
        }
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.code().map(PredictionCode::verdict)
    }
}

/// Anything that can turn a mapped payload into a prediction.
///
/// Implementations must not panic on transport problems; report them as
/// `NoPrediction` instead.
pub trait Predictor {
    fn predict(&self, inputs: &MappedInputs) -> PredictionResult;
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    prediction: f64,
}

/// Blocking HTTP implementation of [`Predictor`].
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: Client,
    endpoint: String,
}

impl PredictionClient {
    /// Build a client for `endpoint`.
    ///
    /// No request timeout is configured: a submission runs until the endpoint
    /// answers or the connection fails.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| AppError::usage(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send(&self, inputs: &MappedInputs) -> Result<PredictionCode, PredictError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(inputs)
            .send()
            .map_err(|e| PredictError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PredictError::Status(status.as_u16()));
        }

        let body: PredictionResponse = resp.json().map_err(|e| PredictError::Decode(e.to_string()))?;
        Ok(PredictionCode(body.prediction))
    }
}

impl Predictor for PredictionClient {
    fn predict(&self, inputs: &MappedInputs) -> PredictionResult {
        debug!(endpoint = %self.endpoint, "sending prediction request");
        match self.send(inputs) {
            Ok(code) => {
                if let Verdict::Unrecognized(raw) = code.verdict() {
                    warn!(code = raw, "endpoint returned an unrecognized prediction code");
                } else {
                    info!(code = code.0, "prediction received");
                }
                PredictionResult::Predicted(code)
            }
            Err(err) => {
                error!(endpoint = %self.endpoint, error = %err, "error fetching prediction");
                PredictionResult::NoPrediction(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;

    use super::*;
    use crate::domain::RatingSet;

    /// Accept a single connection, reply with `status_line` and `body`, and
    /// hand back the raw request text.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(request);
        });
        (format!("http://{addr}/predict"), rx)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn default_inputs() -> MappedInputs {
        MappedInputs::from_ratings(&RatingSet::default())
    }

    #[test]
    fn posts_json_payload_and_reads_prediction() {
        let (url, rx) = serve_once("HTTP/1.1 200 OK", r#"{"prediction": 1}"#);
        let client = PredictionClient::new(url).unwrap();

        let result = client.predict(&default_inputs());
        assert_eq!(result, PredictionResult::Predicted(PredictionCode(1.0)));
        assert_eq!(result.verdict(), Some(Verdict::Positive));

        let request = rx.recv().unwrap();
        let lower = request.to_lowercase();
        assert!(lower.starts_with("post /predict "), "{request}");
        assert!(lower.contains("content-type: application/json"), "{request}");
        assert!(request.contains(r#""Intelligence Level":1"#), "{request}");
        assert!(request.contains(r#""Uses Stupid Words Often":0"#), "{request}");
    }

    #[test]
    fn non_success_status_is_no_prediction() {
        let (url, _rx) = serve_once("HTTP/1.1 503 Service Unavailable", r#"{"error": "asleep"}"#);
        let client = PredictionClient::new(url).unwrap();

        let result = client.predict(&default_inputs());
        assert_eq!(result, PredictionResult::NoPrediction(PredictError::Status(503)));
    }

    #[test]
    fn malformed_body_is_no_prediction() {
        let (url, _rx) = serve_once("HTTP/1.1 200 OK", r#"{"label": "yes"}"#);
        let client = PredictionClient::new(url).unwrap();

        let result = client.predict(&default_inputs());
        assert!(matches!(result, PredictionResult::NoPrediction(PredictError::Decode(_))), "{result:?}");
        assert_eq!(result.verdict(), None);
    }

    #[test]
    fn unreachable_endpoint_is_no_prediction() {
        // Bind then drop to get a port nobody is listening on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = PredictionClient::new(format!("http://127.0.0.1:{port}/predict")).unwrap();

        let result = client.predict(&default_inputs());
        assert!(matches!(result, PredictionResult::NoPrediction(PredictError::Transport(_))), "{result:?}");
    }
}
