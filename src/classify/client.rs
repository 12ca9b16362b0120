use super::result::{parse_reply_text, ClassificationResult};
use crate::capture::AudioClip;
use crate::config::ClassifierConfig;
use crate::error::ClassificationError;
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tracing::debug;

/// Async classification seam.
///
/// Implementors must be `Send + Sync` so the classification lane can hold
/// them as `Arc<dyn Classifier>` across in-flight requests.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one clip. Consumes the clip; its bytes travel with the
    /// request and are dropped when it resolves.
    async fn classify(&self, clip: AudioClip) -> Result<ClassificationResult, ClassificationError>;
}

/// Wire shape of the classifier's JSON reply.
///
/// At least one of `description`/`text` must be present; `isImportant` is
/// an optional structured flag some deployments add.
#[derive(Debug, Deserialize)]
struct ReplyBody {
    description: Option<String>,
    text: Option<String>,
    #[serde(rename = "isImportant", alias = "important")]
    is_important: Option<bool>,
}

/// Submits clips to the remote classification endpoint.
pub struct RemoteClassifier {
    client: reqwest::Client,
    config: ClassifierConfig,
}

impl RemoteClassifier {
    /// Build a classifier from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is the fallback if the
    /// builder fails.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, clip: AudioClip) -> Result<ClassificationResult, ClassificationError> {
        let duration_ms = clip.duration_ms;

        let part = multipart::Part::bytes(clip.bytes)
            .file_name(format!("clip.{}", clip.codec))
            .mime_str(&format!("audio/{}", clip.codec))
            .map_err(|e| ClassificationError::Request(e.to_string()))?;
        let form = multipart::Form::new().part("audio", part);

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassificationError::Status {
                status: status.as_u16(),
            });
        }

        let body: ReplyBody = response
            .json()
            .await
            .map_err(|e| ClassificationError::UnrecognizedReply(e.to_string()))?;

        let text = body
            .description
            .or(body.text)
            .ok_or_else(|| {
                ClassificationError::UnrecognizedReply("no description or text field".into())
            })?;

        let result = parse_reply_text(&text, body.is_important);

        debug!(
            "Classified {}ms clip: important={}, labels={:?}",
            duration_ms, result.is_important, result.labels
        );

        Ok(result)
    }
}
