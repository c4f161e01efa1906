use issuewatch_core::{Issue, NotifyError, WebhookKind, WebhookTarget};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// The message every target receives for a new issue.
pub fn format_message(title: &str, url: &str) -> String {
    format!("New Issue Created:\n\nTitle: {title}\nURL: {url}")
}

/// JSON body for `kind`: the message under the platform's field name.
pub fn build_payload(kind: WebhookKind, message: &str) -> Value {
    let mut body = Map::new();
    body.insert(
        kind.payload_field().to_string(),
        Value::String(message.to_string()),
    );
    Value::Object(body)
}

#[derive(Debug)]
pub struct DeliveryOutcome {
    pub kind: WebhookKind,
    pub result: Result<(), NotifyError>,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Sends new-issue messages to every configured chat webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http_client: Client,
    targets: Vec<WebhookTarget>,
}

impl WebhookNotifier {
    pub fn new(targets: Vec<WebhookTarget>) -> Self {
        Self::with_client(Client::new(), targets)
    }

    pub fn with_client(http_client: Client, targets: Vec<WebhookTarget>) -> Self {
        Self {
            http_client,
            targets,
        }
    }

    pub fn targets(&self) -> &[WebhookTarget] {
        &self.targets
    }

    /// Delivers to each target in turn. Failures are logged and returned, one
    /// target failing does not stop the others.
    pub async fn notify(&self, issue: &Issue) -> Vec<DeliveryOutcome> {
        let message = format_message(&issue.title, &issue.url);

        let mut outcomes = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let result = self.deliver(target, &message).await;
            match &result {
                Ok(()) => info!("Message successfully sent to {}", target.kind),
                Err(e) => warn!("{}", e),
            }
            outcomes.push(DeliveryOutcome {
                kind: target.kind,
                result,
            });
        }
        outcomes
    }

    async fn deliver(&self, target: &WebhookTarget, message: &str) -> Result<(), NotifyError> {
        let response = self
            .http_client
            .post(&target.url)
            .json(&build_payload(target.kind, message))
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                target: target.kind.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let expected = target.kind.success_status();
        if status != expected {
            return Err(NotifyError::UnexpectedStatus {
                target: target.kind.to_string(),
                status_code: status,
                expected,
            });
        }
        Ok(())
    }
}
