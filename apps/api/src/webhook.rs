//! Webhook Notifier: re-posts the webhook route's result to a configured URL
//! on a detached task. Delivery problems are logged, never returned.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { status: u16, attempts: u32 },
    Failed { attempts: u32, error: String },
}

#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Option<String>,
    max_retries: u32,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: Option<String>, max_retries: u32) -> Self {
        Self {
            client,
            url,
            max_retries,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Spawns delivery of `payload`. Returns `None` when no URL is configured.
    pub fn dispatch(&self, payload: Value) -> Option<JoinHandle<DeliveryOutcome>> {
        let url = self.url.clone()?;
        let client = self.client.clone();
        let max_retries = self.max_retries;

        Some(tokio::spawn(async move {
            let outcome = deliver(&client, &url, &payload, max_retries).await;
            match &outcome {
                DeliveryOutcome::Delivered { status, attempts } => {
                    info!("Webhook delivered to {url} ({status}) after {attempts} attempt(s)")
                }
                DeliveryOutcome::Failed { attempts, error } => {
                    warn!("Webhook delivery to {url} failed after {attempts} attempt(s): {error}")
                }
            }
            outcome
        }))
    }
}

async fn deliver(client: &Client, url: &str, payload: &Value, max_retries: u32) -> DeliveryOutcome {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let error = match client.post(url).json(payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                return DeliveryOutcome::Delivered {
                    status: resp.status().as_u16(),
                    attempts: attempt,
                };
            }
            Ok(resp) => format!("status {}", resp.status().as_u16()),
            Err(e) => e.to_string(),
        };

        if attempt > max_retries {
            return DeliveryOutcome::Failed {
                attempts: attempt,
                error,
            };
        }
        let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
        warn!("Webhook attempt {attempt} failed ({error}), retrying in {delay:?}");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Receiver {
        hits: Arc<AtomicUsize>,
        bodies: Arc<Mutex<Vec<Value>>>,
        fail_first: usize,
    }

    async fn spawn_receiver(receiver: Receiver) -> String {
        let app = Router::new()
            .route(
                "/hook",
                post(|State(r): State<Receiver>, Json(body): Json<Value>| async move {
                    let hit = r.hits.fetch_add(1, Ordering::SeqCst);
                    if hit < r.fail_first {
                        return StatusCode::SERVICE_UNAVAILABLE;
                    }
                    r.bodies.lock().unwrap().push(body);
                    StatusCode::OK
                }),
            )
            .with_state(receiver);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/hook")
    }

    #[test]
    fn test_unconfigured_notifier_does_nothing() {
        let notifier = WebhookNotifier::new(Client::new(), None, 3);
        assert!(!notifier.is_configured());
        assert!(notifier.dispatch(json!({})).is_none());
    }

    #[tokio::test]
    async fn test_delivers_payload() {
        let receiver = Receiver::default();
        let url = spawn_receiver(receiver.clone()).await;
        let notifier = WebhookNotifier::new(Client::new(), Some(url), 0);

        let outcome = notifier
            .dispatch(json!({"success": true, "report_id": "abc"}))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(outcome, DeliveryOutcome::Delivered { status: 200, attempts: 1 });
        assert_eq!(receiver.bodies.lock().unwrap()[0]["report_id"], "abc");
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let receiver = Receiver {
            fail_first: 1,
            ..Default::default()
        };
        let url = spawn_receiver(receiver.clone()).await;
        let notifier = WebhookNotifier::new(Client::new(), Some(url), 2);

        let outcome = notifier.dispatch(json!({"n": 1})).unwrap().await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Delivered { status: 200, attempts: 2 });
        assert_eq!(receiver.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_without_retries() {
        let receiver = Receiver {
            fail_first: usize::MAX,
            ..Default::default()
        };
        let url = spawn_receiver(receiver.clone()).await;
        let notifier = WebhookNotifier::new(Client::new(), Some(url), 0);

        let outcome = notifier.dispatch(json!({})).unwrap().await.unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::Failed {
                attempts: 1,
                error: "status 503".to_string()
            }
        );
    }
}
