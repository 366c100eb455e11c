//! Request/response contract with the browser side, independent of transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::classifier::LinkClassifier;
use crate::types::{ArchiveCheck, LinkCheckResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ValidateLink { url: String },
    CheckArchive { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    LinkCheck(LinkCheckResult),
    Archive(ArchiveCheck),
    Error { error: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct LinkService {
    classifier: LinkClassifier,
}

impl LinkService {
    pub fn new(classifier: LinkClassifier) -> Self {
        Self { classifier }
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::ValidateLink { url } => {
                Response::LinkCheck(self.classifier.classify_isolated(&url).await)
            }
            Request::CheckArchive { url } => {
                match self.classifier.resolver().check(&url).await {
                    Ok(check) => Response::Archive(check),
                    Err(e) => {
                        warn!(url = %url, error = %e, "Archive check failed");
                        Response::error(format!("Failed to check archive: {e}"))
                    }
                }
            }
        }
    }

    /// Dispatch a raw JSON message. Malformed and unknown requests get an error response.
    pub async fn handle_value(&self, message: Value) -> Response {
        let action = match message.get("action") {
            Some(Value::String(action)) => action.clone(),
            Some(other) => return Response::error(format!("Unsupported action: {other}")),
            None => return Response::error("Missing action"),
        };

        match serde_json::from_value::<Request>(message) {
            Ok(request) => {
                info!(action = %action, "Handling request");
                self.handle(request).await
            }
            Err(_) if !is_known_action(&action) => {
                Response::error(format!("Unsupported action: {action}"))
            }
            Err(e) => Response::error(format!("Invalid {action} request: {e}")),
        }
    }
}

fn is_known_action(action: &str) -> bool {
    matches!(action, "validateLink" | "checkArchive")
}
