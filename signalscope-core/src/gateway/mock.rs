//! Mock gateway for tests.

use super::{ModelGateway, NO_RESEARCH_DATA};
use crate::error::GatewayError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// A scripted [`ModelGateway`] that replays queued outcomes.
///
/// Queue outcomes in call order with [`queue_structured`] and
/// [`queue_search`]; each call consumes the next entry. An exhausted queue
/// fails the call, which keeps tests honest about how many backend calls a
/// scenario makes.
///
/// [`queue_structured`]: MockGateway::queue_structured
/// [`queue_search`]: MockGateway::queue_search
#[derive(Default)]
pub struct MockGateway {
    structured: Mutex<Vec<Result<String, GatewayError>>>,
    search: Mutex<Vec<Result<String, GatewayError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// One recorded gateway invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Structured,
    Search,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next `generate_structured` call.
    pub fn queue_structured(&self, outcome: Result<String, GatewayError>) {
        self.structured.lock().unwrap().push(outcome);
    }

    /// Queue the outcome of the next `generate_with_search` call.
    ///
    /// Queue `Ok("")` to simulate an empty backend response; the mock
    /// applies the same sentinel substitution as the real gateway.
    pub fn queue_search(&self, outcome: Result<String, GatewayError>) {
        self.search.lock().unwrap().push(outcome);
    }

    /// Prompts received so far, in call order.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: CallKind, prompt: &str) {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            prompt: prompt.to_string(),
        });
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn generate_structured(
        &self,
        prompt: &str,
        _schema: &Value,
    ) -> Result<String, GatewayError> {
        self.record(CallKind::Structured, prompt);
        let mut queue = self.structured.lock().unwrap();
        if queue.is_empty() {
            return Err(GatewayError::Connection {
                message: "MockGateway: no queued structured response".to_string(),
            });
        }
        match queue.remove(0) {
            Ok(text) if text.trim().is_empty() => Err(GatewayError::EmptyResponse),
            other => other,
        }
    }

    async fn generate_with_search(&self, prompt: &str) -> Result<String, GatewayError> {
        self.record(CallKind::Search, prompt);
        let mut queue = self.search.lock().unwrap();
        if queue.is_empty() {
            return Err(GatewayError::Connection {
                message: "MockGateway: no queued search response".to_string(),
            });
        }
        match queue.remove(0) {
            Ok(text) if text.trim().is_empty() => Ok(NO_RESEARCH_DATA.to_string()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_structured_queue_entry_becomes_empty_response() {
        let mock = MockGateway::new();
        mock.queue_structured(Ok(String::new()));
        let err = mock
            .generate_structured("p", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_empty_search_queue_entry_becomes_sentinel() {
        let mock = MockGateway::new();
        mock.queue_search(Ok(String::new()));
        let text = mock.generate_with_search("p").await.unwrap();
        assert_eq!(text, NO_RESEARCH_DATA);
    }

    #[tokio::test]
    async fn test_calls_are_recorded_in_order() {
        let mock = MockGateway::new();
        mock.queue_structured(Ok("{}".to_string()));
        mock.queue_search(Ok("findings".to_string()));
        mock.generate_structured("first", &serde_json::json!({}))
            .await
            .unwrap();
        mock.generate_with_search("second").await.unwrap();

        let calls = mock.recorded_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].kind, CallKind::Structured);
        assert_eq!(calls[1].prompt, "second");
    }
}
