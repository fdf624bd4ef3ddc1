//! Invocation records and the callback interface of execution engines
//!
//! An execution engine runs a [`FunctionVersion`](crate::function::FunctionVersion)
//! and reports back through a [`ServiceEndpoint`]: results, errors and logs
//! per invocation, plus readiness of the environments it starts.

use serde::{Deserialize, Serialize};

/// How the caller waits for an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InvocationType {
    /// Queued; the caller does not wait
    Event,
    /// The caller waits for the result
    #[default]
    RequestResponse,
    /// Validate parameters and permissions only
    DryRun,
}

/// One request to run a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Raw event payload
    pub payload: Vec<u8>,
    /// ARN the caller addressed (qualified or not)
    pub invoked_arn: String,
    /// Base64 client context, if any
    pub client_context: Option<String>,
    /// How the caller waits
    pub invocation_type: InvocationType,
}

impl Invocation {
    /// Synchronous invocation of `invoked_arn` with `payload`.
    #[must_use]
    pub fn new(invoked_arn: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            invoked_arn: invoked_arn.into(),
            client_context: None,
            invocation_type: InvocationType::RequestResponse,
        }
    }

    /// Change the invocation type.
    #[must_use]
    pub const fn with_type(mut self, invocation_type: InvocationType) -> Self {
        self.invocation_type = invocation_type;
        self
    }
}

/// Successful outcome of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    /// Invocation id
    pub invocation_id: String,
    /// Response payload
    pub payload: Option<Vec<u8>>,
    /// Qualifier that actually ran
    pub executed_version: Option<String>,
    /// Captured log tail
    pub logs: Option<String>,
}

/// Failed outcome of an invocation (function error).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationError {
    /// Invocation id
    pub invocation_id: String,
    /// Error payload
    pub payload: Option<Vec<u8>>,
    /// Qualifier that actually ran
    pub executed_version: Option<String>,
    /// Captured log tail
    pub logs: Option<String>,
}

/// Logs of an invocation, delivered separately from its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationLogs {
    /// Invocation id
    pub invocation_id: String,
    /// Log text
    pub logs: String,
}

/// Receiver of invocation outcomes and environment status reports.
///
/// Implemented by whoever dispatches invocations to execution engines. Calls
/// may arrive from any thread.
pub trait ServiceEndpoint: Send + Sync {
    /// Process the result of an invocation.
    fn invocation_result(&self, invoke_id: &str, result: InvocationResult);

    /// Process an error raised during an invocation.
    fn invocation_error(&self, invoke_id: &str, error: InvocationError);

    /// Process the logs of an invocation.
    fn invocation_logs(&self, invoke_id: &str, logs: InvocationLogs);

    /// An execution environment finished starting.
    fn status_ready(&self, executor_id: &str);

    /// An execution environment failed to start.
    fn status_error(&self, executor_id: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ServiceEndpoint for Recorder {
        fn invocation_result(&self, invoke_id: &str, result: InvocationResult) {
            self.events
                .lock()
                .push(format!("result:{invoke_id}:{:?}", result.executed_version));
        }

        fn invocation_error(&self, invoke_id: &str, _error: InvocationError) {
            self.events.lock().push(format!("error:{invoke_id}"));
        }

        fn invocation_logs(&self, invoke_id: &str, logs: InvocationLogs) {
            self.events
                .lock()
                .push(format!("logs:{invoke_id}:{}", logs.logs));
        }

        fn status_ready(&self, executor_id: &str) {
            self.events.lock().push(format!("ready:{executor_id}"));
        }

        fn status_error(&self, executor_id: &str) {
            self.events.lock().push(format!("failed:{executor_id}"));
        }
    }

    #[test]
    fn test_endpoint_is_object_safe() {
        let recorder = std::sync::Arc::new(Recorder::default());
        let endpoint: std::sync::Arc<dyn ServiceEndpoint> = recorder.clone();

        endpoint.status_ready("env-1");
        endpoint.invocation_result(
            "inv-1",
            InvocationResult {
                invocation_id: "inv-1".to_string(),
                payload: Some(b"{}".to_vec()),
                executed_version: Some("3".to_string()),
                logs: None,
            },
        );
        endpoint.invocation_logs(
            "inv-1",
            InvocationLogs {
                invocation_id: "inv-1".to_string(),
                logs: "START".to_string(),
            },
        );

        assert_eq!(
            *recorder.events.lock(),
            vec!["ready:env-1", "result:inv-1:Some(\"3\")", "logs:inv-1:START"]
        );
    }

    #[test]
    fn test_invocation_defaults() {
        let invocation = Invocation::new("arn:aws:lambda:us-east-1:000000000000:function:f", "{}");
        assert_eq!(invocation.invocation_type, InvocationType::RequestResponse);
        assert_eq!(invocation.payload, b"{}");

        let event = invocation.with_type(InvocationType::Event);
        assert_eq!(
            serde_json::to_string(&event.invocation_type).unwrap(),
            "\"Event\""
        );
    }
}
