// Mock controllers for testing

use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use waypoint_core::{Arguments, ControllerBlueprint, HandlerError, HandlerSpec};

/// What a mocked handler does when invoked
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Succeed with this JSON value
    Respond(Value),
    /// Reject with this value (400)
    Reject(Value),
    /// Fail internally with this message (500)
    Fail(String),
    /// Panic with this message
    Panic(String),
}

impl MockOutcome {
    fn run(self) -> Result<Value, HandlerError> {
        match self {
            MockOutcome::Respond(value) => Ok(value),
            MockOutcome::Reject(value) => Err(HandlerError::Rejected(value)),
            MockOutcome::Fail(message) => Err(HandlerError::internal_message(message)),
            MockOutcome::Panic(message) => panic!("{}", message),
        }
    }
}

/// One recorded handler invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub handler: String,
    pub args: Arguments,
}

type CallLog = Arc<Mutex<Vec<RecordedCall>>>;

/// Per-request instance built by a [`MockController`] blueprint.
pub struct MockInstance {
    calls: CallLog,
}

/// Controller double with canned outcomes that records every call.
///
/// ```
/// use serde_json::json;
/// use waypoint_core::HandlerSpec;
/// use waypoint_testing::MockController;
///
/// let mock = MockController::new("UsersController")
///     .responds(HandlerSpec::new("get").params(["id"]), json!({"id": 1}))
///     .rejects(HandlerSpec::new("create").params(["name"]), "name is required");
///
/// let blueprint = mock.blueprint();
/// assert_eq!(mock.method_call_count("get"), 0);
/// # drop(blueprint);
/// ```
#[derive(Clone)]
pub struct MockController {
    name: String,
    handlers: Vec<(HandlerSpec, MockOutcome)>,
    calls: CallLog,
}

impl MockController {
    /// Create a new mock controller
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            handlers: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a handler with an explicit outcome
    pub fn handler(mut self, spec: HandlerSpec, outcome: MockOutcome) -> Self {
        self.handlers.push((spec, outcome));
        self
    }

    pub fn responds(self, spec: HandlerSpec, value: impl Into<Value>) -> Self {
        self.handler(spec, MockOutcome::Respond(value.into()))
    }

    pub fn rejects(self, spec: HandlerSpec, value: impl Into<Value>) -> Self {
        self.handler(spec, MockOutcome::Reject(value.into()))
    }

    pub fn fails(self, spec: HandlerSpec, message: &str) -> Self {
        self.handler(spec, MockOutcome::Fail(message.to_string()))
    }

    pub fn panics(self, spec: HandlerSpec, message: &str) -> Self {
        self.handler(spec, MockOutcome::Panic(message.to_string()))
    }

    /// Blueprint whose instances share this mock's call log
    pub fn blueprint(&self) -> ControllerBlueprint<MockInstance> {
        let calls = self.calls.clone();
        let mut blueprint = ControllerBlueprint::new(self.name.clone()).factory(move |_ctx| MockInstance {
            calls: calls.clone(),
        });

        for (spec, outcome) in &self.handlers {
            let handler = spec.name.clone();
            let outcome = outcome.clone();
            blueprint = blueprint.handler(spec.clone(), move |instance: MockInstance, args: Arguments| {
                let handler = handler.clone();
                let outcome = outcome.clone();
                async move {
                    lock(&instance.calls).push(RecordedCall { handler, args });
                    outcome.run()
                }
            });
        }
        blueprint
    }

    /// Get all calls
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Get the number of calls to a specific method
    pub fn method_call_count(&self, method: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.handler == method).count()
    }

    /// Arguments of the most recent call to `method`
    pub fn last_call(&self, method: &str) -> Option<Arguments> {
        lock(&self.calls)
            .iter()
            .rev()
            .find(|c| c.handler == method)
            .map(|c| c.args.clone())
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.method_call_count(method) > 0
    }

    /// Clear all calls
    pub fn clear(&self) {
        lock(&self.calls).clear();
    }
}

fn lock(calls: &CallLog) -> MutexGuard<'_, Vec<RecordedCall>> {
    calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
