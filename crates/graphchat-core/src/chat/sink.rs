//! Output sink: where streamed text and tool steps are shown to the user

use parking_lot::Mutex;

/// Receives output for one conversation turn
///
/// A chat UI host implements this to render tokens as they arrive and to show
/// tool invocations as steps.
pub trait OutputSink: Send + Sync {
    /// Append a streamed text fragment to the message being displayed
    fn write(&self, fragment: &str);

    /// The current model message is complete
    fn finish(&self);

    /// Name the tool step currently running
    fn set_step_name(&self, _name: &str) {}

    /// Record the tool step's output
    fn set_step_output(&self, _output: &str) {}
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write(&self, _fragment: &str) {}
    fn finish(&self) {}
}

/// A tool step as recorded by [`CollectingSink`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedStep {
    pub name: String,
    pub output: Option<String>,
}

#[derive(Debug, Default)]
struct Recorded {
    fragments: Vec<String>,
    messages: Vec<String>,
    current: String,
    steps: Vec<RecordedStep>,
}

/// Sink that records everything written to it
#[derive(Debug, Default)]
pub struct CollectingSink {
    inner: Mutex<Recorded>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fragment, in arrival order
    pub fn fragments(&self) -> Vec<String> {
        self.inner.lock().fragments.clone()
    }

    /// Completed messages, one per `finish` call
    pub fn messages(&self) -> Vec<String> {
        self.inner.lock().messages.clone()
    }

    /// All streamed text concatenated
    pub fn text(&self) -> String {
        self.inner.lock().fragments.concat()
    }

    pub fn steps(&self) -> Vec<RecordedStep> {
        self.inner.lock().steps.clone()
    }
}

impl OutputSink for CollectingSink {
    fn write(&self, fragment: &str) {
        let mut inner = self.inner.lock();
        inner.fragments.push(fragment.to_string());
        inner.current.push_str(fragment);
    }

    fn finish(&self) {
        let mut inner = self.inner.lock();
        let message = std::mem::take(&mut inner.current);
        inner.messages.push(message);
    }

    fn set_step_name(&self, name: &str) {
        self.inner.lock().steps.push(RecordedStep {
            name: name.to_string(),
            output: None,
        });
    }

    fn set_step_output(&self, output: &str) {
        let mut inner = self.inner.lock();
        match inner.steps.last_mut() {
            Some(step) if step.output.is_none() => step.output = Some(output.to_string()),
            _ => inner.steps.push(RecordedStep {
                name: String::new(),
                output: Some(output.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_messages() {
        let sink = CollectingSink::new();
        sink.write("There are ");
        sink.write("42 nodes.");
        sink.finish();
        sink.finish();

        assert_eq!(sink.fragments(), vec!["There are ", "42 nodes."]);
        assert_eq!(sink.messages(), vec!["There are 42 nodes.", ""]);
        assert_eq!(sink.text(), "There are 42 nodes.");
    }

    #[test]
    fn test_collecting_sink_steps() {
        let sink = CollectingSink::new();
        sink.set_step_name("get_schema");
        sink.set_step_output("{\"schema\":\"...\"}");
        sink.set_step_output("orphan");

        assert_eq!(
            sink.steps(),
            vec![
                RecordedStep {
                    name: "get_schema".to_string(),
                    output: Some("{\"schema\":\"...\"}".to_string()),
                },
                RecordedStep {
                    name: String::new(),
                    output: Some("orphan".to_string()),
                },
            ]
        );
    }
}
