//! Progress notification port
//!
//! Defines the interface for reporting progress while a conversation runs.

use duel_domain::{RunState, Speaker, Turn};
use std::sync::Arc;
use std::time::Duration;

use super::llm_gateway::GatewayError;

/// Callback for progress updates during a conversation run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, spinner, etc.). Callbacks are invoked
/// from the run's background task, so implementations must be `Send + Sync`.
pub trait ConversationProgressNotifier: Send + Sync {
    /// Called once the run is `Running`, before the first turn
    fn on_run_start(&self, _max_turns: u32) {}

    /// Called right before the acting model is asked for a turn
    fn on_turn_start(&self, turn: u32, speaker: Speaker, nickname: &str);

    /// Called after a turn has been appended to the transcript
    fn on_turn_complete(&self, turn: &Turn);

    /// Called when the Model Client backs off before retrying a call
    fn on_turn_retry(&self, _turn: u32, _attempt: u32, _delay: Duration, _error: &GatewayError) {}

    /// Called once with the final state, whatever the outcome
    fn on_run_finish(&self, state: &RunState);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ConversationProgressNotifier for NoProgress {
    fn on_turn_start(&self, _turn: u32, _speaker: Speaker, _nickname: &str) {}
    fn on_turn_complete(&self, _turn: &Turn) {}
    fn on_run_finish(&self, _state: &RunState) {}
}

/// A progress notifier that fans out to several inner notifiers.
///
/// Delegates are shared (`Arc`) because the run loop outlives the caller's
/// stack frame.
pub struct CompositeProgress {
    delegates: Vec<Arc<dyn ConversationProgressNotifier>>,
}

impl CompositeProgress {
    pub fn new(delegates: Vec<Arc<dyn ConversationProgressNotifier>>) -> Self {
        Self { delegates }
    }
}

/// Macro to delegate a method call to all inner notifiers.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl ConversationProgressNotifier for CompositeProgress {
    fn on_run_start(&self, max_turns: u32) {
        delegate!(self, on_run_start, max_turns);
    }

    fn on_turn_start(&self, turn: u32, speaker: Speaker, nickname: &str) {
        delegate!(self, on_turn_start, turn, speaker, nickname);
    }

    fn on_turn_complete(&self, turn: &Turn) {
        delegate!(self, on_turn_complete, turn);
    }

    fn on_turn_retry(&self, turn: u32, attempt: u32, delay: Duration, error: &GatewayError) {
        delegate!(self, on_turn_retry, turn, attempt, delay, error);
    }

    fn on_run_finish(&self, state: &RunState) {
        delegate!(self, on_run_finish, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ConversationProgressNotifier for Recorder {
        fn on_turn_start(&self, turn: u32, _speaker: Speaker, nickname: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {} {}", turn, nickname));
        }

        fn on_turn_complete(&self, turn: &Turn) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {}", turn.number()));
        }

        fn on_run_finish(&self, state: &RunState) {
            self.events
                .lock()
                .unwrap()
                .push(format!("finish {}", state.status()));
        }
    }

    #[test]
    fn test_composite_fans_out_in_order() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let composite = CompositeProgress::new(vec![first.clone(), second.clone()]);

        composite.on_turn_start(1, Speaker::A, "Alice");
        composite.on_turn_complete(&Turn::new(1, Speaker::A, "hi", Duration::ZERO));
        composite.on_run_finish(&RunState::new());

        let expected = vec!["start 1 Alice", "done 1", "finish idle"];
        assert_eq!(*first.events.lock().unwrap(), expected);
        assert_eq!(*second.events.lock().unwrap(), expected);
    }
}
