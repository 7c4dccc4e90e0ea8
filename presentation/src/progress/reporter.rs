//! Progress reporting while a model is generating

use colored::Colorize;
use duel_application::GatewayError;
use duel_application::ports::progress::ConversationProgressNotifier;
use duel_domain::{RunState, Speaker, Turn};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

struct ActiveTurn {
    bar: ProgressBar,
    nickname: String,
    turn: u32,
}

/// Shows "<nickname> is thinking... (Turn n/max)" while a call is in flight
pub struct ProgressReporter {
    hidden: bool,
    max_turns: AtomicU32,
    active: Mutex<Option<ActiveTurn>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            hidden: false,
            max_turns: AtomicU32::new(0),
            active: Mutex::new(None),
        }
    }

    /// Reporter that tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::new()
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn thinking_message(&self, nickname: &str, turn: u32) -> String {
        let max_turns = self.max_turns.load(Ordering::Relaxed);
        format!("{} is thinking... (Turn {}/{})", nickname, turn, max_turns)
    }

    /// Message of the spinner currently shown, if any.
    pub fn current_message(&self) -> Option<String> {
        let guard = self.active.lock().ok()?;
        guard.as_ref().map(|active| active.bar.message())
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.active.lock()
            && let Some(active) = guard.take()
        {
            active.bar.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationProgressNotifier for ProgressReporter {
    fn on_run_start(&self, max_turns: u32) {
        self.max_turns.store(max_turns, Ordering::Relaxed);
    }

    fn on_turn_start(&self, turn: u32, speaker: Speaker, nickname: &str) {
        self.clear();

        let bar = if self.hidden {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new_spinner()
        };
        bar.set_style(Self::spinner_style());
        let name = match speaker {
            Speaker::A => nickname.blue().bold().to_string(),
            Speaker::B => nickname.magenta().bold().to_string(),
        };
        bar.set_message(self.thinking_message(&name, turn));
        if !self.hidden {
            bar.enable_steady_tick(TICK_INTERVAL);
        }

        if let Ok(mut guard) = self.active.lock() {
            *guard = Some(ActiveTurn {
                bar,
                nickname: name,
                turn,
            });
        }
    }

    fn on_turn_complete(&self, _turn: &Turn) {
        self.clear();
    }

    fn on_turn_retry(&self, turn: u32, attempt: u32, delay: Duration, error: &GatewayError) {
        let Ok(guard) = self.active.lock() else {
            return;
        };
        if let Some(active) = guard.as_ref().filter(|active| active.turn == turn) {
            active.bar.set_message(format!(
                "{} {}",
                self.thinking_message(&active.nickname, turn),
                format!(
                    "[{}, retry {} in {:.1}s]",
                    error.kind(),
                    attempt,
                    delay.as_secs_f64()
                )
                .yellow()
            ));
        }
    }

    fn on_run_finish(&self, _state: &RunState) {
        self.clear();
    }
}
