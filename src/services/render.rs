//! Message rendering with a typed-reveal animation.
//!
//! At most one animation writes to a given surface: starting a new render on
//! the same target stops the previous one at its next tick.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::response::{escape_markup, ParsedReply};

const DEFAULT_TICK: Duration = Duration::from_millis(12);
const DEFAULT_CHARS_PER_TICK: usize = 1;

/// A display area owned by the UI shell. Receives escaped markup only.
pub trait RenderSurface {
    /// Stable identity of the display target.
    fn target_id(&self) -> String;

    fn clear(&self);

    fn append_markup(&self, markup: &str);

    fn scroll_to_bottom(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Completed,
    /// A newer render claimed the same target before this one finished.
    Superseded,
}

#[derive(Default)]
struct AnimatorState {
    next_generation: u64,
    active: HashMap<String, u64>,
}

pub struct RenderAnimator {
    tick: Duration,
    chars_per_tick: usize,
    state: Mutex<AnimatorState>,
}

impl Default for RenderAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_TICK, DEFAULT_CHARS_PER_TICK)
    }
}

impl RenderAnimator {
    pub fn new(tick: Duration, chars_per_tick: usize) -> Self {
        Self {
            tick,
            chars_per_tick: chars_per_tick.max(1),
            state: Mutex::new(AnimatorState::default()),
        }
    }

    /// Render `reply` into `surface`. Code blocks are never animated.
    pub async fn show<S: RenderSurface>(
        &self,
        surface: &S,
        reply: &ParsedReply,
        animate: bool,
    ) -> RenderOutcome {
        let target = surface.target_id();
        let generation = self.claim(&target);
        surface.clear();

        let text = match reply {
            ParsedReply::PlainText(text) if animate => text,
            _ => {
                surface.append_markup(&reply.to_markup());
                surface.scroll_to_bottom();
                self.release(&target, generation);
                return RenderOutcome::Completed;
            }
        };

        let chars: Vec<char> = text.chars().collect();
        for chunk in chars.chunks(self.chars_per_tick) {
            tokio::time::sleep(self.tick).await;
            if !self.is_current(&target, generation) {
                return RenderOutcome::Superseded;
            }
            let piece: String = chunk.iter().collect();
            surface.append_markup(&escape_markup(&piece));
            surface.scroll_to_bottom();
        }

        self.release(&target, generation);
        RenderOutcome::Completed
    }

    fn claim(&self, target: &str) -> u64 {
        let Ok(mut state) = self.state.lock() else {
            return 0;
        };
        state.next_generation += 1;
        let generation = state.next_generation;
        state.active.insert(target.to_string(), generation);
        generation
    }

    fn is_current(&self, target: &str, generation: u64) -> bool {
        self.state
            .lock()
            .map(|state| state.active.get(target) == Some(&generation))
            .unwrap_or(false)
    }

    fn release(&self, target: &str, generation: u64) {
        if let Ok(mut state) = self.state.lock() {
            if state.active.get(target) == Some(&generation) {
                state.active.remove(target);
            }
        }
    }
}
