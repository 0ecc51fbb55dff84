//! Test probe — scripted `SelectorProbe` implementation for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use scenetour_core::probe::SelectorProbe;

#[derive(Debug, Default)]
struct ProbeState {
    /// Remaining negative answers per selector before it turns present.
    pending: HashMap<String, usize>,
    polls: usize,
}

/// A probe whose selectors appear on a script. Unknown selectors are absent.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    state: Mutex<ProbeState>,
}

impl ScriptedProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `selector` present from now on.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn reveal(&self, selector: &str) {
        self.reveal_after(selector, 0);
    }

    /// Makes `selector` present once it has been polled `polls` times.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn reveal_after(&self, selector: &str, polls: usize) {
        self.state
            .lock()
            .unwrap()
            .pending
            .insert(selector.to_owned(), polls);
    }

    /// Total number of `is_present` calls so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn poll_count(&self) -> usize {
        self.state.lock().unwrap().polls
    }
}

impl SelectorProbe for ScriptedProbe {
    fn is_present(&self, selector: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        state.polls += 1;
        match state.pending.get_mut(selector) {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        }
    }
}
