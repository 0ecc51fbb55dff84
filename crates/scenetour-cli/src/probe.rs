//! Selector probe for the terminal host.

use std::collections::HashSet;
use std::sync::Arc;

use scenetour_core::probe::{AlwaysPresent, SelectorProbe};

/// Reports a fixed set of selectors as present.
#[derive(Debug, Clone, Default)]
pub struct ListedSelectors {
    present: HashSet<String>,
}

impl ListedSelectors {
    #[must_use]
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            present: selectors.into_iter().map(Into::into).collect(),
        }
    }
}

impl SelectorProbe for ListedSelectors {
    fn is_present(&self, selector: &str) -> bool {
        self.present.contains(selector)
    }
}

/// Picks the probe for a list of present selectors. An empty list means the
/// terminal has no page to consult and every selector counts as present.
#[must_use]
pub fn probe_for(selectors: &[String]) -> Arc<dyn SelectorProbe> {
    if selectors.is_empty() {
        Arc::new(AlwaysPresent)
    } else {
        Arc::new(ListedSelectors::new(selectors.iter().cloned()))
    }
}
