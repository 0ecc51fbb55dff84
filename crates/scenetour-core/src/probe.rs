//! Host page probe abstraction.

/// Answers whether a selector currently matches something in the host page.
///
/// The engine never touches the page itself; it polls a probe while a step's
/// `waitUntil.selector` is pending.
pub trait SelectorProbe: Send + Sync {
    /// Returns `true` if `selector` matches at least one element.
    fn is_present(&self, selector: &str) -> bool;
}

/// A probe for hosts without a page: every selector is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPresent;

impl SelectorProbe for AlwaysPresent {
    fn is_present(&self, _selector: &str) -> bool {
        true
    }
}
