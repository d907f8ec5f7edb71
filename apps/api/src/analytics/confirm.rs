/// Question put to the operator before the event log is wiped.
pub const CLEAR_PROMPT: &str = "Are you sure you want to clear all feedback analytics?";

/// A blocking yes/no prompt.
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// An answer given ahead of time, e.g. an explicit `confirm=true` flag on
/// a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preconfirmed(pub bool);

impl Confirmation for Preconfirmed {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
