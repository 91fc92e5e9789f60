use crate::Bubble;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatViewModel {
    pub bubbles: Vec<Bubble>,
    pub input: String,
    /// Typing indicator is visible.
    pub typing: bool,
    /// An exchange is in flight; further sends are queued.
    pub busy: bool,
    /// Sends waiting for the in-flight exchange to end.
    pub queued: usize,
    pub should_exit: bool,
    pub dirty: bool,
}
