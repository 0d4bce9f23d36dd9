/// Where the quiz session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No topic selected.
    Welcome,
    /// Questions for the selected topic are being fetched.
    Loading,
    /// A question is on screen.
    InProgress,
    /// Every question of the topic has been passed.
    Complete,
}
