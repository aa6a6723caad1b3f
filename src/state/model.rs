/// Lifecycle of a mask-painting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No photo loaded yet.
    #[default]
    Empty,
    Loading,
    Ready,
    Stroking,
    /// The last decode failed; previously loaded content (if any) is untouched.
    LoadFailed,
}

impl SessionState {
    pub const fn accepts_edits(self) -> bool {
        matches!(self, Self::Ready)
    }
}
