//! represents the verdict reached about a single attempt

/// all possible actions
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[non_exhaustive]
pub enum Action {
    /// the response doesn't prove the candidate was accepted; move on
    Discard,

    /// the response proves the candidate was accepted; no new candidates should
    /// be dispatched, while whatever is already in flight is allowed to finish
    StopSearching,
}

impl Action {
    /// whether or not this action marks the attempt as a hit
    #[must_use]
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::StopSearching)
    }
}
