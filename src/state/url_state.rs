/// URL state definitions for tracking crawl progress
///
/// Every URL the crawl knows about moves through these states at most once.
use std::fmt;

/// Represents the current state of a URL within one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Queued in the frontier, not yet dispatched
    Pending,

    /// Dispatched to the fetch executor in the current round
    InFlight,

    /// Fetch attempted; links extracted or the fetch failed
    Visited,

    /// Confirmed product page; never fetched for link discovery
    Product,
}

impl UrlState {
    /// Returns true if no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Visited | Self::Product)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// `None` as the source stands for a URL that has not been seen before.
    pub fn can_transition(from: Option<UrlState>, next: UrlState) -> bool {
        matches!(
            (from, next),
            (None, Self::Pending)
                | (None, Self::Product)
                | (Some(Self::Pending), Self::InFlight)
                | (Some(Self::InFlight), Self::Visited)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Visited => "visited",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
