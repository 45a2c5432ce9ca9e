//! Score-axis bookkeeping for the range crawler.

use std::fmt;

/// Smallest ranking-key value a window may cover.
pub const DOMAIN_MIN: u64 = 1;

/// Upper bound of the next window. Only ever lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frontier(u64);

impl Frontier {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Lower the frontier to `value`. Higher values are ignored.
    pub fn lower_to(&mut self, value: u64) {
        self.0 = self.0.min(value);
    }

    /// True once the frontier has fallen below the domain minimum.
    pub fn is_exhausted(&self) -> bool {
        self.0 < DOMAIN_MIN
    }

    /// The next window below this frontier.
    ///
    /// `span` of `None` covers everything down to the domain minimum.
    pub fn window(&self, span: Option<u64>) -> Window {
        let floor = match span {
            Some(span) => self.0.saturating_sub(span).max(DOMAIN_MIN),
            None => DOMAIN_MIN,
        };
        Window {
            floor,
            ceiling: self.0,
        }
    }
}

/// Inclusive range of ranking-key values queried in one remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub floor: u64,
    pub ceiling: u64,
}

impl Window {
    pub fn contains(&self, value: u64) -> bool {
        (self.floor..=self.ceiling).contains(&value)
    }

    /// True if the window starts at the domain minimum.
    pub fn reaches_floor(&self) -> bool {
        self.floor <= DOMAIN_MIN
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.floor, self.ceiling)
    }
}
