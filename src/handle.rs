//! Document-wide handles and the seed state that issues them.
//!
//! Handles are written as upper-case hexadecimal in DXF files. Handle `0`
//! is never issued and never parses.

use core::fmt;
use core::num::NonZeroU64;
use core::str::FromStr;

/// Document-wide unique identifier of an object, independent of its name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Handle(NonZeroU64);

impl Handle {
    /// Returns `None` for zero, which is not a valid handle.
    pub const fn new(value: u64) -> Option<Self> {
        match NonZeroU64::new(value) {
            Some(v) => Some(Handle(v)),
            None => None,
        }
    }

    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Parse the hexadecimal form used in DXF group code 5.
    pub fn from_hex(s: &str) -> Result<Self, ParseHandleError> {
        s.parse()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0.get())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseHandleError {
    #[error("handle string is empty")]
    Empty,
    #[error("handle {0:?} is not hexadecimal")]
    NotHex(String),
    #[error("handle 0 is reserved and cannot be used")]
    Zero,
}

impl FromStr for Handle {
    type Err = ParseHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseHandleError::Empty);
        }
        let v = u64::from_str_radix(s, 16).map_err(|_| ParseHandleError::NotHex(s.to_string()))?;
        Handle::new(v).ok_or(ParseHandleError::Zero)
    }
}

/// Next-handle counter state (`$HANDSEED` in a DXF header).
///
/// Allocation is a pure function of the seed: callers thread the returned
/// seed back into their own storage.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandleSeed(NonZeroU64);

impl HandleSeed {
    pub const FIRST: HandleSeed = HandleSeed(NonZeroU64::MIN);

    /// Seed whose next allocation is `next`.
    pub const fn starting_at(next: Handle) -> Self {
        HandleSeed(next.0)
    }

    /// The handle the next `allocate` call will return.
    pub const fn peek(self) -> Handle {
        Handle(self.0)
    }

    /// Issue the next handle and return the advanced seed.
    pub fn allocate(self) -> (Handle, HandleSeed) {
        let next = self
            .0
            .checked_add(1)
            .expect("handle space exhausted: seed reached u64::MAX");
        (Handle(self.0), HandleSeed(next))
    }

    /// Advance past `handle` if it is at or beyond the seed, so a handle
    /// assigned elsewhere (e.g. read from a file) is never issued again.
    pub fn observe(self, handle: Handle) -> HandleSeed {
        if handle.0 >= self.0 {
            HandleSeed(handle.0.saturating_add(1))
        } else {
            self
        }
    }
}

impl Default for HandleSeed {
    fn default() -> Self {
        Self::FIRST
    }
}
