use std::fmt;

/// Status codes used to categorize errors.
///
/// # Ranges:
/// - 1xxx: General errors
/// - 6xxx: Waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: General errors ===
    Internal = 1003,
    InvalidArgs = 1004,

    // === 6xxx: Waiting ===
    Timeout = 6002,
}

////////////////////////////////////////////////////////////////////////////////
// Own methods
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Numeric representation of the code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Internal or infrastructure failure.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Internal)
    }

    /// HTTP status matching the code.
    ///
    /// `Timeout` is an ordinary end of a long-poll round and therefore maps
    /// to `200`.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Timeout => 200,
            Self::InvalidArgs => 400,
            Self::Internal => 500,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Trait implementations for StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
