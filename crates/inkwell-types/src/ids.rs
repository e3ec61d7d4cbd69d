use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw value. Identifiers handed out by the store start at 1.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// The raw numeric value.
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Parse a path segment into an identifier.
            ///
            /// Only plain ASCII digits are accepted, and zero is rejected since
            /// no entity can carry it. Signs, whitespace and trailing garbage
            /// (`"12abc"`) are all errors.
            pub fn parse(raw: &str) -> Result<Self, TypeError> {
                if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(TypeError::InvalidId(raw.to_string()));
                }
                match raw.parse::<u64>() {
                    Ok(0) | Err(_) => Err(TypeError::InvalidId(raw.to_string())),
                    Ok(value) => Ok(Self(value)),
                }
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $label, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a registered user.
    UserId,
    "UserId"
);

numeric_id!(
    /// Identifier of a blog post. Allocated from a counter independent of [`UserId`].
    PostId,
    "PostId"
);
