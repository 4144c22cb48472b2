//! Data models for the application
//!
//! This module contains the data structures exchanged by the intake gateway,
//! organized by concern. Each sub-module represents one part of an upload record.

/// Implements the string conversions shared by every closed-vocabulary form field:
/// `ALL`, `as_str`, `Display` and `FromStr` (exact, case-sensitive wire values).
macro_rules! form_enum {
    ($name:ident, $label:literal, { $($variant:ident => $value:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            /// Wire values in declaration order
            pub fn values() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(format!(
                        "Invalid {} '{}'. Allowed values: {}",
                        $label,
                        s,
                        Self::values().join(", ")
                    )),
                }
            }
        }
    };
}

mod options;
mod research;
mod storage;
mod technical;
mod upload;

// Re-export all models for convenient imports
pub use options::*;
pub use research::*;
pub use storage::*;
pub use technical::*;
pub use upload::*;
