//! Domain model for the project -> task -> time entry hierarchy.
//!
//! # Responsibility
//! - Define canonical records used by core business logic.
//! - Own field-level validation and the symbolic names of every enum.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Instants are UTC and carry whole-millisecond precision.
//! - Deletion is destructive and cascades; there are no tombstones.

use std::fmt::{Display, Formatter};

/// Declares a closed enum exchanged by its symbolic variant name.
///
/// Parsing is exact and case-sensitive. Unknown names surface as
/// `ValidationError::UnknownValue` carrying `$field`.
macro_rules! symbolic_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $field:literal {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Symbolic wire/storage name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::model::validation::ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    other => Err($crate::model::validation::ValidationError::UnknownValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub mod detail;
pub mod project;
pub mod task;
pub mod time_entry;
pub mod validation;

/// Entity family, used to label not-found and parent errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Task,
    TimeEntry,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => f.write_str("project"),
            Self::Task => f.write_str("task"),
            Self::TimeEntry => f.write_str("time entry"),
        }
    }
}
