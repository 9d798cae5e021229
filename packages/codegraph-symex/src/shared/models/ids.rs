//! Arena handles
//!
//! Symbols, methods and blocks live in `Vec` arenas owned by the semantic model and the
//! control flow graph. Everything else refers to them through these `u32` handles.

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Arena slot of this handle
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Handle of a variable, parameter or field symbol
    SymbolId,
    "sym#"
);

arena_id!(
    /// Handle of a method symbol
    MethodId,
    "method#"
);

arena_id!(
    /// Handle of a basic block inside one control flow graph
    BlockId,
    "B"
);
