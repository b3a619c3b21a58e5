//! Outcome of a cart operation.

use serde::{Deserialize, Serialize};

/// What a cart operation did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    /// A new item was appended with quantity 1.
    Added,
    /// An existing item's quantity went up.
    Incremented { quantity: u32 },
    /// An existing item's quantity went down and it is still in the cart.
    Decremented { quantity: u32 },
    /// The item was at quantity 1 and has been removed.
    Removed,
    /// No item with that id; the cart is unchanged.
    NotFound,
}

impl Mutation {
    /// Whether the cart changed.
    pub fn changed(&self) -> bool {
        !matches!(self, Mutation::NotFound)
    }
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Incremented { quantity } => write!(f, "incremented to {}", quantity),
            Self::Decremented { quantity } => write!(f, "decremented to {}", quantity),
            Self::Removed => write!(f, "removed"),
            Self::NotFound => write!(f, "not in cart"),
        }
    }
}
