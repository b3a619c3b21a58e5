//! Shopping cart module.
//!
//! Contains the cart, its line items, and the mutation outcome type.

mod cart;
mod mutation;

pub use cart::{Cart, InvalidCart, LineItem, NewLineItem};
pub use mutation::Mutation;
