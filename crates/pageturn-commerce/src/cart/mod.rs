//! Shopping cart module.
//!
//! A cart is a user's list of (book, quantity) pairs. It is replaced
//! wholesale on every update.

mod cart;

pub use cart::{get_cart, replace_cart, validate_lines, CartItem, CartLine};
