//! Variable identities for calq expressions.
//!
//! A [`Variable`] is a shared handle to a named value slot. Handles are
//! interned by a [`VariableRegistry`], so every lookup of the same name yields
//! the same slot and a value set through one handle is seen through all of
//! them, including the handles held inside parsed expression trees.

pub mod env;

pub use env::{global, Variable, VariableRegistry};
