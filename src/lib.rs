//! Bookshelf application library
//!
//! The book catalogue module and the wiring that connects it to a store.

pub mod modules;

pub use modules::*;
