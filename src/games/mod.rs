//! Game implementations.

pub mod jass;
