//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent;
pub mod assess;
pub mod debate;
pub mod run_boomerang;
pub mod synopsis;

#[cfg(test)]
mod test_support;
