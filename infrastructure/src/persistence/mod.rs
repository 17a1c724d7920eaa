//! Persistence adapters

pub mod decision_store;

pub use decision_store::DecisionStore;
