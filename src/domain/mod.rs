//! Domain types for the employee search service.

pub mod employee;
pub mod search;
pub mod types;
