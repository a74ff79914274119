//! Route handlers

pub mod export;
pub mod health;
pub mod weather;
