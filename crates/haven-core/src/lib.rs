//! Core types and trait definitions for the Haven residential operations
//! service.
//!
//! This crate has no HTTP or database dependencies.
//! All other crates depend on it; it holds the occupancy and visibility rules
//! that every backend and transport must honour.

#![allow(async_fn_in_trait)]

pub mod audit;
pub mod error;
pub mod event;
pub mod housing;
pub mod note;
pub mod resident;
pub mod scope;
pub mod staff;
pub mod store;

pub use error::{Error, Result};
