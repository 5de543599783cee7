//! # IO Layer
//!
//! Outer surfaces of the backend. The REST API is the only one.

pub mod rest;
