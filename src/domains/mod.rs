//! Domains module containing business logic organized by bounded contexts.
//!
//! The server only exposes tools; each tool is a thin dispatcher in front of
//! a Morningstar HTTP backend.

pub mod tools;
