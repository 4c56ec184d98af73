//! Integration tests for the core crate.
//!
//! Organized by workflow:
//! 1. Catalog and rewriting across payload shapes and renames
//! 2. Editor load/save against host rows
//! 3. Button lists stored on query records

pub mod buttons_tests;
pub mod editor_tests;
pub mod helpers;
pub mod rewrite_tests;
