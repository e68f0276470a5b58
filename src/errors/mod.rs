//! Error types for semantic analysis.
//!
//! This module defines the diagnostics produced while checking a tree:
//!
//! - Error structures with source position information
//! - The recoverable semantic error variants (redeclaration, type
//!   mismatch, arity, access, illegal jumps, ...)
//! - Fatal internal errors for trees that break the parser contract
//! - Error formatting and display functionality

pub mod errors;
