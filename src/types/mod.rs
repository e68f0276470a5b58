//! Type descriptor model.
//!
//! This module defines the static types the checker computes:
//!
//! - types: the tagged descriptor (base kind, pointer levels, payloads for
//!   arrays, functions and classes) and its rendering
//! - compat: structural identity, assignment compatibility, arithmetic
//!   promotion and the common type of two operands

pub mod compat;
pub mod types;
