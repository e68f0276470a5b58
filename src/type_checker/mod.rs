//! Type checking and semantic analysis module.
//!
//! This module walks a rule-tagged syntax tree in a single depth-first
//! pass, resolving names through the scope manager and computing the type
//! of every expression:
//!
//! - type_checker: the checker state, dispatch and the public entry points
//! - expr: literals, references, operators, calls and member access
//! - stmt: control flow, conditions and jump legality
//! - decl: specifiers, declarator composition, initializers and functions
//! - class: class bodies, member access regions and constructor initializers
//!
//! Semantic errors are recorded and checking continues with an unknown
//! type in place of the offending expression. Trees that break the parser
//! contract abort the check with an internal error.

pub mod class;
pub mod decl;
pub mod expr;
pub mod stmt;
pub mod type_checker;
