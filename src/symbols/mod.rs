//! Scope management.
//!
//! This module keeps track of which names are visible where:
//!
//! - symbol_table: the scope stack, insertion into the innermost frame,
//!   innermost-to-outermost lookup and class member visibility
//! - builtins: declarations seeded into the global scope at startup
//!
//! Frames own their bindings; popping a frame releases exactly the type
//! descriptors nothing else holds on to.

pub mod builtins;
pub mod symbol_table;
