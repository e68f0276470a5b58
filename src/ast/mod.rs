//! Syntax-tree contract between the parser and the semantic core.
//!
//! The parser is an external collaborator; this module defines what it
//! hands over:
//!
//! - ast: nodes, leaf tokens and the token kinds the checker needs
//! - rules: the closed set of grammar-rule tags and their categories
//! - literals: integer literal spellings (decimal, octal, hexadecimal)
pub mod ast;
pub mod literals;
pub mod rules;
