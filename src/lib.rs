#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

pub mod ast;
pub mod config;
pub mod errors;
pub mod macros;
pub mod symbols;
pub mod type_checker;
pub mod types;

pub use config::{Config, Header};
pub use type_checker::type_checker::{type_check, type_check_with, TypeCheckResult};

/// Source location of a token: line number and file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }

    pub fn line(&self) -> u32 {
        self.0
    }

    pub fn file(&self) -> &str {
        &self.1
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.1, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Position;
    use std::rc::Rc;

    #[test]
    fn test_position_display() {
        let position = Position(12, Rc::new(String::from("main.cpp")));
        assert_eq!(position.to_string(), "main.cpp:12");
        assert_eq!(position.line(), 12);
        assert_eq!(position.file(), "main.cpp");
    }

    #[test]
    fn test_null_position() {
        assert_eq!(Position::null().line(), 0);
        assert_eq!(Position::null().file(), "<null>");
    }
}
