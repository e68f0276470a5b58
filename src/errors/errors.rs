use std::fmt::Display;

use thiserror::Error;

use crate::{ast::rules::Rule, Position};

/// A semantic diagnostic: what went wrong and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        self.internal_error.name()
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::Redeclaration { name } => ErrorTip::Suggestion(format!(
                "`{}` is already declared in this scope",
                name
            )),
            ErrorImpl::NotFound { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared here", name))
            }
            ErrorImpl::UnknownIdentifier { name } => ErrorTip::Suggestion(format!(
                "`{}` is not declared, did you misspell it?",
                name
            )),
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::RetTypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Function returns `{}`, but `{}` is returned here",
                expected, received
            )),
            ErrorImpl::ArityMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::Access { class, member } => ErrorTip::Suggestion(format!(
                "`{}` is a private member of `{}`",
                member, class
            )),
            ErrorImpl::IllegalJump { statement } => ErrorTip::Suggestion(format!(
                "`{}` is not inside a loop or switch that it can apply to",
                statement
            )),
            ErrorImpl::Unsupported { .. } => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get_tip() {
            ErrorTip::None => write!(
                f,
                "{}: semantic error: {}: {}",
                self.position,
                self.get_error_name(),
                self.internal_error
            ),
            tip => write!(
                f,
                "{}: semantic error: {}: {}",
                self.position,
                self.get_error_name(),
                tip
            ),
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

/// Recoverable semantic errors. Checking continues after each one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("{name:?} redeclared in the same scope")]
    Redeclaration { name: String },
    #[error("{name:?} not found")]
    NotFound { name: String },
    #[error("unknown identifier {name:?}")]
    UnknownIdentifier { name: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("return type does not match: expected {expected:?}, received {received:?}")]
    RetTypeMismatch { expected: String, received: String },
    #[error("wrong number of arguments: expected {expected:?}, received {received:?}")]
    ArityMismatch { expected: String, received: usize },
    #[error("member {member:?} of {class:?} is private")]
    Access { class: String, member: String },
    #[error("{statement} outside of a loop or switch")]
    IllegalJump { statement: String },
    #[error("{construct} is not supported")]
    Unsupported { construct: String },
}

impl ErrorImpl {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorImpl::Redeclaration { .. } => "RedeclarationError",
            ErrorImpl::NotFound { .. } => "NotFoundError",
            ErrorImpl::UnknownIdentifier { .. } => "UnknownIdentifierError",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatchError",
            ErrorImpl::RetTypeMismatch { .. } => "RetTypeMismatchError",
            ErrorImpl::ArityMismatch { .. } => "ArityMismatchError",
            ErrorImpl::Access { .. } => "AccessError",
            ErrorImpl::IllegalJump { .. } => "IllegalJumpError",
            ErrorImpl::Unsupported { .. } => "UnsupportedError",
        }
    }
}

/// A tree the checker cannot make sense of.
///
/// These are contract violations by the parser, not mistakes in the
/// program being checked, and they abort the check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalError {
    #[error("{position}: no {context} handler for rule {rule}")]
    UnexpectedRule {
        rule: Rule,
        context: &'static str,
        position: Position,
    },
    #[error("{position}: rule {rule} is missing child {index}")]
    MissingChild {
        rule: Rule,
        index: usize,
        position: Position,
    },
}
