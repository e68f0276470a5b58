//! Utility macros for building syntax trees.
//!
//! The parser that normally produces trees lives outside this crate; these
//! macros give it (and the tests) a compact way to spell nodes:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_LEAF!` - Creates a leaf Node around a token
//! - `MK_NODE!` - Creates an inner Node from a rule and its children
//! - `MK_LIST!` - Creates a left-recursive list node from its items

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$text` - The token's source text
/// * `$line` - Optional line number (defaults to 0)
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Identifier, "x", 3);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $text:expr, $line:expr) => {
        $crate::ast::ast::Token {
            kind: $kind,
            text: String::from($text),
            position: $crate::Position($line, std::rc::Rc::new(String::from("<input>"))),
        }
    };
    ($kind:expr, $text:expr) => {
        $crate::MK_TOKEN!($kind, $text, 0)
    };
}

/// Creates a leaf node holding a single token.
///
/// # Example
///
/// ```ignore
/// let x = MK_LEAF!(TokenKind::Identifier, "x");
/// ```
#[macro_export]
macro_rules! MK_LEAF {
    ($kind:expr, $text:expr, $line:expr) => {
        $crate::ast::ast::Node::leaf($crate::MK_TOKEN!($kind, $text, $line))
    };
    ($kind:expr, $text:expr) => {
        $crate::ast::ast::Node::leaf($crate::MK_TOKEN!($kind, $text))
    };
}

/// Creates an inner node. Children are `Node`s or `Option<Node>`s, with
/// `None` standing for an absent optional part of the production.
///
/// # Example
///
/// ```ignore
/// let sum = MK_NODE!(Rule::AddExpr, lhs, rhs);
/// let ret = MK_NODE!(Rule::ReturnStatement, None);
/// ```
#[macro_export]
macro_rules! MK_NODE {
    ($rule:expr $(, $child:expr)* $(,)?) => {
        $crate::ast::ast::Node::new(
            $rule,
            vec![$($crate::macros::IntoChild::into_child($child)),*],
        )
    };
}

/// Creates a left-recursive list production from its items in source
/// order, the shape the parser builds for `a, b, c`.
///
/// # Example
///
/// ```ignore
/// let args = MK_LIST!(Rule::ExprList, a, b, c);
/// ```
#[macro_export]
macro_rules! MK_LIST {
    ($rule:expr, $first:expr $(, $rest:expr)* $(,)?) => {{
        let rule = $rule;
        #[allow(unused_mut)]
        let mut list = $crate::ast::ast::Node::new(rule, vec![None, Some($first)]);
        $(
            list = $crate::ast::ast::Node::new(rule, vec![Some(list), Some($rest)]);
        )*
        list
    }};
}

use crate::ast::ast::Node;

/// Conversion used by `MK_NODE!` so children may be given bare or optional.
pub trait IntoChild {
    fn into_child(self) -> Option<Node>;
}

impl IntoChild for Node {
    fn into_child(self) -> Option<Node> {
        Some(self)
    }
}

impl IntoChild for Option<Node> {
    fn into_child(self) -> Option<Node> {
        self
    }
}
