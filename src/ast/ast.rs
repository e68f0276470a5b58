use std::fmt::Display;

use crate::{errors::errors::InternalError, Position};

use super::{literals, rules::Rule};

/// Token kinds the semantic core needs to tell apart.
///
/// This is the slice of the lexer's taxonomy that reaches the checker
/// through leaf nodes: constants, names, type and class keywords, access
/// specifiers and the assignment operators.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    // Constants
    IntConst,
    FloatConst,
    CharConst,
    StringLit,
    True,
    False,

    // Names
    Identifier,
    ClassName,

    // Type specifiers
    Int,
    Double,
    Float,
    Char,
    Bool,
    Void,
    Short,
    Long,
    Signed,
    Unsigned,

    // Qualifiers and storage classes
    Const,
    Volatile,
    Static,
    Extern,
    Auto,
    Register,
    Inline,
    Virtual,
    Friend,
    Typedef,

    // Class keys
    Class,
    Struct,
    Union,

    // Access specifiers
    Public,
    Private,
    Protected,

    // Pointer operators
    Star,
    Ampersand,

    // Assignment operators
    Assign,     // =
    MulAssign,  // *=
    DivAssign,  // /=
    ModAssign,  // %=
    AddAssign,  // +=
    SubAssign,  // -=
    ShlAssign,  // <<=
    ShrAssign,  // >>=
    AndAssign,  // &=
    XorAssign,  // ^=
    OrAssign,   // |=
}

impl TokenKind {
    pub fn is_class_key(&self) -> bool {
        matches!(self, TokenKind::Class | TokenKind::Struct | TokenKind::Union)
    }

    pub fn is_access_specifier(&self) -> bool {
        matches!(self, TokenKind::Public | TokenKind::Private | TokenKind::Protected)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    /// Value of an integer constant, `None` for anything else.
    pub fn int_value(&self) -> Option<u64> {
        match self.kind {
            TokenKind::IntConst => literals::parse_integer(&self.text),
            _ => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} `{}`", self.kind, self.text)
    }
}

/// A syntax-tree node as built by the parser.
///
/// Absent optional parts of a production are `None` children. Leaves are
/// tagged [`Rule::Token`] and carry their token.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub rule: Rule,
    pub children: Vec<Option<Node>>,
    pub token: Option<Token>,
}

impl Node {
    pub fn new(rule: Rule, children: Vec<Option<Node>>) -> Self {
        Node {
            rule,
            children,
            token: None,
        }
    }

    pub fn leaf(token: Token) -> Self {
        Node {
            rule: Rule::Token,
            children: vec![],
            token: Some(token),
        }
    }

    /// Builds a left-recursive list production from items in source order.
    /// No items means the optional list is absent.
    pub fn list(rule: Rule, items: Vec<Node>) -> Option<Node> {
        items
            .into_iter()
            .fold(None, |list, item| Some(Node::new(rule, vec![list, Some(item)])))
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index).and_then(Option::as_ref)
    }

    /// A child the production always has; its absence is a parser bug.
    pub fn expect_child(&self, index: usize) -> Result<&Node, InternalError> {
        self.child(index).ok_or_else(|| InternalError::MissingChild {
            rule: self.rule,
            index,
            position: self.position(),
        })
    }

    /// The leaf token, if this node is a leaf.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Leaf token of the given kind.
    pub fn token_of(&self, kind: TokenKind) -> Option<&Token> {
        self.token.as_ref().filter(|token| token.kind == kind)
    }

    /// Position of the first token in the subtree.
    pub fn position(&self) -> Position {
        self.first_token()
            .map(|token| token.position.clone())
            .unwrap_or_else(Position::null)
    }

    fn first_token(&self) -> Option<&Token> {
        if let Some(token) = &self.token {
            return Some(token);
        }
        self.children
            .iter()
            .flatten()
            .find_map(|child| child.first_token())
    }

    /// Items of a left- or right-recursive list production, in source order.
    ///
    /// A node that is not a list is returned on its own.
    pub fn flatten(&self) -> Vec<&Node> {
        let mut items = vec![];
        if self.rule.is_list() {
            self.flatten_into(&mut items);
        } else {
            items.push(self);
        }
        items
    }

    fn flatten_into<'a>(&'a self, items: &mut Vec<&'a Node>) {
        for child in self.children.iter().flatten() {
            if same_list(self.rule, child.rule) {
                child.flatten_into(items);
            } else {
                items.push(child);
            }
        }
    }
}

fn same_list(outer: Rule, inner: Rule) -> bool {
    let statements = |rule| matches!(rule, Rule::StatementSeq1 | Rule::StatementSeq2);
    outer == inner || (statements(outer) && statements(inner))
}
