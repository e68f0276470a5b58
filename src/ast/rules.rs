//! Grammar-rule tags.
//!
//! Every syntax-tree node produced by the parser is tagged with the
//! production that built it. The set is closed: the checker dispatches on
//! [`RuleCategory`] rather than on each individual production.

use std::fmt::Display;

/// Declares the rule enum together with its printable tag names.
macro_rules! rules {
    ($($variant:ident => $tag:literal),* $(,)?) => {
        /// Grammar-rule discriminant of a syntax-tree node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Rule {
            $($variant),*
        }

        impl Rule {
            /// Name of the production as the grammar spells it.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Rule::$variant => $tag),*
                }
            }
        }
    };
}

rules! {
    Program => "PROGRAM",
    Literal => "LITERAL",
    QualId => "QUAL_ID",
    NestedName1 => "NESTED_NAME1",
    PostfixArrayIndex => "POSTFIX_ARRAY_INDEX",
    PostfixCall => "POSTFIX_CALL",
    PostfixCast => "POSTFIX_CAST",
    PostfixDotField => "POSTFIX_DOT_FIELD",
    PostfixArrowField => "POSTFIX_ARROW_FIELD",
    PostfixPlusPlus => "POSTFIX_PLUSPLUS",
    PostfixMinusMinus => "POSTFIX_MINUSMINUS",
    ExprList => "EXPR_LIST",
    UnaryPlusPlus => "UNARY_PLUSPLUS",
    UnaryMinusMinus => "UNARY_MINUSMINUS",
    UnaryStar => "UNARY_STAR",
    UnaryAmpersand => "UNARY_AMPERSAND",
    UnaryPlus => "UNARY_PLUS",
    UnaryMinus => "UNARY_MINUS",
    UnaryNot => "UNARY_NOT",
    UnaryTilde => "UNARY_TILDE",
    UnarySizeofExpr => "UNARY_SIZEOF_EXPR",
    UnarySizeofType => "UNARY_SIZEOF_TYPE",
    NewExpr => "NEW_EXPR",
    NewTypeId => "NEW_TYPE_ID",
    NewDecl => "NEW_DECL",
    DirectNewDecl1 => "DIRECT_NEW_DECL1",
    DirectNewDecl2 => "DIRECT_NEW_DECL2",
    DeleteExpr1 => "DELETE_EXPR1",
    DeleteExpr2 => "DELETE_EXPR2",
    PmExpr2 => "PM_EXPR2",
    PmExpr3 => "PM_EXPR3",
    MultExpr => "MULT_EXPR",
    DivExpr => "DIV_EXPR",
    ModExpr => "MOD_EXPR",
    AddExpr => "ADD_EXPR",
    SubExpr => "SUB_EXPR",
    ShiftLeft => "SHIFT_LEFT",
    ShiftRight => "SHIFT_RIGHT",
    RelLt => "REL_LT",
    RelGt => "REL_GT",
    RelLteq => "REL_LTEQ",
    RelGteq => "REL_GTEQ",
    EqualExpr => "EQUAL_EXPR",
    NotEqualExpr => "NOTEQUAL_EXPR",
    AndExpr => "AND_EXPR",
    XorExpr => "XOR_EXPR",
    OrExpr => "OR_EXPR",
    LogicalAndExpr => "LOGICAL_AND_EXPR",
    LogicalOrExpr => "LOGICAL_OR_EXPR",
    TernaryExpr => "TERNARY_EXPR",
    AssignExpr => "ASSIGN_EXPR",
    Expr2 => "EXPR2",
    CaseStatement => "CASE_STATEMENT",
    DefaultStatement => "DEFAULT_STATEMENT",
    CompoundStatement => "COMPOUND_STATEMENT",
    StatementSeq1 => "STATEMENT_SEQ1",
    StatementSeq2 => "STATEMENT_SEQ2",
    IfStatement => "IF_STATEMENT",
    IfElseStatement => "IF_ELSE_STATEMENT",
    SwitchStatement => "SWITCH_STATEMENT",
    Condition2 => "CONDITION2",
    WhileLoop => "WHILE_LOOP",
    DoWhileLoop => "DO_WHILE_LOOP",
    ForLoop => "FOR_LOOP",
    BreakStatement => "BREAK_STATEMENT",
    ContinueStatement => "CONTINUE_STATEMENT",
    ReturnStatement => "RETURN_STATEMENT",
    DeclSeq => "DECL_SEQ",
    SimpleDecl => "SIMPLE_DECL",
    DeclSpecSeq => "DECL_SPEC_SEQ",
    NestedSimpleTypeSpec => "NESTED_SIMPLE_TYPE_SPEC",
    ElabTypeSpec1 => "ELAB_TYPE_SPEC1",
    ElabTypeSpec2 => "ELAB_TYPE_SPEC2",
    InitDeclList => "INIT_DECL_LIST",
    InitDecl => "INIT_DECL",
    Decl2 => "DECL2",
    DirectDecl2 => "DIRECT_DECL2",
    DirectDecl3 => "DIRECT_DECL3",
    DirectDecl4 => "DIRECT_DECL4",
    DirectDecl5 => "DIRECT_DECL5",
    DirectDecl6 => "DIRECT_DECL6",
    Ptr3 => "PTR3",
    Ptr4 => "PTR4",
    DeclD3 => "DECL_D3",
    TypeId => "TYPE_ID",
    TypeSpecSeq => "TYPE_SPEC_SEQ",
    AbstractDecl => "ABSTRACT_DECL",
    DirectAbstractDecl => "DIRECT_ABSTRACT_DECL",
    DirectAbstractDecl3 => "DIRECT_ABSTRACT_DECL3",
    DirectAbstractDecl4 => "DIRECT_ABSTRACT_DECL4",
    ParamDeclList1 => "PARAM_DECL_LIST1",
    ParamDecl1 => "PARAM_DECL1",
    ParamDecl2 => "PARAM_DECL2",
    ParamDecl3 => "PARAM_DECL3",
    ParamDecl4 => "PARAM_DECL4",
    CtorFunctionDef => "CTOR_FUNCTION_DEF",
    FunctionDef => "FUNCTION_DEF",
    Initializer => "INITIALIZER",
    Init1 => "INIT1",
    InitClause2 => "INIT_CLAUSE2",
    InitList => "INIT_LIST",
    ClassSpec => "CLASS_SPEC",
    ClassHead1 => "CLASS_HEAD1",
    ClassHead2 => "CLASS_HEAD2",
    MemberSpec1 => "MEMBER_SPEC1",
    MemberSpec2 => "MEMBER_SPEC2",
    MemberDecl1 => "MEMBER_DECL1",
    MemberDeclList2 => "MEMBER_DECL_LIST2",
    MemberDeclarator1 => "MEMBER_DECLARATOR1",
    MemberDeclarator2 => "MEMBER_DECLARATOR2",
    MemberDeclarator3 => "MEMBER_DECLARATOR3",
    ConstantInit => "CONSTANT_INIT",
    CtorInit => "CTOR_INIT",
    MemInitList => "MEM_INIT_LIST",
    MemInit => "MEM_INIT",
    MemInitId1 => "MEM_INIT_ID1",
    MemInitId3 => "MEM_INIT_ID3",
    Token => "TOKEN",
}

/// Semantic grouping of rules; the checker dispatches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Program,
    Literal,
    Reference,
    Postfix,
    Unary,
    New,
    Delete,
    PointerToMember,
    Binary(BinaryKind),
    Ternary,
    Assignment,
    Comma,
    List,
    Statement,
    Declaration,
    Specifier,
    Declarator,
    Parameter,
    Function,
    Initializer,
    Class,
}

/// How a binary operator treats its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    /// `* / + -`: any arithmetic operands.
    Arithmetic,
    /// `% << >> & ^ |`: integral operands only.
    Integral,
    /// `< > <= >= == !=`.
    Relational,
    /// `&& ||`.
    Logical,
}

impl Rule {
    pub fn category(&self) -> RuleCategory {
        use Rule::*;

        match self {
            Program => RuleCategory::Program,
            Literal => RuleCategory::Literal,
            QualId | NestedName1 | Token => RuleCategory::Reference,
            PostfixArrayIndex | PostfixCall | PostfixCast | PostfixDotField | PostfixArrowField
            | PostfixPlusPlus | PostfixMinusMinus => RuleCategory::Postfix,
            UnaryPlusPlus | UnaryMinusMinus | UnaryStar | UnaryAmpersand | UnaryPlus
            | UnaryMinus | UnaryNot | UnaryTilde | UnarySizeofExpr | UnarySizeofType => {
                RuleCategory::Unary
            }
            NewExpr | NewTypeId | NewDecl | DirectNewDecl1 | DirectNewDecl2 => RuleCategory::New,
            DeleteExpr1 | DeleteExpr2 => RuleCategory::Delete,
            PmExpr2 | PmExpr3 => RuleCategory::PointerToMember,
            MultExpr | DivExpr | AddExpr | SubExpr => RuleCategory::Binary(BinaryKind::Arithmetic),
            ModExpr | ShiftLeft | ShiftRight | AndExpr | XorExpr | OrExpr => {
                RuleCategory::Binary(BinaryKind::Integral)
            }
            RelLt | RelGt | RelLteq | RelGteq | EqualExpr | NotEqualExpr => {
                RuleCategory::Binary(BinaryKind::Relational)
            }
            LogicalAndExpr | LogicalOrExpr => RuleCategory::Binary(BinaryKind::Logical),
            TernaryExpr => RuleCategory::Ternary,
            AssignExpr => RuleCategory::Assignment,
            Expr2 => RuleCategory::Comma,
            ExprList => RuleCategory::List,
            CaseStatement | DefaultStatement | CompoundStatement | StatementSeq1
            | StatementSeq2 | IfStatement | IfElseStatement | SwitchStatement | Condition2
            | WhileLoop | DoWhileLoop | ForLoop | BreakStatement | ContinueStatement
            | ReturnStatement => RuleCategory::Statement,
            DeclSeq | SimpleDecl => RuleCategory::Declaration,
            DeclSpecSeq | NestedSimpleTypeSpec | ElabTypeSpec1 | ElabTypeSpec2 | TypeId
            | TypeSpecSeq => RuleCategory::Specifier,
            InitDeclList | InitDecl | Decl2 | DirectDecl2 | DirectDecl3 | DirectDecl4
            | DirectDecl5 | DirectDecl6 | Ptr3 | Ptr4 | DeclD3 | AbstractDecl
            | DirectAbstractDecl | DirectAbstractDecl3 | DirectAbstractDecl4 => {
                RuleCategory::Declarator
            }
            ParamDeclList1 | ParamDecl1 | ParamDecl2 | ParamDecl3 | ParamDecl4 => {
                RuleCategory::Parameter
            }
            CtorFunctionDef | FunctionDef => RuleCategory::Function,
            Initializer | Init1 | InitClause2 | InitList => RuleCategory::Initializer,
            ClassSpec | ClassHead1 | ClassHead2 | MemberSpec1 | MemberSpec2 | MemberDecl1
            | MemberDeclList2 | MemberDeclarator1 | MemberDeclarator2 | MemberDeclarator3
            | ConstantInit | CtorInit | MemInitList | MemInit | MemInitId1 | MemInitId3 => {
                RuleCategory::Class
            }
        }
    }

    /// Whether the rule is a left-recursive list production.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Rule::DeclSeq
                | Rule::StatementSeq1
                | Rule::StatementSeq2
                | Rule::ExprList
                | Rule::InitDeclList
                | Rule::ParamDeclList1
                | Rule::MemberDeclList2
                | Rule::MemInitList
                | Rule::InitList
                | Rule::DeclSpecSeq
                | Rule::TypeSpecSeq
        )
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
