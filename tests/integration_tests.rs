//! Integration tests for checking whole programs.
//!
//! Trees are spelled the way the parser builds them, then checked through
//! the public entry points.

use std::rc::Rc;

use rstest::rstest;
use sema::{
    ast::{
        ast::{Node, TokenKind},
        rules::Rule,
    },
    errors::errors::InternalError,
    type_check, type_check_with,
    types::types::BaseKind,
    Config, Header, TypeCheckResult, MK_LEAF, MK_LIST, MK_NODE,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn check(program: &Node) -> TypeCheckResult {
    init_logger();
    type_check(program).unwrap()
}

fn id(name: &str) -> Node {
    MK_LEAF!(TokenKind::Identifier, name)
}

fn kw(kind: TokenKind) -> Node {
    MK_LEAF!(kind, kind.to_string().to_lowercase())
}

fn int(value: i64) -> Node {
    MK_NODE!(Rule::Literal, MK_LEAF!(TokenKind::IntConst, value.to_string()))
}

fn float(text: &str) -> Node {
    MK_NODE!(Rule::Literal, MK_LEAF!(TokenKind::FloatConst, text))
}

fn string(text: &str) -> Node {
    MK_NODE!(Rule::Literal, MK_LEAF!(TokenKind::StringLit, format!("{:?}", text)))
}

fn specs(kind: TokenKind) -> Node {
    MK_LIST!(Rule::DeclSpecSeq, kw(kind))
}

fn named(class: &str) -> Node {
    MK_LIST!(Rule::DeclSpecSeq, id(class))
}

fn ptr(declarator: Node) -> Node {
    MK_NODE!(Rule::Decl2, kw(TokenKind::Star), declarator)
}

/// `specifiers declarator = value;`
fn var(specifiers: Node, declarator: Node, value: Option<Node>) -> Node {
    let init_decl = match value {
        Some(value) => MK_NODE!(Rule::InitDecl, declarator, MK_NODE!(Rule::Initializer, value)),
        None => declarator,
    };
    MK_NODE!(Rule::SimpleDecl, specifiers, MK_LIST!(Rule::InitDeclList, init_decl))
}

fn param(kind: TokenKind, name: &str) -> Node {
    MK_NODE!(Rule::ParamDecl1, specs(kind), id(name))
}

fn signature(name: Node, parameters: Vec<Node>) -> Node {
    MK_NODE!(Rule::DirectDecl2, name, Node::list(Rule::ParamDeclList1, parameters))
}

fn compound(statements: Vec<Node>) -> Node {
    MK_NODE!(
        Rule::CompoundStatement,
        Node::list(Rule::StatementSeq2, statements)
    )
}

fn function(kind: TokenKind, name: &str, parameters: Vec<Node>, body: Vec<Node>) -> Node {
    MK_NODE!(
        Rule::FunctionDef,
        specs(kind),
        signature(id(name), parameters),
        compound(body)
    )
}

fn ret(value: Option<Node>) -> Node {
    MK_NODE!(Rule::ReturnStatement, value)
}

fn call(callee: Node, arguments: Vec<Node>) -> Node {
    MK_NODE!(Rule::PostfixCall, callee, Node::list(Rule::ExprList, arguments))
}

fn assign(lhs: Node, rhs: Node) -> Node {
    MK_NODE!(Rule::AssignExpr, lhs, kw(TokenKind::Assign), rhs)
}

fn dot(object: &str, member: &str) -> Node {
    MK_NODE!(Rule::PostfixDotField, id(object), id(member))
}

fn arrow(object: &str, member: &str) -> Node {
    MK_NODE!(Rule::PostfixArrowField, id(object), id(member))
}

fn class(key: TokenKind, name: &str, members: Node) -> Node {
    MK_NODE!(
        Rule::SimpleDecl,
        MK_LIST!(
            Rule::DeclSpecSeq,
            MK_NODE!(
                Rule::ClassSpec,
                MK_NODE!(Rule::ClassHead1, kw(key), id(name)),
                members
            )
        ),
        None::<Node>
    )
}

/// One member followed by the rest of the member specification.
fn member(declaration: Node, rest: Option<Node>) -> Node {
    MK_NODE!(Rule::MemberSpec1, declaration, rest)
}

fn access(kind: TokenKind, rest: Option<Node>) -> Node {
    MK_NODE!(Rule::MemberSpec2, kw(kind), rest)
}

fn data_member(specifiers: Node, declarator: Node) -> Node {
    MK_NODE!(
        Rule::MemberDecl1,
        specifiers,
        MK_LIST!(Rule::MemberDeclList2, declarator)
    )
}

fn program(declarations: Vec<Node>) -> Node {
    MK_NODE!(Rule::Program, Node::list(Rule::DeclSeq, declarations))
}

fn main_returning(body: Vec<Node>) -> Node {
    let mut body = body;
    body.push(ret(Some(int(0))));
    function(TokenKind::Int, "main", vec![], body)
}

#[test]
fn test_well_typed_program() {
    // int add(int a, int b) { return a + b; }
    // int main() { int x = add(1, 2); double d = x * 2.5; return 0; }
    let root = program(vec![
        function(
            TokenKind::Int,
            "add",
            vec![param(TokenKind::Int, "a"), param(TokenKind::Int, "b")],
            vec![ret(Some(MK_NODE!(Rule::AddExpr, id("a"), id("b"))))],
        ),
        main_returning(vec![
            var(specs(TokenKind::Int), id("x"), Some(call(id("add"), vec![int(1), int(2)]))),
            var(
                specs(TokenKind::Double),
                id("d"),
                Some(MK_NODE!(Rule::MultExpr, id("x"), float("2.5"))),
            ),
        ]),
    ]);

    let result = check(&root);
    assert!(result.is_ok(), "{:?}", result.diagnostics);
    assert_eq!(result.ty.kind(), BaseKind::Void);
    assert!(!result.resolutions.is_empty());
    assert!(result.resolutions.iter().all(|resolution| !resolution.ty.is_unknown()));
    assert_eq!(result.resolution("add").map(|ty| ty.to_string()).as_deref(), Some("int (int, int)"));
    assert_eq!(result.resolution("x").map(|ty| ty.kind()), Some(BaseKind::Int));
}

#[test]
fn test_redeclaration_keeps_first_binding() {
    // int x; double x;
    let root = program(vec![
        var(specs(TokenKind::Int), id("x"), None),
        var(specs(TokenKind::Double), id("x"), None),
    ]);

    let result = check(&root);
    assert_eq!(result.error_names(), vec!["RedeclarationError"]);
    assert_eq!(result.symbols.lookup("x").unwrap().kind(), BaseKind::Int);
}

#[test]
fn test_inner_block_shadows_outer() {
    // int main() { double x = 1.0; { int x = 2; x; } x; return 0; }
    let root = program(vec![main_returning(vec![
        var(specs(TokenKind::Double), id("x"), Some(float("1.0"))),
        compound(vec![var(specs(TokenKind::Int), id("x"), Some(int(2))), id("x")]),
        id("x"),
    ])]);

    let result = check(&root);
    assert!(result.is_ok(), "{:?}", result.diagnostics);
    let kinds: Vec<BaseKind> = result
        .resolutions
        .iter()
        .filter(|resolution| resolution.name == "x")
        .map(|resolution| resolution.ty.kind())
        .collect();
    assert_eq!(kinds, vec![BaseKind::Int, BaseKind::Double]);
}

#[test]
fn test_pointer_levels() {
    // int a = 1; int *p = &a; int **q = &p; int b = *p; int *r = &p;
    let address = |name: &str| MK_NODE!(Rule::UnaryAmpersand, id(name));
    let root = program(vec![main_returning(vec![
        var(specs(TokenKind::Int), id("a"), Some(int(1))),
        var(specs(TokenKind::Int), ptr(id("p")), Some(address("a"))),
        var(specs(TokenKind::Int), ptr(ptr(id("q"))), Some(address("p"))),
        var(specs(TokenKind::Int), id("b"), Some(MK_NODE!(Rule::UnaryStar, id("p")))),
        var(specs(TokenKind::Int), ptr(id("r")), Some(address("p"))),
    ])]);

    let result = check(&root);
    assert_eq!(result.error_names(), vec!["TypeMismatchError"]);
    assert_eq!(
        result.diagnostics[0].get_tip().to_string(),
        "Expected type `int *`, received `int **`"
    );
}

#[rstest]
#[case(vec![int(1)], vec![])]
#[case(vec![int(1), int(2)], vec!["ArityMismatchError"])]
#[case(vec![], vec!["ArityMismatchError"])]
#[case(vec![string("one")], vec!["TypeMismatchError"])]
fn test_call_arguments(#[case] arguments: Vec<Node>, #[case] errors: Vec<&str>) {
    // int f(int a) { return a; }  int main() { f(...); return 0; }
    let root = program(vec![
        function(
            TokenKind::Int,
            "f",
            vec![param(TokenKind::Int, "a")],
            vec![ret(Some(id("a")))],
        ),
        main_returning(vec![call(id("f"), arguments)]),
    ]);

    let result = check(&root);
    assert_eq!(result.error_names(), errors);
}

fn account() -> Node {
    // class Account { int balance; public: int get() { return balance; } };
    let getter = function(TokenKind::Int, "get", vec![], vec![ret(Some(id("balance")))]);
    class(
        TokenKind::Class,
        "Account",
        member(
            data_member(specs(TokenKind::Int), id("balance")),
            Some(access(TokenKind::Public, Some(member(getter, None)))),
        ),
    )
}

#[test]
fn test_private_members_are_hidden_outside_the_class() {
    let root = program(vec![
        account(),
        main_returning(vec![
            var(named("Account"), id("acct"), None),
            dot("acct", "get"),
            call(dot("acct", "get"), vec![]),
            dot("acct", "balance"),
        ]),
    ]);

    let result = check(&root);
    assert_eq!(result.error_names(), vec!["AccessError"]);
    assert_eq!(
        result.diagnostics[0].get_tip().to_string(),
        "`balance` is a private member of `Account`"
    );
    assert_eq!(result.resolution("Account::get").map(|ty| ty.kind()), Some(BaseKind::Function));
    assert!(result.resolution("Account::balance").is_some_and(|ty| ty.is_unknown()));
    // Inside `get` the private member resolves normally.
    assert_eq!(result.resolution("balance").map(|ty| ty.kind()), Some(BaseKind::Int));
}

#[test]
fn test_methods_read_private_members_of_other_objects() {
    // class Account { int balance; public: int peek(Account other) { return other.balance; } };
    let peek = function(
        TokenKind::Int,
        "peek",
        vec![MK_NODE!(Rule::ParamDecl1, named("Account"), id("other"))],
        vec![ret(Some(dot("other", "balance")))],
    );
    let root = program(vec![class(
        TokenKind::Class,
        "Account",
        member(
            data_member(specs(TokenKind::Int), id("balance")),
            Some(access(TokenKind::Public, Some(member(peek, None)))),
        ),
    )]);

    let result = check(&root);
    assert!(result.is_ok(), "{:?}", result.diagnostics);
    assert_eq!(result.resolution("Account::balance").map(|ty| ty.kind()), Some(BaseKind::Int));
}

#[test]
fn test_jump_statements() {
    // while (1) { if (1) break; continue; }  break;
    let root = program(vec![main_returning(vec![
        MK_NODE!(
            Rule::WhileLoop,
            int(1),
            compound(vec![
                MK_NODE!(Rule::IfStatement, int(1), MK_NODE!(Rule::BreakStatement)),
                MK_NODE!(Rule::ContinueStatement),
            ])
        ),
        MK_NODE!(Rule::BreakStatement),
    ])]);

    let result = check(&root);
    assert_eq!(result.error_names(), vec!["IllegalJumpError"]);
}

#[test]
fn test_loop_nesting_does_not_enter_member_bodies() {
    // A method checked while the enclosing function is inside a loop still
    // rejects a bare break.
    let method = function(
        TokenKind::Void,
        "run",
        vec![],
        vec![MK_NODE!(Rule::BreakStatement)],
    );
    let local = class(TokenKind::Struct, "Task", member(method, None));
    let root = program(vec![main_returning(vec![MK_NODE!(
        Rule::WhileLoop,
        int(1),
        compound(vec![local])
    )])]);

    let result = check(&root);
    assert_eq!(result.error_names(), vec!["IllegalJumpError"]);
}

#[rstest]
#[case(TokenKind::Int, None, vec!["RetTypeMismatchError"])]
#[case(TokenKind::Int, Some(string("no")), vec!["RetTypeMismatchError"])]
#[case(TokenKind::Double, Some(int(1)), vec![])]
#[case(TokenKind::Void, Some(int(1)), vec!["RetTypeMismatchError"])]
#[case(TokenKind::Void, None, vec![])]
fn test_return_types(
    #[case] kind: TokenKind,
    #[case] value: Option<Node>,
    #[case] errors: Vec<&str>,
) {
    let root = program(vec![function(kind, "h", vec![], vec![ret(value)])]);
    let result = check(&root);
    assert_eq!(result.error_names(), errors);
}

#[test]
fn test_recursive_function() {
    // int fact(int n) { if (n <= 1) return 1; return n * fact(n - 1); }
    let root = program(vec![function(
        TokenKind::Int,
        "fact",
        vec![param(TokenKind::Int, "n")],
        vec![
            MK_NODE!(
                Rule::IfStatement,
                MK_NODE!(Rule::RelLteq, id("n"), int(1)),
                ret(Some(int(1)))
            ),
            ret(Some(MK_NODE!(
                Rule::MultExpr,
                id("n"),
                call(id("fact"), vec![MK_NODE!(Rule::SubExpr, id("n"), int(1))])
            ))),
        ],
    )]);

    let result = check(&root);
    assert!(result.is_ok(), "{:?}", result.diagnostics);
}

#[test]
fn test_prototype_then_definition() {
    // int twice(int); int main() { return twice(2); } int twice(int v) { ... }
    let prototype = var(
        specs(TokenKind::Int),
        signature(
            id("twice"),
            vec![MK_NODE!(Rule::ParamDecl3, specs(TokenKind::Int), None::<Node>)],
        ),
        None,
    );
    let root = program(vec![
        prototype,
        function(TokenKind::Int, "main", vec![], vec![ret(Some(call(id("twice"), vec![int(2)])))]),
        function(
            TokenKind::Int,
            "twice",
            vec![param(TokenKind::Int, "v")],
            vec![ret(Some(MK_NODE!(Rule::MultExpr, id("v"), int(2))))],
        ),
    ]);

    let result = check(&root);
    assert!(result.is_ok(), "{:?}", result.diagnostics);
    let twice = result.symbols.lookup("twice").unwrap();
    let function = twice.as_function().unwrap();
    assert!(function.is_defined());
    let body = function.symbols().unwrap();
    assert!(Rc::ptr_eq(body.get("v").unwrap(), &function.parameters[0]));
}

#[test]
fn test_redefinition() {
    let definition = || function(TokenKind::Int, "g", vec![], vec![ret(Some(int(1)))]);
    let root = program(vec![definition(), definition()]);

    let result = check(&root);
    assert_eq!(result.error_names(), vec!["RedeclarationError"]);
    assert!(result.symbols.lookup("g").unwrap().as_function().unwrap().is_defined());
}

/// `returns name(kinds...);` with unnamed parameters.
fn prototype(returns: TokenKind, name: &str, kinds: &[TokenKind]) -> Node {
    let parameters = kinds
        .iter()
        .map(|kind| MK_NODE!(Rule::ParamDecl3, specs(*kind), None::<Node>))
        .collect();
    var(specs(returns), signature(id(name), parameters), None)
}

#[rstest]
#[case(prototype(TokenKind::Int, "f", &[TokenKind::Int]), vec![])]
#[case(prototype(TokenKind::Double, "f", &[TokenKind::Int]), vec!["RedeclarationError"])]
#[case(prototype(TokenKind::Int, "f", &[TokenKind::Double]), vec!["RedeclarationError"])]
#[case(prototype(TokenKind::Int, "f", &[TokenKind::Int, TokenKind::Int]), vec!["RedeclarationError"])]
fn test_prototypes_must_match_exactly(#[case] second: Node, #[case] errors: Vec<&str>) {
    // int f(int); <second>
    let root = program(vec![prototype(TokenKind::Int, "f", &[TokenKind::Int]), second]);
    let result = check(&root);
    assert_eq!(result.error_names(), errors);
}

#[test]
fn test_prototype_order_does_not_matter() {
    // int f(double); int f(int);
    let root = program(vec![
        prototype(TokenKind::Int, "f", &[TokenKind::Double]),
        prototype(TokenKind::Int, "f", &[TokenKind::Int]),
    ]);
    let result = check(&root);
    assert_eq!(result.error_names(), vec!["RedeclarationError"]);
    assert_eq!(
        result.symbols.lookup("f").ok().map(|ty| ty.to_string()).as_deref(),
        Some("int (double)")
    );
}

#[test]
fn test_definition_keeps_its_own_parameter_types() {
    // int f(double); int f(int x) { return x; }
    let root = program(vec![
        prototype(TokenKind::Int, "f", &[TokenKind::Double]),
        function(
            TokenKind::Int,
            "f",
            vec![param(TokenKind::Int, "x")],
            vec![ret(Some(id("x")))],
        ),
    ]);

    let result = check(&root);
    assert_eq!(result.error_names(), vec!["RedeclarationError"]);
    assert_eq!(result.resolution("x").map(|ty| ty.kind()), Some(BaseKind::Int));
}

#[test]
fn test_out_of_class_definition_must_match_member() {
    // class Box { public: int get(double); }; int Box::get(int v) { return v; }
    let declaration = class(
        TokenKind::Class,
        "Box",
        access(
            TokenKind::Public,
            Some(member(
                data_member(
                    specs(TokenKind::Int),
                    signature(
                        id("get"),
                        vec![MK_NODE!(Rule::ParamDecl3, specs(TokenKind::Double), None::<Node>)],
                    ),
                ),
                None,
            )),
        ),
    );
    let definition = MK_NODE!(
        Rule::FunctionDef,
        specs(TokenKind::Int),
        MK_NODE!(
            Rule::DeclD3,
            MK_LEAF!(TokenKind::ClassName, "Box"),
            signature(id("get"), vec![param(TokenKind::Int, "v")])
        ),
        compound(vec![ret(Some(id("v")))])
    );

    let result = check(&program(vec![declaration, definition]));
    assert_eq!(result.error_names(), vec!["TypeMismatchError"]);
    assert_eq!(
        result.diagnostics[0].get_tip().to_string(),
        "Expected type `int (double)`, received `int (int)`"
    );
}

#[rstest]
#[case(vec![int(1)], vec!["ArityMismatchError"])]
#[case(vec![int(1), int(2)], vec![])]
fn test_prototype_only_call(#[case] arguments: Vec<Node>, #[case] errors: Vec<&str>) {
    // int f(int, double); int main() { int r = f(...); return 0; }
    let root = program(vec![
        prototype(TokenKind::Int, "f", &[TokenKind::Int, TokenKind::Double]),
        main_returning(vec![var(
            specs(TokenKind::Int),
            id("r"),
            Some(call(id("f"), arguments)),
        )]),
    ]);

    let result = check(&root);
    assert_eq!(result.error_names(), errors);
    assert_eq!(
        result.resolution("f").map(|ty| ty.to_string()).as_deref(),
        Some("int (int, double)")
    );
}

fn counter(ctor_init: Node) -> Node {
    // class Counter { int count; public: Counter(); int next(); };
    // Counter::Counter() : <ctor_init> {}
    // int Counter::next() { count = count + 1; return count; }
    let declaration = class(
        TokenKind::Class,
        "Counter",
        member(
            data_member(specs(TokenKind::Int), id("count")),
            Some(access(
                TokenKind::Public,
                Some(member(
                    MK_NODE!(
                        Rule::MemberDecl1,
                        None::<Node>,
                        MK_LIST!(
                            Rule::MemberDeclList2,
                            MK_NODE!(Rule::DirectDecl5, MK_LEAF!(TokenKind::ClassName, "Counter"), None::<Node>)
                        )
                    ),
                    Some(member(
                        data_member(specs(TokenKind::Int), signature(id("next"), vec![])),
                        None,
                    )),
                )),
            )),
        ),
    );
    let constructor = MK_NODE!(
        Rule::CtorFunctionDef,
        MK_NODE!(
            Rule::DeclD3,
            MK_LEAF!(TokenKind::ClassName, "Counter"),
            MK_NODE!(Rule::DirectDecl5, MK_LEAF!(TokenKind::ClassName, "Counter"), None::<Node>)
        ),
        MK_NODE!(Rule::CtorInit, MK_LIST!(Rule::MemInitList, ctor_init)),
        compound(vec![])
    );
    let next = MK_NODE!(
        Rule::FunctionDef,
        specs(TokenKind::Int),
        MK_NODE!(
            Rule::DeclD3,
            MK_LEAF!(TokenKind::ClassName, "Counter"),
            signature(id("next"), vec![])
        ),
        compound(vec![
            assign(id("count"), MK_NODE!(Rule::AddExpr, id("count"), int(1))),
            ret(Some(id("count"))),
        ])
    );
    program(vec![
        declaration,
        constructor,
        next,
        function(
            TokenKind::Int,
            "main",
            vec![],
            vec![
                var(named("Counter"), id("c"), None),
                ret(Some(call(dot("c", "next"), vec![]))),
            ],
        ),
    ])
}

fn mem_init(name: &str, arguments: Vec<Node>) -> Node {
    MK_NODE!(
        Rule::MemInit,
        MK_NODE!(Rule::MemInitId3, id(name)),
        Node::list(Rule::ExprList, arguments)
    )
}

#[test]
fn test_out_of_class_member_definitions() {
    let result = check(&counter(mem_init("count", vec![int(0)])));
    assert!(result.is_ok(), "{:?}", result.diagnostics);

    let counter = result.symbols.lookup("Counter").unwrap();
    let class = counter.as_class().unwrap();
    assert!(class.is_complete());
    assert!(class.private_members().contains_key("count"));
    for name in ["Counter", "next"] {
        let (_, method) = class.member(name).unwrap();
        assert!(method.as_function().unwrap().is_defined(), "{} has no body", name);
    }
}

#[rstest]
#[case(mem_init("missing", vec![int(1)]), "NotFoundError")]
#[case(mem_init("count", vec![string("zero")]), "TypeMismatchError")]
#[case(mem_init("count", vec![int(1), int(2)]), "ArityMismatchError")]
fn test_constructor_initializers(#[case] init: Node, #[case] error: &str) {
    let result = check(&counter(init));
    assert_eq!(result.error_names(), vec![error]);
}

#[test]
fn test_streams_need_iostream() {
    // cout << "hi" << endl;
    let output = MK_NODE!(
        Rule::ShiftLeft,
        MK_NODE!(Rule::ShiftLeft, id("cout"), string("hi")),
        id("endl")
    );
    let root = program(vec![main_returning(vec![output])]);

    let result = check(&root);
    assert!(result.is_ok(), "{:?}", result.diagnostics);

    let result = type_check_with(&root, &Config::bare().with_header(Header::Cmath)).unwrap();
    assert_eq!(
        result.error_names(),
        vec!["UnknownIdentifierError", "UnknownIdentifierError"]
    );
}

#[test]
fn test_stream_as_condition() {
    // int x; while (cin >> x) x;
    let root = program(vec![main_returning(vec![
        var(specs(TokenKind::Int), id("x"), None),
        MK_NODE!(
            Rule::WhileLoop,
            MK_NODE!(Rule::ShiftRight, id("cin"), id("x")),
            id("x")
        ),
    ])]);

    let result = check(&root);
    assert!(result.is_ok(), "{:?}", result.diagnostics);
}

fn linked_node() -> Node {
    // struct Node { int value; Node *next; };
    class(
        TokenKind::Struct,
        "Node",
        member(
            data_member(specs(TokenKind::Int), id("value")),
            Some(member(data_member(named("Node"), ptr(id("next"))), None)),
        ),
    )
}

#[test]
fn test_new_and_delete_with_self_referential_struct() {
    // Node *head = new Node; head->next = head; head->value = 1; delete head;
    let allocation = MK_NODE!(
        Rule::NewExpr,
        MK_NODE!(Rule::NewTypeId, MK_LIST!(Rule::TypeSpecSeq, id("Node")), None::<Node>),
        None::<Node>
    );
    let root = program(vec![
        linked_node(),
        main_returning(vec![
            var(named("Node"), ptr(id("head")), Some(allocation)),
            assign(arrow("head", "next"), id("head")),
            assign(arrow("head", "value"), int(1)),
            MK_NODE!(Rule::DeleteExpr1, id("head")),
        ]),
    ]);

    let result = check(&root);
    assert!(result.is_ok(), "{:?}", result.diagnostics);
    assert_eq!(
        result.resolution("Node::next").map(|ty| ty.to_string()).as_deref(),
        Some("class Node *")
    );
}

#[test]
fn test_member_access_needs_matching_indirection() {
    // Node n; n->value; Node *p; p.value;
    let root = program(vec![
        linked_node(),
        main_returning(vec![
            var(named("Node"), id("n"), None),
            arrow("n", "value"),
            var(named("Node"), ptr(id("p")), None),
            dot("p", "value"),
            dot("n", "missing"),
        ]),
    ]);

    let result = check(&root);
    assert_eq!(
        result.error_names(),
        vec!["TypeMismatchError", "TypeMismatchError", "NotFoundError"]
    );
}

#[test]
fn test_release_frees_class_descriptors() {
    let root = program(vec![linked_node()]);
    let TypeCheckResult {
        diagnostics,
        resolutions,
        symbols,
        ..
    } = check(&root);
    assert!(diagnostics.is_empty());
    drop(resolutions);

    let node = symbols.lookup("Node").unwrap();
    let class = Rc::downgrade(node.as_class().unwrap());
    drop(node);
    assert!(class.upgrade().is_some());

    symbols.release();
    assert!(class.upgrade().is_none());
}

#[test]
fn test_diagnostic_limit() {
    init_logger();
    let root = program(vec![main_returning(vec![id("a"), id("b"), id("c")])]);
    let result = type_check_with(&root, &Config::default().with_max_diagnostics(1)).unwrap();
    assert_eq!(result.error_names(), vec!["UnknownIdentifierError"]);
    assert_eq!(result.resolutions.len(), 3);
}

#[test]
fn test_malformed_tree_aborts() {
    init_logger();
    let root = program(vec![MK_NODE!(Rule::BreakStatement)]);
    assert!(matches!(
        type_check(&root),
        Err(InternalError::UnexpectedRule {
            rule: Rule::BreakStatement,
            context: "declaration",
            ..
        })
    ));
}
