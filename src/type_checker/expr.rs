use std::rc::Rc;

use crate::{
    ast::{
        ast::{Node, Token, TokenKind},
        rules::{BinaryKind, Rule, RuleCategory},
    },
    errors::errors::{ErrorImpl, InternalError},
    types::{
        compat::{common_arithmetic, common_type, compatible, same_type},
        types::{BaseKind, ClassInfo, FunctionInfo, TypeInfo},
    },
    Position,
};

use super::{
    decl::{array_size, type_check_construction, type_check_specifiers, type_check_type_id},
    type_checker::{leaf_token, resolve_class, unexpected, TypeChecker},
};

pub type Argument = (TypeInfo, Position);

/// Type of a constant token, `None` for anything else.
pub fn constant_type(token: &Token) -> Option<TypeInfo> {
    match token.kind {
        TokenKind::IntConst => Some(TypeInfo::int()),
        TokenKind::FloatConst => Some(TypeInfo::double()),
        TokenKind::CharConst => Some(TypeInfo::char()),
        TokenKind::StringLit => Some(TypeInfo::pointer_to(TypeInfo::char())),
        TokenKind::True | TokenKind::False => Some(TypeInfo::bool()),
        _ => None,
    }
}

pub fn literal_token(node: &Node) -> Result<&Token, InternalError> {
    match node.token() {
        Some(token) => Ok(token),
        None => leaf_token(node.expect_child(0)?),
    }
}

/// Whether `ty` is one of the iostream classes.
pub fn is_stream(ty: &TypeInfo) -> bool {
    !ty.is_pointer()
        && ty
            .as_class()
            .is_some_and(|class| class.name == "ostream" || class.name == "istream")
}

/// Widens Bool and Char to Int, the way unary arithmetic does.
fn promote(ty: &TypeInfo) -> TypeInfo {
    common_arithmetic(ty, &TypeInfo::int()).unwrap_or_else(|| ty.clone())
}

fn mismatch(expected: &str, received: &TypeInfo) -> ErrorImpl {
    ErrorImpl::TypeMismatch {
        expected: expected.to_string(),
        received: received.to_string(),
    }
}

pub fn type_check_arguments(
    type_checker: &mut TypeChecker,
    node: Option<&Node>,
) -> Result<Vec<Argument>, InternalError> {
    let mut arguments = vec![];
    if let Some(node) = node {
        for argument in node.flatten() {
            arguments.push((type_check_expr(type_checker, argument)?, argument.position()));
        }
    }
    Ok(arguments)
}

/// Checks argument count and types of a call against `function`.
pub fn check_call_arguments(
    type_checker: &mut TypeChecker,
    function: &FunctionInfo,
    arguments: &[Argument],
    position: Position,
) {
    let total = function.parameters.len();
    if arguments.len() < function.required || arguments.len() > total {
        let expected = if function.required == total {
            total.to_string()
        } else {
            format!("{} to {}", function.required, total)
        };
        type_checker.report(
            ErrorImpl::ArityMismatch {
                expected,
                received: arguments.len(),
            },
            position,
        );
        return;
    }

    for (parameter, (argument, position)) in function.parameters.iter().zip(arguments) {
        if !compatible(parameter, argument) {
            type_checker.report(
                ErrorImpl::TypeMismatch {
                    expected: parameter.to_string(),
                    received: argument.to_string(),
                },
                position.clone(),
            );
        }
    }
}

/// Checks constructing a `class` object from `arguments`. Without a
/// declared constructor only default and copy construction are allowed.
pub fn check_constructor(
    type_checker: &mut TypeChecker,
    class: &Rc<ClassInfo>,
    arguments: &[Argument],
    position: Position,
) {
    let inside = type_checker.symbols.inside_class(class);
    match type_checker.symbols.member_lookup(class, &class.name, inside) {
        Ok(constructor) => {
            if let Some(function) = constructor.as_function().filter(|_| !constructor.is_pointer()) {
                check_call_arguments(type_checker, function, arguments, position);
            }
        }
        Err(ErrorImpl::NotFound { .. }) => {
            let copy = match arguments {
                [(argument, _)] => !argument.is_pointer()
                    && argument.as_class().is_some_and(|other| Rc::ptr_eq(other, class)),
                _ => false,
            };
            if !arguments.is_empty() && !copy {
                type_checker.report(
                    ErrorImpl::ArityMismatch {
                        expected: String::from("0"),
                        received: arguments.len(),
                    },
                    position,
                );
            }
        }
        Err(error) => {
            type_checker.report(error, position);
        }
    }
}

fn type_check_reference(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    match node.rule {
        Rule::Token => {
            let token = leaf_token(node)?;
            if let Some(ty) = constant_type(token) {
                return Ok(ty);
            }
            if !matches!(token.kind, TokenKind::Identifier | TokenKind::ClassName) {
                return Err(unexpected(node, "expression"));
            }

            let ty = match type_checker.symbols.lookup(&token.text) {
                Ok(ty) => (*ty).clone(),
                Err(_) => type_checker.report(
                    ErrorImpl::UnknownIdentifier {
                        name: token.text.clone(),
                    },
                    token.position.clone(),
                ),
            };
            type_checker.resolve(token.text.clone(), token.position.clone(), ty.clone());
            Ok(ty)
        }
        Rule::QualId => {
            let class = resolve_class(type_checker, node.expect_child(0)?)?;
            let member = leaf_token(node.expect_child(1)?)?;
            let Some(class) = class else {
                return Ok(TypeInfo::unknown());
            };

            let inside = type_checker.symbols.inside_class(&class);
            let ty = match type_checker.symbols.member_lookup(&class, &member.text, inside) {
                Ok(ty) => (*ty).clone(),
                Err(error) => type_checker.report(error, member.position.clone()),
            };
            type_checker.resolve(
                format!("{}::{}", class.name, member.text),
                member.position.clone(),
                ty.clone(),
            );
            Ok(ty)
        }
        _ => Err(unexpected(node, "expression")),
    }
}

/// `++` and `--`, prefix or postfix.
fn type_check_step(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    let operand = type_check_expr(type_checker, node.expect_child(0)?)?;
    if operand.is_unknown() || operand.is_arithmetic() || operand.is_pointer() {
        Ok(operand)
    } else {
        Ok(type_checker.report(
            mismatch("arithmetic or pointer type", &operand),
            node.position(),
        ))
    }
}

fn type_check_member_access(
    type_checker: &mut TypeChecker,
    node: &Node,
) -> Result<TypeInfo, InternalError> {
    let base = type_check_expr(type_checker, node.expect_child(0)?)?;
    let member = leaf_token(node.expect_child(1)?)?;
    if base.is_unknown() {
        return Ok(base);
    }

    let (base, levels, expected) = match node.rule {
        Rule::PostfixArrowField => (base.decay(), 1, "pointer to class"),
        _ => (base, 0, "class"),
    };
    let class = match base.as_class() {
        Some(class) if base.indirection == levels => Rc::clone(class),
        _ => return Ok(type_checker.report(mismatch(expected, &base), node.position())),
    };

    let inside = type_checker.symbols.inside_class(&class);
    let ty = match type_checker.symbols.member_lookup(&class, &member.text, inside) {
        Ok(ty) => (*ty).clone(),
        Err(error) => type_checker.report(error, member.position.clone()),
    };
    type_checker.resolve(
        format!("{}::{}", class.name, member.text),
        member.position.clone(),
        ty.clone(),
    );
    Ok(ty)
}

fn type_check_postfix(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    match node.rule {
        Rule::PostfixArrayIndex => {
            let base = type_check_expr(type_checker, node.expect_child(0)?)?;
            let index_node = node.expect_child(1)?;
            let index = type_check_expr(type_checker, index_node)?;
            if !index.is_integral() && !index.is_unknown() {
                type_checker.report(mismatch("int", &index), index_node.position());
            }

            if base.is_unknown() {
                return Ok(base);
            }
            match base.pointee() {
                Some(element) => Ok(element),
                None => Ok(type_checker.report(mismatch("pointer or array", &base), node.position())),
            }
        }
        Rule::PostfixCall => {
            let callee = type_check_expr(type_checker, node.expect_child(0)?)?;
            let arguments = type_check_arguments(type_checker, node.child(1))?;
            if callee.is_unknown() {
                return Ok(callee);
            }

            match callee.as_function() {
                Some(function) => {
                    check_call_arguments(type_checker, function, &arguments, node.position());
                    Ok((*function.return_type).clone())
                }
                None => Ok(type_checker.report(mismatch("function", &callee), node.position())),
            }
        }
        Rule::PostfixCast => {
            let ty = type_check_specifiers(type_checker, node.expect_child(0)?)?;
            let arguments = type_check_arguments(type_checker, node.child(1))?;
            if ty.is_unknown() {
                return Ok(ty);
            }

            match ty.as_class() {
                Some(class) => check_constructor(type_checker, class, &arguments, node.position()),
                None => match arguments.as_slice() {
                    [] => {}
                    [(argument, position)] => {
                        if !argument.is_arithmetic() && !argument.is_unknown() {
                            type_checker.report(
                                mismatch("arithmetic type", argument),
                                position.clone(),
                            );
                        }
                    }
                    _ => {
                        type_checker.report(
                            ErrorImpl::ArityMismatch {
                                expected: String::from("0 to 1"),
                                received: arguments.len(),
                            },
                            node.position(),
                        );
                    }
                },
            }
            Ok(ty)
        }
        Rule::PostfixDotField | Rule::PostfixArrowField => type_check_member_access(type_checker, node),
        Rule::PostfixPlusPlus | Rule::PostfixMinusMinus => type_check_step(type_checker, node),
        _ => Err(unexpected(node, "expression")),
    }
}

fn type_check_unary(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    match node.rule {
        Rule::UnaryPlusPlus | Rule::UnaryMinusMinus => return type_check_step(type_checker, node),
        Rule::UnarySizeofType => {
            type_check_type_id(type_checker, node.expect_child(0)?)?;
            return Ok(TypeInfo::int());
        }
        _ => {}
    }

    let operand = type_check_expr(type_checker, node.expect_child(0)?)?;
    if operand.is_unknown() {
        return Ok(match node.rule {
            Rule::UnarySizeofExpr => TypeInfo::int(),
            Rule::UnaryNot => TypeInfo::bool(),
            _ => operand,
        });
    }

    let position = node.position();
    let ty = match node.rule {
        Rule::UnaryStar => match operand.pointee() {
            Some(pointee) => pointee,
            None => type_checker.report(mismatch("pointer", &operand), position),
        },
        Rule::UnaryAmpersand => TypeInfo::pointer_to(operand),
        Rule::UnaryPlus | Rule::UnaryMinus if operand.is_arithmetic() => promote(&operand),
        Rule::UnaryPlus | Rule::UnaryMinus => {
            type_checker.report(mismatch("arithmetic type", &operand), position)
        }
        Rule::UnaryNot if operand.is_scalar() => TypeInfo::bool(),
        Rule::UnaryNot => type_checker.report(mismatch("scalar type", &operand), position),
        Rule::UnaryTilde if operand.is_integral() => promote(&operand),
        Rule::UnaryTilde => type_checker.report(mismatch("integral type", &operand), position),
        Rule::UnarySizeofExpr => TypeInfo::int(),
        _ => return Err(unexpected(node, "expression")),
    };
    Ok(ty)
}

/// Applies a new-declarator to `ty` and returns the allocated element
/// type: `new int*[n]` allocates `int *`s.
fn new_declarator(
    type_checker: &mut TypeChecker,
    node: Option<&Node>,
    ty: TypeInfo,
) -> Result<TypeInfo, InternalError> {
    let Some(node) = node else {
        return Ok(ty);
    };

    match node.rule {
        Rule::NewDecl => new_declarator(type_checker, node.child(1), TypeInfo::pointer_to(ty)),
        Rule::DirectNewDecl1 => {
            array_size(type_checker, Some(node.expect_child(0)?))?;
            Ok(ty)
        }
        Rule::DirectNewDecl2 => {
            let size = array_size(type_checker, Some(node.expect_child(1)?))?;
            new_declarator(
                type_checker,
                Some(node.expect_child(0)?),
                TypeInfo::array_of(ty, size),
            )
        }
        _ => Err(unexpected(node, "new declarator")),
    }
}

fn type_check_new(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    if node.rule != Rule::NewExpr {
        return Err(unexpected(node, "expression"));
    }

    let type_node = node.expect_child(0)?;
    let allocated = match type_node.rule {
        Rule::NewTypeId => {
            let base = type_check_specifiers(type_checker, type_node.expect_child(0)?)?;
            new_declarator(type_checker, type_node.child(1), base)?
        }
        _ => type_check_type_id(type_checker, type_node)?,
    };

    let arguments = type_check_arguments(type_checker, node.child(1))?;
    if node.child(1).is_some() {
        type_check_construction(type_checker, &allocated, &arguments, node.position());
    } else if let Some(class) = allocated.as_class().filter(|_| !allocated.is_pointer()) {
        check_constructor(type_checker, class, &[], node.position());
    }
    Ok(TypeInfo::pointer_to(allocated))
}

fn type_check_delete(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    let operand = type_check_expr(type_checker, node.expect_child(0)?)?;
    if !operand.is_pointer() && !operand.is_unknown() {
        return Ok(type_checker.report(mismatch("pointer", &operand), node.position()));
    }
    Ok(TypeInfo::void())
}

fn type_check_arithmetic(
    type_checker: &mut TypeChecker,
    rule: Rule,
    lhs: &TypeInfo,
    rhs: &TypeInfo,
    position: Position,
) -> TypeInfo {
    let (left, right) = (lhs.decay(), rhs.decay());
    match rule {
        Rule::AddExpr | Rule::SubExpr if left.is_pointer() && right.is_integral() => return left,
        Rule::AddExpr if left.is_integral() && right.is_pointer() => return right,
        Rule::SubExpr if left.is_pointer() && right.is_pointer() => {
            if same_type(&left, &right) {
                return TypeInfo::int();
            }
            return type_checker.report(
                ErrorImpl::TypeMismatch {
                    expected: left.to_string(),
                    received: right.to_string(),
                },
                position,
            );
        }
        _ => {}
    }

    match common_arithmetic(lhs, rhs) {
        Some(ty) => ty,
        None => {
            let offender = if lhs.is_arithmetic() { rhs } else { lhs };
            type_checker.report(mismatch("arithmetic type", offender), position)
        }
    }
}

/// Operands of `< > <= >= == !=`: two arithmetic values or two pointers to
/// compatible types.
fn comparable(lhs: &TypeInfo, rhs: &TypeInfo) -> bool {
    if lhs.is_arithmetic() && rhs.is_arithmetic() {
        return true;
    }
    let (left, right) = (lhs.decay(), rhs.decay());
    left.is_pointer() && right.is_pointer() && (compatible(&left, &right) || compatible(&right, &left))
}

fn type_check_binary(
    type_checker: &mut TypeChecker,
    node: &Node,
    kind: BinaryKind,
) -> Result<TypeInfo, InternalError> {
    let lhs = type_check_expr(type_checker, node.expect_child(0)?)?;
    let rhs = type_check_expr(type_checker, node.expect_child(1)?)?;
    let position = node.position();

    if lhs.is_unknown() || rhs.is_unknown() {
        return Ok(match kind {
            BinaryKind::Relational | BinaryKind::Logical => TypeInfo::bool(),
            _ if is_stream(&lhs) => lhs,
            _ => TypeInfo::unknown(),
        });
    }

    let ty = match kind {
        BinaryKind::Arithmetic => type_check_arithmetic(type_checker, node.rule, &lhs, &rhs, position),
        BinaryKind::Integral => {
            if matches!(node.rule, Rule::ShiftLeft | Rule::ShiftRight) && is_stream(&lhs) {
                return Ok(lhs);
            }
            match common_arithmetic(&lhs, &rhs) {
                Some(ty) if lhs.is_integral() && rhs.is_integral() => ty,
                _ => {
                    let offender = if lhs.is_integral() { &rhs } else { &lhs };
                    type_checker.report(mismatch("integral type", offender), position)
                }
            }
        }
        BinaryKind::Relational if comparable(&lhs, &rhs) => TypeInfo::bool(),
        BinaryKind::Relational => type_checker.report(
            ErrorImpl::TypeMismatch {
                expected: lhs.to_string(),
                received: rhs.to_string(),
            },
            position,
        ),
        BinaryKind::Logical if lhs.is_scalar() && rhs.is_scalar() => TypeInfo::bool(),
        BinaryKind::Logical => {
            let offender = if lhs.is_scalar() { &rhs } else { &lhs };
            type_checker.report(mismatch("scalar type", offender), position)
        }
    };
    Ok(ty)
}

fn type_check_ternary(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    let condition_node = node.expect_child(0)?;
    let condition = type_check_expr(type_checker, condition_node)?;
    if !condition.is_scalar() && !condition.is_unknown() {
        type_checker.report(mismatch("bool", &condition), condition_node.position());
    }

    let then = type_check_expr(type_checker, node.expect_child(1)?)?;
    let otherwise = type_check_expr(type_checker, node.expect_child(2)?)?;
    match common_type(&then, &otherwise) {
        Some(ty) => Ok(ty),
        None => Ok(type_checker.report(
            ErrorImpl::TypeMismatch {
                expected: then.to_string(),
                received: otherwise.to_string(),
            },
            node.position(),
        )),
    }
}

fn type_check_assignment(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    let lhs_node = node.expect_child(0)?;
    let lhs = type_check_expr(type_checker, lhs_node)?;
    let operator = leaf_token(node.expect_child(1)?)?.kind;
    let rhs_node = node.expect_child(2)?;
    let rhs = type_check_expr(type_checker, rhs_node)?;

    if lhs.is_unknown() {
        return Ok(lhs);
    }
    if !lhs.is_pointer() && matches!(lhs.kind(), BaseKind::Array | BaseKind::Function) {
        return Ok(type_checker.report(mismatch("assignable value", &lhs), lhs_node.position()));
    }
    if rhs.is_unknown() {
        return Ok(lhs);
    }

    let valid = match operator {
        TokenKind::Assign => compatible(&lhs, &rhs),
        TokenKind::AddAssign | TokenKind::SubAssign => {
            (lhs.is_pointer() && rhs.is_integral()) || (lhs.is_arithmetic() && rhs.is_arithmetic())
        }
        TokenKind::MulAssign | TokenKind::DivAssign => lhs.is_arithmetic() && rhs.is_arithmetic(),
        TokenKind::ModAssign
        | TokenKind::ShlAssign
        | TokenKind::ShrAssign
        | TokenKind::AndAssign
        | TokenKind::XorAssign
        | TokenKind::OrAssign => lhs.is_integral() && rhs.is_integral(),
        _ => return Err(unexpected(node, "assignment operator")),
    };

    if !valid {
        return Ok(type_checker.report(
            ErrorImpl::TypeMismatch {
                expected: lhs.to_string(),
                received: rhs.to_string(),
            },
            rhs_node.position(),
        ));
    }
    Ok(lhs)
}

pub fn type_check_expr(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    match node.rule.category() {
        RuleCategory::Literal => {
            let token = literal_token(node)?;
            constant_type(token).ok_or_else(|| unexpected(node, "literal"))
        }
        RuleCategory::Reference => type_check_reference(type_checker, node),
        RuleCategory::Postfix => type_check_postfix(type_checker, node),
        RuleCategory::Unary => type_check_unary(type_checker, node),
        RuleCategory::New => type_check_new(type_checker, node),
        RuleCategory::Delete => type_check_delete(type_checker, node),
        RuleCategory::PointerToMember => {
            type_check_expr(type_checker, node.expect_child(0)?)?;
            type_check_expr(type_checker, node.expect_child(1)?)?;
            let construct = match node.rule {
                Rule::PmExpr2 => ".*",
                _ => "->*",
            };
            Ok(type_checker.report(
                ErrorImpl::Unsupported {
                    construct: construct.to_string(),
                },
                node.position(),
            ))
        }
        RuleCategory::Binary(kind) => type_check_binary(type_checker, node, kind),
        RuleCategory::Ternary => type_check_ternary(type_checker, node),
        RuleCategory::Assignment => type_check_assignment(type_checker, node),
        RuleCategory::Comma => {
            type_check_expr(type_checker, node.expect_child(0)?)?;
            type_check_expr(type_checker, node.expect_child(1)?)
        }
        RuleCategory::List => {
            let mut ty = TypeInfo::void();
            for item in node.flatten() {
                ty = type_check_expr(type_checker, item)?;
            }
            Ok(ty)
        }
        _ => Err(unexpected(node, "expression")),
    }
}
