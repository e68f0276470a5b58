use crate::{
    ast::{ast::Node, rules::{Rule, RuleCategory}},
    errors::errors::{ErrorImpl, InternalError},
    symbols::symbol_table::ScopeKind,
    types::{compat::compatible, types::TypeInfo},
};

use super::{
    decl::{type_check_init_decl, type_check_specifiers},
    expr::{is_stream, type_check_expr},
    type_checker::{type_check_declaration, unexpected, TypeChecker},
};

fn illegal_jump(type_checker: &mut TypeChecker, statement: &str, node: &Node) {
    type_checker.report(
        ErrorImpl::IllegalJump {
            statement: statement.to_string(),
        },
        node.position(),
    );
}

/// Checks the condition of `if`, `while`, `for` or `switch`. A condition may
/// declare a variable, which lands in the scope the caller opened.
fn type_check_condition(
    type_checker: &mut TypeChecker,
    node: &Node,
    integral: bool,
) -> Result<(), InternalError> {
    let ty = match node.rule {
        Rule::Condition2 => {
            let base = type_check_specifiers(type_checker, node.expect_child(0)?)?;
            type_check_init_decl(
                type_checker,
                base,
                node.expect_child(1)?,
                Some(node.expect_child(2)?),
            )?
        }
        _ => type_check_expr(type_checker, node)?,
    };

    let valid = ty.is_unknown()
        || if integral {
            ty.is_integral()
        } else {
            ty.is_scalar() || is_stream(&ty)
        };
    if !valid {
        let expected = if integral { "int" } else { "bool" };
        type_checker.report(
            ErrorImpl::TypeMismatch {
                expected: expected.to_string(),
                received: ty.to_string(),
            },
            node.position(),
        );
    }
    Ok(())
}

fn type_check_loop_body(type_checker: &mut TypeChecker, node: &Node) -> Result<(), InternalError> {
    type_checker.loops += 1;
    let result = type_check_stmt(type_checker, node);
    type_checker.loops -= 1;
    result
}

fn type_check_return(type_checker: &mut TypeChecker, node: &Node) -> Result<(), InternalError> {
    let value = match node.child(0) {
        Some(expr) => Some((type_check_expr(type_checker, expr)?, expr.position())),
        None => None,
    };
    let Some(expected) = type_checker.return_types.last().cloned() else {
        illegal_jump(type_checker, "return", node);
        return Ok(());
    };
    if expected.is_unknown() {
        return Ok(());
    }

    let (received, position) = match value {
        None if expected.is_void() => return Ok(()),
        None => (TypeInfo::void(), node.position()),
        Some((ty, _)) if ty.is_unknown() => return Ok(()),
        Some((ty, position)) => {
            let valid = if expected.is_void() {
                ty.is_void()
            } else {
                !ty.is_void() && compatible(&expected, &ty)
            };
            if valid {
                return Ok(());
            }
            (ty, position)
        }
    };
    type_checker.report(
        ErrorImpl::RetTypeMismatch {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        position,
    );
    Ok(())
}

pub fn type_check_statements(type_checker: &mut TypeChecker, node: Option<&Node>) -> Result<(), InternalError> {
    if let Some(node) = node {
        for statement in node.flatten() {
            type_check_stmt(type_checker, statement)?;
        }
    }
    Ok(())
}

/// A function body's outermost block shares the parameter scope.
pub fn type_check_function_block(type_checker: &mut TypeChecker, body: &Node) -> Result<(), InternalError> {
    match body.rule {
        Rule::CompoundStatement => type_check_statements(type_checker, body.child(0)),
        _ => type_check_stmt(type_checker, body),
    }
}

pub fn type_check_stmt(type_checker: &mut TypeChecker, node: &Node) -> Result<(), InternalError> {
    match node.rule {
        Rule::CompoundStatement => {
            type_checker.symbols.push_scope(ScopeKind::Block);
            type_check_statements(type_checker, node.child(0))?;
            type_checker.symbols.pop_scope();
        }
        Rule::StatementSeq1 | Rule::StatementSeq2 => type_check_statements(type_checker, Some(node))?,
        Rule::IfStatement | Rule::IfElseStatement => {
            type_checker.symbols.push_scope(ScopeKind::Block);
            type_check_condition(type_checker, node.expect_child(0)?, false)?;
            type_check_stmt(type_checker, node.expect_child(1)?)?;
            if node.rule == Rule::IfElseStatement {
                type_check_stmt(type_checker, node.expect_child(2)?)?;
            }
            type_checker.symbols.pop_scope();
        }
        Rule::SwitchStatement => {
            type_checker.symbols.push_scope(ScopeKind::Block);
            type_check_condition(type_checker, node.expect_child(0)?, true)?;
            type_checker.switches += 1;
            let result = type_check_stmt(type_checker, node.expect_child(1)?);
            type_checker.switches -= 1;
            result?;
            type_checker.symbols.pop_scope();
        }
        Rule::WhileLoop => {
            type_checker.symbols.push_scope(ScopeKind::Block);
            type_check_condition(type_checker, node.expect_child(0)?, false)?;
            type_check_loop_body(type_checker, node.expect_child(1)?)?;
            type_checker.symbols.pop_scope();
        }
        Rule::DoWhileLoop => {
            type_check_loop_body(type_checker, node.expect_child(0)?)?;
            type_check_condition(type_checker, node.expect_child(1)?, false)?;
        }
        Rule::ForLoop => {
            type_checker.symbols.push_scope(ScopeKind::Block);
            if let Some(init) = node.child(0) {
                type_check_stmt(type_checker, init)?;
            }
            if let Some(condition) = node.child(1) {
                type_check_condition(type_checker, condition, false)?;
            }
            if let Some(step) = node.child(2) {
                type_check_expr(type_checker, step)?;
            }
            type_check_loop_body(type_checker, node.expect_child(3)?)?;
            type_checker.symbols.pop_scope();
        }
        Rule::CaseStatement => {
            if type_checker.switches == 0 {
                illegal_jump(type_checker, "case", node);
            }
            let label_node = node.expect_child(0)?;
            let label = type_check_expr(type_checker, label_node)?;
            if !label.is_integral() && !label.is_unknown() {
                type_checker.report(
                    ErrorImpl::TypeMismatch {
                        expected: String::from("int"),
                        received: label.to_string(),
                    },
                    label_node.position(),
                );
            }
            if let Some(statement) = node.child(1) {
                type_check_stmt(type_checker, statement)?;
            }
        }
        Rule::DefaultStatement => {
            if type_checker.switches == 0 {
                illegal_jump(type_checker, "default", node);
            }
            if let Some(statement) = node.child(0) {
                type_check_stmt(type_checker, statement)?;
            }
        }
        Rule::BreakStatement => {
            if type_checker.loops + type_checker.switches == 0 {
                illegal_jump(type_checker, "break", node);
            }
        }
        Rule::ContinueStatement => {
            if type_checker.loops == 0 {
                illegal_jump(type_checker, "continue", node);
            }
        }
        Rule::ReturnStatement => type_check_return(type_checker, node)?,
        _ => match node.rule.category() {
            RuleCategory::Declaration => type_check_declaration(type_checker, node)?,
            RuleCategory::Program
            | RuleCategory::Statement
            | RuleCategory::Specifier
            | RuleCategory::Declarator
            | RuleCategory::Parameter
            | RuleCategory::Function
            | RuleCategory::Initializer
            | RuleCategory::Class => return Err(unexpected(node, "statement")),
            _ => {
                type_check_expr(type_checker, node)?;
            }
        },
    }
    Ok(())
}
