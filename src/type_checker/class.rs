//! Class specifications, members and constructor initializer lists.

use std::rc::Rc;

use log::debug;

use crate::{
    ast::{
        ast::{Node, TokenKind},
        rules::Rule,
    },
    errors::errors::{ErrorImpl, InternalError},
    symbols::symbol_table::ScopeKind,
    types::types::{Access, TypeInfo},
};

use super::{
    decl::{
        declare_function_def, type_check_construction, type_check_function_body,
        type_check_init_decl, type_check_simple_decl, type_check_specifiers, FunctionBody,
    },
    expr::{type_check_arguments, type_check_expr},
    type_checker::{leaf_token, unexpected, TypeChecker},
};

fn default_access(key: TokenKind) -> Access {
    match key {
        TokenKind::Class => Access::Private,
        _ => Access::Public,
    }
}

/// The class a class head introduces. A forward declaration in the same
/// scope is completed instead of redeclared.
fn open_class_type(type_checker: &mut TypeChecker, head: &Node) -> Result<TypeInfo, InternalError> {
    let name = match head.rule {
        Rule::ClassHead1 => Some(leaf_token(head.expect_child(1)?)?),
        Rule::ClassHead2 => None,
        _ => return Err(unexpected(head, "class head")),
    };

    let Some(name) = name else {
        let ty = TypeInfo::class("<anonymous>");
        if let Some(class) = ty.as_class() {
            type_checker.symbols.declare_class(class);
        }
        return Ok(ty);
    };

    if let Some(existing) = type_checker.symbols.lookup_local(&name.text) {
        if let Some(class) = existing.as_class() {
            if !existing.is_pointer() && !class.is_complete() {
                return Ok((*existing).clone());
            }
        }
        type_checker.report(
            ErrorImpl::Redeclaration {
                name: name.text.clone(),
            },
            name.position.clone(),
        );
        let ty = TypeInfo::class(name.text.as_str());
        if let Some(class) = ty.as_class() {
            type_checker.symbols.declare_class(class);
        }
        return Ok(ty);
    }

    let ty = TypeInfo::class(name.text.as_str());
    if let Some(class) = ty.as_class() {
        type_checker.symbols.declare_class(class);
    }
    if let Err(error) = type_checker.symbols.insert(&name.text, Rc::new(ty.clone())) {
        type_checker.report(error, name.position.clone());
    }
    Ok(ty)
}

fn type_check_member_declarator(
    type_checker: &mut TypeChecker,
    base: &TypeInfo,
    node: &Node,
) -> Result<(), InternalError> {
    match node.rule {
        // The pure-specifier `= 0` carries no type.
        Rule::MemberDeclarator1 => {
            type_check_init_decl(type_checker, base.clone(), node.expect_child(0)?, None)?;
        }
        Rule::MemberDeclarator2 => {
            type_check_init_decl(
                type_checker,
                base.clone(),
                node.expect_child(0)?,
                Some(node.expect_child(1)?),
            )?;
        }
        Rule::MemberDeclarator3 => {
            let width_node = node.expect_child(1)?;
            let width = type_check_expr(type_checker, width_node)?;
            if !base.is_integral() && !base.is_unknown() {
                type_checker.report(
                    ErrorImpl::TypeMismatch {
                        expected: String::from("int"),
                        received: base.to_string(),
                    },
                    node.position(),
                );
            }
            if !width.is_integral() && !width.is_unknown() {
                type_checker.report(
                    ErrorImpl::TypeMismatch {
                        expected: String::from("int"),
                        received: width.to_string(),
                    },
                    width_node.position(),
                );
            }
            if let Some(name) = node.child(0) {
                type_check_init_decl(type_checker, base.clone(), name, None)?;
            }
        }
        _ => {
            type_check_init_decl(type_checker, base.clone(), node, None)?;
        }
    }
    Ok(())
}

fn type_check_member<'a>(
    type_checker: &mut TypeChecker,
    node: &'a Node,
    bodies: &mut Vec<FunctionBody<'a>>,
) -> Result<(), InternalError> {
    match node.rule {
        Rule::FunctionDef | Rule::CtorFunctionDef => {
            bodies.push(declare_function_def(type_checker, node)?);
        }
        Rule::MemberDecl1 => {
            let base = match node.child(0) {
                Some(specifiers) => type_check_specifiers(type_checker, specifiers)?,
                None => TypeInfo::void(),
            };
            if let Some(declarators) = node.child(1) {
                for declarator in declarators.flatten() {
                    type_check_member_declarator(type_checker, &base, declarator)?;
                }
            }
        }
        Rule::SimpleDecl => type_check_simple_decl(type_checker, node)?,
        _ => return Err(unexpected(node, "member declaration")),
    }
    Ok(())
}

/// Checks a class body and returns the class type.
///
/// Members are declared in order into the public or private table of the
/// active access region. Inline method bodies are checked afterwards so
/// they see every member.
pub fn type_check_class_spec(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    let head = node.expect_child(0)?;
    let key = leaf_token(head.expect_child(0)?)?;
    if !key.kind.is_class_key() {
        return Err(unexpected(head, "class head"));
    }

    let ty = open_class_type(type_checker, head)?;
    let Some(class) = ty.as_class().cloned() else {
        return Ok(ty);
    };

    type_checker.symbols.push_scope(ScopeKind::Class(Rc::clone(&class)));
    type_checker.symbols.set_access(default_access(key.kind));

    let mut bodies = vec![];
    let mut spec = node.child(1);
    while let Some(item) = spec {
        match item.rule {
            Rule::MemberSpec1 => {
                type_check_member(type_checker, item.expect_child(0)?, &mut bodies)?;
                spec = item.child(1);
            }
            Rule::MemberSpec2 => {
                let access = leaf_token(item.expect_child(0)?)?;
                match access.kind {
                    TokenKind::Public => type_checker.symbols.set_access(Access::Public),
                    // Without inheritance protected members behave as private.
                    TokenKind::Private | TokenKind::Protected => {
                        type_checker.symbols.set_access(Access::Private)
                    }
                    _ => return Err(unexpected(item, "access specifier")),
                }
                spec = item.child(1);
            }
            _ => {
                type_check_member(type_checker, item, &mut bodies)?;
                spec = None;
            }
        }
    }

    class.mark_complete();
    for body in bodies {
        type_check_function_body(type_checker, body)?;
    }
    type_checker.symbols.pop_scope();

    debug!(
        "defined {} with {} public and {} private members",
        ty,
        class.public_members().len(),
        class.private_members().len()
    );
    Ok(ty)
}

/// Checks a constructor's member initializer list against the class being
/// constructed.
pub fn type_check_ctor_init(type_checker: &mut TypeChecker, node: &Node) -> Result<(), InternalError> {
    let list = match node.rule {
        Rule::CtorInit => node.expect_child(0)?,
        _ => node,
    };
    let class = type_checker.symbols.current_class().cloned();

    for init in list.flatten() {
        if init.rule != Rule::MemInit {
            return Err(unexpected(init, "member initializer"));
        }
        let id = init.expect_child(0)?;
        let arguments = type_check_arguments(type_checker, init.child(1))?;

        match id.rule {
            Rule::MemInitId3 => {
                let name = leaf_token(id.expect_child(0)?)?;
                match class.as_ref().and_then(|class| class.member(&name.text)) {
                    Some((_, member)) => {
                        type_check_construction(type_checker, &member, &arguments, id.position())
                    }
                    None => {
                        let qualified = match &class {
                            Some(class) => format!("{}::{}", class.name, name.text),
                            None => name.text.clone(),
                        };
                        type_checker.report(
                            ErrorImpl::NotFound { name: qualified },
                            name.position.clone(),
                        );
                    }
                }
            }
            Rule::MemInitId1 => {
                type_checker.report(
                    ErrorImpl::Unsupported {
                        construct: String::from("base class initializer"),
                    },
                    id.position(),
                );
            }
            _ => return Err(unexpected(id, "member initializer")),
        }
    }
    Ok(())
}
