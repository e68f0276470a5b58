use std::rc::Rc;

use log::{debug, trace, warn};

use crate::{
    ast::{
        ast::{Node, Token},
        rules::{Rule, RuleCategory},
    },
    config::Config,
    errors::errors::{Error, ErrorImpl, InternalError},
    symbols::symbol_table::SymbolTable,
    types::types::{Base, ClassInfo, TypeInfo},
    Position,
};

use super::{
    class::type_check_class_spec,
    decl::{type_check_function_def, type_check_simple_decl},
    expr::type_check_expr,
    stmt::type_check_stmt,
};

/// A name reference and the type it resolved to.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub name: String,
    pub position: Position,
    pub ty: TypeInfo,
}

/// Outcome of checking one compilation unit.
#[derive(Debug)]
pub struct TypeCheckResult {
    /// Type of the root node; `void` for a whole program.
    pub ty: TypeInfo,
    pub diagnostics: Vec<Error>,
    pub resolutions: Vec<Resolution>,
    /// The global scope and everything reachable from it.
    pub symbols: SymbolTable,
}

impl TypeCheckResult {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_names(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .map(|error| error.get_error_name())
            .collect()
    }

    /// Type of the last reference to `name`.
    pub fn resolution(&self, name: &str) -> Option<&TypeInfo> {
        self.resolutions
            .iter()
            .rev()
            .find(|resolution| resolution.name == name)
            .map(|resolution| &resolution.ty)
    }
}

/// State of one checking pass.
#[derive(Debug)]
pub struct TypeChecker {
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Error>,
    pub resolutions: Vec<Resolution>,
    /// Return types of the functions being checked, innermost last.
    pub return_types: Vec<Rc<TypeInfo>>,
    pub loops: usize,
    pub switches: usize,
    saved_jumps: Vec<(usize, usize)>,
    max_diagnostics: Option<usize>,
    dropped: usize,
}

impl TypeChecker {
    pub fn new(config: &Config) -> Self {
        TypeChecker {
            symbols: SymbolTable::populated(config),
            diagnostics: vec![],
            resolutions: vec![],
            return_types: vec![],
            loops: 0,
            switches: 0,
            saved_jumps: vec![],
            max_diagnostics: config.max_diagnostics,
            dropped: 0,
        }
    }

    /// Records a diagnostic and hands back the type to continue with.
    pub fn report(&mut self, error: ErrorImpl, position: Position) -> TypeInfo {
        if self
            .max_diagnostics
            .is_some_and(|limit| self.diagnostics.len() >= limit)
        {
            if self.dropped == 0 {
                warn!(
                    "diagnostic limit of {} reached, dropping the rest",
                    self.diagnostics.len()
                );
            }
            self.dropped += 1;
        } else {
            trace!("{}: {}", position, error);
            self.diagnostics.push(Error::new(error, position));
        }
        TypeInfo::unknown()
    }

    pub fn resolve(&mut self, name: impl Into<String>, position: Position, ty: TypeInfo) {
        self.resolutions.push(Resolution {
            name: name.into(),
            position,
            ty,
        });
    }

    /// Enters a function body. Loop and switch nesting does not carry into
    /// it.
    pub fn enter_function(&mut self, return_type: Rc<TypeInfo>) {
        self.return_types.push(return_type);
        self.saved_jumps.push((self.loops, self.switches));
        self.loops = 0;
        self.switches = 0;
    }

    pub fn leave_function(&mut self) {
        self.return_types.pop();
        (self.loops, self.switches) = self.saved_jumps.pop().unwrap_or_default();
    }

    fn finish(self, ty: TypeInfo) -> TypeCheckResult {
        debug!(
            "type check finished: {} diagnostics ({} dropped), {} resolutions",
            self.diagnostics.len(),
            self.dropped,
            self.resolutions.len()
        );
        TypeCheckResult {
            ty,
            diagnostics: self.diagnostics,
            resolutions: self.resolutions,
            symbols: self.symbols,
        }
    }
}

pub fn unexpected(node: &Node, context: &'static str) -> InternalError {
    InternalError::UnexpectedRule {
        rule: node.rule,
        context,
        position: node.position(),
    }
}

pub fn leaf_token(node: &Node) -> Result<&Token, InternalError> {
    node.token().ok_or_else(|| unexpected(node, "token"))
}

/// The name a nested-name or class-name leaf spells.
pub fn name_token(node: &Node) -> Result<&Token, InternalError> {
    match node.rule {
        Rule::Token => leaf_token(node),
        Rule::NestedName1 => leaf_token(node.expect_child(0)?),
        _ => Err(unexpected(node, "name")),
    }
}

/// Looks up `name` as a type. Enclosing class bodies come first since the
/// class name is taken by the constructor inside them.
pub fn lookup_type_name(symbols: &SymbolTable, name: &str) -> Result<TypeInfo, ErrorImpl> {
    if let Some(class) = symbols.open_class(name) {
        return Ok(TypeInfo::new(Base::Class(Rc::clone(class))));
    }

    let ty = symbols.lookup(name)?;
    match ty.as_class() {
        Some(_) if !ty.is_pointer() => Ok((*ty).clone()),
        _ => Err(ErrorImpl::TypeMismatch {
            expected: String::from("type name"),
            received: ty.to_string(),
        }),
    }
}

pub fn resolve_type_name(type_checker: &mut TypeChecker, token: &Token) -> TypeInfo {
    match lookup_type_name(&type_checker.symbols, &token.text) {
        Ok(ty) => ty,
        Err(ErrorImpl::NotFound { name }) => type_checker.report(
            ErrorImpl::UnknownIdentifier { name },
            token.position.clone(),
        ),
        Err(error) => type_checker.report(error, token.position.clone()),
    }
}

/// Resolves the class named by a nested-name specifier.
pub fn resolve_class(
    type_checker: &mut TypeChecker,
    node: &Node,
) -> Result<Option<Rc<ClassInfo>>, InternalError> {
    let token = name_token(node)?;
    let ty = resolve_type_name(type_checker, token);
    Ok(ty.as_class().cloned())
}

pub fn type_check_declaration(type_checker: &mut TypeChecker, node: &Node) -> Result<(), InternalError> {
    match node.rule {
        Rule::DeclSeq => {
            for declaration in node.flatten() {
                type_check_declaration(type_checker, declaration)?;
            }
            Ok(())
        }
        Rule::SimpleDecl => type_check_simple_decl(type_checker, node),
        Rule::FunctionDef | Rule::CtorFunctionDef => type_check_function_def(type_checker, node),
        _ => Err(unexpected(node, "declaration")),
    }
}

/// Checks any node: a program, a declaration, a statement or an
/// expression.
pub fn type_check_node(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    match node.rule.category() {
        RuleCategory::Program => {
            if let Some(declarations) = node.child(0) {
                type_check_declaration(type_checker, declarations)?;
            }
            Ok(TypeInfo::void())
        }
        RuleCategory::Declaration | RuleCategory::Function => {
            type_check_declaration(type_checker, node)?;
            Ok(TypeInfo::void())
        }
        RuleCategory::Statement => {
            type_check_stmt(type_checker, node)?;
            Ok(TypeInfo::void())
        }
        RuleCategory::Class if node.rule == Rule::ClassSpec => {
            type_check_class_spec(type_checker, node)
        }
        _ => type_check_expr(type_checker, node),
    }
}

/// Checks a tree with every standard header's built-ins available.
pub fn type_check(root: &Node) -> Result<TypeCheckResult, InternalError> {
    type_check_with(root, &Config::default())
}

pub fn type_check_with(root: &Node, config: &Config) -> Result<TypeCheckResult, InternalError> {
    let mut type_checker = TypeChecker::new(config);
    let ty = type_check_node(&mut type_checker, root)?;
    Ok(type_checker.finish(ty))
}
