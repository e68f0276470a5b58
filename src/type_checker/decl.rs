//! Declarations: specifiers, declarators, initializers and function
//! definitions.

use std::rc::Rc;

use log::{debug, trace, warn};

use crate::{
    ast::{
        ast::{Node, Token, TokenKind},
        rules::Rule,
    },
    errors::errors::{ErrorImpl, InternalError},
    symbols::symbol_table::ScopeKind,
    types::{
        compat::{compatible, same_type},
        types::{Base, BaseKind, ClassInfo, TypeInfo},
    },
    Position,
};

use super::{
    class::{type_check_class_spec, type_check_ctor_init},
    expr::{check_constructor, literal_token, type_check_arguments, type_check_expr, Argument},
    stmt::type_check_function_block,
    type_checker::{
        leaf_token, lookup_type_name, name_token, resolve_class, resolve_type_name, unexpected,
        TypeChecker,
    },
};

/// The identifier a declarator introduces, possibly qualified by a class
/// (`Foo::get`).
#[derive(Debug, Clone)]
pub struct DeclaredName {
    pub class: Option<Token>,
    pub name: String,
    pub position: Position,
}

impl DeclaredName {
    fn new(name: impl Into<String>, position: Position) -> Self {
        DeclaredName {
            class: None,
            name: name.into(),
            position,
        }
    }

    pub fn qualified(&self) -> String {
        match &self.class {
            Some(class) => format!("{}::{}", class.text, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Option<DeclaredName>,
    pub ty: TypeInfo,
    pub has_default: bool,
}

/// A declarator applied to its base type.
#[derive(Debug)]
pub struct Declarator {
    pub name: Option<DeclaredName>,
    pub ty: TypeInfo,
    /// Parameters of the function declarator closest to the name.
    pub parameters: Option<Vec<Parameter>>,
}

/// A function whose body still has to be checked.
#[derive(Debug)]
pub struct FunctionBody<'a> {
    pub name: String,
    pub ty: Rc<TypeInfo>,
    pub parameters: Vec<Parameter>,
    /// Class context to reopen for out-of-class member definitions.
    pub class: Option<Rc<ClassInfo>>,
    pub ctor_init: Option<&'a Node>,
    pub body: &'a Node,
    /// Whether the checked body defines `ty`. False after a redefinition.
    pub attach: bool,
}

fn primitive(kind: TokenKind) -> Option<TypeInfo> {
    let kind = match kind {
        TokenKind::Int => BaseKind::Int,
        TokenKind::Double | TokenKind::Float => BaseKind::Double,
        TokenKind::Char => BaseKind::Char,
        TokenKind::Bool => BaseKind::Bool,
        TokenKind::Void => BaseKind::Void,
        _ => return None,
    };
    TypeInfo::primitive(kind)
}

/// `struct Foo` names a class, declaring it incomplete when unseen.
fn type_check_elaborated(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    let name = leaf_token(node.expect_child(1)?)?;
    match lookup_type_name(&type_checker.symbols, &name.text) {
        Ok(ty) => Ok(ty),
        Err(ErrorImpl::NotFound { .. }) => {
            let ty = TypeInfo::class(name.text.as_str());
            if let Some(class) = ty.as_class() {
                type_checker.symbols.declare_class(class);
            }
            if let Err(error) = type_checker.symbols.insert(&name.text, Rc::new(ty.clone())) {
                type_checker.report(error, name.position.clone());
            }
            trace!("forward declared {}", ty);
            Ok(ty)
        }
        Err(error) => Ok(type_checker.report(error, name.position.clone())),
    }
}

/// `Outer::Inner` as a type.
fn type_check_nested_type(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    let (outer, inner) = match node.rule {
        Rule::ElabTypeSpec2 => (node.expect_child(1)?, node.expect_child(2)?),
        _ => (node.expect_child(0)?, node.expect_child(1)?),
    };
    let class = resolve_class(type_checker, outer)?;
    let inner = leaf_token(inner)?;
    let Some(class) = class else {
        return Ok(TypeInfo::unknown());
    };

    let inside = type_checker.symbols.inside_class(&class);
    match type_checker.symbols.member_lookup(&class, &inner.text, inside) {
        Ok(ty) if ty.as_class().is_some() && !ty.is_pointer() => Ok((*ty).clone()),
        Ok(ty) => Ok(type_checker.report(
            ErrorImpl::TypeMismatch {
                expected: String::from("type name"),
                received: ty.to_string(),
            },
            inner.position.clone(),
        )),
        Err(error) => Ok(type_checker.report(error, inner.position.clone())),
    }
}

/// Resolves a decl-specifier or type-specifier sequence to its base type.
/// Qualifiers and storage classes do not affect the type.
pub fn type_check_specifiers(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    let mut base: Option<TypeInfo> = None;

    for item in node.flatten() {
        let ty = match item.rule {
            Rule::Token => {
                let token = leaf_token(item)?;
                match token.kind {
                    TokenKind::Identifier | TokenKind::ClassName => {
                        Some(resolve_type_name(type_checker, token))
                    }
                    TokenKind::Typedef => {
                        type_checker.report(
                            ErrorImpl::Unsupported {
                                construct: String::from("typedef"),
                            },
                            token.position.clone(),
                        );
                        None
                    }
                    // Modifiers: `long` alone is an int, `long double` stays double.
                    TokenKind::Short
                    | TokenKind::Long
                    | TokenKind::Signed
                    | TokenKind::Unsigned
                    | TokenKind::Const
                    | TokenKind::Volatile
                    | TokenKind::Static
                    | TokenKind::Extern
                    | TokenKind::Auto
                    | TokenKind::Register
                    | TokenKind::Inline
                    | TokenKind::Virtual
                    | TokenKind::Friend => None,
                    kind => match primitive(kind) {
                        Some(ty) => Some(ty),
                        None => return Err(unexpected(item, "specifier")),
                    },
                }
            }
            Rule::ClassSpec => Some(type_check_class_spec(type_checker, item)?),
            Rule::ElabTypeSpec1 => Some(type_check_elaborated(type_checker, item)?),
            Rule::ElabTypeSpec2 | Rule::NestedSimpleTypeSpec => {
                Some(type_check_nested_type(type_checker, item)?)
            }
            Rule::TypeId => Some(type_check_type_id(type_checker, item)?),
            _ => return Err(unexpected(item, "specifier")),
        };

        if let Some(ty) = ty {
            match &base {
                Some(previous) => {
                    let error = ErrorImpl::TypeMismatch {
                        expected: previous.to_string(),
                        received: ty.to_string(),
                    };
                    type_checker.report(error, item.position());
                }
                None => base = Some(ty),
            }
        }
    }

    Ok(base.unwrap_or_else(TypeInfo::int))
}

/// `sizeof(T)`, `new T` and casts name a type without declaring anything.
pub fn type_check_type_id(type_checker: &mut TypeChecker, node: &Node) -> Result<TypeInfo, InternalError> {
    if node.rule != Rule::TypeId {
        return type_check_specifiers(type_checker, node);
    }

    let base = type_check_specifiers(type_checker, node.expect_child(0)?)?;
    match node.child(1) {
        Some(abstract_declarator) => {
            Ok(type_check_declarator(type_checker, abstract_declarator, base)?.ty)
        }
        None => Ok(base),
    }
}

/// Value of an integer constant expression spelled as a single literal.
pub fn integer_constant(node: &Node) -> Option<u64> {
    match node.rule {
        Rule::Literal | Rule::Token => literal_token(node).ok()?.int_value(),
        _ => None,
    }
}

/// Spelling of a constant dimension no array can have: a negative value
/// or one too large to represent.
fn invalid_size(node: &Node) -> Option<String> {
    match node.rule {
        Rule::UnaryMinus => {
            let operand = node.child(0)?;
            let token = literal_token(operand).ok()?;
            if token.kind != TokenKind::IntConst || token.int_value() == Some(0) {
                return None;
            }
            Some(format!("-{}", token.text))
        }
        Rule::Literal | Rule::Token => {
            let token = literal_token(node).ok()?;
            let fits = token
                .int_value()
                .is_some_and(|value| usize::try_from(value).is_ok());
            (token.kind == TokenKind::IntConst && !fits).then(|| token.text.clone())
        }
        _ => None,
    }
}

/// Size of an array dimension. Non-constant or absent sizes give 0.
pub fn array_size(type_checker: &mut TypeChecker, node: Option<&Node>) -> Result<usize, InternalError> {
    let Some(node) = node else {
        return Ok(0);
    };
    if let Some(size) = integer_constant(node) {
        if let Ok(size) = usize::try_from(size) {
            return Ok(size);
        }
    }
    if let Some(spelling) = invalid_size(node) {
        type_checker.report(
            ErrorImpl::TypeMismatch {
                expected: String::from("array size"),
                received: spelling,
            },
            node.position(),
        );
        return Ok(0);
    }

    let ty = type_check_expr(type_checker, node)?;
    if !ty.is_integral() && !ty.is_unknown() {
        type_checker.report(
            ErrorImpl::TypeMismatch {
                expected: String::from("int"),
                received: ty.to_string(),
            },
            node.position(),
        );
    }
    Ok(0)
}

fn apply_ptr_operator(
    type_checker: &mut TypeChecker,
    node: &Node,
    ty: TypeInfo,
) -> Result<TypeInfo, InternalError> {
    match node.rule {
        Rule::Ptr3 => Ok(TypeInfo::pointer_to(ty)),
        Rule::Ptr4 => Ok(type_checker.report(
            ErrorImpl::Unsupported {
                construct: String::from("pointer to member"),
            },
            node.position(),
        )),
        Rule::Token => match leaf_token(node)?.kind {
            TokenKind::Star => Ok(TypeInfo::pointer_to(ty)),
            // A reference is checked as the referenced type.
            TokenKind::Ampersand => Ok(ty),
            _ => Err(unexpected(node, "pointer operator")),
        },
        _ => Err(unexpected(node, "pointer operator")),
    }
}

pub fn function_type(return_type: TypeInfo, parameters: &[Parameter]) -> TypeInfo {
    let required = parameters
        .iter()
        .position(|parameter| parameter.has_default)
        .unwrap_or(parameters.len());
    TypeInfo::function_with_defaults(
        return_type,
        parameters.iter().map(|parameter| parameter.ty.clone()).collect(),
        required,
    )
}

pub fn type_check_parameters(
    type_checker: &mut TypeChecker,
    node: Option<&Node>,
) -> Result<Vec<Parameter>, InternalError> {
    let Some(node) = node else {
        return Ok(vec![]);
    };

    let mut parameters = vec![];
    for item in node.flatten() {
        let (declarator, default) = match item.rule {
            Rule::ParamDecl1 => (Some(item.expect_child(1)?), None),
            Rule::ParamDecl2 => (Some(item.expect_child(1)?), Some(item.expect_child(2)?)),
            Rule::ParamDecl3 => (item.child(1), None),
            Rule::ParamDecl4 => (item.child(1), Some(item.expect_child(2)?)),
            _ => return Err(unexpected(item, "parameter")),
        };

        let base = type_check_specifiers(type_checker, item.expect_child(0)?)?;
        let (name, ty) = match declarator {
            Some(declarator) => {
                let declared = type_check_declarator(type_checker, declarator, base)?;
                (declared.name, declared.ty)
            }
            None => (None, base),
        };
        // Arrays and functions are passed as pointers.
        let ty = ty.decay();

        if let Some(default) = default {
            let value = type_check_expr(type_checker, default)?;
            if !compatible(&ty, &value) {
                type_checker.report(
                    ErrorImpl::TypeMismatch {
                        expected: ty.to_string(),
                        received: value.to_string(),
                    },
                    default.position(),
                );
            }
        }

        parameters.push(Parameter {
            name,
            ty,
            has_default: default.is_some(),
        });
    }

    // `f(void)` takes nothing.
    if let [parameter] = parameters.as_slice() {
        if parameter.name.is_none() && parameter.ty.is_void() {
            return Ok(vec![]);
        }
    }
    for parameter in parameters.iter_mut().filter(|parameter| parameter.ty.is_void()) {
        let position = match &parameter.name {
            Some(name) => name.position.clone(),
            None => node.position(),
        };
        parameter.ty = type_checker.report(
            ErrorImpl::TypeMismatch {
                expected: String::from("object type"),
                received: String::from("void"),
            },
            position,
        );
    }
    Ok(parameters)
}

fn compose(
    type_checker: &mut TypeChecker,
    node: Option<&Node>,
    ty: TypeInfo,
    declarator: &mut Declarator,
) -> Result<(), InternalError> {
    let Some(node) = node else {
        declarator.ty = ty;
        return Ok(());
    };

    match node.rule {
        Rule::Token => {
            let token = leaf_token(node)?;
            if !matches!(token.kind, TokenKind::Identifier | TokenKind::ClassName) {
                return Err(unexpected(node, "declarator"));
            }
            declarator.name = Some(DeclaredName::new(token.text.as_str(), token.position.clone()));
            declarator.ty = ty;
        }
        Rule::Decl2 | Rule::AbstractDecl => {
            let ty = apply_ptr_operator(type_checker, node.expect_child(0)?, ty)?;
            let inner = match node.rule {
                Rule::Decl2 => Some(node.expect_child(1)?),
                _ => node.child(1),
            };
            compose(type_checker, inner, ty, declarator)?;
        }
        Rule::DirectDecl2 | Rule::DirectDecl3 | Rule::DirectAbstractDecl => {
            let parameters = type_check_parameters(type_checker, node.child(1))?;
            let function = function_type(ty, &parameters);
            declarator.parameters = Some(parameters);
            let inner = match node.rule {
                Rule::DirectAbstractDecl => node.child(0),
                _ => Some(node.expect_child(0)?),
            };
            compose(type_checker, inner, function, declarator)?;
        }
        Rule::DirectDecl4 | Rule::DirectAbstractDecl3 => {
            let size = array_size(type_checker, node.child(1))?;
            let inner = match node.rule {
                Rule::DirectAbstractDecl3 => node.child(0),
                _ => Some(node.expect_child(0)?),
            };
            compose(type_checker, inner, TypeInfo::array_of(ty, size), declarator)?;
        }
        Rule::DirectAbstractDecl4 => compose(type_checker, node.child(0), ty, declarator)?,
        Rule::DirectDecl5 => {
            let class = leaf_token(node.expect_child(0)?)?;
            let parameters = type_check_parameters(type_checker, node.child(1))?;
            declarator.ty = function_type(TypeInfo::void(), &parameters);
            declarator.parameters = Some(parameters);
            declarator.name = Some(DeclaredName::new(class.text.as_str(), class.position.clone()));
        }
        Rule::DirectDecl6 => {
            let class = leaf_token(node.expect_child(0)?)?;
            declarator.ty = TypeInfo::function(TypeInfo::void(), vec![]);
            declarator.parameters = Some(vec![]);
            declarator.name = Some(DeclaredName::new(
                format!("~{}", class.text),
                class.position.clone(),
            ));
        }
        Rule::DeclD3 => {
            let class = name_token(node.expect_child(0)?)?.clone();
            compose(type_checker, Some(node.expect_child(1)?), ty, declarator)?;
            if let Some(name) = declarator.name.as_mut() {
                name.class = Some(class);
            }
        }
        _ => return Err(unexpected(node, "declarator")),
    }
    Ok(())
}

/// Applies `node` to `base` the way C composes declarators: `int *a[3]` is
/// an array of pointers, `int (*p)[3]` a pointer to an array.
pub fn type_check_declarator(
    type_checker: &mut TypeChecker,
    node: &Node,
    base: TypeInfo,
) -> Result<Declarator, InternalError> {
    let mut declarator = Declarator {
        name: None,
        ty: TypeInfo::unknown(),
        parameters: None,
    };
    compose(type_checker, Some(node), base, &mut declarator)?;
    Ok(declarator)
}

/// Whether a value of type `value` may initialize a `declared` object.
/// Besides assignment compatibility a string literal fills a char array.
pub fn initializable(declared: &TypeInfo, value: &TypeInfo) -> bool {
    if compatible(declared, value) {
        return true;
    }
    match &declared.base {
        Base::Array(array) if !declared.is_pointer() => {
            array.element.kind() == BaseKind::Char
                && !array.element.is_pointer()
                && value.kind() == BaseKind::Char
                && value.indirection == 1
        }
        _ => false,
    }
}

/// Checks constructing a `ty` object from `arguments`: the class
/// constructor for classes, a single convertible value for everything
/// else.
pub fn type_check_construction(
    type_checker: &mut TypeChecker,
    ty: &TypeInfo,
    arguments: &[Argument],
    position: Position,
) {
    if ty.is_unknown() {
        return;
    }
    if let Some(class) = ty.as_class().filter(|_| !ty.is_pointer()) {
        check_constructor(type_checker, class, arguments, position);
        return;
    }

    match arguments {
        [] => {}
        [(argument, position)] => {
            if !initializable(ty, argument) {
                type_checker.report(
                    ErrorImpl::TypeMismatch {
                        expected: ty.to_string(),
                        received: argument.to_string(),
                    },
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
                position,
            );
        }
    }
}

fn too_many_initializers(declared: &TypeInfo, count: usize) -> ErrorImpl {
    ErrorImpl::TypeMismatch {
        expected: declared.to_string(),
        received: format!("{} initializers", count),
    }
}

/// Checks a brace initializer list. Unsized arrays take their length from
/// it.
fn type_check_init_list(
    type_checker: &mut TypeChecker,
    declared: &TypeInfo,
    list: &Node,
) -> Result<TypeInfo, InternalError> {
    let items = match list.child(0) {
        Some(items) => items.flatten(),
        None => vec![],
    };

    match &declared.base {
        Base::Array(array) if !declared.is_pointer() => {
            for item in &items {
                type_check_initializer(type_checker, &array.element, item)?;
            }
            if array.size == 0 {
                return Ok(TypeInfo::array_of((*array.element).clone(), items.len()));
            }
            if items.len() > array.size {
                type_checker.report(too_many_initializers(declared, items.len()), list.position());
            }
        }
        Base::Class(_) if !declared.is_pointer() => {
            for item in &items {
                type_check_initializer(type_checker, &TypeInfo::unknown(), item)?;
            }
        }
        _ => {
            for item in &items {
                type_check_initializer(type_checker, declared, item)?;
            }
            if items.len() > 1 {
                type_checker.report(too_many_initializers(declared, items.len()), list.position());
            }
        }
    }
    Ok(declared.clone())
}

/// Checks an initializer against the declared type and returns the type
/// the declared object ends up with.
pub fn type_check_initializer(
    type_checker: &mut TypeChecker,
    declared: &TypeInfo,
    node: &Node,
) -> Result<TypeInfo, InternalError> {
    match node.rule {
        Rule::Initializer | Rule::ConstantInit => {
            type_check_initializer(type_checker, declared, node.expect_child(0)?)
        }
        Rule::InitClause2 => type_check_init_list(type_checker, declared, node),
        Rule::Init1 => {
            let arguments = type_check_arguments(type_checker, node.child(0))?;
            type_check_construction(type_checker, declared, &arguments, node.position());
            Ok(declared.clone())
        }
        _ => {
            let value = type_check_expr(type_checker, node)?;
            if !declared.is_unknown() && !initializable(declared, &value) {
                type_checker.report(
                    ErrorImpl::TypeMismatch {
                        expected: declared.to_string(),
                        received: value.to_string(),
                    },
                    node.position(),
                );
            }
            Ok(declared.clone())
        }
    }
}

/// Declares a function, reusing an earlier prototype of the same
/// signature in this scope.
fn declare_function(type_checker: &mut TypeChecker, name: &DeclaredName, ty: TypeInfo) -> Rc<TypeInfo> {
    if let Some(existing) = type_checker.symbols.lookup_local(&name.name) {
        if same_signature(&existing, &ty) {
            return existing;
        }
    }

    let ty = Rc::new(ty);
    if let Err(error) = type_checker.symbols.insert(&name.name, Rc::clone(&ty)) {
        type_checker.report(error, name.position.clone());
    }
    ty
}

/// Identical return and parameter types. Default arguments do not take
/// part.
fn same_signature(existing: &TypeInfo, declared: &TypeInfo) -> bool {
    if existing.is_pointer() || declared.is_pointer() {
        return false;
    }
    match (existing.as_function(), declared.as_function()) {
        (Some(existing), Some(declared)) => {
            existing.parameters.len() == declared.parameters.len()
                && same_type(&existing.return_type, &declared.return_type)
                && existing
                    .parameters
                    .iter()
                    .zip(declared.parameters.iter())
                    .all(|(a, b)| same_type(a, b))
        }
        _ => false,
    }
}

/// Resolves `Foo::name` to the class and, when it exists, the member.
fn resolve_qualified(
    type_checker: &mut TypeChecker,
    class: &Token,
    name: &DeclaredName,
) -> Option<(Rc<ClassInfo>, Option<Rc<TypeInfo>>)> {
    let ty = resolve_type_name(type_checker, class);
    let class = ty.as_class()?;
    match class.member(&name.name) {
        Some((_, member)) => Some((Rc::clone(class), Some(member))),
        None => {
            type_checker.report(
                ErrorImpl::NotFound {
                    name: name.qualified(),
                },
                name.position.clone(),
            );
            Some((Rc::clone(class), None))
        }
    }
}

/// Declares one declarator of a simple declaration or class member and
/// checks its initializer. Returns the declared type.
pub fn type_check_init_decl(
    type_checker: &mut TypeChecker,
    base: TypeInfo,
    node: &Node,
    initializer: Option<&Node>,
) -> Result<TypeInfo, InternalError> {
    let declarator = type_check_declarator(type_checker, node, base)?;
    let Some(name) = declarator.name else {
        return Err(unexpected(node, "declarator"));
    };
    let mut ty = declarator.ty;

    if ty.as_function().is_some() && !ty.is_pointer() {
        if let Some(class) = &name.class {
            if let Some((_, Some(member))) = resolve_qualified(type_checker, class, &name) {
                if !same_signature(&member, &ty) {
                    type_checker.report(
                        ErrorImpl::TypeMismatch {
                            expected: member.to_string(),
                            received: ty.to_string(),
                        },
                        name.position.clone(),
                    );
                }
            }
            return Ok(ty);
        }
        return Ok((*declare_function(type_checker, &name, ty)).clone());
    }

    if ty.is_void() {
        ty = type_checker.report(
            ErrorImpl::TypeMismatch {
                expected: String::from("object type"),
                received: String::from("void"),
            },
            name.position.clone(),
        );
    }

    match initializer {
        Some(initializer) => ty = type_check_initializer(type_checker, &ty, initializer)?,
        None => {
            // Members are constructed by their class's constructor.
            let in_class = matches!(type_checker.symbols.current().kind(), ScopeKind::Class(_));
            if let Some(class) = ty.as_class().filter(|_| !ty.is_pointer() && !in_class) {
                if class.is_complete() {
                    check_constructor(type_checker, class, &[], name.position.clone());
                }
            }
        }
    }

    if let Some(class) = &name.class {
        // Definition of a static member declared in the class.
        if let Some((_, Some(member))) = resolve_qualified(type_checker, class, &name) {
            if !compatible(&member, &ty) {
                type_checker.report(
                    ErrorImpl::TypeMismatch {
                        expected: member.to_string(),
                        received: ty.to_string(),
                    },
                    name.position.clone(),
                );
            }
        }
        return Ok(ty);
    }

    if let Err(error) = type_checker.symbols.insert(&name.name, Rc::new(ty.clone())) {
        type_checker.report(error, name.position.clone());
    }
    Ok(ty)
}

pub fn type_check_simple_decl(type_checker: &mut TypeChecker, node: &Node) -> Result<(), InternalError> {
    let base = type_check_specifiers(type_checker, node.expect_child(0)?)?;
    if let Some(list) = node.child(1) {
        for item in list.flatten() {
            match item.rule {
                Rule::InitDecl => {
                    type_check_init_decl(type_checker, base.clone(), item.expect_child(0)?, item.child(1))?
                }
                _ => type_check_init_decl(type_checker, base.clone(), item, None)?,
            };
        }
    }
    Ok(())
}

/// Declares the function a definition introduces and returns its body for
/// checking. Class bodies check the returned bodies once all members are
/// declared.
pub fn declare_function_def<'a>(
    type_checker: &mut TypeChecker,
    node: &'a Node,
) -> Result<FunctionBody<'a>, InternalError> {
    let (specifiers, declarator_node, ctor_init, body) = match node.rule {
        Rule::FunctionDef => (node.child(0), node.expect_child(1)?, None, node.expect_child(2)?),
        Rule::CtorFunctionDef => (
            None,
            node.expect_child(0)?,
            Some(node.expect_child(1)?),
            node.expect_child(2)?,
        ),
        _ => return Err(unexpected(node, "function definition")),
    };

    // Only constructors and destructors omit the return type.
    let base = match specifiers {
        Some(specifiers) => type_check_specifiers(type_checker, specifiers)?,
        None => TypeInfo::void(),
    };
    let declarator = type_check_declarator(type_checker, declarator_node, base)?;
    let (Some(name), Some(parameters)) = (declarator.name, declarator.parameters) else {
        return Err(unexpected(declarator_node, "function declarator"));
    };
    let ty = declarator.ty;
    if ty.as_function().is_none() || ty.is_pointer() {
        return Err(unexpected(declarator_node, "function declarator"));
    }

    let redefinition = |type_checker: &mut TypeChecker| {
        type_checker.report(
            ErrorImpl::Redeclaration {
                name: name.qualified(),
            },
            name.position.clone(),
        );
    };

    let (ty, class, attach) = match &name.class {
        None => match type_checker.symbols.lookup_local(&name.name) {
            Some(existing) if same_signature(&existing, &ty) => {
                if is_defined(&existing) {
                    redefinition(type_checker);
                    (Rc::new(ty), None, false)
                } else {
                    (existing, None, true)
                }
            }
            Some(_) => {
                redefinition(type_checker);
                (Rc::new(ty), None, false)
            }
            None => (declare_function(type_checker, &name, ty), None, true),
        },
        Some(class_name) => match resolve_qualified(type_checker, class_name, &name) {
            Some((class, Some(member))) => {
                if !same_signature(&member, &ty) {
                    type_checker.report(
                        ErrorImpl::TypeMismatch {
                            expected: member.to_string(),
                            received: ty.to_string(),
                        },
                        name.position.clone(),
                    );
                    (Rc::new(ty), Some(class), false)
                } else if is_defined(&member) {
                    redefinition(type_checker);
                    (Rc::new(ty), Some(class), false)
                } else {
                    (member, Some(class), true)
                }
            }
            Some((class, None)) => (Rc::new(ty), Some(class), false),
            None => (Rc::new(ty), None, false),
        },
    };

    Ok(FunctionBody {
        name: name.qualified(),
        ty,
        parameters,
        class,
        ctor_init,
        body,
        attach,
    })
}

fn is_defined(ty: &TypeInfo) -> bool {
    ty.as_function().is_some_and(|function| function.is_defined())
}

/// Checks a function body in a fresh parameter scope and attaches that
/// scope to the function.
pub fn type_check_function_body(
    type_checker: &mut TypeChecker,
    function: FunctionBody,
) -> Result<(), InternalError> {
    let Some(info) = function.ty.as_function().cloned() else {
        return Err(unexpected(function.body, "function body"));
    };

    if let Some(class) = &function.class {
        type_checker.symbols.push_scope(ScopeKind::Class(Rc::clone(class)));
    }
    type_checker.symbols.push_scope(ScopeKind::Function);

    for (parameter, ty) in function.parameters.iter().zip(info.parameters.iter()) {
        if let Some(name) = &parameter.name {
            if let Err(error) = type_checker.symbols.insert(&name.name, Rc::clone(ty)) {
                type_checker.report(error, name.position.clone());
            }
        }
    }

    type_checker.enter_function(Rc::clone(&info.return_type));
    if let Some(ctor_init) = function.ctor_init {
        type_check_ctor_init(type_checker, ctor_init)?;
    }
    type_check_function_block(type_checker, function.body)?;
    type_checker.leave_function();

    let scope = type_checker.symbols.pop_scope();
    if function.class.is_some() {
        type_checker.symbols.pop_scope();
    }

    if function.attach {
        if let Some(scope) = scope {
            if info.define(scope).is_err() {
                warn!("{} already has a body", function.name);
            }
        }
    }
    debug!("defined function {}: {}", function.name, function.ty);
    Ok(())
}

pub fn type_check_function_def(type_checker: &mut TypeChecker, node: &Node) -> Result<(), InternalError> {
    let body = declare_function_def(type_checker, node)?;
    type_check_function_body(type_checker, body)
}
