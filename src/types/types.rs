//! Type descriptors.
//!
//! A [`TypeInfo`] is a base kind plus a number of pointer levels. Payloads
//! of arrays, functions and classes are shared through `Rc`: a descriptor
//! is created where it is declared and every other holder clones the
//! handle instead of the descriptor.

use std::{
    cell::{Cell, OnceCell, Ref, RefCell},
    collections::HashMap,
    fmt::Display,
    rc::Rc,
};

use crate::{errors::errors::ErrorImpl, symbols::symbol_table::Scope};

/// Discriminant of [`Base`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    Int,
    Double,
    Char,
    Bool,
    Array,
    Function,
    Class,
    Void,
    Unknown,
}

#[derive(Debug, Clone)]
pub enum Base {
    Int,
    Double,
    Char,
    Bool,
    Array(ArrayInfo),
    Function(Rc<FunctionInfo>),
    Class(Rc<ClassInfo>),
    Void,
    Unknown,
}

impl Base {
    pub fn kind(&self) -> BaseKind {
        match self {
            Base::Int => BaseKind::Int,
            Base::Double => BaseKind::Double,
            Base::Char => BaseKind::Char,
            Base::Bool => BaseKind::Bool,
            Base::Array(_) => BaseKind::Array,
            Base::Function(_) => BaseKind::Function,
            Base::Class(_) => BaseKind::Class,
            Base::Void => BaseKind::Void,
            Base::Unknown => BaseKind::Unknown,
        }
    }
}

/// Static type of a value.
///
/// `indirection` counts pointer levels on top of `base`; a pointer to a
/// class is `base: Class, indirection: 1`.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub base: Base,
    pub indirection: usize,
}

#[derive(Debug, Clone)]
pub struct ArrayInfo {
    pub element: Rc<TypeInfo>,
    /// Declared length, 0 when unsized (`int a[]`).
    pub size: usize,
}

#[derive(Debug)]
pub struct FunctionInfo {
    pub return_type: Rc<TypeInfo>,
    pub parameters: Vec<Rc<TypeInfo>>,
    /// Parameters without a default argument.
    pub required: usize,
    symbols: OnceCell<Scope>,
}

impl FunctionInfo {
    /// Whether a body has been checked for this function.
    pub fn is_defined(&self) -> bool {
        self.symbols.get().is_some()
    }

    /// Scope of the function body, present once the function is defined.
    pub fn symbols(&self) -> Option<&Scope> {
        self.symbols.get()
    }

    /// Attaches the body's scope. A second definition is refused and the
    /// scope handed back.
    pub fn define(&self, symbols: Scope) -> Result<(), Scope> {
        self.symbols.set(symbols)
    }
}

/// Member visibility within a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
}

pub type MemberTable = HashMap<String, Rc<TypeInfo>>;

#[derive(Debug)]
pub struct ClassInfo {
    pub name: String,
    public: RefCell<MemberTable>,
    private: RefCell<MemberTable>,
    complete: Cell<bool>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        ClassInfo {
            name: name.into(),
            public: RefCell::new(HashMap::new()),
            private: RefCell::new(HashMap::new()),
            complete: Cell::new(false),
        }
    }

    /// Whether the class body has been seen (as opposed to `class Foo;`).
    pub fn is_complete(&self) -> bool {
        self.complete.get()
    }

    pub fn mark_complete(&self) {
        self.complete.set(true);
    }

    pub fn public_members(&self) -> Ref<'_, MemberTable> {
        self.public.borrow()
    }

    pub fn private_members(&self) -> Ref<'_, MemberTable> {
        self.private.borrow()
    }

    /// Looks a member up in both tables.
    pub fn member(&self, name: &str) -> Option<(Access, Rc<TypeInfo>)> {
        if let Some(ty) = self.public.borrow().get(name) {
            return Some((Access::Public, Rc::clone(ty)));
        }
        self.private
            .borrow()
            .get(name)
            .map(|ty| (Access::Private, Rc::clone(ty)))
    }

    /// Adds a member to the table for `access`. The two tables stay
    /// disjoint: a name present in either one is a redeclaration.
    pub fn add_member(
        &self,
        name: &str,
        ty: Rc<TypeInfo>,
        access: Access,
    ) -> Result<(), ErrorImpl> {
        if self.member(name).is_some() {
            return Err(ErrorImpl::Redeclaration {
                name: name.to_string(),
            });
        }

        let table = match access {
            Access::Public => &self.public,
            Access::Private => &self.private,
        };
        table.borrow_mut().insert(name.to_string(), ty);
        Ok(())
    }

    /// Drops every member. Called when the declaring scope goes away so
    /// members that mention the class itself do not keep it alive.
    pub fn clear(&self) {
        self.public.borrow_mut().clear();
        self.private.borrow_mut().clear();
    }
}

impl TypeInfo {
    pub fn new(base: Base) -> Self {
        TypeInfo {
            base,
            indirection: 0,
        }
    }

    /// A payload-free type of the given kind; `None` for arrays, functions
    /// and classes.
    pub fn primitive(kind: BaseKind) -> Option<Self> {
        let base = match kind {
            BaseKind::Int => Base::Int,
            BaseKind::Double => Base::Double,
            BaseKind::Char => Base::Char,
            BaseKind::Bool => Base::Bool,
            BaseKind::Void => Base::Void,
            BaseKind::Unknown => Base::Unknown,
            BaseKind::Array | BaseKind::Function | BaseKind::Class => return None,
        };
        Some(TypeInfo::new(base))
    }

    pub fn int() -> Self {
        TypeInfo::new(Base::Int)
    }

    pub fn double() -> Self {
        TypeInfo::new(Base::Double)
    }

    pub fn char() -> Self {
        TypeInfo::new(Base::Char)
    }

    pub fn bool() -> Self {
        TypeInfo::new(Base::Bool)
    }

    pub fn void() -> Self {
        TypeInfo::new(Base::Void)
    }

    pub fn unknown() -> Self {
        TypeInfo::new(Base::Unknown)
    }

    pub fn pointer_to(pointee: TypeInfo) -> Self {
        TypeInfo {
            indirection: pointee.indirection + 1,
            ..pointee
        }
    }

    pub fn array_of(element: TypeInfo, size: usize) -> Self {
        TypeInfo::new(Base::Array(ArrayInfo {
            element: Rc::new(element),
            size,
        }))
    }

    /// A function type whose parameters are all required. Its symbol table
    /// stays unset until the function is defined.
    pub fn function(return_type: TypeInfo, parameters: Vec<TypeInfo>) -> Self {
        let required = parameters.len();
        TypeInfo::function_with_defaults(return_type, parameters, required)
    }

    pub fn function_with_defaults(
        return_type: TypeInfo,
        parameters: Vec<TypeInfo>,
        required: usize,
    ) -> Self {
        TypeInfo::new(Base::Function(Rc::new(FunctionInfo {
            return_type: Rc::new(return_type),
            parameters: parameters.into_iter().map(Rc::new).collect(),
            required,
            symbols: OnceCell::new(),
        })))
    }

    /// A class type with empty, not yet complete member tables.
    pub fn class(name: impl Into<String>) -> Self {
        TypeInfo::new(Base::Class(Rc::new(ClassInfo::new(name))))
    }

    pub fn kind(&self) -> BaseKind {
        self.base.kind()
    }

    pub fn is_pointer(&self) -> bool {
        self.indirection > 0
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.base, Base::Unknown)
    }

    pub fn is_void(&self) -> bool {
        matches!(self.base, Base::Void) && !self.is_pointer()
    }

    pub fn is_void_pointer(&self) -> bool {
        matches!(self.base, Base::Void) && self.indirection == 1
    }

    /// Int, Double, Char or Bool, not behind a pointer.
    pub fn is_arithmetic(&self) -> bool {
        self.rank().is_some()
    }

    /// Int, Char or Bool, not behind a pointer.
    pub fn is_integral(&self) -> bool {
        !self.is_pointer() && matches!(self.base, Base::Int | Base::Char | Base::Bool)
    }

    /// Usable as a boolean test: arithmetic, pointer, or an array that
    /// decays to one.
    pub fn is_scalar(&self) -> bool {
        self.is_arithmetic() || self.decay().is_pointer()
    }

    /// Arithmetic promotion rank, `None` for non-arithmetic types.
    pub fn rank(&self) -> Option<u8> {
        if self.is_pointer() {
            return None;
        }
        match self.base {
            Base::Double => Some(4),
            Base::Int => Some(3),
            Base::Char => Some(2),
            Base::Bool => Some(1),
            _ => None,
        }
    }

    /// Function payload of a function or pointer-to-function type.
    pub fn as_function(&self) -> Option<&Rc<FunctionInfo>> {
        match &self.base {
            Base::Function(function) if self.indirection <= 1 => Some(function),
            _ => None,
        }
    }

    /// Class payload, regardless of pointer levels.
    pub fn as_class(&self) -> Option<&Rc<ClassInfo>> {
        match &self.base {
            Base::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Array-to-pointer and function-to-pointer decay.
    pub fn decay(&self) -> TypeInfo {
        match &self.base {
            Base::Array(array) if !self.is_pointer() => {
                TypeInfo::pointer_to((*array.element).clone())
            }
            Base::Function(_) if !self.is_pointer() => TypeInfo::pointer_to(self.clone()),
            _ => self.clone(),
        }
    }

    /// Type reached by dereferencing, after decay.
    pub fn pointee(&self) -> Option<TypeInfo> {
        let decayed = self.decay();
        if decayed.is_pointer() {
            Some(TypeInfo {
                indirection: decayed.indirection - 1,
                ..decayed
            })
        } else {
            None
        }
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.base {
            Base::Int => write!(f, "int")?,
            Base::Double => write!(f, "double")?,
            Base::Char => write!(f, "char")?,
            Base::Bool => write!(f, "bool")?,
            Base::Void => write!(f, "void")?,
            Base::Unknown => write!(f, "<unknown>")?,
            Base::Array(array) => write!(f, "{}[{}]", array.element, array.size)?,
            Base::Class(class) => write!(f, "class {}", class.name)?,
            Base::Function(function) => {
                let parameters: Vec<String> = function
                    .parameters
                    .iter()
                    .map(|parameter| parameter.to_string())
                    .collect();
                write!(f, "{} ({})", function.return_type, parameters.join(", "))?
            }
        }

        if self.is_pointer() {
            write!(f, " {}", "*".repeat(self.indirection))?;
        }
        Ok(())
    }
}
