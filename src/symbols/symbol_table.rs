use std::{collections::HashMap, rc::Rc};

use log::{trace, warn};

use crate::{
    config::Config,
    errors::errors::ErrorImpl,
    types::types::{Access, ClassInfo, TypeInfo},
};

use super::builtins;

/// What opened a scope.
#[derive(Debug, Clone)]
pub enum ScopeKind {
    Global,
    Block,
    /// Parameters and the outermost block of a function body.
    Function,
    /// A class body, or the class context of an out-of-class method
    /// definition. Bindings go to the class's member tables.
    Class(Rc<ClassInfo>),
}

/// One frame of the symbol table.
#[derive(Debug)]
pub struct Scope {
    kind: ScopeKind,
    bindings: HashMap<String, Rc<TypeInfo>>,
    /// Classes declared in this frame.
    classes: Vec<Rc<ClassInfo>>,
    /// Active access region of a class frame.
    access: Access,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Scope {
            kind,
            bindings: HashMap::new(),
            classes: vec![],
            access: Access::Public,
        }
    }

    pub fn kind(&self) -> &ScopeKind {
        &self.kind
    }

    pub fn get(&self, name: &str) -> Option<&Rc<TypeInfo>> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Rc<TypeInfo>)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn class(&self) -> Option<&Rc<ClassInfo>> {
        match &self.kind {
            ScopeKind::Class(class) => Some(class),
            _ => None,
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        // Members may refer back to their class (`Node *next`); emptying the
        // tables here lets those descriptors go.
        for class in self.classes.drain(..) {
            class.clear();
        }
    }
}

/// The live stack of scopes. The global frame is always at the bottom.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// A table holding only an empty global scope.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::new(ScopeKind::Global)],
        }
    }

    /// A table whose global scope is seeded with the configured built-ins.
    pub fn populated(config: &Config) -> Self {
        let mut table = SymbolTable::new();
        builtins::populate(&mut table, config);
        table
    }

    pub fn push_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
        trace!("push scope, depth {}", self.scopes.len());
    }

    /// Pops the innermost scope and hands it back; dropping it releases
    /// the bindings only it owned. The global scope is never popped.
    pub fn pop_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() <= 1 {
            warn!("attempted to pop the global scope");
            return None;
        }
        let scope = self.scopes.pop();
        trace!("pop scope, depth {}", self.scopes.len());
        scope
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn global(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn current(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Binds `name` in the current frame. In a class frame the binding
    /// becomes a member in the active access region.
    pub fn insert(&mut self, name: &str, ty: Rc<TypeInfo>) -> Result<(), ErrorImpl> {
        let scope = self.current_mut();
        if let Some(class) = scope.class() {
            return class.add_member(name, ty, scope.access);
        }

        if scope.bindings.contains_key(name) {
            return Err(ErrorImpl::Redeclaration {
                name: name.to_string(),
            });
        }
        scope.bindings.insert(name.to_string(), ty);
        Ok(())
    }

    /// Resolves `name` from the innermost frame outwards. Class frames
    /// expose all of their members since the lookup happens inside the
    /// class.
    pub fn lookup(&self, name: &str) -> Result<Rc<TypeInfo>, ErrorImpl> {
        for scope in self.scopes.iter().rev() {
            let found = match scope.class() {
                Some(class) => class.member(name).map(|(_, ty)| ty),
                None => scope.get(name).cloned(),
            };
            if let Some(ty) = found {
                return Ok(ty);
            }
        }
        Err(ErrorImpl::NotFound {
            name: name.to_string(),
        })
    }

    /// Resolves `name` in the current frame only.
    pub fn lookup_local(&self, name: &str) -> Option<Rc<TypeInfo>> {
        let scope = self.current();
        match scope.class() {
            Some(class) => class.member(name).map(|(_, ty)| ty),
            None => scope.get(name).cloned(),
        }
    }

    /// Resolves a member of `class`. Private members are only visible
    /// `from_inside_class`.
    pub fn member_lookup(
        &self,
        class: &ClassInfo,
        name: &str,
        from_inside_class: bool,
    ) -> Result<Rc<TypeInfo>, ErrorImpl> {
        match class.member(name) {
            Some((Access::Public, ty)) => Ok(ty),
            Some((Access::Private, ty)) if from_inside_class => Ok(ty),
            Some((Access::Private, _)) => Err(ErrorImpl::Access {
                class: class.name.clone(),
                member: name.to_string(),
            }),
            None => Err(ErrorImpl::NotFound {
                name: format!("{}::{}", class.name, name),
            }),
        }
    }

    /// Whether a frame of `class` is on the stack, i.e. the code being
    /// checked belongs to that class.
    pub fn inside_class(&self, class: &ClassInfo) -> bool {
        self.scopes.iter().filter_map(Scope::class).any(|open| {
            std::ptr::eq(Rc::as_ptr(open), class as *const ClassInfo)
        })
    }

    /// Innermost class frame.
    pub fn current_class(&self) -> Option<&Rc<ClassInfo>> {
        self.scopes.iter().rev().find_map(Scope::class)
    }

    /// An enclosing class frame named `name`. Inside a class body the class
    /// name may be shadowed by its own constructor member.
    pub fn open_class(&self, name: &str) -> Option<&Rc<ClassInfo>> {
        self.scopes
            .iter()
            .rev()
            .filter_map(Scope::class)
            .find(|class| class.name == name)
    }

    /// Switches the access region of the current class frame.
    pub fn set_access(&mut self, access: Access) {
        self.current_mut().access = access;
    }

    pub fn access(&self) -> Access {
        self.current().access
    }

    /// Records `class` as declared here, so its member tables are torn
    /// down with the innermost frame that is not a class body.
    pub fn declare_class(&mut self, class: &Rc<ClassInfo>) {
        if let Some(scope) = self
            .scopes
            .iter_mut()
            .rev()
            .find(|scope| scope.class().is_none())
        {
            if !scope.classes.iter().any(|known| Rc::ptr_eq(known, class)) {
                scope.classes.push(Rc::clone(class));
            }
        }
    }

    /// Tears the whole table down, innermost frame first.
    pub fn release(mut self) {
        while let Some(scope) = self.scopes.pop() {
            trace!("release scope with {} bindings", scope.len());
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
