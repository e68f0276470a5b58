//! Built-in declarations seeded into the global scope.

use std::rc::Rc;

use log::{trace, warn};

use crate::{
    config::{Config, Header},
    types::types::TypeInfo,
};

use super::symbol_table::SymbolTable;

fn char_ptr() -> TypeInfo {
    TypeInfo::pointer_to(TypeInfo::char())
}

fn declare(table: &mut SymbolTable, name: &str, ty: TypeInfo) {
    match table.insert(name, Rc::new(ty)) {
        Ok(()) => trace!("built-in {}", name),
        Err(error) => warn!("built-in {} not seeded: {}", name, error),
    }
}

/// Declares a complete, memberless class and returns its type.
fn declare_class(table: &mut SymbolTable, name: &str) -> TypeInfo {
    let ty = TypeInfo::class(name);
    if let Some(class) = ty.as_class() {
        class.mark_complete();
        table.declare_class(class);
    }
    declare(table, name, ty.clone());
    ty
}

/// Seeds the global scope of `table` with the language built-ins and the
/// declarations of every header enabled in `config`.
pub fn populate(table: &mut SymbolTable, config: &Config) {
    declare(table, "NULL", TypeInfo::pointer_to(TypeInfo::void()));

    if config.includes(Header::Iostream) {
        let ostream = declare_class(table, "ostream");
        let istream = declare_class(table, "istream");
        declare(table, "cout", ostream.clone());
        declare(table, "cerr", ostream);
        declare(table, "cin", istream);
        declare(table, "endl", char_ptr());
    }

    if config.includes(Header::Cstdlib) {
        declare(table, "rand", TypeInfo::function(TypeInfo::int(), vec![]));
        declare(table, "srand", TypeInfo::function(TypeInfo::void(), vec![TypeInfo::int()]));
        declare(table, "abs", TypeInfo::function(TypeInfo::int(), vec![TypeInfo::int()]));
        declare(table, "exit", TypeInfo::function(TypeInfo::void(), vec![TypeInfo::int()]));
        declare(table, "atoi", TypeInfo::function(TypeInfo::int(), vec![char_ptr()]));
    }

    if config.includes(Header::Cstring) {
        declare(table, "strlen", TypeInfo::function(TypeInfo::int(), vec![char_ptr()]));
        declare(
            table,
            "strcmp",
            TypeInfo::function(TypeInfo::int(), vec![char_ptr(), char_ptr()]),
        );
        declare(
            table,
            "strcpy",
            TypeInfo::function(char_ptr(), vec![char_ptr(), char_ptr()]),
        );
    }

    if config.includes(Header::Cmath) {
        declare(table, "sqrt", TypeInfo::function(TypeInfo::double(), vec![TypeInfo::double()]));
        declare(
            table,
            "pow",
            TypeInfo::function(TypeInfo::double(), vec![TypeInfo::double(), TypeInfo::double()]),
        );
        declare(table, "fabs", TypeInfo::function(TypeInfo::double(), vec![TypeInfo::double()]));
    }
}
