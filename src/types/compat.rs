//! Type equality, compatibility and arithmetic promotion.

use std::rc::Rc;

use super::types::{Base, FunctionInfo, TypeInfo};

/// Structural identity of two types.
pub fn same_type(a: &TypeInfo, b: &TypeInfo) -> bool {
    if a.indirection != b.indirection {
        return false;
    }

    match (&a.base, &b.base) {
        (Base::Int, Base::Int)
        | (Base::Double, Base::Double)
        | (Base::Char, Base::Char)
        | (Base::Bool, Base::Bool)
        | (Base::Void, Base::Void)
        | (Base::Unknown, Base::Unknown) => true,
        (Base::Array(x), Base::Array(y)) => {
            x.size == y.size && same_type(&x.element, &y.element)
        }
        (Base::Function(f), Base::Function(g)) => {
            Rc::ptr_eq(f, g)
                || (f.parameters.len() == g.parameters.len()
                    && same_type(&f.return_type, &g.return_type)
                    && f
                        .parameters
                        .iter()
                        .zip(g.parameters.iter())
                        .all(|(p, q)| same_type(p, q)))
        }
        (Base::Class(x), Base::Class(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Whether a value of type `actual` may be used where `expected` is
/// required.
///
/// Accepted: exact matches, arithmetic widening (a wider type accepts a
/// narrower one), pointers to the same type or to/from `void *`, arrays
/// and functions decaying to a matching pointer, and structurally
/// compatible function types. Unknown on either side is always accepted so
/// that one error does not cascade.
pub fn compatible(expected: &TypeInfo, actual: &TypeInfo) -> bool {
    if expected.is_unknown() || actual.is_unknown() || same_type(expected, actual) {
        return true;
    }

    if let (Some(wide), Some(narrow)) = (expected.rank(), actual.rank()) {
        return wide >= narrow;
    }

    if expected.is_pointer() {
        let actual = actual.decay();
        if !actual.is_pointer() {
            return false;
        }
        if expected.is_void_pointer() || actual.is_void_pointer() {
            return true;
        }
        return match (&expected.base, &actual.base) {
            (Base::Function(f), Base::Function(g)) => {
                expected.indirection == actual.indirection && functions_compatible(f, g)
            }
            _ => same_type(expected, &actual),
        };
    }

    if actual.is_pointer() {
        return false;
    }

    match (&expected.base, &actual.base) {
        (Base::Function(f), Base::Function(g)) => functions_compatible(f, g),
        (Base::Array(x), Base::Array(y)) => {
            (x.size == y.size || x.size == 0 || y.size == 0) && same_type(&x.element, &y.element)
        }
        _ => false,
    }
}

/// Same parameter count, pairwise compatible parameters, compatible return.
pub fn functions_compatible(expected: &FunctionInfo, actual: &FunctionInfo) -> bool {
    expected.parameters.len() == actual.parameters.len()
        && compatible(&expected.return_type, &actual.return_type)
        && expected
            .parameters
            .iter()
            .zip(actual.parameters.iter())
            .all(|(e, a)| compatible(e, a))
}

/// The wider of two arithmetic types, `None` unless both are arithmetic.
/// Unknown operands yield Unknown.
pub fn common_arithmetic(a: &TypeInfo, b: &TypeInfo) -> Option<TypeInfo> {
    if a.is_unknown() || b.is_unknown() {
        return Some(TypeInfo::unknown());
    }
    let (x, y) = (a.rank()?, b.rank()?);
    Some(if x >= y { a.clone() } else { b.clone() })
}

/// Result type of `cond ? a : b`: the wider arithmetic type, or whichever
/// branch accepts the other.
pub fn common_type(a: &TypeInfo, b: &TypeInfo) -> Option<TypeInfo> {
    if let Some(common) = common_arithmetic(a, b) {
        return Some(common);
    }
    if compatible(a, b) {
        Some(a.decay())
    } else if compatible(b, a) {
        Some(b.decay())
    } else {
        None
    }
}
