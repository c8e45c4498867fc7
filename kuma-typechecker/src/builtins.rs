//! Preloaded core types and built-in name tables
//!
//! The `Core` module is not loaded from source: its declarations are built once
//! and merged into every type registry.

use crate::error::ErrorPoint;
use crate::types::{
    Boxed, CaseInfo, CaseType, GenericType, Symbol, Type, TypeParam, TypeVal, Union, Variance,
};
use indexmap::IndexMap;
use lazy_static::lazy_static;

pub const CORE_MODULE: &str = "Core";
/// Discards a binding, or marks a type to be inferred
pub const IGNORE_MARK: &str = "_";
/// Type name alias for `Unit`
pub const UNIT_ALIAS: &str = "-";

pub const BOOL: &str = "Bool";
pub const BOOL_YES: &str = "Yes";
pub const BOOL_NO: &str = "No";
/// Case index of `Yes` within `Bool`
pub const BOOL_YES_INDEX: usize = 0;
pub const FLOAT: &str = "Float";
pub const STRING: &str = "String";
pub const ARRAY: &str = "Array";
pub const MAYBE: &str = "Maybe";

/// Kinds of integer types; every kind but `Int` has a fixed literal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    Int,
    Int64,
    Uint64,
    Int32,
    Uint32,
    Int16,
    Uint16,
    Int8,
    Uint8,
    Bit,
}

impl IntegerKind {
    /// Inclusive range of literal values; `Int` is unbounded
    pub fn range(self) -> Option<(i128, i128)> {
        Some(match self {
            IntegerKind::Int => return None,
            IntegerKind::Int64 => (i64::MIN as i128, i64::MAX as i128),
            IntegerKind::Uint64 => (0, u64::MAX as i128),
            IntegerKind::Int32 => (i32::MIN as i128, i32::MAX as i128),
            IntegerKind::Uint32 => (0, u32::MAX as i128),
            IntegerKind::Int16 => (i16::MIN as i128, i16::MAX as i128),
            IntegerKind::Uint16 => (0, u16::MAX as i128),
            IntegerKind::Int8 => (i8::MIN as i128, i8::MAX as i128),
            IntegerKind::Uint8 => (0, u8::MAX as i128),
            IntegerKind::Bit => (0, 1),
        })
    }
}

lazy_static! {
    /// Core type name -> integer kind, aliases included
    pub static ref INTEGER_KINDS: IndexMap<&'static str, IntegerKind> = {
        let mut kinds = IndexMap::new();
        kinds.insert("Int", IntegerKind::Int);
        kinds.insert("Int64", IntegerKind::Int64);
        kinds.insert("Uint64", IntegerKind::Uint64);
        kinds.insert("Qword", IntegerKind::Uint64);
        kinds.insert("Int32", IntegerKind::Int32);
        kinds.insert("Uint32", IntegerKind::Uint32);
        kinds.insert("Dword", IntegerKind::Uint32);
        kinds.insert("Char", IntegerKind::Uint32);
        kinds.insert("Int16", IntegerKind::Int16);
        kinds.insert("Uint16", IntegerKind::Uint16);
        kinds.insert("Word", IntegerKind::Uint16);
        kinds.insert("Int8", IntegerKind::Int8);
        kinds.insert("Uint8", IntegerKind::Uint8);
        kinds.insert("Byte", IntegerKind::Uint8);
        kinds.insert("Bit", IntegerKind::Bit);
        kinds
    };

    /// Every preloaded declaration of the `Core` module
    pub static ref CORE_TYPES: IndexMap<Symbol, GenericType> = build_core_types();
}

pub fn core_symbol(name: &str) -> Symbol {
    Symbol::new(CORE_MODULE, name)
}

pub fn is_core_name(name: &str) -> bool {
    CORE_TYPES.contains_key(&core_symbol(name))
}

/// Integer kind of a type, if it is one of the core integer types
pub fn integer_kind_of(t: &Type) -> Option<IntegerKind> {
    match t {
        Type::Named { name, args } if args.is_empty() && name.module == CORE_MODULE => {
            INTEGER_KINDS.get(name.name.as_str()).copied()
        }
        _ => None,
    }
}

pub fn bool_type() -> Type {
    Type::named(core_symbol(BOOL), Vec::new())
}

pub fn float_type() -> Type {
    Type::named(core_symbol(FLOAT), Vec::new())
}

pub fn string_type() -> Type {
    Type::named(core_symbol(STRING), Vec::new())
}

pub fn array_type(element: Type) -> Type {
    Type::named(core_symbol(ARRAY), vec![element])
}

/// Element type, if `t` is `Core::Array[T]`
pub fn array_element(t: &Type) -> Option<&Type> {
    match t {
        Type::Named { name, args } if *name == core_symbol(ARRAY) => args.first(),
        _ => None,
    }
}

fn core_point() -> ErrorPoint {
    ErrorPoint::new("<core>", Default::default())
}

fn native(params: Vec<TypeParam>) -> GenericType {
    GenericType {
        params,
        value: TypeVal::Native,
        point: core_point(),
        case_info: None,
    }
}

fn covariant(name: &str) -> TypeParam {
    TypeParam {
        name: name.to_string(),
        variance: Variance::Covariant,
    }
}

fn union_of(params: Vec<TypeParam>, cases: Vec<(&str, Vec<usize>)>) -> GenericType {
    let case_types = cases
        .into_iter()
        .map(|(name, params)| CaseType {
            name: core_symbol(name),
            params,
        })
        .collect();
    GenericType {
        params,
        value: TypeVal::Union(Union { case_types }),
        point: core_point(),
        case_info: None,
    }
}

fn boxed_case(
    union_name: &str,
    union_arity: usize,
    case_index: usize,
    params: Vec<TypeParam>,
    case_params: Vec<usize>,
    inner_type: Type,
) -> GenericType {
    GenericType {
        params,
        value: TypeVal::Boxed(Boxed {
            inner_type,
            protected: false,
            opaque: false,
            as_is: false,
        }),
        point: core_point(),
        case_info: Some(CaseInfo {
            union_name: core_symbol(union_name),
            union_arity,
            case_index,
            case_params,
        }),
    }
}

fn build_core_types() -> IndexMap<Symbol, GenericType> {
    let mut types = IndexMap::new();
    for name in INTEGER_KINDS.keys() {
        types.insert(core_symbol(name), native(Vec::new()));
    }
    types.insert(core_symbol(FLOAT), native(Vec::new()));
    types.insert(core_symbol(STRING), native(Vec::new()));
    types.insert(core_symbol(ARRAY), native(vec![covariant("T")]));

    types.insert(
        core_symbol(BOOL),
        union_of(
            Vec::new(),
            vec![(BOOL_YES, Vec::new()), (BOOL_NO, Vec::new())],
        ),
    );
    types.insert(
        core_symbol(BOOL_YES),
        boxed_case(BOOL, 0, BOOL_YES_INDEX, Vec::new(), Vec::new(), Type::unit()),
    );
    types.insert(
        core_symbol(BOOL_NO),
        boxed_case(BOOL, 0, 1, Vec::new(), Vec::new(), Type::unit()),
    );

    types.insert(
        core_symbol(MAYBE),
        union_of(
            vec![covariant("T")],
            vec![("Just", vec![0]), ("Nothing", Vec::new())],
        ),
    );
    types.insert(
        core_symbol("Just"),
        boxed_case(MAYBE, 1, 0, vec![covariant("T")], vec![0], Type::parameter(0)),
    );
    types.insert(
        core_symbol("Nothing"),
        boxed_case(MAYBE, 1, 1, Vec::new(), Vec::new(), Type::unit()),
    );
    types
}
