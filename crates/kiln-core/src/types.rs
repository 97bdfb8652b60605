//! Core WebAssembly type definitions.
//!
//! These mirror the abstract syntax for types, restricted to what Kiln needs
//! to describe imports and export signatures.
//! See [Wasm core §2.3](https://webassembly.github.io/spec/core/syntax/types.html).

use std::fmt;

/// Number types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumType {
    I32,
    I64,
    F32,
    F64,
}

/// Vector types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VecType {
    V128,
}

/// Reference types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefType {
    FuncRef,
    ExternRef,
}

/// Value types: the union of number, vector, and reference types.
/// See [Wasm core §2.3.4](https://webassembly.github.io/spec/core/syntax/types.html#value-types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValType {
    Num(NumType),
    Vec(VecType),
    Ref(RefType),
}

impl ValType {
    pub const I32: ValType = ValType::Num(NumType::I32);
    pub const I64: ValType = ValType::Num(NumType::I64);
    pub const F32: ValType = ValType::Num(NumType::F32);
    pub const F64: ValType = ValType::Num(NumType::F64);

    /// Binary encoding byte for this value type.
    /// See [Wasm core §5.3.1](https://webassembly.github.io/spec/core/binary/types.html#value-types).
    pub fn encoding(self) -> u8 {
        match self {
            ValType::Num(NumType::I32) => 0x7F,
            ValType::Num(NumType::I64) => 0x7E,
            ValType::Num(NumType::F32) => 0x7D,
            ValType::Num(NumType::F64) => 0x7C,
            ValType::Vec(VecType::V128) => 0x7B,
            ValType::Ref(RefType::FuncRef) => 0x70,
            ValType::Ref(RefType::ExternRef) => 0x6F,
        }
    }

    /// Decode a value type from its binary encoding byte.
    pub fn from_encoding(byte: u8) -> Option<Self> {
        match byte {
            0x7F => Some(ValType::Num(NumType::I32)),
            0x7E => Some(ValType::Num(NumType::I64)),
            0x7D => Some(ValType::Num(NumType::F32)),
            0x7C => Some(ValType::Num(NumType::F64)),
            0x7B => Some(ValType::Vec(VecType::V128)),
            0x70 => Some(ValType::Ref(RefType::FuncRef)),
            0x6F => Some(ValType::Ref(RefType::ExternRef)),
            _ => None,
        }
    }

    /// Text-format keyword (`i32`, `funcref`, ...).
    pub fn name(self) -> &'static str {
        match self {
            ValType::Num(NumType::I32) => "i32",
            ValType::Num(NumType::I64) => "i64",
            ValType::Num(NumType::F32) => "f32",
            ValType::Num(NumType::F64) => "f64",
            ValType::Vec(VecType::V128) => "v128",
            ValType::Ref(RefType::FuncRef) => "funcref",
            ValType::Ref(RefType::ExternRef) => "externref",
        }
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function types: parameter and result type vectors.
/// See [Wasm core §2.3.5](https://webassembly.github.io/spec/core/syntax/types.html#function-types).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<ValType>,
    pub results: Vec<ValType>,
}

impl FuncType {
    pub fn new(params: impl Into<Vec<ValType>>, results: impl Into<Vec<ValType>>) -> Self {
        Self {
            params: params.into(),
            results: results.into(),
        }
    }
}

/// Renders as `(i32, i32) -> (i32)`.
impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, types: &[ValType]) -> fmt::Result {
            f.write_str("(")?;
            for (i, ty) in types.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{ty}")?;
            }
            f.write_str(")")
        }

        list(f, &self.params)?;
        f.write_str(" -> ")?;
        list(f, &self.results)
    }
}

/// Limits, used by memories and tables to specify size constraints.
/// See [Wasm core §2.3.7](https://webassembly.github.io/spec/core/syntax/types.html#limits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min: u32,
    pub max: Option<u32>,
}

/// Memory types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemType {
    pub limits: Limits,
}

/// Table types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableType {
    pub elem: RefType,
    pub limits: Limits,
}

/// Mutability of a global variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Const,
    Var,
}

/// Global types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalType {
    pub val_type: ValType,
    pub mutability: Mutability,
}

/// Newtype index wrappers to prevent mixing up different index spaces.
macro_rules! define_idx {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);
    };
}

define_idx!(TypeIdx);
define_idx!(FuncIdx);
define_idx!(TableIdx);
define_idx!(MemIdx);
define_idx!(GlobalIdx);
