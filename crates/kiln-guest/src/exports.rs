use std::fmt;

use kiln_core::types::{FuncType, ValType};
use thiserror::Error;

use crate::sequence;

/// A WebAssembly value crossing the export boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Value {
    pub fn ty(&self) -> ValType {
        match self {
            Value::I32(_) => ValType::I32,
            Value::I64(_) => ValType::I64,
            Value::F32(_) => ValType::F32,
            Value::F64(_) => ValType::F64,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuestError {
    #[error("no export named `{name}`")]
    UnknownExport { name: String },

    #[error("`{name}` expects {expected}, called with ({found})")]
    SignatureMismatch {
        name: &'static str,
        expected: FuncType,
        found: String,
    },

    #[error("`{name}` trapped: {reason}")]
    Trap {
        name: &'static str,
        reason: &'static str,
    },
}

type Entry = fn(&[Value]) -> Result<Vec<Value>, &'static str>;

/// One named function in the table.
pub struct Export {
    pub name: &'static str,
    pub params: &'static [ValType],
    pub results: &'static [ValType],
    func: Entry,
}

impl Export {
    pub fn func_type(&self) -> FuncType {
        FuncType::new(self.params, self.results)
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Export")
            .field("name", &self.name)
            .field("type", &self.func_type().to_string())
            .finish()
    }
}

/// The functions this guest makes callable by its host.
#[derive(Debug)]
pub struct ExportTable {
    entries: &'static [Export],
}

impl ExportTable {
    pub fn get(&self, name: &str) -> Option<&Export> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    /// Invoke the export `name`, checking `args` against its signature first.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Vec<Value>, GuestError> {
        let export = self.get(name).ok_or_else(|| GuestError::UnknownExport {
            name: name.to_string(),
        })?;

        let arity_ok = args.len() == export.params.len();
        if !arity_ok || args.iter().zip(export.params).any(|(a, p)| a.ty() != *p) {
            let found = args
                .iter()
                .map(|a| a.ty().name())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(GuestError::SignatureMismatch {
                name: export.name,
                expected: export.func_type(),
                found,
            });
        }

        (export.func)(args).map_err(|reason| GuestError::Trap {
            name: export.name,
            reason,
        })
    }
}

static EXPORTS: ExportTable = ExportTable {
    entries: &[Export {
        name: "fibArray",
        params: &[ValType::I32],
        results: &[ValType::I32],
        func: fib_array_export,
    }],
};

/// The guest's export table.
pub fn exports() -> &'static ExportTable {
    &EXPORTS
}

fn fib_array_export(args: &[Value]) -> Result<Vec<Value>, &'static str> {
    let [Value::I32(n)] = args else {
        return Err("bad arguments");
    };
    sequence::fib_array(*n)
        .map(|term| vec![Value::I32(term)])
        .map_err(|e| e.reason())
}
