//! Decoding of the section bodies Kiln needs to reason about a module's
//! interface: types, imports, function declarations, and exports.
//!
//! Function bodies, globals' initializers, element and data segments are left
//! to the engine.

use crate::binary::leb128::{self, Cursor};
use crate::binary::section::RawSection;
use crate::error::{DecodeContext, DecodeError, DecodeErrorKind};
use crate::types::{
    FuncIdx, FuncType, GlobalIdx, GlobalType, Limits, MemIdx, MemType, Mutability, RefType,
    TableIdx, TableType, TypeIdx, ValType,
};

/// Leading byte of every function type in the type section.
const FUNC_TYPE_TAG: u8 = 0x60;

/// What an import brings into the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDesc {
    Func(TypeIdx),
    Table(TableType),
    Memory(MemType),
    Global(GlobalType),
}

/// One entry of the import section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import<'a> {
    pub module: &'a str,
    pub name: &'a str,
    pub desc: ImportDesc,
}

/// What an export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportDesc {
    Func(FuncIdx),
    Table(TableIdx),
    Memory(MemIdx),
    Global(GlobalIdx),
}

impl ExportDesc {
    /// Short kind keyword (`func`, `table`, `memory`, `global`).
    pub fn kind(self) -> &'static str {
        match self {
            ExportDesc::Func(_) => "func",
            ExportDesc::Table(_) => "table",
            ExportDesc::Memory(_) => "memory",
            ExportDesc::Global(_) => "global",
        }
    }
}

/// One entry of the export section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Export<'a> {
    pub name: &'a str,
    pub desc: ExportDesc,
}

/// Runs `entry` once per element of a vector-encoded section and checks the
/// body is consumed exactly.
fn parse_vec<'a, T>(
    section: &RawSection<'a>,
    context: DecodeContext,
    mut entry: impl FnMut(&mut Cursor<'a>) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let mut cursor = Cursor::new(section.data);
    let rebase = |e: DecodeError| e.rebase(section.offset, context);

    let count = leb128::decode_u32(&mut cursor).map_err(rebase)?;
    // Every entry takes at least one byte; don't trust `count` for capacity.
    let mut entries = Vec::with_capacity((count as usize).min(section.data.len()));
    for _ in 0..count {
        entries.push(entry(&mut cursor).map_err(rebase)?);
    }

    if !cursor.is_empty() {
        return Err(DecodeError::new(
            section.offset + cursor.position(),
            context,
            DecodeErrorKind::SectionSizeMismatch {
                expected: section.data.len() as u32,
                consumed: cursor.position() as u32,
            },
        ));
    }

    Ok(entries)
}

fn read_val_type(cursor: &mut Cursor<'_>) -> Result<ValType, DecodeError> {
    let offset = cursor.position();
    let byte = cursor.read_byte()?;
    ValType::from_encoding(byte).ok_or(DecodeError::new(
        offset,
        DecodeContext::TypeSection,
        DecodeErrorKind::UnknownValType { byte },
    ))
}

fn read_ref_type(cursor: &mut Cursor<'_>) -> Result<RefType, DecodeError> {
    let offset = cursor.position();
    match read_val_type(cursor)? {
        ValType::Ref(ty) => Ok(ty),
        other => Err(DecodeError::new(
            offset,
            DecodeContext::ImportSection,
            DecodeErrorKind::UnknownValType {
                byte: other.encoding(),
            },
        )),
    }
}

fn read_limits(cursor: &mut Cursor<'_>) -> Result<Limits, DecodeError> {
    let offset = cursor.position();
    match cursor.read_byte()? {
        0x00 => Ok(Limits {
            min: leb128::decode_u32(cursor)?,
            max: None,
        }),
        0x01 => Ok(Limits {
            min: leb128::decode_u32(cursor)?,
            max: Some(leb128::decode_u32(cursor)?),
        }),
        byte => Err(DecodeError::new(
            offset,
            DecodeContext::ImportSection,
            DecodeErrorKind::InvalidLimits { byte },
        )),
    }
}

fn read_func_type(cursor: &mut Cursor<'_>) -> Result<FuncType, DecodeError> {
    let offset = cursor.position();
    let tag = cursor.read_byte()?;
    if tag != FUNC_TYPE_TAG {
        return Err(DecodeError::new(
            offset,
            DecodeContext::TypeSection,
            DecodeErrorKind::UnexpectedByte {
                expected: FUNC_TYPE_TAG,
                found: tag,
            },
        ));
    }

    let params = read_val_types(cursor)?;
    let results = read_val_types(cursor)?;
    Ok(FuncType { params, results })
}

fn read_val_types(cursor: &mut Cursor<'_>) -> Result<Vec<ValType>, DecodeError> {
    let len = leb128::decode_u32(cursor)?;
    (0..len).map(|_| read_val_type(cursor)).collect()
}

/// Decode the type section into its function types.
/// See [Wasm core §5.5.4](https://webassembly.github.io/spec/core/binary/modules.html#type-section).
pub fn parse_type_section(section: &RawSection<'_>) -> Result<Vec<FuncType>, DecodeError> {
    parse_vec(section, DecodeContext::TypeSection, read_func_type)
}

/// Decode the import section.
/// See [Wasm core §5.5.5](https://webassembly.github.io/spec/core/binary/modules.html#import-section).
pub fn parse_import_section<'a>(section: &RawSection<'a>) -> Result<Vec<Import<'a>>, DecodeError> {
    parse_vec(section, DecodeContext::ImportSection, |cursor| {
        let module = cursor.read_name()?;
        let name = cursor.read_name()?;
        let kind_offset = cursor.position();
        let desc = match cursor.read_byte()? {
            0x00 => ImportDesc::Func(TypeIdx(leb128::decode_u32(cursor)?)),
            0x01 => ImportDesc::Table(TableType {
                elem: read_ref_type(cursor)?,
                limits: read_limits(cursor)?,
            }),
            0x02 => ImportDesc::Memory(MemType {
                limits: read_limits(cursor)?,
            }),
            0x03 => {
                let val_type = read_val_type(cursor)?;
                let mut_offset = cursor.position();
                let mutability = match cursor.read_byte()? {
                    0x00 => Mutability::Const,
                    0x01 => Mutability::Var,
                    byte => {
                        return Err(DecodeError::new(
                            mut_offset,
                            DecodeContext::ImportSection,
                            DecodeErrorKind::InvalidMutability { byte },
                        ));
                    }
                };
                ImportDesc::Global(GlobalType {
                    val_type,
                    mutability,
                })
            }
            byte => {
                return Err(DecodeError::new(
                    kind_offset,
                    DecodeContext::ImportSection,
                    DecodeErrorKind::UnknownExternalKind { byte },
                ));
            }
        };
        Ok(Import { module, name, desc })
    })
}

/// Decode the function section: the type index of each defined function.
/// See [Wasm core §5.5.6](https://webassembly.github.io/spec/core/binary/modules.html#function-section).
pub fn parse_function_section(section: &RawSection<'_>) -> Result<Vec<TypeIdx>, DecodeError> {
    parse_vec(section, DecodeContext::FunctionSection, |cursor| {
        Ok(TypeIdx(leb128::decode_u32(cursor)?))
    })
}

/// Decode the export section.
/// See [Wasm core §5.5.10](https://webassembly.github.io/spec/core/binary/modules.html#export-section).
pub fn parse_export_section<'a>(section: &RawSection<'a>) -> Result<Vec<Export<'a>>, DecodeError> {
    parse_vec(section, DecodeContext::ExportSection, |cursor| {
        let name = cursor.read_name()?;
        let kind_offset = cursor.position();
        let kind = cursor.read_byte()?;
        let index = leb128::decode_u32(cursor)?;
        let desc = match kind {
            0x00 => ExportDesc::Func(FuncIdx(index)),
            0x01 => ExportDesc::Table(TableIdx(index)),
            0x02 => ExportDesc::Memory(MemIdx(index)),
            0x03 => ExportDesc::Global(GlobalIdx(index)),
            byte => {
                return Err(DecodeError::new(
                    kind_offset,
                    DecodeContext::ExportSection,
                    DecodeErrorKind::UnknownExternalKind { byte },
                ));
            }
        };
        Ok(Export { name, desc })
    })
}

/// Number of function bodies declared by the code section (its vector length).
pub fn code_section_count(section: &RawSection<'_>) -> Result<u32, DecodeError> {
    let mut cursor = Cursor::new(section.data);
    leb128::decode_u32(&mut cursor).map_err(|e| e.rebase(section.offset, DecodeContext::Leb128))
}
