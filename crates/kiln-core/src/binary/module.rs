//! Top-level WASM module decoding.
//!
//! Produces a `Module`: the section layout of a WASM binary, with on-demand
//! decoding of the sections that describe its interface (types, imports,
//! exports). Function bodies are never decoded here.
//!
//! See [Wasm core §5.5.1](https://webassembly.github.io/spec/core/binary/modules.html).

use crate::binary::entries::{self, Export, ExportDesc, Import, ImportDesc};
use crate::binary::leb128::Cursor;
use crate::binary::section::{self, CustomSection, RawSection, SectionId};
use crate::error::{DecodeContext, DecodeError, DecodeErrorKind};
use crate::types::{FuncType, TypeIdx};

/// A decoded WASM module layout.
#[derive(Debug)]
pub struct Module<'a> {
    /// All sections in the order they appeared, as raw byte spans.
    pub sections: Vec<RawSection<'a>>,
}

impl<'a> Module<'a> {
    /// Decode a WASM binary into a `Module`.
    ///
    /// This validates the preamble (magic + version), parses section boundaries,
    /// and checks section ordering. Section contents are decoded lazily by the
    /// accessors below.
    pub fn decode(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(bytes);

        section::parse_preamble(&mut cursor)?;
        let sections = section::parse_sections(&mut cursor)?;

        Ok(Module { sections })
    }

    /// Get the first section with the given ID, if present.
    pub fn section(&self, id: SectionId) -> Option<&RawSection<'a>> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Iterate over all custom sections, decoding their names.
    pub fn custom_sections(
        &self,
    ) -> impl Iterator<Item = Result<CustomSection<'a>, DecodeError>> + '_ {
        self.sections.iter().filter_map(|s| s.custom().transpose())
    }

    /// The first custom section called `name`, if present.
    pub fn custom_section(&self, name: &str) -> Result<Option<CustomSection<'a>>, DecodeError> {
        for custom in self.custom_sections() {
            let custom = custom?;
            if custom.name == name {
                return Ok(Some(custom));
            }
        }
        Ok(None)
    }

    /// Summary of the module's section layout for display.
    pub fn section_summary(&self) -> Vec<(SectionId, usize, usize)> {
        self.sections
            .iter()
            .map(|s| (s.id, s.offset, s.data.len()))
            .collect()
    }

    /// Function types declared in the type section.
    pub fn func_types(&self) -> Result<Vec<FuncType>, DecodeError> {
        match self.section(SectionId::Type) {
            Some(s) => entries::parse_type_section(s),
            None => Ok(Vec::new()),
        }
    }

    /// Entries of the import section.
    pub fn imports(&self) -> Result<Vec<Import<'a>>, DecodeError> {
        match self.section(SectionId::Import) {
            Some(s) => entries::parse_import_section(s),
            None => Ok(Vec::new()),
        }
    }

    /// Entries of the export section.
    pub fn exports(&self) -> Result<Vec<Export<'a>>, DecodeError> {
        match self.section(SectionId::Export) {
            Some(s) => entries::parse_export_section(s),
            None => Ok(Vec::new()),
        }
    }

    /// Type indices of the whole function index space: imported functions
    /// first, then those declared by the function section.
    ///
    /// Fails if the function and code sections disagree on the number of
    /// defined functions.
    pub fn function_space(&self) -> Result<Vec<TypeIdx>, DecodeError> {
        let mut space: Vec<TypeIdx> = self
            .imports()?
            .into_iter()
            .filter_map(|import| match import.desc {
                ImportDesc::Func(ty) => Some(ty),
                _ => None,
            })
            .collect();

        let declared = match self.section(SectionId::Function) {
            Some(s) => entries::parse_function_section(s)?,
            None => Vec::new(),
        };
        let bodies = match self.section(SectionId::Code) {
            Some(s) => entries::code_section_count(s)?,
            None => 0,
        };
        if declared.len() as u32 != bodies {
            let offset = self
                .section(SectionId::Code)
                .or(self.section(SectionId::Function))
                .map_or(0, |s| s.offset);
            return Err(DecodeError::new(
                offset,
                DecodeContext::SectionHeader,
                DecodeErrorKind::FunctionCountMismatch {
                    functions: declared.len() as u32,
                    bodies,
                },
            ));
        }

        space.extend(declared);
        Ok(space)
    }

    /// Resolve the signature of the function exported as `name`.
    ///
    /// Returns `Ok(None)` when there is no such export, when it is not a
    /// function, or when its indices point outside the module.
    pub fn export_signature(&self, name: &str) -> Result<Option<FuncType>, DecodeError> {
        let Some(export) = self.exports()?.into_iter().find(|e| e.name == name) else {
            return Ok(None);
        };
        let ExportDesc::Func(func) = export.desc else {
            return Ok(None);
        };

        let space = self.function_space()?;
        let Some(ty) = space.get(func.0 as usize) else {
            return Ok(None);
        };
        Ok(self.func_types()?.get(ty.0 as usize).cloned())
    }
}
