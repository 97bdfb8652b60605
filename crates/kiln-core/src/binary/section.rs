//! WASM section parsing.
//!
//! Sections are the top-level organizational unit of a WASM binary.
//! See [Wasm core §5.5](https://webassembly.github.io/spec/core/binary/modules.html#sections).

use crate::binary::leb128::{self, Cursor};
use crate::error::{DecodeContext, DecodeError, DecodeErrorKind};

/// WASM section identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SectionId {
    Custom = 0,
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
    DataCount = 12,
}

impl SectionId {
    /// Try to construct a `SectionId` from a raw byte value.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(SectionId::Custom),
            1 => Some(SectionId::Type),
            2 => Some(SectionId::Import),
            3 => Some(SectionId::Function),
            4 => Some(SectionId::Table),
            5 => Some(SectionId::Memory),
            6 => Some(SectionId::Global),
            7 => Some(SectionId::Export),
            8 => Some(SectionId::Start),
            9 => Some(SectionId::Element),
            10 => Some(SectionId::Code),
            11 => Some(SectionId::Data),
            12 => Some(SectionId::DataCount),
            _ => None,
        }
    }

    /// Position in the mandatory section order. `DataCount` sits between
    /// `Element` and `Code` despite its higher id. Custom sections are
    /// unordered and rank 0.
    pub fn rank(self) -> u8 {
        match self {
            SectionId::Custom => 0,
            SectionId::DataCount => 10,
            SectionId::Code => 11,
            SectionId::Data => 12,
            other => other as u8,
        }
    }

    /// Human-readable name for this section.
    pub fn name(self) -> &'static str {
        match self {
            SectionId::Custom => "custom",
            SectionId::Type => "type",
            SectionId::Import => "import",
            SectionId::Function => "function",
            SectionId::Table => "table",
            SectionId::Memory => "memory",
            SectionId::Global => "global",
            SectionId::Export => "export",
            SectionId::Start => "start",
            SectionId::Element => "element",
            SectionId::Code => "code",
            SectionId::Data => "data",
            SectionId::DataCount => "datacount",
        }
    }
}

/// A parsed but not yet interpreted section: just the labeled byte span.
#[derive(Debug, Clone)]
pub struct RawSection<'a> {
    /// The section ID.
    pub id: SectionId,
    /// Byte offset of the section contents within the original binary.
    pub offset: usize,
    /// The raw section contents (after the section header).
    pub data: &'a [u8],
}

impl<'a> RawSection<'a> {
    /// Split a custom section into its name and payload.
    ///
    /// Returns `Ok(None)` for non-custom sections.
    pub fn custom(&self) -> Result<Option<CustomSection<'a>>, DecodeError> {
        if self.id != SectionId::Custom {
            return Ok(None);
        }

        let mut cursor = Cursor::new(self.data);
        let name = cursor
            .read_name()
            .map_err(|e| e.rebase(self.offset, DecodeContext::CustomSection))?;

        Ok(Some(CustomSection {
            name,
            payload: cursor.remaining(),
        }))
    }
}

/// A custom section's contents.
/// See [Wasm core §5.5.3](https://webassembly.github.io/spec/core/binary/modules.html#custom-section).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomSection<'a> {
    pub name: &'a str,
    pub payload: &'a [u8],
}

/// The WASM binary magic number: `\0asm`.
pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];

/// The WASM binary version we support: 1.
pub const WASM_VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Validate the WASM preamble (magic number + version), returning the cursor
/// positioned after the 8-byte header.
pub fn parse_preamble(cursor: &mut Cursor<'_>) -> Result<(), DecodeError> {
    let magic = cursor.read_bytes(4).map_err(|_| {
        DecodeError::new(0, DecodeContext::Magic, DecodeErrorKind::UnexpectedEof)
    })?;

    if magic != WASM_MAGIC {
        return Err(DecodeError::new(
            0,
            DecodeContext::Magic,
            DecodeErrorKind::InvalidMagic,
        ));
    }

    let version = cursor.read_bytes(4).map_err(|_| {
        DecodeError::new(4, DecodeContext::Version, DecodeErrorKind::UnexpectedEof)
    })?;

    if version != WASM_VERSION {
        let found = u32::from_le_bytes([version[0], version[1], version[2], version[3]]);
        return Err(DecodeError::new(
            4,
            DecodeContext::Version,
            DecodeErrorKind::UnsupportedVersion { found },
        ));
    }

    Ok(())
}

/// Parse all sections from a cursor positioned after the preamble.
///
/// Returns the sections as raw byte spans. Non-custom sections must appear
/// in order of their section IDs (custom sections may appear anywhere).
pub fn parse_sections<'a>(cursor: &mut Cursor<'a>) -> Result<Vec<RawSection<'a>>, DecodeError> {
    let mut sections = Vec::new();
    let mut last_non_custom: Option<SectionId> = None;

    while !cursor.is_empty() {
        let id_offset = cursor.position();
        let id_byte = cursor.read_byte().map_err(|_| {
            DecodeError::new(
                id_offset,
                DecodeContext::SectionHeader,
                DecodeErrorKind::UnexpectedEof,
            )
        })?;

        let id = SectionId::from_byte(id_byte).ok_or(DecodeError::new(
            id_offset,
            DecodeContext::SectionHeader,
            DecodeErrorKind::UnknownSectionId { id: id_byte },
        ))?;

        let size = leb128::decode_u32(cursor).map_err(|mut e| {
            e.context = DecodeContext::SectionHeader;
            e
        })?;

        let content_offset = cursor.position();

        if size as usize > cursor.remaining().len() {
            return Err(DecodeError::new(
                id_offset,
                DecodeContext::SectionHeader,
                DecodeErrorKind::SectionOverflow,
            ));
        }

        if id != SectionId::Custom {
            if let Some(prev) = last_non_custom
                && id.rank() <= prev.rank()
            {
                let kind = if id == prev {
                    DecodeErrorKind::DuplicateSection { id: id_byte }
                } else {
                    DecodeErrorKind::SectionOutOfOrder {
                        prev: prev as u8,
                        current: id_byte,
                    }
                };
                return Err(DecodeError::new(
                    id_offset,
                    DecodeContext::SectionHeader,
                    kind,
                ));
            }
            last_non_custom = Some(id);
        }

        let data = cursor.read_bytes(size as usize).map_err(|_| {
            DecodeError::new(
                content_offset,
                DecodeContext::SectionBody { id: id_byte },
                DecodeErrorKind::SectionOverflow,
            )
        })?;

        sections.push(RawSection {
            id,
            offset: content_offset,
            data,
        });
    }

    Ok(sections)
}

/// Encode a complete custom section (id, size, name, payload), ready to be
/// appended to a module.
pub fn encode_custom_section(name: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(name.len() + payload.len() + 5);
    leb128::encode_u32(name.len() as u32, &mut body);
    body.extend_from_slice(name.as_bytes());
    body.extend_from_slice(payload);

    let mut section = Vec::with_capacity(body.len() + 6);
    section.push(SectionId::Custom as u8);
    leb128::encode_u32(body.len() as u32, &mut section);
    section.extend_from_slice(&body);
    section
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal valid WASM module: just the 8-byte header.
    const MINIMAL_MODULE: [u8; 8] = [
        0x00, 0x61, 0x73, 0x6D, // \0asm
        0x01, 0x00, 0x00, 0x00, // version 1
    ];

    #[test]
    fn parse_minimal_module_preamble() {
        let mut cursor = Cursor::new(&MINIMAL_MODULE);
        parse_preamble(&mut cursor).unwrap();
        assert!(cursor.is_empty());
    }

    #[test]
    fn reject_bad_magic() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(&data);
        let err = parse_preamble(&mut cursor).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidMagic);
    }

    #[test]
    fn reject_bad_version() {
        let data = [0x00, 0x61, 0x73, 0x6D, 0x02, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(&data);
        let err = parse_preamble(&mut cursor).unwrap_err();
        assert!(matches!(
            err.kind,
            DecodeErrorKind::UnsupportedVersion { found: 2 }
        ));
    }

    #[test]
    fn parse_multiple_sections_in_order() {
        let data = [
            0x00, 0x61, 0x73, 0x6D, // magic
            0x01, 0x00, 0x00, 0x00, // version
            0x01, 0x01, 0xFF, // type section (1 byte)
            0x03, 0x01, 0xEE, // function section (1 byte)
            0x07, 0x01, 0xDD, // export section (1 byte)
        ];
        let mut cursor = Cursor::new(&data);
        parse_preamble(&mut cursor).unwrap();
        let sections = parse_sections(&mut cursor).unwrap();

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].id, SectionId::Type);
        assert_eq!(sections[0].offset, 10);
        assert_eq!(sections[1].id, SectionId::Function);
        assert_eq!(sections[2].id, SectionId::Export);
        assert_eq!(sections[2].data, &[0xDD]);
    }

    #[test]
    fn reject_duplicate_section() {
        let data = [
            0x00, 0x61, 0x73, 0x6D, // magic
            0x01, 0x00, 0x00, 0x00, // version
            0x01, 0x01, 0xFF, // type section
            0x01, 0x01, 0xEE, // duplicate type section
        ];
        let mut cursor = Cursor::new(&data);
        parse_preamble(&mut cursor).unwrap();
        let err = parse_sections(&mut cursor).unwrap_err();
        assert!(matches!(
            err.kind,
            DecodeErrorKind::DuplicateSection { id: 1 }
        ));
    }

    #[test]
    fn reject_out_of_order_sections() {
        let data = [
            0x00, 0x61, 0x73, 0x6D, // magic
            0x01, 0x00, 0x00, 0x00, // version
            0x03, 0x01, 0xFF, // function section (id=3)
            0x01, 0x01, 0xEE, // type section (id=1), out of order
        ];
        let mut cursor = Cursor::new(&data);
        parse_preamble(&mut cursor).unwrap();
        let err = parse_sections(&mut cursor).unwrap_err();
        assert!(matches!(
            err.kind,
            DecodeErrorKind::SectionOutOfOrder {
                prev: 3,
                current: 1
            }
        ));
    }

    #[test]
    fn custom_sections_allowed_anywhere() {
        let data = [
            0x00, 0x61, 0x73, 0x6D, // magic
            0x01, 0x00, 0x00, 0x00, // version
            0x00, 0x01, 0x00, // custom section, empty name
            0x01, 0x01, 0xAA, // type section
            0x00, 0x01, 0x00, // another custom section
            0x03, 0x01, 0xCC, // function section
        ];
        let mut cursor = Cursor::new(&data);
        parse_preamble(&mut cursor).unwrap();
        let sections = parse_sections(&mut cursor).unwrap();

        let ids: Vec<_> = sections.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            [
                SectionId::Custom,
                SectionId::Type,
                SectionId::Custom,
                SectionId::Function
            ]
        );
    }

    #[test]
    fn data_count_orders_before_code_and_data() {
        let data = [
            0x00, 0x61, 0x73, 0x6D, // magic
            0x01, 0x00, 0x00, 0x00, // version
            0x09, 0x01, 0x00, // element section (id=9)
            0x0C, 0x01, 0x01, // datacount section (id=12)
            0x0A, 0x01, 0x00, // code section (id=10)
            0x0B, 0x01, 0x00, // data section (id=11)
        ];
        let mut cursor = Cursor::new(&data);
        parse_preamble(&mut cursor).unwrap();
        let ids: Vec<_> = parse_sections(&mut cursor)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(
            ids,
            [
                SectionId::Element,
                SectionId::DataCount,
                SectionId::Code,
                SectionId::Data
            ]
        );
    }

    #[test]
    fn reject_data_count_after_code() {
        let data = [
            0x00, 0x61, 0x73, 0x6D, // magic
            0x01, 0x00, 0x00, 0x00, // version
            0x0A, 0x01, 0x00, // code section (id=10)
            0x0C, 0x01, 0x01, // datacount section (id=12), too late
        ];
        let mut cursor = Cursor::new(&data);
        parse_preamble(&mut cursor).unwrap();
        let err = parse_sections(&mut cursor).unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::SectionOutOfOrder {
                prev: 10,
                current: 12
            }
        );
    }

    #[test]
    fn reject_duplicate_data_count() {
        let data = [
            0x00, 0x61, 0x73, 0x6D, // magic
            0x01, 0x00, 0x00, 0x00, // version
            0x0C, 0x01, 0x01, // datacount section
            0x0C, 0x01, 0x01, // datacount section again
        ];
        let mut cursor = Cursor::new(&data);
        parse_preamble(&mut cursor).unwrap();
        let err = parse_sections(&mut cursor).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::DuplicateSection { id: 12 });
    }

    #[test]
    fn reject_section_overflow() {
        let data = [
            0x00, 0x61, 0x73, 0x6D, // magic
            0x01, 0x00, 0x00, 0x00, // version
            0x01, 0xFF, 0x01, // type section claiming 255 bytes, but none follow
        ];
        let mut cursor = Cursor::new(&data);
        parse_preamble(&mut cursor).unwrap();
        let err = parse_sections(&mut cursor).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::SectionOverflow));
    }

    #[test]
    fn encoded_custom_section_parses_back() {
        let mut bytes = MINIMAL_MODULE.to_vec();
        bytes.extend(encode_custom_section("kiln.aot", &[1, 2, 3]));

        let mut cursor = Cursor::new(&bytes);
        parse_preamble(&mut cursor).unwrap();
        let sections = parse_sections(&mut cursor).unwrap();
        assert_eq!(sections.len(), 1);

        let custom = sections[0].custom().unwrap().unwrap();
        assert_eq!(custom.name, "kiln.aot");
        assert_eq!(custom.payload, &[1, 2, 3]);
    }

    #[test]
    fn custom_section_name_errors_point_into_binary() {
        let section = RawSection {
            id: SectionId::Custom,
            offset: 40,
            data: &[0x04, b'a'],
        };
        let err = section.custom().unwrap_err();
        assert_eq!(err.context, DecodeContext::CustomSection);
        assert!(err.offset.0 >= 40);
    }

    #[test]
    fn non_custom_section_has_no_custom_view() {
        let section = RawSection {
            id: SectionId::Type,
            offset: 8,
            data: &[0x00],
        };
        assert!(section.custom().unwrap().is_none());
    }
}
