//! Attributes attached to classes, fields, methods and `Code` attributes.
use crate::constant_pool::ConstantPool;
use crate::error::ClassFormatError;
use crate::reader::ClassReader;

type Result<T> = std::result::Result<T, ClassFormatError>;

/// Decoded attribute. Names this decoder does not know about are kept as
/// `Unrecognized` with their raw payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
    Code(CodeAttribute),
    ConstantValue { constant_value_index: u16 },
    Deprecated,
    Exceptions { exception_index_table: Vec<u16> },
    LineNumberTable(Vec<LineNumberEntry>),
    LocalVariableTable(Vec<LocalVariableEntry>),
    SourceFile { source_file_index: u16 },
    Synthetic,
    Unrecognized { name: String, info: Vec<u8> },
}

/// Method body along with its own nested attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Vec<AttributeInfo>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    // Zero catches everything (`finally`).
    pub catch_type: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineNumberEntry {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocalVariableEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    // Local variable slot.
    pub index: u16,
}

impl AttributeInfo {
    /// Reads a single attribute. The declared length is only used for
    /// unrecognized attributes, known ones are decoded by their shape.
    pub fn read(reader: &mut ClassReader, pool: &ConstantPool) -> Result<Self> {
        let name_index = reader.read_u16()?;
        let name = pool.utf8(name_index)?;
        let length = reader.read_u32()? as usize;
        tracing::trace!(name, length, "read attribute");

        let attribute = match name {
            "Code" => Self::Code(CodeAttribute::read(reader, pool)?),
            "ConstantValue" => Self::ConstantValue {
                constant_value_index: reader.read_u16()?,
            },
            "Deprecated" => Self::Deprecated,
            "Exceptions" => Self::Exceptions {
                exception_index_table: reader.read_u16s()?,
            },
            "LineNumberTable" => {
                let count = reader.read_u16()?;
                let entries = (0..count)
                    .map(|_| -> Result<LineNumberEntry> {
                        Ok(LineNumberEntry {
                            start_pc: reader.read_u16()?,
                            line_number: reader.read_u16()?,
                        })
                    })
                    .collect::<Result<_>>()?;
                Self::LineNumberTable(entries)
            }
            "LocalVariableTable" => {
                let count = reader.read_u16()?;
                let entries = (0..count)
                    .map(|_| -> Result<LocalVariableEntry> {
                        Ok(LocalVariableEntry {
                            start_pc: reader.read_u16()?,
                            length: reader.read_u16()?,
                            name_index: reader.read_u16()?,
                            descriptor_index: reader.read_u16()?,
                            index: reader.read_u16()?,
                        })
                    })
                    .collect::<Result<_>>()?;
                Self::LocalVariableTable(entries)
            }
            "SourceFile" => Self::SourceFile {
                source_file_index: reader.read_u16()?,
            },
            "Synthetic" => Self::Synthetic,
            _ => {
                tracing::debug!(name, length, "keeping unrecognized attribute");
                Self::Unrecognized {
                    name: name.to_owned(),
                    info: reader.read_bytes(length)?.to_vec(),
                }
            }
        };
        Ok(attribute)
    }

    /// Returns the attribute name as it appears in the class file.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Code(_) => "Code",
            Self::ConstantValue { .. } => "ConstantValue",
            Self::Deprecated => "Deprecated",
            Self::Exceptions { .. } => "Exceptions",
            Self::LineNumberTable(_) => "LineNumberTable",
            Self::LocalVariableTable(_) => "LocalVariableTable",
            Self::SourceFile { .. } => "SourceFile",
            Self::Synthetic => "Synthetic",
            Self::Unrecognized { name, .. } => name,
        }
    }
}

impl CodeAttribute {
    fn read(reader: &mut ClassReader, pool: &ConstantPool) -> Result<Self> {
        let max_stack = reader.read_u16()?;
        let max_locals = reader.read_u16()?;
        let code_length = reader.read_u32()? as usize;
        let code = reader.read_bytes(code_length)?.to_vec();

        let table_length = reader.read_u16()?;
        let exception_table = (0..table_length)
            .map(|_| -> Result<ExceptionTableEntry> {
                Ok(ExceptionTableEntry {
                    start_pc: reader.read_u16()?,
                    end_pc: reader.read_u16()?,
                    handler_pc: reader.read_u16()?,
                    catch_type: reader.read_u16()?,
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes: read_attributes(reader, pool)?,
        })
    }

    /// Returns the source line for the instruction at `pc`, if the code
    /// carries a line number table.
    #[must_use]
    pub fn line_number(&self, pc: u16) -> Option<u16> {
        self.attributes
            .iter()
            .filter_map(|attr| match attr {
                AttributeInfo::LineNumberTable(entries) => Some(entries),
                _ => None,
            })
            .flatten()
            .filter(|entry| entry.start_pc <= pc)
            .max_by_key(|entry| entry.start_pc)
            .map(|entry| entry.line_number)
    }
}

/// Reads a `u16` count followed by that many attributes, in file order.
pub fn read_attributes(
    reader: &mut ClassReader,
    pool: &ConstantPool,
) -> Result<Vec<AttributeInfo>> {
    let count = reader.read_u16()?;
    (0..count)
        .map(|_| AttributeInfo::read(reader, pool))
        .collect()
}
