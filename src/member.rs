//! Field and method declarations, both share the same layout.
use crate::access::AccessFlags;
use crate::attribute::{read_attributes, AttributeInfo, CodeAttribute};
use crate::constant_pool::ConstantPool;
use crate::error::ClassFormatError;
use crate::reader::ClassReader;

type Result<T> = std::result::Result<T, ClassFormatError>;

/// A `field_info` or `method_info` record. Names are kept as pool indices
/// and resolved on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<AttributeInfo>,
}

impl MemberInfo {
    pub fn read(reader: &mut ClassReader, pool: &ConstantPool) -> Result<Self> {
        Ok(Self {
            access_flags: AccessFlags::from_bits(reader.read_u16()?),
            name_index: reader.read_u16()?,
            descriptor_index: reader.read_u16()?,
            attributes: read_attributes(reader, pool)?,
        })
    }

    pub fn name<'a>(&self, pool: &'a ConstantPool) -> Result<&'a str> {
        pool.utf8(self.name_index)
    }

    pub fn descriptor<'a>(&self, pool: &'a ConstantPool) -> Result<&'a str> {
        pool.utf8(self.descriptor_index)
    }

    /// Returns the method body, `None` for fields and abstract or native
    /// methods.
    #[must_use]
    pub fn code(&self) -> Option<&CodeAttribute> {
        self.attributes.iter().find_map(|attr| match attr {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        })
    }

    /// Returns the pool index of a field's compile time constant.
    #[must_use]
    pub fn constant_value_index(&self) -> Option<u16> {
        self.attributes.iter().find_map(|attr| match attr {
            AttributeInfo::ConstantValue {
                constant_value_index,
            } => Some(*constant_value_index),
            _ => None,
        })
    }

    /// Returns the `CONSTANT_Class` indices of the checked exceptions a
    /// method declares.
    #[must_use]
    pub fn exceptions(&self) -> &[u16] {
        self.attributes
            .iter()
            .find_map(|attr| match attr {
                AttributeInfo::Exceptions {
                    exception_index_table,
                } => Some(exception_index_table.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.attributes
            .iter()
            .any(|attr| matches!(attr, AttributeInfo::Deprecated))
    }

    /// Synthetic either through the access flag or the legacy attribute.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(AccessFlags::SYNTHETIC)
            || self
                .attributes
                .iter()
                .any(|attr| matches!(attr, AttributeInfo::Synthetic))
    }
}

/// Reads a `u16` count followed by that many members, in file order.
pub fn read_members(
    reader: &mut ClassReader,
    pool: &ConstantPool,
) -> Result<Vec<MemberInfo>> {
    let count = reader.read_u16()?;
    (0..count).map(|_| MemberInfo::read(reader, pool)).collect()
}
