//! Constant pool of a class file.
//!
//! The pool is a 1-indexed table of tagged constants. Constants that point at
//! other constants only store indices, names are resolved when looked up.
use std::fmt;

use crate::error::ClassFormatError;
use crate::reader::ClassReader;

type Result<T> = std::result::Result<T, ClassFormatError>;

/// Tag byte identifying the kind of a constant pool entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    InvokeDynamic = 18,
}

impl TryFrom<u8> for ConstantTag {
    type Error = u8;

    fn try_from(tag: u8) -> std::result::Result<Self, u8> {
        Ok(match tag {
            1 => Self::Utf8,
            3 => Self::Integer,
            4 => Self::Float,
            5 => Self::Long,
            6 => Self::Double,
            7 => Self::Class,
            8 => Self::String,
            9 => Self::FieldRef,
            10 => Self::MethodRef,
            11 => Self::InterfaceMethodRef,
            12 => Self::NameAndType,
            15 => Self::MethodHandle,
            16 => Self::MethodType,
            18 => Self::InvokeDynamic,
            _ => return Err(tag),
        })
    }
}

impl fmt::Display for ConstantTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Utf8 => "CONSTANT_Utf8",
            Self::Integer => "CONSTANT_Integer",
            Self::Float => "CONSTANT_Float",
            Self::Long => "CONSTANT_Long",
            Self::Double => "CONSTANT_Double",
            Self::Class => "CONSTANT_Class",
            Self::String => "CONSTANT_String",
            Self::FieldRef => "CONSTANT_Fieldref",
            Self::MethodRef => "CONSTANT_Methodref",
            Self::InterfaceMethodRef => "CONSTANT_InterfaceMethodref",
            Self::NameAndType => "CONSTANT_NameAndType",
            Self::MethodHandle => "CONSTANT_MethodHandle",
            Self::MethodType => "CONSTANT_MethodType",
            Self::InvokeDynamic => "CONSTANT_InvokeDynamic",
        };
        f.write_str(name)
    }
}

/// A single constant pool entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    // Also used for boolean, byte, char and short constants.
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String {
        string_index: u16,
    },
    Class {
        name_index: u16,
    },
    FieldRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    MethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    InvokeDynamic {
        // Index into the BootstrapMethods attribute, not the pool.
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
}

impl Constant {
    /// Reads one tagged constant.
    pub fn read(reader: &mut ClassReader) -> Result<Self> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        let tag = ConstantTag::try_from(tag)
            .map_err(|tag| ClassFormatError::UnknownConstantTag { tag, offset })?;

        let constant = match tag {
            ConstantTag::Utf8 => {
                let len = reader.read_u16()? as usize;
                let start = reader.position();
                let bytes = reader.read_bytes(len)?;
                let text = decode_modified_utf8(bytes)
                    .ok_or(ClassFormatError::InvalidUtf8 { offset: start })?;
                Self::Utf8(text)
            }
            ConstantTag::Integer => Self::Integer(reader.read_u32()? as i32),
            ConstantTag::Float => Self::Float(reader.read_f32()?),
            ConstantTag::Long => Self::Long(reader.read_u64()? as i64),
            ConstantTag::Double => Self::Double(reader.read_f64()?),
            ConstantTag::String => Self::String {
                string_index: reader.read_u16()?,
            },
            ConstantTag::Class => Self::Class {
                name_index: reader.read_u16()?,
            },
            ConstantTag::FieldRef => Self::FieldRef {
                class_index: reader.read_u16()?,
                name_and_type_index: reader.read_u16()?,
            },
            ConstantTag::MethodRef => Self::MethodRef {
                class_index: reader.read_u16()?,
                name_and_type_index: reader.read_u16()?,
            },
            ConstantTag::InterfaceMethodRef => Self::InterfaceMethodRef {
                class_index: reader.read_u16()?,
                name_and_type_index: reader.read_u16()?,
            },
            ConstantTag::NameAndType => Self::NameAndType {
                name_index: reader.read_u16()?,
                descriptor_index: reader.read_u16()?,
            },
            ConstantTag::MethodHandle => Self::MethodHandle {
                reference_kind: reader.read_u8()?,
                reference_index: reader.read_u16()?,
            },
            ConstantTag::MethodType => Self::MethodType {
                descriptor_index: reader.read_u16()?,
            },
            ConstantTag::InvokeDynamic => Self::InvokeDynamic {
                bootstrap_method_attr_index: reader.read_u16()?,
                name_and_type_index: reader.read_u16()?,
            },
        };
        Ok(constant)
    }

    #[must_use]
    pub const fn tag(&self) -> ConstantTag {
        match self {
            Self::Utf8(_) => ConstantTag::Utf8,
            Self::Integer(_) => ConstantTag::Integer,
            Self::Float(_) => ConstantTag::Float,
            Self::Long(_) => ConstantTag::Long,
            Self::Double(_) => ConstantTag::Double,
            Self::String { .. } => ConstantTag::String,
            Self::Class { .. } => ConstantTag::Class,
            Self::FieldRef { .. } => ConstantTag::FieldRef,
            Self::MethodRef { .. } => ConstantTag::MethodRef,
            Self::InterfaceMethodRef { .. } => ConstantTag::InterfaceMethodRef,
            Self::NameAndType { .. } => ConstantTag::NameAndType,
            Self::MethodHandle { .. } => ConstantTag::MethodHandle,
            Self::MethodType { .. } => ConstantTag::MethodType,
            Self::InvokeDynamic { .. } => ConstantTag::InvokeDynamic,
        }
    }

    /// Long and double constants take up two pool indices.
    #[must_use]
    pub const fn is_wide(&self) -> bool {
        matches!(self, Self::Long(_) | Self::Double(_))
    }

    /// Pool indices this constant refers to.
    fn references(&self) -> Vec<u16> {
        match *self {
            Self::String { string_index } => vec![string_index],
            Self::Class { name_index } => vec![name_index],
            Self::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Self::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Self::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => vec![class_index, name_and_type_index],
            Self::NameAndType {
                name_index,
                descriptor_index,
            } => vec![name_index, descriptor_index],
            Self::MethodHandle {
                reference_index, ..
            } => vec![reference_index],
            Self::MethodType { descriptor_index } => vec![descriptor_index],
            Self::InvokeDynamic {
                name_and_type_index,
                ..
            } => vec![name_and_type_index],
            _ => Vec::new(),
        }
    }
}

/// A field or method reference with every index resolved to its name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemberRef<'a> {
    pub class_name: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
}

/// `ConstantPool` owns the decoded constants of one class file. Index 0 and
/// the index following every long or double hold no constant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    constants: Vec<Option<Constant>>,
}

impl ConstantPool {
    /// Reads the pool count and the constants that follow it.
    pub fn read(reader: &mut ClassReader) -> Result<Self> {
        let count = reader.read_u16()?;
        let mut constants = Vec::with_capacity(count as usize);
        constants.push(None);

        let mut index = 1;
        while index < count {
            let constant = Constant::read(reader)?;
            tracing::trace!(index, tag = %constant.tag(), "read constant");
            let wide = constant.is_wide();
            if wide && index + 1 >= count {
                return Err(ClassFormatError::WideConstantAtEnd { index });
            }
            constants.push(Some(constant));
            if wide {
                constants.push(None);
                index += 2;
            } else {
                index += 1;
            }
        }

        let pool = Self { constants };
        pool.check_references()?;
        Ok(pool)
    }

    /// Number of pool slots, including index 0 and the slots shadowed by
    /// long and double constants. Equals the count declared in the file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constants.len() <= 1
    }

    /// Iterates over the usable constants along with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.constants
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i as u16, c)))
    }

    /// Returns the constant at `index`.
    pub fn get(&self, index: u16) -> Result<&Constant> {
        match self.constants.get(index as usize) {
            Some(Some(constant)) => Ok(constant),
            Some(None) => Err(ClassFormatError::UnusableConstant { index }),
            None => Err(ClassFormatError::ConstantIndexOutOfRange {
                index,
                len: self.constants.len(),
            }),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(text) => Ok(text),
            other => Err(mismatch(index, ConstantTag::Utf8, other)),
        }
    }

    /// Resolves a `CONSTANT_Class` to its internal name, e.g.
    /// `java/lang/Object`.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            other => Err(mismatch(index, ConstantTag::Class, other)),
        }
    }

    /// Resolves a `CONSTANT_String` to its text.
    pub fn string(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::String { string_index } => self.utf8(*string_index),
            other => Err(mismatch(index, ConstantTag::String, other)),
        }
    }

    /// Resolves a `CONSTANT_NameAndType` to a `(name, descriptor)` pair.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(mismatch(index, ConstantTag::NameAndType, other)),
        }
    }

    /// Resolves a field, method or interface method reference.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef<'_>> {
        match self.get(index)? {
            Constant::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Constant::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Constant::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => {
                let class_name = self.class_name(*class_index)?;
                let (name, descriptor) =
                    self.name_and_type(*name_and_type_index)?;
                Ok(MemberRef {
                    class_name,
                    name,
                    descriptor,
                })
            }
            other => Err(ClassFormatError::NotAMemberRef {
                index,
                found: other.tag(),
            }),
        }
    }

    // Every index stored in a constant must land on a real entry.
    fn check_references(&self) -> Result<()> {
        for (_, constant) in self.iter() {
            for index in constant.references() {
                self.get(index)?;
            }
        }
        Ok(())
    }
}

fn mismatch(index: u16, expected: ConstantTag, found: &Constant) -> ClassFormatError {
    ClassFormatError::ConstantTypeMismatch {
        index,
        expected,
        found: found.tag(),
    }
}

/// Decodes the class file flavour of UTF-8, which encodes NUL as `C0 80` and
/// supplementary characters as surrogate pairs of 3-byte sequences. Unpaired
/// surrogates become U+FFFD, only malformed byte sequences fail.
fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_owned());
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let continuation = |at: usize| {
            bytes
                .get(at)
                .copied()
                .filter(|c| c & 0xc0 == 0x80)
                .map(|c| u16::from(c & 0x3f))
        };
        if b & 0x80 == 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xe0 == 0xc0 {
            let low = continuation(i + 1)?;
            units.push((u16::from(b & 0x1f) << 6) | low);
            i += 2;
        } else if b & 0xf0 == 0xe0 {
            let mid = continuation(i + 1)?;
            let low = continuation(i + 2)?;
            units.push((u16::from(b & 0x0f) << 12) | (mid << 6) | low);
            i += 3;
        } else {
            return None;
        }
    }
    Some(
        char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_one(bytes: &[u8]) -> Result<Constant> {
        Constant::read(&mut ClassReader::new(bytes))
    }

    fn pool(count: u16, entries: &[&[u8]]) -> Result<ConstantPool> {
        let mut bytes = count.to_be_bytes().to_vec();
        for entry in entries {
            bytes.extend_from_slice(entry);
        }
        ConstantPool::read(&mut ClassReader::new(&bytes))
    }

    #[test]
    fn can_read_method_ref() {
        let constant = read_one(&[0x0a, 0x00, 0x06, 0x00, 0x31]).unwrap();
        assert_eq!(
            constant,
            Constant::MethodRef {
                class_index: 6,
                name_and_type_index: 49
            }
        );
        assert_eq!(constant.tag(), ConstantTag::MethodRef);
    }

    #[test]
    fn can_read_utf8() {
        let constant =
            read_one(&[0x01, 0x00, 0x04, 0x46, 0x4c, 0x41, 0x47]).unwrap();
        assert_eq!(constant, Constant::Utf8("FLAG".to_string()));
    }

    #[test]
    fn can_read_modified_utf8() {
        // "a\0b" with NUL as C0 80.
        let constant =
            read_one(&[0x01, 0x00, 0x04, 0x61, 0xc0, 0x80, 0x62]).unwrap();
        assert_eq!(constant, Constant::Utf8("a\0b".to_string()));

        // U+1F600 as a surrogate pair, D83D DE00.
        let constant = read_one(&[
            0x01, 0x00, 0x06, 0xed, 0xa0, 0xbd, 0xed, 0xb8, 0x80,
        ])
        .unwrap();
        assert_eq!(constant, Constant::Utf8("\u{1f600}".to_string()));

        assert_eq!(
            read_one(&[0x01, 0x00, 0x02, 0xc0, 0x41]),
            Err(ClassFormatError::InvalidUtf8 { offset: 3 })
        );
        assert_eq!(
            read_one(&[0x01, 0x00, 0x02, 0xe0, 0x80]),
            Err(ClassFormatError::InvalidUtf8 { offset: 3 })
        );
    }

    #[test]
    fn unpaired_surrogates_are_replaced() {
        // "\uD800" as javac writes it.
        let constant = read_one(&[0x01, 0x00, 0x03, 0xed, 0xa0, 0x80]).unwrap();
        assert_eq!(constant, Constant::Utf8("\u{fffd}".to_string()));

        // Low surrogate first, then a plain letter.
        let constant =
            read_one(&[0x01, 0x00, 0x04, 0xed, 0xb8, 0x80, 0x41]).unwrap();
        assert_eq!(constant, Constant::Utf8("\u{fffd}A".to_string()));
    }

    #[test]
    fn can_read_numeric_literals() {
        assert_eq!(
            read_one(&[0x03, 0xff, 0xff, 0xff, 0xfe]).unwrap(),
            Constant::Integer(-2)
        );
        let mut float = vec![0x04];
        float.extend_from_slice(&3.14f32.to_be_bytes());
        assert_eq!(read_one(&float).unwrap(), Constant::Float(3.14));

        let mut long = vec![0x05];
        long.extend_from_slice(&i64::MIN.to_be_bytes());
        assert_eq!(read_one(&long).unwrap(), Constant::Long(i64::MIN));

        let mut double = vec![0x06];
        double.extend_from_slice(&(-0.125f64).to_be_bytes());
        assert_eq!(read_one(&double).unwrap(), Constant::Double(-0.125));
    }

    #[test]
    fn can_read_dynamic_constants() {
        assert_eq!(
            read_one(&[0x0f, 0x06, 0x00, 0x09]).unwrap(),
            Constant::MethodHandle {
                reference_kind: 6,
                reference_index: 9
            }
        );
        assert_eq!(
            read_one(&[0x10, 0x00, 0x0c]).unwrap(),
            Constant::MethodType {
                descriptor_index: 12
            }
        );
        assert_eq!(
            read_one(&[0x12, 0x00, 0x00, 0x00, 0x21]).unwrap(),
            Constant::InvokeDynamic {
                bootstrap_method_attr_index: 0,
                name_and_type_index: 33
            }
        );
    }

    #[test]
    fn unknown_tag_is_fatal() {
        assert_eq!(
            read_one(&[0x02, 0x00]),
            Err(ClassFormatError::UnknownConstantTag { tag: 2, offset: 0 })
        );
        assert_eq!(
            pool(3, &[&[0x01, 0x00, 0x00], &[0x0d]]),
            Err(ClassFormatError::UnknownConstantTag { tag: 13, offset: 5 })
        );
    }

    #[test]
    fn wide_constants_take_two_slots() {
        let pool = pool(
            6,
            &[
                &[0x05, 0, 0, 0, 0, 0, 0, 0, 7],
                &[0x06, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0],
                &[0x01, 0x00, 0x01, b'x'],
            ],
        )
        .unwrap();
        assert_eq!(pool.len(), 6);
        assert_eq!(pool.get(1).unwrap(), &Constant::Long(7));
        assert_eq!(pool.get(2), Err(ClassFormatError::UnusableConstant { index: 2 }));
        assert_eq!(pool.get(3).unwrap(), &Constant::Double(1.0));
        assert_eq!(pool.get(4), Err(ClassFormatError::UnusableConstant { index: 4 }));
        assert_eq!(pool.utf8(5).unwrap(), "x");
        assert_eq!(pool.get(0), Err(ClassFormatError::UnusableConstant { index: 0 }));
        assert_eq!(
            pool.get(6),
            Err(ClassFormatError::ConstantIndexOutOfRange { index: 6, len: 6 })
        );
        assert_eq!(pool.iter().count(), 3);
    }

    #[test]
    fn wide_constant_in_the_last_slot_is_rejected() {
        assert_eq!(
            pool(2, &[&[0x05, 0, 0, 0, 0, 0, 0, 0, 1]]),
            Err(ClassFormatError::WideConstantAtEnd { index: 1 })
        );
        assert_eq!(
            pool(4, &[&[0x01, 0x00, 0x00], &[0x01, 0x00, 0x00], &[0x06, 0, 0, 0, 0, 0, 0, 0, 0]]),
            Err(ClassFormatError::WideConstantAtEnd { index: 3 })
        );
        let pool = pool(3, &[&[0x05, 0, 0, 0, 0, 0, 0, 0, 1]]).unwrap();
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn referencing_a_placeholder_fails_the_decode() {
        let result = pool(
            4,
            &[&[0x05, 0, 0, 0, 0, 0, 0, 0, 1], &[0x08, 0x00, 0x02]],
        );
        assert_eq!(result, Err(ClassFormatError::UnusableConstant { index: 2 }));

        let result = pool(2, &[&[0x07, 0x00, 0x09]]);
        assert_eq!(
            result,
            Err(ClassFormatError::ConstantIndexOutOfRange { index: 9, len: 2 })
        );
    }

    #[test]
    fn class_names_resolve_lazily() {
        let pool = pool(
            5,
            &[
                &[0x07, 0x00, 0x02],
                &[0x01, 0x00, 0x03, b'F', b'o', b'o'],
                &[0x07, 0x00, 0x04],
                &[0x03, 0x00, 0x00, 0x00, 0x01],
            ],
        )
        .unwrap();
        assert_eq!(pool.class_name(1).unwrap(), "Foo");
        assert_eq!(
            pool.class_name(3),
            Err(ClassFormatError::ConstantTypeMismatch {
                index: 4,
                expected: ConstantTag::Utf8,
                found: ConstantTag::Integer
            })
        );
        assert_eq!(
            pool.class_name(2),
            Err(ClassFormatError::ConstantTypeMismatch {
                index: 2,
                expected: ConstantTag::Class,
                found: ConstantTag::Utf8
            })
        );
    }

    #[test]
    fn member_refs_resolve_through_name_and_type() {
        let pool = pool(
            9,
            &[
                &[0x0a, 0x00, 0x02, 0x00, 0x04],
                &[0x07, 0x00, 0x03],
                &[0x01, 0x00, 0x01, b'A'],
                &[0x0c, 0x00, 0x05, 0x00, 0x06],
                &[0x01, 0x00, 0x03, b'r', b'u', b'n'],
                &[0x01, 0x00, 0x03, b'(', b')', b'V'],
                &[0x08, 0x00, 0x05],
                &[0x09, 0x00, 0x02, 0x00, 0x04],
            ],
        )
        .unwrap();
        let method = pool.member_ref(1).unwrap();
        assert_eq!(
            method,
            MemberRef {
                class_name: "A",
                name: "run",
                descriptor: "()V"
            }
        );
        assert_eq!(pool.member_ref(8).unwrap(), method);
        assert_eq!(pool.name_and_type(4).unwrap(), ("run", "()V"));
        assert_eq!(pool.string(7).unwrap(), "run");
        assert_eq!(
            pool.member_ref(7),
            Err(ClassFormatError::NotAMemberRef {
                index: 7,
                found: ConstantTag::String
            })
        );
    }

    #[test]
    fn tags_round_trip_through_u8() {
        for tag in [1u8, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 15, 16, 18] {
            assert_eq!(ConstantTag::try_from(tag).unwrap() as u8, tag);
        }
        assert_eq!(ConstantTag::try_from(17), Err(17));
        assert_eq!(ConstantTag::Class.to_string(), "CONSTANT_Class");
    }
}
