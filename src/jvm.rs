//! Parser and decoder for JVM class files.
//!
//! `JVMParser::parse` walks the file in a single pass: magic, version,
//! constant pool, class header, fields, methods and class attributes. Any
//! error aborts the parse, there is no partially decoded class.
use std::fmt;

use crate::access::AccessFlags;
use crate::attribute::{read_attributes, AttributeInfo};
use crate::constant_pool::ConstantPool;
use crate::error::ClassFormatError;
use crate::member::{read_members, MemberInfo};
use crate::reader::ClassReader;

type Result<T> = std::result::Result<T, ClassFormatError>;

/// Magic number every class file starts with.
pub const MAGIC: u32 = 0xcafe_babe;

/// Newest class file major version this parser accepts (Java 8).
pub const MAX_MAJOR_VERSION: u16 = 52;

/// Decoded class file. Names are resolved through the constant pool every
/// time they are asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct JVMClassFile {
    magic: u32,
    minor_version: u16,
    major_version: u16,
    constant_pool: ConstantPool,
    access_flags: AccessFlags,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberInfo>,
    methods: Vec<MemberInfo>,
    attributes: Vec<AttributeInfo>,
}

/// Entry point for decoding class files.
pub struct JVMParser;

impl JVMParser {
    /// Parses a class file already loaded in memory.
    pub fn parse(bytes: &[u8]) -> Result<JVMClassFile> {
        let mut reader = ClassReader::new(bytes);

        let magic = reader.read_u32()?;
        if magic != MAGIC {
            return Err(ClassFormatError::BadMagic(magic));
        }
        let minor_version = reader.read_u16()?;
        let major_version = reader.read_u16()?;
        check_version(major_version, minor_version)?;

        let constant_pool = ConstantPool::read(&mut reader)?;
        let access_flags = AccessFlags::from_bits(reader.read_u16()?);
        let this_class = reader.read_u16()?;
        let super_class = reader.read_u16()?;
        let interfaces = reader.read_u16s()?;
        let fields = read_members(&mut reader, &constant_pool)?;
        let methods = read_members(&mut reader, &constant_pool)?;
        let attributes = read_attributes(&mut reader, &constant_pool)?;

        if reader.remaining() > 0 {
            tracing::debug!(trailing = reader.remaining(), "ignoring bytes after class file");
        }

        let class_file = JVMClassFile {
            magic,
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        };
        tracing::debug!(
            class = class_file.class_name().unwrap_or("<invalid>"),
            major_version,
            minor_version,
            constants = class_file.constant_pool.len(),
            fields = class_file.fields.len(),
            methods = class_file.methods.len(),
            "parsed class file"
        );
        Ok(class_file)
    }
}

/// Major version 45 is accepted with any minor version, 46 through 52 only
/// with a zero minor version.
fn check_version(major: u16, minor: u16) -> Result<()> {
    match major {
        45 => Ok(()),
        46..=MAX_MAJOR_VERSION if minor == 0 => Ok(()),
        _ => Err(ClassFormatError::UnsupportedVersion { major, minor }),
    }
}

impl JVMClassFile {
    #[must_use]
    pub fn magic(&self) -> u32 {
        self.magic
    }

    #[must_use]
    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    #[must_use]
    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    #[must_use]
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    #[must_use]
    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// Pool index of this class's `CONSTANT_Class`.
    #[must_use]
    pub fn this_class(&self) -> u16 {
        self.this_class
    }

    /// Pool index of the superclass, 0 for `java/lang/Object`.
    #[must_use]
    pub fn super_class(&self) -> u16 {
        self.super_class
    }

    #[must_use]
    pub fn interfaces(&self) -> &[u16] {
        &self.interfaces
    }

    #[must_use]
    pub fn fields(&self) -> &[MemberInfo] {
        &self.fields
    }

    #[must_use]
    pub fn methods(&self) -> &[MemberInfo] {
        &self.methods
    }

    #[must_use]
    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    pub fn class_name(&self) -> Result<&str> {
        self.constant_pool.class_name(self.this_class)
    }

    /// Returns `None` only for `java/lang/Object`, which has no superclass.
    pub fn super_class_name(&self) -> Result<Option<&str>> {
        if self.super_class == 0 {
            return Ok(None);
        }
        self.constant_pool.class_name(self.super_class).map(Some)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    /// Name of the source file from the `SourceFile` attribute, if any.
    pub fn source_file(&self) -> Result<Option<&str>> {
        self.attributes
            .iter()
            .find_map(|attr| match attr {
                AttributeInfo::SourceFile { source_file_index } => {
                    Some(self.constant_pool.utf8(*source_file_index))
                }
                _ => None,
            })
            .transpose()
    }

    /// Finds a method by name and descriptor, e.g. `("main",
    /// "([Ljava/lang/String;)V")`.
    pub fn find_method(
        &self,
        name: &str,
        descriptor: &str,
    ) -> Result<Option<&MemberInfo>> {
        for method in &self.methods {
            if method.name(&self.constant_pool)? == name
                && method.descriptor(&self.constant_pool)? == descriptor
            {
                return Ok(Some(method));
            }
        }
        Ok(None)
    }

    /// Finds a field by name. Field names are unique within a class.
    pub fn find_field(&self, name: &str) -> Result<Option<&MemberInfo>> {
        for field in &self.fields {
            if field.name(&self.constant_pool)? == name {
                return Ok(Some(field));
            }
        }
        Ok(None)
    }
}

impl fmt::Display for JVMClassFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const INVALID: &str = "<invalid>";
        let pool = &self.constant_pool;
        let member_names = |members: &[MemberInfo]| {
            members
                .iter()
                .map(|m| m.name(pool).unwrap_or(INVALID))
                .collect::<Vec<_>>()
                .join(", ")
        };

        writeln!(f, "magic: {:x}", self.magic)?;
        writeln!(f, "version: {}.{}", self.major_version, self.minor_version)?;
        writeln!(f, "constants count: {}", pool.len())?;
        writeln!(f, "access flags: {:#x}", self.access_flags)?;
        writeln!(f, "this class: {}", self.class_name().unwrap_or(INVALID))?;
        match self.super_class_name() {
            Ok(Some(name)) => writeln!(f, "super class: {name}")?,
            Ok(None) => writeln!(f, "super class: <none>")?,
            Err(_) => writeln!(f, "super class: {INVALID}")?,
        }
        match self.interface_names() {
            Ok(names) => writeln!(f, "interfaces: {}", names.join(", "))?,
            Err(_) => writeln!(f, "interfaces: {INVALID}")?,
        }
        writeln!(
            f,
            "fields count: {} {}",
            self.fields.len(),
            member_names(&self.fields)
        )?;
        write!(
            f,
            "methods count: {} {}",
            self.methods.len(),
            member_names(&self.methods)
        )
    }
}
