//! Field and method type descriptors such as `[Ljava/lang/String;` or
//! `(IJ)D`.
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ClassFormatError;

type Result<T> = std::result::Result<T, ClassFormatError>;

/// Type of a field, parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    // Internal class name, e.g. `java/lang/String`.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    /// Returns the number of local variable or operand stack slots a value
    /// of this type occupies.
    #[must_use]
    pub fn slot_width(&self) -> usize {
        match self {
            Self::Long | Self::Double => 2,
            _ => 1,
        }
    }

    // Parses one field type off the front of `s` and returns the rest.
    fn parse_prefix(s: &str) -> Option<(Self, &str)> {
        let mut chars = s.chars();
        let t = match chars.next()? {
            'B' => Self::Byte,
            'C' => Self::Char,
            'D' => Self::Double,
            'F' => Self::Float,
            'I' => Self::Int,
            'J' => Self::Long,
            'S' => Self::Short,
            'Z' => Self::Boolean,
            'L' => {
                let rest = chars.as_str();
                let end = rest.find(';')?;
                if end == 0 {
                    return None;
                }
                return Some((Self::Object(rest[..end].to_owned()), &rest[end + 1..]));
            }
            '[' => {
                let (component, rest) = Self::parse_prefix(chars.as_str())?;
                return Some((Self::Array(Box::new(component)), rest));
            }
            _ => return None,
        };
        Some((t, chars.as_str()))
    }
}

impl FromStr for FieldType {
    type Err = ClassFormatError;

    fn from_str(s: &str) -> Result<Self> {
        match Self::parse_prefix(s) {
            Some((t, "")) => Ok(t),
            _ => Err(ClassFormatError::InvalidDescriptor(s.to_owned())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Byte => f.write_str("B"),
            Self::Char => f.write_str("C"),
            Self::Double => f.write_str("D"),
            Self::Float => f.write_str("F"),
            Self::Int => f.write_str("I"),
            Self::Long => f.write_str("J"),
            Self::Short => f.write_str("S"),
            Self::Boolean => f.write_str("Z"),
            Self::Object(name) => write!(f, "L{name};"),
            Self::Array(component) => write!(f, "[{component}"),
        }
    }
}

/// Parameter and return types of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    // `None` for `void`.
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    /// Number of local variable slots the arguments take when the method is
    /// entered, including `this` for instance methods.
    #[must_use]
    pub fn parameter_slots(&self, is_static: bool) -> usize {
        let receiver = usize::from(!is_static);
        receiver
            + self
                .parameters
                .iter()
                .map(FieldType::slot_width)
                .sum::<usize>()
    }
}

fn method_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\(([^)]*)\)(.+)$").expect("method descriptor pattern is valid")
    })
}

impl FromStr for MethodDescriptor {
    type Err = ClassFormatError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ClassFormatError::InvalidDescriptor(s.to_owned());
        let caps = method_pattern().captures(s).ok_or_else(invalid)?;
        let mut args = caps.get(1).map_or("", |m| m.as_str());
        let ret = caps.get(2).map_or("", |m| m.as_str());

        let mut parameters = Vec::new();
        while !args.is_empty() {
            let (t, rest) = FieldType::parse_prefix(args).ok_or_else(invalid)?;
            parameters.push(t);
            args = rest;
        }
        let return_type = match ret {
            "V" => None,
            _ => Some(ret.parse::<FieldType>().map_err(|_| invalid())?),
        };
        Ok(Self {
            parameters,
            return_type,
        })
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("(")?;
        for parameter in &self.parameters {
            write!(f, "{parameter}")?;
        }
        f.write_str(")")?;
        match &self.return_type {
            Some(t) => write!(f, "{t}"),
            None => f.write_str("V"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_field_types() {
        assert_eq!("I".parse::<FieldType>().unwrap(), FieldType::Int);
        assert_eq!(
            "[[Ljava/lang/String;".parse::<FieldType>().unwrap(),
            FieldType::Array(Box::new(FieldType::Array(Box::new(
                FieldType::Object("java/lang/String".to_string())
            ))))
        );
        for bad in ["", "V", "Q", "II", "L;", "Ljava/lang/Object", "["] {
            assert_eq!(
                bad.parse::<FieldType>(),
                Err(ClassFormatError::InvalidDescriptor(bad.to_string())),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn can_parse_method_descriptors() {
        let main: MethodDescriptor = "([Ljava/lang/String;)V".parse().unwrap();
        assert_eq!(
            main.parameters,
            vec![FieldType::Array(Box::new(FieldType::Object(
                "java/lang/String".to_string()
            )))]
        );
        assert_eq!(main.return_type, None);
        assert_eq!(main.parameter_slots(true), 1);

        let mixed: MethodDescriptor = "(IJLjava/lang/Object;D[B)F".parse().unwrap();
        assert_eq!(mixed.parameters.len(), 5);
        assert_eq!(mixed.return_type, Some(FieldType::Float));
        assert_eq!(mixed.parameter_slots(true), 7);
        assert_eq!(mixed.parameter_slots(false), 8);
        assert_eq!(mixed.to_string(), "(IJLjava/lang/Object;D[B)F");

        let empty: MethodDescriptor = "()J".parse().unwrap();
        assert!(empty.parameters.is_empty());
        assert_eq!(empty.parameter_slots(false), 1);
    }

    #[test]
    fn rejects_malformed_method_descriptors() {
        for bad in ["", "V", "()", "(I", "(I)", "(X)V", "(I)VV", "(Ljava/lang;"] {
            assert!(bad.parse::<MethodDescriptor>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn slot_widths() {
        assert_eq!(FieldType::Long.slot_width(), 2);
        assert_eq!(FieldType::Double.slot_width(), 2);
        assert_eq!(FieldType::Boolean.slot_width(), 1);
        assert_eq!(FieldType::Array(Box::new(FieldType::Long)).slot_width(), 1);
    }
}
