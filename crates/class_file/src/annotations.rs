//! Annotations and their element values (JVMS §4.7.16).
//!
//! Decoding is a pure pass over the bytes: constant pool indices are read but not checked.
//! Index and kind checks happen later in [`crate::validate`].

use crate::{cursor::ByteCursor, type_annotations::PathLengthWidth, DecodeError};

/// Default bound on `ArrayValue`/`AnnotationValue` nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Field descriptor of the annotation interface, as a `CONSTANT_Utf8_info` index.
    pub type_index: u16,
    /// Pairs in encoded order. Duplicate names are kept.
    pub element_value_pairs: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementValuePair {
    pub element_name_index: u16,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    ConstantValue {
        tag: ConstantTag,
        const_value_index: u16,
    },
    EnumConstantValue {
        type_name_index: u16,
        const_name_index: u16,
    },
    ClassInfo {
        class_info_index: u16,
    },
    AnnotationValue(Box<Annotation>),
    ArrayValue(Vec<ElementValue>),
}
impl ElementValue {
    pub fn tag(&self) -> ElementTag {
        match self {
            ElementValue::ConstantValue { tag, .. } => ElementTag::Constant(*tag),
            ElementValue::EnumConstantValue { .. } => ElementTag::Enum,
            ElementValue::ClassInfo { .. } => ElementTag::Class,
            ElementValue::AnnotationValue(_) => ElementTag::Annotation,
            ElementValue::ArrayValue(_) => ElementTag::Array,
        }
    }
}

/// The declared kind of a `ConstantValue`, which decides the constant pool entry it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantType {
    Integer,
    Double,
    Float,
    Long,
    Utf8,
}

/// The exact tag byte of a `ConstantValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantTag {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    String,
}
impl ConstantTag {
    pub fn constant_type(self) -> ConstantType {
        match self {
            ConstantTag::Byte
            | ConstantTag::Char
            | ConstantTag::Int
            | ConstantTag::Short
            | ConstantTag::Boolean => ConstantType::Integer,
            ConstantTag::Double => ConstantType::Double,
            ConstantTag::Float => ConstantType::Float,
            ConstantTag::Long => ConstantType::Long,
            ConstantTag::String => ConstantType::Utf8,
        }
    }
}

/// Leading discriminator of an element value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementTag {
    Constant(ConstantTag),
    Enum,
    Class,
    Annotation,
    Array,
}
impl ElementTag {
    pub fn byte(self) -> u8 {
        match self {
            ElementTag::Constant(ConstantTag::Byte) => b'B',
            ElementTag::Constant(ConstantTag::Char) => b'C',
            ElementTag::Constant(ConstantTag::Double) => b'D',
            ElementTag::Constant(ConstantTag::Float) => b'F',
            ElementTag::Constant(ConstantTag::Int) => b'I',
            ElementTag::Constant(ConstantTag::Long) => b'J',
            ElementTag::Constant(ConstantTag::Short) => b'S',
            ElementTag::Constant(ConstantTag::Boolean) => b'Z',
            ElementTag::Constant(ConstantTag::String) => b's',
            ElementTag::Enum => b'e',
            ElementTag::Class => b'c',
            ElementTag::Annotation => b'@',
            ElementTag::Array => b'[',
        }
    }
}
impl TryFrom<u8> for ElementTag {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'B' => Ok(ElementTag::Constant(ConstantTag::Byte)),
            b'C' => Ok(ElementTag::Constant(ConstantTag::Char)),
            b'D' => Ok(ElementTag::Constant(ConstantTag::Double)),
            b'F' => Ok(ElementTag::Constant(ConstantTag::Float)),
            b'I' => Ok(ElementTag::Constant(ConstantTag::Int)),
            b'J' => Ok(ElementTag::Constant(ConstantTag::Long)),
            b'S' => Ok(ElementTag::Constant(ConstantTag::Short)),
            b'Z' => Ok(ElementTag::Constant(ConstantTag::Boolean)),
            b's' => Ok(ElementTag::Constant(ConstantTag::String)),
            b'e' => Ok(ElementTag::Enum),
            b'c' => Ok(ElementTag::Class),
            b'@' => Ok(ElementTag::Annotation),
            b'[' => Ok(ElementTag::Array),
            _ => Err(value),
        }
    }
}

/// Decodes annotation structures with a fixed nesting bound.
///
/// A `Decoder` holds no state besides its configuration, so one value can be shared by any
/// number of threads each decoding their own byte range. The default reads a two byte type
/// path length; [`Decoder::with_path_length`] selects the one byte class-file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    max_depth: usize,
    path_length: PathLengthWidth,
}
impl Default for Decoder {
    fn default() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }
}
impl Decoder {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            path_length: PathLengthWidth::U16,
        }
    }

    pub fn with_path_length(self, path_length: PathLengthWidth) -> Self {
        Self {
            path_length,
            ..self
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn path_length(&self) -> PathLengthWidth {
        self.path_length
    }

    pub fn element_value(&self, c: &mut ByteCursor<'_>) -> Result<ElementValue, DecodeError> {
        self.parse_element_value(c, 0)
    }

    pub fn annotation(&self, c: &mut ByteCursor<'_>) -> Result<Annotation, DecodeError> {
        self.parse_annotation(c, 0)
    }

    /// `depth` counts the `ArrayValue`/`AnnotationValue` nodes enclosing the value being read.
    fn parse_element_value(
        &self,
        c: &mut ByteCursor<'_>,
        depth: usize,
    ) -> Result<ElementValue, DecodeError> {
        let offset = c.position();
        let tag = c.read_u8()?;
        let tag = ElementTag::try_from(tag)
            .map_err(|tag| DecodeError::UnknownElementValueTag { tag, offset })?;

        let value = match tag {
            ElementTag::Constant(tag) => ElementValue::ConstantValue {
                tag,
                const_value_index: c.read_u16()?,
            },
            ElementTag::Enum => {
                let type_name_index = c.read_u16()?;
                let const_name_index = c.read_u16()?;
                ElementValue::EnumConstantValue {
                    type_name_index,
                    const_name_index,
                }
            }
            ElementTag::Class => ElementValue::ClassInfo {
                class_info_index: c.read_u16()?,
            },
            ElementTag::Annotation => {
                let depth = self.enter(depth, offset)?;
                ElementValue::AnnotationValue(Box::new(self.parse_annotation(c, depth)?))
            }
            ElementTag::Array => {
                let depth = self.enter(depth, offset)?;
                let num_values = c.read_u16()?;
                let mut values = Vec::with_capacity(capacity_for(num_values, c));
                for _ in 0..num_values {
                    values.push(self.parse_element_value(c, depth)?);
                }
                ElementValue::ArrayValue(values)
            }
        };

        Ok(value)
    }

    pub(crate) fn parse_annotation(
        &self,
        c: &mut ByteCursor<'_>,
        depth: usize,
    ) -> Result<Annotation, DecodeError> {
        let type_index = c.read_u16()?;
        let num_pairs = c.read_u16()?;

        let mut element_value_pairs = Vec::with_capacity(capacity_for(num_pairs, c));
        for _ in 0..num_pairs {
            let element_name_index = c.read_u16()?;
            let value = self.parse_element_value(c, depth)?;
            element_value_pairs.push(ElementValuePair {
                element_name_index,
                value,
            });
        }

        log::trace!(
            "annotation type_index={} with {} pair(s) at depth {}",
            type_index,
            num_pairs,
            depth
        );

        Ok(Annotation {
            type_index,
            element_value_pairs,
        })
    }

    fn enter(&self, depth: usize, offset: usize) -> Result<usize, DecodeError> {
        if depth >= self.max_depth {
            return Err(DecodeError::MaxDepthExceeded {
                max_depth: self.max_depth,
                offset,
            });
        }
        Ok(depth + 1)
    }
}

/// Caps preallocation by what the remaining input could possibly hold.
pub(crate) fn capacity_for(count: u16, c: &ByteCursor<'_>) -> usize {
    (count as usize).min(c.remaining())
}

pub fn decode_element_value(cursor: &mut ByteCursor<'_>) -> Result<ElementValue, DecodeError> {
    Decoder::default().element_value(cursor)
}

pub fn decode_annotation(cursor: &mut ByteCursor<'_>) -> Result<Annotation, DecodeError> {
    Decoder::default().annotation(cursor)
}
