//! Type annotations (JVMS §4.7.20).

use crate::{
    annotations::{capacity_for, Annotation, Decoder},
    cursor::ByteCursor,
    DecodeError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub target_type: TargetType,
    pub target_info: TargetInfo,
    pub type_path: Vec<TypePathEntry>,
    pub annotation: Annotation,
}

/// Where in a declaration or expression an annotated type appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TargetType {
    ClassTypeParameter = 0x00,
    MethodTypeParameter = 0x01,
    Supertype = 0x10,
    ClassTypeParameterBound = 0x11,
    MethodTypeParameterBound = 0x12,
    Field = 0x13,
    MethodReturn = 0x14,
    MethodReceiver = 0x15,
    MethodFormalParameter = 0x16,
    Throws = 0x17,
    LocalVariable = 0x40,
    ResourceVariable = 0x41,
    ExceptionParameter = 0x42,
    Instanceof = 0x43,
    New = 0x44,
    ConstructorReference = 0x45,
    MethodReference = 0x46,
    Cast = 0x47,
    ConstructorInvocationTypeArgument = 0x48,
    MethodInvocationTypeArgument = 0x49,
    ConstructorReferenceTypeArgument = 0x4A,
    MethodReferenceTypeArgument = 0x4B,
}

/// Every assigned `target_type` byte, per JVMS Tables 4.7.20-A to 4.7.20-C.
const TARGET_TYPES: [TargetType; 22] = [
    TargetType::ClassTypeParameter,
    TargetType::MethodTypeParameter,
    TargetType::Supertype,
    TargetType::ClassTypeParameterBound,
    TargetType::MethodTypeParameterBound,
    TargetType::Field,
    TargetType::MethodReturn,
    TargetType::MethodReceiver,
    TargetType::MethodFormalParameter,
    TargetType::Throws,
    TargetType::LocalVariable,
    TargetType::ResourceVariable,
    TargetType::ExceptionParameter,
    TargetType::Instanceof,
    TargetType::New,
    TargetType::ConstructorReference,
    TargetType::MethodReference,
    TargetType::Cast,
    TargetType::ConstructorInvocationTypeArgument,
    TargetType::MethodInvocationTypeArgument,
    TargetType::ConstructorReferenceTypeArgument,
    TargetType::MethodReferenceTypeArgument,
];

impl TargetType {
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// The `target_info` layout that follows this discriminator.
    pub fn shape(self) -> TargetShape {
        match self {
            TargetType::ClassTypeParameter | TargetType::MethodTypeParameter => {
                TargetShape::TypeParameter
            }
            TargetType::Supertype => TargetShape::Supertype,
            TargetType::ClassTypeParameterBound | TargetType::MethodTypeParameterBound => {
                TargetShape::TypeParameterBound
            }
            TargetType::Field | TargetType::MethodReturn | TargetType::MethodReceiver => {
                TargetShape::Empty
            }
            TargetType::MethodFormalParameter => TargetShape::FormalParameter,
            TargetType::Throws => TargetShape::Throws,
            TargetType::LocalVariable | TargetType::ResourceVariable => TargetShape::LocalVar,
            TargetType::ExceptionParameter => TargetShape::Catch,
            TargetType::Instanceof
            | TargetType::New
            | TargetType::ConstructorReference
            | TargetType::MethodReference => TargetShape::Offset,
            TargetType::Cast
            | TargetType::ConstructorInvocationTypeArgument
            | TargetType::MethodInvocationTypeArgument
            | TargetType::ConstructorReferenceTypeArgument
            | TargetType::MethodReferenceTypeArgument => TargetShape::TypeArgument,
        }
    }
}
impl TryFrom<u8> for TargetType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TARGET_TYPES
            .iter()
            .copied()
            .find(|target_type| target_type.byte() == value)
            .ok_or(value)
    }
}

/// The layout of a `target_info` union member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetShape {
    TypeParameter,
    Supertype,
    TypeParameterBound,
    Empty,
    FormalParameter,
    Throws,
    LocalVar,
    Catch,
    Offset,
    TypeArgument,
}
impl TargetShape {
    fn parse(self, c: &mut ByteCursor<'_>) -> Result<TargetInfo, DecodeError> {
        let target_info = match self {
            TargetShape::TypeParameter => TargetInfo::TypeParameter {
                type_parameter_index: c.read_u8()?,
            },
            TargetShape::Supertype => TargetInfo::Supertype {
                supertype_index: c.read_u16()?,
            },
            TargetShape::TypeParameterBound => {
                let type_parameter_index = c.read_u8()?;
                let bound_index = c.read_u8()?;
                TargetInfo::TypeParameterBound(Bound {
                    type_parameter_index,
                    bound_index,
                })
            }
            TargetShape::Empty => TargetInfo::Empty,
            TargetShape::FormalParameter => TargetInfo::FormalParameter {
                formal_parameter_index: c.read_u8()?,
            },
            TargetShape::Throws => TargetInfo::Throws {
                throws_type_index: c.read_u16()?,
            },
            TargetShape::LocalVar => {
                let table_length = c.read_u16()?;
                let mut table = Vec::with_capacity(capacity_for(table_length, c));
                for _ in 0..table_length {
                    let start_pc = c.read_u16()?;
                    let length = c.read_u16()?;
                    let index = c.read_u16()?;
                    table.push(LocalVar {
                        start_pc,
                        length,
                        index,
                    });
                }
                TargetInfo::LocalVarTable(table)
            }
            TargetShape::Catch => TargetInfo::Catch {
                exception_table_index: c.read_u16()?,
            },
            TargetShape::Offset => TargetInfo::Offset {
                offset: c.read_u16()?,
            },
            TargetShape::TypeArgument => {
                let offset = c.read_u16()?;
                let type_argument_index = c.read_u8()?;
                TargetInfo::TypeArgument(Argument {
                    offset,
                    type_argument_index,
                })
            }
        };

        Ok(target_info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetInfo {
    TypeParameter { type_parameter_index: u8 },
    /// `0xFFFF` names the superclass, anything else an index into `interfaces`.
    Supertype { supertype_index: u16 },
    TypeParameterBound(Bound),
    Empty,
    FormalParameter { formal_parameter_index: u8 },
    /// Index into the `exception_index_table` of the `Exceptions` attribute.
    Throws { throws_type_index: u16 },
    LocalVarTable(Vec<LocalVar>),
    /// Index into the `exception_table` of the enclosing `Code` attribute.
    Catch { exception_table_index: u16 },
    Offset { offset: u16 },
    TypeArgument(Argument),
}
impl TargetInfo {
    pub fn shape(&self) -> TargetShape {
        match self {
            TargetInfo::TypeParameter { .. } => TargetShape::TypeParameter,
            TargetInfo::Supertype { .. } => TargetShape::Supertype,
            TargetInfo::TypeParameterBound(_) => TargetShape::TypeParameterBound,
            TargetInfo::Empty => TargetShape::Empty,
            TargetInfo::FormalParameter { .. } => TargetShape::FormalParameter,
            TargetInfo::Throws { .. } => TargetShape::Throws,
            TargetInfo::LocalVarTable(_) => TargetShape::LocalVar,
            TargetInfo::Catch { .. } => TargetShape::Catch,
            TargetInfo::Offset { .. } => TargetShape::Offset,
            TargetInfo::TypeArgument(_) => TargetShape::TypeArgument,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub type_parameter_index: u8,
    pub bound_index: u8,
}

/// A live range of a local variable. `start_pc + length` stays within 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVar {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argument {
    pub offset: u16,
    pub type_argument_index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypePathEntry {
    pub type_path_kind: TypePathKind,
    pub type_argument_index: u8,
}

/// Width of the `path_length` field that precedes a type path.
///
/// Class-file attributes store it in one byte. The standalone type annotation encoding
/// uses two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathLengthWidth {
    U8,
    U16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypePathKind {
    DeeperArray = 0,
    DeeperNested = 1,
    WildcardBound = 2,
    TypeArgument = 3,
}
impl TryFrom<u8> for TypePathKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TypePathKind::DeeperArray),
            1 => Ok(TypePathKind::DeeperNested),
            2 => Ok(TypePathKind::WildcardBound),
            3 => Ok(TypePathKind::TypeArgument),
            _ => Err(value),
        }
    }
}

impl Decoder {
    pub fn type_annotation(&self, c: &mut ByteCursor<'_>) -> Result<TypeAnnotation, DecodeError> {
        let offset = c.position();
        let target_type = TargetType::try_from(c.read_u8()?)
            .map_err(|target_type| DecodeError::UnknownTargetType { target_type, offset })?;
        let target_info = target_type.shape().parse(c)?;

        let path_length = match self.path_length() {
            PathLengthWidth::U8 => u16::from(c.read_u8()?),
            PathLengthWidth::U16 => c.read_u16()?,
        };
        let mut type_path = Vec::with_capacity(capacity_for(path_length, c));
        for _ in 0..path_length {
            type_path.push(parse_type_path_entry(c)?);
        }

        let annotation = self.parse_annotation(c, 0)?;

        log::trace!(
            "type annotation {:?} with {} path entr(ies)",
            target_type,
            type_path.len()
        );

        Ok(TypeAnnotation {
            target_type,
            target_info,
            type_path,
            annotation,
        })
    }
}

fn parse_type_path_entry(c: &mut ByteCursor<'_>) -> Result<TypePathEntry, DecodeError> {
    let offset = c.position();
    let type_path_kind = TypePathKind::try_from(c.read_u8()?)
        .map_err(|kind| DecodeError::UnknownTypePathKind { kind, offset })?;
    let type_argument_index = c.read_u8()?;

    Ok(TypePathEntry {
        type_path_kind,
        type_argument_index,
    })
}

pub fn decode_type_annotation(cursor: &mut ByteCursor<'_>) -> Result<TypeAnnotation, DecodeError> {
    Decoder::default().type_annotation(cursor)
}
