//! Byte encoding for annotation structures, the inverse of the decoders.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::{
    annotations::{Annotation, ElementValue, ElementValuePair},
    type_annotations::{PathLengthWidth, TargetInfo, TypeAnnotation, TypePathEntry},
    EncodeError,
};

type Endian = BigEndian;

pub trait Encode {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError>;

    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.encode(&mut out)?;
        Ok(out)
    }
}

fn write_count<W: Write>(w: &mut W, what: &'static str, len: usize) -> Result<(), EncodeError> {
    let count = u16::try_from(len).map_err(|_| EncodeError::LengthOverflow { what, len })?;
    w.write_u16::<Endian>(count)?;
    Ok(())
}

impl Encode for ElementValue {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError> {
        w.write_u8(self.tag().byte())?;
        match self {
            ElementValue::ConstantValue {
                const_value_index, ..
            } => w.write_u16::<Endian>(*const_value_index)?,
            ElementValue::EnumConstantValue {
                type_name_index,
                const_name_index,
            } => {
                w.write_u16::<Endian>(*type_name_index)?;
                w.write_u16::<Endian>(*const_name_index)?;
            }
            ElementValue::ClassInfo { class_info_index } => {
                w.write_u16::<Endian>(*class_info_index)?
            }
            ElementValue::AnnotationValue(annotation) => annotation.encode(w)?,
            ElementValue::ArrayValue(values) => {
                write_count(w, "array values", values.len())?;
                for value in values {
                    value.encode(w)?;
                }
            }
        }
        Ok(())
    }
}

impl Encode for ElementValuePair {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError> {
        w.write_u16::<Endian>(self.element_name_index)?;
        self.value.encode(w)
    }
}

impl Encode for Annotation {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError> {
        w.write_u16::<Endian>(self.type_index)?;
        write_count(w, "element value pairs", self.element_value_pairs.len())?;
        for pair in &self.element_value_pairs {
            pair.encode(w)?;
        }
        Ok(())
    }
}

impl Encode for TargetInfo {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError> {
        match self {
            TargetInfo::TypeParameter {
                type_parameter_index,
            } => w.write_u8(*type_parameter_index)?,
            TargetInfo::Supertype { supertype_index } => w.write_u16::<Endian>(*supertype_index)?,
            TargetInfo::TypeParameterBound(bound) => {
                w.write_u8(bound.type_parameter_index)?;
                w.write_u8(bound.bound_index)?;
            }
            TargetInfo::Empty => {}
            TargetInfo::FormalParameter {
                formal_parameter_index,
            } => w.write_u8(*formal_parameter_index)?,
            TargetInfo::Throws { throws_type_index } => {
                w.write_u16::<Endian>(*throws_type_index)?
            }
            TargetInfo::LocalVarTable(table) => {
                write_count(w, "local variable ranges", table.len())?;
                for local_var in table {
                    w.write_u16::<Endian>(local_var.start_pc)?;
                    w.write_u16::<Endian>(local_var.length)?;
                    w.write_u16::<Endian>(local_var.index)?;
                }
            }
            TargetInfo::Catch {
                exception_table_index,
            } => w.write_u16::<Endian>(*exception_table_index)?,
            TargetInfo::Offset { offset } => w.write_u16::<Endian>(*offset)?,
            TargetInfo::TypeArgument(argument) => {
                w.write_u16::<Endian>(argument.offset)?;
                w.write_u8(argument.type_argument_index)?;
            }
        }
        Ok(())
    }
}

impl Encode for TypePathEntry {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError> {
        w.write_u8(self.type_path_kind as u8)?;
        w.write_u8(self.type_argument_index)?;
        Ok(())
    }
}

impl Encode for TypeAnnotation {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError> {
        self.encode_with_path_length(w, PathLengthWidth::U16)
    }
}

impl TypeAnnotation {
    /// Like [`Encode::encode`], with an explicit `path_length` width. Class-file attribute
    /// bodies use [`PathLengthWidth::U8`].
    pub fn encode_with_path_length<W: Write>(
        &self,
        w: &mut W,
        path_length: PathLengthWidth,
    ) -> Result<(), EncodeError> {
        w.write_u8(self.target_type.byte())?;
        self.target_info.encode(w)?;

        let what = "type path entries";
        let len = self.type_path.len();
        match path_length {
            PathLengthWidth::U8 => {
                let count =
                    u8::try_from(len).map_err(|_| EncodeError::LengthOverflow { what, len })?;
                w.write_u8(count)?;
            }
            PathLengthWidth::U16 => write_count(w, what, len)?,
        }
        for entry in &self.type_path {
            entry.encode(w)?;
        }
        self.annotation.encode(w)
    }
}
