// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod annotations;
pub mod attributes;
mod class_file;
#[macro_use]
pub mod constant_pool;
pub mod cursor;
pub mod encode;
mod error;
mod parser;
pub mod type_annotations;
pub mod validate;

use std::fmt;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use annotations::{
    decode_annotation, decode_element_value, Annotation, ConstantTag, ConstantType, Decoder,
    ElementValue, ElementValuePair, DEFAULT_MAX_DEPTH,
};
pub use constant_pool::{ConstantKind, ConstantPool, CpInfo, IndexOutOfRange, PoolEntry, PoolLookup};
pub use cursor::ByteCursor;
pub use encode::Encode;
pub use error::{ClassFileError, DecodeError, EncodeError};
pub use parser::Parser;
pub use type_annotations::{
    decode_type_annotation, Argument, Bound, LocalVar, PathLengthWidth, TargetInfo, TargetType,
    TypeAnnotation, TypePathEntry, TypePathKind,
};
pub use validate::{validate, validate_with_max_depth, Validate, Violation, Violations};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

pub struct Attribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}
