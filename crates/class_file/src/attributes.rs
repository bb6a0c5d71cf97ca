use crate::{
    annotations::{Annotation, ElementValue},
    constant_pool::CpInfo,
    parser::Parser,
    type_annotations::TypeAnnotation,
    validate::{Validate, Validator},
    Attribute, ClassFileError, ConstantPool, PoolLookup, Result,
};

pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
pub const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";
pub const RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS: &str = "RuntimeVisibleParameterAnnotations";
pub const RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS: &str = "RuntimeInvisibleParameterAnnotations";
pub const RUNTIME_VISIBLE_TYPE_ANNOTATIONS: &str = "RuntimeVisibleTypeAnnotations";
pub const RUNTIME_INVISIBLE_TYPE_ANNOTATIONS: &str = "RuntimeInvisibleTypeAnnotations";
pub const ANNOTATION_DEFAULT: &str = "AnnotationDefault";
pub const CODE: &str = "Code";
pub const RECORD: &str = "Record";

/// The attribute table of a class, field, method or `Code` attribute.
///
/// The typed accessors find an attribute by name and decode its body on demand. A body that
/// decodes without using every declared byte is an error.
#[derive(Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.0.iter().find(|a| {
            matches!(
                constant_pool.entry(a.attribute_name_index),
                Ok(CpInfo::Utf8(s)) if s == name
            )
        })
    }

    pub fn code_attribute(&self, constant_pool: &ConstantPool) -> Result<Option<CodeAttribute>> {
        self.decode(CODE, constant_pool, Parser::parse_code_attribute)
    }

    pub fn runtime_visible_annotations(
        &self,
        constant_pool: &ConstantPool,
    ) -> Result<Option<Vec<Annotation>>> {
        self.decode(
            RUNTIME_VISIBLE_ANNOTATIONS,
            constant_pool,
            Parser::parse_annotations,
        )
    }

    pub fn runtime_invisible_annotations(
        &self,
        constant_pool: &ConstantPool,
    ) -> Result<Option<Vec<Annotation>>> {
        self.decode(
            RUNTIME_INVISIBLE_ANNOTATIONS,
            constant_pool,
            Parser::parse_annotations,
        )
    }

    pub fn runtime_visible_parameter_annotations(
        &self,
        constant_pool: &ConstantPool,
    ) -> Result<Option<ParameterAnnotations>> {
        self.decode(
            RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS,
            constant_pool,
            Parser::parse_parameter_annotations,
        )
    }

    pub fn runtime_invisible_parameter_annotations(
        &self,
        constant_pool: &ConstantPool,
    ) -> Result<Option<ParameterAnnotations>> {
        self.decode(
            RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS,
            constant_pool,
            Parser::parse_parameter_annotations,
        )
    }

    pub fn runtime_visible_type_annotations(
        &self,
        constant_pool: &ConstantPool,
    ) -> Result<Option<Vec<TypeAnnotation>>> {
        self.decode(
            RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
            constant_pool,
            Parser::parse_type_annotations,
        )
    }

    pub fn runtime_invisible_type_annotations(
        &self,
        constant_pool: &ConstantPool,
    ) -> Result<Option<Vec<TypeAnnotation>>> {
        self.decode(
            RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
            constant_pool,
            Parser::parse_type_annotations,
        )
    }

    /// Components of a `Record` attribute. Each component carries its own attribute table, so
    /// its annotations are read through the same accessors.
    pub fn record(&self, constant_pool: &ConstantPool) -> Result<Option<Vec<RecordComponent>>> {
        self.decode(RECORD, constant_pool, Parser::parse_record)
    }

    pub fn annotation_default(&self, constant_pool: &ConstantPool) -> Result<Option<ElementValue>> {
        self.decode(
            ANNOTATION_DEFAULT,
            constant_pool,
            Parser::parse_annotation_default,
        )
    }

    fn decode<'a, T>(
        &'a self,
        name: &'static str,
        constant_pool: &ConstantPool,
        parse: impl FnOnce(&mut Parser<'a>) -> Result<T>,
    ) -> Result<Option<T>> {
        let Some(attribute) = self.find_by_name(name, constant_pool) else {
            return Ok(None);
        };

        let mut parser = Parser::new(&attribute.info);
        let value = parse(&mut parser)?;
        if parser.position() != attribute.info.len() {
            return Err(ClassFileError::AttributeLengthMismatch {
                name,
                length: attribute.info.len(),
                consumed: parser.position(),
            });
        }

        log::debug!("decoded {} ({} bytes)", name, attribute.info.len());
        Ok(Some(value))
    }
}

#[derive(Debug)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}

#[derive(Debug)]
pub struct RecordComponent {
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

/// One annotation list per formal parameter, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterAnnotations(pub Vec<Vec<Annotation>>);
impl Validate for ParameterAnnotations {
    fn validate_into<P: PoolLookup + ?Sized>(&self, v: &mut Validator<'_, P>) {
        self.0.validate_into(v);
    }
}
