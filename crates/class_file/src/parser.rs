use crate::{
    annotations::{capacity_for, Annotation, Decoder, ElementValue},
    attributes::{
        Attributes, CodeAttribute, ExceptionTableEntry, ParameterAnnotations, RecordComponent,
    },
    class_file::{FieldInfo, MethodInfo},
    constant_pool::{
        ClassInfo, CpInfo, DynamicInfo, MethodHandleInfo, MethodTypeInfo, NameAndTypeInfo,
        RefInfo,
    },
    cursor::ByteCursor,
    type_annotations::{PathLengthWidth, TypeAnnotation},
    AccessFlags, Attribute, ClassFile, ClassFileError, ConstantPool, Result,
};

const MAGIC: u32 = 0xCAFEBABE;

pub struct Parser<'a> {
    c: ByteCursor<'a>,
    decoder: Decoder,
}
impl<'a> Parser<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_decoder(bytes, Decoder::default())
    }

    pub fn with_decoder(bytes: &'a [u8], decoder: Decoder) -> Self {
        Self {
            c: ByteCursor::new(bytes),
            decoder,
        }
    }

    pub fn position(&self) -> usize {
        self.c.position()
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let version = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;

        let interfaces_count = self.read_u16()?;
        let interfaces = (0..interfaces_count)
            .map(|_| self.read_u16())
            .collect::<Result<Vec<_>>>()?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info())
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes()?;

        log::debug!(
            "parsed class file v{}.{}: {} constant(s), {} field(s), {} method(s)",
            version.0,
            version.1,
            constant_pool.len(),
            fields.len(),
            methods.len()
        );

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes()?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes()?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;

        // Entry 0 is never present; Long and Double take two slots.
        let mut count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = Vec::with_capacity(count);
        while count > 0 {
            let (cp_info, slot_size) = self.parse_cp_info()?;
            res.push(cp_info);
            (1..slot_size).for_each(|_| res.push(CpInfo::Unusable));

            count = count.saturating_sub(slot_size);
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<(CpInfo, usize)> {
        let tag = self.read_u8()?;
        let cp_info = match tag {
            1 => self.parse_utf8()?,
            3 => CpInfo::Integer(self.c.read_i32()?),
            4 => CpInfo::Float(f32::from_bits(self.read_u32()?)),
            5 => CpInfo::Long(self.c.read_u64()? as i64),
            6 => CpInfo::Double(f64::from_bits(self.c.read_u64()?)),
            7 => CpInfo::Class(ClassInfo {
                name_index: self.read_u16()?,
            }),
            8 => CpInfo::String {
                string_index: self.read_u16()?,
            },
            9 => CpInfo::FieldRef(self.parse_ref_info()?),
            10 => CpInfo::MethodRef(self.parse_ref_info()?),
            11 => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            12 => self.parse_name_and_type_info()?,
            15 => self.parse_method_handle()?,
            16 => CpInfo::MethodType(MethodTypeInfo {
                descriptor_index: self.read_u16()?,
            }),
            17 => CpInfo::Dynamic(self.parse_dynamic_info()?),
            18 => CpInfo::InvokeDynamic(self.parse_dynamic_info()?),
            19 => CpInfo::Module {
                name_index: self.read_u16()?,
            },
            20 => CpInfo::Package {
                name_index: self.read_u16()?,
            },
            _ => return Err(ClassFileError::InvalidCpInfoTag(tag)),
        };

        let slot_size = match cp_info {
            CpInfo::Long(_) | CpInfo::Double(_) => 2,
            _ => 1,
        };
        Ok((cp_info, slot_size))
    }

    // Modified UTF-8 (§4.4.7) decodes like UTF-8 for everything but NUL and supplementary
    // characters, which come out lossy.
    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let bytes = self.c.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(String::from_utf8_lossy(bytes).into()))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_dynamic_info(&mut self) -> Result<DynamicInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(DynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let info = self.c.read_bytes(attribute_length as usize)?.to_vec();

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    fn parse_attributes(&mut self) -> Result<Attributes> {
        let attributes_count = self.read_u16()?;
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    pub fn parse_code_attribute(&mut self) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.c.read_bytes(code_length as usize)?.to_vec();
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes = self.parse_attributes()?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    /// Body of `RuntimeVisibleAnnotations` / `RuntimeInvisibleAnnotations`.
    pub fn parse_annotations(&mut self) -> Result<Vec<Annotation>> {
        let num_annotations = self.read_u16()?;
        let mut annotations = Vec::with_capacity(capacity_for(num_annotations, &self.c));
        for _ in 0..num_annotations {
            annotations.push(self.decoder.annotation(&mut self.c)?);
        }
        Ok(annotations)
    }

    /// Body of `RuntimeVisibleParameterAnnotations` / `RuntimeInvisibleParameterAnnotations`.
    pub fn parse_parameter_annotations(&mut self) -> Result<ParameterAnnotations> {
        let num_parameters = self.read_u8()?;
        (0..num_parameters)
            .map(|_| self.parse_annotations())
            .collect::<Result<Vec<_>>>()
            .map(ParameterAnnotations)
    }

    /// Body of `RuntimeVisibleTypeAnnotations` / `RuntimeInvisibleTypeAnnotations`.
    ///
    /// Type paths are read with the one byte length class files use, whatever width the
    /// configured decoder has.
    pub fn parse_type_annotations(&mut self) -> Result<Vec<TypeAnnotation>> {
        let decoder = self.decoder.with_path_length(PathLengthWidth::U8);
        let num_annotations = self.read_u16()?;
        let mut annotations = Vec::with_capacity(capacity_for(num_annotations, &self.c));
        for _ in 0..num_annotations {
            annotations.push(decoder.type_annotation(&mut self.c)?);
        }
        Ok(annotations)
    }

    /// Body of `Record`.
    pub fn parse_record(&mut self) -> Result<Vec<RecordComponent>> {
        let components_count = self.read_u16()?;
        (0..components_count)
            .map(|_| self.parse_record_component())
            .collect()
    }

    fn parse_record_component(&mut self) -> Result<RecordComponent> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes()?;

        Ok(RecordComponent {
            name_index,
            descriptor_index,
            attributes,
        })
    }

    /// Body of `AnnotationDefault`.
    pub fn parse_annotation_default(&mut self) -> Result<ElementValue> {
        Ok(self.decoder.element_value(&mut self.c)?)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(self.c.read_u32()?)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(self.c.read_u16()?)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.c.read_u8()?)
    }
}
