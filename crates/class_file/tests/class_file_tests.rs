use std::thread;

use jmeta_class_file::{
    attributes::ParameterAnnotations, validate, AccessFlags, Annotation, ClassFile,
    ClassFileError, ConstantTag, CpInfo, DecodeError, ElementValue, ElementValuePair, PoolLookup,
    TargetInfo, TargetType,
};

#[derive(Default)]
struct ClassBuilder {
    bytes: Vec<u8>,
}
impl ClassBuilder {
    fn u8(mut self, v: u8) -> Self {
        self.bytes.push(v);
        self
    }

    fn u16(mut self, v: u16) -> Self {
        self.bytes.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn u32(mut self, v: u32) -> Self {
        self.bytes.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn raw(mut self, v: &[u8]) -> Self {
        self.bytes.extend_from_slice(v);
        self
    }

    fn utf8(self, s: &str) -> Self {
        self.u8(1).u16(s.len() as u16).raw(s.as_bytes())
    }

    fn attribute(self, name_index: u16, body: &[u8]) -> Self {
        self.u16(name_index).u32(body.len() as u32).raw(body)
    }
}

const ANNOTATION_DEFAULT: [u8; 3] = [b'I', 0x00, 0x08];

/// `@interface my/Annotated` with a `value()` default, an annotated method parameter, and
/// class level annotations.
fn annotated_class(annotation_default: &[u8]) -> Vec<u8> {
    ClassBuilder::default()
        .u32(0xCAFEBABE)
        .u16(0)
        .u16(61)
        .u16(21)
        .utf8("my/Annotated") // 1
        .u8(7)
        .u16(1) // 2
        .utf8("java/lang/Object") // 3
        .u8(7)
        .u16(3) // 4
        .utf8("value") // 5
        .utf8("()I") // 6
        .utf8("AnnotationDefault") // 7
        .u8(3)
        .u32(42) // 8
        .utf8("RuntimeVisibleAnnotations") // 9
        .utf8("Lmy/Marker;") // 10
        .u8(5)
        .u32(0)
        .u32(7) // 11, 12
        .utf8("RuntimeInvisibleParameterAnnotations") // 13
        .utf8("(J)V") // 14
        .utf8("take") // 15
        .utf8("RuntimeVisibleTypeAnnotations") // 16
        .u8(6)
        .raw(&1.5f64.to_be_bytes()) // 17, 18
        .u8(4)
        .raw(&2.5f32.to_be_bytes()) // 19
        .utf8("Record") // 20
        .u16(0x2601)
        .u16(2)
        .u16(4)
        .u16(0) // interfaces
        .u16(0) // fields
        .u16(2) // methods
        .u16(0x0401)
        .u16(5)
        .u16(6)
        .u16(1)
        .attribute(7, annotation_default)
        .u16(0x0001)
        .u16(15)
        .u16(14)
        .u16(1)
        .attribute(13, &[0x01, 0x00, 0x01, 0x00, 0x0A, 0x00, 0x00])
        .u16(3) // class attributes
        .attribute(
            9,
            &[0x00, 0x01, 0x00, 0x0A, 0x00, 0x01, 0x00, 0x05, b'J', 0x00, 0x0B],
        )
        .attribute(
            16,
            &[0x00, 0x01, 0x10, 0xFF, 0xFF, 0x00, 0x00, 0x0A, 0x00, 0x00],
        )
        .attribute(
            20,
            &[
                0x00, 0x01, // components_count
                0x00, 0x05, 0x00, 0x0A, // value Lmy/Marker;
                0x00, 0x02, // attributes_count
                0x00, 0x09, 0x00, 0x00, 0x00, 0x06, // RuntimeVisibleAnnotations
                0x00, 0x01, 0x00, 0x0A, 0x00, 0x00, //
                0x00, 0x10, 0x00, 0x00, 0x00, 0x08, // RuntimeVisibleTypeAnnotations
                0x00, 0x01, 0x13, 0x00, 0x00, 0x0A, 0x00, 0x00,
            ],
        )
        .bytes
}

fn with_class_file(f: impl FnOnce(ClassFile)) {
    f(ClassFile::parse(&annotated_class(&ANNOTATION_DEFAULT)).unwrap());
}

fn marker() -> Annotation {
    Annotation {
        type_index: 10,
        element_value_pairs: vec![],
    }
}

#[test]
fn test_class_name() {
    with_class_file(|class_file| {
        assert_eq!("my/Annotated", class_file.class_name().unwrap());
        assert_eq!(Some("java/lang/Object"), class_file.super_class().unwrap());
        assert_eq!((61, 0), class_file.version);
    });
}

#[test]
fn test_access_flags() {
    with_class_file(|class_file| {
        assert!(class_file
            .access_flags
            .contains(AccessFlags::ANNOTATION | AccessFlags::INTERFACE));
        assert_eq!(
            AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
            class_file.methods[0].access_flags
        );
    });
}

#[test]
fn test_method_names() {
    with_class_file(|class_file| {
        assert_eq!("value", class_file.method_name(&class_file.methods[0]).unwrap());
        assert_eq!(
            "(J)V",
            class_file
                .method_descriptor(&class_file.methods[1])
                .unwrap()
        );
    });
}

#[test]
fn test_wide_constants_take_two_slots() {
    with_class_file(|class_file| {
        let pool = &class_file.constant_pool;
        assert_eq!(20, pool.pool_size());
        assert_eq!(Ok(&CpInfo::Long(7)), pool.entry(11));
        assert_eq!(Ok(&CpInfo::Unusable), pool.entry(12));
        assert_eq!(Ok(&CpInfo::Double(1.5)), pool.entry(17));
        assert_eq!(Ok(&CpInfo::Float(2.5)), pool.entry(19));
    });
}

#[test]
fn test_annotation_default() {
    with_class_file(|class_file| {
        let default = class_file.methods[0]
            .attributes
            .annotation_default(&class_file.constant_pool)
            .unwrap()
            .unwrap();
        assert_eq!(
            ElementValue::ConstantValue {
                tag: ConstantTag::Int,
                const_value_index: 8
            },
            default
        );
        assert_eq!(Ok(()), validate(&default, &class_file.constant_pool));
    });
}

#[test]
fn test_class_annotations() {
    with_class_file(|class_file| {
        let annotations = class_file
            .attributes
            .runtime_visible_annotations(&class_file.constant_pool)
            .unwrap()
            .unwrap();
        assert_eq!(
            vec![Annotation {
                type_index: 10,
                element_value_pairs: vec![ElementValuePair {
                    element_name_index: 5,
                    value: ElementValue::ConstantValue {
                        tag: ConstantTag::Long,
                        const_value_index: 11
                    }
                }]
            }],
            annotations
        );
        assert_eq!(Ok(()), validate(&annotations, &class_file.constant_pool));
    });
}

#[test]
fn test_parameter_annotations() {
    with_class_file(|class_file| {
        let attributes = &class_file.methods[1].attributes;
        assert_eq!(
            Some(ParameterAnnotations(vec![vec![marker()]])),
            attributes
                .runtime_invisible_parameter_annotations(&class_file.constant_pool)
                .unwrap()
        );
        assert!(attributes
            .runtime_visible_parameter_annotations(&class_file.constant_pool)
            .unwrap()
            .is_none());
    });
}

#[test]
fn test_type_annotations() {
    with_class_file(|class_file| {
        let type_annotations = class_file
            .attributes
            .runtime_visible_type_annotations(&class_file.constant_pool)
            .unwrap()
            .unwrap();
        assert_eq!(1, type_annotations.len());
        assert_eq!(TargetType::Supertype, type_annotations[0].target_type);
        assert_eq!(
            TargetInfo::Supertype {
                supertype_index: 0xFFFF
            },
            type_annotations[0].target_info
        );
        assert_eq!(marker(), type_annotations[0].annotation);
        assert!(class_file
            .attributes
            .runtime_invisible_type_annotations(&class_file.constant_pool)
            .unwrap()
            .is_none());
    });
}

#[test]
fn test_record_component_annotations() {
    with_class_file(|class_file| {
        let pool = &class_file.constant_pool;
        let components = class_file.attributes.record(pool).unwrap().unwrap();
        assert_eq!(1, components.len());

        let component = &components[0];
        assert_eq!("value", pool.utf8(component.name_index).unwrap());
        assert_eq!("Lmy/Marker;", pool.utf8(component.descriptor_index).unwrap());
        assert_eq!(
            Some(vec![marker()]),
            component.attributes.runtime_visible_annotations(pool).unwrap()
        );

        let type_annotations = component
            .attributes
            .runtime_visible_type_annotations(pool)
            .unwrap()
            .unwrap();
        assert_eq!(TargetType::Field, type_annotations[0].target_type);
        assert_eq!(TargetInfo::Empty, type_annotations[0].target_info);
        assert_eq!(Ok(()), validate(&type_annotations, pool));
    });
}

#[test]
fn test_attribute_with_trailing_bytes() {
    let class_file = ClassFile::parse(&annotated_class(&[b'I', 0x00, 0x08, 0x00])).unwrap();
    let err = class_file.methods[0]
        .attributes
        .annotation_default(&class_file.constant_pool)
        .unwrap_err();
    assert!(matches!(
        err,
        ClassFileError::AttributeLengthMismatch {
            name: "AnnotationDefault",
            length: 4,
            consumed: 3
        }
    ));
}

#[test]
fn test_malformed_attribute_body() {
    let class_file = ClassFile::parse(&annotated_class(&[b'%', 0x00, 0x08])).unwrap();
    let err = class_file.methods[0]
        .attributes
        .annotation_default(&class_file.constant_pool)
        .unwrap_err();
    assert!(matches!(
        err,
        ClassFileError::Decode(DecodeError::UnknownElementValueTag {
            tag: b'%',
            offset: 0
        })
    ));
}

#[test]
fn test_truncated_class_file() {
    let bytes = annotated_class(&ANNOTATION_DEFAULT);
    assert!(matches!(
        ClassFile::parse(&bytes[..bytes.len() - 1]),
        Err(ClassFileError::Decode(DecodeError::TruncatedInput { .. }))
    ));
}

#[test]
fn test_invalid_magic() {
    let mut bytes = annotated_class(&ANNOTATION_DEFAULT);
    bytes[0] = 0xCB;
    assert!(matches!(
        ClassFile::parse(&bytes),
        Err(ClassFileError::InvalidMagicIdentifier(0xCBFEBABE))
    ));
}

#[test]
fn test_shared_pool_across_threads() {
    with_class_file(|class_file| {
        let pool = &class_file.constant_pool;
        let attributes = [&class_file.attributes, &class_file.methods[0].attributes];

        thread::scope(|s| {
            let class_level = s.spawn(|| {
                let annotations = attributes[0].runtime_visible_annotations(pool).unwrap();
                validate(&annotations.unwrap(), pool)
            });
            let method_level = s.spawn(|| {
                let default = attributes[1].annotation_default(pool).unwrap();
                validate(&default.unwrap(), pool)
            });

            assert_eq!(Ok(()), class_level.join().unwrap());
            assert_eq!(Ok(()), method_level.join().unwrap());
        });
    });
}
