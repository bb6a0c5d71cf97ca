use jmeta_class_file::{
    decode_type_annotation, Annotation, Argument, Bound, ByteCursor, ConstantTag, DecodeError,
    Decoder, ElementValue, ElementValuePair, Encode, LocalVar, Parser, PathLengthWidth,
    TargetInfo, TargetType, TypeAnnotation, TypePathEntry, TypePathKind,
};

fn marker(type_index: u16) -> Annotation {
    Annotation {
        type_index,
        element_value_pairs: vec![],
    }
}

fn round_trip(type_annotation: &TypeAnnotation) {
    let bytes = type_annotation.to_bytes().unwrap();
    let mut cursor = ByteCursor::new(&bytes);
    assert_eq!(
        type_annotation,
        &decode_type_annotation(&mut cursor).unwrap()
    );
    assert!(cursor.is_empty());
}

#[test]
fn test_local_variable_target() {
    let bytes = [
        0x40, // localvar
        0x00, 0x02, // table_length
        0x00, 0x04, 0x00, 0x10, 0x00, 0x01, // start_pc=4 length=16 index=1
        0x00, 0x20, 0x00, 0x08, 0x00, 0x02, // start_pc=32 length=8 index=2
        0x00, 0x00, // path_length
        0x00, 0x07, 0x00, 0x00, // @7
    ];
    let mut cursor = ByteCursor::new(&bytes);
    let type_annotation = decode_type_annotation(&mut cursor).unwrap();

    assert_eq!(TargetType::LocalVariable, type_annotation.target_type);
    assert_eq!(
        TargetInfo::LocalVarTable(vec![
            LocalVar {
                start_pc: 4,
                length: 16,
                index: 1
            },
            LocalVar {
                start_pc: 32,
                length: 8,
                index: 2
            },
        ]),
        type_annotation.target_info
    );
    assert!(type_annotation.type_path.is_empty());
    assert_eq!(marker(7), type_annotation.annotation);
    assert!(cursor.is_empty());
}

#[test]
fn test_type_parameter_bound_with_path() {
    let bytes = [
        0x11, 0x01, 0x00, // class type parameter 1, bound 0
        0x00, 0x02, // path_length
        0x03, 0x00, // type argument 0
        0x00, 0x00, // deeper array
        0x00, 0x09, 0x00, 0x01, 0x00, 0x0A, b's', 0x00, 0x0B,
    ];
    let type_annotation = decode_type_annotation(&mut ByteCursor::new(&bytes)).unwrap();

    assert_eq!(
        TargetInfo::TypeParameterBound(Bound {
            type_parameter_index: 1,
            bound_index: 0
        }),
        type_annotation.target_info
    );
    assert_eq!(
        vec![
            TypePathEntry {
                type_path_kind: TypePathKind::TypeArgument,
                type_argument_index: 0
            },
            TypePathEntry {
                type_path_kind: TypePathKind::DeeperArray,
                type_argument_index: 0
            },
        ],
        type_annotation.type_path
    );
    assert_eq!(
        vec![ElementValuePair {
            element_name_index: 10,
            value: ElementValue::ConstantValue {
                tag: ConstantTag::String,
                const_value_index: 11
            }
        }],
        type_annotation.annotation.element_value_pairs
    );
}

#[test]
fn test_round_trip_representative_targets() {
    let targets = [
        (
            TargetType::MethodTypeParameter,
            TargetInfo::TypeParameter {
                type_parameter_index: 2,
            },
        ),
        (
            TargetType::Supertype,
            TargetInfo::Supertype {
                supertype_index: 0xFFFF,
            },
        ),
        (TargetType::MethodReceiver, TargetInfo::Empty),
        (
            TargetType::MethodFormalParameter,
            TargetInfo::FormalParameter {
                formal_parameter_index: 3,
            },
        ),
        (
            TargetType::Throws,
            TargetInfo::Throws {
                throws_type_index: 1,
            },
        ),
        (TargetType::ResourceVariable, TargetInfo::LocalVarTable(vec![])),
        (
            TargetType::ExceptionParameter,
            TargetInfo::Catch {
                exception_table_index: 4,
            },
        ),
        (TargetType::New, TargetInfo::Offset { offset: 0x1234 }),
        (
            TargetType::MethodReferenceTypeArgument,
            TargetInfo::TypeArgument(Argument {
                offset: 0x0102,
                type_argument_index: 1,
            }),
        ),
    ];

    for (target_type, target_info) in targets {
        round_trip(&TypeAnnotation {
            target_type,
            target_info,
            type_path: vec![TypePathEntry {
                type_path_kind: TypePathKind::WildcardBound,
                type_argument_index: 0,
            }],
            annotation: Annotation {
                type_index: 1,
                element_value_pairs: vec![ElementValuePair {
                    element_name_index: 2,
                    value: ElementValue::ArrayValue(vec![ElementValue::AnnotationValue(
                        Box::new(marker(3)),
                    )]),
                }],
            },
        });
    }
}

#[test]
fn test_shared_shapes_keep_their_target_type() {
    let cast = TypeAnnotation {
        target_type: TargetType::Cast,
        target_info: TargetInfo::TypeArgument(Argument {
            offset: 8,
            type_argument_index: 0,
        }),
        type_path: vec![],
        annotation: marker(1),
    };
    let bytes = cast.to_bytes().unwrap();
    assert_eq!(0x47, bytes[0]);

    let decoded = decode_type_annotation(&mut ByteCursor::new(&bytes)).unwrap();
    assert_eq!(TargetType::Cast, decoded.target_type);
}

#[test]
fn test_unknown_target_type() {
    for target_type in [0x02, 0x18, 0x4C, 0x80] {
        let bytes = [target_type, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00];
        assert_eq!(
            Err(DecodeError::UnknownTargetType {
                target_type,
                offset: 0
            }),
            decode_type_annotation(&mut ByteCursor::new(&bytes))
        );
    }
}

#[test]
fn test_unknown_type_path_kind() {
    let bytes = [0x13, 0x00, 0x02, 0x00, 0x00, 0x04, 0x00, 0x00, 0x01, 0x00, 0x00];
    assert_eq!(
        Err(DecodeError::UnknownTypePathKind { kind: 4, offset: 5 }),
        decode_type_annotation(&mut ByteCursor::new(&bytes))
    );
}

#[test]
fn test_every_truncation_is_reported() {
    let type_annotation = TypeAnnotation {
        target_type: TargetType::LocalVariable,
        target_info: TargetInfo::LocalVarTable(vec![LocalVar {
            start_pc: 0,
            length: 10,
            index: 3,
        }]),
        type_path: vec![TypePathEntry {
            type_path_kind: TypePathKind::DeeperNested,
            type_argument_index: 0,
        }],
        annotation: Annotation {
            type_index: 1,
            element_value_pairs: vec![ElementValuePair {
                element_name_index: 2,
                value: ElementValue::ClassInfo {
                    class_info_index: 3,
                },
            }],
        },
    };
    let bytes = type_annotation.to_bytes().unwrap();

    for end in 0..bytes.len() {
        assert!(matches!(
            decode_type_annotation(&mut ByteCursor::new(&bytes[..end])),
            Err(DecodeError::TruncatedInput { .. })
        ));
    }
}

#[test]
fn test_attribute_body_uses_one_byte_path_length() {
    let body = [
        0x00, 0x01, // num_annotations
        0x13, // field
        0x00, // path_length
        0x00, 0x01, 0x00, 0x00, // @1
    ];
    let mut parser = Parser::new(&body);
    let type_annotations = parser.parse_type_annotations().unwrap();

    assert_eq!(
        vec![TypeAnnotation {
            target_type: TargetType::Field,
            target_info: TargetInfo::Empty,
            type_path: vec![],
            annotation: marker(1),
        }],
        type_annotations
    );
    assert_eq!(body.len(), parser.position());
}

#[test]
fn test_attribute_body_with_path_ignores_configured_width() {
    let type_annotation = TypeAnnotation {
        target_type: TargetType::MethodReturn,
        target_info: TargetInfo::Empty,
        type_path: vec![
            TypePathEntry {
                type_path_kind: TypePathKind::DeeperArray,
                type_argument_index: 0,
            },
            TypePathEntry {
                type_path_kind: TypePathKind::WildcardBound,
                type_argument_index: 0,
            },
        ],
        annotation: marker(4),
    };
    let mut body = vec![0x00, 0x01];
    type_annotation
        .encode_with_path_length(&mut body, PathLengthWidth::U8)
        .unwrap();
    assert_eq!(&[0x14, 0x02, 0x00, 0x00, 0x02, 0x00], &body[2..8]);

    let decoder = Decoder::default().with_path_length(PathLengthWidth::U16);
    let parsed = Parser::with_decoder(&body, decoder)
        .parse_type_annotations()
        .unwrap();
    assert_eq!(vec![type_annotation], parsed);
}

#[test]
fn test_decoder_path_length_width() {
    let bytes = [0x15, 0x01, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00];
    assert_eq!(PathLengthWidth::U16, Decoder::default().path_length());

    let decoder = Decoder::default().with_path_length(PathLengthWidth::U8);
    let mut cursor = ByteCursor::new(&bytes);
    let type_annotation = decoder.type_annotation(&mut cursor).unwrap();
    assert_eq!(TargetType::MethodReceiver, type_annotation.target_type);
    assert_eq!(
        vec![TypePathEntry {
            type_path_kind: TypePathKind::DeeperNested,
            type_argument_index: 0
        }],
        type_annotation.type_path
    );
    assert_eq!(marker(2), type_annotation.annotation);
    assert!(cursor.is_empty());

    // The same bytes read a two byte length of 0x0101 and run out.
    assert!(matches!(
        decode_type_annotation(&mut ByteCursor::new(&bytes)),
        Err(DecodeError::TruncatedInput { .. })
    ));
}
