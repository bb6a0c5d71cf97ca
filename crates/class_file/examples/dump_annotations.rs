use std::{env, fs, process};

use jmeta_class_file::{
    attributes::{
        Attributes, ANNOTATION_DEFAULT, RECORD, RUNTIME_INVISIBLE_ANNOTATIONS,
        RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS, RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
        RUNTIME_VISIBLE_ANNOTATIONS, RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS,
        RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
    },
    validate, Annotation, ClassFile, ConstantPool, ElementValue, Validate,
};

fn main() {
    pretty_env_logger::init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: dump_annotations <file.class>");
        process::exit(1);
    };

    let bytes = fs::read(&path).unwrap_or_else(|e| {
        eprintln!("{}: {}", path, e);
        process::exit(1);
    });
    let class_file = ClassFile::parse(&bytes).unwrap_or_else(|e| {
        eprintln!("{}: {}", path, e);
        process::exit(1);
    });

    let pool = &class_file.constant_pool;
    println!("Class: {}", class_file.class_name().unwrap_or("<invalid>"));
    dump(&class_file.attributes, pool, 1);

    for field in &class_file.fields {
        println!(
            "  Field: {}",
            class_file.field_name(field).unwrap_or("<invalid>")
        );
        dump(&field.attributes, pool, 2);
    }

    for method in &class_file.methods {
        println!(
            "  Method: {}{}",
            class_file.method_name(method).unwrap_or("<invalid>"),
            class_file.method_descriptor(method).unwrap_or("")
        );
        dump(&method.attributes, pool, 2);

        match method.attributes.code_attribute(pool) {
            Ok(Some(code)) => dump(&code.attributes, pool, 3),
            Ok(None) => {}
            Err(e) => log::warn!("Code: {}", e),
        }
    }
}

fn dump(attributes: &Attributes, pool: &ConstantPool, indent: usize) {
    let pad = "  ".repeat(indent);

    let annotations = [
        (
            RUNTIME_VISIBLE_ANNOTATIONS,
            attributes.runtime_visible_annotations(pool),
        ),
        (
            RUNTIME_INVISIBLE_ANNOTATIONS,
            attributes.runtime_invisible_annotations(pool),
        ),
    ];
    for (name, result) in annotations {
        match result {
            Ok(Some(annotations)) => {
                for annotation in &annotations {
                    println!("{}@{}", pad, render_annotation(annotation, pool));
                }
                report(&annotations, pool);
            }
            Ok(None) => {}
            Err(e) => log::warn!("{}: {}", name, e),
        }
    }

    let parameter_annotations = [
        (
            RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS,
            attributes.runtime_visible_parameter_annotations(pool),
        ),
        (
            RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS,
            attributes.runtime_invisible_parameter_annotations(pool),
        ),
    ];
    for (name, result) in parameter_annotations {
        match result {
            Ok(Some(parameters)) => {
                for (i, annotations) in parameters.0.iter().enumerate() {
                    for annotation in annotations {
                        println!("{}param {}: @{}", pad, i, render_annotation(annotation, pool));
                    }
                }
                report(&parameters, pool);
            }
            Ok(None) => {}
            Err(e) => log::warn!("{}: {}", name, e),
        }
    }

    let type_annotations = [
        (
            RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
            attributes.runtime_visible_type_annotations(pool),
        ),
        (
            RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
            attributes.runtime_invisible_type_annotations(pool),
        ),
    ];
    for (name, result) in type_annotations {
        match result {
            Ok(Some(type_annotations)) => {
                for t in &type_annotations {
                    println!(
                        "{}{:?} {:?} @{}",
                        pad,
                        t.target_type,
                        t.target_info,
                        render_annotation(&t.annotation, pool)
                    );
                }
                report(&type_annotations, pool);
            }
            Ok(None) => {}
            Err(e) => log::warn!("{}: {}", name, e),
        }
    }

    match attributes.annotation_default(pool) {
        Ok(Some(value)) => {
            println!("{}default {}", pad, render_value(&value, pool));
            report(&value, pool);
        }
        Ok(None) => {}
        Err(e) => log::warn!("{}: {}", ANNOTATION_DEFAULT, e),
    }

    match attributes.record(pool) {
        Ok(Some(components)) => {
            for component in &components {
                println!(
                    "{}Component: {} {}",
                    pad,
                    name(pool, component.name_index),
                    name(pool, component.descriptor_index)
                );
                dump(&component.attributes, pool, indent + 1);
            }
        }
        Ok(None) => {}
        Err(e) => log::warn!("{}: {}", RECORD, e),
    }
}

fn report<T: Validate + ?Sized>(tree: &T, pool: &ConstantPool) {
    if let Err(violations) = validate(tree, pool) {
        log::warn!("{}", violations);
    }
}

fn name(pool: &ConstantPool, index: u16) -> String {
    pool.utf8(index)
        .map(str::to_owned)
        .unwrap_or_else(|_| format!("#{}", index))
}

fn render_annotation(annotation: &Annotation, pool: &ConstantPool) -> String {
    let pairs = annotation
        .element_value_pairs
        .iter()
        .map(|p| {
            format!(
                "{}={}",
                name(pool, p.element_name_index),
                render_value(&p.value, pool)
            )
        })
        .collect::<Vec<_>>();
    format!("{}({})", name(pool, annotation.type_index), pairs.join(", "))
}

fn render_value(value: &ElementValue, pool: &ConstantPool) -> String {
    match value {
        ElementValue::ConstantValue {
            const_value_index, ..
        } => match pool.entry(*const_value_index) {
            Ok(entry) => format!("{:?}", entry),
            Err(_) => format!("#{}", const_value_index),
        },
        ElementValue::EnumConstantValue {
            type_name_index,
            const_name_index,
        } => format!(
            "{}.{}",
            name(pool, *type_name_index),
            name(pool, *const_name_index)
        ),
        ElementValue::ClassInfo { class_info_index } => {
            format!("{}.class", name(pool, *class_info_index))
        }
        ElementValue::AnnotationValue(annotation) => {
            format!("@{}", render_annotation(annotation, pool))
        }
        ElementValue::ArrayValue(values) => {
            let values = values
                .iter()
                .map(|v| render_value(v, pool))
                .collect::<Vec<_>>();
            format!("{{{}}}", values.join(", "))
        }
    }
}
