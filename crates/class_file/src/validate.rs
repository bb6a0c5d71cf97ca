//! Structural validation of decoded annotation trees against a constant pool.
//!
//! Unlike decoding, validation does not stop at the first problem: every node is visited and
//! every violation is collected into one report.

use std::{fmt, ops::Deref};

use thiserror::Error;

use crate::{
    annotations::{Annotation, ConstantType, ElementValue, DEFAULT_MAX_DEPTH},
    constant_pool::{ConstantKind, PoolEntry, PoolLookup},
    type_annotations::{TargetInfo, TargetShape, TargetType, TypeAnnotation},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{field} {index} is not a valid constant pool index")]
    IndexOutOfRange { field: &'static str, index: u16 },
    #[error("{field} {index} should reference {expected:?}, found {actual:?}")]
    WrongConstantKind {
        field: &'static str,
        index: u16,
        expected: ConstantKind,
        actual: ConstantKind,
    },
    #[error("Nesting depth {depth} exceeds {max_depth}")]
    MaxDepthExceeded { depth: usize, max_depth: usize },
    #[error("{field} holds {len} entries, more than a 16-bit count allows")]
    LengthOverflow { field: &'static str, len: usize },
    #[error("Local variable range {start_pc}+{length} overflows 16 bits")]
    LocalVarRangeOverflow { start_pc: u16, length: u16 },
    #[error("Target type {target_type:?} requires {expected:?} target info, found {actual:?}")]
    TargetInfoMismatch {
        target_type: TargetType,
        expected: TargetShape,
        actual: TargetShape,
    },
}

/// A non-empty list of violations, in the order the tree was walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);
impl Violations {
    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}
impl Deref for Violations {
    type Target = [Violation];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} violation(s):", self.0.len())?;
        for violation in &self.0 {
            writeln!(f, "  {}", violation)?;
        }
        Ok(())
    }
}
impl std::error::Error for Violations {}

/// Something that can be walked by a [`Validator`].
pub trait Validate {
    fn validate_into<P: PoolLookup + ?Sized>(&self, v: &mut Validator<'_, P>);
}

pub fn validate<T, P>(tree: &T, pool: &P) -> Result<(), Violations>
where
    T: Validate + ?Sized,
    P: PoolLookup + ?Sized,
{
    validate_with_max_depth(tree, pool, DEFAULT_MAX_DEPTH)
}

pub fn validate_with_max_depth<T, P>(tree: &T, pool: &P, max_depth: usize) -> Result<(), Violations>
where
    T: Validate + ?Sized,
    P: PoolLookup + ?Sized,
{
    let mut validator = Validator {
        pool,
        max_depth,
        violations: Vec::new(),
    };
    tree.validate_into(&mut validator);
    validator.finish()
}

pub struct Validator<'p, P: PoolLookup + ?Sized> {
    pool: &'p P,
    max_depth: usize,
    violations: Vec<Violation>,
}
impl<'p, P: PoolLookup + ?Sized> Validator<'p, P> {
    fn finish(self) -> Result<(), Violations> {
        if self.violations.is_empty() {
            return Ok(());
        }

        log::debug!(
            "validation against a pool of {} found {} violation(s)",
            self.pool.pool_size(),
            self.violations.len()
        );
        Err(Violations(self.violations))
    }

    pub fn annotation(&mut self, annotation: &Annotation, depth: usize) {
        self.index("type_index", annotation.type_index, ConstantKind::Utf8);
        self.length("element_value_pairs", annotation.element_value_pairs.len());

        for pair in &annotation.element_value_pairs {
            self.index("element_name_index", pair.element_name_index, ConstantKind::Utf8);
            self.element_value(&pair.value, depth);
        }
    }

    pub fn element_value(&mut self, value: &ElementValue, depth: usize) {
        match value {
            ElementValue::ConstantValue {
                tag,
                const_value_index,
            } => {
                let expected = match tag.constant_type() {
                    ConstantType::Integer => ConstantKind::Integer,
                    ConstantType::Double => ConstantKind::Double,
                    ConstantType::Float => ConstantKind::Float,
                    ConstantType::Long => ConstantKind::Long,
                    ConstantType::Utf8 => ConstantKind::Utf8,
                };
                self.index("const_value_index", *const_value_index, expected);
            }
            ElementValue::EnumConstantValue {
                type_name_index,
                const_name_index,
            } => {
                self.index("type_name_index", *type_name_index, ConstantKind::Utf8);
                self.index("const_name_index", *const_name_index, ConstantKind::Utf8);
            }
            ElementValue::ClassInfo { class_info_index } => {
                self.index("class_info_index", *class_info_index, ConstantKind::Utf8)
            }
            ElementValue::AnnotationValue(annotation) => {
                if let Some(depth) = self.enter(depth) {
                    self.annotation(annotation, depth);
                }
            }
            ElementValue::ArrayValue(values) => {
                if let Some(depth) = self.enter(depth) {
                    self.length("values", values.len());
                    for value in values {
                        self.element_value(value, depth);
                    }
                }
            }
        }
    }

    pub fn type_annotation(&mut self, type_annotation: &TypeAnnotation) {
        let expected = type_annotation.target_type.shape();
        let actual = type_annotation.target_info.shape();
        if expected != actual {
            self.violations.push(Violation::TargetInfoMismatch {
                target_type: type_annotation.target_type,
                expected,
                actual,
            });
        }

        if let TargetInfo::LocalVarTable(table) = &type_annotation.target_info {
            self.length("table", table.len());
            for local_var in table {
                if local_var.start_pc.checked_add(local_var.length).is_none() {
                    self.violations.push(Violation::LocalVarRangeOverflow {
                        start_pc: local_var.start_pc,
                        length: local_var.length,
                    });
                }
            }
        }

        self.length("type_path", type_annotation.type_path.len());
        self.annotation(&type_annotation.annotation, 0);
    }

    fn enter(&mut self, depth: usize) -> Option<usize> {
        if depth >= self.max_depth {
            self.violations.push(Violation::MaxDepthExceeded {
                depth: depth + 1,
                max_depth: self.max_depth,
            });
            return None;
        }
        Some(depth + 1)
    }

    fn index(&mut self, field: &'static str, index: u16, expected: ConstantKind) {
        let pool = self.pool;
        match pool.lookup(index) {
            Err(_) => self
                .violations
                .push(Violation::IndexOutOfRange { field, index }),
            Ok(entry) => {
                let actual = entry.kind();
                if actual != expected {
                    self.violations.push(Violation::WrongConstantKind {
                        field,
                        index,
                        expected,
                        actual,
                    });
                }
            }
        }
    }

    fn length(&mut self, field: &'static str, len: usize) {
        if len > u16::MAX as usize {
            self.violations.push(Violation::LengthOverflow { field, len });
        }
    }
}

impl Validate for ElementValue {
    fn validate_into<P: PoolLookup + ?Sized>(&self, v: &mut Validator<'_, P>) {
        v.element_value(self, 0);
    }
}

impl Validate for Annotation {
    fn validate_into<P: PoolLookup + ?Sized>(&self, v: &mut Validator<'_, P>) {
        v.annotation(self, 0);
    }
}

impl Validate for TypeAnnotation {
    fn validate_into<P: PoolLookup + ?Sized>(&self, v: &mut Validator<'_, P>) {
        v.type_annotation(self);
    }
}

impl<T: Validate> Validate for [T] {
    fn validate_into<P: PoolLookup + ?Sized>(&self, v: &mut Validator<'_, P>) {
        for item in self {
            item.validate_into(v);
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate_into<P: PoolLookup + ?Sized>(&self, v: &mut Validator<'_, P>) {
        self.as_slice().validate_into(v);
    }
}
