use thiserror::Error;

/// The kind tag of a constant pool entry, as far as annotation validation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    FieldRef,
    MethodRef,
    InterfaceMethodRef,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
    /// Second slot of a `Long` or `Double`.
    Unusable,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Constant pool index {index} is outside 1..={pool_size}")]
pub struct IndexOutOfRange {
    pub index: u16,
    pub pool_size: u16,
}

pub trait PoolEntry {
    fn kind(&self) -> ConstantKind;
}

/// Read-only view of a 1-based constant pool.
pub trait PoolLookup {
    type Entry: PoolEntry;

    fn pool_size(&self) -> u16;

    fn lookup(&self, index: u16) -> Result<&Self::Entry, IndexOutOfRange>;
}

impl PoolEntry for ConstantKind {
    fn kind(&self) -> ConstantKind {
        *self
    }
}

impl<T: PoolEntry> PoolLookup for [T] {
    type Entry = T;

    fn pool_size(&self) -> u16 {
        u16::try_from(self.len()).unwrap_or(u16::MAX)
    }

    fn lookup(&self, index: u16) -> Result<&T, IndexOutOfRange> {
        let out_of_range = IndexOutOfRange {
            index,
            pool_size: self.pool_size(),
        };
        if index == 0 {
            return Err(out_of_range);
        }
        self.get(index as usize - 1).ok_or(out_of_range)
    }
}

impl<T: PoolEntry> PoolLookup for Vec<T> {
    type Entry = T;

    fn pool_size(&self) -> u16 {
        self.as_slice().pool_size()
    }

    fn lookup(&self, index: u16) -> Result<&T, IndexOutOfRange> {
        self.as_slice().lookup(index)
    }
}

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.entry($index) {
            Ok($crate::constant_pool::CpInfo::$i(ref n)) => Ok(n),
            Ok(c) => Err($crate::ClassFileError::UnexpectedConstantPoolEntry(
                stringify!($i),
                c.clone(),
            )),
            Err(e) => Err($crate::ClassFileError::from(e)),
        }
    };
}

#[derive(Debug, Default)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    pub fn entry(&self, index: u16) -> Result<&CpInfo, IndexOutOfRange> {
        self.cp_infos.lookup(index)
    }

    pub fn utf8(&self, index: u16) -> crate::Result<&str> {
        matches_cp_info!(self, index, Utf8).map(String::as_str)
    }
}
impl PoolLookup for ConstantPool {
    type Entry = CpInfo;

    fn pool_size(&self) -> u16 {
        self.cp_infos.pool_size()
    }

    fn lookup(&self, index: u16) -> Result<&CpInfo, IndexOutOfRange> {
        self.entry(index)
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    MethodRef(RefInfo),
    FieldRef(RefInfo),
    Float(f32),
    Double(f64),
    InterfaceMethodRef(RefInfo),
    Class(ClassInfo),
    NameAndType(NameAndTypeInfo),
    Utf8(String),
    String { string_index: u16 },
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Integer(i32),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Long(i64),
    Module { name_index: u16 },
    Package { name_index: u16 },
    Unusable,
}
impl PoolEntry for CpInfo {
    fn kind(&self) -> ConstantKind {
        match self {
            CpInfo::MethodRef(_) => ConstantKind::MethodRef,
            CpInfo::FieldRef(_) => ConstantKind::FieldRef,
            CpInfo::Float(_) => ConstantKind::Float,
            CpInfo::Double(_) => ConstantKind::Double,
            CpInfo::InterfaceMethodRef(_) => ConstantKind::InterfaceMethodRef,
            CpInfo::Class(_) => ConstantKind::Class,
            CpInfo::NameAndType(_) => ConstantKind::NameAndType,
            CpInfo::Utf8(_) => ConstantKind::Utf8,
            CpInfo::String { .. } => ConstantKind::String,
            CpInfo::Dynamic(_) => ConstantKind::Dynamic,
            CpInfo::InvokeDynamic(_) => ConstantKind::InvokeDynamic,
            CpInfo::Integer(_) => ConstantKind::Integer,
            CpInfo::MethodHandle(_) => ConstantKind::MethodHandle,
            CpInfo::MethodType(_) => ConstantKind::MethodType,
            CpInfo::Long(_) => ConstantKind::Long,
            CpInfo::Module { .. } => ConstantKind::Module,
            CpInfo::Package { .. } => ConstantKind::Package,
            CpInfo::Unusable => ConstantKind::Unusable,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // Must reference a CONSTANT_Utf8_info holding a binary name in internal form (§4.2.1).
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

/// Shared by `CONSTANT_Dynamic_info` and `CONSTANT_InvokeDynamic_info`.
#[derive(Debug, PartialEq, Clone)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
