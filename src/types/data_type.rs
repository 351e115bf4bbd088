//! Type descriptors.

use crate::types::type_name::{SqlTypeName, TypeFamily};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifier of the registry that created a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryId(pub(crate) u64);

impl RegistryId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Shape of a type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar {
        type_name: SqlTypeName,
        precision: Option<u32>,
        scale: Option<u32>,
    },
    Row {
        fields: Vec<RelDataTypeField>,
    },
}

/// A named, positioned field of a row type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelDataTypeField {
    name: String,
    index: usize,
    ty: RelDataType,
}

impl RelDataTypeField {
    pub(crate) fn new(name: impl Into<String>, index: usize, ty: RelDataType) -> Self {
        Self {
            name: name.into(),
            index,
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data_type(&self) -> &RelDataType {
        &self.ty
    }
}

struct TypeInner {
    registry: RegistryId,
    kind: TypeKind,
    nullable: bool,
}

/// Immutable, cheaply cloneable handle to a type descriptor.
///
/// Equality and hashing are structural: two descriptors created by
/// different registries compare equal when their shapes match. Use
/// [`RelDataType::identical`] to test for the same instance.
#[derive(Clone)]
pub struct RelDataType {
    inner: Arc<TypeInner>,
}

impl RelDataType {
    pub(crate) fn new(registry: RegistryId, kind: TypeKind, nullable: bool) -> Self {
        Self {
            inner: Arc::new(TypeInner {
                registry,
                kind,
                nullable,
            }),
        }
    }

    pub fn kind(&self) -> &TypeKind {
        &self.inner.kind
    }

    /// Get the type-name tag; row types report [`SqlTypeName::Row`]
    pub fn type_name(&self) -> SqlTypeName {
        match &self.inner.kind {
            TypeKind::Scalar { type_name, .. } => *type_name,
            TypeKind::Row { .. } => SqlTypeName::Row,
        }
    }

    pub fn family(&self) -> TypeFamily {
        self.type_name().family()
    }

    pub fn precision(&self) -> Option<u32> {
        match &self.inner.kind {
            TypeKind::Scalar { precision, .. } => *precision,
            TypeKind::Row { .. } => None,
        }
    }

    pub fn scale(&self) -> Option<u32> {
        match &self.inner.kind {
            TypeKind::Scalar { scale, .. } => *scale,
            TypeKind::Row { .. } => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.inner.nullable
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.inner.kind, TypeKind::Row { .. })
    }

    /// Get the fields of a row type (empty for scalar types)
    pub fn fields(&self) -> &[RelDataTypeField] {
        match &self.inner.kind {
            TypeKind::Row { fields } => fields,
            TypeKind::Scalar { .. } => &[],
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields().len()
    }

    pub fn field(&self, index: usize) -> Option<&RelDataTypeField> {
        self.fields().get(index)
    }

    /// Look up a field by name, case-sensitively
    pub fn field_by_name(&self, name: &str) -> Option<&RelDataTypeField> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Registry that owns this descriptor
    pub fn registry_id(&self) -> RegistryId {
        self.inner.registry
    }

    /// Whether both handles point at the same descriptor instance
    pub fn identical(&self, other: &RelDataType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Render the full type, e.g. `VARCHAR(10) NOT NULL` or
    /// `RecordType(INTEGER a, BOOLEAN b)`
    pub fn digest(&self) -> String {
        let mut out = String::new();
        self.write_digest(&mut out);
        out
    }

    fn write_digest(&self, out: &mut String) {
        match &self.inner.kind {
            TypeKind::Scalar {
                type_name,
                precision,
                scale,
            } => {
                out.push_str(type_name.as_str());
                match (precision, scale) {
                    (Some(p), Some(s)) => out.push_str(&format!("({}, {})", p, s)),
                    (Some(p), None) => out.push_str(&format!("({})", p)),
                    _ => {}
                }
            }
            TypeKind::Row { fields } => {
                out.push_str("RecordType(");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    field.ty.write_digest(out);
                    out.push(' ');
                    out.push_str(&field.name);
                }
                out.push(')');
            }
        }
        if !self.inner.nullable {
            out.push_str(" NOT NULL");
        }
    }
}

impl PartialEq for RelDataType {
    fn eq(&self, other: &Self) -> bool {
        self.identical(other)
            || (self.inner.nullable == other.inner.nullable && self.inner.kind == other.inner.kind)
    }
}

impl Eq for RelDataType {}

impl Hash for RelDataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.kind.hash(state);
        self.inner.nullable.hash(state);
    }
}

impl fmt::Debug for RelDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@r{}", self.digest(), self.inner.registry.0)
    }
}

impl fmt::Display for RelDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(registry: u64, name: SqlTypeName, nullable: bool) -> RelDataType {
        RelDataType::new(
            RegistryId(registry),
            TypeKind::Scalar {
                type_name: name,
                precision: None,
                scale: None,
            },
            nullable,
        )
    }

    #[test]
    fn test_structural_equality_across_registries() {
        let a = scalar(1, SqlTypeName::Integer, false);
        let b = scalar(2, SqlTypeName::Integer, false);
        assert_eq!(a, b);
        assert!(!a.identical(&b));
        assert_ne!(a.registry_id(), b.registry_id());

        let nullable = scalar(2, SqlTypeName::Integer, true);
        assert_ne!(a, nullable);
    }

    #[test]
    fn test_digest() {
        let int = scalar(1, SqlTypeName::Integer, false);
        assert_eq!(int.digest(), "INTEGER NOT NULL");

        let varchar = RelDataType::new(
            RegistryId(1),
            TypeKind::Scalar {
                type_name: SqlTypeName::Varchar,
                precision: Some(10),
                scale: None,
            },
            true,
        );
        assert_eq!(varchar.digest(), "VARCHAR(10)");

        let row = RelDataType::new(
            RegistryId(1),
            TypeKind::Row {
                fields: vec![
                    RelDataTypeField::new("a", 0, int.clone()),
                    RelDataTypeField::new("b", 1, varchar),
                ],
            },
            false,
        );
        assert_eq!(
            row.digest(),
            "RecordType(INTEGER NOT NULL a, VARCHAR(10) b) NOT NULL"
        );
        assert_eq!(row.field_count(), 2);
        assert_eq!(row.field_by_name("b").map(|f| f.index()), Some(1));
        assert_eq!(int.field_count(), 0);
    }
}
