//! Type registry: creation, interning and cross-registry copies.

use crate::types::data_type::{RegistryId, RelDataType, RelDataTypeField, TypeKind};
use crate::types::type_name::SqlTypeName;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Owner of type descriptors.
///
/// Descriptors are interned, so asking twice for the same shape yields the
/// identical instance. A registry is meant to be used by a single logical
/// owner such as one optimization pass.
pub struct TypeRegistry {
    id: RegistryId,
    canonical: Mutex<HashSet<RelDataType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            id: RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed)),
            canonical: Mutex::new(HashSet::new()),
        }
    }

    pub fn id(&self) -> RegistryId {
        self.id
    }

    /// Whether `ty` was created by this registry
    pub fn owns(&self, ty: &RelDataType) -> bool {
        ty.registry_id() == self.id
    }

    /// Number of canonical descriptors interned so far
    pub fn len(&self) -> usize {
        self.canonical.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a NOT NULL scalar type without precision
    pub fn create_sql_type(&self, type_name: SqlTypeName) -> RelDataType {
        self.create_sql_type_with_precision(type_name, None, None)
    }

    /// Create a NOT NULL scalar type.
    ///
    /// Precision and scale are dropped for type names that do not use them.
    pub fn create_sql_type_with_precision(
        &self,
        type_name: SqlTypeName,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> RelDataType {
        let precision = precision.filter(|_| type_name.allows_precision());
        let scale = scale.filter(|_| type_name.allows_scale());
        // The NULL type is the only one that is nullable by construction
        let nullable = type_name == SqlTypeName::Null;
        let kind = TypeKind::Scalar {
            type_name,
            precision,
            scale,
        };
        self.canonize(kind, nullable)
    }

    /// Create a NOT NULL row type from `(name, type)` pairs.
    ///
    /// Field types created by another registry are copied into this one.
    pub fn create_struct_type<S, I>(&self, fields: I) -> RelDataType
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, RelDataType)>,
    {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, (name, ty))| {
                RelDataTypeField::new(name, index, self.copy_type(&ty))
            })
            .collect();
        self.canonize(TypeKind::Row { fields }, false)
    }

    /// Return `ty` with the requested nullability
    pub fn create_type_with_nullability(&self, ty: &RelDataType, nullable: bool) -> RelDataType {
        if self.owns(ty) && ty.is_nullable() == nullable {
            return ty.clone();
        }
        let copied = self.copy_type(ty);
        self.canonize(copied.kind().clone(), nullable)
    }

    /// Copy a descriptor into this registry.
    ///
    /// The result is structurally equal to `ty` and owned by this registry.
    /// Descriptors already owned here are returned unchanged.
    pub fn copy_type(&self, ty: &RelDataType) -> RelDataType {
        if self.owns(ty) {
            return ty.clone();
        }
        let kind = match ty.kind() {
            TypeKind::Scalar { .. } => ty.kind().clone(),
            TypeKind::Row { fields } => TypeKind::Row {
                fields: fields
                    .iter()
                    .map(|f| {
                        RelDataTypeField::new(f.name(), f.index(), self.copy_type(f.data_type()))
                    })
                    .collect(),
            },
        };
        self.canonize(kind, ty.is_nullable())
    }

    fn canonize(&self, kind: TypeKind, nullable: bool) -> RelDataType {
        let candidate = RelDataType::new(self.id, kind, nullable);
        let mut canonical = self.canonical.lock();
        if let Some(existing) = canonical.get(&candidate) {
            return existing.clone();
        }
        canonical.insert(candidate.clone());
        candidate
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("id", &self.id)
            .field("types", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let registry = TypeRegistry::new();
        let a = registry.create_sql_type(SqlTypeName::Integer);
        let b = registry.create_sql_type(SqlTypeName::Integer);
        assert!(a.identical(&b));
        assert_eq!(registry.len(), 1);

        let c = registry.create_sql_type_with_precision(SqlTypeName::Varchar, Some(20), None);
        assert_eq!(c.precision(), Some(20));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_precision_dropped_when_not_applicable() {
        let registry = TypeRegistry::new();
        let int = registry.create_sql_type_with_precision(SqlTypeName::Integer, Some(5), Some(2));
        assert_eq!(int.precision(), None);
        assert_eq!(int.scale(), None);
        let dec = registry.create_sql_type_with_precision(SqlTypeName::Decimal, Some(10), Some(2));
        assert_eq!(dec.digest(), "DECIMAL(10, 2) NOT NULL");
    }

    #[test]
    fn test_copy_type_between_registries() {
        let source = TypeRegistry::new();
        let target = TypeRegistry::new();
        assert_ne!(source.id(), target.id());

        let int = source.create_sql_type(SqlTypeName::Integer);
        let copied = target.copy_type(&int);
        assert_eq!(copied, int);
        assert!(!copied.identical(&int));
        assert!(target.owns(&copied));
        assert!(!target.owns(&int));

        // Copying twice yields the same canonical instance
        let again = target.copy_type(&int);
        assert!(again.identical(&copied));

        // Copying into the owner is a no-op
        assert!(source.copy_type(&int).identical(&int));
    }

    #[test]
    fn test_copy_row_type_recurses_into_fields() {
        let source = TypeRegistry::new();
        let target = TypeRegistry::new();
        let row = source.create_struct_type(vec![
            ("id", source.create_sql_type(SqlTypeName::Integer)),
            ("name", source.create_sql_type(SqlTypeName::Varchar)),
        ]);

        let copied = target.copy_type(&row);
        assert_eq!(copied, row);
        assert!(target.owns(&copied));
        for field in copied.fields() {
            assert!(target.owns(field.data_type()));
        }
    }

    #[test]
    fn test_nullability() {
        let registry = TypeRegistry::new();
        let int = registry.create_sql_type(SqlTypeName::Integer);
        assert!(!int.is_nullable());
        let nullable = registry.create_type_with_nullability(&int, true);
        assert!(nullable.is_nullable());
        assert_ne!(int, nullable);
        assert!(registry
            .create_type_with_nullability(&nullable, true)
            .identical(&nullable));
        assert!(registry.create_sql_type(SqlTypeName::Null).is_nullable());
    }
}
