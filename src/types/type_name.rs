//! SQL type-name tags and their families.

use crate::rex::Value;
use std::fmt;

/// Type-name tag of a SQL type.
///
/// A tag names the shape of a type (and of literal values of that type)
/// without carrying precision, nullability or row fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlTypeName {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Double,
    Char,
    Varchar,
    Binary,
    Date,
    Timestamp,
    Symbol,
    Null,
    Any,
    Row,
}

/// Coarse classification of type names used by operand checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Boolean,
    Numeric,
    Character,
    Binary,
    Datetime,
    Symbol,
    Null,
    Any,
    Row,
}

impl SqlTypeName {
    /// Get the family this type name belongs to
    pub fn family(&self) -> TypeFamily {
        match self {
            SqlTypeName::Boolean => TypeFamily::Boolean,
            SqlTypeName::TinyInt
            | SqlTypeName::SmallInt
            | SqlTypeName::Integer
            | SqlTypeName::BigInt
            | SqlTypeName::Decimal
            | SqlTypeName::Real
            | SqlTypeName::Double => TypeFamily::Numeric,
            SqlTypeName::Char | SqlTypeName::Varchar => TypeFamily::Character,
            SqlTypeName::Binary => TypeFamily::Binary,
            SqlTypeName::Date | SqlTypeName::Timestamp => TypeFamily::Datetime,
            SqlTypeName::Symbol => TypeFamily::Symbol,
            SqlTypeName::Null => TypeFamily::Null,
            SqlTypeName::Any => TypeFamily::Any,
            SqlTypeName::Row => TypeFamily::Row,
        }
    }

    /// Whether precision is meaningful for this type name
    pub fn allows_precision(&self) -> bool {
        matches!(
            self,
            SqlTypeName::Decimal
                | SqlTypeName::Char
                | SqlTypeName::Varchar
                | SqlTypeName::Binary
                | SqlTypeName::Timestamp
        )
    }

    /// Whether scale is meaningful for this type name
    pub fn allows_scale(&self) -> bool {
        matches!(self, SqlTypeName::Decimal)
    }

    /// Check whether a literal value has the runtime shape this tag requires.
    ///
    /// NULL is accepted by every tag; nullability is a property of the
    /// type, not of the tag.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (SqlTypeName::Any, _) => true,
            (SqlTypeName::Boolean, Value::Boolean(_)) => true,
            (SqlTypeName::TinyInt, Value::Int32(v)) => i8::try_from(*v).is_ok(),
            (SqlTypeName::SmallInt, Value::Int32(v)) => i16::try_from(*v).is_ok(),
            (SqlTypeName::Integer, Value::Int32(_)) => true,
            (SqlTypeName::BigInt, Value::Int32(_) | Value::Int64(_)) => true,
            (
                SqlTypeName::Decimal,
                Value::Decimal { .. } | Value::Int32(_) | Value::Int64(_),
            ) => true,
            (SqlTypeName::Real | SqlTypeName::Double, Value::Double(_)) => true,
            (SqlTypeName::Char | SqlTypeName::Varchar, Value::String(_)) => true,
            (SqlTypeName::Binary, Value::Binary(_)) => true,
            (SqlTypeName::Date, Value::Date(_)) => true,
            (SqlTypeName::Timestamp, Value::Timestamp(_)) => true,
            (SqlTypeName::Symbol, Value::Symbol(_)) => true,
            _ => false,
        }
    }

    /// Get the SQL spelling of this type name
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlTypeName::Boolean => "BOOLEAN",
            SqlTypeName::TinyInt => "TINYINT",
            SqlTypeName::SmallInt => "SMALLINT",
            SqlTypeName::Integer => "INTEGER",
            SqlTypeName::BigInt => "BIGINT",
            SqlTypeName::Decimal => "DECIMAL",
            SqlTypeName::Real => "REAL",
            SqlTypeName::Double => "DOUBLE",
            SqlTypeName::Char => "CHAR",
            SqlTypeName::Varchar => "VARCHAR",
            SqlTypeName::Binary => "BINARY",
            SqlTypeName::Date => "DATE",
            SqlTypeName::Timestamp => "TIMESTAMP",
            SqlTypeName::Symbol => "SYMBOL",
            SqlTypeName::Null => "NULL",
            SqlTypeName::Any => "ANY",
            SqlTypeName::Row => "ROW",
        }
    }
}

impl fmt::Display for SqlTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TypeFamily {
    /// Whether a value of family `other` may stand in for this family.
    ///
    /// The NULL family is assignable to everything, and ANY accepts all.
    pub fn admits(&self, other: TypeFamily) -> bool {
        *self == other || *self == TypeFamily::Any || other == TypeFamily::Null
    }
}
