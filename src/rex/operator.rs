//! Operator identities and signatures.

use crate::rex::error::{RexError, RexResult};
use crate::types::{RelDataType, SqlTypeName, TypeFamily, TypeRegistry};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Kind of an operator, used for dispatch without string comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlKind {
    // Arithmetic
    Plus,
    Minus,
    Times,
    Divide,
    MinusPrefix,

    // Comparison
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Logical
    And,
    Or,
    Not,

    // NULL checks
    IsNull,
    IsNotNull,

    // Conditional
    Case,
    Coalesce,

    // String
    Concat,

    // Collection subscript
    Item,

    // Aggregate and window
    Sum,
    Count,
    Min,
    Max,
    RowNumber,
    Rank,

    /// User-defined or otherwise uncategorized function
    OtherFunction,
}

impl SqlKind {
    /// Whether operators of this kind may appear in a windowed aggregation
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            SqlKind::Sum
                | SqlKind::Count
                | SqlKind::Min
                | SqlKind::Max
                | SqlKind::RowNumber
                | SqlKind::Rank
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            SqlKind::Equals
                | SqlKind::NotEquals
                | SqlKind::LessThan
                | SqlKind::LessThanOrEqual
                | SqlKind::GreaterThan
                | SqlKind::GreaterThanOrEqual
        )
    }
}

/// Number of operands an operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandCount {
    Exact(usize),
    Range { min: usize, max: usize },
    AtLeast(usize),
}

impl OperandCount {
    pub fn allows(&self, count: usize) -> bool {
        match *self {
            OperandCount::Exact(n) => count == n,
            OperandCount::Range { min, max } => (min..=max).contains(&count),
            OperandCount::AtLeast(min) => count >= min,
        }
    }
}

impl fmt::Display for OperandCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandCount::Exact(n) => write!(f, "exactly {}", n),
            OperandCount::Range { min, max } => write!(f, "between {} and {}", min, max),
            OperandCount::AtLeast(min) => write!(f, "at least {}", min),
        }
    }
}

/// Constraint on operand types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperandTypes {
    /// No constraint
    Any,
    /// Every operand belongs to the family
    AllOf(TypeFamily),
    /// Operand `i` belongs to family `i`
    Sequence(Cow<'static, [TypeFamily]>),
    /// All operands belong to one common family
    Comparable,
    /// `WHEN c1 THEN v1 ... ELSE e`: boolean conditions, comparable values
    CaseArms,
}

/// How an operator derives its result type from its operand types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnTypeRule {
    /// BOOLEAN, nullable if any operand is nullable
    Boolean,
    /// BOOLEAN NOT NULL
    BooleanNotNull,
    /// Widest operand type, nullable if any operand is nullable
    LeastRestrictive,
    /// Type of the first operand, forced nullable
    ArgZeroNullable,
    /// BIGINT NOT NULL
    BigIntNotNull,
    /// VARCHAR, nullable if any operand is nullable
    Varchar,
    /// Widest of the THEN/ELSE operand types
    CaseResult,
    /// Not derivable; the caller must supply the type
    Explicit,
}

/// An operator: identity plus signature.
///
/// Operators compare equal by name and kind.
#[derive(Debug, Clone)]
pub struct SqlOperator {
    name: Cow<'static, str>,
    kind: SqlKind,
    operand_count: OperandCount,
    operand_types: OperandTypes,
    return_type: ReturnTypeRule,
}

impl SqlOperator {
    pub const fn new(
        name: &'static str,
        kind: SqlKind,
        operand_count: OperandCount,
        operand_types: OperandTypes,
        return_type: ReturnTypeRule,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind,
            operand_count,
            operand_types,
            return_type,
        }
    }

    /// Create a user-defined function operator
    pub fn function(
        name: impl Into<String>,
        operand_count: OperandCount,
        operand_types: OperandTypes,
        return_type: ReturnTypeRule,
    ) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            kind: SqlKind::OtherFunction,
            operand_count,
            operand_types,
            return_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SqlKind {
        self.kind
    }

    pub fn operand_count(&self) -> OperandCount {
        self.operand_count
    }

    pub fn operand_types(&self) -> &OperandTypes {
        &self.operand_types
    }

    pub fn return_type_rule(&self) -> ReturnTypeRule {
        self.return_type
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind.is_aggregate()
    }

    /// Validate operand types against this operator's signature
    pub fn check_operands(&self, types: &[RelDataType]) -> RexResult<()> {
        if !self.operand_count.allows(types.len()) {
            return Err(self.misuse(format!(
                "expects {} operands, got {}",
                self.operand_count,
                types.len()
            )));
        }

        match &self.operand_types {
            OperandTypes::Any => Ok(()),

            OperandTypes::AllOf(family) => {
                for (i, ty) in types.iter().enumerate() {
                    if !family.admits(ty.family()) {
                        return Err(self.misuse(format!(
                            "operand {} has type {}, expected {:?} family",
                            i, ty, family
                        )));
                    }
                }
                Ok(())
            }

            OperandTypes::Sequence(families) => {
                for (i, (ty, family)) in types.iter().zip(families.iter()).enumerate() {
                    if !family.admits(ty.family()) {
                        return Err(self.misuse(format!(
                            "operand {} has type {}, expected {:?} family",
                            i, ty, family
                        )));
                    }
                }
                Ok(())
            }

            OperandTypes::Comparable => self.check_comparable(types.iter(), 0),

            OperandTypes::CaseArms => {
                if types.len() % 2 == 0 {
                    return Err(self.misuse(format!(
                        "expects WHEN/THEN pairs followed by ELSE, got {} operands",
                        types.len()
                    )));
                }
                let else_index = types.len() - 1;
                for (i, ty) in types.iter().enumerate() {
                    let is_condition = i % 2 == 0 && i != else_index;
                    if is_condition && !TypeFamily::Boolean.admits(ty.family()) {
                        return Err(self.misuse(format!(
                            "condition operand {} has type {}, expected BOOLEAN",
                            i, ty
                        )));
                    }
                }
                self.check_comparable(case_values(types), 1)
            }
        }
    }

    fn check_comparable<'a>(
        &self,
        types: impl Iterator<Item = &'a RelDataType>,
        offset: usize,
    ) -> RexResult<()> {
        let mut common: Option<TypeFamily> = None;
        for (i, ty) in types.enumerate() {
            let family = ty.family();
            if family == TypeFamily::Null || family == TypeFamily::Any {
                continue;
            }
            match common {
                None => common = Some(family),
                Some(expected) if expected == family => {}
                Some(expected) => {
                    return Err(self.misuse(format!(
                        "operand {} has type {}, not comparable with {:?} family",
                        i + offset,
                        ty,
                        expected
                    )));
                }
            }
        }
        Ok(())
    }

    /// Derive the result type for the given operand types.
    ///
    /// Returns `None` when the rule is [`ReturnTypeRule::Explicit`] or the
    /// operand types do not determine a result.
    pub fn infer_return_type(
        &self,
        registry: &TypeRegistry,
        types: &[RelDataType],
    ) -> Option<RelDataType> {
        let any_nullable = types.iter().any(|t| t.is_nullable());
        match self.return_type {
            ReturnTypeRule::Boolean => {
                let boolean = registry.create_sql_type(SqlTypeName::Boolean);
                Some(registry.create_type_with_nullability(&boolean, any_nullable))
            }
            ReturnTypeRule::BooleanNotNull => Some(registry.create_sql_type(SqlTypeName::Boolean)),
            ReturnTypeRule::LeastRestrictive => {
                let widest = least_restrictive(types.iter())?;
                Some(registry.create_type_with_nullability(widest, any_nullable))
            }
            ReturnTypeRule::ArgZeroNullable => {
                let first = types.first()?;
                Some(registry.create_type_with_nullability(first, true))
            }
            ReturnTypeRule::BigIntNotNull => Some(registry.create_sql_type(SqlTypeName::BigInt)),
            ReturnTypeRule::Varchar => {
                let varchar = registry.create_sql_type(SqlTypeName::Varchar);
                Some(registry.create_type_with_nullability(&varchar, any_nullable))
            }
            ReturnTypeRule::CaseResult => {
                let values: Vec<&RelDataType> = case_values(types).collect();
                let widest = least_restrictive(values.iter().copied())?;
                let nullable = values.iter().any(|t| t.is_nullable());
                Some(registry.create_type_with_nullability(widest, nullable))
            }
            ReturnTypeRule::Explicit => None,
        }
    }

    fn misuse(&self, reason: String) -> RexError {
        RexError::InvalidOperatorUse {
            operator: self.name.to_string(),
            reason,
        }
    }
}

impl PartialEq for SqlOperator {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl Eq for SqlOperator {}

impl Hash for SqlOperator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for SqlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// THEN operands and the ELSE operand of a CASE operand list
fn case_values(types: &[RelDataType]) -> impl Iterator<Item = &RelDataType> {
    let else_index = types.len().saturating_sub(1);
    types
        .iter()
        .enumerate()
        .filter(move |(i, _)| i % 2 == 1 || *i == else_index)
        .map(|(_, ty)| ty)
}

fn numeric_rank(name: SqlTypeName) -> u8 {
    match name {
        SqlTypeName::TinyInt => 1,
        SqlTypeName::SmallInt => 2,
        SqlTypeName::Integer => 3,
        SqlTypeName::BigInt => 4,
        SqlTypeName::Decimal => 5,
        SqlTypeName::Real => 6,
        SqlTypeName::Double => 7,
        _ => 0,
    }
}

/// Pick the widest non-NULL type; numeric types widen by rank
fn least_restrictive<'a>(types: impl Iterator<Item = &'a RelDataType>) -> Option<&'a RelDataType> {
    types
        .filter(|t| t.family() != TypeFamily::Null)
        .fold(None, |widest, ty| match widest {
            Some(current) if numeric_rank(ty.type_name()) <= numeric_rank(current.type_name()) => {
                Some(current)
            }
            _ => Some(ty),
        })
}

/// The standard operator table
pub mod std_ops {
    use super::*;

    const NUMERIC: OperandTypes = OperandTypes::AllOf(TypeFamily::Numeric);
    const BOOLEAN: OperandTypes = OperandTypes::AllOf(TypeFamily::Boolean);

    pub const PLUS: SqlOperator = SqlOperator::new(
        "+",
        SqlKind::Plus,
        OperandCount::Exact(2),
        NUMERIC,
        ReturnTypeRule::LeastRestrictive,
    );
    pub const MINUS: SqlOperator = SqlOperator::new(
        "-",
        SqlKind::Minus,
        OperandCount::Exact(2),
        NUMERIC,
        ReturnTypeRule::LeastRestrictive,
    );
    pub const MULTIPLY: SqlOperator = SqlOperator::new(
        "*",
        SqlKind::Times,
        OperandCount::Exact(2),
        NUMERIC,
        ReturnTypeRule::LeastRestrictive,
    );
    pub const DIVIDE: SqlOperator = SqlOperator::new(
        "/",
        SqlKind::Divide,
        OperandCount::Exact(2),
        NUMERIC,
        ReturnTypeRule::LeastRestrictive,
    );
    pub const UNARY_MINUS: SqlOperator = SqlOperator::new(
        "-",
        SqlKind::MinusPrefix,
        OperandCount::Exact(1),
        NUMERIC,
        ReturnTypeRule::LeastRestrictive,
    );

    pub const EQUALS: SqlOperator = comparison("=", SqlKind::Equals);
    pub const NOT_EQUALS: SqlOperator = comparison("<>", SqlKind::NotEquals);
    pub const LESS_THAN: SqlOperator = comparison("<", SqlKind::LessThan);
    pub const LESS_THAN_OR_EQUAL: SqlOperator = comparison("<=", SqlKind::LessThanOrEqual);
    pub const GREATER_THAN: SqlOperator = comparison(">", SqlKind::GreaterThan);
    pub const GREATER_THAN_OR_EQUAL: SqlOperator =
        comparison(">=", SqlKind::GreaterThanOrEqual);

    pub const AND: SqlOperator = SqlOperator::new(
        "AND",
        SqlKind::And,
        OperandCount::AtLeast(2),
        BOOLEAN,
        ReturnTypeRule::Boolean,
    );
    pub const OR: SqlOperator = SqlOperator::new(
        "OR",
        SqlKind::Or,
        OperandCount::AtLeast(2),
        BOOLEAN,
        ReturnTypeRule::Boolean,
    );
    pub const NOT: SqlOperator = SqlOperator::new(
        "NOT",
        SqlKind::Not,
        OperandCount::Exact(1),
        BOOLEAN,
        ReturnTypeRule::Boolean,
    );

    pub const IS_NULL: SqlOperator = SqlOperator::new(
        "IS NULL",
        SqlKind::IsNull,
        OperandCount::Exact(1),
        OperandTypes::Any,
        ReturnTypeRule::BooleanNotNull,
    );
    pub const IS_NOT_NULL: SqlOperator = SqlOperator::new(
        "IS NOT NULL",
        SqlKind::IsNotNull,
        OperandCount::Exact(1),
        OperandTypes::Any,
        ReturnTypeRule::BooleanNotNull,
    );

    pub const CASE: SqlOperator = SqlOperator::new(
        "CASE",
        SqlKind::Case,
        OperandCount::AtLeast(3),
        OperandTypes::CaseArms,
        ReturnTypeRule::CaseResult,
    );
    pub const COALESCE: SqlOperator = SqlOperator::new(
        "COALESCE",
        SqlKind::Coalesce,
        OperandCount::AtLeast(1),
        OperandTypes::Comparable,
        ReturnTypeRule::LeastRestrictive,
    );
    pub const CONCAT: SqlOperator = SqlOperator::new(
        "||",
        SqlKind::Concat,
        OperandCount::Exact(2),
        OperandTypes::AllOf(TypeFamily::Character),
        ReturnTypeRule::Varchar,
    );

    /// `expr[key]`; the element type depends on the collection, so it is
    /// supplied by the caller
    pub const ITEM: SqlOperator = SqlOperator::new(
        "ITEM",
        SqlKind::Item,
        OperandCount::Exact(2),
        OperandTypes::Any,
        ReturnTypeRule::Explicit,
    );

    pub const SUM: SqlOperator = SqlOperator::new(
        "SUM",
        SqlKind::Sum,
        OperandCount::Exact(1),
        NUMERIC,
        ReturnTypeRule::ArgZeroNullable,
    );
    pub const COUNT: SqlOperator = SqlOperator::new(
        "COUNT",
        SqlKind::Count,
        OperandCount::Range { min: 0, max: 1 },
        OperandTypes::Any,
        ReturnTypeRule::BigIntNotNull,
    );
    pub const MIN: SqlOperator = SqlOperator::new(
        "MIN",
        SqlKind::Min,
        OperandCount::Exact(1),
        OperandTypes::Comparable,
        ReturnTypeRule::ArgZeroNullable,
    );
    pub const MAX: SqlOperator = SqlOperator::new(
        "MAX",
        SqlKind::Max,
        OperandCount::Exact(1),
        OperandTypes::Comparable,
        ReturnTypeRule::ArgZeroNullable,
    );
    pub const ROW_NUMBER: SqlOperator = SqlOperator::new(
        "ROW_NUMBER",
        SqlKind::RowNumber,
        OperandCount::Exact(0),
        OperandTypes::Any,
        ReturnTypeRule::BigIntNotNull,
    );
    pub const RANK: SqlOperator = SqlOperator::new(
        "RANK",
        SqlKind::Rank,
        OperandCount::Exact(0),
        OperandTypes::Any,
        ReturnTypeRule::BigIntNotNull,
    );

    const fn comparison(name: &'static str, kind: SqlKind) -> SqlOperator {
        SqlOperator::new(
            name,
            kind,
            OperandCount::Exact(2),
            OperandTypes::Comparable,
            ReturnTypeRule::Boolean,
        )
    }
}
