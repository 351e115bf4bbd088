//! Window specifications for windowed aggregate calls.

use crate::rex::error::RexResult;
use crate::rex::node::RexNode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullDirection {
    First,
    Last,
    Unspecified,
}

/// An ORDER BY key of a window
#[derive(Debug, Clone, PartialEq)]
pub struct RexFieldCollation {
    pub expr: RexNode,
    pub direction: SortDirection,
    pub nulls: NullDirection,
}

impl RexFieldCollation {
    pub fn new(expr: RexNode, direction: SortDirection, nulls: NullDirection) -> Self {
        Self {
            expr,
            direction,
            nulls,
        }
    }

    pub fn ascending(expr: RexNode) -> Self {
        Self::new(expr, SortDirection::Ascending, NullDirection::Unspecified)
    }

    pub fn descending(expr: RexNode) -> Self {
        Self::new(expr, SortDirection::Descending, NullDirection::Unspecified)
    }
}

/// One end of a window frame
#[derive(Debug, Clone, PartialEq)]
pub enum RexWindowBound {
    UnboundedPreceding,
    Preceding(RexNode),
    CurrentRow,
    Following(RexNode),
    UnboundedFollowing,
}

impl RexWindowBound {
    /// Position of this bound on the frame axis, ignoring offsets
    pub fn order_key(&self) -> u8 {
        match self {
            RexWindowBound::UnboundedPreceding => 0,
            RexWindowBound::Preceding(_) => 1,
            RexWindowBound::CurrentRow => 2,
            RexWindowBound::Following(_) => 3,
            RexWindowBound::UnboundedFollowing => 4,
        }
    }

    pub fn offset(&self) -> Option<&RexNode> {
        match self {
            RexWindowBound::Preceding(n) | RexWindowBound::Following(n) => Some(n),
            _ => None,
        }
    }

    fn map_offset<F>(&self, f: &mut F) -> RexResult<RexWindowBound>
    where
        F: FnMut(&RexNode) -> RexResult<RexNode>,
    {
        Ok(match self {
            RexWindowBound::Preceding(n) => RexWindowBound::Preceding(f(n)?),
            RexWindowBound::Following(n) => RexWindowBound::Following(f(n)?),
            other => other.clone(),
        })
    }
}

impl fmt::Display for RexWindowBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RexWindowBound::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            RexWindowBound::Preceding(n) => write!(f, "{} PRECEDING", n),
            RexWindowBound::CurrentRow => write!(f, "CURRENT ROW"),
            RexWindowBound::Following(n) => write!(f, "{} FOLLOWING", n),
            RexWindowBound::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
        }
    }
}

/// Window specification: partitioning, ordering and frame
#[derive(Debug, Clone, PartialEq)]
pub struct RexWindow {
    partition_keys: Vec<RexNode>,
    order_keys: Vec<RexFieldCollation>,
    lower_bound: RexWindowBound,
    upper_bound: RexWindowBound,
    is_rows: bool,
}

impl RexWindow {
    pub fn new(
        partition_keys: Vec<RexNode>,
        order_keys: Vec<RexFieldCollation>,
        lower_bound: RexWindowBound,
        upper_bound: RexWindowBound,
        is_rows: bool,
    ) -> Self {
        Self {
            partition_keys,
            order_keys,
            lower_bound,
            upper_bound,
            is_rows,
        }
    }

    /// `RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`
    pub fn unbounded_to_current(
        partition_keys: Vec<RexNode>,
        order_keys: Vec<RexFieldCollation>,
    ) -> Self {
        Self::new(
            partition_keys,
            order_keys,
            RexWindowBound::UnboundedPreceding,
            RexWindowBound::CurrentRow,
            false,
        )
    }

    pub fn partition_keys(&self) -> &[RexNode] {
        &self.partition_keys
    }

    pub fn order_keys(&self) -> &[RexFieldCollation] {
        &self.order_keys
    }

    pub fn lower_bound(&self) -> &RexWindowBound {
        &self.lower_bound
    }

    pub fn upper_bound(&self) -> &RexWindowBound {
        &self.upper_bound
    }

    pub fn is_rows(&self) -> bool {
        self.is_rows
    }

    /// Every expression nested in the window, in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &RexNode> {
        self.partition_keys
            .iter()
            .chain(self.order_keys.iter().map(|k| &k.expr))
            .chain(self.lower_bound.offset())
            .chain(self.upper_bound.offset())
    }

    pub fn depth(&self) -> usize {
        self.nodes().map(RexNode::depth).max().unwrap_or(0)
    }

    /// Rebuild the window with every nested expression passed through `f`.
    ///
    /// Returns the original window when `f` hands back the same nodes.
    pub(crate) fn map_nodes<F>(&self, mut f: F) -> RexResult<RexWindow>
    where
        F: FnMut(&RexNode) -> RexResult<RexNode>,
    {
        let mapped = RexWindow {
            partition_keys: self
                .partition_keys
                .iter()
                .map(&mut f)
                .collect::<RexResult<_>>()?,
            order_keys: self
                .order_keys
                .iter()
                .map(|k| -> RexResult<RexFieldCollation> {
                    Ok(RexFieldCollation::new(f(&k.expr)?, k.direction, k.nulls))
                })
                .collect::<RexResult<_>>()?,
            lower_bound: self.lower_bound.map_offset(&mut f)?,
            upper_bound: self.upper_bound.map_offset(&mut f)?,
            is_rows: self.is_rows,
        };
        let unchanged = self
            .nodes()
            .zip(mapped.nodes())
            .all(|(old, new)| old.ptr_eq(new));
        Ok(if unchanged { self.clone() } else { mapped })
    }
}

impl fmt::Display for RexWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut clauses = Vec::new();
        if !self.partition_keys.is_empty() {
            let keys: Vec<String> = self.partition_keys.iter().map(|k| k.to_string()).collect();
            clauses.push(format!("PARTITION BY {}", keys.join(", ")));
        }
        if !self.order_keys.is_empty() {
            let keys: Vec<String> = self
                .order_keys
                .iter()
                .map(|k| {
                    let mut key = k.expr.to_string();
                    if k.direction == SortDirection::Descending {
                        key.push_str(" DESC");
                    }
                    match k.nulls {
                        NullDirection::First => key.push_str(" NULLS FIRST"),
                        NullDirection::Last => key.push_str(" NULLS LAST"),
                        NullDirection::Unspecified => {}
                    }
                    key
                })
                .collect();
            clauses.push(format!("ORDER BY {}", keys.join(", ")));
        }
        clauses.push(format!(
            "{} BETWEEN {} AND {}",
            if self.is_rows { "ROWS" } else { "RANGE" },
            self.lower_bound,
            self.upper_bound
        ));
        write!(f, "({})", clauses.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rex::RexBuilder;
    use crate::types::{SqlTypeName, TypeRegistry};
    use std::sync::Arc;

    #[test]
    fn test_bound_order() {
        let b = RexBuilder::new(Arc::new(TypeRegistry::new()));
        let one = b.make_exact_literal(1).unwrap();
        let bounds = [
            RexWindowBound::UnboundedPreceding,
            RexWindowBound::Preceding(one.clone()),
            RexWindowBound::CurrentRow,
            RexWindowBound::Following(one.clone()),
            RexWindowBound::UnboundedFollowing,
        ];
        for pair in bounds.windows(2) {
            assert!(pair[0].order_key() < pair[1].order_key());
        }
        assert_eq!(bounds[1].offset(), Some(&one));
        assert_eq!(bounds[2].offset(), None);
        assert_eq!(bounds[3].to_string(), "1 FOLLOWING");
    }

    #[test]
    fn test_nodes_and_display() {
        let b = RexBuilder::new(Arc::new(TypeRegistry::new()));
        let int = b.type_registry().create_sql_type(SqlTypeName::Integer);
        let window = RexWindow::new(
            vec![b.make_input_ref(int.clone(), 0).unwrap()],
            vec![RexFieldCollation::new(
                b.make_input_ref(int, 1).unwrap(),
                SortDirection::Descending,
                NullDirection::Last,
            )],
            RexWindowBound::Preceding(b.make_exact_literal(2).unwrap()),
            RexWindowBound::CurrentRow,
            true,
        );

        let nodes: Vec<String> = window.nodes().map(|n| n.to_string()).collect();
        assert_eq!(nodes, vec!["$0", "$1", "2"]);
        assert_eq!(window.depth(), 1);
        assert_eq!(
            window.to_string(),
            "(PARTITION BY $0 ORDER BY $1 DESC NULLS LAST ROWS BETWEEN 2 PRECEDING AND CURRENT ROW)"
        );

        let same = window.map_nodes(|n| Ok(n.clone())).unwrap();
        assert!(same.nodes().zip(window.nodes()).all(|(x, y)| x.ptr_eq(y)));
    }
}
