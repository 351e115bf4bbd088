//! Column-oriented cursors over enumerators.

use crate::rex::Value;
use crate::runtime::enumerator::Enumerator;
use anyhow::{bail, Result};
use log::trace;

/// A forward-only row cursor
pub trait Cursor {
    /// Advance to the next row by calling the enumerator's `move_next`.
    /// Returns false when there are no more rows.
    fn next(&mut self) -> Result<bool>;

    /// Read column `ordinal` of the current row; `None` for NULL
    fn get(&self, ordinal: usize) -> Result<Option<Value>>;

    fn column_count(&self) -> usize;

    /// Create a getter bound to column `ordinal`
    fn create_getter(&self, ordinal: usize) -> Result<Getter> {
        if ordinal >= self.column_count() {
            bail!(
                "Column ordinal {} out of range for cursor with {} columns",
                ordinal,
                self.column_count()
            );
        }
        Ok(Getter::new(ordinal))
    }
}

/// Reads one column of a cursor and remembers whether the last read was NULL
#[derive(Debug, Clone)]
pub struct Getter {
    ordinal: usize,
    was_null: bool,
}

impl Getter {
    fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            was_null: false,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Fetch the column value from the cursor's current row
    pub fn get_object<C>(&mut self, cursor: &C) -> Result<Option<Value>>
    where
        C: Cursor + ?Sized,
    {
        let value = cursor.get(self.ordinal)?;
        self.was_null = value.is_none();
        Ok(value)
    }

    /// Whether the most recent `get_object` returned NULL
    pub fn was_null(&self) -> bool {
        self.was_null
    }
}

/// Where a cursor stands relative to its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeFirst,
    OnRow,
    Exhausted,
}

impl Position {
    fn advance(has_row: bool) -> Self {
        if has_row {
            Position::OnRow
        } else {
            Position::Exhausted
        }
    }

    fn check_readable(self) -> Result<()> {
        match self {
            Position::OnRow => Ok(()),
            Position::BeforeFirst => bail!("Cursor is not positioned on a row. Call next() first."),
            Position::Exhausted => bail!("Cursor is exhausted"),
        }
    }
}

/// Single-column cursor over an enumerator of values
pub struct ObjectEnumeratorCursor<E> {
    enumerator: E,
    position: Position,
}

impl<E> ObjectEnumeratorCursor<E>
where
    E: Enumerator<Item = Value>,
{
    pub fn new(enumerator: E) -> Self {
        Self {
            enumerator,
            position: Position::BeforeFirst,
        }
    }
}

impl<E> Cursor for ObjectEnumeratorCursor<E>
where
    E: Enumerator<Item = Value>,
{
    fn next(&mut self) -> Result<bool> {
        let has_row = self.enumerator.move_next();
        self.position = Position::advance(has_row);
        Ok(has_row)
    }

    fn get(&self, ordinal: usize) -> Result<Option<Value>> {
        if ordinal != 0 {
            bail!("Single-column cursor has no column {}", ordinal);
        }
        self.position.check_readable()?;
        Ok(self.enumerator.current().cloned().and_then(Value::into_option))
    }

    fn column_count(&self) -> usize {
        1
    }
}

/// Cursor over an enumerator whose elements are whole rows
pub struct ArrayEnumeratorCursor<E> {
    enumerator: E,
    column_count: usize,
    position: Position,
}

impl<E> ArrayEnumeratorCursor<E>
where
    E: Enumerator<Item = Vec<Value>>,
{
    pub fn new(enumerator: E, column_count: usize) -> Self {
        Self {
            enumerator,
            column_count,
            position: Position::BeforeFirst,
        }
    }
}

impl<E> Cursor for ArrayEnumeratorCursor<E>
where
    E: Enumerator<Item = Vec<Value>>,
{
    fn next(&mut self) -> Result<bool> {
        let has_row = self.enumerator.move_next();
        if let Some(row) = self.enumerator.current() {
            trace!("cursor row with {} values", row.len());
            if row.len() != self.column_count {
                // Malformed rows are never readable
                self.position = Position::BeforeFirst;
                bail!(
                    "Row has {} values, expected {}",
                    row.len(),
                    self.column_count
                );
            }
        }
        self.position = Position::advance(has_row);
        Ok(has_row)
    }

    fn get(&self, ordinal: usize) -> Result<Option<Value>> {
        if ordinal >= self.column_count {
            bail!(
                "Column ordinal {} out of range for cursor with {} columns",
                ordinal,
                self.column_count
            );
        }
        self.position.check_readable()?;
        match self.enumerator.current() {
            Some(row) => Ok(row.get(ordinal).cloned().and_then(Value::into_option)),
            None => bail!("Cursor is exhausted"),
        }
    }

    fn column_count(&self) -> usize {
        self.column_count
    }
}
