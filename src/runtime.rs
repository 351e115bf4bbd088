//! Row-consumption adapters at the execution boundary.
//!
//! An [`Enumerator`] yields values one at a time; a [`Cursor`] exposes the
//! current row column by column through [`Getter`]s.

pub mod cursor;
pub mod enumerator;

pub use cursor::{ArrayEnumeratorCursor, Cursor, Getter, ObjectEnumeratorCursor};
pub use enumerator::{Enumerator, IterEnumerator};
