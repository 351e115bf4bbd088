use std::cell::Cell;
use std::rc::Rc;
use viberex::rex::Value;
use viberex::runtime::{
    ArrayEnumeratorCursor, Cursor, Enumerator, IterEnumerator, ObjectEnumeratorCursor,
};

#[test]
fn test_cursor_exhaustion_contract() {
    let mut cursor = ObjectEnumeratorCursor::new(IterEnumerator::new(vec![
        Value::Int32(1),
        Value::Int32(2),
        Value::Null,
    ]));
    let mut getter = cursor.create_getter(0).unwrap();

    let mut advanced = Vec::new();
    let mut objects = Vec::new();
    let mut nulls = Vec::new();
    loop {
        let has_row = cursor.next().unwrap();
        advanced.push(has_row);
        if !has_row {
            break;
        }
        objects.push(getter.get_object(&cursor).unwrap());
        nulls.push(getter.was_null());
    }

    assert_eq!(advanced, vec![true, true, true, false]);
    assert_eq!(
        objects,
        vec![Some(Value::Int32(1)), Some(Value::Int32(2)), None]
    );
    assert_eq!(nulls, vec![false, false, true]);
}

/// Counts down from `remaining` to zero, recording every advance
struct Countdown {
    remaining: u32,
    current: Option<Value>,
    advances: Rc<Cell<u32>>,
}

impl Enumerator for Countdown {
    type Item = Value;

    fn move_next(&mut self) -> bool {
        self.advances.set(self.advances.get() + 1);
        if self.remaining == 0 {
            self.current = None;
            return false;
        }
        self.remaining -= 1;
        self.current = Some(Value::Int64(self.remaining as i64));
        true
    }

    fn current(&self) -> Option<&Value> {
        self.current.as_ref()
    }
}

#[test]
fn test_next_delegates_to_move_next() {
    let advances = Rc::new(Cell::new(0));
    let mut cursor = ObjectEnumeratorCursor::new(Countdown {
        remaining: 2,
        current: None,
        advances: Rc::clone(&advances),
    });
    let mut getter = cursor.create_getter(0).unwrap();

    assert!(cursor.next().unwrap());
    assert_eq!(getter.get_object(&cursor).unwrap(), Some(Value::Int64(1)));
    assert!(cursor.next().unwrap());
    assert_eq!(getter.get_object(&cursor).unwrap(), Some(Value::Int64(0)));
    assert!(!cursor.next().unwrap());
    assert!(!cursor.next().unwrap());
    assert_eq!(advances.get(), 4);
}

#[test]
fn test_getters_track_nulls_independently() {
    let rows = vec![
        vec![Value::Null, Value::from("x")],
        vec![Value::from(7), Value::Null],
    ];
    let mut cursor = ArrayEnumeratorCursor::new(IterEnumerator::new(rows), 2);
    let mut first = cursor.create_getter(0).unwrap();
    let mut second = cursor.create_getter(1).unwrap();

    assert!(cursor.next().unwrap());
    assert_eq!(first.get_object(&cursor).unwrap(), None);
    assert_eq!(second.get_object(&cursor).unwrap(), Some(Value::from("x")));
    assert!(first.was_null());
    assert!(!second.was_null());

    assert!(cursor.next().unwrap());
    assert_eq!(first.get_object(&cursor).unwrap(), Some(Value::Int32(7)));
    assert!(!first.was_null());
    assert_eq!(second.get_object(&cursor).unwrap(), None);
    assert!(second.was_null());

    assert!(!cursor.next().unwrap());
}
