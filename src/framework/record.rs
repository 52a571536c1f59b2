//! # Records & Tables
//!
//! A [`Record`] is a row type stored in a [`Table`]. Tables are plain ordered maps
//! with their own id sequence; they are owned by the store actor and are never
//! shared, so no locking is involved.
//!
//! Writes never touch a table directly. A transaction opens a [`TableTx`] over
//! each table it needs, stages inserts, updates and deletes in a private overlay,
//! and hands the resulting [`TableWrites`] back for [`Table::apply`] only when the
//! whole unit of work succeeded. Dropping the writes is the rollback.
//!
//! ```rust
//! use order_engine::framework::{Record, Table};
//!
//! #[derive(Clone, Debug)]
//! struct Tag { id: u64, label: String }
//!
//! impl Record for Tag {
//!     type Id = u64;
//!     const TABLE: &'static str = "tags";
//!     fn id(&self) -> u64 { self.id }
//! }
//!
//! let mut tags = Table::<Tag>::new();
//! let mut tx = tags.begin();
//! let tag = tx.insert_with(|id| Tag { id, label: "new".into() });
//! assert_eq!(tag.id, 1);
//! assert!(tx.get(1).is_some());
//! let writes = tx.into_writes();
//! assert!(tags.is_empty());
//!
//! tags.apply(writes);
//! assert_eq!(tags.get(1).map(|t| t.label.as_str()), Some("new"));
//! ```

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tracing::debug;

/// A row type that can live in a [`Table`].
pub trait Record: Clone + Debug + Send + Sync + 'static {
    type Id: Ord + Copy + Hash + Display + Debug + Send + Sync + From<u64>;

    /// Relation name, logged when writes are applied.
    const TABLE: &'static str;

    fn id(&self) -> Self::Id;
}

/// An ordered relation with its own id sequence.
#[derive(Debug, Clone)]
pub struct Table<R: Record> {
    rows: BTreeMap<R::Id, R>,
    next_id: u64,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Table<R> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn get(&self, id: R::Id) -> Option<&R> {
        self.rows.get(&id)
    }

    /// Rows in id order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Opens a staging overlay over this table.
    pub fn begin(&self) -> TableTx<'_, R> {
        TableTx {
            table: self,
            writes: TableWrites::default(),
        }
    }

    /// Commits staged writes, including the sequence advance.
    pub fn apply(&mut self, writes: TableWrites<R>) {
        if !writes.is_empty() {
            debug!(table = R::TABLE, rows = writes.len(), "Applying writes");
        }
        for (id, staged) in writes.rows {
            match staged {
                Some(row) => {
                    self.rows.insert(id, row);
                }
                None => {
                    self.rows.remove(&id);
                }
            }
        }
        if let Some(next_id) = writes.next_id {
            self.next_id = next_id;
        }
    }
}

/// Writes staged against one table. `None` marks a deleted row.
#[derive(Debug)]
pub struct TableWrites<R: Record> {
    rows: BTreeMap<R::Id, Option<R>>,
    next_id: Option<u64>,
}

impl<R: Record> Default for TableWrites<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: None,
        }
    }
}

impl<R: Record> TableWrites<R> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.next_id.is_none()
    }

    /// Number of rows touched.
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// A read-your-writes view of a table inside a transaction.
pub struct TableTx<'a, R: Record> {
    table: &'a Table<R>,
    writes: TableWrites<R>,
}

impl<'a, R: Record> TableTx<'a, R> {
    pub fn get(&self, id: R::Id) -> Option<R> {
        match self.writes.rows.get(&id) {
            Some(staged) => staged.clone(),
            None => self.table.rows.get(&id).cloned(),
        }
    }

    /// Inserts a row built around the next id of the sequence.
    pub fn insert_with(&mut self, build: impl FnOnce(R::Id) -> R) -> R {
        let next_id = self.writes.next_id.unwrap_or(self.table.next_id);
        let row = build(R::Id::from(next_id));
        self.writes.next_id = Some(next_id + 1);
        self.writes.rows.insert(row.id(), Some(row.clone()));
        row
    }

    /// Stages a full replacement of the row with the same id.
    pub fn put(&mut self, row: R) {
        self.writes.rows.insert(row.id(), Some(row));
    }

    /// Stages a delete, returning the row as it was visible to this transaction.
    pub fn delete(&mut self, id: R::Id) -> Option<R> {
        let existing = self.get(id)?;
        self.writes.rows.insert(id, None);
        Some(existing)
    }

    /// Visible rows matching `predicate`, in id order.
    pub fn filter(&self, predicate: impl Fn(&R) -> bool) -> Vec<R> {
        let mut visible: BTreeMap<R::Id, R> = self
            .table
            .rows
            .iter()
            .filter(|(id, row)| !self.writes.rows.contains_key(*id) && predicate(row))
            .map(|(id, row)| (*id, row.clone()))
            .collect();
        for (id, staged) in &self.writes.rows {
            if let Some(row) = staged {
                if predicate(row) {
                    visible.insert(*id, row.clone());
                }
            }
        }
        visible.into_values().collect()
    }

    pub fn into_writes(self) -> TableWrites<R> {
        self.writes
    }
}
