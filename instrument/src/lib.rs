//! Event recording for allocation passes.
//!
//! A `tracing` subscriber that turns every event into a row of a table named
//! after the event's target. Columns appear as fields are first seen, so the
//! allocator decides the schema simply by what it logs.
//!
//! # Usage
//!
//! ```ignore
//! // In allocator code:
//! tracing::info!(target: "allocation", turn, city_id, occupied, score);
//!
//! // In a test:
//! instrument::install_subscriber();
//! // ... run turns ...
//! let recorder = instrument::drain();
//! let scores = recorder.tables["allocation"].i64s("score");
//! ```
//!
//! Recording is per thread, so tests running in parallel see only their own
//! events.

use std::cell::RefCell;
use std::collections::HashMap;

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Level, Metadata, Subscriber};

/// A column of typed values.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedColumn {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl TypedColumn {
    pub fn len(&self) -> usize {
        match self {
            TypedColumn::U64(v) => v.len(),
            TypedColumn::I64(v) => v.len(),
            TypedColumn::F64(v) => v.len(),
            TypedColumn::Bool(v) => v.len(),
            TypedColumn::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extend with default values up to `len` rows
    fn pad_to(&mut self, len: usize) {
        match self {
            TypedColumn::U64(v) => v.resize(len, 0),
            TypedColumn::I64(v) => v.resize(len, 0),
            TypedColumn::F64(v) => v.resize(len, 0.0),
            TypedColumn::Bool(v) => v.resize(len, false),
            TypedColumn::Str(v) => v.resize(len, String::new()),
        }
    }
}

/// One table per tracing target; every column has `row_count` entries
/// between events.
#[derive(Debug, Clone, Default)]
pub struct DynamicTable {
    pub columns: HashMap<String, TypedColumn>,
    pub row_count: usize,
}

impl DynamicTable {
    pub fn u64s(&self, name: &str) -> &[u64] {
        match self.columns.get(name) {
            Some(TypedColumn::U64(v)) => v,
            _ => &[],
        }
    }

    pub fn i64s(&self, name: &str) -> &[i64] {
        match self.columns.get(name) {
            Some(TypedColumn::I64(v)) => v,
            _ => &[],
        }
    }

    pub fn bools(&self, name: &str) -> &[bool] {
        match self.columns.get(name) {
            Some(TypedColumn::Bool(v)) => v,
            _ => &[],
        }
    }

    /// Convert this table to a polars DataFrame.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| match col {
                TypedColumn::U64(v) => Column::new(name.into(), v),
                TypedColumn::I64(v) => Column::new(name.into(), v),
                TypedColumn::F64(v) => Column::new(name.into(), v),
                TypedColumn::Bool(v) => Column::new(name.into(), v),
                TypedColumn::Str(v) => Column::new(name.into(), v),
            })
            .collect();
        DataFrame::new(columns)
    }

    fn column(&mut self, field: &Field, empty: fn() -> TypedColumn) -> &mut TypedColumn {
        let rows = self.row_count;
        self.columns
            .entry(field.name().to_string())
            .or_insert_with(|| {
                let mut col = empty();
                col.pad_to(rows);
                col
            })
    }
}

/// Collection of tables, keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: HashMap<String, DynamicTable>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&DynamicTable> {
        self.tables.get(target)
    }

    /// Convert all tables to polars DataFrames, skipping any that fail.
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

/// Writes one event's fields into the current row. A field whose type
/// disagrees with its existing column is dropped.
struct RowVisitor<'a> {
    table: &'a mut DynamicTable,
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if let TypedColumn::U64(v) = self.table.column(field, || TypedColumn::U64(Vec::new())) {
            v.push(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if let TypedColumn::I64(v) = self.table.column(field, || TypedColumn::I64(Vec::new())) {
            v.push(value);
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let TypedColumn::F64(v) = self.table.column(field, || TypedColumn::F64(Vec::new())) {
            v.push(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if let TypedColumn::Bool(v) = self.table.column(field, || TypedColumn::Bool(Vec::new())) {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if let TypedColumn::Str(v) = self.table.column(field, || TypedColumn::Str(Vec::new())) {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }
}

/// Tracing subscriber that collects events at or above `level` into tables.
/// Spans are ignored.
pub struct TableSubscriber {
    level: Level,
}

impl TableSubscriber {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for TableSubscriber {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= self.level
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let target = event.metadata().target().to_string();
        RECORDER.with(|r| {
            let mut recorder = r.borrow_mut();
            let table = recorder.tables.entry(target).or_default();

            event.record(&mut RowVisitor { table: &mut *table });
            table.row_count += 1;
            let rows = table.row_count;
            for col in table.columns.values_mut() {
                col.pad_to(rows);
            }
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install a `TableSubscriber` recording info-level events as the global
/// default. Safe to call from every test; only the first call installs.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(TableSubscriber::default());
}

/// Take everything recorded on this thread so far.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

/// Discard everything recorded on this thread so far.
pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Drain and convert to polars DataFrames, keyed by target.
pub fn drain_to_dataframes() -> HashMap<String, DataFrame> {
    drain().to_dataframes()
}
