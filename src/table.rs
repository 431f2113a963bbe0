//! In-memory string tables and the relational operations the matching stages use
//!
//! A [`Table`] is a list of named columns and dense rows of optional string
//! cells. A missing cell never equals anything when rows are joined or
//! filtered, so flows without an identifier cannot be paired by accident.

use crate::error::{FlowmapError, Result};
use crate::schema::RenameTable;
use std::collections::{HashMap, HashSet};

/// A single value; `None` is a missing cell, distinct from the empty string
pub type Cell = Option<String>;

/// Column-named table with dense, 0-based row positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from columns and rows, checking every row's width
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Cell>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Create a table from records of `(column, value)` pairs.
    ///
    /// Columns are collected in first-seen order; a record without a column
    /// gets a missing cell there.
    pub fn from_records<'a>(records: Vec<Vec<(&'a str, &'a str)>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for (column, _) in record {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| {
                        record
                            .iter()
                            .find(|(name, _)| name == column)
                            .map(|(_, value)| value.to_string())
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of `column`, or a `MissingColumn` error naming `table`
    pub fn require_column(&self, column: &str, table: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| FlowmapError::missing_column(table, column))
    }

    /// Value at `row` in `column`; `None` when the column is absent or the cell is missing
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(FlowmapError::data_processing(format!(
                "Row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Replace the values of `name`, appending the column if it does not exist
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(FlowmapError::data_processing(format!(
                "Column '{}' has {} values but table has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Set every cell of `name` to `value`, appending the column if needed
    pub fn fill_column(&mut self, name: &str, value: Cell) {
        match self.column_index(name) {
            Some(index) => {
                for row in &mut self.rows {
                    row[index] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
    }

    /// Duplicate the cells of `from` into `to`
    pub fn copy_column(&mut self, from: &str, to: &str) -> Result<()> {
        let index = self.require_column(from, "table")?;
        let values = self.rows.iter().map(|row| row[index].clone()).collect();
        self.set_column(to, values)
    }

    /// Rename every column listed in `renames`, all at once.
    ///
    /// A renamed column replaces an existing, not renamed column that already
    /// carries the new name.
    pub fn rename_columns(&mut self, renames: &RenameTable) {
        let targets: Vec<Option<String>> = self
            .columns
            .iter()
            .map(|column| {
                renames
                    .get(column)
                    .filter(|to| *to != column.as_str())
                    .map(str::to_string)
            })
            .collect();

        let displaced: HashSet<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, name)| {
                targets[*i].is_none() && targets.iter().flatten().any(|to| to == *name)
            })
            .map(|(i, _)| i)
            .collect();

        for (i, target) in targets.into_iter().enumerate() {
            if let Some(target) = target {
                self.columns[i] = target;
            }
        }
        self.retain_columns(|i, _| !displaced.contains(&i));
    }

    /// Remove the named columns; names that are absent are ignored
    pub fn drop_columns(&mut self, names: &[&str]) {
        self.retain_columns(|_, column| !names.iter().any(|name| *name == column));
    }

    /// Project onto `names` in the given order, skipping names that are absent
    pub fn select(&self, names: &[&str]) -> Table {
        let picked: Vec<(usize, &str)> = names
            .iter()
            .filter_map(|name| self.column_index(name).map(|i| (i, *name)))
            .collect();

        Table {
            columns: picked.iter().map(|(_, name)| name.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| picked.iter().map(|(i, _)| row[*i].clone()).collect())
                .collect(),
        }
    }

    /// Stack tables vertically.
    ///
    /// The result has the union of all columns in first-seen order; cells for
    /// columns a table lacks are missing.
    pub fn concat<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Table {
        let tables: Vec<&Table> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(tables.iter().map(|t| t.len()).sum());
        for table in &tables {
            let positions: Vec<Option<usize>> =
                columns.iter().map(|c| table.column_index(c)).collect();
            for row in &table.rows {
                rows.push(
                    positions
                        .iter()
                        .map(|p| p.and_then(|i| row[i].clone()))
                        .collect(),
                );
            }
        }

        Table { columns, rows }
    }

    /// Inner join with `right` on equality of all `on` columns.
    ///
    /// Output columns are this table's columns followed by the right table's
    /// non-key columns. Non-key columns present on both sides get
    /// `suffixes.0` / `suffixes.1` appended. Rows follow this table's order,
    /// then the right table's order for repeated keys. Missing key cells
    /// never join.
    pub fn inner_join(&self, right: &Table, on: &[&str], suffixes: (&str, &str)) -> Result<Table> {
        if on.is_empty() {
            return Err(FlowmapError::invalid_input("Join requires at least one key column"));
        }

        let left_keys = self.key_indices(on, "left join table")?;
        let right_keys = right.key_indices(on, "right join table")?;

        let left_rest: Vec<usize> = (0..self.columns.len())
            .filter(|i| !left_keys.contains(i))
            .collect();
        let right_rest: Vec<usize> = (0..right.columns.len())
            .filter(|i| !right_keys.contains(i))
            .collect();

        let left_names: HashSet<&str> = left_rest.iter().map(|&i| self.columns[i].as_str()).collect();
        let right_names: HashSet<&str> = right_rest.iter().map(|&i| right.columns[i].as_str()).collect();

        let mut columns: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if !left_keys.contains(&i) && right_names.contains(name.as_str()) {
                    format!("{}{}", name, suffixes.0)
                } else {
                    name.clone()
                }
            })
            .collect();
        columns.extend(right_rest.iter().map(|&i| {
            let name = &right.columns[i];
            if left_names.contains(name.as_str()) {
                format!("{}{}", name, suffixes.1)
            } else {
                name.clone()
            }
        }));

        let mut index: HashMap<Vec<&str>, Vec<usize>> = HashMap::new();
        for (i, row) in right.rows.iter().enumerate() {
            if let Some(key) = row_key(row, &right_keys) {
                index.entry(key).or_default().push(i);
            }
        }

        let mut rows = Vec::new();
        for left_row in &self.rows {
            let Some(key) = row_key(left_row, &left_keys) else {
                continue;
            };
            if let Some(matches) = index.get(&key) {
                for &r in matches {
                    let mut row = left_row.clone();
                    row.extend(right_rest.iter().map(|&i| right.rows[r][i].clone()));
                    rows.push(row);
                }
            }
        }

        Ok(Table { columns, rows })
    }

    /// Keep the rows whose value tuple over `columns` does not occur among the
    /// tuples of `filter` over `filter_columns`.
    ///
    /// Columns are paired by position, so the two lists may use different
    /// names. A row is excluded only when every paired column matches some
    /// filter row at once. Surviving rows keep their relative order.
    pub fn filter_by_columns(
        &self,
        filter: &Table,
        columns: &[&str],
        filter_columns: &[&str],
    ) -> Result<Table> {
        if columns.is_empty() || columns.len() != filter_columns.len() {
            return Err(FlowmapError::invalid_input(format!(
                "Filter needs matching, non-empty column lists (got {} and {})",
                columns.len(),
                filter_columns.len()
            )));
        }

        let own = self.key_indices(columns, "filtered table")?;
        let theirs = filter.key_indices(filter_columns, "filter table")?;

        let excluded: HashSet<Vec<&str>> = filter
            .rows
            .iter()
            .filter_map(|row| row_key(row, &theirs))
            .collect();

        let rows = self
            .rows
            .iter()
            .filter(|row| row_key(row, &own).map_or(true, |key| !excluded.contains(&key)))
            .cloned()
            .collect();

        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// First repeated value tuple over `columns`, comparing missing cells as equal
    pub fn first_duplicate(&self, columns: &[&str], table: &str) -> Result<Option<Vec<Cell>>> {
        let indices = self.key_indices(columns, table)?;
        let mut seen: HashSet<Vec<Option<&str>>> = HashSet::new();

        for row in &self.rows {
            let key: Vec<Option<&str>> = indices.iter().map(|&i| row[i].as_deref()).collect();
            if seen.contains(&key) {
                return Ok(Some(key.into_iter().map(|v| v.map(str::to_string)).collect()));
            }
            seen.insert(key);
        }

        Ok(None)
    }

    /// Present values of `column` that occur on more than one row, in first-seen order
    pub fn repeated_values(&self, column: &str, table: &str) -> Result<Vec<String>> {
        let index = self.require_column(column, table)?;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for value in self.rows.iter().filter_map(|row| row[index].as_deref()) {
            let count = counts.entry(value).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(value);
            }
        }

        Ok(order.into_iter().map(str::to_string).collect())
    }

    fn key_indices(&self, columns: &[&str], table: &str) -> Result<Vec<usize>> {
        columns
            .iter()
            .map(|column| self.require_column(column, table))
            .collect()
    }

    fn retain_columns(&mut self, keep: impl Fn(usize, &str) -> bool) {
        let mask: Vec<bool> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| keep(i, column))
            .collect();

        if mask.iter().all(|k| *k) {
            return;
        }

        self.columns = std::mem::take(&mut self.columns)
            .into_iter()
            .zip(&mask)
            .filter_map(|(column, &k)| k.then_some(column))
            .collect();
        for row in &mut self.rows {
            *row = std::mem::take(row)
                .into_iter()
                .zip(&mask)
                .filter_map(|(cell, &k)| k.then_some(cell))
                .collect();
        }
    }
}

/// Key tuple of a row, or `None` if any key cell is missing
fn row_key<'r>(row: &'r [Cell], indices: &[usize]) -> Option<Vec<&'r str>> {
    indices.iter().map(|&i| row[i].as_deref()).collect()
}
