use std::collections::BTreeSet;
use std::fmt;

use super::model::Table;

// ---------------------------------------------------------------------------
// Column types and edits
// ---------------------------------------------------------------------------

/// The semantic type a user assigns to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    DateTime,
    Numerical,
    Categorical,
}

impl ColumnType {
    /// Options offered in the classification dropdown, in display order.
    pub const ALL: [ColumnType; 3] = [
        ColumnType::DateTime,
        ColumnType::Numerical,
        ColumnType::Categorical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ColumnType::DateTime => "Date-Time",
            ColumnType::Numerical => "Numerical",
            ColumnType::Categorical => "String/Categorical",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single user edit to the classification table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Assign a type, or `None` to put the column back to unset.
    SetType {
        column: String,
        tag: Option<ColumnType>,
    },
    /// Exclude the column from every later stage.
    Delete { column: String },
}

impl Edit {
    pub fn set(column: impl Into<String>, tag: ColumnType) -> Self {
        Edit::SetType {
            column: column.into(),
            tag: Some(tag),
        }
    }

    pub fn delete(column: impl Into<String>) -> Self {
        Edit::Delete {
            column: column.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnClassification
// ---------------------------------------------------------------------------

/// Column name → type tag for every column the user has not deleted.
///
/// `None` is the "unset" sentinel. Absence means the column was deleted; the
/// deleted names are remembered so a later edit cannot bring them back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnClassification {
    entries: Vec<(String, Option<ColumnType>)>,
    deleted: BTreeSet<String>,
}

/// One unset entry per column, in table order.
pub fn init_classification(table: &Table) -> ColumnClassification {
    ColumnClassification {
        entries: table.column_names().into_iter().map(|n| (n, None)).collect(),
        deleted: BTreeSet::new(),
    }
}

impl ColumnClassification {
    /// Apply `edits` in order and return the resulting classification.
    ///
    /// Later edits win over earlier ones for the same column. Edits naming a
    /// deleted or unknown column are ignored.
    pub fn apply_edits(&self, edits: &[Edit]) -> ColumnClassification {
        let mut next = self.clone();
        for edit in edits {
            match edit {
                Edit::SetType { column, tag } => {
                    match next.entries.iter_mut().find(|(name, _)| name == column) {
                        Some((_, slot)) => *slot = *tag,
                        None if next.deleted.contains(column) => {
                            log::debug!("Ignoring type change for deleted column '{column}'");
                        }
                        None => log::debug!("Ignoring type change for unknown column '{column}'"),
                    }
                }
                Edit::Delete { column } => {
                    let before = next.entries.len();
                    next.entries.retain(|(name, _)| name != column);
                    if next.entries.len() != before {
                        next.deleted.insert(column.clone());
                    }
                }
            }
        }
        next
    }

    /// True when at least one column is retained and none is unset.
    pub fn is_complete(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|(_, tag)| tag.is_some())
    }

    /// The tag for `column`; `None` if the column is not retained.
    pub fn get(&self, column: &str) -> Option<Option<ColumnType>> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, tag)| *tag)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn is_deleted(&self, column: &str) -> bool {
        self.deleted.contains(column)
    }

    /// Retained entries in insertion order.
    pub fn entries(&self) -> &[(String, Option<ColumnType>)] {
        &self.entries
    }

    /// Names still waiting for a type.
    pub fn unset_columns(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, tag)| tag.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Free-function form of [`ColumnClassification::apply_edits`].
pub fn apply_edits(classification: &ColumnClassification, edits: &[Edit]) -> ColumnClassification {
    classification.apply_edits(edits)
}

/// Free-function form of [`ColumnClassification::is_complete`].
pub fn is_complete(classification: &ColumnClassification) -> bool {
    classification.is_complete()
}
