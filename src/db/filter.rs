//! Structured predicates for listing tasks.
//!
//! A [`TaskFilter`] is turned into a list of `(column, operator, value)`
//! triples, which [`compose`] renders into a `WHERE` clause with numbered
//! placeholders. Filter values are always bound as parameters, never spliced
//! into the SQL text.

use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;

/// Optional constraints on the listed task set, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    /// Exact match against the stored priority.
    pub priority: Option<String>,
    /// Inclusive upper bound on `due_date`.
    pub due_date: Option<String>,
    /// ASCII case-insensitive substring match against the raw tags text.
    pub tags: Option<String>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn due_before(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn tagged(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Predicates in a fixed column order. Empty strings are ignored.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(completed) = self.completed {
            predicates.push(Predicate::new(
                Column::Completed,
                Op::Eq,
                FilterValue::Bool(completed),
            ));
        }
        if let Some(priority) = non_empty(&self.priority) {
            predicates.push(Predicate::new(Column::Priority, Op::Eq, priority.into()));
        }
        if let Some(due_date) = non_empty(&self.due_date) {
            predicates.push(Predicate::new(Column::DueDate, Op::Le, due_date.into()));
        }
        if let Some(tags) = non_empty(&self.tags) {
            predicates.push(Predicate::new(Column::Tags, Op::Contains, tags.into()));
        }

        predicates
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Filterable columns of the `tasks` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Completed,
    Priority,
    DueDate,
    Tags,
}

impl Column {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Column::Completed => "completed",
            Column::Priority => "priority",
            Column::DueDate => "due_date",
            Column::Tags => "tags",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    /// `<=`; due dates are `YYYY-MM-DD` so text order is date order.
    Le,
    /// Literal substring, ASCII case folded. `%` and `_` carry no special meaning.
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Bool(bool),
    Text(String),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl ToSql for FilterValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FilterValue::Bool(b) => b.to_sql(),
            FilterValue::Text(s) => s.to_sql(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: Column,
    pub op: Op,
    pub value: FilterValue,
}

impl Predicate {
    pub fn new(column: Column, op: Op, value: FilterValue) -> Self {
        Self { column, op, value }
    }

    /// Render with `?{index}` as the placeholder for the value.
    fn render(&self, index: usize) -> String {
        let column = self.column.as_sql();
        match self.op {
            Op::Eq => format!("{} = ?{}", column, index),
            Op::Le => format!("{} <= ?{}", column, index),
            Op::Contains => format!("instr(lower({}), lower(?{})) > 0", column, index),
        }
    }
}

/// A rendered `WHERE` clause and the values bound to its placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    /// Empty when there are no predicates, otherwise starts with `" WHERE "`.
    pub sql: String,
    pub params: Vec<FilterValue>,
}

pub fn compose(predicates: Vec<Predicate>) -> WhereClause {
    if predicates.is_empty() {
        return WhereClause::default();
    }

    let mut conditions = Vec::with_capacity(predicates.len());
    let mut params = Vec::with_capacity(predicates.len());
    for (i, predicate) in predicates.into_iter().enumerate() {
        conditions.push(predicate.render(i + 1));
        params.push(predicate.value);
    }

    WhereClause {
        sql: format!(" WHERE {}", conditions.join(" AND ")),
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let clause = compose(TaskFilter::new().predicates());
        assert_eq!(clause.sql, "");
        assert!(clause.params.is_empty());
        assert!(TaskFilter::new().is_empty());
    }

    #[test]
    fn test_empty_strings_are_ignored() {
        let filter = TaskFilter::new().priority("").tagged("").due_before("");
        assert!(filter.is_empty());
    }

    #[test]
    fn test_single_predicate() {
        let clause = compose(TaskFilter::new().priority("high").predicates());
        assert_eq!(clause.sql, " WHERE priority = ?1");
        assert_eq!(clause.params, vec![FilterValue::Text("high".into())]);
    }

    #[test]
    fn test_all_predicates_joined_with_and() {
        let filter = TaskFilter::new()
            .completed(false)
            .priority("low")
            .due_before("2025-06-30")
            .tagged("api");
        let clause = compose(filter.predicates());

        assert_eq!(
            clause.sql,
            " WHERE completed = ?1 AND priority = ?2 AND due_date <= ?3 AND instr(lower(tags), lower(?4)) > 0"
        );
        assert_eq!(
            clause.params,
            vec![
                FilterValue::Bool(false),
                FilterValue::Text("low".into()),
                FilterValue::Text("2025-06-30".into()),
                FilterValue::Text("api".into()),
            ]
        );
    }

    #[test]
    fn test_placeholders_renumber_when_filters_are_skipped() {
        let filter = TaskFilter::new().completed(true).tagged("x");
        let clause = compose(filter.predicates());
        assert_eq!(clause.sql, " WHERE completed = ?1 AND instr(lower(tags), lower(?2)) > 0");
    }

    #[test]
    fn test_values_never_appear_in_sql() {
        let hostile = "'; DROP TABLE tasks; --";
        let clause = compose(TaskFilter::new().priority(hostile).tagged(hostile).predicates());
        assert!(!clause.sql.contains("DROP"));
        assert_eq!(clause.params.len(), 2);
    }
}
