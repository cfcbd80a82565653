use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOperator {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 4] = [
        FilterOperator::Eq,
        FilterOperator::NotEq,
        FilterOperator::Gt,
        FilterOperator::Lt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::NotEq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|o| *o == self).unwrap_or_default();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|o| *o == self).unwrap_or_default();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-column predicate `column <operator> value`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

/// Input state of the filter bar for the currently selected table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBar {
    pub columns: Vec<String>,
    pub selected_column: Option<usize>,
    pub operator: FilterOperator,
    pub value: String,
    pub applied: Option<FilterSpec>,
}

impl FilterBar {
    /// Replaces the column choices, discarding every previous selection.
    pub fn reset(&mut self, columns: Vec<String>) {
        self.selected_column = if columns.is_empty() { None } else { Some(0) };
        self.columns = columns;
        self.operator = FilterOperator::default();
        self.value.clear();
        self.applied = None;
    }

    pub fn selected_column_name(&self) -> Option<&str> {
        self.selected_column
            .and_then(|i| self.columns.get(i))
            .map(String::as_str)
    }

    pub fn next_column(&mut self) {
        if let Some(i) = self.selected_column {
            self.selected_column = Some((i + 1) % self.columns.len());
        }
    }

    pub fn previous_column(&mut self) {
        if let Some(i) = self.selected_column {
            self.selected_column = Some((i + self.columns.len() - 1) % self.columns.len());
        }
    }

    /// Predicate described by the current inputs; `None` without a column.
    pub fn to_spec(&self) -> Option<FilterSpec> {
        self.selected_column_name().map(|column| FilterSpec {
            column: column.to_string(),
            operator: self.operator,
            value: self.value.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_operator_cycle() {
        assert_eq!(FilterOperator::Eq.next(), FilterOperator::NotEq);
        assert_eq!(FilterOperator::Lt.next(), FilterOperator::Eq);
        assert_eq!(FilterOperator::Eq.previous(), FilterOperator::Lt);
        let symbols: Vec<&str> = FilterOperator::ALL.iter().map(|o| o.as_str()).collect();
        assert_eq!(symbols, vec!["=", "!=", ">", "<"]);
    }

    #[test]
    fn test_reset_discards_previous_selection() {
        let mut bar = FilterBar::default();
        bar.reset(columns(&["id", "name", "age"]));
        bar.next_column();
        bar.operator = FilterOperator::Gt;
        bar.value = "30".to_string();
        bar.applied = bar.to_spec();
        assert_eq!(bar.selected_column_name(), Some("name"));

        bar.reset(columns(&["sku"]));
        assert_eq!(bar.columns, columns(&["sku"]));
        assert_eq!(bar.selected_column_name(), Some("sku"));
        assert_eq!(bar.operator, FilterOperator::Eq);
        assert!(bar.value.is_empty());
        assert!(bar.applied.is_none());
    }

    #[test]
    fn test_column_cycle_wraps() {
        let mut bar = FilterBar::default();
        bar.reset(columns(&["a", "b"]));
        bar.next_column();
        bar.next_column();
        assert_eq!(bar.selected_column_name(), Some("a"));
        bar.previous_column();
        assert_eq!(bar.selected_column_name(), Some("b"));
    }

    #[test]
    fn test_empty_columns_yield_no_spec() {
        let mut bar = FilterBar::default();
        bar.reset(Vec::new());
        bar.next_column();
        assert_eq!(bar.selected_column, None);
        assert!(bar.to_spec().is_none());
    }

    #[test]
    fn test_to_spec() {
        let mut bar = FilterBar::default();
        bar.reset(columns(&["age"]));
        bar.operator = FilterOperator::Lt;
        bar.value = "18".to_string();
        assert_eq!(
            bar.to_spec(),
            Some(FilterSpec {
                column: "age".to_string(),
                operator: FilterOperator::Lt,
                value: "18".to_string(),
            })
        );
    }
}
