//! Client-side filtering and sorting.
//!
//! The server always returns the full list; every narrowing of the view
//! happens here.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::types::{Priority, Todo};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !todo.completed,
            StatusFilter::Completed => todo.completed,
        }
    }
}

/// The filter bar. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    /// Case-insensitive substring of the text.
    pub search: String,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub status: StatusFilter,
}

impl TodoFilter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.priority.is_none()
            && self.category.is_none()
            && self.status == StatusFilter::All
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        let needle = self.search.trim().to_lowercase();
        (needle.is_empty() || todo.text.to_lowercase().contains(&needle))
            && self.priority.is_none_or(|p| todo.priority == p)
            && self
                .category
                .as_deref()
                .is_none_or(|c| todo.category.as_deref() == Some(c))
            && self.status.matches(todo)
    }

    /// The todos that pass the filter, in their original order.
    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        todos.iter().filter(|todo| self.matches(todo)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// `sort_order`, then id. The order drag-and-drop edits.
    #[default]
    Manual,
    /// Earliest due date first; undated todos last.
    DueDate,
    /// High before low; manual order within a priority.
    Priority,
    /// Oldest first.
    Created,
}

impl SortKey {
    pub fn compare(self, a: &Todo, b: &Todo) -> Ordering {
        let manual = || a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id));
        match self {
            SortKey::Manual => manual(),
            SortKey::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y).then_with(manual),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => manual(),
            },
            SortKey::Priority => b.priority.cmp(&a.priority).then_with(manual),
            SortKey::Created => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
        }
    }

    pub fn sort(self, todos: &mut [&Todo]) {
        todos.sort_by(|a, b| self.compare(a, b));
    }
}

/// Distinct non-empty categories, alphabetically, for the category picker.
pub fn categories(todos: &[Todo]) -> Vec<String> {
    todos
        .iter()
        .filter_map(|todo| todo.category.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
