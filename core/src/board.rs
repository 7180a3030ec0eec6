//! Local view state for a todo list UI.
//!
//! # Design
//! `TodoBoard` keeps the list exactly as the server last described it, in
//! manual order, and layers the UI state on top: filter, sort key, the
//! inline edit in progress and the theme. Server-confirmed todos are folded
//! in with `insert`/`apply`/`remove`. Drag-and-drop is the one optimistic
//! change: `move_todo` reorders locally first and returns the id list the
//! caller must persist with `TodoClient::build_reorder_todos`.

use serde::{Deserialize, Serialize};

use crate::filter::{SortKey, TodoFilter};
use crate::types::{PatchTodo, Todo};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub active: usize,
    pub completed: usize,
}

#[derive(Debug, Clone)]
struct Edit {
    id: i64,
    draft: String,
}

#[derive(Debug, Clone, Default)]
pub struct TodoBoard {
    todos: Vec<Todo>,
    pub filter: TodoFilter,
    pub sort: SortKey,
    theme: Theme,
    editing: Option<Edit>,
}

impl TodoBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a fresh `GET /todos` result.
    pub fn load(&mut self, todos: Vec<Todo>) {
        self.todos = todos;
        self.resort();
        let stale = self
            .editing
            .as_ref()
            .is_some_and(|edit| self.position(edit.id).is_none());
        if stale {
            self.editing = None;
        }
    }

    /// Every todo in manual order, ignoring the filter.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: i64) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Add a todo the server just created.
    pub fn insert(&mut self, todo: Todo) {
        self.todos.push(todo);
        self.resort();
    }

    /// Swap in the server's copy of a toggled or patched todo. Returns
    /// `false` if the id is not on the board.
    pub fn apply(&mut self, todo: Todo) -> bool {
        match self.position(todo.id) {
            Some(index) => {
                self.todos[index] = todo;
                self.resort();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<Todo> {
        let index = self.position(id)?;
        if self.editing.as_ref().is_some_and(|edit| edit.id == id) {
            self.editing = None;
        }
        Some(self.todos.remove(index))
    }

    /// What the list shows: filtered, then sorted by the current key.
    pub fn visible(&self) -> Vec<&Todo> {
        let mut view = self.filter.apply(&self.todos);
        self.sort.sort(&mut view);
        view
    }

    /// Drop `dragged` onto `target`'s slot. Rewrites local `sort_order`
    /// to `1..=n` and returns the full id order to send to the server.
    /// `None` if either id is unknown or they are the same todo.
    pub fn move_todo(&mut self, dragged: i64, target: i64) -> Option<Vec<i64>> {
        if dragged == target {
            return None;
        }
        let from = self.position(dragged)?;
        let to = self.position(target)?;

        let todo = self.todos.remove(from);
        self.todos.insert(to, todo);
        for (index, todo) in self.todos.iter_mut().enumerate() {
            todo.sort_order = index as i64 + 1;
        }
        Some(self.todos.iter().map(|t| t.id).collect())
    }

    pub fn start_edit(&mut self, id: i64) -> bool {
        match self.get(id) {
            Some(todo) => {
                self.editing = Some(Edit {
                    id,
                    draft: todo.text.clone(),
                });
                true
            }
            None => false,
        }
    }

    pub fn edit_draft(&mut self, text: &str) {
        if let Some(edit) = &mut self.editing {
            edit.draft = text.to_string();
        }
    }

    /// The id and draft text of the edit in progress.
    pub fn editing(&self) -> Option<(i64, &str)> {
        self.editing.as_ref().map(|edit| (edit.id, edit.draft.as_str()))
    }

    /// Finish the inline edit. Yields the patch to send, or `None` when
    /// there is nothing worth sending (blank or unchanged text).
    pub fn commit_edit(&mut self) -> Option<(i64, PatchTodo)> {
        let edit = self.editing.take()?;
        let text = edit.draft.trim();
        let current = self.get(edit.id)?;
        if text.is_empty() || text == current.text {
            return None;
        }
        Some((edit.id, PatchTodo::text(text)))
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn counts(&self) -> Counts {
        let completed = self.todos.iter().filter(|t| t.completed).count();
        Counts {
            active: self.todos.len() - completed,
            completed,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Restore a theme the host saved, e.g. the serialized `"dark"`.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.todos.iter().position(|t| t.id == id)
    }

    fn resort(&mut self) {
        self.todos
            .sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::StatusFilter;
    use crate::types::Priority;
    use chrono::DateTime;

    fn todo(id: i64, sort_order: i64) -> Todo {
        Todo {
            id,
            text: format!("todo {id}"),
            completed: false,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            due_date: None,
            priority: Priority::Medium,
            category: None,
            sort_order,
        }
    }

    fn board(todos: Vec<Todo>) -> TodoBoard {
        let mut board = TodoBoard::new();
        board.load(todos);
        board
    }

    fn ids(board: &TodoBoard) -> Vec<i64> {
        board.todos().iter().map(|t| t.id).collect()
    }

    #[test]
    fn load_normalises_to_manual_order() {
        let board = board(vec![todo(1, 3), todo(2, 1), todo(3, 2)]);
        assert_eq!(ids(&board), vec![2, 3, 1]);
    }

    #[test]
    fn move_todo_up_and_down() {
        let mut board = board(vec![todo(1, 1), todo(2, 2), todo(3, 3)]);

        assert_eq!(board.move_todo(3, 1), Some(vec![3, 1, 2]));
        assert_eq!(ids(&board), vec![3, 1, 2]);
        let orders: Vec<i64> = board.todos().iter().map(|t| t.sort_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);

        assert_eq!(board.move_todo(3, 2), Some(vec![1, 2, 3]));
    }

    #[test]
    fn move_todo_ignores_noop_and_unknown() {
        let mut board = board(vec![todo(1, 1), todo(2, 2)]);
        assert_eq!(board.move_todo(1, 1), None);
        assert_eq!(board.move_todo(1, 9), None);
        assert_eq!(ids(&board), vec![1, 2]);
    }

    #[test]
    fn apply_replaces_server_copy() {
        let mut board = board(vec![todo(1, 1), todo(2, 2)]);
        let mut toggled = todo(2, 2);
        toggled.completed = true;
        assert!(board.apply(toggled));
        assert!(board.get(2).unwrap().completed);
        assert!(!board.apply(todo(7, 7)));
        assert_eq!(board.counts(), Counts { active: 1, completed: 1 });
    }

    #[test]
    fn visible_applies_filter_and_sort() {
        let mut high = todo(1, 1);
        high.priority = Priority::High;
        let mut done = todo(2, 2);
        done.completed = true;
        let mut board = board(vec![high, done, todo(3, 3)]);

        board.filter.status = StatusFilter::Active;
        board.sort = SortKey::Manual;
        let visible: Vec<i64> = board.visible().iter().map(|t| t.id).collect();
        assert_eq!(visible, vec![1, 3]);

        board.filter = TodoFilter::default();
        board.sort = SortKey::Priority;
        let visible: Vec<i64> = board.visible().iter().map(|t| t.id).collect();
        assert_eq!(visible, vec![1, 2, 3]);
    }

    #[test]
    fn commit_edit_yields_patch_for_changed_text() {
        let mut board = board(vec![todo(1, 1)]);
        assert!(board.start_edit(1));
        assert_eq!(board.editing(), Some((1, "todo 1")));
        board.edit_draft("  renamed  ");
        let (id, patch) = board.commit_edit().unwrap();
        assert_eq!(id, 1);
        assert_eq!(patch, PatchTodo::text("renamed"));
        assert!(board.editing().is_none());
    }

    #[test]
    fn commit_edit_skips_blank_or_unchanged() {
        let mut board = board(vec![todo(1, 1)]);
        board.start_edit(1);
        board.edit_draft("   ");
        assert!(board.commit_edit().is_none());

        board.start_edit(1);
        assert!(board.commit_edit().is_none());

        assert!(!board.start_edit(42));
    }

    #[test]
    fn removing_edited_todo_cancels_edit() {
        let mut board = board(vec![todo(1, 1), todo(2, 2)]);
        board.start_edit(2);
        assert_eq!(board.remove(2).map(|t| t.id), Some(2));
        assert!(board.editing().is_none());
        assert!(board.remove(2).is_none());
    }

    #[test]
    fn theme_toggles() {
        let mut board = TodoBoard::new();
        assert_eq!(board.theme(), Theme::Light);
        assert_eq!(board.toggle_theme(), Theme::Dark);
        assert_eq!(board.toggle_theme(), Theme::Light);
    }

    #[test]
    fn theme_restores_from_saved_setting() {
        let mut board = TodoBoard::new();
        board.toggle_theme();
        let saved = serde_json::to_string(&board.theme()).unwrap();
        assert_eq!(saved, r#""dark""#);

        let mut restored = TodoBoard::new();
        restored.set_theme(serde_json::from_str(&saved).unwrap());
        assert_eq!(restored.theme(), Theme::Dark);
        assert!(serde_json::from_str::<Theme>(r#""sepia""#).is_err());
    }
}
