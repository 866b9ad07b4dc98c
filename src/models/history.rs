// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Linear undo/redo history of image artifacts.

use crate::models::artifact::Artifact;

/// Ordered artifact versions with a cursor.
///
/// `position` is `None` exactly when the history is empty; otherwise it is a
/// valid index into `items`.
#[derive(Clone, Debug, Default)]
pub struct History {
    items: Vec<Artifact>,
    position: Option<usize>,
}

impl History {
    /// Append a new version, discarding any redo tail first.
    ///
    /// Returns the discarded artifacts so callers can release their display
    /// resources.
    pub fn append(&mut self, artifact: Artifact) -> Vec<Artifact> {
        let keep = self.position.map_or(0, |p| p + 1);
        let dropped = self.items.split_off(keep);
        self.items.push(artifact);
        self.position = Some(self.items.len() - 1);
        dropped
    }

    /// Step back one version. Returns whether the position moved.
    pub fn undo(&mut self) -> bool {
        match self.position {
            Some(p) if p > 0 => {
                self.position = Some(p - 1);
                true
            }
            _ => false,
        }
    }

    /// Step forward one version. Returns whether the position moved.
    pub fn redo(&mut self) -> bool {
        match self.position {
            Some(p) if p + 1 < self.items.len() => {
                self.position = Some(p + 1);
                true
            }
            _ => false,
        }
    }

    /// Jump back to the original upload, keeping forward history for redo.
    pub fn reset(&mut self) -> bool {
        match self.position {
            Some(p) if p != 0 => {
                self.position = Some(0);
                true
            }
            _ => false,
        }
    }

    /// Drop every version.
    pub fn clear(&mut self) -> Vec<Artifact> {
        self.position = None;
        std::mem::take(&mut self.items)
    }

    /// Start a fresh history rooted at `artifact`.
    pub fn replace_with(&mut self, artifact: Artifact) -> Vec<Artifact> {
        let dropped = self.clear();
        self.append(artifact);
        dropped
    }

    pub fn current(&self) -> Option<&Artifact> {
        self.position.and_then(|p| self.items.get(p))
    }

    /// The first version, used as the comparison baseline.
    pub fn original(&self) -> Option<&Artifact> {
        self.items.first()
    }

    pub fn can_undo(&self) -> bool {
        self.position.is_some_and(|p| p > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.position.is_some_and(|p| p + 1 < self.items.len())
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(name: &str) -> Artifact {
        Artifact::new(name, "image/png", name.as_bytes().to_vec())
    }

    fn names(history: &History) -> Vec<&str> {
        history.iter().map(|a| a.name()).collect()
    }

    #[test]
    fn empty_history_has_no_position_and_ignores_navigation() {
        let mut history = History::default();
        assert_eq!(history.position(), None);
        assert!(!history.undo());
        assert!(!history.redo());
        assert!(!history.reset());
        assert!(history.current().is_none());
        assert!(history.original().is_none());
    }

    #[test]
    fn append_moves_position_to_new_end() {
        let mut history = History::default();
        history.append(art("a"));
        history.append(art("b"));

        assert_eq!(history.position(), Some(1));
        assert_eq!(history.current().unwrap().name(), "b");
        assert_eq!(history.original().unwrap().name(), "a");
    }

    #[test]
    fn append_after_undo_discards_redo_tail() {
        let mut history = History::default();
        history.append(art("a"));
        history.append(art("b"));
        history.append(art("c"));
        assert!(history.undo());
        assert!(history.undo());

        let dropped = history.append(art("d"));

        assert_eq!(names(&history), vec!["a", "d"]);
        assert_eq!(history.position(), Some(1));
        assert!(!history.can_redo());
        let dropped: Vec<_> = dropped.iter().map(|a| a.name()).collect();
        assert_eq!(dropped, vec!["b", "c"]);
    }

    #[test]
    fn undo_and_redo_stay_within_bounds() {
        let mut history = History::default();
        for name in ["a", "b", "c"] {
            history.append(art(name));
        }

        for _ in 0..5 {
            history.undo();
            let p = history.position().unwrap();
            assert!(p < history.len());
        }
        assert_eq!(history.position(), Some(0));
        assert!(!history.can_undo());

        for _ in 0..5 {
            history.redo();
            let p = history.position().unwrap();
            assert!(p < history.len());
        }
        assert_eq!(history.position(), Some(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn reset_keeps_forward_history() {
        let mut history = History::default();
        for name in ["a", "b", "c"] {
            history.append(art(name));
        }

        assert!(history.reset());
        assert_eq!(history.position(), Some(0));
        assert_eq!(history.len(), 3);
        assert!(history.redo());
        assert_eq!(history.current().unwrap().name(), "b");
        assert!(!History::default().reset());
    }

    #[test]
    fn replace_with_starts_fresh_history() {
        let mut history = History::default();
        history.append(art("a"));
        history.append(art("b"));

        let dropped = history.replace_with(art("new"));

        assert_eq!(dropped.len(), 2);
        assert_eq!(names(&history), vec!["new"]);
        assert_eq!(history.position(), Some(0));
    }

    #[test]
    fn clear_empties_history() {
        let mut history = History::default();
        history.append(art("a"));
        assert_eq!(history.clear().len(), 1);
        assert!(history.is_empty());
        assert_eq!(history.position(), None);
    }
}
