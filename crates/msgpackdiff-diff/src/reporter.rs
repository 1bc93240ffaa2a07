//! Difference log and traversal path.
//!
//! The comparator walks both trees in lockstep. A [`Reporter`] mirrors that
//! walk with a stack of [`PathLayer`]s and snapshots the stack into each
//! [`Difference`] it records, so every difference knows where in the base
//! tree it belongs.

use tracing::trace;

use msgpackdiff_types::Value;

/// The kind of container a [`PathLayer`] points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Map,
    Array,
}

/// One frame of the traversal stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathLayer {
    pub container: ContainerKind,
    /// Cursor into the base container. For an addition this is the
    /// insertion point: the added entry goes before the base entry at this
    /// index, or at the end when it equals the container length.
    pub index: usize,
    /// The map key at the cursor. `None` inside arrays.
    pub key: Option<String>,
}

/// What happened at a location.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    /// Present in the base, absent in the other tree.
    Deleted(Value),
    /// Absent in the base, present in the other tree.
    Added(Value),
    /// Present in both but unequal.
    Replaced { old: Value, new: Value },
}

/// One recorded edit and where it happened.
#[derive(Clone, Debug, PartialEq)]
pub struct Difference {
    pub change: Change,
    /// From the root container down to the container holding the change.
    /// Empty when the roots themselves differ.
    pub path: Vec<PathLayer>,
}

/// Records differences during one comparison.
#[derive(Debug, Default)]
pub struct Reporter {
    brief: bool,
    path: Vec<PathLayer>,
    differences: Vec<Difference>,
}

impl Reporter {
    /// Create a reporter. In brief mode [`should_stop`](Self::should_stop)
    /// turns true after the first difference.
    pub fn new(brief: bool) -> Self {
        Self {
            brief,
            ..Self::default()
        }
    }

    pub fn enter_map(&mut self) {
        self.enter(ContainerKind::Map);
    }

    pub fn enter_array(&mut self) {
        self.enter(ContainerKind::Array);
    }

    fn enter(&mut self, container: ContainerKind) {
        self.path.push(PathLayer {
            container,
            index: 0,
            key: None,
        });
    }

    /// Point the innermost map layer at `key`, found at `index` in the base.
    pub fn set_key(&mut self, index: usize, key: &str) {
        debug_assert!(matches!(
            self.path.last().map(|l| l.container),
            Some(ContainerKind::Map)
        ));
        if let Some(layer) = self.path.last_mut() {
            layer.index = index;
            layer.key = Some(key.to_owned());
        }
    }

    /// Point the innermost array layer at `index`.
    pub fn set_index(&mut self, index: usize) {
        debug_assert!(matches!(
            self.path.last().map(|l| l.container),
            Some(ContainerKind::Array)
        ));
        if let Some(layer) = self.path.last_mut() {
            layer.index = index;
            layer.key = None;
        }
    }

    /// Pop the innermost layer.
    pub fn leave(&mut self) {
        self.path.pop();
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn log_deletion(&mut self, deleted: &Value) {
        self.push(Change::Deleted(deleted.clone()));
    }

    pub fn log_addition(&mut self, added: &Value) {
        self.push(Change::Added(added.clone()));
    }

    pub fn log_change(&mut self, old: &Value, new: &Value) {
        self.push(Change::Replaced {
            old: old.clone(),
            new: new.clone(),
        });
    }

    fn push(&mut self, change: Change) {
        trace!(
            change = change_name(&change),
            depth = self.path.len(),
            "logged difference"
        );
        self.differences.push(Difference {
            change,
            path: self.path.clone(),
        });
    }

    /// Record differences produced by a separate comparison of the values at
    /// the current location. Their paths are re-rooted under the current path.
    /// In brief mode nothing is taken once a difference is recorded.
    pub fn absorb(&mut self, nested: Vec<Difference>) {
        for mut difference in nested {
            if self.should_stop() {
                break;
            }
            let mut path = self.path.clone();
            path.append(&mut difference.path);
            difference.path = path;
            self.differences.push(difference);
        }
    }

    /// True once brief mode has seen a difference.
    pub fn should_stop(&self) -> bool {
        self.brief && !self.differences.is_empty()
    }

    pub fn difference_count(&self) -> usize {
        self.differences.len()
    }

    pub fn into_differences(self) -> Vec<Difference> {
        self.differences
    }
}

fn change_name(change: &Change) -> &'static str {
    match change {
        Change::Deleted(_) => "deleted",
        Change::Added(_) => "added",
        Change::Replaced { .. } => "replaced",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_snapshotted() {
        let mut r = Reporter::new(false);
        r.enter_map();
        r.set_key(1, "data");
        r.enter_array();
        r.set_index(4);
        r.log_deletion(&Value::Int(1));
        r.leave();
        r.set_key(2, "level");
        r.log_change(&Value::Int(1), &Value::Int(2));
        r.leave();
        assert_eq!(r.depth(), 0);

        let diffs = r.into_differences();
        assert_eq!(diffs.len(), 2);
        assert_eq!(
            diffs[0].path,
            vec![
                PathLayer {
                    container: ContainerKind::Map,
                    index: 1,
                    key: Some("data".into()),
                },
                PathLayer {
                    container: ContainerKind::Array,
                    index: 4,
                    key: None,
                },
            ]
        );
        assert_eq!(diffs[1].path.len(), 1);
        assert_eq!(diffs[1].path[0].key.as_deref(), Some("level"));
        assert_eq!(
            diffs[1].change,
            Change::Replaced {
                old: Value::Int(1),
                new: Value::Int(2),
            }
        );
    }

    #[test]
    fn root_change_has_empty_path() {
        let mut r = Reporter::new(false);
        r.log_change(&Value::Nil, &Value::Bool(true));
        let diffs = r.into_differences();
        assert!(diffs[0].path.is_empty());
    }

    #[test]
    fn brief_stops_after_first() {
        let mut r = Reporter::new(true);
        assert!(!r.should_stop());
        r.log_addition(&Value::Nil);
        assert!(r.should_stop());

        let mut full = Reporter::new(false);
        full.log_addition(&Value::Nil);
        assert!(!full.should_stop());
        assert_eq!(full.difference_count(), 1);
    }

    #[test]
    fn absorb_prefixes_current_path() {
        let mut inner = Reporter::new(false);
        inner.enter_map();
        inner.set_key(0, "x");
        inner.log_deletion(&Value::Int(7));
        inner.leave();

        let mut outer = Reporter::new(false);
        outer.enter_array();
        outer.set_index(3);
        outer.absorb(inner.into_differences());
        outer.leave();

        let diffs = outer.into_differences();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path.len(), 2);
        assert_eq!(diffs[0].path[0].container, ContainerKind::Array);
        assert_eq!(diffs[0].path[0].index, 3);
        assert_eq!(diffs[0].path[1].key.as_deref(), Some("x"));
    }

    #[test]
    fn brief_absorbs_only_the_first() {
        let mut inner = Reporter::new(false);
        inner.enter_map();
        inner.set_key(0, "x");
        inner.log_deletion(&Value::Int(7));
        inner.set_key(1, "y");
        inner.log_deletion(&Value::Int(8));
        inner.leave();
        let nested = inner.into_differences();

        let mut brief = Reporter::new(true);
        brief.enter_array();
        brief.absorb(nested.clone());
        assert_eq!(brief.difference_count(), 1);
        assert!(brief.should_stop());

        let mut full = Reporter::new(false);
        full.enter_array();
        full.absorb(nested);
        assert_eq!(full.difference_count(), 2);
    }
}
