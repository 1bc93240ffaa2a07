//! Annotated report rendering.
//!
//! The report is the base tree pretty-printed with every difference spliced
//! in. Each line starts with a marker column (`' '` unchanged, `'-'` deleted,
//! `'+'` added), then two spaces of indentation per nesting level:
//!
//! ```text
//!  {
//!    "id": 27,
//! -  "name": "Jason",
//! +  "name": "Jay",
//!    ... (4 skipped)
//!  }
//! ```
//!
//! Inside a container that holds changes, unchanged entries further than
//! `context` entries from every change collapse into one `... (N skipped)`
//! line. Containers without changes are never opened.

use std::fmt;
use std::io;

use msgpackdiff_types::{quote, Value};

use crate::reporter::{Change, ContainerKind, Difference};

/// How a report line relates to the two trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineKind {
    Unchanged,
    Deleted,
    Added,
    /// A run of unchanged entries that were left out.
    Skipped,
}

impl LineKind {
    pub fn marker(self) -> char {
        match self {
            LineKind::Unchanged | LineKind::Skipped => ' ',
            LineKind::Deleted => '-',
            LineKind::Added => '+',
        }
    }
}

/// One line of the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub depth: usize,
    pub text: String,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = self.depth * 2;
        write!(f, "{}{:indent$}{}", self.kind.marker(), "", self.text)
    }
}

/// Write the report for `differences` against `base`, one line at a time.
pub fn write_report<W: io::Write>(
    w: &mut W,
    base: &Value,
    differences: &[Difference],
    context: usize,
) -> io::Result<()> {
    for line in render_lines(base, differences, context) {
        writeln!(w, "{line}")?;
    }
    Ok(())
}

/// Build the report lines for `differences` against `base`.
///
/// # Panics
///
/// Panics if a difference path does not fit `base`: a layer pointing past
/// the end of a container, a layer of the wrong container kind, or two
/// conflicting changes at one location. The comparator never produces such
/// a list.
pub fn render_lines(base: &Value, differences: &[Difference], context: usize) -> Vec<Line> {
    let mut renderer = Renderer {
        context,
        lines: Vec::new(),
    };
    let (root, nested): (Vec<&Difference>, Vec<&Difference>) =
        differences.iter().partition(|d| d.path.is_empty());

    if differences.is_empty() {
        renderer.value(LineKind::Unchanged, base, 0, "", false);
    } else if root.is_empty() {
        renderer.container(base, &nested, 0, 0, "", false);
    } else {
        assert!(
            nested.is_empty(),
            "inconsistent differences: root value changed and has nested changes"
        );
        for difference in root {
            match &difference.change {
                Change::Deleted(old) => renderer.value(LineKind::Deleted, old, 0, "", false),
                Change::Added(new) => renderer.value(LineKind::Added, new, 0, "", false),
                Change::Replaced { old, new } => {
                    renderer.value(LineKind::Deleted, old, 0, "", false);
                    renderer.value(LineKind::Added, new, 0, "", false);
                }
            }
        }
    }
    renderer.lines
}

/// What happens to one base entry.
enum Own<'d> {
    Unchanged,
    Deleted(&'d Value),
    Replaced { old: &'d Value, new: &'d Value },
    Nested(Vec<&'d Difference>),
}

/// The changes grouped under one base index: entries inserted before it,
/// then the fate of the entry itself.
struct Slot<'d> {
    inserts: Vec<(Option<&'d str>, &'d Value)>,
    own: Own<'d>,
}

/// One entry of the merged sibling sequence.
enum Entry<'a> {
    Unchanged(usize),
    Deleted(usize, &'a Value),
    Replaced(usize, &'a Value, &'a Value),
    Nested(usize, Vec<&'a Difference>),
    Added(Option<&'a str>, &'a Value),
}

impl Entry<'_> {
    fn is_change(&self) -> bool {
        !matches!(self, Entry::Unchanged(_))
    }
}

struct Renderer {
    context: usize,
    lines: Vec<Line>,
}

impl Renderer {
    fn push(&mut self, kind: LineKind, depth: usize, text: String) {
        self.lines.push(Line { kind, depth, text });
    }

    /// Render a container of `base` that holds changes. Every difference
    /// has a layer at `level` pointing into `value`.
    fn container(
        &mut self,
        value: &Value,
        differences: &[&Difference],
        level: usize,
        depth: usize,
        label: &str,
        comma: bool,
    ) {
        let (kind, len, open, close) = match value {
            Value::Map(map) => (ContainerKind::Map, map.len(), '{', '}'),
            Value::Array(items) => (ContainerKind::Array, items.len(), '[', ']'),
            other => panic!(
                "inconsistent difference path: level {level} points into a {} value",
                other.kind()
            ),
        };

        let slots = group(differences, level, kind, len);
        let entries = merge(slots);
        let shown = visible(&entries, self.context);

        self.push(LineKind::Unchanged, depth, format!("{label}{open}"));
        let last = entries.len().saturating_sub(1);
        let mut skipped = 0;
        for (position, entry) in entries.into_iter().enumerate() {
            if !shown[position] {
                skipped += 1;
                continue;
            }
            self.skipped(&mut skipped, depth + 1);

            let comma = position < last;
            match entry {
                Entry::Unchanged(index) => {
                    let (label, child) = child(value, index);
                    self.value(LineKind::Unchanged, child, depth + 1, &label, comma);
                }
                Entry::Deleted(index, old) => {
                    let (label, _) = child(value, index);
                    self.value(LineKind::Deleted, old, depth + 1, &label, comma);
                }
                Entry::Replaced(index, old, new) => {
                    let (label, _) = child(value, index);
                    self.value(LineKind::Deleted, old, depth + 1, &label, comma);
                    self.value(LineKind::Added, new, depth + 1, &label, comma);
                }
                Entry::Nested(index, nested) => {
                    let (label, child) = child(value, index);
                    self.container(child, &nested, level + 1, depth + 1, &label, comma);
                }
                Entry::Added(key, new) => {
                    let label = entry_label(kind, key);
                    self.value(LineKind::Added, new, depth + 1, &label, comma);
                }
            }
        }
        self.skipped(&mut skipped, depth + 1);
        self.push(LineKind::Unchanged, depth, format!("{close}{}", comma_str(comma)));
    }

    fn skipped(&mut self, count: &mut usize, depth: usize) {
        if *count > 0 {
            self.push(LineKind::Skipped, depth, format!("... ({count} skipped)"));
            *count = 0;
        }
    }

    /// Pretty-print a whole value with one line kind.
    fn value(&mut self, kind: LineKind, value: &Value, depth: usize, label: &str, comma: bool) {
        let tail = comma_str(comma);
        match value {
            Value::Map(map) if !map.is_empty() => {
                self.push(kind, depth, format!("{label}{{"));
                let last = map.len() - 1;
                for (i, (key, child)) in map.iter().enumerate() {
                    let label = format!("{}: ", quote(key));
                    self.value(kind, child, depth + 1, &label, i < last);
                }
                self.push(kind, depth, format!("}}{tail}"));
            }
            Value::Array(items) if !items.is_empty() => {
                self.push(kind, depth, format!("{label}["));
                let last = items.len() - 1;
                for (i, child) in items.iter().enumerate() {
                    self.value(kind, child, depth + 1, "", i < last);
                }
                self.push(kind, depth, format!("]{tail}"));
            }
            // scalars and empty containers fit on one line
            _ => self.push(kind, depth, format!("{label}{value}{tail}")),
        }
    }
}

fn comma_str(comma: bool) -> &'static str {
    if comma {
        ","
    } else {
        ""
    }
}

fn entry_label(kind: ContainerKind, key: Option<&str>) -> String {
    match (kind, key) {
        (ContainerKind::Map, Some(key)) => format!("{}: ", quote(key)),
        (ContainerKind::Map, None) => panic!("inconsistent difference path: map entry without key"),
        (ContainerKind::Array, _) => String::new(),
    }
}

/// The label and value of the base entry at `index`.
fn child(container: &Value, index: usize) -> (String, &Value) {
    match container {
        Value::Map(map) => match map.get_index(index) {
            Some((key, value)) => (format!("{}: ", quote(key)), value),
            None => panic!("inconsistent difference path: map index {index} out of range"),
        },
        Value::Array(items) => match items.get(index) {
            Some(value) => (String::new(), value),
            None => panic!("inconsistent difference path: array index {index} out of range"),
        },
        other => panic!("inconsistent difference path: {} value has no entries", other.kind()),
    }
}

/// Sort differences into one slot per base index, plus one for appends.
fn group<'d>(
    differences: &[&'d Difference],
    level: usize,
    kind: ContainerKind,
    len: usize,
) -> Vec<Slot<'d>> {
    let mut slots: Vec<Slot<'d>> = (0..=len)
        .map(|_| Slot {
            inserts: Vec::new(),
            own: Own::Unchanged,
        })
        .collect();

    for &difference in differences {
        let Some(layer) = difference.path.get(level) else {
            panic!("inconsistent difference path: change at level {level} has no layer");
        };
        assert_eq!(
            layer.container, kind,
            "inconsistent difference path: container kind mismatch at level {level}"
        );
        assert!(
            layer.index <= len,
            "inconsistent difference path: index {} past container of length {len}",
            layer.index
        );
        let slot = &mut slots[layer.index];
        let leaf = difference.path.len() == level + 1;

        match (&difference.change, leaf) {
            (Change::Added(new), true) => slot.inserts.push((layer.key.as_deref(), new)),
            (change, true) => {
                assert!(
                    layer.index < len && matches!(slot.own, Own::Unchanged),
                    "inconsistent difference path: conflicting changes at index {}",
                    layer.index
                );
                slot.own = match change {
                    Change::Deleted(old) => Own::Deleted(old),
                    Change::Replaced { old, new } => Own::Replaced { old, new },
                    Change::Added(_) => unreachable!("additions are handled above"),
                };
            }
            (_, false) => {
                assert!(
                    layer.index < len,
                    "inconsistent difference path: nested change past the end"
                );
                match &mut slot.own {
                    Own::Nested(nested) => nested.push(difference),
                    own @ Own::Unchanged => *own = Own::Nested(vec![difference]),
                    Own::Deleted(_) | Own::Replaced { .. } => panic!(
                        "inconsistent difference path: nested change under a replaced entry at index {}",
                        layer.index
                    ),
                }
            }
        }
    }
    slots
}

/// Flatten slots into the sibling sequence: inserts before each base entry.
fn merge(slots: Vec<Slot<'_>>) -> Vec<Entry<'_>> {
    let len = slots.len() - 1;
    let mut entries = Vec::new();
    for (index, slot) in slots.into_iter().enumerate() {
        entries.extend(
            slot.inserts
                .into_iter()
                .map(|(key, value)| Entry::Added(key, value)),
        );
        if index == len {
            break;
        }
        entries.push(match slot.own {
            Own::Unchanged => Entry::Unchanged(index),
            Own::Deleted(old) => Entry::Deleted(index, old),
            Own::Replaced { old, new } => Entry::Replaced(index, old, new),
            Own::Nested(nested) => Entry::Nested(index, nested),
        });
    }
    entries
}

/// Which entries are printed: every change, and unchanged entries within
/// `context` positions of one.
fn visible(entries: &[Entry<'_>], context: usize) -> Vec<bool> {
    let n = entries.len();
    let mut shown = vec![false; n];

    let mut since_change: Option<usize> = None;
    for (i, entry) in entries.iter().enumerate() {
        since_change = if entry.is_change() {
            Some(0)
        } else {
            since_change.map(|d| d + 1)
        };
        if since_change.is_some_and(|d| d <= context) {
            shown[i] = true;
        }
    }

    let mut until_change: Option<usize> = None;
    for (i, entry) in entries.iter().enumerate().rev() {
        until_change = if entry.is_change() {
            Some(0)
        } else {
            until_change.map(|d| d + 1)
        };
        if until_change.is_some_and(|d| d <= context) {
            shown[i] = true;
        }
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare_values;
    use crate::config::CompareOptions;
    use crate::reporter::PathLayer;
    use msgpackdiff_types::OrderedMap;

    fn map(pairs: Vec<(&str, Value)>) -> Value {
        Value::Map(OrderedMap::from_pairs(pairs).unwrap())
    }

    fn report(a: Value, b: Value, context: usize) -> String {
        compare_values(a, b, &CompareOptions::default()).render_to_string(context)
    }

    fn ints(values: impl IntoIterator<Item = i64>) -> Value {
        Value::Array(values.into_iter().map(Value::Int).collect())
    }

    #[test]
    fn equal_objects_render_nothing() {
        let v = map(vec![("id", Value::Int(27)), ("name", Value::from("Jason"))]);
        assert_eq!(report(v.clone(), v, 3), "");
    }

    #[test]
    fn added_key_in_empty_map() {
        let text = report(map(vec![]), map(vec![("user", Value::Nil)]), 3);
        assert_eq!(text, " {\n+  \"user\": null\n }\n");
    }

    #[test]
    fn swapped_array_elements() {
        let text = report(ints([1, 2]), ints([2, 1]), 3);
        assert_eq!(text, " [\n-  1,\n   2,\n+  1\n ]\n");
    }

    #[test]
    fn nested_leaf_change_shows_ancestors() {
        let build = |leaf: i64| {
            map(vec![(
                "a",
                map(vec![("b", map(vec![("c", Value::Int(leaf))]))]),
            )])
        };
        let text = report(build(1), build(2), 3);
        let expected = [
            " {",
            "   \"a\": {",
            "     \"b\": {",
            "-      \"c\": 1",
            "+      \"c\": 2",
            "     }",
            "   }",
            " }",
        ];
        assert_eq!(text.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn root_scalar_replacement() {
        let text = report(Value::Int(1), Value::from("one"), 3);
        assert_eq!(text, "-1\n+\"one\"\n");
    }

    #[test]
    fn root_container_replacement_is_expanded() {
        let text = report(ints([1]), Value::Nil, 3);
        assert_eq!(text, "-[\n-  1\n-]\n+null\n");
    }

    #[test]
    fn context_window_collapses_far_entries() {
        let a = ints(0..10);
        let mut changed: Vec<i64> = (0..10).collect();
        changed[5] = 50;
        let text = report(a, ints(changed), 1);
        // 5 is replaced by 50: LCS drops it and adds the new value after it
        let expected = [
            " [",
            "   ... (4 skipped)",
            "   4,",
            "-  5,",
            "+  50,",
            "   6,",
            "   ... (3 skipped)",
            " ]",
        ];
        assert_eq!(text.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn adjacent_windows_merge() {
        let a = ints(0..6);
        let b = ints([0, 10, 2, 3, 14, 5]);
        let text = report(a, b, 1);
        let expected = [
            " [",
            "   0,",
            "-  1,",
            "+  10,",
            "   2,",
            "   3,",
            "-  4,",
            "+  14,",
            "   5",
            " ]",
        ];
        assert_eq!(text.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn zero_context_shows_only_changes() {
        let a = map(vec![
            ("a", Value::Int(1)),
            ("b", Value::Int(2)),
            ("c", Value::Int(3)),
        ]);
        let b = map(vec![
            ("a", Value::Int(1)),
            ("b", Value::Int(20)),
            ("c", Value::Int(3)),
        ]);
        let expected = [
            " {",
            "   ... (1 skipped)",
            "-  \"b\": 2,",
            "+  \"b\": 20,",
            "   ... (1 skipped)",
            " }",
        ];
        assert_eq!(report(a, b, 0).lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn deleted_container_is_expanded() {
        let a = map(vec![
            ("keep", Value::Bool(true)),
            ("gone", map(vec![("x", Value::Int(1)), ("y", ints([]))])),
        ]);
        let b = map(vec![("keep", Value::Bool(true))]);
        let expected = [
            " {",
            "   \"keep\": true,",
            "-  \"gone\": {",
            "-    \"x\": 1,",
            "-    \"y\": []",
            "-  }",
            " }",
        ];
        assert_eq!(report(a, b, 3).lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn scalar_formatting() {
        let a = map(vec![
            ("f", Value::Float64(123.0)),
            ("bin", Value::Binary(b"test".to_vec())),
            ("c", Value::Complex64(1.0, -2.0)),
        ]);
        let b = map(vec![
            ("f", Value::Float32(1.5)),
            ("bin", Value::Binary(b"test".to_vec())),
            ("c", Value::Complex64(1.0, -2.0)),
        ]);
        let expected = [
            " {",
            "-  \"f\": 123.0,",
            "+  \"f\": 1.5,",
            "   \"bin\": base64(\"dGVzdA==\"),",
            "   \"c\": (1.0-2.0i)",
            " }",
        ];
        assert_eq!(report(a, b, 3).lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn no_differences_prints_base_unchanged() {
        let lines = render_lines(&ints([1, 2]), &[], 0);
        let text: Vec<String> = lines.iter().map(Line::to_string).collect();
        assert_eq!(text, vec![" [", "   1,", "   2", " ]"]);
    }

    #[test]
    fn line_display_and_markers() {
        let line = Line {
            kind: LineKind::Added,
            depth: 2,
            text: "1".into(),
        };
        assert_eq!(line.to_string(), "+    1");
        assert_eq!(LineKind::Skipped.marker(), ' ');
        assert_eq!(LineKind::Deleted.marker(), '-');
    }

    #[test]
    fn write_report_matches_lines() {
        let result = compare_values(ints([1, 2]), ints([1, 3]), &CompareOptions::default());
        let mut out = Vec::new();
        result.render(&mut out, 3).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), result.render_to_string(3));
    }

    #[test]
    #[should_panic(expected = "inconsistent difference path")]
    fn index_past_end_panics() {
        let bad = Difference {
            change: Change::Deleted(Value::Nil),
            path: vec![PathLayer {
                container: ContainerKind::Array,
                index: 5,
                key: None,
            }],
        };
        render_lines(&ints([1]), &[bad], 3);
    }

    #[test]
    #[should_panic(expected = "inconsistent difference path")]
    fn wrong_container_kind_panics() {
        let bad = Difference {
            change: Change::Deleted(Value::Nil),
            path: vec![PathLayer {
                container: ContainerKind::Map,
                index: 0,
                key: Some("k".into()),
            }],
        };
        render_lines(&ints([1]), &[bad], 3);
    }
}
