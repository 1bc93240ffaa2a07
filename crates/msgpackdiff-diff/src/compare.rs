//! Recursive tree comparison.
//!
//! The comparator walks two [`Value`] trees in lockstep and records every
//! mismatch with a [`Reporter`]. Maps are aligned by key (an LCS over the key
//! order, or plain lookup under `ignore_order`), arrays by a weighted LCS over
//! their elements. Comparison never fails: mismatches are data.

use std::io;
use std::iter;

use tracing::debug;

use msgpackdiff_codec::{parse_all_with, ParserConfig};
use msgpackdiff_types::{OrderedMap, Value};

use crate::config::{CompareOptions, DiffConfig};
use crate::equality::scalar_equal;
use crate::error::DiffResult;
use crate::lcs::{align_strings, lcs_objects, Match};
use crate::render::{render_lines, write_report, Line};
use crate::reporter::{Difference, Reporter};

/// The outcome of comparing two objects.
#[derive(Clone, Debug, PartialEq)]
pub struct CompareResult {
    /// The base tree. Differences are located relative to it.
    pub first: Value,
    pub second: Value,
    /// True when no differences were found.
    pub equal: bool,
    /// The comparison stopped at the first difference.
    pub brief: bool,
    differences: Vec<Difference>,
}

impl CompareResult {
    /// Recorded differences, in traversal order. In brief mode at most one.
    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    /// Report lines for an unequal, non-brief result. Empty otherwise.
    pub fn lines(&self, context: usize) -> Vec<Line> {
        if self.brief || self.equal {
            return Vec::new();
        }
        render_lines(&self.first, &self.differences, context)
    }

    /// Write the annotated report. Writes nothing if the objects are equal
    /// or the comparison was brief.
    pub fn render<W: io::Write>(&self, w: &mut W, context: usize) -> io::Result<()> {
        if self.brief || self.equal {
            return Ok(());
        }
        write_report(w, &self.first, &self.differences, context)
    }

    pub fn render_to_string(&self, context: usize) -> String {
        self.lines(context)
            .iter()
            .map(|line| format!("{line}\n"))
            .collect()
    }
}

/// Parse two MessagePack buffers and compare them.
pub fn compare(a: &[u8], b: &[u8], options: &CompareOptions) -> DiffResult<CompareResult> {
    compare_parsed(a, b, options, &ParserConfig::default())
}

/// Like [`compare`], with parser settings taken from `config` as well.
pub fn compare_with(a: &[u8], b: &[u8], config: &DiffConfig) -> DiffResult<CompareResult> {
    compare_parsed(a, b, &config.options, &config.parser_config())
}

fn compare_parsed(
    a: &[u8],
    b: &[u8],
    options: &CompareOptions,
    parser: &ParserConfig,
) -> DiffResult<CompareResult> {
    let first = parse_all_with(a, parser)?;
    let second = parse_all_with(b, parser)?;
    Ok(compare_values(first, second, options))
}

/// Compare two already parsed trees.
pub fn compare_values(first: Value, second: Value, options: &CompareOptions) -> CompareResult {
    let mut comparator = Comparator::new(*options);
    comparator.compare(&first, &second);
    let differences = comparator.finish();
    let equal = differences.is_empty();

    debug!(
        equal,
        differences = differences.len(),
        brief = options.brief,
        "comparison finished"
    );
    CompareResult {
        first,
        second,
        equal,
        brief: options.brief,
        differences,
    }
}

/// Whether two values are equal under `options`. Stops at the first difference.
pub fn is_equal(a: &Value, b: &Value, options: &CompareOptions) -> bool {
    let mut comparator = Comparator::new(CompareOptions {
        brief: true,
        ..*options
    });
    comparator.compare(a, b);
    comparator.reporter.difference_count() == 0
}

/// Every difference between two values, relative to `a`.
pub(crate) fn diff_values(a: &Value, b: &Value, options: &CompareOptions) -> Vec<Difference> {
    let mut comparator = Comparator::new(*options);
    comparator.compare(a, b);
    comparator.finish()
}

/// One comparison pass.
struct Comparator {
    options: CompareOptions,
    reporter: Reporter,
}

impl Comparator {
    fn new(options: CompareOptions) -> Self {
        Self {
            options,
            reporter: Reporter::new(options.brief),
        }
    }

    fn finish(self) -> Vec<Difference> {
        self.reporter.into_differences()
    }

    fn stopped(&self) -> bool {
        self.reporter.should_stop()
    }

    /// Whether an unmatched map entry goes unreported. Array elements are
    /// always reported.
    fn skip_unmatched(&self, value: &Value) -> bool {
        self.options.ignore_empty && value.is_empty_value()
    }

    fn compare(&mut self, a: &Value, b: &Value) {
        match (a, b) {
            (Value::Map(x), Value::Map(y)) => {
                if self.options.ignore_order {
                    self.compare_maps_unordered(x, y);
                } else {
                    self.compare_maps(x, y);
                }
            }
            (Value::Array(x), Value::Array(y)) => self.compare_arrays(x, y),
            _ => {
                if !scalar_equal(a, b, self.options.flexible_types) {
                    self.reporter.log_change(a, b);
                }
            }
        }
    }

    /// Order-sensitive map comparison over the LCS of the key sequences.
    fn compare_maps(&mut self, a: &OrderedMap, b: &OrderedMap) {
        let pairs = align_strings(a.keys(), b.keys());
        self.reporter.enter_map();

        let (mut ia, mut ib) = (0, 0);
        'walk: for (ma, mb) in pairs.into_iter().chain(iter::once((a.len(), b.len()))) {
            while ia < ma {
                if let Some((key, value)) = a.get_index(ia) {
                    if !self.skip_unmatched(value) {
                        self.reporter.set_key(ia, key);
                        self.reporter.log_deletion(value);
                    }
                }
                ia += 1;
                if self.stopped() {
                    break 'walk;
                }
            }
            while ib < mb {
                if let Some((key, value)) = b.get_index(ib) {
                    if !self.skip_unmatched(value) {
                        self.reporter.set_key(ia, key);
                        self.reporter.log_addition(value);
                    }
                }
                ib += 1;
                if self.stopped() {
                    break 'walk;
                }
            }
            if let (Some((key, va)), Some((_, vb))) = (a.get_index(ma), b.get_index(mb)) {
                self.reporter.set_key(ma, key);
                self.compare(va, vb);
                ia += 1;
                ib += 1;
                if self.stopped() {
                    break 'walk;
                }
            }
        }

        self.reporter.leave();
    }

    /// Map comparison by key lookup. Additions go after the last base entry.
    fn compare_maps_unordered(&mut self, a: &OrderedMap, b: &OrderedMap) {
        self.reporter.enter_map();

        'walk: {
            for (index, (key, va)) in a.iter().enumerate() {
                match b.get(key) {
                    Some(vb) => {
                        self.reporter.set_key(index, key);
                        self.compare(va, vb);
                    }
                    None if self.skip_unmatched(va) => {}
                    None => {
                        self.reporter.set_key(index, key);
                        self.reporter.log_deletion(va);
                    }
                }
                if self.stopped() {
                    break 'walk;
                }
            }
            for (key, vb) in b.iter() {
                if a.contains_key(key) || self.skip_unmatched(vb) {
                    continue;
                }
                self.reporter.set_key(a.len(), key);
                self.reporter.log_addition(vb);
                if self.stopped() {
                    break 'walk;
                }
            }
        }

        self.reporter.leave();
    }

    fn compare_arrays(&mut self, a: &[Value], b: &[Value]) {
        let alignment = lcs_objects(a, b, &self.options);
        self.reporter.enter_array();

        let (mut ia, mut ib) = (0, 0);
        let matches = alignment.matches.into_iter().map(Some).chain(iter::once(None));
        'walk: for matched in matches {
            let (ma, mb) = matched
                .as_ref()
                .map_or((a.len(), b.len()), |m: &Match| (m.a, m.b));
            while ia < ma {
                self.reporter.set_index(ia);
                self.reporter.log_deletion(&a[ia]);
                ia += 1;
                if self.stopped() {
                    break 'walk;
                }
            }
            while ib < mb {
                self.reporter.set_index(ia);
                self.reporter.log_addition(&b[ib]);
                ib += 1;
                if self.stopped() {
                    break 'walk;
                }
            }
            if let Some(m) = matched {
                self.reporter.set_index(ma);
                if !m.is_exact() {
                    self.reporter.absorb(m.differences);
                }
                ia += 1;
                ib += 1;
                if self.stopped() {
                    break 'walk;
                }
            }
        }

        self.reporter.leave();
    }
}
