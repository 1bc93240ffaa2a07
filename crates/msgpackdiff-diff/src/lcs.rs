//! Longest-common-subsequence alignment.
//!
//! Both entry points share one weighted dynamic program over a suffix table:
//! `table[i][j]` is the best total weight aligning `a[i..]` with `b[j..]`.
//! The alignment is read back front to back; a pair is taken when its weight
//! accounts for the table value, and on ties the cursor in the first
//! sequence moves.
//!
//! The result must not depend on argument order. Before running, the longer
//! sequence is placed first; sequences of equal length are ordered
//! lexicographically, values by kind before payload. Pairs are flipped back
//! afterwards, so callers always see `(index in a, index in b)`.

use std::cmp::Ordering;

use tracing::trace;

use msgpackdiff_types::Value;

use crate::compare::diff_values;
use crate::config::CompareOptions;
use crate::equality::scalar_equal;
use crate::reporter::Difference;

const EXACT: u32 = 2;
const PARTIAL: u32 = 1;

/// One aligned pair of elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    /// Index in the first sequence.
    pub a: usize,
    /// Index in the second sequence.
    pub b: usize,
    /// Differences between the two elements. Empty for an exact match;
    /// populated for a partial match between two containers.
    pub differences: Vec<Difference>,
}

impl Match {
    /// True when the two elements are equal, not just closest counterparts.
    pub fn is_exact(&self) -> bool {
        self.differences.is_empty()
    }
}

/// Matched pairs in increasing order of both indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Alignment {
    pub matches: Vec<Match>,
}

impl Alignment {
    /// The `(index in a, index in b)` pairs, without difference lists.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.matches.iter().map(|m| (m.a, m.b)).collect()
    }

    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// True when nothing was matched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Longest common subsequence of two string sequences.
pub fn lcs_strings<S: AsRef<str>>(a: &[S], b: &[S]) -> Vec<String> {
    align_strings(a, b)
        .into_iter()
        .map(|(i, _)| a[i].as_ref().to_owned())
        .collect()
}

/// Index pairs of the longest common subsequence of two string sequences.
pub fn align_strings<S: AsRef<str>>(a: &[S], b: &[S]) -> Vec<(usize, usize)> {
    let swap = should_swap(a.len(), b.len(), || {
        a.iter().map(|s| s.as_ref()).cmp(b.iter().map(|s| s.as_ref()))
    });
    oriented(a.len(), b.len(), swap, |i, j| {
        if a[i].as_ref() == b[j].as_ref() {
            EXACT
        } else {
            0
        }
    })
}

/// Weighted alignment of two value sequences.
///
/// Elements that are equal under `options` weigh 2. Two maps or two arrays
/// that differ weigh 1 when they are each other's closest counterpart: their
/// difference count is the smallest in both their row and their column, and
/// smaller than their combined entry count. Everything else weighs 0.
///
/// Containers are compared in full to compute their weight; the difference
/// lists of partial matches are kept in the returned [`Match`]es.
pub fn lcs_objects(a: &[Value], b: &[Value], options: &CompareOptions) -> Alignment {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return Alignment::default();
    }

    let inner = CompareOptions {
        brief: false,
        ..*options
    };
    let mut weights = vec![0u32; n * m];
    let mut costs: Vec<Option<Vec<Difference>>> = (0..n * m).map(|_| None).collect();

    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            let cell = i * m + j;
            if same_container_kind(x, y) {
                let diffs = diff_values(x, y, &inner);
                if diffs.is_empty() {
                    weights[cell] = EXACT;
                } else {
                    costs[cell] = Some(diffs);
                }
            } else if scalar_equal(x, y, options.flexible_types) {
                weights[cell] = EXACT;
            }
        }
    }

    let cost = |cell: usize| costs[cell].as_ref().map(Vec::len);
    let mut row_min: Vec<Option<usize>> = vec![None; n];
    let mut col_min: Vec<Option<usize>> = vec![None; m];
    for i in 0..n {
        for j in 0..m {
            if let Some(k) = cost(i * m + j) {
                row_min[i] = Some(row_min[i].map_or(k, |r| r.min(k)));
                col_min[j] = Some(col_min[j].map_or(k, |c| c.min(k)));
            }
        }
    }
    for i in 0..n {
        for j in 0..m {
            let Some(k) = cost(i * m + j) else { continue };
            let entries = a[i].child_count().unwrap_or(0) + b[j].child_count().unwrap_or(0);
            if Some(k) == row_min[i] && Some(k) == col_min[j] && k < entries {
                weights[i * m + j] = PARTIAL;
            }
        }
    }

    let swap = should_swap(n, m, || order_sequences(a, b));
    let pairs = oriented(n, m, swap, |i, j| weights[i * m + j]);
    trace!(rows = n, cols = m, matched = pairs.len(), "aligned arrays");

    let matches = pairs
        .into_iter()
        .map(|(i, j)| {
            let cell = i * m + j;
            let differences = if weights[cell] == PARTIAL {
                costs[cell].take().unwrap_or_default()
            } else {
                Vec::new()
            };
            Match {
                a: i,
                b: j,
                differences,
            }
        })
        .collect();
    Alignment { matches }
}

fn same_container_kind(x: &Value, y: &Value) -> bool {
    matches!(
        (x, y),
        (Value::Map(_), Value::Map(_)) | (Value::Array(_), Value::Array(_))
    )
}

/// Total structural order over values: kind first, then payload.
///
/// Two values compare `Equal` only when they are the same variant holding
/// the same payload, so `Int(1)` and `Uint(1)` are told apart.
fn order_values(x: &Value, y: &Value) -> Ordering {
    let by_kind = (x.kind() as u8).cmp(&(y.kind() as u8));
    if by_kind != Ordering::Equal {
        return by_kind;
    }
    match (x, y) {
        (Value::String(p), Value::String(q)) => p.cmp(q),
        (Value::Binary(p), Value::Binary(q)) => p.cmp(q),
        (Value::Map(p), Value::Map(q)) => {
            for ((kp, vp), (kq, vq)) in p.iter().zip(q.iter()) {
                let ord = kp.cmp(kq).then_with(|| order_values(vp, vq));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            p.len().cmp(&q.len())
        }
        (Value::Array(p), Value::Array(q)) => order_sequences(p, q),
        (Value::Float32(p), Value::Float32(q)) => p.total_cmp(q),
        (Value::Float64(p), Value::Float64(q)) => p.total_cmp(q),
        (Value::Bool(p), Value::Bool(q)) => p.cmp(q),
        (Value::Int(p), Value::Int(q)) => p.cmp(q),
        (Value::Uint(p), Value::Uint(q)) => p.cmp(q),
        (Value::Complex64(pr, pi), Value::Complex64(qr, qi)) => {
            pr.total_cmp(qr).then_with(|| pi.total_cmp(qi))
        }
        (Value::Complex128(pr, pi), Value::Complex128(qr, qi)) => {
            pr.total_cmp(qr).then_with(|| pi.total_cmp(qi))
        }
        (Value::Timestamp(p), Value::Timestamp(q)) => p.cmp(q),
        _ => Ordering::Equal,
    }
}

fn order_sequences(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = order_values(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Whether `b` should be aligned as the first sequence.
fn should_swap(len_a: usize, len_b: usize, order: impl FnOnce() -> Ordering) -> bool {
    match len_a.cmp(&len_b) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => order() == Ordering::Greater,
    }
}

/// Run [`align`] with `a` or `b` first and report pairs as `(a, b)`.
fn oriented(
    n: usize,
    m: usize,
    swap: bool,
    weight: impl Fn(usize, usize) -> u32,
) -> Vec<(usize, usize)> {
    if swap {
        align(m, n, |i, j| weight(j, i))
            .into_iter()
            .map(|(i, j)| (j, i))
            .collect()
    } else {
        align(n, m, weight)
    }
}

fn align(n: usize, m: usize, weight: impl Fn(usize, usize) -> u32) -> Vec<(usize, usize)> {
    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            let skip = table[(i + 1) * width + j].max(table[i * width + j + 1]);
            let w = weight(i, j);
            let take = if w > 0 {
                table[(i + 1) * width + j + 1] + w
            } else {
                0
            };
            table[i * width + j] = skip.max(take);
        }
    }

    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        let w = weight(i, j);
        if w > 0 && table[i * width + j] == table[(i + 1) * width + j + 1] + w {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}
