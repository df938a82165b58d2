//! Run-length map patches.
//!
//! Every snapshot carries the map and city arrays as a diff against the
//! previous snapshot. A diff alternates two kinds of runs, always starting
//! with a copy run (which may be zero-length):
//!
//! - copy run: `n`, meaning "keep the next `n` elements of the old array"
//! - replace run: `n, v1, .., vn`, meaning "emit these `n` literal values"
//!
//! A truncated diff is not an error: the output simply ends early, and the
//! caller treats the returned length as authoritative.

/// Applies a run-length diff to the previous array and returns the new array.
pub fn apply_patch(previous: &[i32], diff: &[i32]) -> Vec<i32> {
    let mut out: Vec<i32> = Vec::with_capacity(previous.len());
    let mut i = 0;

    while i < diff.len() {
        let copy = run_len(diff[i]);
        if copy > 0 {
            let start = out.len().min(previous.len());
            let end = (out.len() + copy).min(previous.len());
            out.extend_from_slice(&previous[start..end]);
        }
        i += 1;

        if i < diff.len() {
            let replace = run_len(diff[i]);
            if replace > 0 {
                let start = (i + 1).min(diff.len());
                let end = (i + 1 + replace).min(diff.len());
                out.extend_from_slice(&diff[start..end]);
                i += replace;
            }
        }
        i += 1;
    }

    out
}

/// Encodes `next` as a diff against `previous`, such that
/// `apply_patch(previous, &encode_patch(previous, next)) == next`.
pub fn encode_patch(previous: &[i32], next: &[i32]) -> Vec<i32> {
    let mut diff = Vec::new();
    let mut i = 0;

    while i < next.len() {
        let copy_start = i;
        while i < next.len() && i < previous.len() && previous[i] == next[i] {
            i += 1;
        }
        diff.push((i - copy_start) as i32);

        let replace_start = i;
        while i < next.len() && (i >= previous.len() || previous[i] != next[i]) {
            i += 1;
        }
        if i > replace_start {
            diff.push((i - replace_start) as i32);
            diff.extend_from_slice(&next[replace_start..i]);
        }
    }

    diff
}

/// Negative run lengths are malformed; they count as empty runs.
fn run_len(n: i32) -> usize {
    n.max(0) as usize
}
