//! Weighted random choice over a candidate list (A/B routing).

use rand::Rng;

/// Pick one item with probability `weight / total`.
///
/// Draws `r` uniformly in `[1, total]` and returns the first item whose
/// cumulative weight reaches `r`; zero-weight items own no range and are never
/// chosen. A single candidate is returned without touching `rng`. When every
/// weight is zero the choice falls back to uniform.
pub fn pick_weighted<'a, T, R, F>(items: &[&'a T], weight: F, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> u32,
{
    match items.len() {
        0 => return None,
        1 => return Some(items[0]),
        _ => {}
    }

    let total: u64 = items.iter().map(|item| u64::from(weight(*item))).sum();
    if total == 0 {
        let idx = rng.gen_range(0..items.len());
        return Some(items[idx]);
    }

    let r = rng.gen_range(1..=total);
    let mut cumulative = 0u64;
    for item in items {
        cumulative += u64::from(weight(*item));
        if r <= cumulative {
            return Some(*item);
        }
    }
    // Unreachable: the last positive-weight item always closes the range.
    items.last().copied()
}
