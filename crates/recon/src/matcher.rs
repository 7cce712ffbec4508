use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::model::{
    ExpectedEntry, MatchOutput, MatchedPair, Money, ObservedEntry, ValueMatchOutput,
};

// ---------------------------------------------------------------------------
// Value + multiplicity counting
// ---------------------------------------------------------------------------

/// Match two multisets of values by exact equality with multiplicity.
///
/// Per distinct value, `min(expected, observed)` copies are matched and
/// the surplus goes to the one-sided partitions. Output is ordered by
/// value ascending; provenance is not preserved.
pub fn match_by_value(expected: &[Money], observed: &[Money]) -> ValueMatchOutput {
    let mut exp_counts: BTreeMap<Money, usize> = BTreeMap::new();
    for &v in expected {
        *exp_counts.entry(v).or_insert(0) += 1;
    }
    let mut obs_counts: BTreeMap<Money, usize> = BTreeMap::new();
    for &v in observed {
        *obs_counts.entry(v).or_insert(0) += 1;
    }

    let values: BTreeSet<Money> = exp_counts.keys().chain(obs_counts.keys()).copied().collect();

    let mut out = ValueMatchOutput::default();
    for v in values {
        let e = exp_counts.get(&v).copied().unwrap_or(0);
        let o = obs_counts.get(&v).copied().unwrap_or(0);
        for _ in 0..e.min(o) {
            out.matched.push(v);
        }
        for _ in o..e {
            out.missing_from_observed.push(v);
        }
        for _ in e..o {
            out.extra_in_observed.push(v);
        }
    }
    out
}

/// Entry-level attribution of the counting strategy.
///
/// Counts are identical to [`match_by_value`]; the first occurrences of
/// each value (in input order, on each side) are the ones treated as
/// matched, so the partitions keep row provenance.
pub fn match_by_value_entries(
    expected: &[ExpectedEntry],
    observed: &[ObservedEntry],
) -> MatchOutput {
    let mut pools: BTreeMap<Money, VecDeque<usize>> = BTreeMap::new();
    for (oi, obs) in observed.iter().enumerate() {
        pools.entry(obs.amount).or_default().push_back(oi);
    }

    let mut used = vec![false; observed.len()];
    let mut out = MatchOutput::default();

    for exp in expected {
        let candidate = pools.get_mut(&exp.amount).and_then(VecDeque::pop_front);
        match candidate {
            Some(oi) => {
                used[oi] = true;
                out.matched.push(MatchedPair {
                    expected: exp.clone(),
                    observed: observed[oi].clone(),
                    delta_cents: 0,
                });
            }
            None => out.missing_from_observed.push(exp.clone()),
        }
    }

    for (oi, obs) in observed.iter().enumerate() {
        if !used[oi] {
            out.extra_in_observed.push(obs.clone());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Row-preserving tolerance match with label tie-break
// ---------------------------------------------------------------------------

/// Match expected rows against a consumable pool of observed rows.
///
/// Each expected entry, in input order, scans the unconsumed pool for
/// amounts within `tolerance_cents` (boundary inclusive). A single
/// candidate matches outright; among several, the largest label token
/// overlap wins, ties resolved by pool order. A matched observed entry
/// leaves the pool, so no row satisfies two expected entries.
pub fn match_by_row(
    expected: &[ExpectedEntry],
    observed: &[ObservedEntry],
    tolerance_cents: i64,
) -> MatchOutput {
    let mut used = vec![false; observed.len()];
    let mut out = MatchOutput::default();

    for exp in expected {
        let mut best: Option<(usize, usize)> = None; // (pool index, score)

        for (oi, obs) in observed.iter().enumerate() {
            if used[oi] {
                continue;
            }
            if exp.amount.abs_diff(obs.amount) > tolerance_cents {
                continue;
            }
            let score = overlap_score(exp.label.as_deref(), obs.label.as_deref());
            // Strictly-greater keeps the first-encountered candidate on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((oi, score));
            }
        }

        match best {
            Some((oi, _)) => {
                used[oi] = true;
                out.matched.push(MatchedPair {
                    expected: exp.clone(),
                    observed: observed[oi].clone(),
                    delta_cents: exp.amount.cents() - observed[oi].amount.cents(),
                });
            }
            None => out.missing_from_observed.push(exp.clone()),
        }
    }

    for (oi, obs) in observed.iter().enumerate() {
        if !used[oi] {
            out.extra_in_observed.push(obs.clone());
        }
    }
    out
}

/// Number of lowercase whitespace tokens the two labels share.
fn overlap_score(a: Option<&str>, b: Option<&str>) -> usize {
    let (Some(a), Some(b)) = (a, b) else {
        return 0;
    };
    let a: HashSet<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let b: HashSet<String> = b.split_whitespace().map(str::to_lowercase).collect();
    a.intersection(&b).count()
}
