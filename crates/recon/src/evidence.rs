use crate::model::{MatchOutput, ReconInput, ReconSummary};

/// Partition counts plus whatever the loaders had to discard.
pub fn compute_summary(output: &MatchOutput, input: &ReconInput) -> ReconSummary {
    ReconSummary {
        total_expected: input.expected.entries.len(),
        total_observed: input.observed.entries.len(),
        matched: output.matched.len(),
        missing_from_observed: output.missing_from_observed.len(),
        extra_in_observed: output.extra_in_observed.len(),
        dropped_expected: input.expected.dropped,
        dropped_observed: input.observed.dropped,
        skipped_expected: input.expected.skipped_nonpositive,
        skipped_observed: input.observed.skipped_nonpositive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::match_by_row;
    use crate::model::{ExpectedEntry, LoadedSource, Money, ObservedEntry};

    fn exp(cents: i64) -> ExpectedEntry {
        ExpectedEntry {
            amount: Money::from_cents(cents),
            locator: "row 2".into(),
            label: None,
        }
    }

    fn obs(cents: i64) -> ObservedEntry {
        ObservedEntry { amount: Money::from_cents(cents), label: None }
    }

    #[test]
    fn summary_counts_and_invariants() {
        let input = ReconInput {
            expected: LoadedSource {
                entries: vec![exp(1000), exp(2000), exp(3000)],
                dropped: 1,
                skipped_nonpositive: 2,
            },
            observed: LoadedSource {
                entries: vec![obs(2000), obs(9000)],
                dropped: 0,
                skipped_nonpositive: 0,
            },
        };
        let output = match_by_row(&input.expected.entries, &input.observed.entries, 0);
        let summary = compute_summary(&output, &input);

        assert_eq!(summary.total_expected, 3);
        assert_eq!(summary.total_observed, 2);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.missing_from_observed, 2);
        assert_eq!(summary.extra_in_observed, 1);
        assert_eq!(summary.dropped_expected, 1);
        assert_eq!(summary.skipped_expected, 2);

        // Partition invariants
        assert_eq!(summary.matched + summary.missing_from_observed, summary.total_expected);
        assert_eq!(summary.matched + summary.extra_in_observed, summary.total_observed);
    }
}
