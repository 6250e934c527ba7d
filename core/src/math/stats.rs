pub struct StatsHelper;

impl StatsHelper {
    /// Largest value in the sequence, or 0.0 when it is empty.
    pub fn peak<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
        values.into_iter().copied().fold(0.0, f64::max)
    }

    /// Share of samples whose value reaches `threshold`.
    pub fn fraction_at_or_above<'a>(
        values: impl IntoIterator<Item = &'a f64>,
        threshold: f64,
    ) -> f64 {
        let (hits, total) = values
            .into_iter()
            .fold((0usize, 0usize), |(hits, total), &v| {
                (hits + usize::from(v >= threshold), total + 1)
            });
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_of_empty_sequence_is_zero() {
        assert_eq!(StatsHelper::peak(&[]), 0.0);
        assert_eq!(StatsHelper::peak(&[0.25, 0.75, 0.5]), 0.75);
    }

    #[test]
    fn fraction_counts_inclusive_threshold() {
        let values = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(StatsHelper::fraction_at_or_above(&values, 0.2), 0.75);
        assert_eq!(StatsHelper::fraction_at_or_above(&[], 0.2), 0.0);
    }
}
