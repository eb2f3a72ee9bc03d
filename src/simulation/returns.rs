//! Discounted and normalized returns
use super::Trajectory;
use crate::utils::stats::OnlineMeanVariance;

/// Lower bound on the standard deviation used to normalize returns.
pub const NORMALIZATION_EPSILON: f64 = 1e-8;

/// Discounted return-to-go of each step.
///
/// `G[T-1] = r[T-1]` and `G[t] = r[t] + discount_factor * G[t+1]`.
pub fn discounted_returns(rewards: &[f64], discount_factor: f64) -> Vec<f64> {
    let mut returns = vec![0.0; rewards.len()];
    let mut next_return = 0.0;
    for (ret, reward) in returns.iter_mut().zip(rewards).rev() {
        next_return = reward + discount_factor * next_return;
        *ret = next_return;
    }
    returns
}

/// Normalize per-step values in place across all sequences of a batch.
///
/// Subtracts the batch mean and divides by the batch standard deviation (or
/// [`NORMALIZATION_EPSILON`] if that is smaller). The nested structure is preserved.
pub fn normalize_returns(returns: &mut [Vec<f64>]) {
    let stats: OnlineMeanVariance<f64> = returns.iter().flatten().copied().collect();
    let (mean, stddev) = match (stats.mean(), stats.stddev()) {
        (Some(mean), Some(stddev)) => (mean, stddev.max(NORMALIZATION_EPSILON)),
        _ => return,
    };
    for value in returns.iter_mut().flatten() {
        *value = (*value - mean) / stddev;
    }
}

/// Normalized discounted returns of every step of every trajectory in a batch.
///
/// Returns one vector per trajectory, aligned with its steps.
pub fn normalized_returns<'a, I>(trajectories: I, discount_factor: f64) -> Vec<Vec<f64>>
where
    I: IntoIterator<Item = &'a Trajectory>,
{
    let mut returns: Vec<Vec<f64>> = trajectories
        .into_iter()
        .map(|trajectory| {
            let rewards: Vec<f64> = trajectory.rewards().collect();
            discounted_returns(&rewards, discount_factor)
        })
        .collect();
    normalize_returns(&mut returns);
    returns
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{:?} != {:?}", actual, expected);
        }
    }

    #[rstest]
    #[case::halving(&[1.0, 1.0, 1.0], 0.5, &[1.75, 1.5, 1.0])]
    #[case::terminal_zero(&[1.0, 1.0, 0.0], 0.5, &[1.5, 1.0, 0.0])]
    #[case::single(&[1.0], 0.95, &[1.0])]
    #[case::empty(&[], 0.95, &[])]
    fn discounted(#[case] rewards: &[f64], #[case] discount: f64, #[case] expected: &[f64]) {
        assert_close(&discounted_returns(rewards, discount), expected);
    }

    #[test]
    fn discounted_satisfies_recurrence() {
        let rewards = [1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let gamma = 0.9;
        let returns = discounted_returns(&rewards, gamma);
        assert_eq!(returns[5], rewards[5]);
        for t in 0..5 {
            assert!((returns[t] - (rewards[t] + gamma * returns[t + 1])).abs() < 1e-12);
        }
    }

    #[test]
    fn normalized_batch_has_zero_mean_unit_stddev() {
        let mut returns = vec![
            discounted_returns(&[1.0, 1.0, 1.0, 0.0], 0.95),
            discounted_returns(&[1.0, 0.0], 0.95),
            discounted_returns(&[1.0; 7], 0.95),
        ];
        normalize_returns(&mut returns);
        assert_eq!(
            returns.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![4, 2, 7]
        );
        let stats: OnlineMeanVariance<f64> = returns.iter().flatten().copied().collect();
        assert!(stats.mean().unwrap().abs() < 1e-9);
        assert!((stats.stddev().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normalization_preserves_order() {
        let mut returns = vec![vec![3.0, 1.0], vec![2.0]];
        normalize_returns(&mut returns);
        assert!(returns[0][0] > returns[1][0]);
        assert!(returns[1][0] > returns[0][1]);
    }

    #[test]
    fn normalization_spans_whole_batch() {
        // Batch mean 2, population stddev sqrt(2/3)
        let mut returns = vec![vec![3.0, 1.0], vec![2.0]];
        normalize_returns(&mut returns);
        let scale = 1.5f64.sqrt();
        assert_close(&returns[0], &[scale, -scale]);
        assert_close(&returns[1], &[0.0]);
    }

    #[test]
    fn constant_batch_normalizes_to_zero() {
        let mut returns = vec![vec![0.0], vec![0.0], vec![0.0]];
        normalize_returns(&mut returns);
        for value in returns.iter().flatten() {
            assert_eq!(*value, 0.0);
        }
    }

    #[test]
    fn empty_batch_is_unchanged() {
        let mut returns: Vec<Vec<f64>> = vec![vec![], vec![]];
        normalize_returns(&mut returns);
        assert!(returns.iter().all(Vec::is_empty));
    }
}
