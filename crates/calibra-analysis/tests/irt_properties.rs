//! Property tests for the numeric core: bounds, monotonicity, and
//! clamping hold for arbitrary inputs, not just the hand-picked ones.

use proptest::collection::vec;
use proptest::prelude::*;

use calibra_analysis::classical::point_biserial;
use calibra_analysis::irt::newton::estimate_theta;
use calibra_analysis::irt::probability;
use calibra_analysis::reliability::cronbach_alpha;
use calibra_core::constants::{MAX_THETA, MIN_THETA};

proptest! {
    #[test]
    fn probability_stays_in_bounds(
        theta in -100.0f64..100.0,
        a in 0.1f64..4.0,
        b in -100.0f64..100.0,
    ) {
        let p = probability(theta, a, b);
        prop_assert!(p.is_finite());
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn probability_is_half_at_difficulty(
        theta in -100.0f64..100.0,
        a in 0.1f64..4.0,
    ) {
        let p = probability(theta, a, theta);
        prop_assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn probability_monotonic_in_theta(
        theta1 in -50.0f64..50.0,
        delta in 0.0f64..50.0,
        a in 0.1f64..4.0,
        b in -50.0f64..50.0,
    ) {
        let low = probability(theta1, a, b);
        let high = probability(theta1 + delta, a, b);
        prop_assert!(low <= high);
    }

    #[test]
    fn estimated_theta_stays_in_bounds(
        responses in vec(any::<bool>(), 1..30),
        a_seed in 0.2f64..2.5,
        b_spread in 0.1f64..2.0,
    ) {
        let n = responses.len();
        let a = vec![a_seed; n];
        let b: Vec<f64> = (0..n)
            .map(|i| -b_spread + 2.0 * b_spread * i as f64 / n.max(2) as f64)
            .collect();
        let theta = estimate_theta(&responses, &a, &b, 50, 1e-4);
        prop_assert!(theta.is_finite());
        prop_assert!((MIN_THETA..=MAX_THETA).contains(&theta));
    }

    #[test]
    fn point_biserial_stays_in_unit_interval(
        pairs in vec((0.0f64..1.0, 0.0f64..10.0), 50..80),
    ) {
        let item: Vec<f64> = pairs.iter().map(|(i, _)| *i).collect();
        let rest: Vec<f64> = pairs.iter().map(|(_, r)| *r).collect();
        if let Some(r) = point_biserial(&item, &rest) {
            prop_assert!(r.is_finite());
            prop_assert!((-1.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn cronbach_alpha_never_exceeds_one(
        rows in vec(vec(0.0f64..1.0, 3), 50..70),
    ) {
        // Transpose: rows are respondents, alpha wants item columns.
        let items: Vec<Vec<f64>> = (0..3)
            .map(|i| rows.iter().map(|r| r[i]).collect())
            .collect();
        if let Some(alpha) = cronbach_alpha(&items) {
            prop_assert!(alpha.is_finite());
            prop_assert!(alpha <= 1.0);
        }
    }
}
