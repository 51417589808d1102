use std::sync::Arc;

use proptest::prelude::*;
use zrisk_config::policy::{ShiftMethod, ZTransform};
use zrisk_core::{RatingScale, Scenario};
use zrisk_math::{StochasticMatrix, WriteOffSplit, ROW_SUM_TOLERANCE};

use crate::credit_cycle::CreditCycleAdjuster;
use crate::propagation::MarkovPropagator;

fn arb_ttc() -> impl Strategy<Value = StochasticMatrix> {
    prop::collection::vec(prop::collection::vec(0.001f64..1.0, 4), 3).prop_map(|raw| {
        let scale = Arc::new(RatingScale::from_names(&["A", "B", "C"], "D").unwrap());
        let mut rows: Vec<Vec<f64>> = raw;
        rows.push(vec![0.0, 0.0, 0.0, 1.0]);
        StochasticMatrix::normalised(scale, &rows).unwrap()
    })
}

fn arb_transform() -> impl Strategy<Value = ZTransform> {
    prop_oneof![Just(ZTransform::Calibrated), Just(ZTransform::Conditional)]
}

fn arb_method() -> impl Strategy<Value = ShiftMethod> {
    prop_oneof![Just(ShiftMethod::CutPoint), Just(ShiftMethod::Barrier)]
}

proptest! {
    #[test]
    fn prop_pit_rows_sum_to_one(
        ttc in arb_ttc(),
        rho in 0.01f64..0.99,
        z in -4.0f64..4.0,
        transform in arb_transform(),
        method in arb_method(),
    ) {
        let pit = CreditCycleAdjuster::new(rho, transform)
            .unwrap()
            .with_method(method)
            .adjust(&ttc, z)
            .unwrap();
        for i in 0..pit.dim() {
            let row = pit.row(i);
            prop_assert!(row.iter().all(|p| *p >= 0.0));
            prop_assert!((row.iter().sum::<f64>() - 1.0).abs() <= ROW_SUM_TOLERANCE);
        }
    }

    #[test]
    fn prop_default_ward_mass_monotone_in_z(
        ttc in arb_ttc(),
        rho in 0.01f64..0.99,
        z1 in -4.0f64..4.0,
        dz in 0.0f64..3.0,
        transform in arb_transform(),
        method in arb_method(),
    ) {
        let adjuster = CreditCycleAdjuster::new(rho, transform).unwrap().with_method(method);
        let low = adjuster.adjust(&ttc, z1).unwrap();
        let high = adjuster.adjust(&ttc, z1 + dz).unwrap();
        for i in 0..ttc.dim() {
            let c_low = low.cumulative_default_ward(i);
            let c_high = high.cumulative_default_ward(i);
            for j in 0..ttc.dim() {
                prop_assert!(c_high[j] >= c_low[j] - 1e-12);
            }
        }
    }

    #[test]
    fn prop_calibrated_zero_is_identity(ttc in arb_ttc(), rho in 0.01f64..0.99) {
        let pit = CreditCycleAdjuster::new(rho, ZTransform::Calibrated)
            .unwrap()
            .adjust(&ttc, 0.0)
            .unwrap();
        for i in 0..ttc.dim() {
            for j in 0..ttc.dim() {
                prop_assert!((pit.get(i, j) - ttc.get(i, j)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn prop_barrier_keeps_default_probability_of_cut_point(
        ttc in arb_ttc(),
        rho in 0.01f64..0.99,
        z in -4.0f64..4.0,
        transform in arb_transform(),
    ) {
        let adjuster = CreditCycleAdjuster::new(rho, transform).unwrap();
        let cut = adjuster.adjust(&ttc, z).unwrap();
        let barrier = adjuster.with_method(ShiftMethod::Barrier).adjust(&ttc, z).unwrap();
        let d = ttc.scale().default_index();
        for i in 0..ttc.dim() {
            prop_assert!((cut.get(i, d) - barrier.get(i, d)).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_trajectory_conserves_mass_and_absorbs(
        ttc in arb_ttc(),
        rho in 0.01f64..0.99,
        z in prop::collection::vec(-3.0f64..3.0, 1..36),
        pcure in 0.0f64..=1.0,
        tts in 1.0f64..36.0,
        start in 0usize..3,
    ) {
        let periods = z.len();
        let scenario = Scenario::new("S", 1.0, z);
        let split = WriteOffSplit::new(pcure, tts).unwrap();
        let adjuster = CreditCycleAdjuster::new(rho, ZTransform::Calibrated).unwrap();
        let path = adjuster
            .pit_path(&ttc, &scenario, periods, Some((&split, Some(0))))
            .unwrap();
        let dist = MarkovPropagator::new(Arc::clone(path[0].scale_handle()))
            .propagate_from_index(start, &path)
            .unwrap();

        prop_assert_eq!(dist.periods(), periods);
        for s in dist.sums() {
            prop_assert!((s - 1.0).abs() < 1e-9);
        }
        let wo = dist.write_off_column();
        for t in 1..wo.len() {
            prop_assert!(wo[t] >= wo[t - 1] - 1e-12);
        }
    }

    #[test]
    fn prop_absorbing_default_column_non_decreasing(
        ttc in arb_ttc(),
        z in prop::collection::vec(-3.0f64..3.0, 1..24),
    ) {
        let periods = z.len();
        let scenario = Scenario::new("S", 1.0, z);
        let adjuster = CreditCycleAdjuster::new(0.2, ZTransform::Calibrated).unwrap();
        let path = adjuster.pit_path(&ttc, &scenario, periods, None).unwrap();
        let dist = MarkovPropagator::new(Arc::clone(ttc.scale_handle()))
            .propagate_from_index(0, &path)
            .unwrap();
        let d = dist.default_column();
        for t in 1..d.len() {
            prop_assert!(d[t] >= d[t - 1] - 1e-12);
        }
    }
}
