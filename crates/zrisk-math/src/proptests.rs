use std::sync::Arc;

use proptest::prelude::*;
use zrisk_core::RatingScale;

use crate::augment::WriteOffSplit;
use crate::matrix::{StochasticMatrix, ROW_SUM_TOLERANCE};

/// Random 3-performing-state matrix with an absorbing default row.
fn arb_matrix() -> impl Strategy<Value = StochasticMatrix> {
    prop::collection::vec(prop::collection::vec(0.001f64..1.0, 4), 3).prop_map(|raw| {
        let scale = Arc::new(RatingScale::from_names(&["A", "B", "C"], "D").unwrap());
        let mut rows: Vec<Vec<f64>> = raw
            .into_iter()
            .map(|r| {
                let sum: f64 = r.iter().sum();
                r.into_iter().map(|x| x / sum).collect()
            })
            .collect();
        rows.push(vec![0.0, 0.0, 0.0, 1.0]);
        StochasticMatrix::normalised(scale, &rows).unwrap()
    })
}

fn assert_stochastic(m: &StochasticMatrix) {
    for i in 0..m.dim() {
        let row = m.row(i);
        assert!(row.iter().all(|p| *p >= 0.0));
        assert!((row.iter().sum::<f64>() - 1.0).abs() <= ROW_SUM_TOLERANCE);
    }
}

proptest! {
    #[test]
    fn prop_power_stays_stochastic(m in arb_matrix(), n in 0u32..24) {
        assert_stochastic(&m.power(n).unwrap());
    }

    #[test]
    fn prop_augmentation_stays_stochastic(
        m in arb_matrix(),
        pcure in 0.0f64..=1.0,
        tts in 1.0f64..60.0,
        cure in prop::option::of(0usize..3),
    ) {
        let split = WriteOffSplit::new(pcure, tts).unwrap();
        let a = m.augment_with_write_off(&split, cure).unwrap();
        assert_stochastic(&a);
        prop_assert_eq!(a.dim(), m.dim() + 1);
        prop_assert_eq!(a.augment_with_write_off(&split, cure).unwrap(), a);
    }
}
