use crate::integration_tests::_support::{Marker, pool_with_capacity};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_size_never_exceeds_capacity(cap in 1usize..16, releases in 0usize..40, acquires in 0usize..40) {
        let p = pool_with_capacity(cap);
        let accepted = (0..releases).filter(|i| p.release(Box::new(Marker(*i as u64)))).count();
        prop_assert_eq!(accepted, releases.min(cap));
        prop_assert_eq!(p.size("Marker"), releases.min(cap));
        for _ in 0..acquires {
            prop_assert!(p.acquire("Marker", None).is_ok());
        }
        prop_assert_eq!(p.size("Marker"), accepted.saturating_sub(acquires));
        prop_assert!(p.size("Marker") <= p.capacity("Marker"));
        let snap = p.metrics_snapshot();
        prop_assert_eq!(snap.recycled as usize, acquires.min(accepted));
    }
}
