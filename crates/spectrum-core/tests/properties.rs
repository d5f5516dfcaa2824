//! Property tests over geometry, movement and zones.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use spectrum_core::geometry::{distance, interpolate, AXIS_MAX, AXIS_MIN};
use spectrum_core::{
    classify, Anchor, Axis, AxisSet, IdentityRecord, MemoryDirectory, MemoryHistory,
    MemoryPersistence, Point, PositionGenerator, Spectrum, SpectrumConfig, WeightCategory, Zone,
};

const KEEPER: &str = "keeper@spectrum.local";
const ALICE: &str = "alice@spectrum.social";
const BOB: &str = "bob@elsewhere.net";

fn spectrum() -> Spectrum {
    let directory = MemoryDirectory::with_records([
        IdentityRecord::new(ALICE).with_category(WeightCategory::Local),
        IdentityRecord::new(BOB).with_category(WeightCategory::Remote),
    ]);
    Spectrum::new(
        SpectrumConfig::default(),
        Arc::new(MemoryPersistence::new()),
        Arc::new(directory),
        Arc::new(MemoryHistory::new()),
    )
    .unwrap()
}

fn arb_axis() -> impl Strategy<Value = Axis> {
    prop::sample::select(Axis::ALL.to_vec())
}

fn arb_point() -> impl Strategy<Value = Point> {
    prop::array::uniform6(-20i32..=120).prop_map(Point::new)
}

fn arb_axes() -> impl Strategy<Value = AxisSet> {
    (1u8..64).prop_map(|mask| {
        Axis::ALL
            .into_iter()
            .filter(|axis| mask & (1 << axis.index()) != 0)
            .collect()
    })
}

fn arb_heading() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("affix".to_string()),
        Just("origin".to_string()),
        Just("home".to_string()),
        Just(ALICE.to_string()),
        (arb_axis(), any::<bool>())
            .prop_map(|(axis, plus)| format!("{}{}", axis, if plus { '+' } else { '-' })),
    ]
}

proptest! {
    #[test]
    fn test_points_stay_in_bounds(
        moves in prop::collection::vec((arb_axis(), -150i32..=150), 1..20)
    ) {
        let ctx = spectrum();
        for (axis, delta) in moves {
            let deltas = BTreeMap::from([(axis, delta)]);
            let result = ctx.move_by_delta(BOB, &deltas, "prop").unwrap();
            for (_, value) in result.after.iter() {
                prop_assert!((AXIS_MIN..=AXIS_MAX).contains(&value));
            }
        }
    }

    #[test]
    fn test_generated_points_in_bounds(name in "[a-z]{1,12}@[a-z]{1,10}\\.[a-z]{2,4}") {
        let generator = PositionGenerator::new(KEEPER);
        for category in [None, Some(WeightCategory::Local), Some(WeightCategory::Distant)] {
            let point = generator.generate(&name, category);
            prop_assert_eq!(point, generator.generate(&name, category));
            for (_, value) in point.iter() {
                prop_assert!((AXIS_MIN..=AXIS_MAX).contains(&value));
            }
        }
    }

    #[test]
    fn test_distance_reflexive_and_symmetric(a in arb_point(), b in arb_point(), axes in arb_axes()) {
        prop_assert_eq!(distance(&a, &a, axes), 0.0);
        prop_assert_eq!(distance(&a, &b, axes), distance(&b, &a, axes));
        prop_assert!(distance(&a, &b, axes) <= distance(&a, &b, AxisSet::all()));
    }

    #[test]
    fn test_interpolate_endpoints(current in 0i32..=100, target in 0i32..=100) {
        prop_assert_eq!(interpolate(current, target, 0.0), current);
        prop_assert_eq!(interpolate(current, target, 1.0), target);
    }

    #[test]
    fn test_interpolate_never_overshoots(
        current in 0i32..=100,
        target in 0i32..=100,
        fraction in 0.0f64..=1.0,
    ) {
        let next = interpolate(current, target, fraction);
        prop_assert!((next - target).abs() <= (current - target).abs());
        prop_assert!((next - current) * (target - current) >= 0);
        if fraction > 0.0 && current != target {
            prop_assert_ne!(next, current);
        }
    }

    #[test]
    fn test_sphere_contains_center(radius in 0.0f64..300.0, start in arb_point(), axes in arb_axes()) {
        let ctx = spectrum();
        let values: BTreeMap<Axis, i32> = start.iter().collect();
        ctx.set_absolute(ALICE, &values, "prop").unwrap();
        ctx.save_zone(&Zone::sphere("zone_alice", "Alice", Anchor::identity(ALICE), radius).with_axes(axes))
            .unwrap();
        ctx.save_zone(&Zone::sphere("zone_fixed", "Fixed", Anchor::Fixed(start), radius).with_axes(axes))
            .unwrap();
        prop_assert!(ctx.zone_contains("zone_alice", ALICE).unwrap());
        prop_assert!(ctx.zone_contains("zone_fixed", ALICE).unwrap());
    }

    #[test]
    fn test_empty_delta_keeps_point_and_octant(start in arb_point()) {
        let ctx = spectrum();
        let values: BTreeMap<Axis, i32> = start.iter().collect();
        ctx.set_absolute(ALICE, &values, "prop").unwrap();
        let result = ctx.move_by_delta(ALICE, &BTreeMap::new(), "prop").unwrap();
        prop_assert_eq!(result.before, result.after);
        prop_assert_eq!(classify(&result.after), classify(&start));
        prop_assert!(result.actual_delta.is_empty());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_keeper_stays_at_origin(
        headings in prop::collection::vec(arb_heading(), 1..4),
        ticks in 1usize..4,
    ) {
        let ctx = spectrum();
        for heading in &headings {
            ctx.set_heading(KEEPER, heading).unwrap();
            ctx.set_heading(BOB, heading).unwrap();
            for _ in 0..ticks {
                ctx.run_tick().unwrap();
            }
            prop_assert!(ctx.get_point(KEEPER).unwrap().is_origin());
        }
    }
}
