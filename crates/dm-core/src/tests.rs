//! Unit tests for dm-core primitives.

#[cfg(test)]
mod ids {
    use crate::{HouseholdId, PersonId, TypedId};

    #[test]
    fn raw_roundtrip() {
        let id = PersonId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn ordering() {
        assert!(PersonId(0) < PersonId(1));
        assert!(HouseholdId(100) > HouseholdId(99));
    }

    #[test]
    fn display() {
        assert_eq!(PersonId(7).to_string(), "PersonId(7)");
    }
}

#[cfg(test)]
mod id_gen {
    use std::collections::HashSet;

    use crate::{CoreError, IdGenerator, PersonId};

    #[test]
    fn first_id_is_zero_and_increasing() {
        let mut ids = IdGenerator::<PersonId>::new();
        assert_eq!(ids.next().unwrap(), PersonId(0));
        assert_eq!(ids.next().unwrap(), PersonId(1));
        assert_eq!(ids.next().unwrap(), PersonId(2));
    }

    #[test]
    fn skips_registered_ids() {
        let mut ids = IdGenerator::<PersonId>::new();
        ids.use_id(PersonId(1)).unwrap();
        ids.use_id(PersonId(2)).unwrap();
        assert_eq!(ids.next().unwrap(), PersonId(0));
        assert_eq!(ids.next().unwrap(), PersonId(3));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut ids = IdGenerator::<PersonId>::new();
        let issued = ids.next().unwrap();
        let err = ids.use_id(issued).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateId { kind: "person", id: 0 }));
        ids.use_id(PersonId(10)).unwrap();
        assert!(ids.use_id(PersonId(10)).is_err());
    }

    #[test]
    fn never_issues_twice() {
        let mut ids = IdGenerator::<PersonId>::new();
        for raw in [3u32, 5, 6, 20] {
            ids.use_id(PersonId(raw)).unwrap();
        }
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let id = ids.next().unwrap();
            assert!(![3, 5, 6, 20].contains(&id.0), "issued registered ID {id}");
            assert!(seen.insert(id), "issued {id} twice");
        }
        assert_eq!(ids.used_count(), 54);
    }

    #[test]
    fn registration_below_last_is_blocked_for_later_registration() {
        let mut ids = IdGenerator::<PersonId>::new();
        for _ in 0..5 {
            ids.next().unwrap();
        }
        assert!(ids.is_used(PersonId(3)));
        assert!(ids.use_id(PersonId(3)).is_err());
    }
}

#[cfg(test)]
mod geo {
    use crate::Coords;

    #[test]
    fn euclidean_distance() {
        let a = Coords::new(0.0, 0.0);
        let b = Coords::new(3.0, 4.0);
        assert!((a.distance_m(b) - 5.0).abs() < 1e-12);
        assert!((a.distance_sq(b) - 25.0).abs() < 1e-12);
    }
}

#[cfg(test)]
mod time {
    use crate::{ModelDate, SimClock, SimConfig, Tick};

    #[test]
    fn tick_date_roundtrip() {
        let date = ModelDate { year: 1997, month: 12 };
        assert_eq!(date.tick().date(), date);
        assert_eq!(ModelDate { year: 1998, month: 1 }.tick() - date.tick(), 1);
    }

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(t.rewind(20), Tick(0));
        assert_eq!(Tick(15).since(Tick(10)), 5);
        assert_eq!(Tick(10).since(Tick(15)), 0);
    }

    #[test]
    fn decimal_year() {
        assert!((ModelDate { year: 1997, month: 7 }.decimal_year() - 1997.5).abs() < 1e-12);
    }

    #[test]
    fn advance_carries_into_year() {
        let start = ModelDate { year: 1997, month: 11 };
        let mut clock = SimClock::new(start, ModelDate { year: 2000, month: 1 }, 1);
        clock.advance();
        assert_eq!(clock.current, ModelDate { year: 1997, month: 12 });
        clock.advance();
        assert_eq!(clock.current, ModelDate { year: 1998, month: 1 });
        assert_eq!(clock.steps, 2);
    }

    #[test]
    fn advance_multi_month_steps() {
        let mut clock = SimClock::new(
            ModelDate { year: 1997, month: 10 },
            ModelDate { year: 2001, month: 1 },
            6,
        );
        clock.advance();
        assert_eq!(clock.current, ModelDate { year: 1998, month: 4 });
        clock.advance();
        assert_eq!(clock.current, ModelDate { year: 1998, month: 10 });
    }

    #[test]
    fn in_bounds_stops_at_end() {
        let mut clock = SimClock::new(
            ModelDate { year: 1997, month: 1 },
            ModelDate { year: 1997, month: 4 },
            1,
        );
        let mut steps = 0;
        while clock.in_bounds() {
            clock.advance();
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert_eq!(clock.total_steps(), 3);
    }

    #[test]
    fn in_bounds_false_when_passed() {
        let mut clock = SimClock::new(
            ModelDate { year: 1997, month: 1 },
            ModelDate { year: 1997, month: 4 },
            5,
        );
        assert!(clock.in_bounds());
        clock.advance();
        assert!(!clock.in_bounds());
    }

    #[test]
    fn config_validation() {
        let good = SimConfig::default();
        assert!(good.validate().is_ok());

        let mut bad_month = SimConfig::default();
        bad_month.start.month = 13;
        assert!(bad_month.validate().is_err());

        let mut reversed = SimConfig::default();
        reversed.end = reversed.start;
        assert!(reversed.validate().is_err());

        let mut zero_step = SimConfig::default();
        zero_step.timestep_months = 0;
        assert!(zero_step.validate().is_err());

        assert!(ModelDate::new(1850, 1).is_err());
    }

    #[test]
    fn snapshot_steps() {
        let cfg = SimConfig { output_interval_steps: 12, ..SimConfig::default() };
        assert!(cfg.is_snapshot_step(0));
        assert!(!cfg.is_snapshot_step(5));
        assert!(cfg.is_snapshot_step(24));
        let off = SimConfig { output_interval_steps: 0, ..SimConfig::default() };
        assert!(!off.is_snapshot_step(0));
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(1);
        assert!((0..100).all(|_| rng.gen_bool(1.0)));
        assert!((0..100).all(|_| !rng.gen_bool(0.0)));
        // Out-of-range probabilities are clamped, not rejected.
        assert!(rng.gen_bool(7.0));
    }

    #[test]
    fn uniform_empty_interval() {
        let mut rng = SimRng::new(1);
        assert_eq!(rng.uniform(5.0, 5.0), 5.0);
        let v = rng.uniform(1.0, 2.0);
        assert!((1.0..2.0).contains(&v));
    }

    #[test]
    fn weighted_index_respects_zero_weights() {
        let mut rng = SimRng::new(9);
        for _ in 0..100 {
            assert_eq!(rng.weighted_index(&[0.0, 1.0, 0.0]), Some(1));
        }
        assert_eq!(rng.weighted_index(&[]), None);
        assert_eq!(rng.weighted_index(&[0.0, 0.0]), None);
    }

    #[test]
    fn standard_normal_is_finite_and_centered() {
        let mut rng = SimRng::new(3);
        let n = 10_000;
        let mean: f64 = (0..n).map(|_| rng.standard_normal()).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
    }
}
