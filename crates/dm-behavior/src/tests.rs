//! Unit tests for dm-behavior.

#[cfg(test)]
mod fixtures {
    use dm_agent::{
        Ethnicity, LandClaim, LandLedger, NewHousehold, NewNeighborhood, PersonBuilder, Sex, World,
    };
    use dm_core::{HouseholdId, ModelDate, PersonId, Tick};

    pub fn now() -> Tick {
        ModelDate::new(2000, 1).unwrap().tick()
    }

    /// A world with one placed household; returns it and its ID.
    pub fn world() -> (World, HouseholdId) {
        let mut world = World::new();
        let region = world.new_region(None, true).unwrap();
        let nbh = world
            .new_neighborhood(region, NewNeighborhood {
                land: LandLedger { agveg: 50.0, nonagveg: 50.0, ..Default::default() },
                ..Default::default()
            })
            .unwrap();
        let hh = world.new_household(NewHousehold::default()).unwrap();
        world.place_household(hh, nbh, LandClaim::Exempt).unwrap();
        (world, hh)
    }

    pub fn resident(world: &mut World, hh: HouseholdId, sex: Sex, age_years: u32, eth: u8) -> PersonId {
        let pid = world
            .new_person(PersonBuilder::new(sex, Ethnicity(eth), age_years * 12, now()))
            .unwrap();
        world.add_to_household(pid, hh).unwrap();
        pid
    }
}

#[cfg(test)]
mod dist {
    use dm_core::SimRng;

    use crate::{AgeTable, BehaviorError, ProbDist, TimeUnit, per_step};

    #[test]
    fn draws_stay_inside_limits() {
        let dist = ProbDist::new(vec![2.0, 4.0, 10.0], vec![1.0, 3.0]);
        dist.validate("d").unwrap();
        let mut rng = SimRng::new(1);
        for _ in 0..1000 {
            let x = dist.draw(&mut rng);
            assert!((2.0..10.0).contains(&x), "{x}");
        }
    }

    #[test]
    fn zero_weight_bin_is_never_drawn() {
        let dist = ProbDist::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0]);
        let mut rng = SimRng::new(3);
        for _ in 0..200 {
            assert!(dist.draw(&mut rng) >= 1.0);
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let dist = ProbDist::new(vec![0.0, 5.0, 50.0], vec![0.5, 0.5]);
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        let xs: Vec<f64> = (0..20).map(|_| dist.draw(&mut a)).collect();
        let ys: Vec<f64> = (0..20).map(|_| dist.draw(&mut b)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn malformed_distributions_are_rejected() {
        let cases = [
            ProbDist::new(vec![0.0], vec![]),
            ProbDist::new(vec![0.0, 1.0], vec![0.5, 0.5]),
            ProbDist::new(vec![1.0, 0.0], vec![1.0]),
            ProbDist::new(vec![0.0, 1.0], vec![-1.0]),
            ProbDist::new(vec![0.0, 1.0], vec![0.0]),
        ];
        for dist in cases {
            assert!(matches!(dist.validate("d"), Err(BehaviorError::BadDistribution { .. })));
        }
    }

    #[test]
    fn mean_of_bin_midpoints() {
        let dist = ProbDist::new(vec![0.0, 2.0, 4.0], vec![1.0, 1.0]);
        assert_eq!(dist.mean(), 2.0);
    }

    #[test]
    fn yearly_probability_converts_to_monthly() {
        let monthly = per_step(0.12, TimeUnit::Years.months(), 1);
        assert!((monthly - (1.0 - 0.88f64.powf(1.0 / 12.0))).abs() < 1e-12);
        assert_eq!(per_step(0.3, 1.0, 1), 0.3);
        // Twelve monthly survivals compound back to the yearly one.
        assert!(((1.0 - monthly).powi(12) - 0.88).abs() < 1e-12);
    }

    #[test]
    fn lookup_rounds_and_clamps() {
        let table = AgeTable::from_bands(&[(0.0, 10.0, 0.1), (10.0, 20.0, 0.2), (20.0, 30.0, 0.3)]);
        table.validate("t").unwrap();
        let steps = table.resolve(TimeUnit::Months, 1);
        assert_eq!(steps.lookup(9), 0.1);
        assert_eq!(steps.lookup(10), 0.2);
        assert_eq!(steps.lookup(29), 0.3);
        assert_eq!(steps.lookup(500), 0.3);

        let years = table.resolve(TimeUnit::Years, 12);
        // 113 months rounds to 9 years; 115 rounds to 10.
        assert_eq!(years.lookup(113), 0.1);
        assert_eq!(years.lookup(115), 0.2);
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let gap = AgeTable::from_bands(&[(0.0, 10.0, 0.1), (12.0, 20.0, 0.2)]);
        assert!(matches!(gap.validate("t"), Err(BehaviorError::BadAgeTable { .. })));
        let late = AgeTable::from_bands(&[(5.0, 10.0, 0.1)]);
        assert!(late.validate("t").is_err());
        let bad_prob = AgeTable::from_bands(&[(0.0, 10.0, 1.5)]);
        assert!(matches!(bad_prob.validate("t"), Err(BehaviorError::NotAProbability { .. })));
        assert!(AgeTable { bands: vec![] }.validate("t").is_err());
    }
}

#[cfg(test)]
mod params {
    use crate::{
        DivorcePlacement, FirstBirthTiming, FuelwoodModel, MarriageModel, Parameters,
        ReturnPlacement, TimeUnit,
    };

    #[test]
    fn defaults_validate() {
        Parameters::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let json = r#"{
            "time_units": "decades",
            "divorce": { "probability": 0.01 },
            "placement": { "divorce": "current_neighborhood", "return": "always_new_household" }
        }"#;
        let params: Parameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.time_units, TimeUnit::Decades);
        assert_eq!(params.divorce.probability, 0.01);
        assert_eq!(params.placement.divorce, DivorcePlacement::CurrentNeighborhood);
        assert_eq!(params.placement.return_, ReturnPlacement::AlwaysNewHousehold);
        assert_eq!(params.birth, Parameters::default().birth);
        params.validate().unwrap();
    }

    #[test]
    fn tagged_variants_parse() {
        let json = r#"{
            "birth": { "first_birth": { "model": "logistic", "intercept": 1.5,
                                        "ethnicity": [{ "code": 2, "coef": 0.4 }] } },
            "marriage": { "model": { "model": "logistic", "age": 0.2 } },
            "fuelwood": { "enabled": true,
                          "model": { "model": "migration_feedback", "window_months": 12,
                                     "multiplier": 0.5, "coefficients": { "intercept": 3.0 } } }
        }"#;
        let params: Parameters = serde_json::from_str(json).unwrap();
        match &params.birth.first_birth {
            FirstBirthTiming::Logistic(c) => {
                assert_eq!(c.intercept, 1.5);
                assert_eq!(c.ethnicity[0].code, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(params.marriage.model, MarriageModel::Logistic(ref c) if c.age == 0.2));
        assert!(matches!(
            params.fuelwood.model,
            FuelwoodModel::MigrationFeedback { window_months: 12, .. }
        ));
    }

    #[test]
    fn unknown_parameterization_is_rejected() {
        let json = r#"{ "migration": { "model": { "model": "gravity" } } }"#;
        assert!(serde_json::from_str::<Parameters>(json).is_err());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut params = Parameters::default();
        params.marriage.moveout_probability = 1.2;
        assert!(params.validate().is_err());

        let mut params = Parameters::default();
        params.birth.min_age_years = 50.0;
        assert!(params.validate().is_err());

        let mut params = Parameters::default();
        params.inmigration.ethnicity_weights.clear();
        assert!(params.validate().is_err());
    }
}

#[cfg(test)]
mod standard {
    use dm_agent::{DesiredChildren, Ethnicity, PersonBuilder, Sex};
    use dm_core::SimRng;

    use super::fixtures::*;
    use crate::{
        AgeTable, DeathParams, DemographicModel, FirstBirthCoefficients, FirstBirthTiming,
        FuelwoodCoefficients, FuelwoodModel, HouseholdView, MarriageCoefficients, MarriageModel,
        Parameters, PersonView, StandardModel, TimeUnit,
    };

    fn monthly(params: Parameters) -> StandardModel {
        StandardModel::new(params, 1).unwrap()
    }

    #[test]
    fn zero_step_is_a_config_error() {
        assert!(StandardModel::new(Parameters::default(), 0).is_err());
    }

    #[test]
    fn death_uses_sex_specific_tables() {
        let params = Parameters {
            time_units: TimeUnit::Months,
            death: DeathParams { female: AgeTable::flat(0.01), male: AgeTable::flat(0.02) },
            ..Default::default()
        };
        let model = monthly(params);
        let (mut world, hh) = world();
        let f = resident(&mut world, hh, Sex::Female, 30, 1);
        let m = resident(&mut world, hh, Sex::Male, 30, 1);
        assert_eq!(model.death_probability(PersonView::of(&world, f).unwrap()), 0.01);
        assert_eq!(model.death_probability(PersonView::of(&world, m).unwrap()), 0.02);
    }

    #[test]
    fn simple_first_birth_waits_for_timing() {
        let model = monthly(Parameters::default());
        let (mut world, hh) = world();
        let wife = resident(&mut world, hh, Sex::Female, 22, 1);
        let husband = resident(&mut world, hh, Sex::Male, 25, 1);
        world.marry(wife, husband, now(), || DesiredChildren::Count(2)).unwrap();
        world.person_mut(wife).unwrap().fertility.first_birth_timing = Some(10);

        let mut rng = SimRng::new(0);
        let view = PersonView::of(&world, wife).unwrap();
        assert!(!model.first_birth_due(view, now() + 9, &mut rng));
        assert!(model.first_birth_due(view, now() + 10, &mut rng));
    }

    #[test]
    fn logistic_first_birth_respects_minimum_wait() {
        let params = Parameters {
            birth: crate::BirthParams {
                first_birth: FirstBirthTiming::Logistic(FirstBirthCoefficients {
                    intercept: -50.0,
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        let model = monthly(params);
        let (mut world, hh) = world();
        let wife = resident(&mut world, hh, Sex::Female, 22, 1);
        let husband = resident(&mut world, hh, Sex::Male, 25, 1);
        world.marry(wife, husband, now(), || DesiredChildren::Count(2)).unwrap();

        let mut rng = SimRng::new(0);
        let view = PersonView::of(&world, wife).unwrap();
        assert!(!model.first_birth_due(view, now() + 8, &mut rng));
        // 1 / (1 + e^-50) is effectively one.
        assert!(model.first_birth_due(view, now() + 9, &mut rng));
        assert_eq!(model.draw_first_birth_timing(&mut rng), None);
    }

    #[test]
    fn logistic_terms() {
        let (mut world, hh) = world();
        let p = resident(&mut world, hh, Sex::Female, 20, 1);
        let view = PersonView::of(&world, p).unwrap();

        let zero = crate::standard::first_birth_probability(&FirstBirthCoefficients::default(), view, 12);
        assert!((zero - 0.5).abs() < 1e-12);

        let c = MarriageCoefficients { female: 1.0, ..Default::default() };
        let prob = crate::standard::marriage_probability(&c, view);
        assert!((prob - 1.0 / (1.0 + (-1.0f64).exp())).abs() < 1e-12);

        let logistic = Parameters {
            marriage: crate::MarriageParams {
                model: MarriageModel::Logistic(MarriageCoefficients::default()),
                ..Default::default()
            },
            ..Default::default()
        };
        let two_month = StandardModel::new(logistic, 2).unwrap();
        assert!((two_month.marriage_probability(view) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn spouse_choice_skips_incompatible_candidates() {
        let model = monthly(Parameters::default());
        let (mut world, hh) = world();
        let me = resident(&mut world, hh, Sex::Female, 20, 1);
        let same_sex = resident(&mut world, hh, Sex::Female, 22, 1);
        let other_eth = resident(&mut world, hh, Sex::Male, 22, 2);
        let good = resident(&mut world, hh, Sex::Male, 23, 1);

        let mother = resident(&mut world, hh, Sex::Female, 45, 1);
        let brother = resident(&mut world, hh, Sex::Male, 22, 1);
        world.set_parents(me, Some(mother), None).unwrap();
        world.set_parents(brother, Some(mother), None).unwrap();

        let view = |id| PersonView::of(&world, id).unwrap();
        let candidates = [view(same_sex), view(other_eth), view(brother), view(good)];
        let mut rng = SimRng::new(9);
        for _ in 0..20 {
            assert_eq!(model.choose_spouse(view(me), &candidates, &mut rng), Some(3));
        }
        assert_eq!(model.choose_spouse(view(me), &candidates[..3], &mut rng), None);
        assert_eq!(model.choose_spouse(view(brother), &[view(me)], &mut rng), None);
    }

    #[test]
    fn in_migrants_are_never_siblings() {
        let model = monthly(Parameters::default());
        let (mut world, hh) = world();
        let mother = resident(&mut world, hh, Sex::Female, 45, 1);
        let me = resident(&mut world, hh, Sex::Female, 20, 1);
        world.set_parents(me, Some(mother), None).unwrap();
        let newcomer = world
            .new_person(PersonBuilder::new(Sex::Male, Ethnicity(1), 22 * 12, now()).parents(Some(mother), None).in_migrant())
            .unwrap();
        world.add_to_household(newcomer, hh).unwrap();

        let view = |id| PersonView::of(&world, id).unwrap();
        assert!(!view(me).person.is_sibling(view(newcomer).person));
        let mut rng = SimRng::new(9);
        assert_eq!(model.choose_spouse(view(me), &[view(newcomer)], &mut rng), Some(0));
    }

    #[test]
    fn fuelwood_regression_and_feedback() {
        let coefficients = FuelwoodCoefficients {
            intercept:          1.0,
            hh_size:            1.0,
            hh_size_squared:    0.5,
            ethnic_code:        1,
            ethnic:             2.0,
            own_non_wood_stove: -1.0,
            residual_sd:        0.0,
        };
        let (mut world, hh) = world();
        resident(&mut world, hh, Sex::Male, 40, 1);
        resident(&mut world, hh, Sex::Female, 38, 1);
        world.household_mut(hh).unwrap().traits.any_non_wood_fuel = true;
        world.household_mut(hh).unwrap().last_migration = Some(now());

        let mut rng = SimRng::new(0);
        let regression = Parameters {
            fuelwood: crate::FuelwoodParams { enabled: true, model: FuelwoodModel::Regression(coefficients.clone()) },
            ..Default::default()
        };
        let view = HouseholdView::of(&world, hh).unwrap();
        // 1 + 2 + 0.5*4 + 2 - 1
        assert_eq!(monthly(regression).fuelwood_usage(view, now(), &mut rng), 6.0);

        let feedback = Parameters {
            fuelwood: crate::FuelwoodParams {
                enabled: true,
                model:   FuelwoodModel::MigrationFeedback { coefficients, window_months: 6, multiplier: 0.5 },
            },
            ..Default::default()
        };
        let model = monthly(feedback);
        assert_eq!(model.fuelwood_usage(view, now() + 6, &mut rng), 3.0);
        assert_eq!(model.fuelwood_usage(view, now() + 7, &mut rng), 6.0);
    }

    #[test]
    fn fuelwood_is_floored_at_zero() {
        let c = FuelwoodCoefficients { intercept: -100.0, residual_sd: 0.0, ..Default::default() };
        let (mut world, hh) = world();
        resident(&mut world, hh, Sex::Male, 40, 3);
        let mut rng = SimRng::new(0);
        let view = HouseholdView::of(&world, hh).unwrap();
        assert_eq!(crate::standard::fuelwood_regression(&c, view, &mut rng), 0.0);
    }

    #[test]
    fn desired_children_sentinel() {
        let mut params = Parameters::default();
        params.birth.no_preference_probability = 1.0;
        let model = monthly(params);
        let mut rng = SimRng::new(0);
        assert_eq!(model.draw_desired_children(&mut rng), DesiredChildren::NoPreference);
    }

    #[test]
    fn female_fertility_timers_are_drawn() {
        let model = monthly(Parameters::default());
        let mut rng = SimRng::new(5);
        let f = model.draw_fertility(Sex::Female, &mut rng);
        assert!(f.birth_interval.is_some_and(|m| (9..60).contains(&m)));
        assert!(f.first_birth_timing.is_some());
        assert_eq!(model.draw_fertility(Sex::Male, &mut rng), Default::default());
    }

    #[test]
    fn inmigrant_households_are_non_empty() {
        let model = monthly(Parameters::default());
        let mut rng = SimRng::new(11);
        for _ in 0..100 {
            let draw = model.draw_inmigrant_household(&mut rng);
            assert!(draw.size >= 1);
            assert!((1..=5).contains(&draw.ethnicity.0));
            assert!(draw.head_age_months >= 18 * 12);
        }
    }
}
