//! Integration tests for dm-output.

#[cfg(test)]
mod fixtures {
    use dm_agent::{Ethnicity, LandClaim, LandLedger, NewHousehold, NewNeighborhood, PersonBuilder, Sex, World};
    use dm_behavior::{Parameters, StandardModel};
    use dm_core::{ModelDate, SimConfig};
    use dm_sim::{Sim, SimBuilder};

    use crate::row::{NeighborhoodRow, PersonRow, StepSummaryRow};

    pub fn summary_row(step: u64) -> StepSummaryRow {
        StepSummaryRow {
            step,
            year:                 2000,
            month:                step as u32 + 1,
            births:               2,
            deaths:               1,
            marriages:            0,
            divorces:             0,
            school_entries:       3,
            school_exits:         0,
            out_migrations:       1,
            returns:              0,
            inmigrant_households: 0,
            persons:              40,
            households:           9,
            neighborhoods:        2,
            married:              12,
            away:                 1,
        }
    }

    pub fn neighborhood_row(neighborhood: u32, fuelwood: Option<f64>) -> NeighborhoodRow {
        NeighborhoodRow {
            step: 0,
            year: 2000,
            month: 1,
            neighborhood,
            persons:          20,
            households:       4,
            married:          6,
            agveg:            1200.5,
            nonagveg:         300.0,
            private_building: 400.0,
            public_building:  0.0,
            other:            0.0,
            fuelwood,
        }
    }

    pub fn person_row(person: u32) -> PersonRow {
        PersonRow {
            person,
            alive:           true,
            sex:             "female",
            age_months:      300,
            ethnicity:       2,
            household:       Some(7),
            neighborhood:    Some(1),
            spouse:          None,
            mother:          Some(3),
            father:          None,
            children:        0,
            schooling_years: 6.5,
            school_status:   "outofschool",
            in_migrant:      false,
            away:            false,
        }
    }

    /// Two neighborhoods, three families, default parameters.
    pub fn sim(output_interval_steps: u64) -> Sim<StandardModel> {
        let mut world = World::new();
        let region = world.new_region(None, true).unwrap();
        let start = ModelDate::new(2000, 1).unwrap();
        let mut nbhs = Vec::new();
        for _ in 0..2 {
            let land = LandLedger { agveg: 50_000.0, nonagveg: 5_000.0, ..Default::default() };
            nbhs.push(world.new_neighborhood(region, NewNeighborhood { land, ..Default::default() }).unwrap());
        }
        world.index_distances(region).unwrap();
        for i in 0..3 {
            let hh = world.new_household(NewHousehold::default()).unwrap();
            world.place_household(hh, nbhs[i % 2], LandClaim::Exempt).unwrap();
            for (sex, years) in [(Sex::Male, 35), (Sex::Female, 31), (Sex::Female, 7)] {
                let pid = world
                    .new_person(PersonBuilder::new(sex, Ethnicity(1), years * 12, start.tick()))
                    .unwrap();
                world.add_to_household(pid, hh).unwrap();
            }
        }

        let config = SimConfig {
            start,
            end: ModelDate::new(2000, 7).unwrap(),
            timestep_months: 1,
            seed: 3,
            output_interval_steps,
        };
        let params = Parameters::default();
        let model = StandardModel::new(params.clone(), 1).unwrap();
        SimBuilder::new(config, world, params, model).build().unwrap()
    }
}

// ── CSV tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::fixtures::{neighborhood_row, person_row, summary_row};
    use crate::csv::{CsvWriter, NEIGHBORHOODS_FILE, PERSONS_FILE, STEP_SUMMARIES_FILE};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn records(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join(STEP_SUMMARIES_FILE).exists());
        assert!(dir.path().join(NEIGHBORHOODS_FILE).exists());
        assert!(dir.path().join(PERSONS_FILE).exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(STEP_SUMMARIES_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers.len(), 17);
        assert_eq!(&headers[..4], ["step", "year", "month", "births"]);

        let mut rdr = csv::Reader::from_path(dir.path().join(PERSONS_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers[0], "person");
        assert_eq!(headers[14], "away");
    }

    #[test]
    fn csv_step_summary_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_step_summary(&summary_row(4)).unwrap();
        w.finish().unwrap();

        let rows = records(&dir, STEP_SUMMARIES_FILE);
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "4"); // step
        assert_eq!(&rows[0][2], "5"); // month
        assert_eq!(&rows[0][3], "2"); // births
        assert_eq!(&rows[0][12], "40"); // persons
    }

    #[test]
    fn csv_missing_fuelwood_is_blank() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_neighborhoods(&[neighborhood_row(0, None), neighborhood_row(1, Some(12.25))]).unwrap();
        w.finish().unwrap();

        let rows = records(&dir, NEIGHBORHOODS_FILE);
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][7], "1200.5");
        assert_eq!(&rows[0][12], "");
        assert_eq!(&rows[1][12], "12.25");
    }

    #[test]
    fn csv_person_options_and_flags() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_persons(&[person_row(11)]).unwrap();
        w.finish().unwrap();

        let rows = records(&dir, PERSONS_FILE);
        assert_eq!(&rows[0][0], "11");
        assert_eq!(&rows[0][1], "1"); // alive
        assert_eq!(&rows[0][2], "female");
        assert_eq!(&rows[0][5], "7"); // household
        assert_eq!(&rows[0][7], ""); // spouse
        assert_eq!(&rows[0][12], "outofschool");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_missing_directory_fails() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("absent")).is_err());
    }
}

// ── Observer tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use dm_agent::Agent;
    use dm_sim::{SimObserver, StepReport};
    use tempfile::TempDir;

    use super::fixtures::sim;
    use crate::csv::{CsvWriter, NEIGHBORHOODS_FILE, PERSONS_FILE, STEP_SUMMARIES_FILE};
    use crate::writer::OutputWriter;
    use crate::{OutputError, ResultsObserver};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn count(dir: &TempDir, file: &str) -> usize {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().count()
    }

    #[test]
    fn full_run_writes_every_table() {
        let dir = tmp();
        let mut sim = sim(2);
        let mut obs = ResultsObserver::new(CsvWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // Six steps; snapshots at steps 0, 2, 4 over two neighborhoods.
        assert_eq!(count(&dir, STEP_SUMMARIES_FILE), 6);
        assert_eq!(count(&dir, NEIGHBORHOODS_FILE), 6);
        assert_eq!(count(&dir, PERSONS_FILE), sim.world.persons().count());
    }

    #[derive(Default)]
    struct Capture {
        report: Option<StepReport>,
    }

    impl SimObserver for Capture {
        fn on_step_end(&mut self, report: &StepReport) {
            self.report = Some(report.clone());
        }
    }

    #[test]
    fn repeated_step_is_reported() {
        let dir = tmp();
        let mut capture = Capture::default();
        sim(0).run_steps(1, &mut capture).unwrap();
        let report = capture.report.unwrap();

        let mut obs = ResultsObserver::new(CsvWriter::new(dir.path()).unwrap());
        obs.on_step_end(&report);
        obs.on_step_end(&report);
        assert!(matches!(obs.take_error(), Some(OutputError::DuplicateStep(0))));
        // Only the first error is kept.
        assert!(obs.take_error().is_none());

        let mut writer = obs.into_writer();
        writer.finish().unwrap();
        assert_eq!(count(&dir, STEP_SUMMARIES_FILE), 1);
    }

    #[test]
    fn final_person_table_uses_end_state() {
        let dir = tmp();
        let mut sim = sim(0);
        let mut obs = ResultsObserver::new(CsvWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(PERSONS_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        let first = sim.world.persons().next().unwrap();
        assert_eq!(rows.len(), sim.world.persons().count());
        assert_eq!(rows[0][0].parse::<u32>().unwrap(), first.id().0);
        assert_eq!(rows[0][3].parse::<u32>().unwrap(), first.age_months());
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::fixtures::{neighborhood_row, person_row, summary_row};
    use crate::sqlite::{DATABASE_FILE, SqliteWriter};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join(DATABASE_FILE).exists());
    }

    #[test]
    fn sqlite_step_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_step_summary(&summary_row(7)).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join(DATABASE_FILE)).unwrap();
        let (births, persons): (i64, i64) = conn
            .query_row("SELECT births, persons FROM step_summaries WHERE step = 7", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(births, 2);
        assert_eq!(persons, 40);
    }

    #[test]
    fn sqlite_duplicate_step_rejected_by_schema() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_step_summary(&summary_row(1)).unwrap();
        assert!(w.write_step_summary(&summary_row(1)).is_err());
    }

    #[test]
    fn sqlite_null_fuelwood() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_neighborhoods(&[neighborhood_row(0, None), neighborhood_row(1, Some(3.5))]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join(DATABASE_FILE)).unwrap();
        let nulls: i64 = conn
            .query_row("SELECT COUNT(*) FROM neighborhood_snapshots WHERE fuelwood IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn sqlite_person_flags_as_integers() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_persons(&[person_row(5)]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join(DATABASE_FILE)).unwrap();
        let (alive, spouse): (i64, Option<i64>) = conn
            .query_row("SELECT alive, spouse FROM persons WHERE person = 5", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(alive, 1);
        assert_eq!(spouse, None);
    }
}
