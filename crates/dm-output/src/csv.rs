//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `step_summaries.csv`
//! - `neighborhood_snapshots.csv`
//! - `persons.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{NeighborhoodRow, OutputResult, PersonRow, StepSummaryRow};

pub const STEP_SUMMARIES_FILE: &str = "step_summaries.csv";
pub const NEIGHBORHOODS_FILE: &str = "neighborhood_snapshots.csv";
pub const PERSONS_FILE: &str = "persons.csv";

const SUMMARY_HEADER: [&str; 17] = [
    "step", "year", "month", "births", "deaths", "marriages", "divorces", "school_entries", "school_exits",
    "out_migrations", "returns", "inmigrant_households", "persons", "households", "neighborhoods", "married",
    "away",
];

const NEIGHBORHOOD_HEADER: [&str; 13] = [
    "step", "year", "month", "neighborhood", "persons", "households", "married", "agveg", "nonagveg",
    "private_building", "public_building", "other", "fuelwood",
];

const PERSON_HEADER: [&str; 15] = [
    "person", "alive", "sex", "age_months", "ethnicity", "household", "neighborhood", "spouse", "mother",
    "father", "children", "schooling_years", "school_status", "in_migrant", "away",
];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(value: bool) -> String {
    (value as u8).to_string()
}

/// Writes simulation results to three CSV files.
pub struct CsvWriter {
    summaries:     Writer<File>,
    neighborhoods: Writer<File>,
    persons:       Writer<File>,
    finished:      bool,
}

impl CsvWriter {
    /// Create the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut summaries = Writer::from_path(dir.join(STEP_SUMMARIES_FILE))?;
        summaries.write_record(SUMMARY_HEADER)?;

        let mut neighborhoods = Writer::from_path(dir.join(NEIGHBORHOODS_FILE))?;
        neighborhoods.write_record(NEIGHBORHOOD_HEADER)?;

        let mut persons = Writer::from_path(dir.join(PERSONS_FILE))?;
        persons.write_record(PERSON_HEADER)?;

        Ok(Self { summaries, neighborhoods, persons, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.step.to_string(),
            row.year.to_string(),
            row.month.to_string(),
            row.births.to_string(),
            row.deaths.to_string(),
            row.marriages.to_string(),
            row.divorces.to_string(),
            row.school_entries.to_string(),
            row.school_exits.to_string(),
            row.out_migrations.to_string(),
            row.returns.to_string(),
            row.inmigrant_households.to_string(),
            row.persons.to_string(),
            row.households.to_string(),
            row.neighborhoods.to_string(),
            row.married.to_string(),
            row.away.to_string(),
        ])?;
        Ok(())
    }

    fn write_neighborhoods(&mut self, rows: &[NeighborhoodRow]) -> OutputResult<()> {
        for row in rows {
            self.neighborhoods.write_record(&[
                row.step.to_string(),
                row.year.to_string(),
                row.month.to_string(),
                row.neighborhood.to_string(),
                row.persons.to_string(),
                row.households.to_string(),
                row.married.to_string(),
                row.agveg.to_string(),
                row.nonagveg.to_string(),
                row.private_building.to_string(),
                row.public_building.to_string(),
                row.other.to_string(),
                opt(row.fuelwood),
            ])?;
        }
        Ok(())
    }

    fn write_persons(&mut self, rows: &[PersonRow]) -> OutputResult<()> {
        for row in rows {
            self.persons.write_record(&[
                row.person.to_string(),
                flag(row.alive),
                row.sex.to_string(),
                row.age_months.to_string(),
                row.ethnicity.to_string(),
                opt(row.household),
                opt(row.neighborhood),
                opt(row.spouse),
                opt(row.mother),
                opt(row.father),
                row.children.to_string(),
                row.schooling_years.to_string(),
                row.school_status.to_string(),
                flag(row.in_migrant),
                flag(row.away),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.neighborhoods.flush()?;
        self.persons.flush()?;
        Ok(())
    }
}
