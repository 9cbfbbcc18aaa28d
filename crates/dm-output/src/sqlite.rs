//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `step_summaries`, `neighborhood_snapshots`, and `persons`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{NeighborhoodRow, OutputResult, PersonRow, StepSummaryRow};

pub const DATABASE_FILE: &str = "output.db";

/// Writes simulation results to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join(DATABASE_FILE))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS step_summaries (
                 step                 INTEGER PRIMARY KEY,
                 year                 INTEGER NOT NULL,
                 month                INTEGER NOT NULL,
                 births               INTEGER NOT NULL,
                 deaths               INTEGER NOT NULL,
                 marriages            INTEGER NOT NULL,
                 divorces             INTEGER NOT NULL,
                 school_entries       INTEGER NOT NULL,
                 school_exits         INTEGER NOT NULL,
                 out_migrations       INTEGER NOT NULL,
                 returns              INTEGER NOT NULL,
                 inmigrant_households INTEGER NOT NULL,
                 persons              INTEGER NOT NULL,
                 households           INTEGER NOT NULL,
                 neighborhoods        INTEGER NOT NULL,
                 married              INTEGER NOT NULL,
                 away                 INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS neighborhood_snapshots (
                 step             INTEGER NOT NULL,
                 year             INTEGER NOT NULL,
                 month            INTEGER NOT NULL,
                 neighborhood     INTEGER NOT NULL,
                 persons          INTEGER NOT NULL,
                 households       INTEGER NOT NULL,
                 married          INTEGER NOT NULL,
                 agveg            REAL    NOT NULL,
                 nonagveg         REAL    NOT NULL,
                 private_building REAL    NOT NULL,
                 public_building  REAL    NOT NULL,
                 other            REAL    NOT NULL,
                 fuelwood         REAL,
                 PRIMARY KEY (step, neighborhood)
             );
             CREATE TABLE IF NOT EXISTS persons (
                 person          INTEGER PRIMARY KEY,
                 alive           INTEGER NOT NULL,
                 sex             TEXT    NOT NULL,
                 age_months      INTEGER NOT NULL,
                 ethnicity       INTEGER NOT NULL,
                 household       INTEGER,
                 neighborhood    INTEGER,
                 spouse          INTEGER,
                 mother          INTEGER,
                 father          INTEGER,
                 children        INTEGER NOT NULL,
                 schooling_years REAL    NOT NULL,
                 school_status   TEXT    NOT NULL,
                 in_migrant      INTEGER NOT NULL,
                 away            INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO step_summaries \
             (step, year, month, births, deaths, marriages, divorces, school_entries, school_exits, \
              out_migrations, returns, inmigrant_households, persons, households, neighborhoods, married, away) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            rusqlite::params![
                row.step,
                row.year,
                row.month,
                row.births,
                row.deaths,
                row.marriages,
                row.divorces,
                row.school_entries,
                row.school_exits,
                row.out_migrations,
                row.returns,
                row.inmigrant_households,
                row.persons,
                row.households,
                row.neighborhoods,
                row.married,
                row.away,
            ],
        )?;
        Ok(())
    }

    fn write_neighborhoods(&mut self, rows: &[NeighborhoodRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO neighborhood_snapshots \
                 (step, year, month, neighborhood, persons, households, married, \
                  agveg, nonagveg, private_building, public_building, other, fuelwood) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.step,
                    row.year,
                    row.month,
                    row.neighborhood,
                    row.persons,
                    row.households,
                    row.married,
                    row.agveg,
                    row.nonagveg,
                    row.private_building,
                    row.public_building,
                    row.other,
                    row.fuelwood,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_persons(&mut self, rows: &[PersonRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO persons \
                 (person, alive, sex, age_months, ethnicity, household, neighborhood, spouse, mother, father, \
                  children, schooling_years, school_status, in_migrant, away) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.person,
                    row.alive,
                    row.sex,
                    row.age_months,
                    row.ethnicity,
                    row.household,
                    row.neighborhood,
                    row.spouse,
                    row.mother,
                    row.father,
                    row.children,
                    row.schooling_years,
                    row.school_status,
                    row.in_migrant,
                    row.away,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
