use std::{fs, path::Path, time::Duration};

use itertools::Itertools;
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Configuration, IngestReport, PmfDataset, Points, Result, StoreError, errors::DataFormatError,
};

// NOTE: Other sessions may be mid-write when this one wants the lock, so give them some time to finish
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS pmfs (
        file_id TEXT PRIMARY KEY,
        data TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS configurations (
        config_id TEXT PRIMARY KEY,
        molecule_name TEXT NOT NULL,
        data TEXT NOT NULL
    );
";

/// A single session on the PMF database
///
/// Sessions are `Send` but not `Sync`; threads that need the store should each open their own with [`Store::open`]
/// rather than sharing one.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (creating if needed) the database at `path`
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::Unavailable`] if the database can't be opened or its tables can't be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let setup = || -> rusqlite::Result<Connection> {
            let conn = Connection::open(path)?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            // NOTE: WAL lets readers carry on while another session is writing
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        };
        let conn = setup().map_err(|source| StoreError::unavailable(path, source))?;
        debug!("opened PMF database at {path:?}");
        Ok(Self { conn })
    }

    /// Opens a private database that lives only as long as this session
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::Unavailable`] if SQLite can't allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let setup = || -> rusqlite::Result<Connection> {
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        };
        let conn = setup().map_err(|source| StoreError::unavailable(":memory:", source))?;
        Ok(Self { conn })
    }

    // Datasets ========================================================================================================

    /// Stores `dataset` under `id`, unless a dataset is already stored there
    ///
    /// Returns `true` if the dataset was written and `false` if an existing one was kept. The check and the write are a
    /// single statement, so when sessions race to insert the same `id`, exactly one of them wins.
    ///
    /// # Errors
    ///
    /// Fails if the dataset can't be encoded or the database can't be written to.
    pub fn insert_dataset(&self, id: &str, dataset: &PmfDataset) -> Result<bool> {
        let data = encode("dataset", dataset)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO pmfs (file_id, data) VALUES (?1, ?2)",
            params![id, data],
        )? == 1;

        if inserted {
            debug!("stored a dataset of {} samples for {id}", dataset.len());
        } else {
            debug!("kept the existing dataset for {id}");
        }
        Ok(inserted)
    }

    /// Fetches the dataset stored under `id`, or `None` if there isn't one
    ///
    /// # Errors
    ///
    /// Fails if the database can't be read, or if the stored dataset can't be decoded.
    pub fn get_dataset(&self, id: &str) -> Result<Option<PmfDataset>> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM pmfs WHERE file_id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;

        data.map(|data| decode("dataset", &data)).transpose()
    }

    /// # Errors
    ///
    /// Fails if the database can't be read.
    pub fn contains_dataset(&self, id: &str) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM pmfs WHERE file_id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Every stored dataset id, in the order they were first inserted
    ///
    /// # Errors
    ///
    /// Fails if the database can't be read.
    pub fn dataset_ids(&self) -> Result<Vec<String>> {
        self.ids("SELECT file_id FROM pmfs ORDER BY rowid")
    }

    /// Decodes and stores each `(id, raw PMF text)` item in turn
    ///
    /// A failing item is recorded in the report and doesn't stop the rest of the batch.
    pub fn batch_ingest<I, S>(&self, items: I) -> IngestReport
    where
        I: IntoIterator<Item = (String, S)>,
        S: AsRef<str>,
    {
        let mut report = IngestReport::default();
        for (id, raw) in items {
            self.ingest_one(&mut report, id, raw.as_ref());
        }
        info!(
            "ingested {} new datasets ({} already present, {} failed)",
            report.inserted.len(),
            report.already_present.len(),
            report.failed.len()
        );
        report
    }

    /// Ingests every file in `directory` with the given `extension`, using each file's stem as its id
    ///
    /// Files are visited in name order. Unreadable files are reported as failed items, like undecodable ones.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::Io`] if `directory` itself can't be listed.
    pub fn ingest_directory(
        &self,
        directory: impl AsRef<Path>,
        extension: &str,
    ) -> Result<IngestReport> {
        let directory = directory.as_ref();
        let entries = fs::read_dir(directory).map_err(|e| StoreError::io(directory, e))?;

        let paths = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
            .sorted();

        let mut report = IngestReport::default();
        for path in paths {
            let Some(id) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(raw) => self.ingest_one(&mut report, id, &raw),
                Err(e) => {
                    warn!("failed to read {path:?}: {e}");
                    report.failed.push((id, StoreError::io(&path, e)));
                }
            }
        }
        info!(
            "ingested {} new datasets from {directory:?} ({} already present, {} failed)",
            report.inserted.len(),
            report.already_present.len(),
            report.failed.len()
        );
        Ok(report)
    }

    // Configurations ==================================================================================================

    /// Saves `points` for `molecule_name` under `id`, replacing both if `id` was already saved
    ///
    /// # Errors
    ///
    /// Fails if the points can't be encoded or the database can't be written to.
    pub fn save_configuration(&self, id: &str, molecule_name: &str, points: &Points) -> Result<()> {
        let data = encode("configuration", points)?;
        self.conn.execute(
            "INSERT INTO configurations (config_id, molecule_name, data) VALUES (?1, ?2, ?3)
             ON CONFLICT (config_id) DO UPDATE
             SET molecule_name = excluded.molecule_name, data = excluded.data",
            params![id, molecule_name, data],
        )?;
        debug!("saved configuration {id:?} for {molecule_name}");
        Ok(())
    }

    /// Loads the configuration saved under `id`, or `None` if there isn't one
    ///
    /// # Errors
    ///
    /// Fails if the database can't be read, or if the saved points can't be decoded.
    pub fn load_configuration(&self, id: &str) -> Result<Option<Configuration>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT molecule_name, data FROM configurations WHERE config_id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(molecule_name, data)| {
            let points = decode("configuration", &data)?;
            Ok(Configuration::new(id, molecule_name, points))
        })
        .transpose()
    }

    /// Every saved configuration id, in the order they were first saved
    ///
    /// # Errors
    ///
    /// Fails if the database can't be read.
    pub fn list_configuration_ids(&self) -> Result<Vec<String>> {
        self.ids("SELECT config_id FROM configurations ORDER BY rowid")
    }

    // Private Helper Methods ==========================================================================================

    fn ingest_one(&self, report: &mut IngestReport, id: String, raw: &str) {
        let outcome = raw
            .parse::<PmfDataset>()
            .map_err(StoreError::from)
            .and_then(|dataset| self.insert_dataset(&id, &dataset));

        match outcome {
            Ok(true) => report.inserted.push(id),
            Ok(false) => report.already_present.push(id),
            Err(e) => {
                warn!("failed to ingest {id}: {e}");
                report.failed.push((id, e));
            }
        }
    }

    fn ids(&self, query: &str) -> Result<Vec<String>> {
        let mut statement = self.conn.prepare(query)?;
        let ids = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<_>>()?;
        Ok(ids)
    }
}

// Private Helper Functions ============================================================================================

fn encode(record: &'static str, value: &impl Serialize) -> Result<String, DataFormatError> {
    serde_json::to_string(value).map_err(|e| DataFormatError::encoding(record, &e))
}

fn decode<T: DeserializeOwned>(record: &'static str, data: &str) -> Result<T> {
    let value = serde_json::from_str(data).map_err(|e| DataFormatError::encoding(record, &e))?;
    Ok(value)
}
