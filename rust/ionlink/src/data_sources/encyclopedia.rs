//! Reader for EncyclopeDIA chromatogram libraries (`.elib`, SQLite).

use rusqlite::{
    Connection,
    OpenFlags,
};
use std::path::Path;

use crate::errors::Result;
use crate::models::DiaEntry;

const ENTRIES_QUERY: &str = "\
SELECT PrecursorMz, PrecursorCharge, PeptideModSeq, PeptideSeq, \
       RtInSeconds, RTInSecondsStart, RTInSecondsStop \
FROM entries";

pub fn read_elib<P: AsRef<Path>>(path: P) -> Result<Vec<DiaEntry>> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    entries_from_connection(&conn)
}

pub fn entries_from_connection(conn: &Connection) -> Result<Vec<DiaEntry>> {
    let mut stmt = conn.prepare(ENTRIES_QUERY)?;
    let rows = stmt.query_map([], |row| {
        Ok(DiaEntry {
            precursor_mz: row.get(0)?,
            precursor_charge: row.get::<_, i64>(1)? as u8,
            peptide_mod_seq: row.get(2)?,
            peptide_seq: row.get(3)?,
            rt_seconds: row.get(4)?,
            rt_seconds_start: row.get(5)?,
            rt_seconds_stop: row.get(6)?,
        })
    })?;
    let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}
