//! Geocode record operations on the SQLite cache.

use super::connection::CacheDb;
use super::store::GeocodeStore;
use crate::Error;
use crate::record::{GeocodeRecord, NewRecord, round_coordinate};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

const SELECT_COLUMNS: &str = "SELECT
    id, address, status, lat, lng, formatted_address, place_id, hits, created_at, created_at_gmt
FROM geocode";

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GeocodeRecord> {
    let created_at: String = row.get(8)?;
    let created_at_gmt: String = row.get(9)?;

    Ok(GeocodeRecord {
        id: row.get(0)?,
        address: row.get(1)?,
        status: row.get(2)?,
        lat: row.get(3)?,
        lng: row.get(4)?,
        formatted_address: row.get(5)?,
        place_id: row.get(6)?,
        hits: row.get(7)?,
        created_at: parse_timestamp(8, &created_at)?,
        created_at_gmt: parse_timestamp(9, &created_at_gmt)?.with_timezone(&Utc),
    })
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn query_one(
    conn: &rusqlite::Connection, sql: &str, param: &dyn rusqlite::ToSql,
) -> Result<Option<GeocodeRecord>, Error> {
    match conn.query_row(sql, &[param][..], record_from_row) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(rusqlite::Error::FromSqlConversionFailure(idx, _, e)) => {
            Err(Error::InvalidRecord(format!("column {idx}: {e}")))
        }
        Err(e) => Err(e.into()),
    }
}

impl CacheDb {
    /// Total number of cached records.
    pub async fn record_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM geocode", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl GeocodeStore for CacheDb {
    async fn find_by_address(&self, address: &str) -> Result<Option<GeocodeRecord>, Error> {
        let address = address.to_string();
        self.conn
            .call(move |conn| -> Result<Option<GeocodeRecord>, Error> {
                query_one(conn, &format!("{SELECT_COLUMNS} WHERE address = ?1"), &address)
            })
            .await
            .map_err(Error::from)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GeocodeRecord>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<GeocodeRecord>, Error> {
                query_one(conn, &format!("{SELECT_COLUMNS} WHERE id = ?1"), &id)
            })
            .await
            .map_err(Error::from)
    }

    async fn upsert(&self, record: NewRecord) -> Result<GeocodeRecord, Error> {
        let now = self.clock.now();
        let created_at = now.with_timezone(&self.local_offset).to_rfc3339();
        let created_at_gmt = now.to_rfc3339();

        self.conn
            .call(move |conn| -> Result<GeocodeRecord, Error> {
                let inserted = conn.execute(
                    "INSERT INTO geocode (
                    hits, created_at, created_at_gmt, status, address,
                    lat, lng, formatted_address, place_id
                ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        created_at,
                        created_at_gmt,
                        record.status,
                        record.address,
                        round_coordinate(record.lat),
                        round_coordinate(record.lng),
                        record.formatted_address,
                        record.place_id,
                    ],
                );

                match inserted {
                    Ok(_) => {}
                    Err(e) if is_unique_violation(&e) => return Err(Error::DuplicateAddress(record.address)),
                    Err(e) => return Err(e.into()),
                }

                let id = conn.last_insert_rowid();
                query_one(conn, &format!("{SELECT_COLUMNS} WHERE id = ?1"), &id)?
                    .ok_or_else(|| Error::InvalidRecord(format!("inserted row {id} not found")))
            })
            .await
            .map_err(Error::from)
    }

    async fn increment_hits(&self, id: i64) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("UPDATE geocode SET hits = hits + 1 WHERE id = ?1", params![id])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM geocode WHERE id = ?1", params![id])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_by_address(&self, address: &str) -> Result<u64, Error> {
        let address = address.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM geocode WHERE address = ?1", params![address])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
