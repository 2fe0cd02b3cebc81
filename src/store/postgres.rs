//! Postgres backend. Diesel is blocking, so every call runs on the blocking pool.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use tracing::debug;

use super::{Repository, StoreError, TicketFilter, TicketQuery};
use crate::core::shared::models::{Analyst, Document, Reason, RecordId, Stored, Support, Ticket};
use crate::core::shared::schema::{analysts, reasons, supports, tickets};
use crate::core::shared::utils::DbPool;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn run<F, R>(&self, op: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut PgConnection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("Task join error: {e}")))?
    }
}

fn backend(e: diesel::result::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

trait Row<T>: Sized {
    fn from_fields(id: &RecordId, fields: T) -> Self;
    fn into_stored(self) -> Stored<T>;
}

#[derive(Queryable, Insertable, AsChangeset)]
#[diesel(table_name = analysts)]
struct AnalystRow {
    id: String,
    name: String,
    email: String,
    team: String,
}

impl Row<Analyst> for AnalystRow {
    fn from_fields(id: &RecordId, fields: Analyst) -> Self {
        Self {
            id: id.to_string(),
            name: fields.name,
            email: fields.email,
            team: fields.team,
        }
    }

    fn into_stored(self) -> Stored<Analyst> {
        Stored::new(
            self.id.into(),
            Analyst {
                name: self.name,
                email: self.email,
                team: self.team,
            },
        )
    }
}

#[derive(Queryable, Insertable, AsChangeset)]
#[diesel(table_name = supports)]
struct SupportRow {
    id: String,
    name: String,
    analyst_id: String,
}

impl Row<Support> for SupportRow {
    fn from_fields(id: &RecordId, fields: Support) -> Self {
        Self {
            id: id.to_string(),
            name: fields.name,
            analyst_id: fields.analyst_id.into_inner(),
        }
    }

    fn into_stored(self) -> Stored<Support> {
        Stored::new(
            self.id.into(),
            Support {
                name: self.name,
                analyst_id: self.analyst_id.into(),
            },
        )
    }
}

#[derive(Queryable, Insertable, AsChangeset)]
#[diesel(table_name = reasons)]
struct ReasonRow {
    id: String,
    description: String,
}

impl Row<Reason> for ReasonRow {
    fn from_fields(id: &RecordId, fields: Reason) -> Self {
        Self {
            id: id.to_string(),
            description: fields.description,
        }
    }

    fn into_stored(self) -> Stored<Reason> {
        Stored::new(
            self.id.into(),
            Reason {
                description: self.description,
            },
        )
    }
}

#[derive(Queryable, Insertable, AsChangeset)]
#[diesel(table_name = tickets)]
struct TicketRow {
    id: String,
    support_id: String,
    reason_id: String,
    analyst_id: String,
    observation: String,
    date: NaiveDate,
}

impl Row<Ticket> for TicketRow {
    fn from_fields(id: &RecordId, fields: Ticket) -> Self {
        Self {
            id: id.to_string(),
            support_id: fields.support_id.into_inner(),
            reason_id: fields.reason_id.into_inner(),
            analyst_id: fields.analyst_id.into_inner(),
            observation: fields.observation,
            date: fields.date,
        }
    }

    fn into_stored(self) -> Stored<Ticket> {
        Stored::new(
            self.id.into(),
            Ticket {
                support_id: self.support_id.into(),
                reason_id: self.reason_id.into(),
                analyst_id: self.analyst_id.into(),
                observation: self.observation,
                date: self.date,
            },
        )
    }
}

macro_rules! pg_repository {
    ($record:ty, $row:ty, $table:ident) => {
        #[async_trait]
        impl Repository<$record> for PgStore {
            async fn create(&self, fields: $record) -> Result<RecordId, StoreError> {
                let id = RecordId::generate();
                let row = <$row>::from_fields(&id, fields);
                self.run(move |conn| {
                    diesel::insert_into($table::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(backend)
                })
                .await?;
                debug!("Created {} record {id}", <$record>::COLLECTION);
                Ok(id)
            }

            async fn update(&self, id: &RecordId, fields: $record) -> Result<(), StoreError> {
                let row = <$row>::from_fields(id, fields);
                let changed = self
                    .run(move |conn| {
                        diesel::update($table::table.find(row.id.clone()))
                            .set(&row)
                            .execute(conn)
                            .map_err(backend)
                    })
                    .await?;
                if changed == 0 {
                    return Err(StoreError::not_found::<$record>(id));
                }
                debug!("Updated {} record {id}", <$record>::COLLECTION);
                Ok(())
            }

            async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
                let key = id.to_string();
                self.run(move |conn| {
                    diesel::delete($table::table.find(key))
                        .execute(conn)
                        .map_err(backend)
                })
                .await?;
                debug!("Deleted {} record {id}", <$record>::COLLECTION);
                Ok(())
            }

            async fn list(&self) -> Result<Vec<Stored<$record>>, StoreError> {
                let rows = self
                    .run(|conn| {
                        $table::table
                            .order($table::id.asc())
                            .load::<$row>(conn)
                            .map_err(backend)
                    })
                    .await?;
                Ok(rows.into_iter().map(Row::into_stored).collect())
            }
        }
    };
}

pg_repository!(Analyst, AnalystRow, analysts);
pg_repository!(Support, SupportRow, supports);
pg_repository!(Reason, ReasonRow, reasons);
pg_repository!(Ticket, TicketRow, tickets);

#[async_trait]
impl TicketQuery for PgStore {
    async fn list_filtered(&self, filter: &TicketFilter) -> Result<Vec<Stored<Ticket>>, StoreError> {
        let filter = filter.clone();
        let rows = self
            .run(move |conn| {
                let mut query = tickets::table.into_boxed();

                if let Some(range) = filter.date_range {
                    query = query.filter(tickets::date.between(range.start, range.end));
                }

                if let Some(analyst_id) = filter.analyst_id {
                    query = query.filter(tickets::analyst_id.eq(analyst_id.into_inner()));
                }

                if let Some(support_id) = filter.support_id {
                    query = query.filter(tickets::support_id.eq(support_id.into_inner()));
                }

                query
                    .order(tickets::id.asc())
                    .load::<TicketRow>(conn)
                    .map_err(backend)
            })
            .await?;

        Ok(rows.into_iter().map(Row::into_stored).collect())
    }
}
