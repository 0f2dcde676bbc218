use anyhow::Result;
use diesel::{
    PgConnection, RunQueryDsl,
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};

/// Every transaction on this pool runs SERIALIZABLE: the idempotency
/// protocol requires that two inserters of the same key cannot both
/// observe "absent" and both succeed.
#[derive(Debug, Default)]
struct SerializableIsolation;

impl CustomizeConnection<PgConnection, R2d2Error> for SerializableIsolation {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        diesel::sql_query(
            "SET SESSION CHARACTERISTICS AS TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        )
        .execute(conn)
        .map(|_| ())
        .map_err(R2d2Error::QueryError)
    }
}

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

pub fn establish_connection(database_url: &str) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(SerializableIsolation))
        .build(manager)?;
    Ok(pool)
}
