use chrono::Duration;
use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod auth;
mod categories;
mod configurations;
mod dashboard;
mod entries;

pub use dashboard::{CategoryTotal, Dashboard, MonthTotals, TrendPoint};

/// Months shown in the dashboard trend, the selected one included.
pub const TREND_MONTHS: usize = 6;

const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Service layer. Every operation is scoped by the id of the user issuing it.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    session_ttl: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Round-trip to the database, used by the health check.
    pub async fn ping(&self) -> ResultEngine<()> {
        self.database.ping().await?;
        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    session_ttl: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How long a login stays valid. Defaults to 30 days.
    pub fn session_ttl(mut self, ttl: Duration) -> EngineBuilder {
        self.session_ttl = Some(ttl);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            session_ttl: self
                .session_ttl
                .unwrap_or_else(|| Duration::days(DEFAULT_SESSION_TTL_DAYS)),
        })
    }
}
