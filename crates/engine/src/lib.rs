//! Repository and service layer of the finance tracker.
//!
//! The sea-orm entities (`entries`, `categories`, `configurations`, `users`,
//! `sessions`) are the repositories; [`Engine`] methods are the services. All
//! of them take the id of the authenticated user and never return rows that
//! belong to someone else.

pub use categories::{Category, CategoryChanges, CategoryDraft};
pub use configurations::{ConfigValue, Configuration, default_configurations};
pub use entries::{Entry, EntryChanges, EntryDraft, EntryFilter, EntryKind};
pub use error::EngineError;
pub use money::Money;
pub use month::Month;
pub use ops::{
    CategoryTotal, Dashboard, Engine, EngineBuilder, MonthTotals, TREND_MONTHS, TrendPoint,
};
pub use sessions::Session;
pub use users::User;

mod categories;
mod configurations;
mod entries;
mod error;
mod money;
mod month;
mod ops;
mod sessions;
mod users;
mod util;

pub const MAX_ENTRY_NAME: usize = 120;
pub const MAX_CATEGORY_NAME: usize = 60;

type ResultEngine<T> = Result<T, EngineError>;
