//! Entries ("lançamentos"): one income or expense for a given month.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, Month, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidName(format!("invalid entry kind: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: EntryKind,
    pub name: String,
    /// Always > 0; the kind carries the sign.
    pub amount: Money,
    pub month: Month,
    pub completed: bool,
    pub expected_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a new entry. Already parsed; the engine still re-checks the
/// invariants (positive amount, non-empty name, category visibility).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryDraft {
    pub kind: EntryKind,
    pub name: String,
    pub amount: Money,
    pub month: Month,
    pub completed: bool,
    pub expected_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
}

/// Partial update. `Some(None)` clears an optional column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryChanges {
    pub kind: Option<EntryKind>,
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub month: Option<Month>,
    pub completed: Option<bool>,
    pub expected_date: Option<Option<NaiveDate>>,
    pub category_id: Option<Option<Uuid>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub month: Option<Month>,
    pub kind: Option<EntryKind>,
    pub completed: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub name: String,
    pub amount_minor: i64,
    pub month: String,
    pub completed: bool,
    pub expected_date: Option<Date>,
    pub category_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Entry> for ActiveModel {
    fn from(entry: &Entry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            user_id: ActiveValue::Set(entry.user_id.to_string()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            name: ActiveValue::Set(entry.name.clone()),
            amount_minor: ActiveValue::Set(entry.amount.cents()),
            month: ActiveValue::Set(entry.month.to_string()),
            completed: ActiveValue::Set(entry.completed),
            expected_date: ActiveValue::Set(entry.expected_date),
            category_id: ActiveValue::Set(entry.category_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(entry.created_at),
            updated_at: ActiveValue::Set(entry.updated_at),
        }
    }
}

impl TryFrom<Model> for Entry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "entry")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            kind: EntryKind::try_from(model.kind.as_str())?,
            name: model.name,
            amount: Money::new(model.amount_minor),
            month: model.month.parse()?,
            completed: model.completed,
            expected_date: model.expected_date,
            category_id: model
                .category_id
                .as_deref()
                .map(|id| parse_uuid(id, "category"))
                .transpose()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
