//! Categories. Defaults have no owner and are shared (read-only) by every
//! user; the rest belong to exactly one user.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, EntryKind, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub kind: EntryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub order: i32,
    pub is_default: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub kind: EntryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Appended after the last visible category of the same kind when `None`.
    pub order: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub order: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub kind: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i32,
    pub is_default: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: ActiveValue::Set(category.id.to_string()),
            user_id: ActiveValue::Set(category.user_id.map(|id| id.to_string())),
            name: ActiveValue::Set(category.name.clone()),
            kind: ActiveValue::Set(category.kind.as_str().to_string()),
            icon: ActiveValue::Set(category.icon.clone()),
            color: ActiveValue::Set(category.color.clone()),
            sort_order: ActiveValue::Set(category.order),
            is_default: ActiveValue::Set(category.is_default),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            user_id: model
                .user_id
                .as_deref()
                .map(|id| parse_uuid(id, "user"))
                .transpose()?,
            name: model.name,
            kind: EntryKind::try_from(model.kind.as_str())?,
            icon: model.icon,
            color: model.color,
            order: model.sort_order,
            is_default: model.is_default,
        })
    }
}
