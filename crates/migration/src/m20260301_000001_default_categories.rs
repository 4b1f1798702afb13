//! Seeds the default categories shared by every user (`user_id` NULL).

use sea_orm::{ConnectionTrait, DbErr, Statement};
use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    Kind,
    Icon,
    Color,
    SortOrder,
    IsDefault,
}

/// (name, kind, icon, color)
const DEFAULTS: &[(&str, &str, &str, &str)] = &[
    ("Salário", "income", "briefcase", "#2E7D32"),
    ("Freelance", "income", "laptop", "#388E3C"),
    ("Investimentos", "income", "trending-up", "#43A047"),
    ("Outras receitas", "income", "plus-circle", "#66BB6A"),
    ("Moradia", "expense", "home", "#C62828"),
    ("Alimentação", "expense", "shopping-cart", "#D84315"),
    ("Transporte", "expense", "car", "#EF6C00"),
    ("Saúde", "expense", "heart", "#AD1457"),
    ("Educação", "expense", "book", "#6A1B9A"),
    ("Lazer", "expense", "smile", "#1565C0"),
    ("Contas", "expense", "file-text", "#4E342E"),
    ("Outras despesas", "expense", "more-horizontal", "#616161"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        for (order, (name, kind, icon, color)) in DEFAULTS.iter().enumerate() {
            let stmt = Query::insert()
                .into_table(Categories::Table)
                .columns([
                    Categories::Id,
                    Categories::UserId,
                    Categories::Name,
                    Categories::Kind,
                    Categories::Icon,
                    Categories::Color,
                    Categories::SortOrder,
                    Categories::IsDefault,
                ])
                .values_panic([
                    Uuid::new_v4().to_string().into(),
                    None::<String>.into(),
                    (*name).into(),
                    (*kind).into(),
                    Some((*icon).to_owned()).into(),
                    Some((*color).to_owned()).into(),
                    (order as i32).into(),
                    true.into(),
                ])
                .to_owned();

            db.execute(backend.build(&stmt)).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "DELETE FROM categories WHERE is_default = TRUE;".to_string(),
        ))
        .await?;
        Ok(())
    }
}
