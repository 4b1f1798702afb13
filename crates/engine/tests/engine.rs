use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    CategoryChanges, CategoryDraft, ConfigValue, Engine, EngineError, EntryChanges, EntryDraft,
    EntryFilter, EntryKind, Money, Month, User,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn register(engine: &Engine, email: &str) -> User {
    engine
        .register_user("Alice", email, "password123", Utc::now())
        .await
        .unwrap()
}

fn month(value: &str) -> Month {
    value.parse().unwrap()
}

fn draft(kind: EntryKind, name: &str, amount: &str, at: &str) -> EntryDraft {
    EntryDraft {
        kind,
        name: name.to_string(),
        amount: amount.parse().unwrap(),
        month: month(at),
        completed: false,
        expected_date: None,
        category_id: None,
    }
}

#[tokio::test]
async fn register_login_and_authenticate() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();

    let user = engine
        .register_user(" Alice ", "Alice@Example.com", "password123", now)
        .await
        .unwrap();
    assert_eq!(user.name, "Alice");
    assert_eq!(user.email, "alice@example.com");

    let again = engine
        .register_user("Other", "ALICE@example.com", "password123", now)
        .await;
    assert!(matches!(again, Err(EngineError::ExistingKey(_))));

    let wrong = engine.login("alice@example.com", "nope-nope", now).await;
    assert_eq!(
        wrong.unwrap_err(),
        EngineError::Unauthorized("invalid credentials".to_string())
    );

    let (logged, session) = engine
        .login("alice@example.com", "password123", now)
        .await
        .unwrap();
    assert_eq!(logged.id, user.id);
    assert!(session.expires_at > now + Duration::days(29));

    let resolved = engine.authenticate(&session.token, now).await.unwrap();
    assert_eq!(resolved.id, user.id);

    engine.logout(&session.token).await.unwrap();
    assert!(matches!(
        engine.authenticate(&session.token, now).await,
        Err(EngineError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_purged() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .session_ttl(Duration::minutes(5))
        .build()
        .await
        .unwrap();
    let now = Utc::now();
    let user = register(&engine, "bob@example.com").await;

    let stale = engine.create_session(user.id, now).await.unwrap();
    let fresh = engine
        .create_session(user.id, now + Duration::minutes(4))
        .await
        .unwrap();
    let later = now + Duration::minutes(6);

    assert_eq!(
        engine.authenticate(&stale.token, later).await.unwrap_err(),
        EngineError::Unauthorized("session expired".to_string())
    );
    assert!(engine.authenticate(&fresh.token, later).await.is_ok());

    assert_eq!(
        engine
            .purge_expired_sessions(now + Duration::hours(1))
            .await
            .unwrap(),
        1
    );
    assert_eq!(engine.revoke_sessions(user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn session_expiry_out_of_range_is_an_error() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .session_ttl(Duration::days(1_000_000_000))
        .build()
        .await
        .unwrap();
    let user = register(&engine, "carol@example.com").await;

    let result = engine.create_session(user.id, Utc::now()).await;
    assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
}

#[tokio::test]
async fn entries_are_scoped_to_their_owner() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();
    let alice = register(&engine, "alice@example.com").await;
    let bob = register(&engine, "bob@example.com").await;

    let entry = engine
        .create_entry(
            alice.id,
            draft(EntryKind::Expense, "Aluguel", "1500", "2025-03"),
            now,
        )
        .await
        .unwrap();
    assert_eq!(entry.amount, Money::new(150_000));

    assert!(engine.list_entries(bob.id, EntryFilter::default()).await.unwrap().is_empty());
    assert!(matches!(
        engine.entry(bob.id, entry.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_entry(bob.id, entry.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    let fetched = engine.entry(alice.id, entry.id).await.unwrap();
    assert_eq!(fetched.name, "Aluguel");
    assert_eq!(fetched.month, month("2025-03"));
}

#[tokio::test]
async fn entry_amount_must_be_positive() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice@example.com").await;

    let mut zero = draft(EntryKind::Expense, "Nada", "1", "2025-03");
    zero.amount = Money::ZERO;
    let result = engine.create_entry(alice.id, zero, Utc::now()).await;
    assert!(matches!(result, Err(EngineError::InvalidAmount(_))));
}

#[tokio::test]
async fn list_filters_by_month_kind_and_completion() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();
    let alice = register(&engine, "alice@example.com").await;

    let mut salary = draft(EntryKind::Income, "Salário", "5000", "2025-03");
    salary.completed = true;
    engine
        .create_entries(
            alice.id,
            vec![
                salary,
                draft(EntryKind::Expense, "Luz", "120,50", "2025-03"),
                draft(EntryKind::Expense, "Água", "80", "2025-04"),
            ],
            now,
        )
        .await
        .unwrap();

    let march = engine
        .list_entries(
            alice.id,
            EntryFilter {
                month: Some(month("2025-03")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(march.len(), 2);

    let pending_expenses = engine
        .list_entries(
            alice.id,
            EntryFilter {
                kind: Some(EntryKind::Expense),
                completed: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pending_expenses.len(), 2);
    assert!(pending_expenses.iter().all(|e| e.kind == EntryKind::Expense));
}

#[tokio::test]
async fn batch_creation_is_all_or_nothing() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice@example.com").await;

    let mut bad = draft(EntryKind::Expense, "Mercado", "10", "2025-03");
    bad.category_id = Some(uuid::Uuid::new_v4());
    let result = engine
        .create_entries(
            alice.id,
            vec![draft(EntryKind::Expense, "Luz", "10", "2025-03"), bad],
            Utc::now(),
        )
        .await;

    assert!(matches!(result, Err(EngineError::InvalidCategory(_))));
    assert!(engine.list_entries(alice.id, EntryFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_and_toggle_entry() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();
    let alice = register(&engine, "alice@example.com").await;
    let mut source = draft(EntryKind::Expense, "Internet", "99,90", "2025-03");
    source.expected_date = NaiveDate::from_ymd_opt(2025, 3, 10);
    let entry = engine.create_entry(alice.id, source, now).await.unwrap();

    let updated = engine
        .update_entry(
            alice.id,
            entry.id,
            EntryChanges {
                name: Some("Fibra".to_string()),
                expected_date: Some(None),
                ..Default::default()
            },
            now,
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Fibra");
    assert_eq!(updated.expected_date, None);
    assert_eq!(updated.amount, Money::new(9_990));

    let done = engine
        .set_entry_completed(alice.id, entry.id, true, now)
        .await
        .unwrap();
    assert!(done.completed);
}

#[tokio::test]
async fn copy_month_creates_pending_copies() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();
    let alice = register(&engine, "alice@example.com").await;

    let mut rent = draft(EntryKind::Expense, "Aluguel", "1500", "2025-03");
    rent.completed = true;
    rent.expected_date = NaiveDate::from_ymd_opt(2025, 3, 31);
    let mut gym = draft(EntryKind::Expense, "Academia", "90", "2025-03");
    gym.expected_date = NaiveDate::from_ymd_opt(2025, 3, 5);
    engine
        .create_entries(alice.id, vec![rent, gym], now)
        .await
        .unwrap();

    let copies = engine
        .copy_month(alice.id, month("2025-03"), month("2025-04"), now)
        .await
        .unwrap();
    assert_eq!(copies.len(), 2);
    assert!(copies.iter().all(|e| !e.completed && e.month == month("2025-04")));

    let rent = copies.iter().find(|e| e.name == "Aluguel").unwrap();
    assert_eq!(rent.expected_date, None);
    let gym = copies.iter().find(|e| e.name == "Academia").unwrap();
    assert_eq!(gym.expected_date, NaiveDate::from_ymd_opt(2025, 4, 5));

    let same = engine
        .copy_month(alice.id, month("2025-03"), month("2025-03"), now)
        .await;
    assert!(matches!(same, Err(EngineError::InvalidMonth(_))));
}

#[tokio::test]
async fn default_categories_are_visible_but_read_only() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice@example.com").await;

    let categories = engine.list_categories(alice.id, None).await.unwrap();
    let default = categories.iter().find(|c| c.is_default).unwrap();
    assert!(default.user_id.is_none());

    let update = engine
        .update_category(
            alice.id,
            default.id,
            CategoryChanges {
                name: Some("Mine".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(update, Err(EngineError::KeyNotFound(_))));
    assert!(matches!(
        engine.delete_category(alice.id, default.id).await,
        Err(EngineError::KeyNotFound(_))
    ));

    let incomes = engine
        .list_categories(alice.id, Some(EntryKind::Income))
        .await
        .unwrap();
    assert!(incomes.iter().all(|c| c.kind == EntryKind::Income));
}

#[tokio::test]
async fn custom_categories_lifecycle() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();
    let alice = register(&engine, "alice@example.com").await;
    let bob = register(&engine, "bob@example.com").await;

    let pets = engine
        .create_category(
            alice.id,
            CategoryDraft {
                name: "Pets".to_string(),
                kind: EntryKind::Expense,
                icon: Some("paw".to_string()),
                color: Some("#795548".to_string()),
                order: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(pets.user_id, Some(alice.id));

    let duplicate = engine
        .create_category(
            alice.id,
            CategoryDraft {
                name: "pets".to_string(),
                kind: EntryKind::Expense,
                icon: None,
                color: None,
                order: None,
            },
        )
        .await;
    assert!(matches!(duplicate, Err(EngineError::ExistingKey(_))));

    assert!(
        !engine
            .list_categories(bob.id, None)
            .await
            .unwrap()
            .iter()
            .any(|c| c.id == pets.id)
    );

    let mut vet = draft(EntryKind::Expense, "Veterinário", "250", "2025-03");
    vet.category_id = Some(pets.id);
    let vet = engine.create_entry(alice.id, vet, now).await.unwrap();

    let mut wrong_kind = draft(EntryKind::Income, "Venda", "10", "2025-03");
    wrong_kind.category_id = Some(pets.id);
    assert!(matches!(
        engine.create_entry(alice.id, wrong_kind, now).await,
        Err(EngineError::InvalidCategory(_))
    ));

    engine.delete_category(alice.id, pets.id).await.unwrap();
    let orphan = engine.entry(alice.id, vet.id).await.unwrap();
    assert_eq!(orphan.category_id, None);
}

#[tokio::test]
async fn configurations_are_seeded_and_updatable() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();
    let alice = register(&engine, "alice@example.com").await;

    let all = engine.list_configurations(alice.id).await.unwrap();
    assert_eq!(all.len(), engine::default_configurations().len());

    let theme = engine
        .update_configuration(alice.id, "tema", ConfigValue::Text("escuro".to_string()), now)
        .await
        .unwrap();
    assert_eq!(theme.value, ConfigValue::Text("escuro".to_string()));
    assert_eq!(
        engine.configuration(alice.id, "tema").await.unwrap().value,
        ConfigValue::Text("escuro".to_string())
    );

    let unknown = engine
        .update_configuration(alice.id, "nao_existe", ConfigValue::Bool(true), now)
        .await;
    assert_eq!(
        unknown.unwrap_err(),
        EngineError::KeyNotFound("configuration 'nao_existe'".to_string())
    );
}

#[tokio::test]
async fn dashboard_summarizes_month_and_trend() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();
    let alice = register(&engine, "alice@example.com").await;

    let mut salary = draft(EntryKind::Income, "Salário", "5000", "2025-03");
    salary.completed = true;
    engine
        .create_entries(
            alice.id,
            vec![
                salary,
                draft(EntryKind::Expense, "Aluguel", "1500", "2025-03"),
                draft(EntryKind::Expense, "Luz", "200", "2025-02"),
                draft(EntryKind::Expense, "Antigo", "999", "2024-01"),
            ],
            now,
        )
        .await
        .unwrap();

    let dashboard = engine.dashboard(alice.id, month("2025-03")).await.unwrap();
    assert_eq!(dashboard.totals.income, Money::new(500_000));
    assert_eq!(dashboard.totals.expense_pending, Money::new(150_000));
    assert_eq!(dashboard.totals.balance(), Money::new(350_000));
    assert_eq!(dashboard.trend.len(), engine::TREND_MONTHS);
    assert_eq!(dashboard.trend[4].expense, Money::new(20_000));
    assert_eq!(dashboard.categories.len(), 2);
}
