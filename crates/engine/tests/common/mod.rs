#![allow(dead_code)]

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Engine, Money, ShopInput, StageInput, TemplateDetail, TemplateInput, WorkflowInput,
    WorkflowWithStages,
};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    add_user(&db, "alice").await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn add_user(db: &DatabaseConnection, username: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec![username.into(), "password".into()],
    ))
    .await
    .unwrap();
}

/// Creates a USD shop for `user` with a default three-stage workflow.
pub async fn shop_with_workflow(engine: &Engine, user: &str) -> WorkflowWithStages {
    engine
        .create_shop(user, ShopInput::named("Sawdust & Co").currency("USD"))
        .await
        .unwrap();
    engine
        .create_workflow(
            user,
            WorkflowInput {
                name: Some("Default".to_string()),
                is_default: Some(true),
                stages: Some(vec![
                    StageInput::new("Idea", 0, "idea"),
                    StageInput::new("Build", 1, "build"),
                    StageInput::new("Completed", 2, "completed"),
                ]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

/// A template priced at `base_price` whole units, no workflow of its own.
pub async fn template(engine: &Engine, user: &str, name: &str, base_price: i64) -> TemplateDetail {
    engine
        .create_template(
            user,
            TemplateInput {
                name: Some(name.to_string()),
                category: Some("furniture".to_string()),
                base_price: Some(Some(Money::whole(base_price))),
                estimated_labor_hours: Some("1.5".parse().unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}
