use crate::db::connect;
use crate::{agency, allocation, expenditure, project, release, user};
use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

/// Setup test database with migrations
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::test]
async fn test_agency_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let name = format!("Test Commission {}", Uuid::new_v4());
    let created = agency::create(&db, &name, Some("TC".into()), "CONSTITUTIONAL").await?;
    assert_eq!(created.name, name);
    assert_eq!(created.category, "CONSTITUTIONAL");

    let found = agency::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().acronym.as_deref(), Some("TC"));

    // Invalid category never reaches the database
    assert!(agency::create(&db, "Bad Agency", None, "REGIONAL").await.is_err());

    agency::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_budget_chain_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let a = agency::create(&db, &format!("Chain Agency {}", Uuid::new_v4()), None, "NATIONAL").await?;
    let current_year = chrono::Utc::now().format("%Y").to_string().parse::<i32>()?;
    let alloc = allocation::create(
        &db,
        a.id,
        "Road Network Development",
        Some("Construction and rehabilitation of national roads".into()),
        2_000_000_000.0,
        current_year,
        Some("45020000".into()),
    )
    .await?;
    assert_eq!(alloc.status, "PROPOSED");

    let rel = release::create(&db, alloc.id, a.id, 400_000_000.0, None, Some("RELEASE-TEST-001".into())).await?;
    assert_eq!(rel.status, "PENDING");

    let proj = project::create(
        &db,
        alloc.id,
        a.id,
        Some(rel.id),
        "Classroom Construction",
        None,
        100_000_000.0,
        Some("Region I".into()),
        None,
        None,
    )
    .await?;
    assert_eq!(proj.status, "PLANNING");

    let exp = expenditure::create(
        &db,
        rel.id,
        Some(proj.id),
        25_000_000.0,
        "ABC Construction Corp",
        None,
        None,
        "CAPITAL_OUTLAY",
    )
    .await?;
    assert_eq!(exp.status, "PENDING");
    assert_eq!(exp.category, "CAPITAL_OUTLAY");

    // Cleanup bottom-up
    expenditure::Entity::delete_by_id(exp.id).exec(&db).await?;
    project::Entity::delete_by_id(proj.id).exec(&db).await?;
    release::Entity::delete_by_id(rel.id).exec(&db).await?;
    allocation::Entity::delete_by_id(alloc.id).exec(&db).await?;
    agency::Entity::delete_by_id(a.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_user_crud_and_lookup() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let email = format!("auditor_{}@coa.gov.ph", Uuid::new_v4());
    let created = user::create(&db, &email, "Test Auditor", "COA_AUDITOR", None).await?;

    let found = user::find_by_email(&db, &email).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().id, created.id);

    let missing = user::find_by_email(&db, "nobody@example.com").await?;
    assert!(missing.is_none());

    user::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}
