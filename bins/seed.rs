//! Seed the database with Philippine government agencies and sample budget
//! data so the dashboard has something to show on first boot.

use chrono::{Datelike, TimeZone, Utc};
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::info;
use uuid::Uuid;

use models::{agency, allocation, expenditure, project, release, user};
use service::db::audit_log_service::{self, RequestMeta};

struct AgencySeed {
    name: &'static str,
    acronym: &'static str,
    category: &'static str,
    description: &'static str,
    contact_email: &'static str,
    website: &'static str,
}

const AGENCIES: &[AgencySeed] = &[
    AgencySeed {
        name: "Department of Budget and Management",
        acronym: "DBM",
        category: "NATIONAL",
        description: "Central government agency responsible for the formulation and implementation of the National Budget",
        contact_email: "info@dbm.gov.ph",
        website: "https://www.dbm.gov.ph",
    },
    AgencySeed {
        name: "Department of Finance",
        acronym: "DOF",
        category: "NATIONAL",
        description: "Executive department responsible for the formulation of sound fiscal policies",
        contact_email: "info@dof.gov.ph",
        website: "https://www.dof.gov.ph",
    },
    AgencySeed {
        name: "Department of Public Works and Highways",
        acronym: "DPWH",
        category: "NATIONAL",
        description: "Executive department responsible for public works",
        contact_email: "dpwh.secretary@dpwh.gov.ph",
        website: "https://www.dpwh.gov.ph",
    },
    AgencySeed {
        name: "Department of Education",
        acronym: "DepEd",
        category: "NATIONAL",
        description: "Executive department responsible for ensuring access to quality basic education",
        contact_email: "action@deped.gov.ph",
        website: "https://www.deped.gov.ph",
    },
    AgencySeed {
        name: "Department of Health",
        acronym: "DOH",
        category: "NATIONAL",
        description: "Executive department responsible for ensuring access to basic public health services",
        contact_email: "secretary@doh.gov.ph",
        website: "https://www.doh.gov.ph",
    },
    AgencySeed {
        name: "Department of Information and Communications Technology",
        acronym: "DICT",
        category: "NATIONAL",
        description: "Executive department responsible for the planning, development and promotion of the ICT agenda",
        contact_email: "osec@dict.gov.ph",
        website: "https://www.dict.gov.ph",
    },
    AgencySeed {
        name: "Commission on Audit",
        acronym: "COA",
        category: "CONSTITUTIONAL",
        description: "Independent constitutional commission responsible for auditing government agencies",
        contact_email: "coa@coa.gov.ph",
        website: "https://www.coa.gov.ph",
    },
    AgencySeed {
        name: "Metro Manila Development Authority",
        acronym: "MMDA",
        category: "LOCAL",
        description: "Agency performing planning and monitoring services for Metro Manila",
        contact_email: "info@mmda.gov.ph",
        website: "https://www.mmda.gov.ph",
    },
];

async fn seed_agency(db: &DatabaseConnection, seed: &AgencySeed) -> anyhow::Result<agency::Model> {
    let now = Utc::now().into();
    let am = agency::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(seed.name.into()),
        acronym: Set(Some(seed.acronym.into())),
        category: Set(seed.category.into()),
        description: Set(Some(seed.description.into())),
        parent_agency_id: Set(None),
        address: Set(None),
        contact_email: Set(Some(seed.contact_email.into())),
        contact_phone: Set(None),
        website: Set(Some(seed.website.into())),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

#[allow(clippy::too_many_arguments)]
async fn seed_allocation(
    db: &DatabaseConnection,
    agency_id: Uuid,
    title: &str,
    description: &str,
    amount: f64,
    uacs_code: &str,
    status: &str,
) -> anyhow::Result<allocation::Model> {
    let now = Utc::now().into();
    let am = allocation::ActiveModel {
        id: Set(Uuid::new_v4()),
        agency_id: Set(agency_id),
        title: Set(title.into()),
        description: Set(Some(description.into())),
        amount: Set(amount),
        fiscal_year: Set(Utc::now().year()),
        uacs_code: Set(Some(uacs_code.into())),
        status: Set(status.into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

async fn main_inner() -> anyhow::Result<()> {
    let db = models::db::connect().await?;
    migration::Migrator::up(&db, None).await?;

    info!("seeding database with Philippine government agencies and sample data");

    let mut agencies = Vec::new();
    for seed in AGENCIES {
        agencies.push(seed_agency(&db, seed).await?);
    }
    info!(count = agencies.len(), "created agencies");

    let by_acronym = |acr: &str| -> Uuid {
        agencies
            .iter()
            .find(|a| a.acronym.as_deref() == Some(acr))
            .map(|a| a.id)
            .expect("seeded agency")
    };

    user::create(&db, "admin@dbm.gov.ph", "DBM Administrator", "DBM_ADMIN", Some(by_acronym("DBM"))).await?;
    user::create(&db, "auditor@coa.gov.ph", "COA Auditor", "COA_AUDITOR", Some(by_acronym("COA"))).await?;
    user::create(&db, "head@dpwh.gov.ph", "DPWH Agency Head", "AGENCY_HEAD", Some(by_acronym("DPWH"))).await?;
    user::create(&db, "sysadmin@dict.gov.ph", "System Administrator", "SYSTEM_ADMIN", Some(by_acronym("DICT"))).await?;
    info!("created users");

    let school = seed_allocation(
        &db,
        by_acronym("DepEd"),
        "School Building Program",
        "Construction of new classrooms nationwide",
        1_000_000_000.0,
        "43010000",
        "APPROVED",
    )
    .await?;
    let flood = seed_allocation(
        &db,
        by_acronym("DPWH"),
        "Flood Control Management System",
        "Nationwide flood control and drainage improvement",
        1_500_000_000.0,
        "44020000",
        "APPROVED",
    )
    .await?;
    let health = seed_allocation(
        &db,
        by_acronym("DOH"),
        "Health Facility Enhancement Program",
        "Upgrading of rural health units and hospitals",
        800_000_000.0,
        "47010000",
        "APPROVED",
    )
    .await?;
    seed_allocation(
        &db,
        by_acronym("DPWH"),
        "Road Network Development",
        "Construction and rehabilitation of national roads",
        2_000_000_000.0,
        "45020000",
        "PROPOSED",
    )
    .await?;
    info!("created budget allocations");

    let mk_release = |allocation_id: Uuid, agency_id: Uuid, amount: f64, description: &str, reference_no: &str, released: bool| {
        let now = Utc::now().into();
        release::ActiveModel {
            id: Set(Uuid::new_v4()),
            allocation_id: Set(allocation_id),
            agency_id: Set(agency_id),
            amount: Set(amount),
            description: Set(Some(description.into())),
            reference_no: Set(Some(reference_no.into())),
            status: Set(if released { "RELEASED".into() } else { "APPROVED".into() }),
            released_at: Set(released.then(|| Utc.with_ymd_and_hms(Utc::now().year(), 2, 1, 0, 0, 0).unwrap().into())),
            created_at: Set(now),
            updated_at: Set(now),
        }
    };

    let school_release = mk_release(
        school.id,
        by_acronym("DepEd"),
        400_000_000.0,
        "First tranche for school building construction",
        "RELEASE-2024-001",
        true,
    )
    .insert(&db)
    .await?;
    let flood_release = mk_release(
        flood.id,
        by_acronym("DPWH"),
        600_000_000.0,
        "Initial release for flood control projects",
        "RELEASE-2024-002",
        true,
    )
    .insert(&db)
    .await?;
    mk_release(
        health.id,
        by_acronym("DOH"),
        300_000_000.0,
        "First release for health facility upgrades",
        "RELEASE-2024-003",
        false,
    )
    .insert(&db)
    .await?;
    info!("created fund releases");

    let classroom = project::create(
        &db,
        school.id,
        by_acronym("DepEd"),
        Some(school_release.id),
        "Classroom Construction - Region I",
        Some("Construction of 50 new classrooms in Region I".into()),
        100_000_000.0,
        Some("Region I (Ilocos Region)".into()),
        None,
        None,
    )
    .await?;
    let marikina = project::create(
        &db,
        flood.id,
        by_acronym("DPWH"),
        Some(flood_release.id),
        "Marikina River Flood Control",
        Some("Improvement of flood control systems along Marikina River".into()),
        250_000_000.0,
        Some("Marikina City, Metro Manila".into()),
        None,
        None,
    )
    .await?;
    info!("created projects");

    expenditure::create(
        &db,
        school_release.id,
        Some(classroom.id),
        25_000_000.0,
        "ABC Construction Corp",
        Some("Payment for construction materials and labor".into()),
        Some("QmT78zSuBmuS4z925WFZdy2k7Qpf9UKYbH9v8gKzWqgG9d".into()),
        "CAPITAL_OUTLAY",
    )
    .await?;
    expenditure::create(
        &db,
        flood_release.id,
        Some(marikina.id),
        45_000_000.0,
        "XYZ Engineering Services",
        Some("Design and engineering services for flood control system".into()),
        Some("QmNkWk8v8z4J7Y6t5r4e3w2q1p9o8i7u6y5t4r3e2w1q".into()),
        "MOOE",
    )
    .await?;
    expenditure::create(
        &db,
        school_release.id,
        Some(classroom.id),
        15_000_000.0,
        "Department of Education - Region I",
        Some("Salaries of project supervisors and technical staff".into()),
        None,
        "PERSONNEL",
    )
    .await?;
    info!("created expenditures");

    let meta = RequestMeta {
        ip_address: Some("127.0.0.1".into()),
        user_agent: Some("budget-seed".into()),
    };
    audit_log_service::append(
        &db,
        "CREATE_ALLOCATION",
        "Allocation",
        &school.id.to_string(),
        serde_json::to_string(&school).ok(),
        &meta,
    )
    .await?;
    audit_log_service::append(
        &db,
        "CREATE_RELEASE",
        "Release",
        &school_release.id.to_string(),
        serde_json::to_string(&school_release).ok(),
        &meta,
    )
    .await?;

    info!("seed complete");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    common::utils::logging::init_logging_default();
    main_inner().await
}
