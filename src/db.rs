use anyhow::{Context, Result};
use chrono::Local;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const CREATE_DEPARTMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS departments (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)
"#;

const CREATE_JOB_TITLES: &str = r#"
CREATE TABLE IF NOT EXISTS job_titles (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)
"#;

const CREATE_EMPLOYEES: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id   TEXT NOT NULL UNIQUE,
    full_name     TEXT NOT NULL,
    email         TEXT NOT NULL,
    department_id INTEGER NOT NULL REFERENCES departments (id),
    job_title_id  INTEGER NOT NULL REFERENCES job_titles (id),
    created_at    DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

// One row per employee per calendar day. `day` is derived from `date` on
// every write; the unique pair makes the day-keyed upsert atomic.
const CREATE_ATTENDANCE: &str = r#"
CREATE TABLE IF NOT EXISTS attendance (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id INTEGER NOT NULL REFERENCES employees (id),
    date        DATETIME NOT NULL,
    day         TEXT NOT NULL,
    present     BOOLEAN NOT NULL,
    UNIQUE (employee_id, day)
)
"#;

pub async fn init_db(database_url: &str) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to database")
}

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for ddl in [
        CREATE_DEPARTMENTS,
        CREATE_JOB_TITLES,
        CREATE_EMPLOYEES,
        CREATE_ATTENDANCE,
    ] {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .context("creating database schema")?;
    }
    Ok(())
}

/// Inserts the fixed department and job title rows, skipping any name that
/// is already present. Safe to run on every startup.
pub async fn seed_reference_data(pool: &SqlitePool) -> Result<()> {
    for name in ["Engineering", "HR", "Sales", "Marketing"] {
        sqlx::query("INSERT INTO departments (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await
            .context("seeding departments")?;
    }

    for name in [
        "Senior Developer",
        "HR Manager",
        "Sales Representative",
        "Marketing Specialist",
    ] {
        sqlx::query("INSERT INTO job_titles (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await
            .context("seeding job titles")?;
    }

    Ok(())
}

/// Seeds three demo employees plus a present-today attendance row for each,
/// but only when the employees table is empty.
pub async fn seed_employees(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await
        .context("counting employees")?;
    if count > 0 {
        return Ok(());
    }

    info!("Seeding employees...");

    let seeds = [
        (
            "EMP001",
            "John Doe",
            "john.doe@example.com",
            "Engineering",
            "Senior Developer",
        ),
        ("EMP002", "Jane Smith", "jane.smith@example.com", "HR", "HR Manager"),
        (
            "EMP003",
            "Mike Johnson",
            "mike.j@example.com",
            "Sales",
            "Sales Representative",
        ),
    ];

    let today = Local::now().naive_local();

    for (code, full_name, email, department, job_title) in seeds {
        let employee_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO employees (employee_id, full_name, email, department_id, job_title_id)
            SELECT ?, ?, ?, d.id, j.id
            FROM departments d, job_titles j
            WHERE d.name = ? AND j.name = ?
            RETURNING id
            "#,
        )
        .bind(code)
        .bind(full_name)
        .bind(email)
        .bind(department)
        .bind(job_title)
        .fetch_one(pool)
        .await
        .context("seeding employees")?;

        sqlx::query("INSERT INTO attendance (employee_id, date, day, present) VALUES (?, ?, ?, ?)")
            .bind(employee_id)
            .bind(today)
            .bind(today.date())
            .bind(true)
            .execute(pool)
            .await
            .context("seeding attendance")?;
    }

    info!("Database seeded successfully");
    Ok(())
}
