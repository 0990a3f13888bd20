#![allow(dead_code)]

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use employee_search::db::{ConnectionOptions, DbPool, build_connection_pool};
use employee_search::models::employee::NewEmployee;
use employee_search::schema::employees;
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// SQLite database living in a temporary directory for the duration of a test.
pub struct TestDb {
    _dir: TempDir,
    url: String,
    pool: DbPool,
}

impl TestDb {
    /// Creates the database file and applies all migrations.
    pub fn new(name: &str) -> Self {
        Self::with_options(name, ConnectionOptions::default())
    }

    /// Like [`TestDb::new`], with custom options for the pooled connections.
    pub fn with_options(name: &str, options: ConnectionOptions) -> Self {
        let db = Self::open(name, options);
        let mut conn = db.writer();
        conn.run_pending_migrations(MIGRATIONS)
            .expect("migrations should apply");
        db
    }

    /// Creates an empty database file with no tables.
    pub fn without_schema(name: &str) -> Self {
        Self::open(name, ConnectionOptions::default())
    }

    fn open(name: &str, options: ConnectionOptions) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = dir.path().join(name).to_string_lossy().into_owned();
        // Create the file before the read-only pool opens it.
        SqliteConnection::establish(&url).expect("database should open");
        let pool = build_connection_pool(&url, options).expect("pool should build");
        Self {
            _dir: dir,
            url,
            pool,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Plain read-write connection, outside the query-only pool.
    pub fn writer(&self) -> SqliteConnection {
        SqliteConnection::establish(&self.url).expect("database should open")
    }

    pub fn seed(&self, rows: &[NewEmployee<'_>]) {
        let mut conn = self.writer();
        diesel::insert_into(employees::table)
            .values(rows)
            .execute(&mut conn)
            .expect("seed rows should insert");
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Six employees over three departments. Sorted by last name they are:
/// Dijkstra, Hopper, Liskov, Lovelace, O'Brien, Turing.
pub fn staff() -> Vec<NewEmployee<'static>> {
    vec![
        NewEmployee {
            department_id: 1,
            first_name: "Ada",
            last_name: "Lovelace",
            email: "ada.lovelace@corp.example",
            job_title: Some("Analyst"),
            is_active: true,
            hire_date: date(2020, 1, 15),
        },
        NewEmployee {
            department_id: 1,
            first_name: "Alan",
            last_name: "Turing",
            email: "alan.turing@corp.example",
            job_title: Some("Engineer"),
            is_active: true,
            hire_date: date(2018, 6, 23),
        },
        NewEmployee {
            department_id: 2,
            first_name: "Grace",
            last_name: "Hopper",
            email: "grace.hopper@corp.example",
            job_title: Some("R&D Lead"),
            is_active: false,
            hire_date: date(2015, 12, 9),
        },
        NewEmployee {
            department_id: 2,
            first_name: "Sean",
            last_name: "O'Brien",
            email: "sean.obrien@corp.example",
            job_title: Some("Sales <EMEA>"),
            is_active: true,
            hire_date: date(2022, 3, 17),
        },
        NewEmployee {
            department_id: 3,
            first_name: "Edsger",
            last_name: "Dijkstra",
            email: "edsger.dijkstra@corp.example",
            job_title: None,
            is_active: false,
            hire_date: date(2011, 5, 11),
        },
        NewEmployee {
            department_id: 1,
            first_name: "Barbara",
            last_name: "Liskov",
            email: "barbara.liskov@corp.example",
            job_title: Some("Top 10% Performer"),
            is_active: true,
            hire_date: date(2019, 11, 7),
        },
    ]
}
