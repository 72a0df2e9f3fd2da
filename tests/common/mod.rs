//! Shared helpers for database integration tests
//!
//! Each test gets its own throwaway Postgres container, so these tests need a
//! Docker daemon and are ignored by default. Run them with
//! `cargo test -- --ignored`.

#![allow(dead_code)]

use arena::{
    catalog::{ContestCatalog, ContestDefinition},
    db::{self, repositories::UserRepository},
    judge::{Duration, Report, ResourceUsage, TestReport, Verdict},
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

pub struct TestDb {
    pub pool: PgPool,
    pub url: String,
    _container: ContainerAsync<Postgres>,
}

/// Start Postgres and apply migrations
pub async fn start_db() -> TestDb {
    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container");
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    TestDb {
        pool,
        url,
        _container: container,
    }
}

/// Mirror a fresh identity-service user
pub async fn insert_user(pool: &PgPool, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    UserRepository::ensure(pool, &id, username).await.unwrap();
    id
}

pub const CONTEST: &str = r#"{
    "name": "Spring Round",
    "duration": 7200,
    "submission-cooldown": 30,
    "scoring": { "subtask-score": 50, "test-score": 10, "answer-score": 25 },
    "judge": {
        "resource-limits": { "cpu": 1, "cpu-tolerance": 1, "memory": 268435456, "memory-tolerance": 1048576 },
        "languages": [ { "name": "Python", "file-extension": "py", "run": ["python3", "code.py"] } ]
    },
    "tasks": [
        { "name": "Sum", "difficulty": "Easy", "subtasks": [ { "tests": [ { "input": "1 2", "output": "3" } ] } ] },
        { "name": "Riddle", "difficulty": "Hard", "answer": "42" }
    ]
}"#;

pub fn contest() -> ContestDefinition {
    serde_json::from_str(CONTEST).unwrap()
}

pub fn catalog() -> ContestCatalog {
    ContestCatalog::from_definitions([("spring".to_string(), contest())]).unwrap()
}

fn test_report(verdict: Verdict, memory: u64) -> TestReport {
    TestReport {
        verdict,
        resource_usage: ResourceUsage {
            memory,
            user_time: Duration { secs: 0, nanos: 2_000_000 },
            sys_time: Duration { secs: 0, nanos: 1_000_000 },
        },
    }
}

/// Report whose subtask verdicts follow the verdicts of their tests
pub fn report(subtasks: &[&[(Verdict, u64)]]) -> Report {
    let tests: Vec<Vec<TestReport>> = subtasks
        .iter()
        .map(|tests| tests.iter().map(|(v, m)| test_report(*v, *m)).collect())
        .collect();
    let subtask_verdicts: Vec<Verdict> = tests
        .iter()
        .map(|tests| {
            tests
                .iter()
                .map(|t| t.verdict)
                .find(|v| !v.is_accepted())
                .unwrap_or(Verdict::Accepted)
        })
        .collect();
    let task = subtask_verdicts
        .iter()
        .copied()
        .find(|v| !v.is_accepted())
        .unwrap_or(Verdict::Accepted);

    Report {
        task,
        subtasks: subtask_verdicts,
        tests,
    }
}
