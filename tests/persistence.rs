//! Database integration tests for submission storage, admissions and sessions

mod common;

use std::sync::Arc;

use arena::{
    AppError, AppState, Config,
    db::repositories::{AdmissionRepository, ContestRepository, SubmissionRepository, UserRepository},
    handlers::submissions::request::SubmitForm,
    judge::{JudgeClient, Verdict},
    middleware::AuthenticatedUser,
    services::{
        ContestService, LeaderboardService, PgResultWriter, ResultWriter, SubmissionService,
        result_writer::{Graded, NewSubmission},
    },
};
use chrono::{Duration, SubsecRound, Utc};
use common::{catalog, contest, insert_user, report, start_db};
use tokio::net::TcpListener;
use uuid::Uuid;

fn judged(user_id: Uuid, contest_id: Uuid, subtasks: &[&[(Verdict, u64)]]) -> NewSubmission {
    NewSubmission {
        user_id,
        contest_id,
        task: 1,
        code: "print(sum(map(int, input().split())))".to_string(),
        language: "Python".to_string(),
        graded: Graded::Report {
            report: report(subtasks),
            scoring: contest().scoring,
        },
    }
}

fn answered(user_id: Uuid, contest_id: Uuid, score: f64) -> NewSubmission {
    let verdict = if score > 0.0 { Verdict::Accepted } else { Verdict::WrongAnswer };
    NewSubmission {
        user_id,
        contest_id,
        task: 2,
        code: "42".to_string(),
        language: "answer".to_string(),
        graded: Graded::Answer { verdict, score },
    }
}

async fn submission_count(pool: &sqlx::PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_persist_stores_submission_with_outcomes() {
    let db = start_db().await;
    let user = insert_user(&db.pool, "ada").await;
    let session = ContestRepository::create(&db.pool, "spring", 7200).await.unwrap();
    let writer = PgResultWriter::new(db.pool.clone());

    let id = writer
        .persist(judged(
            user,
            session.id,
            &[
                &[(Verdict::Accepted, 1024), (Verdict::Accepted, 2048)],
                &[(Verdict::WrongAnswer, 4096)],
            ],
        ))
        .await
        .unwrap();

    let stored = SubmissionRepository::find_by_id(&db.pool, &id).await.unwrap().unwrap();
    // one accepted subtask and two accepted tests
    assert_eq!(stored.score, 70.0);
    assert_eq!(stored.verdict, "wrong_answer");
    assert_eq!(stored.task, 1);

    let outcomes = SubmissionRepository::outcomes_for(&db.pool, &id).await.unwrap();
    let positions: Vec<(i32, i32, i64)> = outcomes
        .iter()
        .map(|o| (o.subtask, o.index, o.memory_bytes))
        .collect();
    assert_eq!(positions, vec![(1, 1, 1024), (1, 2, 2048), (2, 1, 4096)]);
    assert_eq!(outcomes[2].verdict, "wrong_answer");
    assert_eq!(outcomes[0].runtime_millis, 3.0);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_failed_outcome_insert_leaves_nothing_behind() {
    let db = start_db().await;
    let user = insert_user(&db.pool, "ada").await;
    let session = ContestRepository::create(&db.pool, "spring", 7200).await.unwrap();
    let writer = PgResultWriter::new(db.pool.clone());

    sqlx::query("ALTER TABLE test_outcomes ADD CONSTRAINT small_memory CHECK (memory_bytes < 10000)")
        .execute(&db.pool)
        .await
        .unwrap();

    let result = writer
        .persist(judged(
            user,
            session.id,
            &[&[(Verdict::Accepted, 100), (Verdict::MemoryLimitExceeded, 50_000)]],
        ))
        .await;

    assert!(result.is_err());
    assert_eq!(submission_count(&db.pool).await, 0);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_answer_submission_has_no_outcomes() {
    let db = start_db().await;
    let user = insert_user(&db.pool, "ada").await;
    let session = ContestRepository::create(&db.pool, "spring", 7200).await.unwrap();
    let writer = PgResultWriter::new(db.pool.clone());

    let id = writer.persist(answered(user, session.id, 25.0)).await.unwrap();

    let history = SubmissionRepository::history(&db.pool, &user, &session.id, 2).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, id);
    assert_eq!(history[0].language, "answer");
    assert!(SubmissionRepository::outcomes_for(&db.pool, &id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_admission_respects_cooldown() {
    let db = start_db().await;
    let user = insert_user(&db.pool, "ada").await;
    let session = ContestRepository::create(&db.pool, "spring", 7200).await.unwrap();
    let now = Utc::now().trunc_subsecs(6);

    assert!(AdmissionRepository::try_admit(&db.pool, &user, &session.id, 1, now, 30).await.unwrap());
    assert!(
        !AdmissionRepository::try_admit(&db.pool, &user, &session.id, 1, now + Duration::seconds(10), 30)
            .await
            .unwrap()
    );
    // other tasks have their own cooldown
    assert!(AdmissionRepository::try_admit(&db.pool, &user, &session.id, 2, now, 30).await.unwrap());
    assert!(
        AdmissionRepository::try_admit(&db.pool, &user, &session.id, 1, now + Duration::seconds(30), 30)
            .await
            .unwrap()
    );

    let last = AdmissionRepository::last_admitted(&db.pool, &user, &session.id, 1).await.unwrap();
    assert_eq!(
        last.map(|t| t.timestamp_micros()),
        Some((now + Duration::seconds(30)).timestamp_micros())
    );
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_concurrent_admissions_admit_one() {
    let db = start_db().await;
    let user = insert_user(&db.pool, "ada").await;
    let session = ContestRepository::create(&db.pool, "spring", 7200).await.unwrap();
    let now = Utc::now().trunc_subsecs(6);

    let attempts = (0..8).map(|_| AdmissionRepository::try_admit(&db.pool, &user, &session.id, 1, now, 30));
    let admitted = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(Result::unwrap)
        .filter(|admitted| *admitted)
        .count();

    assert_eq!(admitted, 1);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_released_admission_can_be_retaken() {
    let db = start_db().await;
    let user = insert_user(&db.pool, "ada").await;
    let session = ContestRepository::create(&db.pool, "spring", 7200).await.unwrap();
    let now = Utc::now().trunc_subsecs(6);

    assert!(AdmissionRepository::try_admit(&db.pool, &user, &session.id, 1, now, 30).await.unwrap());
    AdmissionRepository::release(&db.pool, &user, &session.id, 1, now).await.unwrap();

    let retry = now + Duration::seconds(1);
    assert!(AdmissionRepository::try_admit(&db.pool, &user, &session.id, 1, retry, 30).await.unwrap());

    // releasing a stale instant keeps the newer admission
    AdmissionRepository::release(&db.pool, &user, &session.id, 1, now).await.unwrap();
    assert!(
        !AdmissionRepository::try_admit(&db.pool, &user, &session.id, 1, retry + Duration::seconds(1), 30)
            .await
            .unwrap()
    );
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_leaderboard_sums_best_scores() {
    let db = start_db().await;
    let catalog = catalog();
    let ada = insert_user(&db.pool, "ada").await;
    let bob = insert_user(&db.pool, "bob").await;
    let session = ContestService::start_contest(&db.pool, &catalog, "spring").await.unwrap();
    let writer = PgResultWriter::new(db.pool.clone());

    // ada: 60 on task 1, then a worse retry; 25 on task 2
    writer
        .persist(judged(ada, session.id, &[&[(Verdict::Accepted, 1)]]))
        .await
        .unwrap();
    writer
        .persist(judged(ada, session.id, &[&[(Verdict::WrongAnswer, 1)]]))
        .await
        .unwrap();
    writer.persist(answered(ada, session.id, 25.0)).await.unwrap();
    // bob: 60 on task 1 only
    writer
        .persist(judged(bob, session.id, &[&[(Verdict::Accepted, 1)]]))
        .await
        .unwrap();

    let board = LeaderboardService::leaderboard(&db.pool, &catalog, "spring").await.unwrap();
    let rows: Vec<(&str, u32, f64)> = board
        .standings
        .iter()
        .map(|s| (s.username.as_str(), s.rank, s.total_score))
        .collect();

    assert_eq!(rows, vec![("ada", 1, 85.0), ("bob", 2, 60.0)]);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_session_lifecycle() {
    let db = start_db().await;
    let catalog = catalog();

    let board = LeaderboardService::leaderboard(&db.pool, &catalog, "spring").await.unwrap();
    assert!(board.standings.is_empty());

    let session = ContestService::start_contest(&db.pool, &catalog, "spring").await.unwrap();
    assert_eq!(session.duration_seconds, 7200);

    let again = ContestService::start_contest(&db.pool, &catalog, "spring").await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let user = insert_user(&db.pool, "ada").await;
    PgResultWriter::new(db.pool.clone())
        .persist(answered(user, session.id, 0.0))
        .await
        .unwrap();

    ContestService::remove_session(&db.pool, &catalog, "spring").await.unwrap();
    assert_eq!(submission_count(&db.pool).await, 0);
    assert!(matches!(
        ContestService::remove_session(&db.pool, &catalog, "spring").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        ContestService::start_contest(&db.pool, &catalog, "autumn").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_user_mirror_follows_renames() {
    let db = start_db().await;
    let ada = insert_user(&db.pool, "ada").await;

    UserRepository::ensure(&db.pool, &ada, "ada").await.unwrap();
    UserRepository::ensure(&db.pool, &ada, "ada_l").await.unwrap();
    assert_eq!(
        UserRepository::username(&db.pool, &ada).await.unwrap().as_deref(),
        Some("ada_l")
    );

    let clash = UserRepository::ensure(&db.pool, &Uuid::new_v4(), "ada_l").await;
    assert!(matches!(clash, Err(AppError::AlreadyExists(_))));
}

async fn insert_outcome(pool: &sqlx::PgPool, submission_id: Uuid, verdict: &str) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO test_outcomes (submission_id, subtask, "index", runtime_millis, memory_bytes, verdict)
        VALUES ($1, 1, 1, 1.0, 1, $2)
        "#,
    )
    .bind(submission_id)
    .bind(verdict)
    .execute(pool)
    .await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_outcome_verdicts_are_constrained() {
    let db = start_db().await;
    let user = insert_user(&db.pool, "ada").await;
    let session = ContestRepository::create(&db.pool, "spring", 7200).await.unwrap();
    let id = PgResultWriter::new(db.pool.clone())
        .persist(answered(user, session.id, 25.0))
        .await
        .unwrap();

    assert!(insert_outcome(&db.pool, id, "Accepted").await.is_err());
    assert!(insert_outcome(&db.pool, id, "accepted").await.is_ok());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_cooldown_rejects_before_contacting_judge() {
    let db = start_db().await;
    let judge = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let judge_url = format!("http://{}", judge.local_addr().unwrap());

    let config = Config::from_source(|key| match key {
        "DATABASE_URL" => Some(db.url.clone()),
        "JWT_SECRET" => Some("secret".to_string()),
        "JUDGE_URL" => Some(judge_url.clone()),
        _ => None,
    })
    .unwrap();
    let client = JudgeClient::new(&config.judge).unwrap();
    let state = AppState::new(
        db.pool.clone(),
        client,
        catalog(),
        Arc::new(PgResultWriter::new(db.pool.clone())),
        config,
    );

    let user = AuthenticatedUser {
        id: insert_user(&db.pool, "ada").await,
        username: "ada".to_string(),
        role: "participant".to_string(),
    };
    let session = ContestService::start_contest(&db.pool, state.catalog(), "spring").await.unwrap();
    let now = Utc::now().trunc_subsecs(6);
    assert!(AdmissionRepository::try_admit(&db.pool, &user.id, &session.id, 1, now, 30).await.unwrap());

    let form = SubmitForm {
        language: Some("Python".to_string()),
        code: Some("print(sum(map(int, input().split())))".to_string()),
        answer: None,
    };
    let result = SubmissionService::submit(&state, &user, "spring", 1, form).await;

    match result {
        Err(AppError::CooldownActive { retry_after_secs }) => assert!((1..=30).contains(&retry_after_secs)),
        Err(other) => panic!("expected cooldown rejection, got {other:?}"),
        Ok(_) => panic!("expected cooldown rejection, got a dispatched submission"),
    }

    let contacted = tokio::time::timeout(std::time::Duration::from_millis(200), judge.accept()).await;
    assert!(contacted.is_err(), "judge was contacted during cooldown");
    assert_eq!(submission_count(&db.pool).await, 0);
}
