use assess_core::model::{AnswerState, Assessment, AssessmentId, Question, ResponseId, UserId};
use assess_core::time::fixed_now;
use storage::repository::{
    AssessmentRepository, NewResponseRecord, ResponseRepository, StorageError,
};
use storage::sqlite::SqliteRepository;

fn opts(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn build_assessment() -> Assessment {
    Assessment::new(
        AssessmentId::new("a1").unwrap(),
        "General Knowledge",
        "A two-question warm-up.",
        vec![
            Question::new("2+2?", opts(&["3", "4"]), "4").unwrap(),
            Question::new("Capital of France?", opts(&["Paris", "Lyon"]), "Paris").unwrap(),
        ],
    )
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    SqliteRepository::open(&url).await.expect("open")
}

#[tokio::test]
async fn sqlite_reads_assessment_with_ordered_questions() {
    let repo = connect("memdb_assessment_read").await;
    let assessment = build_assessment();
    repo.upsert_assessment(&assessment).await.unwrap();

    let first = repo.get_assessment(assessment.id()).await.expect("load");
    let second = repo.get_assessment(assessment.id()).await.expect("load again");

    assert_eq!(first, assessment);
    assert_eq!(first, second);
    assert_eq!(first.question(1).unwrap().prompt(), "Capital of France?");
}

#[tokio::test]
async fn sqlite_missing_assessment_is_not_found() {
    let repo = connect("memdb_assessment_missing").await;

    let err = repo
        .get_assessment(&AssessmentId::new("nonexistent-id").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_upsert_replaces_questions() {
    let repo = connect("memdb_assessment_upsert").await;
    repo.upsert_assessment(&build_assessment()).await.unwrap();

    let revised = Assessment::new(
        AssessmentId::new("a1").unwrap(),
        "General Knowledge v2",
        "",
        vec![Question::new("3+3?", opts(&["6", "9"]), "6").unwrap()],
    );
    repo.upsert_assessment(&revised).await.unwrap();

    let loaded = repo.get_assessment(revised.id()).await.unwrap();
    assert_eq!(loaded, revised);
    assert_eq!(loaded.question_count(), 1);
}

#[tokio::test]
async fn sqlite_stores_response_payload_verbatim() {
    let repo = connect("memdb_response_insert").await;
    repo.upsert_assessment(&build_assessment()).await.unwrap();

    let mut answers = AnswerState::new();
    answers.select(0, "4");
    answers.select(1, "Lyon");

    let record = NewResponseRecord {
        user_id: UserId::new("u1").unwrap(),
        assessment_id: AssessmentId::new("a1").unwrap(),
        answers: answers.encode().unwrap(),
        score: 1,
        submitted_at: fixed_now(),
    };
    let id = repo.insert_response(&record).await.expect("insert");

    let stored = repo.get_response(id).await.expect("read back");
    assert_eq!(stored.id, id);
    assert_eq!(stored.user_id, record.user_id);
    assert_eq!(stored.answers, r#"{"0":"4","1":"Lyon"}"#);
    assert_eq!(AnswerState::decode(&stored.answers).unwrap(), answers);
    assert_eq!(stored.score, 1);
    assert_eq!(stored.submitted_at, fixed_now());

    let missing = repo.get_response(ResponseId::new(id.value() + 100)).await;
    assert!(matches!(missing, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn sqlite_rejects_response_for_unknown_assessment() {
    let repo = connect("memdb_response_fk").await;

    let record = NewResponseRecord {
        user_id: UserId::new("u1").unwrap(),
        assessment_id: AssessmentId::new("ghost").unwrap(),
        answers: "{}".into(),
        score: 0,
        submitted_at: fixed_now(),
    };
    let err = repo.insert_response(&record).await.unwrap_err();
    assert!(matches!(err, StorageError::Connection(_)));
}
