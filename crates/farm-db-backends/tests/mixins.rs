//! Integration tests for the model mixins on committed models: the
//! `UtilityMixins` helpers, validation, and work state change tracking.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use farm_core::{FarmError, FarmResult, Settings};
use farm_db::column_types::WorkState;
use farm_db::executor::{commit_model, create_table, fetch_model};
use farm_db::fields::{FieldDef, FieldType};
use farm_db::mixins::{
    ValidatePriorityMixin, ValidateWorkStateMixin, WorkStateChangedMixin, WorkStateFields,
};
use farm_db::model::{Model, ModelMeta, UtilityMixins};
use farm_db::row::Row;
use farm_db::value::Value;
use farm_db_backends::{DatabaseBackend, SqliteBackend};
use rand::seq::SliceRandom;

#[derive(Debug, Default)]
struct MixinModel {
    id: Option<i64>,
    a: Option<i64>,
    b: Option<String>,
    c: Option<Ipv4Addr>,
}

impl MixinModel {
    fn new(a: i64, b: &str) -> Self {
        Self {
            a: Some(a),
            b: Some(b.to_string()),
            ..Self::default()
        }
    }
}

impl Model for MixinModel {
    fn meta() -> &'static ModelMeta {
        static META: LazyLock<ModelMeta> = LazyLock::new(|| {
            ModelMeta::new(
                "mixin",
                Settings::default().table_name("mixin_test"),
                vec![
                    FieldDef::new("id", FieldType::AutoField).primary_key(),
                    FieldDef::new("a", FieldType::IntegerField),
                    FieldDef::new("b", FieldType::CharField).max_length(512),
                    FieldDef::new("c", FieldType::Ipv4Address),
                ],
            )
        });
        &META
    }

    fn pk(&self) -> Option<Value> {
        self.id.map(Value::Int)
    }

    fn set_pk(&mut self, value: Value) {
        self.id = value.as_int();
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("a", self.a.into()),
            ("b", self.b.clone().into()),
            ("c", self.c.map(Value::from).unwrap_or(Value::Null)),
        ]
    }

    fn from_row(row: &Row) -> FarmResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            a: row.get("a")?,
            b: row.get("b")?,
            c: row.get("c")?,
        })
    }
}

impl UtilityMixins for MixinModel {}

async fn committed(model: &mut MixinModel) -> SqliteBackend {
    let db = SqliteBackend::memory().unwrap();
    create_table::<MixinModel>(&db).await.unwrap();
    commit_model(model, &db).await.unwrap();
    db
}

#[tokio::test]
async fn test_to_dict() {
    let mut model = MixinModel::new(1, "hello");
    let _db = committed(&mut model).await;

    let expected: BTreeMap<String, Value> = [
        ("a", Value::Int(1)),
        ("b", Value::from("hello")),
        ("id", Value::Int(model.id.unwrap())),
        ("c", Value::Null),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    assert_eq!(model.to_dict(), expected);
}

#[tokio::test]
async fn test_to_dict_after_reload() {
    let mut model = MixinModel::new(7, "world");
    model.c = Some(Ipv4Addr::new(10, 1, 2, 3));
    let db = committed(&mut model).await;

    let reloaded = fetch_model::<MixinModel>(model.id.unwrap(), &db).await.unwrap();
    assert_eq!(reloaded.to_dict(), model.to_dict());
    assert_eq!(reloaded.to_dict()["c"].to_string(), "10.1.2.3");
}

#[tokio::test]
async fn test_to_schema() {
    let mut model = MixinModel::new(1, "hello");
    let _db = committed(&mut model).await;

    let expected: BTreeMap<String, String> = [
        ("a", "INTEGER"),
        ("b", "VARCHAR(512)"),
        ("id", "INTEGER"),
        ("c", "IPv4Address"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(MixinModel::to_schema(), expected);
}

// ── Validation ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ValidationModel {
    id: Option<i64>,
    state: Option<WorkState>,
    attempts: Option<i64>,
    priority: Option<i64>,
}

impl Model for ValidationModel {
    fn meta() -> &'static ModelMeta {
        static META: LazyLock<ModelMeta> = LazyLock::new(|| {
            ModelMeta::new(
                "validation",
                Settings::default().table_name("validation_mixin_test"),
                vec![
                    FieldDef::new("id", FieldType::AutoField).primary_key(),
                    FieldDef::new("state", FieldType::WorkStateEnum),
                    FieldDef::new("attempts", FieldType::IntegerField),
                    FieldDef::new("priority", FieldType::IntegerField),
                ],
            )
        });
        &META
    }

    fn pk(&self) -> Option<Value> {
        self.id.map(Value::Int)
    }

    fn set_pk(&mut self, value: Value) {
        self.id = value.as_int();
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("state", self.state.into()),
            ("attempts", self.attempts.into()),
            ("priority", self.priority.into()),
        ]
    }

    fn from_row(row: &Row) -> FarmResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            state: row.get("state")?,
            attempts: row.get("attempts")?,
            priority: row.get("priority")?,
        })
    }
}

impl WorkStateFields for ValidationModel {
    fn state_mut(&mut self) -> &mut Option<WorkState> {
        &mut self.state
    }

    fn attempts_mut(&mut self) -> &mut Option<i64> {
        &mut self.attempts
    }
}

impl ValidateWorkStateMixin for ValidationModel {}

impl ValidatePriorityMixin for ValidationModel {
    fn priority_mut(&mut self) -> &mut Option<i64> {
        &mut self.priority
    }
}

async fn validation_db() -> SqliteBackend {
    let db = SqliteBackend::memory().unwrap();
    create_table::<ValidationModel>(&db).await.unwrap();
    db
}

#[tokio::test]
async fn test_state_validation() {
    let db = validation_db().await;
    let mut model = ValidationModel::default();
    assert!(matches!(
        model.set_state(Value::Null),
        Err(FarmError::ValueError(_))
    ));
    assert!(matches!(model.set_state(-1), Err(FarmError::ValueError(_))));

    let state = *WorkState::ALL.choose(&mut rand::thread_rng()).unwrap();
    model.set_state(state).unwrap();
    assert_eq!(model.state, Some(state));
    commit_model(&mut model, &db).await.unwrap();

    let stored = DatabaseBackend::query_one(
        &db,
        "SELECT \"state\" FROM \"farm_validation_mixin_test\"",
        &[],
    )
    .await
    .unwrap();
    assert_eq!(stored.get::<i64>("state").unwrap(), state.code());

    let reloaded = fetch_model::<ValidationModel>(model.id.unwrap(), &db).await.unwrap();
    assert_eq!(reloaded.state, Some(state));
}

#[tokio::test]
async fn test_priority_validation() {
    let db = validation_db().await;
    let min_priority = ValidationModel::MIN_PRIORITY;
    let max_priority = ValidationModel::MAX_PRIORITY;
    let mut model = ValidationModel::default();
    for value in [min_priority - 1, max_priority + 1] {
        assert!(matches!(
            model.set_priority(value),
            Err(FarmError::ValueError(_))
        ));
    }
    model.set_priority(min_priority).unwrap();
    assert_eq!(model.priority, Some(min_priority));
    model.set_priority(max_priority).unwrap();
    assert_eq!(model.priority, Some(max_priority));
    commit_model(&mut model, &db).await.unwrap();

    let reloaded = fetch_model::<ValidationModel>(model.id.unwrap(), &db).await.unwrap();
    assert_eq!(reloaded.priority, Some(max_priority));
}

#[tokio::test]
async fn test_attempts_validation() {
    let db = validation_db().await;
    let mut model = ValidationModel::default();
    assert!(matches!(model.set_attempts(0), Err(FarmError::ValueError(_))));
    model.set_attempts(1).unwrap();
    assert_eq!(model.attempts, Some(1));
    commit_model(&mut model, &db).await.unwrap();

    let reloaded = fetch_model::<ValidationModel>(model.id.unwrap(), &db).await.unwrap();
    assert_eq!(reloaded.attempts, Some(1));
}

#[tokio::test]
async fn test_unknown_stored_state_fails_to_load() {
    let db = validation_db().await;
    db.execute(
        "INSERT INTO \"farm_validation_mixin_test\" (\"state\") VALUES (42)",
        &[],
    )
    .await
    .unwrap();
    let result = fetch_model::<ValidationModel>(1_i64, &db).await;
    assert!(matches!(result, Err(FarmError::ValueError(_))));
}

// ── Work state changes ────────────────────────────────────────────────

#[derive(Debug, Default)]
struct WorkStateChangedModel {
    id: Option<i64>,
    state: Option<WorkState>,
    attempts: Option<i64>,
    time_started: Option<NaiveDateTime>,
    time_finished: Option<NaiveDateTime>,
}

impl Model for WorkStateChangedModel {
    fn meta() -> &'static ModelMeta {
        static META: LazyLock<ModelMeta> = LazyLock::new(|| {
            ModelMeta::new(
                "state_changed",
                Settings::default().table_name("state_change_test"),
                vec![
                    FieldDef::new("id", FieldType::AutoField).primary_key(),
                    FieldDef::new("state", FieldType::WorkStateEnum),
                    FieldDef::new("attempts", FieldType::IntegerField).default(0),
                    FieldDef::new("time_started", FieldType::DateTimeField),
                    FieldDef::new("time_finished", FieldType::DateTimeField),
                ],
            )
        });
        &META
    }

    fn pk(&self) -> Option<Value> {
        self.id.map(Value::Int)
    }

    fn set_pk(&mut self, value: Value) {
        self.id = value.as_int();
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("state", self.state.into()),
            ("attempts", self.attempts.into()),
            ("time_started", self.time_started.into()),
            ("time_finished", self.time_finished.into()),
        ]
    }

    fn from_row(row: &Row) -> FarmResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            state: row.get("state")?,
            attempts: row.get("attempts")?,
            time_started: row.get("time_started")?,
            time_finished: row.get("time_finished")?,
        })
    }
}

impl WorkStateFields for WorkStateChangedModel {
    fn state_mut(&mut self) -> &mut Option<WorkState> {
        &mut self.state
    }

    fn attempts_mut(&mut self) -> &mut Option<i64> {
        &mut self.attempts
    }
}

impl WorkStateChangedMixin for WorkStateChangedModel {
    fn time_started_mut(&mut self) -> &mut Option<NaiveDateTime> {
        &mut self.time_started
    }

    fn time_finished_mut(&mut self) -> &mut Option<NaiveDateTime> {
        &mut self.time_finished
    }
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

async fn pause() {
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
}

#[tokio::test]
async fn test_state_changed_event() {
    let db = SqliteBackend::memory().unwrap();
    create_table::<WorkStateChangedModel>(&db).await.unwrap();

    let representations: [(Value, Value); 3] = [
        (WorkState::Running.into(), WorkState::Done.into()),
        (Value::from("running"), Value::from("done")),
        (Value::Int(104), Value::Int(105)),
    ];
    for (running, done) in representations {
        let mut model = WorkStateChangedModel::default();
        assert!(model.time_started.is_none());
        assert!(model.time_finished.is_none());

        model.change_state(running.clone()).unwrap();
        assert_eq!(model.state, Some(WorkState::Running));
        assert_eq!(model.attempts, Some(1));
        assert!(model.time_started.unwrap() <= now());
        let first_started = model.time_started;
        assert!(model.time_finished.is_none());

        pause().await;
        model.change_state(done.clone()).unwrap();
        assert!(model.time_finished.unwrap() <= now());
        let first_finished = model.time_finished;

        pause().await;
        model.change_state(running).unwrap();
        assert_eq!(model.state, Some(WorkState::Running));
        assert!(model.time_finished.is_none());
        assert_ne!(model.time_started, first_started);
        assert_eq!(model.attempts, Some(2));

        pause().await;
        model.change_state(done).unwrap();
        assert_ne!(model.time_finished, first_finished);
        assert!(model.time_finished.unwrap() <= now());
        commit_model(&mut model, &db).await.unwrap();

        let reloaded = fetch_model::<WorkStateChangedModel>(model.id.unwrap(), &db)
            .await
            .unwrap();
        assert_eq!(reloaded.state, Some(WorkState::Done));
        assert_eq!(reloaded.attempts, Some(2));
        assert_eq!(reloaded.time_started, model.time_started);
        assert_eq!(reloaded.time_finished, model.time_finished);
    }
}

#[tokio::test]
async fn test_attempts_default_when_never_run() {
    let db = SqliteBackend::memory().unwrap();
    create_table::<WorkStateChangedModel>(&db).await.unwrap();

    let mut model = WorkStateChangedModel::default();
    model.change_state(WorkState::Queued).unwrap();
    commit_model(&mut model, &db).await.unwrap();

    let reloaded = fetch_model::<WorkStateChangedModel>(model.id.unwrap(), &db)
        .await
        .unwrap();
    assert_eq!(reloaded.state, Some(WorkState::Queued));
    assert_eq!(reloaded.attempts, Some(0));
    assert!(reloaded.time_started.is_none());
}
