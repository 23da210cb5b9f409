//! Integration tests for the custom column types.
//!
//! Each test commits models holding IPv4 addresses or JSON documents to an
//! in-memory SQLite database, reloads them by primary key, and compares the
//! reloaded value to what was stored.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;

use farm_core::{FarmError, FarmResult, Settings};
use farm_db::column_types::{ColumnType, Ipv4AddressType, JsonDict, JsonList};
use farm_db::executor::{commit_model, create_table, fetch_model};
use farm_db::fields::{FieldDef, FieldType};
use farm_db::model::{Model, ModelMeta};
use farm_db::row::Row;
use farm_db::value::Value;
use farm_db_backends::{DatabaseBackend, SqliteBackend};
use rand::Rng;
use serde::Serialize;

// ── Test models ───────────────────────────────────────────────────────

fn table(name: &str) -> String {
    Settings::default().table_name(name)
}

fn data_model_meta(model_name: &'static str, table_name: &str, field_type: FieldType) -> ModelMeta {
    ModelMeta::new(
        model_name,
        table(table_name),
        vec![
            FieldDef::new("id", FieldType::AutoField).primary_key(),
            FieldDef::new("data", field_type),
        ],
    )
}

/// Declares a model with an autoincrement `id` and one `data` column.
macro_rules! data_model {
    ($name:ident, $model_name:literal, $table:literal, $field_type:expr) => {
        #[derive(Debug, Clone)]
        struct $name {
            id: Option<i64>,
            data: Value,
        }

        impl $name {
            fn new(data: impl Into<Value>) -> Self {
                Self {
                    id: None,
                    data: data.into(),
                }
            }
        }

        impl Model for $name {
            fn meta() -> &'static ModelMeta {
                static META: LazyLock<ModelMeta> =
                    LazyLock::new(|| data_model_meta($model_name, $table, $field_type));
                &META
            }

            fn pk(&self) -> Option<Value> {
                self.id.map(Value::Int)
            }

            fn set_pk(&mut self, value: Value) {
                self.id = value.as_int();
            }

            fn field_values(&self) -> Vec<(&'static str, Value)> {
                vec![("id", self.id.into()), ("data", self.data.clone())]
            }

            fn from_row(row: &Row) -> FarmResult<Self> {
                Ok(Self {
                    id: row.get("id")?,
                    data: row.get("data")?,
                })
            }
        }
    };
}

data_model!(JsonDictModel, "jsondict", "jsondict_model_test", FieldType::JsonDict);
data_model!(JsonListModel, "jsonlist", "jsonlist_model_test", FieldType::JsonList);
data_model!(
    Ipv4AddressModel,
    "ipv4address",
    "ipaddress_model_test",
    FieldType::Ipv4Address
);

async fn database<M: Model>() -> SqliteBackend {
    let db = SqliteBackend::memory().unwrap();
    create_table::<M>(&db).await.unwrap();
    db
}

/// Commits `model`, then reloads it by primary key.
async fn round_trip<M: Model>(db: &SqliteBackend, model: &mut M) -> M {
    commit_model(model, db).await.unwrap();
    let pk = model.pk().expect("committed model has a primary key");
    fetch_model::<M>(pk, db).await.unwrap()
}

async fn row_count<M: Model>(db: &SqliteBackend) -> i64 {
    let sql = format!("SELECT COUNT(*) AS n FROM \"{}\"", M::table_name());
    DatabaseBackend::query_one(db, &sql, &[])
        .await
        .unwrap()
        .get("n")
        .unwrap()
}

fn random_hex(rng: &mut impl Rng) -> String {
    let mut bytes = vec![0_u8; 1024];
    rng.fill(&mut bytes[..]);
    hex::encode(bytes)
}

fn random_list(rng: &mut impl Rng) -> serde_json::Value {
    serde_json::json!([random_hex(rng), -1024, 1024, true, null])
}

fn assert_statement_error(err: &FarmError, table_name: &str) {
    match err {
        FarmError::StatementError { table, column, source } => {
            assert_eq!(table, table_name);
            assert_eq!(column, "data");
            assert!(matches!(**source, FarmError::TypeError(_)));
        }
        other => panic!("expected StatementError, got {other:?}"),
    }
}

// ── IPv4 address ──────────────────────────────────────────────────────

const ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);

#[test]
fn test_ipv4_implementation() {
    assert_eq!(Ipv4AddressType::IMPL, FieldType::BigIntegerField);
    assert_eq!(Ipv4AddressType.storage(), FieldType::BigIntegerField);
    assert_eq!(Ipv4AddressType::MAX_INT, 4_294_967_295);

    assert!(matches!(
        Ipv4AddressType::check_integer(-1),
        Err(FarmError::ValueError(_))
    ));
    assert!(matches!(
        Ipv4AddressType::check_integer(Ipv4AddressType::MAX_INT + 1),
        Err(FarmError::ValueError(_))
    ));
    assert_eq!(
        Ipv4AddressType::check_integer(Ipv4AddressType::MAX_INT).unwrap(),
        u32::MAX
    );
}

#[tokio::test]
async fn test_ipv4_insert_int() {
    let db = database::<Ipv4AddressModel>().await;
    let ipvalue = i64::from(u32::from(ADDR));
    let mut model = Ipv4AddressModel::new(ipvalue);
    assert_eq!(model.data, Value::Int(ipvalue));

    let result = round_trip(&db, &mut model).await;
    assert_ne!(result.id, None);
    assert_eq!(result.data, Value::Ip(IpAddr::V4(ADDR)));
    assert_eq!(result.data.as_ip(), Some(IpAddr::V4(ADDR)));
}

#[tokio::test]
async fn test_ipv4_insert_string() {
    let db = database::<Ipv4AddressModel>().await;
    let mut model = Ipv4AddressModel::new("192.168.1.1");
    assert_eq!(model.data, Value::from("192.168.1.1"));

    let result = round_trip(&db, &mut model).await;
    assert!(matches!(result.data, Value::Ip(IpAddr::V4(_))));
    assert_eq!(result.data.to_string(), "192.168.1.1");
}

#[tokio::test]
async fn test_ipv4_insert_address() {
    let db = database::<Ipv4AddressModel>().await;
    let mut model = Ipv4AddressModel::new(ADDR);
    assert_eq!(model.data, Value::from(ADDR));

    let result = round_trip(&db, &mut model).await;
    assert_eq!(result.data, model.data);
}

#[tokio::test]
async fn test_ipv4_stored_as_integer() {
    let db = database::<Ipv4AddressModel>().await;
    let mut model = Ipv4AddressModel::new(Ipv4Addr::BROADCAST);
    commit_model(&mut model, &db).await.unwrap();

    let sql = format!(
        "SELECT data FROM \"{}\" WHERE id = ?",
        Ipv4AddressModel::table_name()
    );
    let row = DatabaseBackend::query_one(&db, &sql, &[model.pk().unwrap()])
        .await
        .unwrap();
    assert_eq!(row.get::<i64>("data").unwrap(), Ipv4AddressType::MAX_INT);
}

#[tokio::test]
async fn test_ipv4_null() {
    let db = database::<Ipv4AddressModel>().await;
    let mut model = Ipv4AddressModel::new(Value::Null);
    let result = round_trip(&db, &mut model).await;
    assert_eq!(result.data, Value::Null);
}

#[tokio::test]
async fn test_ipv4_out_of_range_fails_at_commit() {
    let db = database::<Ipv4AddressModel>().await;
    for bad in [Value::Int(-1), Value::Int(Ipv4AddressType::MAX_INT + 1), Value::from("1.2.3")] {
        let mut model = Ipv4AddressModel::new(bad);
        let err = commit_model(&mut model, &db).await.unwrap_err();
        assert!(matches!(
            err.statement_source(),
            Some(FarmError::ValueError(_))
        ));
        assert!(model.id.is_none());
    }
    assert_eq!(row_count::<Ipv4AddressModel>(&db).await, 0);
}

// ── JSON dict ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Nested {
    str: String,
    #[serde(rename = "true")]
    yes: bool,
    #[serde(rename = "false")]
    no: bool,
    int: i32,
    list: serde_json::Value,
}

#[derive(Serialize)]
struct Payload {
    str: String,
    int: i32,
    list: serde_json::Value,
    bool: bool,
    none: Option<String>,
    dict: Nested,
}

fn random_payload(rng: &mut impl Rng) -> Payload {
    Payload {
        str: random_hex(rng),
        int: rng.gen_range(-1024..=1024),
        list: random_list(rng),
        bool: rng.gen(),
        none: None,
        dict: Nested {
            str: random_hex(rng),
            yes: true,
            no: false,
            int: rng.gen_range(-1024..=1024),
            list: random_list(rng),
        },
    }
}

/// Builds the payload through each mapping type a dict column accepts.
fn dict_inputs(payload: &Payload) -> Vec<JsonDict> {
    let doc = serde_json::to_value(payload).unwrap();
    let map = doc.as_object().unwrap().clone();
    let btree: BTreeMap<String, serde_json::Value> = map.clone().into_iter().collect();
    let hash: HashMap<String, serde_json::Value> = map.clone().into_iter().collect();
    vec![
        JsonDict::from(map),
        JsonDict::from_serializable(&btree).unwrap(),
        JsonDict::from_serializable(&hash).unwrap(),
        JsonDict::from_serializable(payload).unwrap(),
        JsonDict::try_from(doc).unwrap(),
    ]
}

#[tokio::test]
async fn test_dict() {
    let db = database::<JsonDictModel>().await;
    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        let payload = random_payload(&mut rng);
        for test_data in dict_inputs(&payload) {
            let mut model = JsonDictModel::new(test_data.clone());
            assert!(matches!(
                model.data,
                Value::Json(serde_json::Value::Object(_))
            ));

            let result = round_trip(&db, &mut model).await;
            assert_eq!(result.id, model.id);
            let loaded: JsonDict = farm_db::FromValue::from_value(&result.data).unwrap();
            assert_eq!(loaded, test_data);
            assert_eq!(result.data, model.data);
        }
    }
}

#[tokio::test]
async fn test_dict_empty() {
    let db = database::<JsonDictModel>().await;
    let mut model = JsonDictModel::new(JsonDict::new());
    let result = round_trip(&db, &mut model).await;
    assert_eq!(result.data, Value::Json(serde_json::json!({})));
}

#[tokio::test]
async fn test_dict_error() {
    let db = database::<JsonDictModel>().await;
    let mut model = JsonDictModel::new(JsonList::new());
    let err = commit_model(&mut model, &db).await.unwrap_err();
    assert_statement_error(&err, JsonDictModel::table_name());
    assert!(model.id.is_none());
    assert_eq!(row_count::<JsonDictModel>(&db).await, 0);
}

#[tokio::test]
async fn test_dict_rejects_scalars() {
    let db = database::<JsonDictModel>().await;
    for bad in [Value::from("{}"), Value::Int(1), Value::Json(serde_json::json!(true))] {
        let mut model = JsonDictModel::new(bad);
        let err = commit_model(&mut model, &db).await.unwrap_err();
        assert_statement_error(&err, JsonDictModel::table_name());
    }
}

// ── JSON list ─────────────────────────────────────────────────────────

/// Builds the list through each sequence type a list column accepts.
fn list_inputs(rng: &mut impl Rng) -> Vec<JsonList> {
    let hex = random_hex(rng);
    let items = vec![
        serde_json::json!(hex.clone()),
        serde_json::json!(-1024),
        serde_json::json!(1024),
        serde_json::json!(true),
        serde_json::Value::Null,
    ];
    let deque: VecDeque<serde_json::Value> = items.iter().cloned().collect();
    let array: [serde_json::Value; 5] = [
        items[0].clone(),
        items[1].clone(),
        items[2].clone(),
        items[3].clone(),
        items[4].clone(),
    ];
    let tuple = (hex, -1024, 1024, true, None::<i32>);
    vec![
        JsonList::from(items.clone()),
        items.iter().cloned().collect(),
        JsonList::from_serializable(&deque).unwrap(),
        JsonList::from_serializable(&array).unwrap(),
        JsonList::from_serializable(&tuple).unwrap(),
    ]
}

#[tokio::test]
async fn test_list() {
    let db = database::<JsonListModel>().await;
    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        for test_data in list_inputs(&mut rng) {
            let mut model = JsonListModel::new(test_data.clone());
            assert!(matches!(
                model.data,
                Value::Json(serde_json::Value::Array(_))
            ));

            let result = round_trip(&db, &mut model).await;
            let loaded: JsonList = farm_db::FromValue::from_value(&result.data).unwrap();
            assert_eq!(loaded, test_data);
            assert_eq!(loaded.len(), 5);
        }
    }
}

#[tokio::test]
async fn test_list_nested() {
    let db = database::<JsonListModel>().await;
    let doc = serde_json::json!([{"a": [1, {"b": null}]}, [], [[-1]], "x"]);
    let mut model = JsonListModel::new(doc.clone());
    let result = round_trip(&db, &mut model).await;
    assert_eq!(result.data, Value::Json(doc));
}

#[tokio::test]
async fn test_list_error() {
    let db = database::<JsonListModel>().await;
    let mut model = JsonListModel::new(JsonDict::new());
    let err = commit_model(&mut model, &db).await.unwrap_err();
    assert_statement_error(&err, JsonListModel::table_name());
    assert!(model.id.is_none());
    assert_eq!(row_count::<JsonListModel>(&db).await, 0);
}

#[tokio::test]
async fn test_update_rebinds_values() {
    let db = database::<JsonListModel>().await;
    let mut model = JsonListModel::new(serde_json::json!([1]));
    commit_model(&mut model, &db).await.unwrap();
    let pk = model.id;

    model.data = serde_json::json!([1, 2]).into();
    commit_model(&mut model, &db).await.unwrap();
    assert_eq!(model.id, pk);

    model.data = JsonDict::new().into();
    let err = commit_model(&mut model, &db).await.unwrap_err();
    assert!(err.statement_source().is_some_and(FarmError::is_conversion_error));

    let result = fetch_model::<JsonListModel>(pk.unwrap(), &db).await.unwrap();
    assert_eq!(result.data, Value::Json(serde_json::json!([1, 2])));
    assert_eq!(row_count::<JsonListModel>(&db).await, 1);
}

#[tokio::test]
async fn test_corrupt_stored_text() {
    let db = database::<JsonDictModel>().await;
    let sql = format!(
        "INSERT INTO \"{}\" (data) VALUES (?)",
        JsonDictModel::table_name()
    );
    db.execute(&sql, &[Value::from("{not json")]).await.unwrap();
    let err = fetch_model::<JsonDictModel>(1_i64, &db).await.unwrap_err();
    assert!(matches!(err, FarmError::SerializationError(_)));
}
