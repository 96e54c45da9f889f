// Converts core adapter types into MongoDB BSON documents and back.
//
// The `id` field travels as `_id` inside MongoDB; the rename happens here so
// nothing outside this crate ever sees `_id`.

use mongodb::bson::{doc, Bson, Document};

use notekeep_core::db::adapter::{Sort, SortDirection, Where};

fn mongo_field(field: &str) -> &str {
    if field == "id" {
        "_id"
    } else {
        field
    }
}

/// Convert equality filters to a MongoDB filter document.
pub fn build_filter(filters: &[Where]) -> Document {
    let mut filter = Document::new();
    for w in filters {
        filter.insert(mongo_field(&w.field), json_to_bson(&w.value));
    }
    filter
}

pub fn build_sort(sort: &Sort) -> Document {
    let direction = match sort.direction {
        SortDirection::Asc => 1,
        SortDirection::Desc => -1,
    };
    doc! { mongo_field(&sort.field): direction }
}

pub fn json_to_bson(v: &serde_json::Value) -> Bson {
    match v {
        serde_json::Value::Null => Bson::Null,
        serde_json::Value::Bool(b) => Bson::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Bson::Double(f)
            } else {
                Bson::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Bson::String(s.clone()),
        serde_json::Value::Array(arr) => Bson::Array(arr.iter().map(json_to_bson).collect()),
        serde_json::Value::Object(map) => {
            let mut document = Document::new();
            for (k, v) in map {
                document.insert(k.clone(), json_to_bson(v));
            }
            Bson::Document(document)
        }
    }
}

pub fn bson_to_json(b: &Bson) -> serde_json::Value {
    match b {
        Bson::Null => serde_json::Value::Null,
        Bson::Boolean(b) => serde_json::json!(*b),
        Bson::Int32(i) => serde_json::json!(*i),
        Bson::Int64(i) => serde_json::json!(*i),
        Bson::Double(f) => serde_json::json!(*f),
        Bson::String(s) => serde_json::json!(s),
        Bson::ObjectId(oid) => serde_json::json!(oid.to_hex()),
        Bson::Array(arr) => serde_json::Value::Array(arr.iter().map(bson_to_json).collect()),
        Bson::Document(document) => doc_to_json(document),
        Bson::DateTime(dt) => serde_json::json!(dt.timestamp_millis()),
        _ => serde_json::Value::Null,
    }
}

/// Convert a MongoDB document to a JSON document, renaming `_id` to `id`.
pub fn doc_to_json(document: &Document) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (k, v) in document {
        let key = if k == "_id" { "id".to_string() } else { k.clone() };
        map.insert(key, bson_to_json(v));
    }
    serde_json::Value::Object(map)
}

/// Convert a JSON document to a MongoDB insert document, renaming `id` to
/// `_id`.
pub fn build_insert_doc(data: &serde_json::Value) -> Document {
    let mut document = Document::new();
    if let Some(obj) = data.as_object() {
        for (k, v) in obj {
            document.insert(mongo_field(k), json_to_bson(v));
        }
    }
    document
}
