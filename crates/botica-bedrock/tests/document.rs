use aws_smithy_types::{Document, Number};
use botica_bedrock::document::{to_document, to_json};
use botica_bedrock::schema::medical_response_schema;
use serde_json::json;

#[test]
fn numbers_keep_their_kind() {
    assert_eq!(to_document(&json!(8)), Document::Number(Number::PosInt(8)));
    assert_eq!(to_document(&json!(-3)), Document::Number(Number::NegInt(-3)));
    assert_eq!(to_document(&json!(2.5)), Document::Number(Number::Float(2.5)));
}

#[test]
fn schema_survives_document_conversion() {
    let schema = medical_response_schema();
    assert_eq!(to_json(&to_document(&schema)), schema);
}

#[test]
fn non_finite_float_becomes_null() {
    let doc = Document::Number(Number::Float(f64::NAN));
    assert_eq!(to_json(&doc), serde_json::Value::Null);
}
