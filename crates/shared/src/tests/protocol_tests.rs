use super::*;
use crate::error::{ValidationErrors, ValidationResult};

#[test]
fn create_payload_without_id_or_price_deserializes() {
    let view: ProductViewModel =
        serde_json::from_str(r#"{ "name": "Widget" }"#).expect("json");
    assert_eq!(view.id, None);
    assert_eq!(view.name, "Widget");
    assert_eq!(view.price, None);
}

#[test]
fn entity_id_serializes_as_bare_uuid_string() {
    let id = EntityId::new();
    let view = ProductViewModel {
        id: Some(id),
        name: "Widget".into(),
        description: None,
        price: Some(9.5),
    };
    let value = serde_json::to_value(&view).expect("json");
    assert_eq!(value["id"], serde_json::Value::String(id.to_string()));
    assert!(value.get("description").is_none());
}

#[test]
fn entity_id_parses_from_display_form() {
    let id = EntityId::new();
    let parsed: EntityId = id.to_string().parse().expect("uuid");
    assert_eq!(parsed, id);
    assert!("not-a-uuid".parse::<EntityId>().is_err());
}

#[test]
fn validation_errors_body_keeps_rule_order() {
    let mut result = ValidationResult::valid();
    assert!(result.is_valid());
    result.push("name", "required");
    result.push("price", "required");
    assert!(!result.is_valid());

    let body = serde_json::to_value(ValidationErrors::from(result)).expect("json");
    assert_eq!(
        body,
        serde_json::json!({
            "errors": [
                { "field": "name", "message": "required" },
                { "field": "price", "message": "required" }
            ]
        })
    );
}
