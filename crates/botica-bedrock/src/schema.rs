//! Machine-readable description of the MedicalResponse shape.
//!
//! Sent to the provider as the forced tool's input schema and embedded in
//! the prompt text. The provider-side check is only a first line of defence;
//! every response is still decoded by
//! [`botica_core::validation::validate_medical_response`].

use serde_json::{Value, json};

/// Name of the single tool the model is forced to call.
pub const RESPONSE_TOOL_NAME: &str = "registrar_recomendacion";

pub fn medical_response_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["recommendations", "reason"],
        "properties": {
            "recommendations": {
                "type": "array",
                "items": recommendation_schema()
            },
            "reason": {
                "type": ["string", "null"],
                "description": "Motivo de derivación. Solo cuando recommendations está vacío."
            }
        }
    })
}

fn recommendation_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "medication", "form", "via", "amount_value", "amount_unit",
            "every_hour", "duration_days", "moment", "instructions", "warnings"
        ],
        "properties": {
            "medication": { "type": "string", "description": "Solo el principio activo." },
            "form": { "type": "string", "description": "Forma farmacéutica." },
            "via": { "type": "string", "description": "Vía de administración." },
            "amount_value": { "type": "number", "exclusiveMinimum": 0 },
            "amount_unit": { "type": "string" },
            "every_hour": { "type": "integer", "minimum": 0 },
            "duration_days": { "type": "integer", "minimum": 0 },
            "moment": { "type": "string" },
            "instructions": { "type": "string" },
            "warnings": { "type": "array", "items": { "type": "string" } }
        }
    })
}
