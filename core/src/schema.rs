//! Structured-output schema submitted to the API to constrain the shape of
//! the analysis response.

use serde_json::{json, Value};

use crate::types::OptionalColumns;

/// Builds the response schema for the analysis mode: an array of objects
/// with five mandatory string properties, plus `replacedBy` and/or
/// `sources` when the corresponding column flags are set. No property is
/// ever omitted once requested and none is added beyond the request.
pub fn analysis_response_schema(columns: &OptionalColumns) -> Value {
    let mut properties = json!({
        "requestedDesignation": {
            "type": "STRING",
            "description": "Обозначение стандарта, как его запросил пользователь."
        },
        "exists": {
            "type": "STRING",
            "description": "Существует ли стандарт (\"Да\" или \"Нет\")."
        },
        "fullName": {
            "type": "STRING",
            "description": "Полное официальное наименование стандарта."
        },
        "status": {
            "type": "STRING",
            "description": "Текущий статус (Действующий, Отменен, Заменен и т.д.)."
        },
        "aiNote": {
            "type": "STRING",
            "description": "Краткое примечание от ИИ по стандарту (до 100 символов)."
        }
    });

    let map = properties.as_object_mut().expect("object literal");
    if columns.replaced_by {
        map.insert(
            "replacedBy".to_string(),
            json!({
                "type": "STRING",
                "description": "Обозначение стандарта, на который был произведен замен."
            }),
        );
    }
    if columns.sources {
        map.insert(
            "sources".to_string(),
            json!({
                "type": "ARRAY",
                "description": "Список URL-адресов или названий документов, подтверждающих информацию.",
                "items": { "type": "STRING" }
            }),
        );
    }

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const MANDATORY: [&str; 5] = [
        "requestedDesignation",
        "exists",
        "fullName",
        "status",
        "aiNote",
    ];

    fn property_names(schema: &Value) -> BTreeSet<String> {
        schema["items"]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect()
    }

    fn expected(extra: &[&str]) -> BTreeSet<String> {
        MANDATORY
            .iter()
            .chain(extra)
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_schema_shape_is_array_of_object() {
        let schema = analysis_response_schema(&OptionalColumns::default());
        assert_eq!(schema["type"], "ARRAY");
        assert_eq!(schema["items"]["type"], "OBJECT");
    }

    #[test]
    fn test_property_set_matches_requested_columns() {
        let combos = [
            (false, false, vec![]),
            (true, false, vec!["replacedBy"]),
            (false, true, vec!["sources"]),
            (true, true, vec!["replacedBy", "sources"]),
        ];
        for (replaced_by, sources, extra) in combos {
            let schema = analysis_response_schema(&OptionalColumns {
                replaced_by,
                sources,
            });
            assert_eq!(
                property_names(&schema),
                expected(&extra),
                "combo replacedBy={} sources={}",
                replaced_by,
                sources
            );
        }
    }

    #[test]
    fn test_sources_is_array_of_string() {
        let schema = analysis_response_schema(&OptionalColumns {
            replaced_by: false,
            sources: true,
        });
        let sources = &schema["items"]["properties"]["sources"];
        assert_eq!(sources["type"], "ARRAY");
        assert_eq!(sources["items"]["type"], "STRING");
    }

    #[test]
    fn test_mandatory_properties_are_strings() {
        let schema = analysis_response_schema(&OptionalColumns::default());
        for name in MANDATORY {
            assert_eq!(
                schema["items"]["properties"][name]["type"], "STRING",
                "property {}",
                name
            );
        }
    }
}
