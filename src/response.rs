use serde_json::Value;

use crate::error::TransportError;

/// Decoded body of a `/create_game` reply.
#[derive(Debug, Clone, PartialEq)]
pub enum GameResponse {
    /// The server built a game from the description.
    Created {
        game_params: Value,
        message: Option<String>,
    },
    /// The server reported an error for this description.
    Rejected { message: String },
}

impl GameResponse {
    /// Interpret a parsed JSON body.
    ///
    /// A truthy `error` field wins over everything else. Any other object is a
    /// success, with a missing `game_params` rendered as `null`. A bare `null`
    /// body has no fields to probe and is treated as a decode failure.
    pub fn from_value(body: Value) -> Result<Self, TransportError> {
        match body {
            Value::Null => Err(TransportError::Decode(
                "response body is null".to_string(),
            )),
            Value::Object(mut fields) => {
                if let Some(error) = fields.remove("error").filter(is_truthy) {
                    return Ok(GameResponse::Rejected {
                        message: error_text(error),
                    });
                }
                let message = fields
                    .remove("message")
                    .and_then(|m| m.as_str().map(str::to_string));
                // Absent params show as `null` rather than an empty panel.
                Ok(GameResponse::Created {
                    game_params: fields.remove("game_params").unwrap_or(Value::Null),
                    message,
                })
            }
            // Scalars and arrays carry no `error` field.
            _ => Ok(GameResponse::Created {
                game_params: Value::Null,
                message: None,
            }),
        }
    }

    #[allow(dead_code)]
    pub fn is_created(&self) -> bool {
        matches!(self, GameResponse::Created { .. })
    }
}

/// Pretty-print game parameters the way the result panel shows them.
pub fn pretty_params(params: &Value) -> String {
    serde_json::to_string_pretty(params).unwrap_or_else(|_| params.to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn error_text(error: Value) -> String {
    match error {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_field_is_rejection() {
        let decoded = GameResponse::from_value(json!({"error": "bad input"})).unwrap();
        assert_eq!(
            decoded,
            GameResponse::Rejected {
                message: "bad input".to_string()
            }
        );
    }

    #[test]
    fn test_game_params_is_creation() {
        let decoded = GameResponse::from_value(json!({
            "success": true,
            "message": "Game created! Check the game window.",
            "game_params": {"a": 1}
        }))
        .unwrap();
        assert_eq!(
            decoded,
            GameResponse::Created {
                game_params: json!({"a": 1}),
                message: Some("Game created! Check the game window.".to_string()),
            }
        );
    }

    #[test]
    fn test_falsy_error_field_is_ignored() {
        for falsy in [json!(""), json!(null), json!(false), json!(0)] {
            let decoded =
                GameResponse::from_value(json!({"error": falsy, "game_params": [1, 2]})).unwrap();
            assert!(decoded.is_created());
        }
    }

    #[test]
    fn test_non_string_error_uses_json_text() {
        let decoded = GameResponse::from_value(json!({"error": 42})).unwrap();
        assert_eq!(
            decoded,
            GameResponse::Rejected {
                message: "42".to_string()
            }
        );
    }

    #[test]
    fn test_missing_params_render_null() {
        let decoded = GameResponse::from_value(json!({})).unwrap();
        match decoded {
            GameResponse::Created { game_params, .. } => {
                assert_eq!(pretty_params(&game_params), "null");
            }
            _ => panic!("Wrong response type"),
        }
    }

    #[test]
    fn test_null_body_is_decode_error() {
        let err = GameResponse::from_value(Value::Null).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn test_pretty_params_two_space_indent() {
        assert_eq!(pretty_params(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }
}
