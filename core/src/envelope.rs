//! Parsing of the `{code, message, data}` response envelope.

use serde_json::{Map, Value};

use crate::error::ApiError;

/// The decoded response envelope. `data` is opaque here and handed back to
/// the caller unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub code: i64,
    pub message: String,
    pub data: Value,
}

impl Envelope {
    /// Decode a body. A body that is not JSON at all is a transport problem;
    /// JSON without the envelope shape is a malformed response.
    pub fn parse(body: &str) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ApiError::transport_with_source("response body is not JSON", e))?;
        Self::from_value(value)
    }

    /// Validate an already decoded JSON value. `data` must be present, even
    /// when it is `null`.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let Value::Object(mut object) = value else {
            return Err(ApiError::MalformedResponse(
                "envelope is not a JSON object".to_string(),
            ));
        };
        let code = take(&mut object, "code")?
            .as_i64()
            .ok_or_else(|| ApiError::MalformedResponse("`code` is not an integer".to_string()))?;
        let message = match take(&mut object, "message")? {
            Value::String(s) => s,
            _ => {
                return Err(ApiError::MalformedResponse(
                    "`message` is not a string".to_string(),
                ))
            }
        };
        let data = take(&mut object, "data")?;
        Ok(Self { code, message, data })
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// `data` on success, otherwise the classified error.
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::from_code(self.code, self.message))
        }
    }
}

fn take(object: &mut Map<String, Value>, key: &str) -> Result<Value, ApiError> {
    object
        .remove(key)
        .ok_or_else(|| ApiError::MalformedResponse(format!("envelope has no `{key}`")))
}

/// Parse a body straight to its result.
pub fn parse(body: &str) -> Result<Value, ApiError> {
    Envelope::parse(body)?.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_returns_data() {
        let data = parse(r#"{"code":0,"message":"ok","data":{"groupID":"g.abc"}}"#).unwrap();
        assert_eq!(data, json!({"groupID": "g.abc"}));
    }

    #[test]
    fn success_with_null_data() {
        let data = parse(r#"{"code":0,"message":"ok","data":null}"#).unwrap();
        assert!(data.is_null());
    }

    #[test]
    fn scalar_data_is_returned_as_is() {
        let data = parse(r#"{"code":0,"message":"ok","data":"Z:1>5$hello"}"#).unwrap();
        assert_eq!(data, json!("Z:1>5$hello"));
    }

    #[test]
    fn object_order_is_preserved() {
        let data = parse(r#"{"code":0,"message":"ok","data":{"z":1,"a":2,"m":3}}"#).unwrap();
        let keys: Vec<&String> = data.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn code_one_is_invalid_parameters() {
        let err = parse(r#"{"code":1,"message":"bad padID","data":null}"#).unwrap_err();
        assert!(matches!(&err, ApiError::InvalidParameters(m) if m == "bad padID"));
    }

    #[test]
    fn other_codes_classify() {
        let err = parse(r#"{"code":2,"message":"internal error","data":null}"#).unwrap_err();
        assert!(matches!(err, ApiError::InternalError(_)));
        let err = parse(r#"{"code":3,"message":"no such function","data":null}"#).unwrap_err();
        assert!(matches!(&err, ApiError::UnknownOperation(m) if m == "no such function"));
        let err = parse(r#"{"code":4,"message":"no or wrong API Key","data":null}"#).unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));
    }

    #[test]
    fn missing_data_key_is_malformed() {
        let err = parse(r#"{"code":0,"message":"ok"}"#).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn wrong_types_are_malformed() {
        for body in [
            r#"{"code":"0","message":"ok","data":null}"#,
            r#"{"code":0.5,"message":"ok","data":null}"#,
            r#"{"code":0,"message":null,"data":null}"#,
            r#"[0,"ok",null]"#,
            r#""ok""#,
        ] {
            let err = parse(body).unwrap_err();
            assert!(matches!(err, ApiError::MalformedResponse(_)), "{body}");
        }
    }

    #[test]
    fn non_json_is_transport_error() {
        let err = parse("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }

    #[test]
    fn extra_keys_are_ignored() {
        let env = Envelope::parse(r#"{"code":0,"message":"ok","data":1,"extra":true}"#).unwrap();
        assert_eq!(env.data, json!(1));
        assert!(env.is_success());
    }
}
