use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One decoded input record. All fields are optional so that missing fields
/// surface as validation failures rather than decode failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "actor")]
    pub source: Option<String>,
    pub target: Option<String>,
    pub created_time: Option<String>,
}

impl RawRecord {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        created_time: impl Into<String>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
            created_time: Some(created_time.into()),
        }
    }

    /// Decodes one line-delimited JSON object. Unknown fields are ignored.
    /// Anything other than an object (arrays included) is an error.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_str(line)?;
        serde_json::from_value(Value::Object(map))
    }
}
