use serde::{Deserialize, Deserializer};

pub fn first_page() -> i64 {
    1
}

// `?page=abc` behaves like a missing page instead of rejecting the request
pub fn deserialize_lenient_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or_else(first_page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct PageQuery {
        #[serde(default = "first_page", deserialize_with = "deserialize_lenient_page")]
        page: i64,
    }

    fn parse(query: serde_json::Value) -> i64 {
        serde_json::from_value::<PageQuery>(query).unwrap().page
    }

    #[test]
    fn page_parsing() {
        assert_eq!(parse(json!({})), 1);
        assert_eq!(parse(json!({"page": "3"})), 3);
        assert_eq!(parse(json!({"page": "abc"})), 1);
        assert_eq!(parse(json!({"page": "-2"})), -2);
    }
}
