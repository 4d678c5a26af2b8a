use serde_json::Value;

/// Whether every property of `subset` is found in `superset` with the same
/// value. Nested objects and arrays are compared the same way, recursively,
/// so the superset may carry more keys at every level.
pub fn is_subset(superset: &Value, subset: &Value) -> bool {
    match subset {
        Value::Object(required) => {
            let Value::Object(actual) = superset else {
                return false;
            };
            required.iter().all(|(key, value)| {
                actual
                    .get(key)
                    .is_some_and(|candidate| is_subset(candidate, value))
            })
        }
        Value::Array(required) => {
            let Value::Array(actual) = superset else {
                return false;
            };
            required.iter().enumerate().all(|(i, value)| {
                actual
                    .get(i)
                    .is_some_and(|candidate| is_subset(candidate, value))
            })
        }
        scalar => scalar == superset,
    }
}
