//! Key/value state kept between screen runs
//!
//! Updates merge into the existing values instead of replacing the whole map.

use std::collections::BTreeMap;

use toml::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    values: BTreeMap<String, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_integer)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Merge `update` into the state; keys not in `update` are kept.
    pub fn merge<I, K, V>(&mut self, update: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in update {
            self.set(key, value);
        }
    }

}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for State {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = State::new();
        state.merge(iter);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_other_keys() {
        let mut state: State = [("user_input", "hello")].into_iter().collect();
        state.merge([("run", 1i64)]);
        assert_eq!(state.get_str("user_input"), Some("hello"));
        assert_eq!(state.get_int("run"), Some(1));

        state.merge([("run", 2i64)]);
        assert_eq!(state.get_int("run"), Some(2));
        let expected: State = [("user_input", Value::from("hello")), ("run", Value::from(2i64))]
            .into_iter()
            .collect();
        assert_eq!(state, expected);
    }

    #[test]
    fn test_missing_and_mistyped() {
        let mut state = State::new();
        assert_eq!(state, State::default());
        state.set("flag", true);
        assert_eq!(state.get_str("flag"), None);
        assert_eq!(state.get_int("nope"), None);
        assert_eq!(state.get("flag"), Some(&Value::Boolean(true)));
    }
}
