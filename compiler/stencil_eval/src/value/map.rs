//! Insertion-ordered string-keyed map.

use rustc_hash::FxHashMap;

use super::Value;

/// Map from string keys to values that remembers insertion order.
///
/// Hash literals, `for` loops over maps and printing all follow the order
/// keys were first inserted, so output is deterministic.
#[derive(Clone, Debug, Default)]
pub struct MapValue {
    keys: Vec<String>,
    entries: FxHashMap<String, Value>,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. Overwriting keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(slot) = self.entries.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.keys.push(key.clone());
        self.entries.insert(key, value);
        None
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.keys
            .iter()
            .filter_map(|key| self.entries.get(key).map(|value| (key.as_str(), value)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.keys.iter().map(String::as_str)
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = MapValue::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_survives_overwrite() {
        let mut map = MapValue::new();
        map.insert("b", Value::Int(1));
        map.insert("a", Value::Int(2));
        assert_eq!(map.insert("b", Value::Int(3)), Some(Value::Int(1)));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_equality_ignores_order() {
        let left: MapValue = [("a", Value::Int(1)), ("b", Value::Int(2))].into_iter().collect();
        let right: MapValue = [("b", Value::Int(2)), ("a", Value::Int(1))].into_iter().collect();
        assert_eq!(left, right);
    }
}
