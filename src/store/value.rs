use super::error::DecodeError;
use super::php;

/// Key of a PHP array entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Int(i64),
    Str(String),
}

impl OptionKey {
    /// Non-negative integer keys as a rule-set index. Numeric string keys
    /// count too.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            OptionKey::Int(i) => usize::try_from(*i).ok(),
            OptionKey::Str(s) => s.parse().ok(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            OptionKey::Int(i) => name.parse::<i64>().is_ok_and(|n| n == *i),
            OptionKey::Str(s) => s == name,
        }
    }
}

/// A stored option value, shaped like the PHP values WordPress keeps in its
/// options table.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered key/value entries. Objects decode to this as well.
    Array(Vec<(OptionKey, OptionValue)>),
}

impl OptionValue {
    /// Decode the PHP `serialize()` format.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the input is not a single well-formed
    /// serialized value.
    pub fn from_php_serialized(input: &str) -> Result<Self, DecodeError> {
        php::decode(input)
    }

    /// Decode a raw stored string: serialized payloads are decoded, anything
    /// else is kept as a plain string.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the input looks serialized but is malformed.
    pub fn from_stored(raw: &str) -> Result<Self, DecodeError> {
        if php::looks_serialized(raw) {
            php::decode(raw)
        } else {
            Ok(OptionValue::String(raw.to_owned()))
        }
    }

    /// An array keyed by rule-set index.
    pub fn indexed(entries: impl IntoIterator<Item = (usize, OptionValue)>) -> Self {
        OptionValue::Array(
            entries
                .into_iter()
                .map(|(idx, value)| (OptionKey::Int(idx as i64), value))
                .collect(),
        )
    }

    /// A list of IDs, stored as strings the way form submissions arrive.
    pub fn ids(ids: &[u64]) -> Self {
        OptionValue::Array(
            ids.iter()
                .enumerate()
                .map(|(pos, id)| (OptionKey::Int(pos as i64), OptionValue::String(id.to_string())))
                .collect(),
        )
    }

    /// `true` for the values PHP's `empty()` treats as unset.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            OptionValue::Null => true,
            OptionValue::Bool(b) => !b,
            OptionValue::String(s) => s.trim().is_empty(),
            OptionValue::Array(entries) => entries.is_empty(),
            OptionValue::Int(_) | OptionValue::Float(_) => false,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[(OptionKey, OptionValue)]> {
        match self {
            OptionValue::Array(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up an entry by rule-set index.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&OptionValue> {
        self.as_array()?
            .iter()
            .find(|(key, _)| key.as_index() == Some(index))
            .map(|(_, value)| value)
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&OptionValue> {
        self.as_array()?
            .iter()
            .find(|(key, _)| key.matches(name))
            .map(|(_, value)| value)
    }

    /// Indices of array entries with a non-negative integer key.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.as_array()
            .map(|entries| entries.iter().filter_map(|(key, _)| key.as_index()).collect())
            .unwrap_or_default()
    }

    /// Scalar rendered as text. Arrays and null have none.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            OptionValue::String(s) => Some(s.clone()),
            OptionValue::Int(i) => Some(i.to_string()),
            OptionValue::Float(f) => Some(f.to_string()),
            OptionValue::Bool(true) => Some("1".to_owned()),
            OptionValue::Bool(false) => Some(String::new()),
            OptionValue::Null | OptionValue::Array(_) => None,
        }
    }

    /// Non-blank strings from an array, or a lone scalar.
    #[must_use]
    pub fn as_strings(&self) -> Vec<String> {
        match self {
            OptionValue::Array(entries) => entries
                .iter()
                .filter_map(|(_, value)| value.as_text())
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect(),
            other => other
                .as_text()
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .into_iter()
                .collect(),
        }
    }

    /// Entries that parse as IDs. Anything else is dropped.
    #[must_use]
    pub fn as_ids(&self) -> Vec<u64> {
        self.as_strings()
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }

    /// Encode in the PHP `serialize()` format.
    #[must_use]
    pub fn to_php_serialized(&self) -> String {
        let mut out = String::new();
        self.write_php(&mut out);
        out
    }

    fn write_php(&self, out: &mut String) {
        match self {
            OptionValue::Null => out.push_str("N;"),
            OptionValue::Bool(b) => out.push_str(if *b { "b:1;" } else { "b:0;" }),
            OptionValue::Int(i) => out.push_str(&format!("i:{i};")),
            OptionValue::Float(f) if f.is_nan() => out.push_str("d:NAN;"),
            OptionValue::Float(f) if f.is_infinite() => {
                out.push_str(if *f < 0.0 { "d:-INF;" } else { "d:INF;" });
            }
            OptionValue::Float(f) => out.push_str(&format!("d:{f};")),
            OptionValue::String(s) => write_php_string(s, out),
            OptionValue::Array(entries) => {
                out.push_str(&format!("a:{}:{{", entries.len()));
                for (key, value) in entries {
                    match key {
                        OptionKey::Int(i) => out.push_str(&format!("i:{i};")),
                        OptionKey::Str(s) => write_php_string(s, out),
                    }
                    value.write_php(out);
                }
                out.push('}');
            }
        }
    }
}

/// `s:<byte length>:"<bytes>";`
fn write_php_string(s: &str, out: &mut String) {
    out.push_str(&format!("s:{}:\"{s}\";", s.len()));
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::String(s)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

/// JSON fixtures: objects keep their key order, numeric keys become integer
/// keys, lists are keyed `0..n`.
impl From<serde_json::Value> for OptionValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => OptionValue::Null,
            Json::Bool(b) => OptionValue::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => OptionValue::Int(i),
                None => OptionValue::Float(n.as_f64().unwrap_or_default()),
            },
            Json::String(s) => OptionValue::String(s),
            Json::Array(items) => OptionValue::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(pos, item)| (OptionKey::Int(pos as i64), item.into()))
                    .collect(),
            ),
            Json::Object(map) => OptionValue::Array(
                map.into_iter()
                    .map(|(key, item)| {
                        let key = match key.parse::<i64>() {
                            Ok(i) => OptionKey::Int(i),
                            Err(_) => OptionKey::Str(key),
                        };
                        (key, item.into())
                    })
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn blankness_follows_php_empty() {
        assert!(OptionValue::Null.is_blank());
        assert!(OptionValue::from("").is_blank());
        assert!(OptionValue::from("  ").is_blank());
        assert!(OptionValue::Bool(false).is_blank());
        assert!(OptionValue::Array(vec![]).is_blank());
        assert!(!OptionValue::from("0").is_blank());
        assert!(!OptionValue::Int(0).is_blank());
    }

    #[test]
    fn json_object_keys_become_indices() {
        let value = OptionValue::from(json!({"0": "order_subtotal", "3": "total_quantity", "x": 1}));
        assert_eq!(value.indices(), vec![0, 3]);
        assert_eq!(value.at(3), Some(&OptionValue::from("total_quantity")));
        assert_eq!(value.field("x"), Some(&OptionValue::Int(1)));
        assert_eq!(value.at(1), None);
    }

    #[test]
    fn ids_and_strings() {
        let value = OptionValue::from(json!(["12", 13, "", "abc", " 14 "]));
        assert_eq!(value.as_ids(), vec![12, 13, 14]);
        assert_eq!(OptionValue::from("7").as_ids(), vec![7]);
        assert_eq!(
            OptionValue::from(json!(["editor", " "])).as_strings(),
            vec!["editor".to_owned()]
        );
    }

    #[test]
    fn serialize_nested() {
        let value = OptionValue::indexed([
            (0, OptionValue::from("yes")),
            (2, OptionValue::ids(&[5, 6])),
        ]);
        assert_eq!(
            value.to_php_serialized(),
            r#"a:2:{i:0;s:3:"yes";i:2;a:2:{i:0;s:1:"5";i:1;s:1:"6";}}"#
        );
    }

    #[test]
    fn serialize_scalars() {
        assert_eq!(OptionValue::Null.to_php_serialized(), "N;");
        assert_eq!(OptionValue::Bool(true).to_php_serialized(), "b:1;");
        assert_eq!(OptionValue::Float(0.5).to_php_serialized(), "d:0.5;");
        assert_eq!(OptionValue::from("café").to_php_serialized(), r#"s:5:"café";"#);
    }

    #[test]
    fn from_stored_keeps_plain_strings() {
        assert_eq!(OptionValue::from_stored("yes"), Ok(OptionValue::from("yes")));
        assert_eq!(
            OptionValue::from_stored("a:1:{i:0;s:2:\"lt\";}"),
            Ok(OptionValue::indexed([(0, OptionValue::from("lt"))]))
        );
    }
}
