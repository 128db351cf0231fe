use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// JSON object kept in document order.
///
/// Slot grids and chart legends follow the order the hub declared the keys
/// in, so a plain `HashMap` is not enough. A repeated key replaces the
/// earlier value in place.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. Returns the previous value if the key existed.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(existing) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// Parking slot status.
///
/// Only `free` and `booked` exist in the domain. Anything else the hub sends
/// is kept verbatim and counts as "not free".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    Free,
    Booked,
    Other(String),
}

impl SlotStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SlotStatus::Free => "free",
            SlotStatus::Booked => "booked",
            SlotStatus::Other(s) => s,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, SlotStatus::Free)
    }

    /// `free` becomes `booked`; every other status becomes `free`.
    pub fn toggled(&self) -> SlotStatus {
        if self.is_free() {
            SlotStatus::Booked
        } else {
            SlotStatus::Free
        }
    }
}

impl From<&str> for SlotStatus {
    fn from(s: &str) -> Self {
        match s {
            "free" => SlotStatus::Free,
            "booked" => SlotStatus::Booked,
            other => SlotStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SlotStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SlotStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => SlotStatus::from(s.as_str()),
            Value::Null => SlotStatus::Other("null".to_string()),
            other => SlotStatus::Other(other.to_string()),
        })
    }
}

/// Slot identifier -> status, in declaration order.
pub type ParkingMap = OrderedMap<SlotStatus>;

/// Label -> count, in declaration order.
pub type Distribution = OrderedMap<f64>;

/// Count from a loosely typed JSON value. Numeric strings are parsed;
/// anything else unusable counts as zero.
fn lenient_count(value: &Value) -> f64 {
    let count = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if count.is_finite() {
        count
    } else {
        0.0
    }
}

/// A distribution that is not a JSON object is treated as absent, and bad
/// counts as zero, so one odd entry never costs the rest of the frame.
fn lenient_distribution<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Distribution>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(entries)) => Some(
            entries
                .iter()
                .map(|(label, count)| (label.as_str(), lenient_count(count)))
                .collect(),
        ),
        _ => None,
    })
}

/// Mall analytics object (`mall` sub-field).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MallAnalytics {
    /// Age bucket label -> visitor count
    #[serde(
        default,
        deserialize_with = "lenient_distribution",
        skip_serializing_if = "Option::is_none"
    )]
    pub ages: Option<Distribution>,

    /// Gender label -> visitor count
    #[serde(
        default,
        deserialize_with = "lenient_distribution",
        skip_serializing_if = "Option::is_none"
    )]
    pub genders: Option<Distribution>,

    /// Total visitors counted in
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub entered: Option<u64>,

    /// Visitors counted out
    #[serde(rename = "out", default, skip_serializing_if = "Option::is_none")]
    pub exited: Option<u64>,

    /// Visitors currently inside
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inside: Option<u64>,

    /// Keys this client does not model, kept for display
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Latest known mall/parking state.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MallState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking: Option<ParkingMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mall: Option<MallAnalytics>,
}

impl MallState {
    pub fn ages(&self) -> Option<&Distribution> {
        self.mall.as_ref().and_then(|m| m.ages.as_ref())
    }

    pub fn genders(&self) -> Option<&Distribution> {
        self.mall.as_ref().and_then(|m| m.genders.as_ref())
    }
}
