//! Named key/value context groups attached to events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Group name used by the package-level `set` shortcut.
pub const DEFAULT_CONTEXT: &str = "Default Context";

/// Environment-derived groups that line rendering leaves out.
pub const RESERVED_GROUPS: [&str; 3] = ["os", "device", "runtime"];

/// Returns true for groups carrying environment metadata.
#[must_use]
pub fn is_reserved_group(name: &str) -> bool {
    RESERVED_GROUPS.contains(&name)
}

/// Scalar context value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Text.
    Str(String),
}

/// Strings render bare, without quotes.
impl fmt::Display for ContextValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(formatter, "{value}"),
            Self::Int(value) => write!(formatter, "{value}"),
            Self::Float(value) => write!(formatter, "{value}"),
            Self::Str(value) => formatter.write_str(value),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ContextValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for ContextValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

macro_rules! lossless_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ContextValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

lossless_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ContextValue {
                fn from(value: $ty) -> Self {
                    i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
                }
            }
        )*
    };
}

wide_int!(u64, usize, isize);

/// Keys of one group, last write wins.
pub type ContextGroup = BTreeMap<String, ContextValue>;

/// All groups of one event, keyed by group name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextGroups(BTreeMap<String, ContextGroup>);

impl ContextGroups {
    /// Empty set of groups.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the group if absent.
    pub fn ensure_group(&mut self, group: &str) {
        self.0.entry(group.to_string()).or_default();
    }

    /// Insert or overwrite `key` in `group`, creating the group if needed.
    pub fn insert(&mut self, group: &str, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.0
            .entry(group.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Copy every group of `other` in, overwriting colliding keys.
    pub fn merge(&mut self, other: Self) {
        for (name, group) in other.0 {
            self.0.entry(name).or_default().extend(group);
        }
    }

    /// Look up a group.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&ContextGroup> {
        self.0.get(name)
    }

    /// Look up one value.
    #[must_use]
    pub fn value(&self, group: &str, key: &str) -> Option<&ContextValue> {
        self.0.get(group).and_then(|entries| entries.get(key))
    }

    /// Iterate groups in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextGroup)> {
        self.0.iter().map(|(name, group)| (name.as_str(), group))
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no group exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `os`, `device`, and `runtime` groups describing the running process.
#[must_use]
pub fn environment_contexts() -> ContextGroups {
    let mut groups = ContextGroups::new();
    groups.insert("os", "name", std::env::consts::OS);
    groups.insert("os", "family", std::env::consts::FAMILY);
    groups.insert("device", "arch", std::env::consts::ARCH);
    if let Ok(cpus) = std::thread::available_parallelism() {
        groups.insert("device", "cpus", cpus.get());
    }
    groups.insert("runtime", "name", "rust");
    groups.insert("runtime", "fanlog", env!("CARGO_PKG_VERSION"));
    groups
}
