//! Parameter and column value types for the safe `SQLite` wrapper.

/// A value that can be bound to a prepared statement parameter or read from
/// a result column.
///
/// The two integer variants select the native bind call: [`Value::Int`] binds
/// with `sqlite3_bind_int`, [`Value::Integer`] with `sqlite3_bind_int64`.
/// Integer columns are always read back as [`Value::Integer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary blob.
    Blob(Vec<u8>),
    /// SQL NULL.
    Null,
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Widens either integer variant to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(i64::from(*v)),
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Int(i32::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Convenience macro for building parameter lists.
///
/// Usage: `params![1_i64, blob.as_slice(), "text"]`
#[macro_export]
macro_rules! params {
    ($($val:expr),* $(,)?) => {
        &[$($crate::Value::from($val)),*][..]
    };
}
