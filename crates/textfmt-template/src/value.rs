//! Argument values for formatting.
//!
//! [`FormatValue`] is the tagged value every formatter consumes. Path
//! resolution in the Python-style grammar walks these values one segment at a
//! time with [`FormatValue::member`], which pattern-matches on the variant
//! instead of probing types at runtime.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// A zero-argument function stored inside a [`FormatValue`].
///
/// Callables are invoked when path resolution reaches them, and the value
/// they return is used in their place.
#[derive(Clone)]
pub struct Callable(Rc<dyn Fn() -> FormatValue>);

impl Callable {
    /// Wraps a closure.
    pub fn new(f: impl Fn() -> FormatValue + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the function.
    pub fn call(&self) -> FormatValue {
        (self.0)()
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// A dynamic formatting argument.
///
/// Sequences are shared handles: cloning a `Sequence` clones the handle, not
/// the elements, so mutating members such as `pop` are visible to every
/// holder, including the caller that supplied the argument.
#[derive(Debug, Clone)]
pub enum FormatValue {
    /// An explicit null.
    Null,
    /// An explicit undefined value.
    Undefined,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit integer.
    Integer(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A string value.
    String(String),
    /// An ordered, shared, mutable list of values.
    Sequence(Rc<RefCell<Vec<FormatValue>>>),
    /// A string-keyed mapping.
    Keyed(BTreeMap<String, FormatValue>),
    /// A zero-argument function.
    Callable(Callable),
}

impl FormatValue {
    /// Creates a sequence from the given elements.
    pub fn sequence(items: Vec<Self>) -> Self {
        Self::Sequence(Rc::new(RefCell::new(items)))
    }

    /// Creates a callable value from a closure.
    ///
    /// ```
    /// use textfmt_template::value::FormatValue;
    ///
    /// let quip = FormatValue::callable(|| FormatValue::from("Bazinga!"));
    /// assert_eq!(quip.invoked().to_display_string(), "Bazinga!");
    /// ```
    pub fn callable(f: impl Fn() -> Self + 'static) -> Self {
        Self::Callable(Callable::new(f))
    }

    /// Returns `true` for `Null` and `Undefined`.
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Invokes the value if it is callable, otherwise returns it unchanged.
    #[must_use]
    pub fn invoked(self) -> Self {
        match self {
            Self::Callable(f) => f.call(),
            other => other,
        }
    }

    /// Performs one path-resolution step, looking up `name` on this value.
    ///
    /// Returns `None` when the member does not exist. A member that is itself
    /// callable is invoked and its result returned. Built-in methods
    /// (`pop`, `to_uppercase`, ...) are evaluated directly.
    pub fn member(&self, name: &str) -> Option<Self> {
        let found = match self {
            Self::Keyed(map) => map.get(name).cloned(),
            Self::Sequence(items) => sequence_member(items, name),
            Self::String(s) => string_member(s, name),
            _ => None,
        }?;
        Some(found.invoked())
    }

    /// Converts this value to its default string representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Undefined => "undefined".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => format_number(*f),
            Self::String(s) => s.clone(),
            Self::Sequence(items) => items
                .borrow()
                .iter()
                .map(|v| {
                    if v.is_nullish() {
                        String::new()
                    } else {
                        v.to_display_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Keyed(_) => "[object Object]".to_string(),
            Self::Callable(_) => "[function]".to_string(),
        }
    }

    /// Coerces this value to a finite number.
    ///
    /// Integers, floats, decimal strings and `0x` hexadecimal strings coerce;
    /// booleans, collections and non-numeric strings do not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) if f.is_finite() => Some(*f),
            Self::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Coerces this value to an integer.
    ///
    /// Floats truncate toward zero, decimal strings keep their leading integer
    /// part (`"12.7"` is 12, `"1e5"` is 1) and `0x` strings parse as hexadecimal.
    /// Values outside the `i64` range do not coerce.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) => float_to_integer(*f),
            Self::String(s) => parse_integer_prefix(s),
            _ => None,
        }
    }

    /// Returns the string contents if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts this value to JSON.
    ///
    /// Undefined values and callables are dropped from maps and become `null`
    /// inside sequences; non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null | Self::Undefined | Self::Callable(_) => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::json!(i),
            Self::Float(f) => float_to_json(*f),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Sequence(items) => {
                serde_json::Value::Array(items.borrow().iter().map(Self::to_json).collect())
            }
            Self::Keyed(map) => serde_json::Value::Object(
                map.iter()
                    .filter(|(_, v)| !matches!(v, Self::Undefined | Self::Callable(_)))
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn sequence_member(items: &Rc<RefCell<Vec<FormatValue>>>, name: &str) -> Option<FormatValue> {
    if let Ok(idx) = name.parse::<usize>() {
        return items.borrow().get(idx).cloned();
    }
    match name {
        "len" | "length" => Some(FormatValue::from(items.borrow().len())),
        "first" => items.borrow().first().cloned(),
        "last" => items.borrow().last().cloned(),
        "pop" => Some(items.borrow_mut().pop().unwrap_or(FormatValue::Undefined)),
        "shift" => {
            let mut items = items.borrow_mut();
            if items.is_empty() {
                Some(FormatValue::Undefined)
            } else {
                Some(items.remove(0))
            }
        }
        _ => None,
    }
}

fn string_member(s: &str, name: &str) -> Option<FormatValue> {
    if let Ok(idx) = name.parse::<usize>() {
        return s.chars().nth(idx).map(|c| FormatValue::String(c.to_string()));
    }
    match name {
        "len" | "length" => Some(FormatValue::from(s.chars().count())),
        "to_lowercase" | "toLowerCase" => Some(FormatValue::String(s.to_lowercase())),
        "to_uppercase" | "toUpperCase" => Some(FormatValue::String(s.to_uppercase())),
        "trim" => Some(FormatValue::String(s.trim().to_string())),
        _ => None,
    }
}

/// Formats a float: integral values without a fractional part, everything
/// else in the shortest round-trip form.
fn format_number(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if f == 0.0 {
        "0".to_string()
    } else if f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_integer(f: f64) -> Option<i64> {
    // -2^63 ..= 2^63 - 1 after truncation
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    let t = f.trunc();
    (-BOUND..BOUND).contains(&t).then(|| t as i64)
}

fn float_to_json(f: f64) -> serde_json::Value {
    // 2^53: beyond this integral floats are not exactly representable as i64 text
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        serde_json::json!(f as i64)
    } else {
        serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    }
}

fn parse_hex(s: &str) -> Option<i64> {
    let (negative, body) = split_sign(s);
    let digits = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))?;
    let value = i64::from_str_radix(digits, 16).ok()?;
    Some(if negative { -value } else { value })
}

fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if let Some(hex) = parse_hex(t) {
        return Some(hex as f64);
    }
    // Keeps "inf", "nan" and friends out; exponents are fine.
    if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    t.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_integer_prefix(s: &str) -> Option<i64> {
    let t = s.trim();
    if let Some(hex) = parse_hex(t) {
        return Some(hex);
    }
    let (negative, body) = split_sign(t);
    let end = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let value: i64 = body.get(..end)?.parse().ok()?;
    Some(if negative { -value } else { value })
}

impl fmt::Display for FormatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl PartialEq for FormatValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                (*a as f64) == *b
            }
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Self::Keyed(a), Self::Keyed(b)) => a == b,
            (Self::Callable(a), Self::Callable(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

// -- From implementations --

impl From<&str> for FormatValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FormatValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<char> for FormatValue {
    fn from(c: char) -> Self {
        Self::String(c.to_string())
    }
}

impl From<i32> for FormatValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i64> for FormatValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<u32> for FormatValue {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u64> for FormatValue {
    fn from(i: u64) -> Self {
        Self::Integer(i as i64)
    }
}

impl From<usize> for FormatValue {
    fn from(i: usize) -> Self {
        Self::Integer(i as i64)
    }
}

impl From<f32> for FormatValue {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<f64> for FormatValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FormatValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<FormatValue>> From<Vec<T>> for FormatValue {
    fn from(v: Vec<T>) -> Self {
        Self::sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FormatValue>> From<BTreeMap<String, T>> for FormatValue {
    fn from(m: BTreeMap<String, T>) -> Self {
        Self::Keyed(m.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<FormatValue>> From<HashMap<String, T>> for FormatValue {
    fn from(m: HashMap<String, T>) -> Self {
        Self::Keyed(m.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<FormatValue>> From<Option<T>> for FormatValue {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl From<serde_json::Value> for FormatValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::Null
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(arr) => {
                Self::sequence(arr.into_iter().map(FormatValue::from).collect())
            }
            serde_json::Value::Object(map) => Self::Keyed(
                map.into_iter()
                    .map(|(k, v)| (k, FormatValue::from(v)))
                    .collect(),
            ),
        }
    }
}
