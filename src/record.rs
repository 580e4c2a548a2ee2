//! Loosely typed record values and the comparison helpers the table engine
//! builds on.
//!
//! Records come from JSON or CSV files with no fixed schema, so every helper
//! here is total: missing fields, mixed types and nested objects all produce a
//! value instead of an error. Stringification and ordering mirror the
//! coercion rules of a browser table (`String(v)`, `a < b`), which is what the
//! dashboard's list pages were written against.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde_json::Value;

/// One row of domain data: an opaque field mapping.
pub type Record = serde_json::Map<String, Value>;

/// String form of a value as a browser would print it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_string(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    n.as_f64().map(float_string).unwrap_or_default()
}

/// `String(n)` for a float: positional between 1e-6 and 1e21, exponent
/// form (`1e+21`, `1.5e-7`) outside that range.
fn float_string(f: f64) -> String {
    let abs = f.abs();
    if abs == 0.0 {
        return "0".to_string();
    }
    if !(1e-6..1e21).contains(&abs) {
        let exp = format!("{f:e}");
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        };
    }
    // f64 Display already drops a trailing ".0"
    f.to_string()
}

/// Case-insensitive substring test used by the search filter.
pub fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// True when any field value of `record` contains `term` (case-insensitive).
/// An empty term matches every record.
pub fn matches_search(record: &Record, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    record
        .values()
        .any(|value| contains_ci(&display_value(value), &needle))
}

/// Resolve a dotted accessor (`manager.name`) through nested objects.
pub fn lookup_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(path) {
        return Some(value);
    }
    let mut parts = path.split('.');
    let mut current = record.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// `record[field] === expected`.
pub fn strict_eq(actual: Option<&Value>, expected: &Value) -> bool {
    match (actual, expected) {
        (None, _) => false,
        (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Some(Value::String(a)), Value::String(b)) => a == b,
        (Some(Value::Bool(a)), Value::Bool(b)) => a == b,
        (Some(Value::Null), Value::Null) => true,
        _ => false,
    }
}

enum Primitive {
    Undefined,
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Primitive {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            None => Primitive::Undefined,
            Some(Value::Null) => Primitive::Null,
            Some(Value::Bool(b)) => Primitive::Bool(*b),
            Some(Value::Number(n)) => Primitive::Num(n.as_f64().unwrap_or(f64::NAN)),
            Some(Value::String(s)) => Primitive::Str(s.clone()),
            Some(other) => Primitive::Str(display_value(other)),
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Primitive::Undefined => f64::NAN,
            Primitive::Null => 0.0,
            Primitive::Bool(b) => f64::from(u8::from(*b)),
            Primitive::Num(n) => *n,
            Primitive::Str(s) => string_to_number(s),
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.starts_with('+') {
            return f64::NAN;
        }
        return u64::from_str_radix(digits, radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    let numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Ordering implied by `a < b` / `a > b` on loosely typed values.
///
/// Two strings compare lexicographically; every other pairing compares
/// numerically. When either side is `undefined` or not a number, both
/// relations are false and the pair compares `Equal`. This is not a total
/// order, so callers must sort with [`stable_sort_by`].
pub fn loose_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (pa, pb) = (Primitive::from_value(a), Primitive::from_value(b));
    if let (Primitive::Str(x), Primitive::Str(y)) = (&pa, &pb) {
        return x.cmp(y);
    }
    let (x, y) = (pa.to_number(), pb.to_number());
    if x < y {
        Ordering::Less
    } else if x > y {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Stable merge sort that tolerates comparators which are not total orders.
///
/// `slice::sort_by` may panic when the comparator is inconsistent, which
/// `loose_cmp` is by construction.
pub fn stable_sort_by<T, F>(items: &mut [T], mut cmp: F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut buf = Vec::with_capacity(items.len());
    merge_sort(items, &mut buf, &mut cmp);
}

fn merge_sort<T, F>(items: &mut [T], buf: &mut Vec<T>, cmp: &mut F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len <= 1 {
        return;
    }
    let mid = len / 2;
    merge_sort(&mut items[..mid], buf, cmp);
    merge_sort(&mut items[mid..], buf, cmp);

    buf.clear();
    buf.extend_from_slice(items);
    let (left, right) = buf.split_at(mid);
    let (mut i, mut j) = (0, 0);
    for slot in items.iter_mut() {
        let take_right =
            j < right.len() && (i >= left.len() || cmp(&right[j], &left[i]) == Ordering::Less);
        if take_right {
            *slot = right[j];
            j += 1;
        } else {
            *slot = left[i];
            i += 1;
        }
    }
}

/// Sort key for values that do not coerce to a number. As a string it
/// compares `Equal` to every number and to itself.
const NOT_A_NUMBER: &str = "NaN";

fn not_a_number() -> Value {
    Value::String(NOT_A_NUMBER.to_string())
}

/// Sort key for a date field: days since the Unix epoch. Missing or
/// unparseable dates become a non-numeric marker that compares equal to
/// every date, the way an invalid `Date` does.
pub fn date_key(record: &Record, field: &str) -> Value {
    let Some(text) = lookup_path(record, field).and_then(Value::as_str) else {
        return not_a_number();
    };
    let date_part = text.get(..10).unwrap_or(text);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(d) => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(d);
            Value::from((d - epoch).num_days())
        }
        Err(_) => not_a_number(),
    }
}

/// Sort key for a numeric field stored as a number or numeric string.
/// Missing fields and values that coerce to `NaN` share one non-numeric
/// marker; infinities clamp to the largest finite values.
pub fn number_key(record: &Record, field: &str) -> Value {
    let Some(value) = lookup_path(record, field) else {
        return not_a_number();
    };
    if let Value::Number(n) = value {
        return Value::Number(n.clone());
    }
    let n = Primitive::from_value(Some(value)).to_number();
    if n.is_nan() {
        return not_a_number();
    }
    let n = n.clamp(f64::MIN, f64::MAX);
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or_else(not_a_number)
}

/// Sort key comparing the lower-cased string form of a field.
pub fn text_key(record: &Record, field: &str) -> Value {
    let text = lookup_path(record, field)
        .map(display_value)
        .unwrap_or_default();
    Value::String(text.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_display_value_matches_browser_coercion() {
        assert_eq!(display_value(&json!(30)), "30");
        assert_eq!(display_value(&json!(30.5)), "30.5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(null)), "null");
        assert_eq!(display_value(&json!(["a", null, 2])), "a,,2");
        assert_eq!(display_value(&json!({"a": 1})), "[object Object]");
    }

    #[test]
    fn test_display_value_uses_exponent_for_extreme_floats() {
        assert_eq!(display_value(&json!(1e21)), "1e+21");
        assert_eq!(display_value(&json!(1.5e21)), "1.5e+21");
        assert_eq!(display_value(&json!(1e-7)), "1e-7");
        assert_eq!(display_value(&json!(-2.5e-9)), "-2.5e-9");
        assert_eq!(display_value(&json!(1e20)), "100000000000000000000");
        assert_eq!(display_value(&json!(0.000001)), "0.000001");
        assert_eq!(display_value(&json!(0.0)), "0");
        assert_eq!(display_value(&json!(-0.0)), "0");
        assert!(matches_search(&rec(json!({"big": 1e21})), "e+21"));
    }

    #[test]
    fn test_matches_search_any_field() {
        let r = rec(json!({"name": "Alice", "age": 25}));
        assert!(matches_search(&r, "ALI"));
        assert!(matches_search(&r, "25"));
        assert!(matches_search(&r, ""));
        assert!(!matches_search(&r, "bob"));
    }

    #[test]
    fn test_lookup_path_nested() {
        let r = rec(json!({"manager": {"name": "Dana"}, "a.b": 1}));
        assert_eq!(lookup_path(&r, "manager.name"), Some(&json!("Dana")));
        assert_eq!(lookup_path(&r, "a.b"), Some(&json!(1)));
        assert_eq!(lookup_path(&r, "manager.missing"), None);
    }

    #[test]
    fn test_strict_eq() {
        assert!(strict_eq(Some(&json!(1)), &json!(1.0)));
        assert!(strict_eq(Some(&json!("x")), &json!("x")));
        assert!(!strict_eq(Some(&json!("1")), &json!(1)));
        assert!(!strict_eq(None, &json!("x")));
        assert!(!strict_eq(Some(&json!({"a": 1})), &json!({"a": 1})));
    }

    #[test]
    fn test_loose_cmp_strings_and_numbers() {
        assert_eq!(loose_cmp(Some(&json!("a")), Some(&json!("b"))), Ordering::Less);
        assert_eq!(loose_cmp(Some(&json!(10)), Some(&json!(9))), Ordering::Greater);
        // mixed: string coerced to number
        assert_eq!(loose_cmp(Some(&json!("10")), Some(&json!(9))), Ordering::Greater);
        assert_eq!(loose_cmp(Some(&json!(null)), Some(&json!(1))), Ordering::Less);
    }

    #[test]
    fn test_loose_cmp_undefined_is_equal_to_everything() {
        assert_eq!(loose_cmp(None, Some(&json!(1))), Ordering::Equal);
        assert_eq!(loose_cmp(Some(&json!("x")), None), Ordering::Equal);
        assert_eq!(loose_cmp(None, None), Ordering::Equal);
        assert_eq!(loose_cmp(Some(&json!("abc")), Some(&json!(3))), Ordering::Equal);
    }

    #[test]
    fn test_loose_cmp_infinity_and_radix_strings() {
        let five = json!(5);
        assert_eq!(loose_cmp(Some(&json!("Infinity")), Some(&five)), Ordering::Greater);
        assert_eq!(loose_cmp(Some(&json!("-Infinity")), Some(&five)), Ordering::Less);
        assert_eq!(loose_cmp(Some(&json!("0x10")), Some(&json!(16))), Ordering::Equal);
        assert_eq!(loose_cmp(Some(&json!("0b11")), Some(&json!(2))), Ordering::Greater);
        assert_eq!(loose_cmp(Some(&json!("0o7")), Some(&json!(8))), Ordering::Less);
        // case matters, and a bad digit is not a number
        assert_eq!(loose_cmp(Some(&json!("infinity")), Some(&five)), Ordering::Equal);
        assert_eq!(loose_cmp(Some(&json!("0xZ")), Some(&five)), Ordering::Equal);
    }

    #[test]
    fn test_stable_sort_keeps_equal_order() {
        let mut items = [(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        stable_sort_by(&mut items, |x, y| x.0.cmp(&y.0));
        assert_eq!(items, [(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c')]);
    }

    #[test]
    fn test_stable_sort_survives_inconsistent_comparator() {
        let values = [json!(3), json!("x"), json!(1), json!(null), json!("2")];
        let mut idx: Vec<usize> = (0..values.len()).collect();
        stable_sort_by(&mut idx, |&a, &b| loose_cmp(Some(&values[a]), Some(&values[b])));
        let mut sorted = idx.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_date_key_orders_dates() {
        let a = rec(json!({"joined": "2023-01-05"}));
        let b = rec(json!({"joined": "2024-02-01T09:00:00"}));
        let ka = date_key(&a, "joined");
        let kb = date_key(&b, "joined");
        assert_eq!(loose_cmp(Some(&ka), Some(&kb)), Ordering::Less);
        let missing = date_key(&a, "missing");
        assert_eq!(loose_cmp(Some(&missing), Some(&ka)), Ordering::Equal);
    }

    #[test]
    fn test_number_key_parses_numeric_strings() {
        let a = rec(json!({"salary": "900"}));
        let b = rec(json!({"salary": "10000"}));
        let (ka, kb) = (number_key(&a, "salary"), number_key(&b, "salary"));
        assert_eq!(loose_cmp(Some(&ka), Some(&kb)), Ordering::Less);
        // as plain strings they would compare the other way
        assert_eq!(
            loose_cmp(a.get("salary"), b.get("salary")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_number_key_missing_and_non_numeric_are_unordered() {
        let zero = number_key(&rec(json!({"salary": -5})), "salary");
        let missing = number_key(&rec(json!({})), "salary");
        let na = number_key(&rec(json!({"salary": "n/a"})), "salary");
        let other = number_key(&rec(json!({"salary": "abc"})), "salary");
        assert_eq!(loose_cmp(Some(&missing), Some(&zero)), Ordering::Equal);
        assert_eq!(loose_cmp(Some(&na), Some(&zero)), Ordering::Equal);
        assert_eq!(loose_cmp(Some(&na), Some(&other)), Ordering::Equal);
        assert_eq!(loose_cmp(Some(&missing), Some(&na)), Ordering::Equal);

        let inf = number_key(&rec(json!({"salary": "Infinity"})), "salary");
        assert_eq!(loose_cmp(Some(&inf), Some(&zero)), Ordering::Greater);
        let flag = number_key(&rec(json!({"salary": true})), "salary");
        assert_eq!(flag, json!(1.0));
    }
}
