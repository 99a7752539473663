//! Single-column sorting
//!
//! [`SortController`] is the toggle state machine. Once a field has been
//! chosen it cycles strictly between ascending and descending; there is no
//! way back to "unsorted" short of dropping the controller.
//!
//! The comparator helpers order records client-side with null handling.

use std::cmp::Ordering;

use chrono::{NaiveDateTime, NaiveTime};
use tabula_core::{Fields, NullPosition, SortDirection, SortSpec, Value};

/// Holds at most one active sort
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortController {
    active: Option<SortSpec>,
}

impl SortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a sort already applied, e.g. restored from a saved view
    pub fn with_initial(spec: SortSpec) -> Self {
        Self { active: Some(spec) }
    }

    /// Toggle the sort on `field` and return the new active spec.
    ///
    /// A different field always starts ascending; the active field flips direction.
    pub fn toggle(&mut self, field: &str) -> SortSpec {
        let next = match &self.active {
            Some(current) if current.field == field => {
                SortSpec::new(field, current.direction.toggle())
            }
            _ => SortSpec::ascending(field),
        };
        tracing::debug!(field, direction = next.direction.label(), "Sort toggled");
        self.active = Some(next.clone());
        next
    }

    pub fn active(&self) -> Option<&SortSpec> {
        self.active.as_ref()
    }

    /// Active direction for `field`, if it is the sorted one
    pub fn direction_for(&self, field: &str) -> Option<SortDirection> {
        self.active
            .as_ref()
            .filter(|spec| spec.field == field)
            .map(|spec| spec.direction)
    }

    /// The active sort as the list form carried by sort events
    pub fn specs(&self) -> Vec<SortSpec> {
        self.active.iter().cloned().collect()
    }
}

/// Compare two field values with null handling.
///
/// Nulls are placed by `null_position` regardless of direction, so callers
/// apply the direction to the non-null ordering only.
pub fn compare_values(a: &Value, b: &Value, null_position: NullPosition) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => match null_position {
            NullPosition::First => Ordering::Less,
            NullPosition::Last => Ordering::Greater,
        },
        (false, true) => match null_position {
            NullPosition::First => Ordering::Greater,
            NullPosition::Last => Ordering::Less,
        },
        (false, false) => compare_non_null_values(a, b),
    }
}

/// Comparison class of a non-null value.
///
/// Values of different classes never interleave: booleans sort before
/// numbers, then dates, text, arrays and JSON. Numeric and date-like strings
/// join the number and date classes.
enum SortClass {
    Bool(bool),
    Number(f64),
    Temporal(NaiveDateTime),
    Text,
    Array,
    Json,
}

impl SortClass {
    fn of(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(*b),
            Value::Date(d) => Self::Temporal(d.and_time(NaiveTime::MIN)),
            Value::DateTime(dt) => Self::Temporal(*dt),
            Value::DateTimeUtc(dt) => Self::Temporal(dt.naive_utc()),
            Value::Array(_) => Self::Array,
            Value::Json(_) => Self::Json,
            Value::Int(_) | Value::Float(_) | Value::Decimal(_) | Value::String(_) => {
                if let Some(n) = value.as_f64() {
                    Self::Number(n)
                } else if let Some(d) = value.as_date() {
                    Self::Temporal(d.and_time(NaiveTime::MIN))
                } else {
                    Self::Text
                }
            }
            Value::Uuid(_) | Value::Null => Self::Text,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Number(_) => 1,
            Self::Temporal(_) => 2,
            Self::Text => 3,
            Self::Array => 4,
            Self::Json => 5,
        }
    }
}

/// Compare two non-null values.
///
/// This is a total order: class first, then the class key, then the text form
/// to break ties between values that share a key (`1` and `1.0`).
fn compare_non_null_values(a: &Value, b: &Value) -> Ordering {
    let by_class = match (SortClass::of(a), SortClass::of(b)) {
        (SortClass::Bool(x), SortClass::Bool(y)) => x.cmp(&y),
        (SortClass::Number(x), SortClass::Number(y)) => x.total_cmp(&y),
        (SortClass::Temporal(x), SortClass::Temporal(y)) => x.cmp(&y),
        (SortClass::Array, SortClass::Array) => compare_arrays(a, b),
        (SortClass::Json, SortClass::Json) => a.to_string().cmp(&b.to_string()),
        (SortClass::Text, SortClass::Text) => Ordering::Equal,
        (x, y) => x.rank().cmp(&y.rank()),
    };
    by_class.then_with(|| compare_text(a, b))
}

fn compare_arrays(a: &Value, b: &Value) -> Ordering {
    let (Value::Array(a), Value::Array(b)) = (a, b) else {
        return Ordering::Equal;
    };
    for (va, vb) in a.iter().zip(b.iter()) {
        let cmp = compare_values(va, vb, NullPosition::Last);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    a.len().cmp(&b.len())
}

/// Case-insensitive string comparison, falling back to exact order on ties
fn compare_text(a: &Value, b: &Value) -> Ordering {
    let a = a.to_string();
    let b = b.to_string();
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}

/// Compare two records on `spec`. Missing fields sort like nulls.
pub fn compare_records<R: Fields + ?Sized>(
    a: &R,
    b: &R,
    spec: &SortSpec,
    null_position: NullPosition,
) -> Ordering {
    let va = a.field(&spec.field);
    let vb = b.field(&spec.field);
    let va = va.as_deref().unwrap_or(&Value::Null);
    let vb = vb.as_deref().unwrap_or(&Value::Null);

    if va.is_null() || vb.is_null() {
        return compare_values(va, vb, null_position);
    }
    let ordering = compare_non_null_values(va, vb);
    match spec.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Stable sort of `indices` into `records` by `spec`
pub fn sort_indices<R: Fields>(
    records: &[R],
    indices: &mut [usize],
    spec: &SortSpec,
    null_position: NullPosition,
) {
    indices.sort_by(|&a, &b| compare_records(&records[a], &records[b], spec, null_position));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tabula_core::MapRecord;

    #[test]
    fn test_toggle_cycles_between_directions() {
        let mut sort = SortController::new();
        assert_eq!(sort.toggle("name"), SortSpec::ascending("name"));
        assert_eq!(sort.toggle("name"), SortSpec::descending("name"));
        assert_eq!(sort.toggle("name"), SortSpec::ascending("name"));
        assert_eq!(sort.toggle("name"), SortSpec::descending("name"));
    }

    #[test]
    fn test_toggle_other_field_resets_to_ascending() {
        let mut sort = SortController::new();
        sort.toggle("name");
        sort.toggle("name");
        assert_eq!(sort.toggle("amount"), SortSpec::ascending("amount"));
        assert_eq!(sort.direction_for("name"), None);
        assert_eq!(sort.direction_for("amount"), Some(SortDirection::Ascending));
        assert_eq!(sort.specs(), vec![SortSpec::ascending("amount")]);
    }

    #[test]
    fn test_with_initial() {
        let mut sort = SortController::with_initial(SortSpec::descending("created"));
        assert_eq!(sort.toggle("created"), SortSpec::ascending("created"));
    }

    #[test]
    fn test_compare_values_nulls() {
        let one = Value::Int(1);
        assert_eq!(compare_values(&Value::Null, &one, NullPosition::Last), Ordering::Greater);
        assert_eq!(compare_values(&Value::Null, &one, NullPosition::First), Ordering::Less);
        assert_eq!(compare_values(&Value::Null, &Value::Null, NullPosition::Last), Ordering::Equal);
    }

    #[test]
    fn test_mixed_numeric_compare() {
        assert_eq!(
            compare_values(&Value::Int(10), &Value::Float(9.5), NullPosition::Last),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::from("10"), &Value::from("9"), NullPosition::Last),
            Ordering::Greater
        );
    }

    #[test]
    fn test_strings_compare_case_insensitively() {
        assert_eq!(
            compare_values(&Value::from("apple"), &Value::from("Banana"), NullPosition::Last),
            Ordering::Less
        );
    }

    #[test]
    fn test_date_strings_compare_chronologically() {
        let d = Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(
            compare_values(&Value::from("2023-12-31"), &d, NullPosition::Last),
            Ordering::Less
        );
    }

    #[test]
    fn test_nan_has_a_fixed_place() {
        let nan = Value::Float(f64::NAN);
        let one = Value::Float(1.0);
        assert_eq!(compare_values(&nan, &one, NullPosition::Last), Ordering::Greater);
        assert_eq!(compare_values(&one, &nan, NullPosition::Last), Ordering::Less);
        assert_eq!(compare_values(&nan, &nan, NullPosition::Last), Ordering::Equal);
    }

    #[test]
    fn test_mixed_code_column_groups_by_class() {
        let codes = ["10", "9", "1a", "2"];
        let records: Vec<MapRecord> = (0..12)
            .map(|i| {
                MapRecord::new("id")
                    .with("id", i as i64)
                    .with("code", codes[i % codes.len()])
            })
            .collect();
        let mut indices: Vec<usize> = (0..records.len()).collect();
        sort_indices(&records, &mut indices, &SortSpec::ascending("code"), NullPosition::Last);

        let sorted: Vec<String> = indices
            .iter()
            .map(|&i| records[i].get("code").unwrap().to_string())
            .collect();
        let expected: Vec<&str> = ["2", "9", "10", "1a"]
            .iter()
            .flat_map(|code| std::iter::repeat_n(*code, 3))
            .collect();
        assert_eq!(sorted, expected);

        // Pairwise answers agree with each other
        let (two, ten, alnum) = (Value::from("2"), Value::from("10"), Value::from("1a"));
        assert_eq!(compare_values(&two, &ten, NullPosition::Last), Ordering::Less);
        assert_eq!(compare_values(&ten, &alnum, NullPosition::Last), Ordering::Less);
        assert_eq!(compare_values(&two, &alnum, NullPosition::Last), Ordering::Less);
    }

    fn records(amounts: &[Option<i64>]) -> Vec<MapRecord> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                MapRecord::new("id")
                    .with("id", i as i64)
                    .with("amount", *amount)
            })
            .collect()
    }

    #[test]
    fn test_sort_indices_descending_keeps_nulls_last() {
        let records = records(&[Some(2), None, Some(5), Some(1)]);
        let mut indices: Vec<usize> = (0..records.len()).collect();
        sort_indices(
            &records,
            &mut indices,
            &SortSpec::descending("amount"),
            NullPosition::Last,
        );
        assert_eq!(indices, vec![2, 0, 3, 1]);
    }

    #[test]
    fn test_sort_indices_is_stable() {
        let records = records(&[Some(1), Some(1), Some(0), Some(1)]);
        let mut indices: Vec<usize> = (0..records.len()).collect();
        sort_indices(
            &records,
            &mut indices,
            &SortSpec::ascending("amount"),
            NullPosition::Last,
        );
        assert_eq!(indices, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_missing_field_sorts_like_null() {
        let records = vec![
            MapRecord::new("id").with("id", 0),
            MapRecord::new("id").with("id", 1).with("amount", 3),
        ];
        let mut indices = vec![0, 1];
        sort_indices(
            &records,
            &mut indices,
            &SortSpec::ascending("amount"),
            NullPosition::First,
        );
        assert_eq!(indices, vec![0, 1]);
    }
}
