//! Query builder over entries.
//!
//! Executes against an in-memory snapshot taken from the store. All applied
//! predicates are ANDed together; `where_in` is an OR of equalities on one
//! field. Sorting is stable — equal keys keep the snapshot's relative
//! order, which is the store's iteration order.
//!
//! Unknown field names are deliberately permissive: in a predicate they
//! compare as absent (null), in an ordering they sort lowest. This mirrors
//! how loosely-typed front matter behaves and is documented rather than
//! enforced away.

use crate::model::{Entry, SortDirection};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operator for [`EntryQuery::where_`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Substring match, case-insensitive, with `%` wildcard markers
    /// (`%needle%`, `needle%`, `%needle`).
    Like,
}

#[derive(Debug, Clone)]
enum Predicate {
    Where {
        field: String,
        op: Operator,
        value: Value,
    },
    WhereIn {
        field: String,
        values: Vec<Value>,
    },
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub per_page: usize,
    pub current_page: usize,
}

impl<T> Paginated<T> {
    pub fn has_more_pages(&self) -> bool {
        self.current_page.saturating_mul(self.per_page) < self.total
    }

    pub fn last_page(&self) -> usize {
        if self.per_page == 0 {
            return 1;
        }
        self.total.div_ceil(self.per_page).max(1)
    }
}

#[derive(Debug, Clone)]
pub struct EntryQuery {
    entries: Vec<Entry>,
    predicates: Vec<Predicate>,
    ordering: Vec<(String, SortDirection)>,
}

impl EntryQuery {
    /// Build a query over a snapshot of entries, usually obtained from
    /// [`ContentRepository::query_entries`](crate::repo::ContentRepository::query_entries).
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            predicates: Vec::new(),
            ordering: Vec::new(),
        }
    }

    pub fn where_(mut self, field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Where {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_in(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.predicates.push(Predicate::WhereIn {
            field: field.into(),
            values,
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.ordering.push((field.into(), direction));
        self
    }

    pub fn get(self) -> Vec<Entry> {
        let Self {
            entries,
            predicates,
            ordering,
        } = self;

        let mut matched: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| predicates.iter().all(|p| matches(entry, p)))
            .collect();

        if !ordering.is_empty() {
            matched.sort_by(|a, b| {
                for (field, direction) in &ordering {
                    let cmp = compare_values(&a.value(field), &b.value(field));
                    let cmp = match direction {
                        SortDirection::Asc => cmp,
                        SortDirection::Desc => cmp.reverse(),
                    };
                    if cmp != Ordering::Equal {
                        return cmp;
                    }
                }
                Ordering::Equal
            });
        }

        matched
    }

    pub fn count(self) -> usize {
        self.get().len()
    }

    /// Page 1 starts at offset 0. Requesting a page past the last returns
    /// an empty item set, not an error.
    pub fn paginate(self, per_page: usize, page: usize) -> Paginated<Entry> {
        let all = self.get();
        let total = all.len();
        let page = page.max(1);
        let offset = (page - 1).saturating_mul(per_page);
        let items = all.into_iter().skip(offset).take(per_page).collect();

        Paginated {
            items,
            total,
            per_page,
            current_page: page,
        }
    }
}

fn matches(entry: &Entry, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Where { field, op, value } => {
            let actual = entry.value(field);
            match op {
                Operator::Like => like_matches(&actual, value),
                Operator::Eq => compare_values(&actual, &Some(value.clone())) == Ordering::Equal,
                Operator::Ne => compare_values(&actual, &Some(value.clone())) != Ordering::Equal,
                Operator::Gt => compare_values(&actual, &Some(value.clone())) == Ordering::Greater,
                Operator::Gte => compare_values(&actual, &Some(value.clone())) != Ordering::Less,
                Operator::Lt => compare_values(&actual, &Some(value.clone())) == Ordering::Less,
                Operator::Lte => {
                    compare_values(&actual, &Some(value.clone())) != Ordering::Greater
                }
            }
        }
        Predicate::WhereIn { field, values } => {
            let actual = entry.value(field);
            values
                .iter()
                .any(|v| compare_values(&actual, &Some(v.clone())) == Ordering::Equal)
        }
    }
}

fn like_matches(actual: &Option<Value>, pattern: &Value) -> bool {
    let Some(actual) = actual else { return false };
    let haystack = value_to_string(actual).to_lowercase();
    let pattern = value_to_string(pattern).to_lowercase();

    let leading = pattern.starts_with('%');
    let trailing = pattern.ends_with('%') && pattern.len() > 1;
    let needle = pattern.trim_matches('%');

    match (leading, trailing) {
        (true, true) => haystack.contains(needle),
        (true, false) => haystack.ends_with(needle),
        (false, true) => haystack.starts_with(needle),
        (false, false) => haystack == needle,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Total ordering over optional JSON values. Absent and null sort lowest;
/// mixed types rank null < bool < number < string < array < object.
fn compare_values(a: &Option<Value>, b: &Option<Value>) -> Ordering {
    let rank_a = type_rank(a);
    let rank_b = type_rank(b);
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => value_to_string(x).cmp(&value_to_string(y)),
        _ => Ordering::Equal,
    }
}

fn type_rank(value: &Option<Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(specs: &[(&str, &str)]) -> Vec<Entry> {
        specs
            .iter()
            .map(|(slug, title)| Entry::new("blog", "en", *slug, *title))
            .collect()
    }

    #[test]
    fn predicates_are_a_conjunction() {
        let mut list = entries(&[("a", "Alpha"), ("b", "Beta")]);
        list[1].site = "fr".to_string();

        let results = EntryQuery::new(list)
            .where_("collection", Operator::Eq, "blog")
            .where_("site", Operator::Eq, "en")
            .get();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].slug, "a");
    }

    #[test]
    fn where_in_is_an_or_of_equalities() {
        let mut list = entries(&[("a", "Alpha"), ("b", "Beta"), ("c", "Gamma")]);
        list[1].collection = "pages".to_string();
        list[2].collection = "news".to_string();

        let results = EntryQuery::new(list)
            .where_in("collection", vec![json!("blog"), json!("news")])
            .get();

        assert_eq!(results.len(), 2);
    }

    #[test]
    fn like_is_case_insensitive_substring() {
        let list = entries(&[("a", "Hello World"), ("b", "Goodbye")]);

        let results = EntryQuery::new(list.clone())
            .where_("title", Operator::Like, "%world%")
            .get();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].slug, "a");

        let prefix = EntryQuery::new(list.clone())
            .where_("title", Operator::Like, "hello%")
            .get();
        assert_eq!(prefix.len(), 1);

        let exact = EntryQuery::new(list)
            .where_("title", Operator::Like, "goodbye")
            .get();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].slug, "b");
    }

    #[test]
    fn sorting_is_stable_for_equal_keys() {
        let mut list = entries(&[("first", "Same"), ("second", "Same"), ("third", "Aaa")]);
        list[2].title = "Aaa".to_string();

        let results = EntryQuery::new(list)
            .order_by("title", SortDirection::Asc)
            .get();

        assert_eq!(results[0].slug, "third");
        // Equal titles keep snapshot order.
        assert_eq!(results[1].slug, "first");
        assert_eq!(results[2].slug, "second");
    }

    #[test]
    fn unknown_fields_sort_lowest_and_never_error() {
        let mut list = entries(&[("a", "Alpha"), ("b", "Beta")]);
        list[1]
            .data
            .insert("rating".to_string(), json!(5));

        let results = EntryQuery::new(list.clone())
            .order_by("rating", SortDirection::Asc)
            .get();
        assert_eq!(results[0].slug, "a"); // absent field sorts first

        let filtered = EntryQuery::new(list)
            .where_("rating", Operator::Eq, 5)
            .get();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].slug, "b");
    }

    #[test]
    fn numeric_comparisons() {
        let mut list = entries(&[("a", "A"), ("b", "B"), ("c", "C")]);
        list[0].order = Some(1);
        list[1].order = Some(2);
        list[2].order = Some(3);

        let results = EntryQuery::new(list)
            .where_("order", Operator::Gte, 2)
            .order_by("order", SortDirection::Desc)
            .get();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].slug, "c");
    }

    #[test]
    fn pagination_of_25_entries_by_10() {
        let list: Vec<Entry> = (0..25)
            .map(|i| Entry::new("blog", "en", format!("e{i:02}"), format!("Entry {i:02}")))
            .collect();

        let page1 = EntryQuery::new(list.clone()).paginate(10, 1);
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page1.total, 25);
        assert!(page1.has_more_pages());
        assert_eq!(page1.last_page(), 3);

        let page3 = EntryQuery::new(list.clone()).paginate(10, 3);
        assert_eq!(page3.items.len(), 5);
        assert!(!page3.has_more_pages());

        let page4 = EntryQuery::new(list).paginate(10, 4);
        assert!(page4.items.is_empty());
        assert_eq!(page4.total, 25);
    }

    #[test]
    fn count_applies_predicates() {
        let list = entries(&[("a", "Alpha"), ("b", "Beta")]);
        let count = EntryQuery::new(list)
            .where_("title", Operator::Like, "%alp%")
            .count();
        assert_eq!(count, 1);
    }
}
