//! Navigation over untyped JSON trees.

use serde_json::Value;

/// Follow `path` through nested objects.
pub fn lookup<'v>(root: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(root, |node, key| node.as_object()?.get(*key))
}

/// Depth-first search for the first array whose first element is an object
/// carrying at least one of `fields`.
///
/// Uses an explicit stack instead of recursion. Nodes deeper than `max_depth`
/// (the root is depth 0) are never inspected. Both object values and array
/// elements are descended into, in document order.
pub fn find_record_list<'v>(
    root: &'v Value,
    fields: &[&str],
    max_depth: usize,
) -> Option<&'v Vec<Value>> {
    let mut stack: Vec<(&Value, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        match node {
            Value::Array(items) => {
                if looks_like_records(items, fields) {
                    return Some(items);
                }
                if depth < max_depth {
                    stack.extend(items.iter().rev().map(|child| (child, depth + 1)));
                }
            }
            Value::Object(map) => {
                if depth < max_depth {
                    stack.extend(map.values().rev().map(|child| (child, depth + 1)));
                }
            }
            _ => {}
        }
    }

    None
}

fn looks_like_records(items: &[Value], fields: &[&str]) -> bool {
    items
        .first()
        .and_then(Value::as_object)
        .is_some_and(|first| fields.iter().any(|f| first.contains_key(*f)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[&str] = &["title", "applyLink", "careerLink"];

    #[test]
    fn lookup_follows_objects_only() {
        let data = json!({"a": {"b": {"c": [1, 2]}}, "list": [{"x": 1}]});
        assert_eq!(lookup(&data, &["a", "b", "c"]), Some(&json!([1, 2])));
        assert!(lookup(&data, &["a", "missing"]).is_none());
        assert!(lookup(&data, &["list", "x"]).is_none());
        assert_eq!(lookup(&data, &[]), Some(&data));
    }

    #[test]
    fn finds_first_matching_list_in_document_order() {
        let data = json!({
            "meta": {"tags": ["a", "b"]},
            "first": {"items": [{"careerLink": "/careers/1"}]},
            "second": {"items": [{"title": "later"}]}
        });
        let found = find_record_list(&data, FIELDS, 5).expect("found");
        assert_eq!(found[0]["careerLink"], "/careers/1");
    }

    #[test]
    fn ignores_lists_whose_first_element_is_not_a_record() {
        let data = json!({
            "mixed": ["string first", {"title": "hidden"}],
            "jobs": [{"title": "visible"}]
        });
        let found = find_record_list(&data, FIELDS, 5).expect("found");
        assert_eq!(found[0]["title"], "visible");
    }

    #[test]
    fn descends_into_arrays() {
        let data = json!({"pages": [{"section": {"postings": [{"title": "nested"}]}}]});
        let found = find_record_list(&data, FIELDS, 5).expect("found");
        assert_eq!(found[0]["title"], "nested");
    }

    #[test]
    fn respects_depth_cap() {
        // The list sits at depth 5: reachable with cap 5, not with cap 4.
        let data = json!({"a": {"b": {"c": {"d": {"jobs": [{"title": "deep"}]}}}}});
        assert!(find_record_list(&data, FIELDS, 5).is_some());
        assert!(find_record_list(&data, FIELDS, 4).is_none());

        let too_deep = json!({"a": {"b": {"c": {"d": {"e": {"jobs": [{"title": "deeper"}]}}}}}});
        assert!(find_record_list(&too_deep, FIELDS, 5).is_none());
    }
}
