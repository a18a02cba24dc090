//! Grouping traces into charts

use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;

use crate::key::{FieldValues, Fields};
use crate::schema::GroupBy;
use crate::trace::Trace;

/// Traces sharing identical GroupBy values; rendered as one chart
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: FieldValues,
    pub traces: Vec<Trace>,
}

impl Group {
    /// Encoded group key
    pub fn id(&self) -> String {
        self.key.to_key()
    }
}

impl Fields for Group {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.key.field(name)
    }
}

/// Distinct values of one GroupBy field, in order of first appearance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValueSet {
    pub field: String,
    pub values: Vec<String>,
}

/// Partition traces by their GroupBy sub-key
///
/// Groups appear in the order their key is first seen, and each keeps its
/// traces in input order.
pub fn group_traces(traces: Vec<Trace>, group_by: &GroupBy) -> Vec<Group> {
    let codec = group_by.codec();
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for trace in traces {
        let key = codec.values(&trace);
        let slot = *index.entry(key.to_key()).or_insert_with(|| {
            groups.push(Group {
                key,
                traces: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].traces.push(trace);
    }

    groups
}

/// Distinct values per GroupBy field across `records`
pub fn distinct_values<'a, R, I>(records: I, group_by: &GroupBy) -> Vec<FieldValueSet>
where
    R: Fields + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let codec = group_by.codec();
    let mut sets: Vec<FieldValueSet> = group_by
        .fields()
        .iter()
        .map(|field| FieldValueSet {
            field: field.clone(),
            values: Vec::new(),
        })
        .collect();

    for record in records {
        let key = codec.values(record);
        for (set, (_, value)) in sets.iter_mut().zip(key.iter()) {
            if !set.values.iter().any(|v| v == value) {
                set.values.push(value.to_string());
            }
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::trace::build_traces;
    use crate::trace::tests::{bench, entry};
    use pretty_assertions::assert_eq;

    fn traces() -> Vec<Trace> {
        let entries = vec![
            entry(
                "aaaaaaa",
                1,
                vec![
                    bench("sign", 10.0, "linux", 512),
                    bench("sign", 12.0, "macos", 512),
                ],
            ),
            entry(
                "aaaaaaa",
                2,
                vec![
                    bench("sign", 11.0, "linux", 512),
                    bench("sign", 40.0, "linux", 1024),
                ],
            ),
            entry("bbbbbbb", 3, vec![bench("sign", 13.0, "macos", 1024)]),
        ];
        build_traces(
            &entries,
            &Schema::new(["name", "os", "keySize"]),
            &GroupBy::new(["os"]),
        )
    }

    #[test]
    fn test_two_os_values_make_two_groups() {
        let groups = group_traces(traces(), &GroupBy::new(["os"]));

        assert_eq!(groups.len(), 2);
        for group in &groups {
            let os = group.key.get("os").unwrap();
            assert!(group.traces.iter().all(|t| t.key.get("os") == Some(os)));
        }
        assert_eq!(groups[0].key.get("os"), Some("linux"));
        assert_eq!(groups[0].traces.len(), 2);
        assert_eq!(groups[1].key.get("os"), Some("macos"));
        assert_eq!(groups[1].traces.len(), 2);
    }

    #[test]
    fn test_every_trace_lands_in_exactly_one_group() {
        let all = traces();
        let total = all.len();
        let groups = group_traces(all, &GroupBy::new(["os", "keySize"]));

        assert_eq!(groups.len(), 4);
        assert_eq!(groups.iter().map(|g| g.traces.len()).sum::<usize>(), total);
        assert_eq!(groups[0].id(), r#"{"os":"linux","keySize":"512"}"#);
    }

    #[test]
    fn test_empty_group_by_makes_one_group() {
        let groups = group_traces(traces(), &GroupBy::new(Vec::<String>::new()));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id(), "{}");
    }

    #[test]
    fn test_distinct_values_in_first_appearance_order() {
        let all = traces();
        let sets = distinct_values(&all, &GroupBy::new(["keySize", "os"]));

        assert_eq!(
            sets,
            vec![
                FieldValueSet {
                    field: "keySize".to_string(),
                    values: vec!["512".to_string(), "1024".to_string()],
                },
                FieldValueSet {
                    field: "os".to_string(),
                    values: vec!["linux".to_string(), "macos".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_group_by_field_outside_schema_is_sentinel() {
        let groups = group_traces(traces(), &GroupBy::new(["arch"]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key.get("arch"), Some(crate::key::SENTINEL));
    }
}
