//! Chart visibility under filter checkboxes
//!
//! Every (field, value) pair of the GroupBy fields has a checkbox, checked at
//! start. Unchecking a box increments the `hidden_by` counter of every chart
//! whose key holds that value; re-checking decrements it. A chart is hidden
//! while its counter is above zero, so a chart excluded by two boxes stays
//! hidden until both are checked again.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::key::FieldValues;

/// A checkbox changed state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterEvent {
    pub field: String,
    pub value: String,
    pub checked: bool,
}

impl FilterEvent {
    pub fn uncheck(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            checked: false,
        }
    }

    pub fn check(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            checked: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// A chart whose visibility flipped after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibilityChange {
    pub chart: usize,
    pub visibility: Visibility,
}

#[derive(Debug, Clone)]
struct ChartFilter {
    key: FieldValues,
    hidden_by: u32,
}

/// Hide/show state of one suite's charts
#[derive(Debug, Clone)]
pub struct FilterState {
    charts: Vec<ChartFilter>,
    /// Every (field, value) pair some chart carries
    checkboxes: HashSet<(String, String)>,
    unchecked: HashSet<(String, String)>,
}

impl FilterState {
    /// Start with every chart visible and every checkbox checked
    pub fn new<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a FieldValues>,
    {
        let charts: Vec<ChartFilter> = keys
            .into_iter()
            .map(|key| ChartFilter {
                key: key.clone(),
                hidden_by: 0,
            })
            .collect();

        let checkboxes = charts
            .iter()
            .flat_map(|chart| chart.key.iter())
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect();

        Self {
            charts,
            checkboxes,
            unchecked: HashSet::new(),
        }
    }

    /// Apply a checkbox event and report the charts whose visibility flipped
    ///
    /// Events that do not change a checkbox (unknown pair, or a box already
    /// in the requested state) leave every counter untouched.
    pub fn apply(&mut self, event: &FilterEvent) -> Vec<VisibilityChange> {
        let pair = (event.field.clone(), event.value.clone());
        if !self.checkboxes.contains(&pair) {
            tracing::debug!(field = %event.field, value = %event.value, "ignoring unknown filter");
            return Vec::new();
        }

        let changed = if event.checked {
            self.unchecked.remove(&pair)
        } else {
            self.unchecked.insert(pair)
        };
        if !changed {
            return Vec::new();
        }

        let mut changes = Vec::new();
        for (chart, filter) in self.charts.iter_mut().enumerate() {
            if !filter.key.matches(&event.field, &event.value) {
                continue;
            }

            let was_hidden = filter.hidden_by > 0;
            if event.checked {
                filter.hidden_by = filter.hidden_by.saturating_sub(1);
            } else {
                filter.hidden_by += 1;
            }
            let is_hidden = filter.hidden_by > 0;

            if was_hidden != is_hidden {
                changes.push(VisibilityChange {
                    chart,
                    visibility: if is_hidden {
                        Visibility::Hidden
                    } else {
                        Visibility::Visible
                    },
                });
            }
        }

        changes
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn hidden_by(&self, chart: usize) -> Option<u32> {
        self.charts.get(chart).map(|c| c.hidden_by)
    }

    pub fn visibility(&self, chart: usize) -> Option<Visibility> {
        self.hidden_by(chart).map(|count| {
            if count > 0 {
                Visibility::Hidden
            } else {
                Visibility::Visible
            }
        })
    }

    pub fn is_hidden(&self, chart: usize) -> bool {
        self.hidden_by(chart).map_or(false, |count| count > 0)
    }

    pub fn is_checked(&self, field: &str, value: &str) -> bool {
        !self
            .unchecked
            .contains(&(field.to_string(), value.to_string()))
    }

    /// Indices of charts currently shown
    pub fn visible_charts(&self) -> impl Iterator<Item = usize> + '_ {
        self.charts
            .iter()
            .enumerate()
            .filter(|(_, c)| c.hidden_by == 0)
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyCodec;
    use pretty_assertions::assert_eq;

    fn keys(rows: &[(&str, &str)]) -> Vec<FieldValues> {
        let codec = KeyCodec::new(["os", "keySize"]);
        rows.iter()
            .map(|(os, size)| {
                codec
                    .decode(&format!(r#"{{"os":"{}","keySize":"{}"}}"#, os, size))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_overlapping_filters_need_both_rechecked() {
        let keys = keys(&[("linux", "512")]);
        let mut state = FilterState::new(&keys);
        assert_eq!(state.visibility(0), Some(Visibility::Visible));

        let changes = state.apply(&FilterEvent::uncheck("os", "linux"));
        assert_eq!(state.hidden_by(0), Some(1));
        assert!(state.is_hidden(0));
        assert_eq!(
            changes,
            vec![VisibilityChange {
                chart: 0,
                visibility: Visibility::Hidden
            }]
        );

        let changes = state.apply(&FilterEvent::uncheck("keySize", "512"));
        assert_eq!(state.hidden_by(0), Some(2));
        assert!(changes.is_empty());

        let changes = state.apply(&FilterEvent::check("os", "linux"));
        assert_eq!(state.hidden_by(0), Some(1));
        assert!(state.is_hidden(0));
        assert!(changes.is_empty());

        let changes = state.apply(&FilterEvent::check("keySize", "512"));
        assert_eq!(state.hidden_by(0), Some(0));
        assert!(!state.is_hidden(0));
        assert_eq!(
            changes,
            vec![VisibilityChange {
                chart: 0,
                visibility: Visibility::Visible
            }]
        );
    }

    #[test]
    fn test_uncheck_hides_only_matching_charts() {
        let keys = keys(&[("linux", "512"), ("macos", "512"), ("linux", "1024")]);
        let mut state = FilterState::new(&keys);

        state.apply(&FilterEvent::uncheck("os", "linux"));
        assert_eq!(state.visible_charts().collect::<Vec<_>>(), vec![1]);

        state.apply(&FilterEvent::uncheck("keySize", "512"));
        assert!(state.visible_charts().next().is_none());
        assert_eq!(state.hidden_by(0), Some(2));
        assert_eq!(state.hidden_by(1), Some(1));
        assert_eq!(state.hidden_by(2), Some(1));

        state.apply(&FilterEvent::check("keySize", "512"));
        assert_eq!(state.visible_charts().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_repeated_events_do_not_drift() {
        let keys = keys(&[("linux", "512")]);
        let mut state = FilterState::new(&keys);

        state.apply(&FilterEvent::uncheck("os", "linux"));
        state.apply(&FilterEvent::uncheck("os", "linux"));
        assert_eq!(state.hidden_by(0), Some(1));
        assert!(!state.is_checked("os", "linux"));

        state.apply(&FilterEvent::check("os", "linux"));
        state.apply(&FilterEvent::check("os", "linux"));
        assert_eq!(state.hidden_by(0), Some(0));
        assert!(state.is_checked("os", "linux"));

        // Checking a box that was never unchecked is a no-op.
        state.apply(&FilterEvent::check("keySize", "512"));
        assert_eq!(state.hidden_by(0), Some(0));
    }

    #[test]
    fn test_unknown_pair_is_ignored() {
        let keys = keys(&[("linux", "512")]);
        let mut state = FilterState::new(&keys);

        assert!(state.apply(&FilterEvent::uncheck("os", "windows")).is_empty());
        assert!(state.apply(&FilterEvent::uncheck("arch", "x86")).is_empty());
        assert_eq!(state.hidden_by(0), Some(0));
        assert_eq!(state.hidden_by(5), None);
    }

    #[test]
    fn test_hidden_iff_counter_positive_over_toggle_sequence() {
        let keys = keys(&[
            ("linux", "512"),
            ("macos", "512"),
            ("linux", "1024"),
            ("macos", "1024"),
        ]);
        let mut state = FilterState::new(&keys);
        let events = [
            FilterEvent::uncheck("os", "macos"),
            FilterEvent::uncheck("keySize", "1024"),
            FilterEvent::uncheck("os", "linux"),
            FilterEvent::check("os", "macos"),
            FilterEvent::uncheck("keySize", "512"),
            FilterEvent::check("keySize", "1024"),
            FilterEvent::check("os", "linux"),
            FilterEvent::check("keySize", "512"),
        ];

        for event in &events {
            state.apply(event);
            for chart in 0..state.len() {
                let hidden_by = state.hidden_by(chart).unwrap();
                assert_eq!(state.is_hidden(chart), hidden_by > 0);

                // The counter equals the number of unchecked boxes matching the chart.
                let expected = keys[chart]
                    .iter()
                    .filter(|(field, value)| !state.is_checked(field, value))
                    .count() as u32;
                assert_eq!(hidden_by, expected);
            }
        }
        assert_eq!(state.visible_charts().count(), 4);
    }
}
