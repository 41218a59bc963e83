//! Declarative filter controls and their live values.
//!
//! A [`FilterOption`] describes one control (its widget type and choices).
//! The values bound to those controls are projected into [`FilterValue`]s
//! for display and, for options bound to a record field, into
//! [`FilterRule`]s for the grid pipeline.

use crate::config::GridConfig;
use crate::debounce::Debouncer;
use crate::error::GridError;
use crate::filter::{FilterOperator, FilterRule};
use crate::prefs::PreferenceStore;
use crate::value::{Value, parse_date};
use chrono::{DateTime, Days, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Live values keyed by option id.
pub type FilterValues = IndexMap<String, Value>;

/// Called with the active filters each time the panel applies.
pub type ChangeCallback = Box<dyn FnMut(&[FilterValue]) + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    Text,
    Select,
    Checkbox,
    Radio,
    Range,
    Date,
    DateRange,
}

/// One selectable choice of a select, radio or checkbox option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterChoice {
    pub value: Value,
    #[serde(default)]
    pub label: String,
}

impl FilterChoice {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// The label, or the value itself when no label was given.
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            self.value.to_display_string()
        } else {
            self.label.clone()
        }
    }
}

/// Schema for one filter control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(default)]
    pub options: Vec<FilterChoice>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub is_multi: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Record path this option constrains; unbound options only display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<FilterOperator>,
}

impl FilterOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            filter_type,
            options: Vec::new(),
            default_value: None,
            is_multi: false,
            suffix: None,
            placeholder: None,
            field: None,
            operator: None,
        }
    }

    pub fn with_choices(mut self, choices: Vec<FilterChoice>) -> Self {
        self.options = choices;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn multi(mut self) -> Self {
        self.is_multi = true;
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Bind to a record path with the type's default operator.
    pub fn bind(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn bind_with(mut self, field: impl Into<String>, operator: FilterOperator) -> Self {
        self.field = Some(field.into());
        self.operator = Some(operator);
        self
    }

    fn choice_label(&self, value: &Value) -> String {
        self.options
            .iter()
            .find(|c| &c.value == value)
            .map(FilterChoice::display_label)
            .unwrap_or_else(|| value.to_display_string())
    }
}

/// A titled set of options shown together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub id: String,
    pub label: String,
    pub options: Vec<FilterOption>,
    #[serde(default)]
    pub collapsible: bool,
}

/// One active filter with its human-readable summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterValue {
    pub id: String,
    pub label: String,
    pub value: Value,
    pub display_value: String,
}

/// Active filters, in option order. Options whose value is missing, null,
/// empty string, empty array or empty object are dropped.
pub fn project_active_filters(values: &FilterValues, options: &[FilterOption]) -> Vec<FilterValue> {
    options
        .iter()
        .filter_map(|option| {
            let value = values.get(&option.id)?;
            if value.is_blank() {
                return None;
            }
            Some(FilterValue {
                id: option.id.clone(),
                label: option.label.clone(),
                value: value.clone(),
                display_value: display_value(option, value),
            })
        })
        .collect()
}

/// Every option reset to its declared default; options without one are
/// left out.
pub fn clear_filters(options: &[FilterOption]) -> FilterValues {
    options
        .iter()
        .filter_map(|o| Some((o.id.clone(), o.default_value.clone()?)))
        .collect()
}

/// Summary text for one option's value.
pub fn display_value(option: &FilterOption, value: &Value) -> String {
    match (option.filter_type, value) {
        (FilterType::Range, v) => {
            let suffix = option.suffix.as_deref().unwrap_or("");
            format!("{}{suffix}", range_text(v))
        }
        (FilterType::Date, v) => date_text(v),
        (FilterType::DateRange, v) => date_range_text(v),
        (_, Value::Array(items)) => items
            .iter()
            .map(|v| option.choice_label(v))
            .collect::<Vec<_>>()
            .join(", "),
        (FilterType::Text, v) => v.to_display_string(),
        (FilterType::Checkbox, Value::Bool(true)) => option.label.clone(),
        (FilterType::Checkbox, Value::Bool(false)) => "No".to_string(),
        (FilterType::Select | FilterType::Radio | FilterType::Checkbox, v) => {
            option.choice_label(v)
        }
    }
}

/// `M/D/YYYY`.
pub fn format_locale_date(date: &DateTime<Utc>) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn range_text(value: &Value) -> String {
    match value {
        Value::Array(bounds) if bounds.len() == 2 => {
            let side = |v: &Value| {
                if v.is_null() {
                    String::new()
                } else {
                    v.to_display_string()
                }
            };
            format!("{} - {}", side(&bounds[0]), side(&bounds[1]))
        }
        other => other.to_display_string(),
    }
}

fn date_text(value: &Value) -> String {
    match value {
        Value::Date(d) => format_locale_date(d),
        Value::String(s) => parse_date(s)
            .map(|d| format_locale_date(&d))
            .unwrap_or_else(|| s.clone()),
        other => other.to_display_string(),
    }
}

fn date_range_text(value: &Value) -> String {
    let Value::Object(range) = value else {
        return date_text(value);
    };
    ["from", "to"]
        .iter()
        .filter_map(|side| range.get(*side).filter(|v| !v.is_blank()))
        .map(date_text)
        .collect::<Vec<_>>()
        .join(" - ")
}

fn as_date_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Date(d) => Some(*d),
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

fn next_day(date: DateTime<Utc>) -> Option<Value> {
    date.checked_add_days(Days::new(1)).map(Value::Date)
}

fn option_rules(option: &FilterOption, field: &str, value: &Value, out: &mut Vec<FilterRule>) {
    match (option.filter_type, value) {
        (FilterType::DateRange, Value::Object(range)) => {
            if let Some(from) = range.get("from").and_then(as_date_value) {
                out.push(FilterRule::new(field, FilterOperator::Gte, from));
            }
            if let Some(to) = range.get("to").and_then(as_date_value).and_then(next_day) {
                out.push(FilterRule::new(field, FilterOperator::Lt, to));
            }
        }
        (FilterType::Range, Value::Array(bounds)) => {
            if let Some(min) = bounds.first().filter(|v| !v.is_blank()) {
                out.push(FilterRule::new(field, FilterOperator::Gte, min.clone()));
            }
            if let Some(max) = bounds.get(1).filter(|v| !v.is_blank()) {
                out.push(FilterRule::new(field, FilterOperator::Lte, max.clone()));
            }
        }
        (_, Value::Array(_)) => {
            log::debug!(
                "Filter '{}' holds several values; rules are AND-only, skipping",
                option.id
            );
        }
        (FilterType::Date, v) => {
            let Some(day) = as_date_value(v) else {
                return;
            };
            match &option.operator {
                Some(op) => out.push(FilterRule::new(field, op.clone(), day)),
                None => {
                    out.push(FilterRule::new(field, FilterOperator::Gte, day));
                    if let Some(end) = next_day(day) {
                        out.push(FilterRule::new(field, FilterOperator::Lt, end));
                    }
                }
            }
        }
        (filter_type, v) => {
            let operator = option.operator.clone().unwrap_or(match filter_type {
                FilterType::Text => FilterOperator::Contains,
                FilterType::Range => FilterOperator::Lte,
                _ => FilterOperator::Eq,
            });
            out.push(FilterRule::new(field, operator, v.clone()));
        }
    }
}

/// Values, dirty flag and apply cycle for a set of filter options.
///
/// In manual mode every change marks the panel dirty until [`apply`]. In
/// auto-submit mode changes arm a debouncer instead, and [`tick`] applies
/// once the quiet period has passed without further changes.
///
/// [`apply`]: FilterPanel::apply
/// [`tick`]: FilterPanel::tick
pub struct FilterPanel {
    groups: Vec<FilterGroup>,
    options: Vec<FilterOption>,
    values: FilterValues,
    dirty: bool,
    auto_submit: bool,
    debouncer: Debouncer,
    on_change: Option<ChangeCallback>,
    applied: Vec<FilterValue>,
}

impl FilterPanel {
    /// A panel with every option at its default value.
    pub fn new(options: Vec<FilterOption>) -> Self {
        let values = clear_filters(&options);
        Self {
            groups: Vec::new(),
            options,
            values,
            dirty: false,
            auto_submit: false,
            debouncer: Debouncer::default(),
            on_change: None,
            applied: Vec::new(),
        }
    }

    pub fn from_groups(groups: Vec<FilterGroup>) -> Self {
        let options = groups.iter().flat_map(|g| g.options.iter().cloned()).collect();
        let mut panel = Self::new(options);
        panel.groups = groups;
        panel
    }

    /// A panel using the config's submit mode and quiet period.
    pub fn from_config(options: Vec<FilterOption>, config: &GridConfig) -> Self {
        let mut panel = Self::new(options);
        panel.debouncer = Debouncer::new(config.debounce());
        panel.auto_submit = config.auto_submit;
        panel
    }

    /// Switch to auto-submit with the given quiet period.
    pub fn with_auto_submit(mut self, quiet: Duration) -> Self {
        self.auto_submit = true;
        self.debouncer = Debouncer::new(quiet);
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&[FilterValue]) + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    pub fn values(&self) -> &FilterValues {
        &self.values
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_auto_submit(&self) -> bool {
        self.auto_submit
    }

    pub fn quiet_period(&self) -> Duration {
        self.debouncer.quiet_period()
    }

    /// Whether an auto-submit is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Filters delivered by the last apply.
    pub fn applied(&self) -> &[FilterValue] {
        &self.applied
    }

    fn option(&self, id: &str) -> Result<&FilterOption, GridError> {
        self.options
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| GridError::UnknownFilter(id.to_string()))
    }

    fn mark_changed(&mut self, now: Instant) {
        self.dirty = true;
        if self.auto_submit {
            self.debouncer.arm(now);
        }
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<Value>, now: Instant) -> Result<(), GridError> {
        self.option(id)?;
        self.values.insert(id.to_string(), value.into());
        self.mark_changed(now);
        Ok(())
    }

    pub fn clear_value(&mut self, id: &str, now: Instant) -> Result<(), GridError> {
        self.option(id)?;
        self.values.shift_remove(id);
        self.mark_changed(now);
        Ok(())
    }

    /// Add or remove one choice of a multi-select option. Removing the last
    /// choice removes the value entirely.
    pub fn toggle_choice(&mut self, id: &str, choice: impl Into<Value>, now: Instant) -> Result<(), GridError> {
        if !self.option(id)?.is_multi {
            return Err(GridError::NotMulti(id.to_string()));
        }
        let choice = choice.into();
        let mut selected = match self.values.shift_remove(id) {
            Some(Value::Array(items)) => items,
            Some(v) if !v.is_blank() => vec![v],
            _ => Vec::new(),
        };
        if let Some(pos) = selected.iter().position(|v| *v == choice) {
            selected.remove(pos);
        } else {
            selected.push(choice);
        }
        if !selected.is_empty() {
            self.values.insert(id.to_string(), Value::Array(selected));
        }
        self.mark_changed(now);
        Ok(())
    }

    /// Reset every option to its default.
    pub fn clear_all(&mut self, now: Instant) {
        self.values = clear_filters(&self.options);
        self.mark_changed(now);
    }

    pub fn active_filters(&self) -> Vec<FilterValue> {
        project_active_filters(&self.values, &self.options)
    }

    /// Deliver the active filters to the change callback and clear the
    /// dirty flag.
    pub fn apply(&mut self) -> Vec<FilterValue> {
        let active = self.active_filters();
        self.dirty = false;
        self.debouncer.cancel();
        if let Some(callback) = self.on_change.as_mut() {
            callback(&active);
        }
        log::debug!("Applied {} active filters", active.len());
        self.applied = active.clone();
        active
    }

    /// Drive auto-submit. Returns the applied filters when the quiet period
    /// has elapsed since the last change.
    pub fn tick(&mut self, now: Instant) -> Option<Vec<FilterValue>> {
        if self.auto_submit && self.debouncer.poll(now) {
            Some(self.apply())
        } else {
            None
        }
    }

    /// Pipeline rules for every active option bound to a record field.
    pub fn rules(&self) -> Vec<FilterRule> {
        let mut rules = Vec::new();
        for option in &self.options {
            let Some(field) = option.field.as_deref() else {
                continue;
            };
            let Some(value) = self.values.get(&option.id) else {
                continue;
            };
            if value.is_blank() {
                continue;
            }
            option_rules(option, field, value, &mut rules);
        }
        rules
    }

    /// Restore saved values for known options. Returns whether anything
    /// was loaded; read failures are logged and ignored.
    pub fn load_preferences(&mut self, store: &dyn PreferenceStore, key: &str) -> bool {
        let saved = match store.load(key) {
            Ok(Some(serde_json::Value::Object(saved))) => saved,
            Ok(_) => return false,
            Err(e) => {
                log::warn!("Could not load filter preferences '{key}': {e}");
                return false;
            }
        };
        let mut loaded = false;
        for (id, value) in saved {
            if self.options.iter().any(|o| o.id == id) {
                self.values.insert(id, Value::from(value));
                loaded = true;
            } else {
                log::debug!("Ignoring saved value for unknown filter '{id}'");
            }
        }
        loaded
    }

    /// Save current values. Fire-and-forget: failures are only logged.
    pub fn save_preferences(&self, store: &mut dyn PreferenceStore, key: &str) {
        let snapshot = serde_json::Value::Object(
            self.values
                .iter()
                .map(|(id, v)| (id.clone(), v.to_json()))
                .collect(),
        );
        if let Err(e) = store.save(key, snapshot) {
            log::warn!("Could not save filter preferences '{key}': {e}");
        }
    }
}

impl fmt::Debug for FilterPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPanel")
            .field("options", &self.options.len())
            .field("values", &self.values)
            .field("dirty", &self.dirty)
            .field("auto_submit", &self.auto_submit)
            .field("debouncer", &self.debouncer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn status_option() -> FilterOption {
        FilterOption::new("status", "Status", FilterType::Select)
            .with_choices(vec![
                FilterChoice::new("ACTIVE", "Active"),
                FilterChoice::new("PAUSED", "Paused"),
            ])
            .bind("status")
    }

    fn niche_option() -> FilterOption {
        FilterOption::new("niche", "Niche", FilterType::Checkbox)
            .with_choices(vec![
                FilterChoice::new("beauty", "Beauty"),
                FilterChoice::new("travel", "Travel"),
                FilterChoice::new("gaming", "Gaming"),
            ])
            .multi()
            .bind("niche")
    }

    fn values(pairs: Vec<(&str, Value)>) -> FilterValues {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_project_drops_blank_values() {
        let options = vec![
            FilterOption::new("q", "Search", FilterType::Text),
            status_option(),
            niche_option(),
            FilterOption::new("when", "When", FilterType::DateRange),
            FilterOption::new("missing", "Missing", FilterType::Text),
        ];
        let vals = values(vec![
            ("q", Value::from("")),
            ("status", Value::Null),
            ("niche", Value::from(json!([]))),
            ("when", Value::from(json!({}))),
        ]);
        assert!(project_active_filters(&vals, &options).is_empty());
    }

    #[test]
    fn test_project_keeps_option_order() {
        let options = vec![status_option(), FilterOption::new("q", "Search", FilterType::Text)];
        let vals = values(vec![("q", Value::from("jane")), ("status", Value::from("ACTIVE"))]);
        let active = project_active_filters(&vals, &options);
        let ids: Vec<&str> = active.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["status", "q"]);
        assert_eq!(active[0].display_value, "Active");
        assert_eq!(active[1].display_value, "jane");
    }

    #[test]
    fn test_display_select_falls_back_to_raw() {
        assert_eq!(display_value(&status_option(), &Value::from("DRAFT")), "DRAFT");
    }

    #[test]
    fn test_display_multi_checkbox_joins_labels() {
        let v = Value::from(json!(["travel", "beauty"]));
        assert_eq!(display_value(&niche_option(), &v), "Travel, Beauty");
    }

    #[test]
    fn test_display_single_checkbox() {
        let verified = FilterOption::new("verified", "Verified only", FilterType::Checkbox);
        assert_eq!(display_value(&verified, &Value::Bool(true)), "Verified only");
        assert_eq!(display_value(&verified, &Value::Bool(false)), "No");
    }

    #[test]
    fn test_display_range_with_suffix() {
        let option = FilterOption::new("er", "Engagement", FilterType::Range).with_suffix("%");
        assert_eq!(display_value(&option, &Value::from(4.5)), "4.5%");
        assert_eq!(display_value(&option, &Value::from(json!([2, 8]))), "2 - 8%");
        let plain = FilterOption::new("followers", "Followers", FilterType::Range);
        assert_eq!(display_value(&plain, &Value::from(10_000i64)), "10000");
    }

    #[test]
    fn test_display_dates() {
        let option = FilterOption::new("d", "Date", FilterType::Date);
        assert_eq!(display_value(&option, &Value::date(2024, 3, 5)), "3/5/2024");
        assert_eq!(display_value(&option, &Value::from("2024-12-25")), "12/25/2024");
        assert_eq!(display_value(&option, &Value::from("soon")), "soon");
    }

    #[test]
    fn test_display_date_range_omits_empty_side() {
        let option = FilterOption::new("when", "When", FilterType::DateRange);
        let both = Value::from(json!({"from": "2024-01-01", "to": "2024-01-31"}));
        assert_eq!(display_value(&option, &both), "1/1/2024 - 1/31/2024");
        let from_only = Value::from(json!({"from": "2024-01-01", "to": ""}));
        assert_eq!(display_value(&option, &from_only), "1/1/2024");
        let to_only = Value::from(json!({"to": "2024-01-31"}));
        assert_eq!(display_value(&option, &to_only), "1/31/2024");
    }

    #[test]
    fn test_clear_filters_restores_defaults() {
        let options = vec![
            status_option().with_default("ACTIVE"),
            FilterOption::new("q", "Search", FilterType::Text),
        ];
        let cleared = clear_filters(&options);
        assert_eq!(cleared.len(), 1);
        assert_eq!(cleared.get("status"), Some(&Value::from("ACTIVE")));
    }

    #[test]
    fn test_toggle_choice_sequence() {
        let t0 = Instant::now();
        let mut panel = FilterPanel::new(vec![niche_option()]);
        panel.toggle_choice("niche", "beauty", t0).unwrap();
        panel.toggle_choice("niche", "travel", t0).unwrap();
        panel.toggle_choice("niche", "beauty", t0).unwrap();
        assert_eq!(panel.value("niche"), Some(&Value::from(json!(["travel"]))));
        panel.toggle_choice("niche", "travel", t0).unwrap();
        assert_eq!(panel.value("niche"), None);
    }

    #[test]
    fn test_toggle_choice_requires_multi() {
        let mut panel = FilterPanel::new(vec![status_option()]);
        let err = panel.toggle_choice("status", "ACTIVE", Instant::now()).unwrap_err();
        assert!(matches!(err, GridError::NotMulti(_)));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let mut panel = FilterPanel::new(vec![status_option()]);
        let err = panel.set_value("brand", "Acme", Instant::now()).unwrap_err();
        assert!(matches!(err, GridError::UnknownFilter(id) if id == "brand"));
    }

    #[test]
    fn test_dirty_until_apply() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut panel = FilterPanel::new(vec![status_option()])
            .on_change(move |active| sink.borrow_mut().push(active.len()));
        assert!(!panel.is_dirty());
        panel.set_value("status", "ACTIVE", Instant::now()).unwrap();
        assert!(panel.is_dirty());
        // Manual mode never auto-applies.
        assert!(panel.tick(Instant::now() + Duration::from_secs(5)).is_none());
        let applied = panel.apply();
        assert_eq!(applied.len(), 1);
        assert!(!panel.is_dirty());
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(panel.applied(), applied.as_slice());
    }

    #[test]
    fn test_auto_submit_debounces() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let t0 = Instant::now();
        let ms = Duration::from_millis(1);
        let mut panel = FilterPanel::new(vec![status_option(), niche_option()])
            .with_auto_submit(Duration::from_millis(300))
            .on_change(move |_| *counter.borrow_mut() += 1);

        panel.set_value("status", "ACTIVE", t0).unwrap();
        panel.toggle_choice("niche", "beauty", t0 + 200 * ms).unwrap();
        assert!(panel.tick(t0 + 400 * ms).is_none());
        let applied = panel.tick(t0 + 500 * ms).unwrap();
        assert_eq!(applied.len(), 2);
        assert!(!panel.is_dirty());
        assert!(panel.tick(t0 + 900 * ms).is_none());
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_from_config_uses_debounce_setting() {
        let config = GridConfig::from_toml_str("auto_submit = true\ndebounce_ms = 150").unwrap();
        let t0 = Instant::now();
        let mut panel = FilterPanel::from_config(vec![status_option()], &config);
        assert!(panel.is_auto_submit());
        assert_eq!(panel.quiet_period(), Duration::from_millis(150));

        panel.set_value("status", "ACTIVE", t0).unwrap();
        assert!(panel.tick(t0 + Duration::from_millis(149)).is_none());
        assert_eq!(panel.tick(t0 + Duration::from_millis(150)).map(|a| a.len()), Some(1));

        let manual = FilterPanel::from_config(vec![status_option()], &GridConfig::default());
        assert!(!manual.is_auto_submit());
        assert_eq!(manual.quiet_period(), Duration::from_millis(300));
    }

    #[test]
    fn test_clear_all_marks_dirty() {
        let t0 = Instant::now();
        let mut panel = FilterPanel::new(vec![status_option().with_default("PAUSED")]);
        panel.set_value("status", "ACTIVE", t0).unwrap();
        panel.apply();
        panel.clear_all(t0);
        assert!(panel.is_dirty());
        assert_eq!(panel.value("status"), Some(&Value::from("PAUSED")));
    }

    #[test]
    fn test_from_groups_flattens() {
        let panel = FilterPanel::from_groups(vec![
            FilterGroup {
                id: "audience".to_string(),
                label: "Audience".to_string(),
                options: vec![niche_option()],
                collapsible: true,
            },
            FilterGroup {
                id: "state".to_string(),
                label: "State".to_string(),
                options: vec![status_option()],
                collapsible: false,
            },
        ]);
        let ids: Vec<&str> = panel.options().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["niche", "status"]);
        assert_eq!(panel.groups().len(), 2);
    }

    #[test]
    fn test_rules_projection() {
        let t0 = Instant::now();
        let mut panel = FilterPanel::new(vec![
            status_option(),
            niche_option(),
            FilterOption::new("q", "Name", FilterType::Text).bind("name"),
            FilterOption::new("followers", "Followers", FilterType::Range).bind("followers"),
            FilterOption::new("budget", "Budget", FilterType::Range)
                .bind_with("budget", FilterOperator::Gte),
            FilterOption::new("display", "Display only", FilterType::Text),
        ]);
        panel.set_value("status", "ACTIVE", t0).unwrap();
        panel.toggle_choice("niche", "beauty", t0).unwrap();
        panel.set_value("q", "jane", t0).unwrap();
        panel.set_value("followers", json!([1000, null]), t0).unwrap();
        panel.set_value("budget", 500i64, t0).unwrap();
        panel.set_value("display", "ignored", t0).unwrap();

        let rules = panel.rules();
        assert_eq!(
            rules,
            vec![
                FilterRule::eq("status", "ACTIVE"),
                FilterRule::new("name", FilterOperator::Contains, "jane"),
                FilterRule::new("followers", FilterOperator::Gte, 1000i64),
                FilterRule::new("budget", FilterOperator::Gte, 500i64),
            ]
        );
    }

    #[test]
    fn test_rules_for_dates() {
        let t0 = Instant::now();
        let mut panel = FilterPanel::new(vec![
            FilterOption::new("day", "Day", FilterType::Date).bind("postedAt"),
            FilterOption::new("window", "Window", FilterType::DateRange).bind("createdAt"),
        ]);
        panel.set_value("day", "2024-03-05", t0).unwrap();
        panel
            .set_value("window", json!({"from": "2024-01-01", "to": ""}), t0)
            .unwrap();
        assert_eq!(
            panel.rules(),
            vec![
                FilterRule::new("postedAt", FilterOperator::Gte, Value::date(2024, 3, 5)),
                FilterRule::new("postedAt", FilterOperator::Lt, Value::date(2024, 3, 6)),
                FilterRule::new("createdAt", FilterOperator::Gte, Value::date(2024, 1, 1)),
            ]
        );
    }

    #[test]
    fn test_preferences_round_trip() {
        let t0 = Instant::now();
        let mut store = MemoryStore::new();
        let mut panel = FilterPanel::new(vec![status_option(), niche_option()]);
        panel.set_value("status", "PAUSED", t0).unwrap();
        panel.toggle_choice("niche", "gaming", t0).unwrap();
        panel.save_preferences(&mut store, "creator-search");

        let mut restored = FilterPanel::new(vec![status_option(), niche_option()]);
        assert!(restored.load_preferences(&store, "creator-search"));
        assert_eq!(restored.values(), panel.values());
        assert!(!restored.load_preferences(&store, "other-page"));
    }

    #[test]
    fn test_load_preferences_skips_unknown_ids() {
        let mut store = MemoryStore::new();
        store
            .save("k", json!({"brand": "Acme", "status": "ACTIVE"}))
            .unwrap();
        let mut panel = FilterPanel::new(vec![status_option()]);
        assert!(panel.load_preferences(&store, "k"));
        assert_eq!(panel.values().len(), 1);
    }

    #[test]
    fn test_option_deserializes_from_json() {
        let option: FilterOption = serde_json::from_str(
            r#"{
                "id": "when",
                "label": "Created",
                "type": "dateRange",
                "isMulti": false,
                "field": "createdAt"
            }"#,
        )
        .unwrap();
        assert_eq!(option.filter_type, FilterType::DateRange);
        assert_eq!(option.field.as_deref(), Some("createdAt"));
        assert!(option.options.is_empty());
    }
}
