//! The grid pipeline: search → filter → sort → paginate.
//!
//! The stage order is fixed. [`recompute`] runs the whole chain from scratch
//! on every call; there is no incremental diffing.
//!
//! [`DataGrid`] owns the records and the [`PipelineState`] and recomputes
//! after every mutation, so its [`PageView`] is always current.

use crate::column::ColumnDefinition;
use crate::config::{DEFAULT_PAGE_SIZE, GridConfig};
use crate::error::GridError;
use crate::filter::{self, FilterRule};
use crate::filter_config::FilterPanel;
use crate::paginate::{clamp_page, paginate, total_pages};
use crate::record::Record;
use crate::search;
use crate::sort::{SortDirection, sort_records};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Mutable view state. Owned by one grid; never shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub current_page: usize,
    pub page_size: usize,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
    pub search_query: String,
    pub rules: Vec<FilterRule>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_column: None,
            sort_direction: SortDirection::Asc,
            search_query: String::new(),
            rules: Vec::new(),
        }
    }
}

/// Everything the presentation layer needs to render one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub page_items: Vec<Record>,
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
}

/// Record counts entering and leaving one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTrace {
    pub stage_name: String,
    pub input_count: usize,
    pub output_count: usize,
}

/// One step of the chain, operating on borrowed rows.
trait Stage {
    fn name(&self) -> &'static str;

    fn apply<'a>(&self, rows: Vec<&'a Record>) -> Vec<&'a Record>;
}

struct SearchStage<'s> {
    query: &'s str,
    fields: &'s [String],
}

impl Stage for SearchStage<'_> {
    fn name(&self) -> &'static str {
        "SEARCH"
    }

    fn apply<'a>(&self, rows: Vec<&'a Record>) -> Vec<&'a Record> {
        rows.into_iter()
            .filter(|r| search::matches(r, self.query, self.fields))
            .collect()
    }
}

struct FilterStage<'s> {
    rules: &'s [FilterRule],
}

impl Stage for FilterStage<'_> {
    fn name(&self) -> &'static str {
        "FILTER"
    }

    fn apply<'a>(&self, rows: Vec<&'a Record>) -> Vec<&'a Record> {
        rows.into_iter()
            .filter(|r| filter::matches_all(r, self.rules))
            .collect()
    }
}

struct SortStage<'s> {
    column: &'s str,
    direction: SortDirection,
}

impl Stage for SortStage<'_> {
    fn name(&self) -> &'static str {
        "SORT"
    }

    fn apply<'a>(&self, mut rows: Vec<&'a Record>) -> Vec<&'a Record> {
        sort_records(&mut rows, self.column, self.direction);
        rows
    }
}

/// Run the pipeline over `records`, clamping `state.current_page`.
///
/// `search_fields` empty disables the search stage.
pub fn recompute(records: &[Record], state: &mut PipelineState, search_fields: &[String]) -> PageView {
    execute(records, state, search_fields, None)
}

/// [`recompute`], also reporting per-stage record counts.
pub fn recompute_traced(
    records: &[Record],
    state: &mut PipelineState,
    search_fields: &[String],
) -> (PageView, Vec<StageTrace>) {
    let mut trace = Vec::new();
    let view = execute(records, state, search_fields, Some(&mut trace));
    (view, trace)
}

fn execute(
    records: &[Record],
    state: &mut PipelineState,
    search_fields: &[String],
    mut trace: Option<&mut Vec<StageTrace>>,
) -> PageView {
    let search = SearchStage {
        query: &state.search_query,
        fields: search_fields,
    };
    let filters = FilterStage {
        rules: &state.rules,
    };
    let sort = state.sort_column.as_deref().map(|column| SortStage {
        column,
        direction: state.sort_direction,
    });

    let mut stages: Vec<&dyn Stage> = vec![&search as &dyn Stage, &filters];
    if let Some(sort) = &sort {
        stages.push(sort);
    }

    let mut rows: Vec<&Record> = records.iter().collect();
    for stage in stages {
        let input_count = rows.len();
        rows = stage.apply(rows);
        if let Some(trace) = trace.as_deref_mut() {
            trace.push(StageTrace {
                stage_name: stage.name().to_string(),
                input_count,
                output_count: rows.len(),
            });
        }
    }

    let total_items = rows.len();
    let total_pages = total_pages(total_items, state.page_size);
    let current_page = clamp_page(state.current_page, total_pages);
    if current_page != state.current_page {
        log::debug!(
            "Page {} out of range, clamped to {current_page}",
            state.current_page
        );
    }
    state.current_page = current_page;

    let page_items: Vec<Record> = paginate(&rows, current_page, state.page_size)
        .iter()
        .map(|r| (*r).clone())
        .collect();

    if let Some(trace) = trace {
        trace.push(StageTrace {
            stage_name: "PAGINATE".to_string(),
            input_count: total_items,
            output_count: page_items.len(),
        });
    }

    log::debug!(
        "Recomputed grid: {} records -> {total_items} matched, page {current_page}/{total_pages}",
        records.len()
    );

    PageView {
        page_items,
        total_items,
        total_pages,
        current_page,
        sort_column: state.sort_column.clone(),
        sort_direction: state.sort_direction,
    }
}

/// A grid over an owned record collection.
///
/// Every setter recomputes, so [`DataGrid::view`] always reflects the
/// current records and state. Row selection is tracked by row id and is
/// independent of paging.
#[derive(Debug)]
pub struct DataGrid {
    records: Vec<Record>,
    columns: Vec<ColumnDefinition>,
    search_fields: Vec<String>,
    state: PipelineState,
    selected: IndexSet<String>,
    view: PageView,
}

impl DataGrid {
    pub fn new(records: Vec<Record>, columns: Vec<ColumnDefinition>) -> Self {
        let mut state = PipelineState::default();
        let view = recompute(&records, &mut state, &[]);
        Self {
            records,
            columns,
            search_fields: Vec::new(),
            state,
            selected: IndexSet::new(),
            view,
        }
    }

    /// Build a grid from config: page size, columns, search fields, and
    /// date parsing of the configured paths.
    pub fn from_config(mut records: Vec<Record>, config: &GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        if !config.date_fields.is_empty() {
            for record in &mut records {
                record.parse_dates(&config.date_fields);
            }
        }
        let mut grid = Self::new(records, config.columns.clone());
        grid.search_fields = config.effective_search_fields();
        grid.state.page_size = config.page_size;
        grid.refresh();
        Ok(grid)
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Rerun the pipeline over current records and state.
    pub fn refresh(&mut self) -> &PageView {
        self.view = recompute(&self.records, &mut self.state, &self.search_fields);
        &self.view
    }

    /// Rerun the pipeline and report per-stage counts.
    pub fn refresh_traced(&mut self) -> Vec<StageTrace> {
        let (view, trace) = recompute_traced(&self.records, &mut self.state, &self.search_fields);
        self.view = view;
        trace
    }

    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.refresh();
    }

    pub fn set_search_fields(&mut self, fields: Vec<String>) {
        self.search_fields = fields;
        self.refresh();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
        self.refresh();
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.current_page = page;
        self.refresh();
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), GridError> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }
        self.state.page_size = page_size;
        self.refresh();
        Ok(())
    }

    pub fn set_sort(&mut self, column: Option<String>, direction: SortDirection) {
        self.state.sort_column = column;
        self.state.sort_direction = direction;
        self.refresh();
    }

    /// Header click: same column flips direction, a new column sorts
    /// ascending. Columns declared non-sortable are ignored.
    pub fn toggle_sort(&mut self, column: &str) {
        if self.columns.iter().any(|c| c.key == column && !c.sortable) {
            log::debug!("Ignoring sort on non-sortable column '{column}'");
            return;
        }
        if self.state.sort_column.as_deref() == Some(column) {
            self.state.sort_direction = self.state.sort_direction.toggled();
        } else {
            self.state.sort_column = Some(column.to_string());
            self.state.sort_direction = SortDirection::Asc;
        }
        self.refresh();
    }

    pub fn set_rules(&mut self, rules: Vec<FilterRule>) {
        self.state.rules = rules;
        self.refresh();
    }

    pub fn add_rule(&mut self, rule: FilterRule) {
        self.state.rules.push(rule);
        self.refresh();
    }

    pub fn clear_rules(&mut self) {
        self.state.rules.clear();
        self.refresh();
    }

    /// Replace the rule set with the rules projected from a filter panel.
    pub fn apply_filters(&mut self, panel: &FilterPanel) {
        self.set_rules(panel.rules());
    }

    /// Apply several state changes with a single recompute.
    pub fn update_state<F>(&mut self, update: F) -> Result<(), GridError>
    where
        F: FnOnce(&mut PipelineState),
    {
        let mut next = self.state.clone();
        update(&mut next);
        if next.page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }
        self.state = next;
        self.refresh();
        Ok(())
    }

    /// Flip one row's selection; returns whether it is now selected.
    pub fn toggle_row(&mut self, id: &str) -> bool {
        if self.selected.shift_remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Header checkbox. Checking selects exactly the rows visible on the
    /// current page, not the whole filtered set; unchecking clears.
    pub fn select_all(&mut self, checked: bool) {
        self.selected.clear();
        if checked {
            self.selected
                .extend(self.view.page_items.iter().filter_map(Record::id));
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// True when the page has selectable rows and all of them are selected.
    pub fn all_visible_selected(&self) -> bool {
        let mut ids = self.view.page_items.iter().filter_map(Record::id).peekable();
        ids.peek().is_some() && ids.all(|id| self.selected.contains(&id))
    }
}
