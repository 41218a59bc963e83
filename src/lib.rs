//! # gridview-rs
//!
//! Search, filter, sort and paginate pipeline for tabular record views.
//!
//! Records are schemaless JSON-like objects. A grid holds a record set and
//! a [`PipelineState`], and derives one [`PageView`] from them by running
//! four stages in a fixed order:
//!
//! - **Search**: case-insensitive substring match over a set of fields
//! - **Filter**: AND of field/operator/value rules
//! - **Sort**: one column, nulls first ascending and last descending
//! - **Paginate**: 1-based pages, out-of-range pages clamped
//!
//! Filter controls ([`FilterPanel`]) hold user-facing filter values,
//! summarise them for display, and project field-bound values into rules.
//! View scripts ([`ViewScript`]) describe a grid state as text.
//!
//! ## Example
//!
//! ```
//! use gridview_rs::{DataGrid, FilterRule, Record, SortDirection};
//!
//! let records = vec![
//!     Record::new().with("id", 1i64).with("name", "Jane").with("status", "ACTIVE"),
//!     Record::new().with("id", 2i64).with("name", "Bob").with("status", "PAUSED"),
//!     Record::new().with("id", 3i64).with("name", "Ann").with("status", "ACTIVE"),
//! ];
//!
//! let mut grid = DataGrid::new(records, Vec::new());
//! grid.add_rule(FilterRule::eq("status", "ACTIVE"));
//! grid.set_sort(Some("name".to_string()), SortDirection::Asc);
//!
//! let names: Vec<String> = grid
//!     .view()
//!     .page_items
//!     .iter()
//!     .filter_map(|r| r.get("name"))
//!     .map(|v| v.to_display_string())
//!     .collect();
//! assert_eq!(names, ["Ann", "Jane"]);
//! assert_eq!(grid.view().total_pages, 1);
//! ```

pub mod column;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod filter_config;
pub mod paginate;
pub mod pipeline;
pub mod prefs;
pub mod record;
pub mod script;
pub mod search;
pub mod sort;
pub mod value;

pub use column::{CellRenderer, ColumnDefinition};
pub use config::{DEFAULT_PAGE_SIZE, GridConfig};
pub use debounce::{DEFAULT_QUIET_PERIOD, Debouncer};
pub use error::GridError;
pub use filter::{FilterOperator, FilterRule};
pub use filter_config::{
    FilterChoice, FilterGroup, FilterOption, FilterPanel, FilterType, FilterValue, FilterValues,
    clear_filters, project_active_filters,
};
pub use paginate::{paginate, total_pages};
pub use pipeline::{DataGrid, PageView, PipelineState, StageTrace, recompute, recompute_traced};
pub use prefs::{JsonFileStore, MemoryStore, PreferenceStore};
pub use record::{Record, records_from_json};
pub use script::{Command, ViewScript, execute_view, parse_commands};
pub use sort::SortDirection;
pub use value::Value;
