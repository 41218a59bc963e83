//! View scripts: a line-oriented text form of grid state.
//!
//! ```text
//! # Active beauty creators, newest first
//! SEARCH "jane" IN name, email
//! FILTER status eq "ACTIVE"
//! FILTER followers gte 10000
//! FILTER createdAt gte @2024-01-01
//! SORT createdAt DESC
//! PAGE 2 SIZE 25
//! ```
//!
//! - Keywords are case-insensitive; lines starting with `#` are comments
//! - `SEARCH "query" [IN field, field ...]` sets the query and, optionally,
//!   the searched fields
//! - `FILTER <path> <operator> <literal>` adds one rule; rules accumulate
//! - `SORT <path> [ASC|DESC]` sets the sort column (ascending by default)
//! - `PAGE <n> [SIZE <m>]` and `SIZE <m>` set paging
//!
//! Strings are delimited: the first non-blank character is the delimiter and
//! the string runs to its next occurrence, so `"a b"`, `/a b/` and `'a b'`
//! are all the same. Other literals are numbers, `true`, `false`, `null`,
//! and dates written `@YYYY-MM-DD` or `@YYYY-MM-DDTHH:MM:SSZ`.

use crate::config::GridConfig;
use crate::error::GridError;
use crate::filter::{FilterOperator, FilterRule};
use crate::pipeline::{DataGrid, PageView, PipelineState, StageTrace};
use crate::record::records_from_json;
use crate::sort::SortDirection;
use crate::value::{Value, parse_date};

/// Parsed script command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// SEARCH "query" [IN fields]
    Search { query: String, fields: Vec<String> },
    /// FILTER path operator literal
    Filter(FilterRule),
    /// SORT path [ASC|DESC]
    Sort {
        column: String,
        direction: SortDirection,
    },
    /// PAGE n [SIZE m]
    Page { page: usize, size: Option<usize> },
    /// SIZE m
    Size { size: usize },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Search { .. } => "SEARCH",
            Command::Filter(_) => "FILTER",
            Command::Sort { .. } => "SORT",
            Command::Page { .. } => "PAGE",
            Command::Size { .. } => "SIZE",
        }
    }

    fn apply_to(&self, state: &mut PipelineState) {
        match self {
            Command::Search { query, .. } => state.search_query = query.clone(),
            Command::Filter(rule) => state.rules.push(rule.clone()),
            Command::Sort { column, direction } => {
                state.sort_column = Some(column.clone());
                state.sort_direction = *direction;
            }
            Command::Page { page, size } => {
                state.current_page = *page;
                if let Some(size) = size {
                    state.page_size = *size;
                }
            }
            Command::Size { size } => state.page_size = *size,
        }
    }
}

/// Parse script text into commands.
pub fn parse_commands(text: &str) -> Result<Vec<Command>, GridError> {
    let mut commands = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let cmd = parse_command(line).map_err(|message| GridError::Script {
            line: line_num + 1,
            message,
        })?;
        commands.push(cmd);
    }

    Ok(commands)
}

fn parse_command(line: &str) -> Result<Command, String> {
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword.to_uppercase().as_str() {
        "SEARCH" => parse_search(rest),
        "FILTER" => parse_filter(rest),
        "SORT" => parse_sort(rest),
        "PAGE" => parse_page(rest),
        "SIZE" => Ok(Command::Size {
            size: parse_page_size(rest)?,
        }),
        _ => Err(format!("Unknown command: {keyword}")),
    }
}

fn parse_search(rest: &str) -> Result<Command, String> {
    if rest.is_empty() {
        return Err("SEARCH requires a query".to_string());
    }
    let (query, after) = parse_delimited_string(rest)?;
    let after = after.trim();
    if after.is_empty() {
        return Ok(Command::Search {
            query,
            fields: Vec::new(),
        });
    }

    let Some((keyword, list)) = after.split_once(char::is_whitespace) else {
        return Err(format!("Unexpected text after SEARCH query: {after}"));
    };
    if !keyword.eq_ignore_ascii_case("IN") {
        return Err(format!("Unexpected text after SEARCH query: {after}"));
    }
    let fields: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect();
    if fields.is_empty() {
        return Err("SEARCH ... IN requires at least one field".to_string());
    }
    Ok(Command::Search { query, fields })
}

fn parse_filter(rest: &str) -> Result<Command, String> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let field = parts
        .next()
        .filter(|f| !f.is_empty())
        .ok_or("FILTER requires a field path")?;
    let op = parts
        .next()
        .ok_or_else(|| format!("FILTER {field} requires an operator"))?;
    let literal = parts
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| format!("FILTER {field} {op} requires a value"))?;

    let operator = FilterOperator::parse(op);
    if let FilterOperator::Unknown(name) = &operator {
        log::warn!("Unknown filter operator '{name}' on {field}; the rule matches every record");
    }
    let value = parse_literal(literal)?;
    Ok(Command::Filter(FilterRule::new(field, operator, value)))
}

fn parse_sort(rest: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let direction = match tokens.as_slice() {
        [_] => SortDirection::Asc,
        [_, dir] => {
            SortDirection::parse(dir).ok_or_else(|| format!("Invalid sort direction: {dir}"))?
        }
        [] => return Err("SORT requires a column".to_string()),
        _ => return Err("SORT takes a column and an optional ASC or DESC".to_string()),
    };
    Ok(Command::Sort {
        column: tokens[0].to_string(),
        direction,
    })
}

fn parse_page(rest: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let (page, size) = match tokens.as_slice() {
        [page] => (*page, None),
        [page, keyword, size] if keyword.eq_ignore_ascii_case("SIZE") => (*page, Some(*size)),
        [] => return Err("PAGE requires a number".to_string()),
        _ => return Err("PAGE takes a number and an optional SIZE <m>".to_string()),
    };
    let page: usize = page
        .parse()
        .map_err(|_| format!("Invalid page number: {page}"))?;
    let size = size.map(parse_page_size).transpose()?;
    Ok(Command::Page { page, size })
}

fn parse_page_size(text: &str) -> Result<usize, String> {
    let size: usize = text
        .trim()
        .parse()
        .map_err(|_| format!("Invalid page size: {text}"))?;
    if size == 0 {
        return Err("Page size must be at least 1".to_string());
    }
    Ok(size)
}

/// Parse a FILTER value.
fn parse_literal(text: &str) -> Result<Value, String> {
    if let Some(date) = text.strip_prefix('@') {
        return parse_date(date)
            .map(Value::Date)
            .ok_or_else(|| format!("Invalid date literal: {text}"));
    }
    if text.eq_ignore_ascii_case("true") {
        return Ok(Value::Bool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(Value::Bool(false));
    }
    if text.eq_ignore_ascii_case("null") {
        return Ok(Value::Null);
    }
    if let Ok(n) = text.parse::<f64>()
        && n.is_finite()
    {
        return Ok(Value::Number(n));
    }

    let (s, rest) = parse_delimited_string(text)?;
    if !rest.trim().is_empty() {
        return Err(format!("Unexpected text after value: {}", rest.trim()));
    }
    Ok(Value::String(s))
}

/// Parse a delimited string. The first non-blank character is the
/// delimiter and the string continues to its next occurrence.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> Result<(String, &str), String> {
    let s = s.trim_start();
    let Some(delim) = s.chars().next() else {
        return Err("Expected delimited string".to_string());
    };
    if delim.is_alphanumeric() {
        return Err(format!(
            "Expected delimited string, found {}",
            s.split_whitespace().next().unwrap_or(s)
        ));
    }
    let after_delim = &s[delim.len_utf8()..];

    if let Some(end) = after_delim.find(delim) {
        let extracted = after_delim[..end].to_string();
        let rest = &after_delim[end + delim.len_utf8()..];
        Ok((extracted, rest))
    } else {
        Err(format!("Unclosed delimiter '{delim}'"))
    }
}

/// A parsed script, applicable to any grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewScript {
    commands: Vec<Command>,
}

impl ViewScript {
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let commands = parse_commands(text)?;
        log::debug!("Parsed view script: {} commands", commands.len());
        Ok(Self { commands })
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Apply every command to `grid`. Later SEARCH, SORT and paging
    /// commands override earlier ones; FILTER rules are added to the
    /// grid's existing rules.
    pub fn apply(&self, grid: &mut DataGrid) -> Result<(), GridError> {
        let search_fields = self.commands.iter().rev().find_map(|cmd| match cmd {
            Command::Search { fields, .. } if !fields.is_empty() => Some(fields.clone()),
            _ => None,
        });
        if let Some(fields) = search_fields {
            grid.set_search_fields(fields);
        }
        grid.update_state(|state| {
            for cmd in &self.commands {
                cmd.apply_to(state);
            }
        })
    }
}

/// Load records from a JSON array, apply a script, and return the final
/// page along with per-stage record counts.
pub fn execute_view(
    records_json: &str,
    script_text: &str,
    config: &GridConfig,
) -> Result<(PageView, Vec<StageTrace>), GridError> {
    let records = records_from_json(records_json)?;
    let script = ViewScript::parse(script_text)?;
    let mut grid = DataGrid::from_config(records, config)?;
    script.apply(&mut grid)?;
    let trace = grid.refresh_traced();
    Ok((grid.view().clone(), trace))
}
