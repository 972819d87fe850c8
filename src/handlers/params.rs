//! Query-parameter types for the listing endpoints
//!
//! Lists arrive comma-separated and datetimes in the wire format, so the
//! raw parameters come in as strings and are parsed here into the typed
//! queries the services take.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::filter::{Page, SortKey};
use crate::services::{AdminSearch, PublicSearch};
use crate::utils::errors::{EventboardError, Result};
use crate::utils::time;

/// Raw query parameters of `GET /events`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSearchParams {
    pub text: Option<String>,
    pub categories: Option<String>,
    pub paid: Option<bool>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    #[serde(default)]
    pub only_available: bool,
    pub sort: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl PublicSearchParams {
    pub fn into_query(self) -> Result<PublicSearch> {
        let sort = match self.sort.as_deref() {
            Some(raw) => SortKey::parse(raw)?,
            None => SortKey::default(),
        };
        Ok(PublicSearch {
            text: self.text,
            categories: parse_id_list(self.categories.as_deref())?,
            paid: self.paid,
            range_start: parse_datetime_param(self.range_start.as_deref())?,
            range_end: parse_datetime_param(self.range_end.as_deref())?,
            only_available: self.only_available,
            sort,
            page: Page::new(self.from, self.size)?,
        })
    }
}

/// Raw query parameters of `GET /admin/events`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSearchParams {
    pub users: Option<String>,
    pub states: Option<String>,
    pub categories: Option<String>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl AdminSearchParams {
    pub fn into_query(self) -> Result<AdminSearch> {
        Ok(AdminSearch {
            users: parse_id_list(self.users.as_deref())?,
            states: parse_name_list(self.states.as_deref()),
            categories: parse_id_list(self.categories.as_deref())?,
            range_start: parse_datetime_param(self.range_start.as_deref())?,
            range_end: parse_datetime_param(self.range_end.as_deref())?,
            page: Page::new(self.from, self.size)?,
        })
    }
}

/// Plain `from`/`size` window, used by the owner listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl PageParams {
    pub fn into_page(self) -> Result<Page> {
        Page::new(self.from, self.size)
    }
}

/// Parse a comma-separated id list. Blank segments are skipped; an empty
/// result counts as the parameter being absent.
fn parse_id_list(raw: Option<&str>) -> Result<Option<Vec<i64>>> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(None),
    };
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = part.parse::<i64>().map_err(|_| {
            EventboardError::InvalidInput(format!("Invalid id '{part}' in list parameter"))
        })?;
        ids.push(id);
    }
    Ok(if ids.is_empty() { None } else { Some(ids) })
}

/// Parse a comma-separated name list, e.g. state names.
fn parse_name_list(raw: Option<&str>) -> Option<Vec<String>> {
    let names: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

fn parse_datetime_param(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(time::parse_datetime).transpose()
}
