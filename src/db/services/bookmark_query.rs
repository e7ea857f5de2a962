//! Builds the parameterized bookmark listing statement.
//!
//! Untrusted values (search text, tag names, paging numbers, the user id)
//! only ever travel as bound arguments. The only text spliced into the SQL is
//! the sort column and direction, and both come from closed enums.

use sea_orm::{DbBackend, Statement, Value};

use crate::web::error::AppError;
use crate::web::models::BookmarkListQuery;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Url,
}

impl SortKey {
    /// Unknown keys map to `None` so callers can fall back to the default.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created_at" => Some(SortKey::CreatedAt),
            "updated_at" => Some(SortKey::UpdatedAt),
            "title" => Some(SortKey::Title),
            "url" => Some(SortKey::Url),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
            SortKey::Title => "title",
            SortKey::Url => "url",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Validated listing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkListParams {
    pub page: i64,
    pub limit: i64,
    pub tags: Vec<String>,
    pub search: String,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl Default for BookmarkListParams {
    fn default() -> Self {
        BookmarkListParams {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            tags: Vec::new(),
            search: String::new(),
            sort: SortKey::default(),
            order: SortOrder::default(),
        }
    }
}

impl BookmarkListParams {
    /// Interprets raw query-string values.
    ///
    /// Non-numeric page/limit and unknown sort/order values fall back to the
    /// defaults. Numeric values out of range are rejected.
    pub fn from_query(query: &BookmarkListQuery) -> Result<Self, AppError> {
        let mut params = BookmarkListParams::default();

        if let Some(page) = query.page.as_deref().and_then(|p| p.trim().parse::<i64>().ok()) {
            params.page = page;
        }
        if let Some(limit) = query.limit.as_deref().and_then(|l| l.trim().parse::<i64>().ok()) {
            params.limit = limit;
        }
        if let Some(tags) = query.tags.as_deref() {
            params.tags = normalize_tag_names(tags.split(','));
        }
        if let Some(search) = query.search.as_deref() {
            params.search = search.trim().to_string();
        }
        if let Some(sort) = query.sort.as_deref().and_then(SortKey::parse) {
            params.sort = sort;
        }
        if let Some(order) = query.order.as_deref().and_then(SortOrder::parse) {
            params.order = order;
        }

        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.page < 1 {
            return Err(AppError::InvalidInput("page must be at least 1".to_string()));
        }
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        if self.limit.checked_mul(self.page - 1).is_none() {
            return Err(AppError::InvalidInput("page is out of range".to_string()));
        }
        Ok(())
    }

    /// Rows skipped before the page. Saturates for parameters that did not
    /// pass `validate`.
    pub fn offset(&self) -> i64 {
        self.limit.saturating_mul(self.page.saturating_sub(1).max(0))
    }
}

/// Trims names, drops blanks and collapses duplicates keeping the first one.
pub fn normalize_tag_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if !name.is_empty() && !normalized.iter().any(|n| n == name) {
            normalized.push(name.to_string());
        }
    }
    normalized
}

/// Accumulates bound values and hands out the matching placeholder.
pub(crate) struct SqlArgs {
    backend: DbBackend,
    values: Vec<Value>,
}

impl SqlArgs {
    pub(crate) fn new(backend: DbBackend) -> Self {
        SqlArgs {
            backend,
            values: Vec::new(),
        }
    }

    pub(crate) fn bind<V: Into<Value>>(&mut self, value: V) -> String {
        self.values.push(value.into());
        match self.backend {
            DbBackend::Postgres => format!("${}", self.values.len()),
            _ => "?".to_string(),
        }
    }

    pub(crate) fn into_statement(self, sql: String) -> Statement {
        Statement::from_sql_and_values(self.backend, sql, self.values)
    }
}

fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

const ROW_COLUMNS: &str =
    "b.id, b.url, b.title, b.description, b.notes, b.created_at, b.updated_at, t.name AS tag";

/// Listing statement for one user's bookmarks.
///
/// Arguments are bound in this order: user id, search pattern x3 (when
/// searching), tag names (when filtering), limit, offset. The page window is
/// taken over bookmarks in a subquery so tags never eat into the limit.
pub fn build_list_statement(backend: DbBackend, user_id: i32, params: &BookmarkListParams) -> Statement {
    let mut args = SqlArgs::new(backend);
    let mut predicates = vec![format!("b.user_id = {}", args.bind(user_id))];

    if !params.search.is_empty() {
        let pattern = like_pattern(&params.search);
        let title = args.bind(pattern.clone());
        let description = args.bind(pattern.clone());
        let notes = args.bind(pattern);
        predicates.push(format!(
            "(b.title LIKE {title} ESCAPE '\\' OR b.description LIKE {description} ESCAPE '\\' OR b.notes LIKE {notes} ESCAPE '\\')"
        ));
    }

    if !params.tags.is_empty() {
        let placeholders: Vec<String> = params.tags.iter().map(|tag| args.bind(tag.clone())).collect();
        predicates.push(format!(
            "EXISTS (SELECT 1 FROM bookmark_tags fbt JOIN tags ft ON ft.id = fbt.tag_id \
             WHERE fbt.bookmark_id = b.id AND ft.name IN ({}))",
            placeholders.join(", ")
        ));
    }

    let limit = args.bind(params.limit);
    let offset = args.bind(params.offset());

    let column = params.sort.column();
    let direction = params.order.keyword();
    let sql = format!(
        r#"
        SELECT {ROW_COLUMNS}
        FROM (
            SELECT b.id, b.url, b.title, b.description, b.notes, b.created_at, b.updated_at
            FROM bookmarks b
            WHERE {where_clause}
            ORDER BY b.{column} {direction}, b.id {direction}
            LIMIT {limit} OFFSET {offset}
        ) b
        LEFT JOIN bookmark_tags bt ON bt.bookmark_id = b.id
        LEFT JOIN tags t ON t.id = bt.tag_id
        ORDER BY b.{column} {direction}, b.id {direction}, t.id ASC
        "#,
        where_clause = predicates.join(" AND "),
    );

    args.into_statement(sql)
}

/// Rows for a single bookmark, scoped to its owner.
pub fn build_single_statement(backend: DbBackend, user_id: i32, bookmark_id: i32) -> Statement {
    let mut args = SqlArgs::new(backend);
    let id = args.bind(bookmark_id);
    let owner = args.bind(user_id);
    let sql = format!(
        r#"
        SELECT {ROW_COLUMNS}
        FROM bookmarks b
        LEFT JOIN bookmark_tags bt ON bt.bookmark_id = b.id
        LEFT JOIN tags t ON t.id = bt.tag_id
        WHERE b.id = {id} AND b.user_id = {owner}
        ORDER BY t.id ASC
        "#
    );
    args.into_statement(sql)
}
