//! Label/ID SQL rewriting.
//!
//! SQL is persisted with table and column references replaced by stable
//! tokens (`[TABLE:<id>]`, `[COL:<id>]`, `[TABLE:<id>].[COL:<id>]`) and shown
//! or executed with the current human-readable names. Both directions are
//! purely lexical: no SQL is parsed.
//!
//! Encoding runs three ordered passes (qualified references, bare table
//! names, bare column labels) with whole-word, case-insensitive matching.
//! A bare column label shared by several tables always encodes to the
//! column of the first table in catalog build order; the surrounding SQL
//! is not used to pick a scope. Text inside an existing encoded token is
//! never matched, so encoding is idempotent.
//!
//! Decoding runs the inverse passes. Ids missing from the catalog leave
//! their token untouched; see [`unresolved_tokens`].

use std::sync::OnceLock;

use regex::{Captures, NoExpand, Regex, RegexBuilder};

use crate::catalog::{qualified_key, Catalog, ColumnId, TableId};

static ENCODED_TOKEN_RE: OnceLock<Regex> = OnceLock::new();
static QUALIFIED_TOKEN_RE: OnceLock<Regex> = OnceLock::new();
static TABLE_TOKEN_RE: OnceLock<Regex> = OnceLock::new();
static COLUMN_TOKEN_RE: OnceLock<Regex> = OnceLock::new();
static EXACT_TABLE_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn encoded_token_re() -> &'static Regex {
    ENCODED_TOKEN_RE
        .get_or_init(|| Regex::new(r"\[(?:TABLE|COL):\d+\]").expect("valid regex"))
}

fn qualified_token_re() -> &'static Regex {
    QUALIFIED_TOKEN_RE
        .get_or_init(|| Regex::new(r"\[TABLE:(\d+)\]\.\[COL:(\d+)\]").expect("valid regex"))
}

fn table_token_re() -> &'static Regex {
    TABLE_TOKEN_RE.get_or_init(|| Regex::new(r"\[TABLE:(\d+)\]").expect("valid regex"))
}

fn column_token_re() -> &'static Regex {
    COLUMN_TOKEN_RE.get_or_init(|| Regex::new(r"\[COL:(\d+)\]").expect("valid regex"))
}

fn exact_table_token_re() -> &'static Regex {
    EXACT_TABLE_TOKEN_RE.get_or_init(|| Regex::new(r"^\[TABLE:(\d+)\]$").expect("valid regex"))
}

/// Formats a table token.
pub fn table_token(id: TableId) -> String {
    format!("[TABLE:{}]", id)
}

/// Formats a column token.
pub fn column_token(id: ColumnId) -> String {
    format!("[COL:{}]", id)
}

/// Rewrites label-form SQL into encoded form.
pub fn to_encoded(sql: &str, catalog: &Catalog) -> String {
    if sql.is_empty() || catalog.is_empty() {
        return sql.to_string();
    }
    let mut text = sql.to_string();

    // Qualified references first: the bare passes below would otherwise
    // split `table.column` into two unrelated tokens.
    for (table, label, table_id, column_id) in catalog.qualified_columns() {
        let replacement = format!("{}.{}", table_token(table_id), column_token(column_id));
        text = replace_literal(&text, &qualified_key(table, label), &replacement);
    }

    for table in catalog.tables() {
        text = replace_literal(&text, &table.name, &table_token(table.id));
    }

    for (label, column_id) in catalog.first_column_by_label() {
        text = replace_literal(&text, label, &column_token(column_id));
    }

    tracing::debug!("SQL labels -> ids: {}", preview(&text));
    text
}

/// Rewrites encoded SQL back into label form using current names.
pub fn to_labels(encoded: &str, catalog: &Catalog) -> String {
    if encoded.is_empty() {
        return String::new();
    }

    let text = qualified_token_re().replace_all(encoded, |caps: &Captures| {
        let table = parse_id(&caps[1]).and_then(|id| catalog.table_name(id));
        let column = parse_id(&caps[2]).and_then(|id| catalog.column_label(id));
        match (table, column) {
            (Some(table), Some(column)) => qualified_key(table, column),
            _ => caps[0].to_string(),
        }
    });

    let text = table_token_re().replace_all(&text, |caps: &Captures| {
        parse_id(&caps[1])
            .and_then(|id| catalog.table_name(id))
            .map_or_else(|| caps[0].to_string(), str::to_string)
    });

    let text = column_token_re().replace_all(&text, |caps: &Captures| {
        parse_id(&caps[1])
            .and_then(|id| catalog.column_label(id))
            .map_or_else(|| caps[0].to_string(), str::to_string)
    });

    tracing::debug!("SQL ids -> labels: {}", preview(&text));
    text.into_owned()
}

/// Resolves stored SQL against the current catalog for execution.
///
/// Encoding first and decoding right after maps any persisted tokens and
/// any literal names alike onto the names the catalog holds now, so SQL
/// saved before a table or column rename still runs.
pub fn resolve_for_execution(sql: &str, catalog: &Catalog) -> String {
    to_labels(&to_encoded(sql, catalog), catalog)
}

/// Encodes a standalone table name, or returns it unchanged when unknown.
pub fn encode_table_token(name: &str, catalog: &Catalog) -> String {
    match catalog.table_id(name) {
        Some(id) => table_token(id),
        None => name.to_string(),
    }
}

/// Decodes an exact `[TABLE:<digits>]` token to the current table name.
///
/// Anything else, including a token whose id is unknown, is returned as is.
pub fn decode_table_token(token: &str, catalog: &Catalog) -> String {
    exact_table_token_re()
        .captures(token)
        .and_then(|caps| parse_id(&caps[1]))
        .and_then(|id| catalog.table_name(id))
        .map_or_else(|| token.to_string(), str::to_string)
}

/// Encoded tokens still present in `text`.
pub fn unresolved_tokens(text: &str) -> Vec<&str> {
    encoded_token_re()
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

/// Replaces whole-word, case-insensitive occurrences of `literal` outside
/// existing encoded tokens.
fn replace_literal(text: &str, literal: &str, replacement: &str) -> String {
    if literal.trim().is_empty() {
        return text.to_string();
    }
    let pattern = match RegexBuilder::new(&format!(r"\b{}\b", regex::escape(literal)))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::warn!("Cannot match identifier '{}': {}", literal, e);
            return text.to_string();
        }
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in encoded_token_re().find_iter(text) {
        out.push_str(&pattern.replace_all(&text[last..token.start()], NoExpand(replacement)));
        out.push_str(token.as_str());
        last = token.end();
    }
    out.push_str(&pattern.replace_all(&text[last..], NoExpand(replacement)));
    out
}

fn parse_id(digits: &str) -> Option<i64> {
    digits.parse().ok()
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
