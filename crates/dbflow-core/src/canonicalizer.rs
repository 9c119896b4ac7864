//! Canonicalizer — collapses literal SQL text into a comparable query shape.
//!
//! Two queries that differ only in literal values, list lengths or predicate
//! content canonicalize to the same string; queries that differ in kind or in
//! the touched table do not.
//!
//! The rewrites run in the fixed order of [`PIPELINE`]. Each one sees the
//! output of the previous step, so reordering them changes the result.
//! Whitespace is collapsed both before and after literal stripping because
//! substitution can open new whitespace runs.
//!
//! [`canonicalize`] repeats the pipeline until the text stops changing, which
//! keeps `canonicalize(canonicalize(q)) == canonicalize(q)` for inputs where a
//! single pass re-creates a trigger (multi-row `VALUES (..),(..)` lists being
//! the common case).

use regex::{NoExpand, Regex};
use std::sync::OnceLock;

/// Upper bound on pipeline passes. Every rewrite settles its own trigger in
/// one pass; a second pass catches triggers opened by a later step.
const MAX_PASSES: usize = 8;

/// Function names that get a space before their opening parenthesis.
const SPACED_FUNCTIONS: &[&str] = &["SNIPPETS"];

/// Statement kinds whose shape is just the kind plus the target table.
const TRUNCATED_KINDS: &[&str] = &["UPDATE", "CALL"];

macro_rules! regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("valid canonicalizer regex"))
        }
    };
}

regex!(whitespace_run_re, r"\s{2,}");
regex!(block_comment_re, r"\s?/\*.+\*/");
regex!(like_literal_re, r"LIKE '[^']+'");
regex!(like_clause_re, r"(?i)(or|and) [^\s]+ LIKE X");
regex!(escaped_backslash_re, r"\\\\");
regex!(escaped_single_quote_re, r"\\'");
regex!(escaped_double_quote_re, r#"\\""#);
regex!(single_quoted_re, r"'[^']*'");
regex!(double_quoted_re, r#""[^"]*""#);
regex!(any_whitespace_re, r"\s+");
regex!(number_re, r"-?[0-9]+");
regex!(value_list_re, r"(?i) (IN|VALUES)\s*\([^,]+,[^)]+\)");
regex!(
    multi_row_values_re,
    r"(?i) (VALUES)\s*\((?:[^()]|\([^()]*\))*\)(?:\s*,\s*\((?:[^()]|\([^()]*\))*\))+"
);
regex!(number_list_re, r"(N,+)+");
regex!(literal_list_re, r"(X,+)+");
regex!(serialized_array_re, r"(i:N;)+");
regex!(where_tail_re, r"WHERE.*");

/// One named step of the canonicalization pipeline.
#[derive(Clone, Copy)]
pub struct Rewrite {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

impl std::fmt::Debug for Rewrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rewrite").field(&self.name).finish()
    }
}

/// The rewrites in application order.
pub const PIPELINE: &[Rewrite] = &[
    Rewrite { name: "collapse_whitespace_runs", apply: collapse_whitespace_runs },
    Rewrite { name: "strip_block_comments", apply: strip_block_comments },
    Rewrite { name: "space_function_calls", apply: space_function_calls },
    Rewrite { name: "truncate_by_kind", apply: truncate_by_kind },
    Rewrite { name: "normalize_likes", apply: normalize_likes },
    Rewrite { name: "drop_escape_sequences", apply: drop_escape_sequences },
    Rewrite { name: "replace_quoted_literals", apply: replace_quoted_literals },
    Rewrite { name: "collapse_all_whitespace", apply: collapse_all_whitespace },
    Rewrite { name: "replace_numbers", apply: replace_numbers },
    Rewrite { name: "collapse_value_lists", apply: collapse_value_lists },
    Rewrite { name: "collapse_repeated_items", apply: collapse_repeated_items },
    Rewrite { name: "elide_where_clause", apply: elide_where_clause },
    Rewrite { name: "trim", apply: trim },
];

/// Canonical shape of `sql`, or `None` when there is no SQL at all.
pub fn generalize(sql: Option<&str>) -> Option<String> {
    sql.map(canonicalize)
}

/// Canonical shape of `sql`.
///
/// Never panics; for text with nothing to rewrite the result is the trimmed
/// input.
pub fn canonicalize(sql: &str) -> String {
    let mut current = apply_pipeline_once(sql);
    for _ in 1..MAX_PASSES {
        let next = apply_pipeline_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    tracing::debug!(shape = %current, "canonical shape still changing after {MAX_PASSES} passes");
    current
}

/// Run every rewrite in [`PIPELINE`] exactly once.
pub fn apply_pipeline_once(sql: &str) -> String {
    PIPELINE
        .iter()
        .fold(sql.to_string(), |text, step| (step.apply)(&text))
}

// ---------------------------------------------------------------------------
// Rewrite steps
// ---------------------------------------------------------------------------

/// Step 1: runs of two or more whitespace characters become one space.
pub fn collapse_whitespace_runs(sql: &str) -> String {
    whitespace_run_re().replace_all(sql, " ").into_owned()
}

/// Step 2: drop `/* ... */` comments and one leading whitespace character.
///
/// The match is greedy, so everything between the first `/*` and the last
/// `*/` on a line goes.
pub fn strip_block_comments(sql: &str) -> String {
    block_comment_re().replace_all(sql, "").into_owned()
}

/// Step 3: `SNIPPETS(` → `SNIPPETS (`.
pub fn space_function_calls(sql: &str) -> String {
    SPACED_FUNCTIONS.iter().fold(sql.to_string(), |text, name| {
        text.replace(&format!("{name}("), &format!("{name} ("))
    })
}

/// Step 4: `UPDATE` and `CALL` statements keep only their first two tokens.
pub fn truncate_by_kind(sql: &str) -> String {
    let mut tokens = sql.split_whitespace();
    let Some(first) = tokens.next() else {
        return sql.to_string();
    };
    let kind = first.to_uppercase();
    if !TRUNCATED_KINDS.contains(&kind.as_str()) {
        return sql.to_string();
    }
    match tokens.next() {
        Some(target) => format!("{first} {target}"),
        None => first.to_string(),
    }
}

/// Step 5: erase `LIKE` patterns and fold repeated `OR/AND x LIKE X` clauses.
///
/// Consecutive repetitions of a clause become one occurrence followed by
/// ` ...`. A marker left by an earlier pass is absorbed rather than doubled.
pub fn normalize_likes(sql: &str) -> String {
    let sql = sql.replace('%', "");
    let mut sql = like_literal_re().replace_all(&sql, "LIKE X").into_owned();

    let mut clauses: Vec<String> = Vec::new();
    for found in like_clause_re().find_iter(&sql) {
        if !clauses.iter().any(|c| c == found.as_str()) {
            clauses.push(found.as_str().to_string());
        }
    }

    for clause in clauses {
        let pattern = format!(r"(\s?{})+( \.\.\.)?", regex::escape(&clause));
        let Ok(repeated) = Regex::new(&pattern) else {
            continue;
        };
        let replacement = format!(" {clause} ...");
        sql = repeated
            .replace_all(&sql, NoExpand(&replacement))
            .into_owned();
    }

    sql
}

/// Step 6: delete `\\`, `\'` and `\"`.
pub fn drop_escape_sequences(sql: &str) -> String {
    let sql = escaped_backslash_re().replace_all(sql, "");
    let sql = escaped_single_quote_re().replace_all(&sql, "");
    escaped_double_quote_re().replace_all(&sql, "").into_owned()
}

/// Step 7: single- and double-quoted literals become `X`.
pub fn replace_quoted_literals(sql: &str) -> String {
    let sql = single_quoted_re().replace_all(sql, "X");
    double_quoted_re().replace_all(&sql, "X").into_owned()
}

/// Step 8: every whitespace run, including single tabs and newlines, becomes one space.
pub fn collapse_all_whitespace(sql: &str) -> String {
    any_whitespace_re().replace_all(sql, " ").into_owned()
}

/// Step 9: digit runs, with an optional leading minus, become `N`.
pub fn replace_numbers(sql: &str) -> String {
    number_re().replace_all(sql, "N").into_owned()
}

/// Step 10: `IN (a, b, ...)` and `VALUES (a, b, ...)` become `(XYZ)`.
///
/// A multi-row `VALUES (..),(..)` becomes a single `(XYZ)` whatever the row
/// count. Single lists without a comma are kept, so `IN (N)` stays as is.
pub fn collapse_value_lists(sql: &str) -> String {
    let sql = multi_row_values_re().replace_all(sql, " ${1} (XYZ)");
    value_list_re()
        .replace_all(&sql, " ${1} (XYZ)")
        .into_owned()
}

/// Step 11: `N,N,N` → `N..NN`, `X,X` → `X..XX`, `i:N;i:N;` → `N..N`.
///
/// Empty items (`N,,N`) belong to the run.
pub fn collapse_repeated_items(sql: &str) -> String {
    let sql = number_list_re().replace_all(sql, "N..N");
    let sql = literal_list_re().replace_all(&sql, "X..X");
    serialized_array_re()
        .replace_all(&sql, "N..N")
        .into_owned()
}

/// Step 12: everything from the first `WHERE` on becomes the bare keyword.
pub fn elide_where_clause(sql: &str) -> String {
    where_tail_re().replace(sql, "WHERE").into_owned()
}

/// Step 13.
pub fn trim(sql: &str) -> String {
    sql.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
