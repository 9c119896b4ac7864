//! Table extraction — which tables does a (canonical) query touch?
//!
//! The reducer only needs the first table of a query, and only through the
//! [`TableExtractor`] trait, so any extractor can be plugged in. The bundled
//! [`KeywordTableExtractor`] runs the `sqlparser` MySQL tokenizer and reads
//! the name that follows `FROM`, `JOIN`, `INTO`, `UPDATE` and `TABLE`.
//! Canonical shapes (`X`, `N..N`, truncated `UPDATE t`) no longer parse as
//! statements but still tokenize.

use sqlparser::dialect::MySqlDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

/// Table name reported when a query names no table.
pub const UNKNOWN_TABLE: &str = "unknown";

/// Extracts the ordered list of tables an SQL text refers to.
pub trait TableExtractor {
    /// Tables in order of appearance, without duplicates. May be empty.
    fn extract_tables(&self, sql: &str) -> Vec<String>;
}

impl<F> TableExtractor for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn extract_tables(&self, sql: &str) -> Vec<String> {
        self(sql)
    }
}

/// First table of `sql`, or [`UNKNOWN_TABLE`].
pub fn primary_table<E: TableExtractor + ?Sized>(extractor: &E, sql: &str) -> String {
    extractor
        .extract_tables(sql)
        .into_iter()
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TABLE.to_string())
}

/// Keywords directly followed by a table name.
const TABLE_KEYWORDS: &[&str] = &["FROM", "INTO", "UPDATE", "TABLE"];

/// Words that may sit between a table keyword and the table name.
const MODIFIERS: &[&str] = &[
    "IGNORE",
    "LOW_PRIORITY",
    "DELAYED",
    "HIGH_PRIORITY",
    "QUICK",
    "IF",
    "NOT",
    "EXISTS",
    "ONLY",
    "LATERAL",
    "TEMPORARY",
];

/// Words that end a comma-separated `FROM a, b` list.
const CLAUSE_KEYWORDS: &[&str] = &[
    "WHERE", "ON", "USING", "GROUP", "ORDER", "LIMIT", "HAVING", "SET", "VALUES", "UNION",
    "USE", "FORCE", "FOR", "LOCK", "WINDOW", "INNER", "LEFT", "RIGHT", "OUTER", "CROSS",
    "NATURAL", "FULL", "SELECT", "PROCEDURE", "INTO",
];

/// Keyword-driven extractor for MySQL-flavoured SQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTableExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    /// Next name token is a table.
    ExpectTable { from_list: bool },
    /// A table of a `FROM` list was read; a comma continues the list.
    AfterListTable,
}

/// A `(` and the state to resume at its matching `)`.
#[derive(Debug, Clone, Copy)]
struct Scope {
    /// Subquery (`(SELECT ...`) rather than a call or column list.
    query: bool,
    resume: State,
}

impl State {
    fn after_paren(self) -> State {
        match self {
            State::ExpectTable { from_list: true } => State::AfterListTable,
            State::ExpectTable { from_list: false } => State::Scanning,
            other => other,
        }
    }
}

impl TableExtractor for KeywordTableExtractor {
    fn extract_tables(&self, sql: &str) -> Vec<String> {
        let Some(tokens) = tokenize(sql) else {
            tracing::debug!(sql, "query does not tokenize, no tables");
            return Vec::new();
        };

        let mut tables: Vec<String> = Vec::new();
        let mut state = State::Scanning;
        let mut scopes: Vec<Scope> = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            i += 1;

            match token {
                Tok::Open => {
                    let query = tokens
                        .get(i)
                        .is_some_and(|next| next.is_keyword("SELECT") || next.is_keyword("WITH"));
                    scopes.push(Scope {
                        query,
                        resume: state.after_paren(),
                    });
                    state = State::Scanning;
                    continue;
                }
                Tok::Close => {
                    state = scopes.pop().map_or(State::Scanning, |scope| scope.resume);
                    continue;
                }
                _ => {}
            }

            // function arguments, column lists
            if scopes.last().is_some_and(|scope| !scope.query) {
                continue;
            }

            if let State::ExpectTable { from_list } = state {
                match token {
                    Tok::Word { upper: Some(upper), .. } if MODIFIERS.contains(&upper.as_str()) => {}
                    Tok::Word { value, .. } => {
                        let mut name = value.clone();
                        while let (Some(Tok::Dot), Some(Tok::Word { value: part, .. })) =
                            (tokens.get(i), tokens.get(i + 1))
                        {
                            name.push('.');
                            name.push_str(part);
                            i += 2;
                        }
                        if !name.is_empty() && !tables.contains(&name) {
                            tables.push(name);
                        }
                        state = if from_list {
                            State::AfterListTable
                        } else {
                            State::Scanning
                        };
                    }
                    _ => state = State::Scanning,
                }
                continue;
            }

            let upper = match token {
                Tok::Word { upper: Some(upper), .. } => Some(upper.as_str()),
                _ => None,
            };

            if state == State::AfterListTable {
                match (token, upper) {
                    (Tok::Comma, _) => {
                        state = State::ExpectTable { from_list: true };
                        continue;
                    }
                    (Tok::End, _) => state = State::Scanning,
                    (_, Some(word)) if CLAUSE_KEYWORDS.contains(&word) => state = State::Scanning,
                    (_, Some(word)) if is_join(word) => {}
                    // alias, `AS`
                    _ => continue,
                }
            }

            match upper {
                Some(word) if is_join(word) => state = State::ExpectTable { from_list: true },
                Some(word) if TABLE_KEYWORDS.contains(&word) => {
                    state = State::ExpectTable {
                        from_list: word == "FROM",
                    }
                }
                _ => {}
            }
        }

        tables
    }
}

fn is_join(upper: &str) -> bool {
    upper.ends_with("JOIN")
}

/// Token classes the extractor distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    /// `upper` is `None` for quoted identifiers, which are never keywords.
    Word { value: String, upper: Option<String> },
    Comma,
    Open,
    Close,
    Dot,
    End,
    Other,
}

impl Tok {
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Tok::Word { upper: Some(upper), .. } if upper == keyword)
    }
}

/// Significant tokens of `sql` per the MySQL tokenizer, `None` when it
/// rejects the text (an unterminated quote, say).
fn tokenize(sql: &str) -> Option<Vec<Tok>> {
    let tokens = Tokenizer::new(&MySqlDialect {}, sql).tokenize().ok()?;
    let significant = tokens
        .into_iter()
        .filter_map(|token| match token {
            Token::Whitespace(_) => None,
            Token::Word(word) => Some(Tok::Word {
                upper: word.quote_style.is_none().then(|| word.value.to_uppercase()),
                value: word.value,
            }),
            Token::Comma => Some(Tok::Comma),
            Token::LParen => Some(Tok::Open),
            Token::RParen => Some(Tok::Close),
            Token::Period => Some(Tok::Dot),
            Token::SemiColon => Some(Tok::End),
            _ => Some(Tok::Other),
        })
        .collect();
    Some(significant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn tables(sql: &str) -> Vec<String> {
        KeywordTableExtractor.extract_tables(sql)
    }

    #[rstest]
    #[case("SELECT page_id FROM page WHERE", &["page"])]
    #[case("INSERT INTO logs (a,b) VALUES (XYZ)", &["logs"])]
    #[case("INSERT IGNORE INTO `stats`.`hits` VALUES (XYZ)", &["stats.hits"])]
    #[case("UPDATE user", &["user"])]
    #[case("DELETE FROM sessions WHERE", &["sessions"])]
    #[case("SELECT * FROM a, b AS bb, c JOIN d ON", &["a", "b", "c", "d"])]
    #[case("SELECT * FROM a x LEFT JOIN b y USING (id)", &["a", "b"])]
    #[case("SELECT * FROM (SELECT id FROM inner_t) AS s", &["inner_t"])]
    #[case("CREATE TABLE IF NOT EXISTS tmp (id int)", &["tmp"])]
    #[case("SELECT a FROM t JOIN t ON", &["t"])]
    #[case("SELECT * FROM (SELECT id FROM a) s, b WHERE", &["a", "b"])]
    #[case("SELECT EXTRACT(YEAR FROM ts) FROM events WHERE", &["events"])]
    #[case("SELECT * FROM `my table` WHERE", &["my table"])]
    #[case("SELECT COUNT(*) FROM `page` JOIN `user` ON", &["page", "user"])]
    #[case("SELECT * FROM t WHERE x = 'abc", &[])]
    #[case("CALL refresh", &[])]
    #[case("SELECT N", &[])]
    #[case("", &[])]
    fn extracts_tables(#[case] sql: &str, #[case] expected: &[&str]) {
        assert_eq!(tables(sql), expected);
    }

    #[test]
    fn primary_table_defaults_to_unknown() {
        assert_eq!(primary_table(&KeywordTableExtractor, "CALL refresh"), UNKNOWN_TABLE);
        assert_eq!(primary_table(&KeywordTableExtractor, "SELECT * FROM a, b"), "a");
    }

    #[test]
    fn closures_are_extractors() {
        let fixed = |_: &str| vec!["fixed".to_string()];
        assert_eq!(primary_table(&fixed, "anything"), "fixed");
        let empty = |_: &str| vec![String::new()];
        assert_eq!(primary_table(&empty, "anything"), UNKNOWN_TABLE);
    }

    #[test]
    fn dangling_keyword_does_not_panic() {
        assert!(tables("SELECT * FROM").is_empty());
        assert!(tables("FROM (").is_empty());
    }
}
