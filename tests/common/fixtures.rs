//! Static SQL corpora and log documents used across harnesses.

/// `(raw SQL, canonical shape)` pairs taken from production-style traffic.
pub const CANONICAL_CORPUS: &[(&str, &str)] = &[
    (
        "SELECT /* WikiPage::loadPageData 10.8.62.53 */ page_id,page_len FROM `page` WHERE page_namespace = '0' AND page_title = 'Main_Page' LIMIT 1",
        "SELECT page_id,page_len FROM `page` WHERE",
    ),
    (
        "SELECT user_id FROM `user` WHERE user_name = 'Foo' LIMIT 1",
        "SELECT user_id FROM `user` WHERE",
    ),
    (
        "INSERT INTO `searchindex` (si_page,si_title,si_text) VALUES ('123','Foo','bar baz')",
        "INSERT INTO `searchindex` (si_page,si_title,si_text) VALUES (XYZ)",
    ),
    (
        "INSERT INTO logs (a,b) VALUES (1,2),(3,4),(5,6)",
        "INSERT INTO logs (a,b) VALUES (XYZ)",
    ),
    (
        "DELETE FROM `objectcache` WHERE keyname = 'foo:bar'",
        "DELETE FROM `objectcache` WHERE",
    ),
    ("CALL refresh_stats(12, 'daily')", "CALL refresh_stats(N..N"),
    (
        "update page set page_touched = '20240115' where page_id = 7",
        "update page",
    ),
    ("SELECT a FROM t LIMIT 10,20", "SELECT a FROM t LIMIT N..NN"),
    ("SELECT SNIPPETS(body, 'q') FROM docs", "SELECT SNIPPETS (body, X) FROM docs"),
    (
        "SELECT c FROM t ORDER BY id DESC LIMIT -1",
        "SELECT c FROM t ORDER BY id DESC LIMIT N",
    ),
    ("SELECT  *\n\tFROM   t", "SELECT * FROM t"),
    ("SELECT a:3:{i:0;i:1;i:2;} FROM t", "SELECT a:N:{N..N} FROM t"),
    (
        "SELECT x FROM t GROUP BY x HAVING count(*) > 5",
        "SELECT x FROM t GROUP BY x HAVING count(*) > N",
    ),
    (r"SELECT 'it\'s' AS x FROM t", "SELECT X AS x FROM t"),
    ("SELECT /* A */ 1 /* B */ FROM t", "SELECT FROM t"),
    ("SELECT 1,2,3", "SELECT N..NN"),
    ("SELECT 'a','b','c'", "SELECT X..XX"),
    ("SHOW TABLES", "SHOW TABLES"),
    ("BEGIN", "BEGIN"),
    ("   ", ""),
];

/// Queries that differ only in literals, list length or predicate and must
/// share a shape.
pub const EQUIVALENT_PAIRS: &[(&str, &str)] = &[
    (
        "SELECT * FROM page WHERE page_id = 1",
        "SELECT * FROM page WHERE page_id = 987654",
    ),
    (
        "SELECT * FROM page WHERE page_id IN (1,2)",
        "SELECT * FROM page WHERE page_title = 'Foo' AND page_namespace = 0",
    ),
    (
        "INSERT INTO t (a,b) VALUES (1,'x')",
        "INSERT INTO t (a,b) VALUES (2,'y'),(3,'z')",
    ),
    ("UPDATE user SET user_touched = 1", "UPDATE user SET user_name = 'x' WHERE user_id = 2"),
    ("SELECT a FROM t LIMIT 10", "SELECT a FROM t LIMIT 20"),
    ("SELECT 'foo' FROM t", "SELECT \"bar\" FROM t"),
    (
        "SELECT /* Foo::bar 10.0.0.1 */ a FROM t",
        "SELECT /* Baz::qux 10.0.0.2 */ a FROM t",
    ),
];

/// Queries that touch a different table or have a different kind and must
/// not share a shape.
pub const DISTINCT_PAIRS: &[(&str, &str)] = &[
    ("SELECT * FROM page WHERE page_id = 1", "SELECT * FROM revision WHERE rev_id = 1"),
    ("UPDATE page SET a = 1", "UPDATE user SET a = 1"),
    ("SELECT * FROM t", "DELETE FROM t"),
    ("INSERT INTO t VALUES (1,2)", "REPLACE INTO t VALUES (1,2)"),
];

/// JSON-lines log export with mixed kinds, aliases and one broken line.
/// All timestamps fall on 2024-01-15 between 10:00 and 11:00 UTC.
pub fn log_export_lines() -> Vec<String> {
    use super::builders::document_line;
    vec![
        document_line("wikicities", "WikiPage::load", "SELECT * FROM page WHERE page_id = 1", "2024-01-15T10:00:00Z"),
        document_line("wikicities", "WikiPage::load", "SELECT * FROM page WHERE page_id = 2", "2024-01-15T10:05:00Z"),
        document_line("uportal.mysql", "User::load", "SELECT user_id FROM user WHERE user_name = 'a'", "2024-01-15T10:10:00Z"),
        document_line("default", "User::load", "SELECT user_id FROM user WHERE user_name = 'b'", "2024-01-15T10:15:00Z"),
        "{ this is not json".to_string(),
        document_line("wikicities", "WikiPage::save", "UPDATE page SET page_touched = '1' WHERE page_id = 1", "2024-01-15T10:20:00Z"),
        serde_json::json!({ "@message": "not an SQL row", "@timestamp": "2024-01-15T10:25:00Z" }).to_string(),
        document_line("wikicities", "Old::query", "SELECT * FROM archive", "2024-01-14T10:00:00Z"),
    ]
}
