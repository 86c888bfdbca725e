//! HTTP method selection for query statements.
//!
//! InfluxDB 1.x accepts read statements over GET and requires POST for
//! statements that mutate state. The selection below is the classic
//! substring heuristic: it scans the raw query text, not tokens, so a
//! quoted identifier that happens to contain a keyword (a measurement
//! named `select_data`, say) can be misclassified. That behavior is kept
//! for compatibility.

use reqwest::Method;

/// Keyword rules scanned top to bottom; the first substring match wins and
/// anything unmatched goes over POST. `INTO` outranks `SELECT` so that
/// `SELECT ... INTO` lands on the write path.
const METHOD_RULES: &[(&str, Method)] = &[
    ("INTO", Method::POST),
    ("SELECT", Method::GET),
    ("SHOW", Method::GET),
];

/// Pick the HTTP method for a query statement.
///
/// `SELECT` and `SHOW` statements go over GET; `SELECT ... INTO` and every
/// other statement (`ALTER`, `CREATE`, `DELETE`, `DROP`, `GRANT`, `KILL`,
/// `REVOKE`, ...) go over POST. The scan is case-sensitive on the raw
/// text.
pub fn select_method(query: &str) -> Method {
    for (keyword, method) in METHOD_RULES {
        if query.contains(keyword) {
            return method.clone();
        }
    }
    Method::POST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_use_get() {
        for query in [
            "SELECT * FROM \"temperatures\"",
            "SHOW FIELD KEYS from \"temperatures\"",
        ] {
            assert_eq!(select_method(query), Method::GET, "query: {}", query);
        }
    }

    #[test]
    fn test_writes_and_management_use_post() {
        for query in [
            "SELECT mean(value) as value INTO \"temperature_averages\" FROM \"temperatures\"",
            "ALTER RETENTION POLICY \"rp_four_weeks\" DEFAULT",
            "CREATE DATABASE \"new_db\"",
            "DELETE FROM \"temperatures\"",
            "DROP DATABASE \"new_db\"",
            "GRANT ALL TO \"user\"",
            "KILL QUERY 36",
            "REVOKE ALL PRIVILEGES FROM \"user\"",
        ] {
            assert_eq!(select_method(query), Method::POST, "query: {}", query);
        }
    }

    #[test]
    fn test_unrecognized_statement_uses_post() {
        assert_eq!(select_method("EXPLAIN ANALYZE things"), Method::POST);
    }

    #[test]
    fn test_substring_scan_is_literal() {
        // Known limitation: the keyword is matched anywhere in the raw
        // text, including inside quoted identifiers.
        assert_eq!(select_method("DROP DATABASE \"SELECTED\""), Method::GET);
    }
}
