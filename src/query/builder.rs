use super::conditions::quote_identifier;
use crate::config::QueryRules;

impl QueryRules {
    /// Newest `limit` rows, presented oldest first
    pub fn rows_query(&self, where_clause: &str, limit: u32) -> String {
        let order = quote_identifier(&self.order_column);
        format!(
            "SELECT * FROM (SELECT * FROM {}{} ORDER BY {order} DESC LIMIT {limit}) AS reordered ORDER BY {order} ASC",
            quote_identifier(&self.table),
            leading_space(where_clause),
        )
    }

    /// Count matching rows, stopping one past the ceiling
    pub fn count_query(&self, where_clause: &str) -> String {
        format!(
            "SELECT COUNT(*) AS total FROM (SELECT 1 FROM {}{} LIMIT {}) t1",
            quote_identifier(&self.table),
            leading_space(where_clause),
            self.count_ceiling.saturating_add(1),
        )
    }

    /// Display form of the rows query with literals in place of placeholders
    pub fn verbose_query(&self, verbose_clause: &str, limit: u32) -> String {
        format!(
            "SELECT * FROM {}{} ORDER BY {} DESC LIMIT {limit}",
            quote_identifier(&self.table),
            leading_space(verbose_clause),
            quote_identifier(&self.order_column),
        )
    }
}

fn leading_space(clause: &str) -> String {
    if clause.is_empty() {
        String::new()
    } else {
        format!(" {clause}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_query_without_filters() {
        let rules = QueryRules::default();
        assert_eq!(
            rules.rows_query("", 10),
            "SELECT * FROM (SELECT * FROM `messages` ORDER BY `TIMESTAMP` DESC LIMIT 10) AS reordered ORDER BY `TIMESTAMP` ASC"
        );
    }

    #[test]
    fn test_count_query_stops_past_ceiling() {
        let rules = QueryRules::default();
        assert_eq!(
            rules.count_query("WHERE `level`<=?"),
            "SELECT COUNT(*) AS total FROM (SELECT 1 FROM `messages` WHERE `level`<=? LIMIT 100001) t1"
        );
    }

    #[test]
    fn test_custom_table_and_order_column() {
        let rules = QueryRules {
            table: "logs".to_string(),
            order_column: "ts".to_string(),
            count_ceiling: 50,
            default_limit: 5,
        };
        assert_eq!(
            rules.verbose_query("WHERE `pid`>=10", 5),
            "SELECT * FROM `logs` WHERE `pid`>=10 ORDER BY `ts` DESC LIMIT 5"
        );
        assert!(rules.count_query("").ends_with("LIMIT 51) t1"));
    }
}
