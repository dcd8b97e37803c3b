/// Sort direction for [`Query::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// PostgREST query-string builder.
///
/// Produces `(name, value)` pairs; percent-encoding is left to the HTTP
/// client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column projection, e.g. `*` or `created_at,articles(*)`.
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.params.push((column.into(), format!("eq.{value}")));
        self
    }

    /// Case-insensitive `LIKE`; `*` is the wildcard.
    pub fn ilike(mut self, column: &str, pattern: &str) -> Self {
        self.params.push((column.into(), format!("ilike.{pattern}")));
        self
    }

    /// Disjunction of raw filter expressions: `or=(a.eq.1,b.eq.2)`.
    pub fn or(mut self, filters: &[String]) -> Self {
        self.params
            .push(("or".into(), format!("({})", filters.join(","))));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction, nulls_last: bool) -> Self {
        let mut value = match direction {
            Direction::Asc => format!("{column}.asc"),
            Direction::Desc => format!("{column}.desc"),
        };
        if nulls_last {
            value.push_str(".nullslast");
        }
        self.params.push(("order".into(), value));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.params.push(("limit".into(), limit.to_string()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Remove characters that PostgREST treats as filter syntax.
///
/// Commas and parentheses delimit `or=(...)` groups and `*` is the `ilike`
/// wildcard. Dots and colons stay: only the first two dots of a filter are
/// delimiters, so `title.ilike.*Node.js*` still matches "Node.js".
/// Whitespace runs are collapsed.
pub fn sanitize_term(term: &str) -> String {
    term.chars()
        .map(|c| match c {
            ',' | '(' | ')' | '*' | '"' | '\\' | '%' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(query: &Query) -> Vec<(&str, &str)> {
        query
            .params()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_builder_order_is_preserved() {
        let query = Query::new()
            .select("*")
            .eq("status", "published")
            .order("published_at", Direction::Desc, true)
            .limit(50);

        assert_eq!(
            pairs(&query),
            vec![
                ("select", "*"),
                ("status", "eq.published"),
                ("order", "published_at.desc.nullslast"),
                ("limit", "50"),
            ]
        );
    }

    #[test]
    fn test_or_group() {
        let query = Query::new().or(&[
            "title.ilike.*rust*".to_string(),
            "summary.ilike.*rust*".to_string(),
        ]);
        assert_eq!(
            pairs(&query),
            vec![("or", "(title.ilike.*rust*,summary.ilike.*rust*)")]
        );
    }

    #[test]
    fn test_ascending_without_nulls_last() {
        let query = Query::new().order("name", Direction::Asc, false);
        assert_eq!(pairs(&query), vec![("order", "name.asc")]);
    }

    #[test]
    fn test_sanitize_term() {
        assert_eq!(sanitize_term("rust"), "rust");
        assert_eq!(sanitize_term("  climate   change "), "climate change");
        assert_eq!(sanitize_term("a,b)or=(id.eq.1"), "a b or= id.eq.1");
        assert_eq!(sanitize_term("100%*"), "100");
        assert_eq!(sanitize_term("***"), "");
        assert_eq!(sanitize_term("naïve café"), "naïve café");
    }

    #[test]
    fn test_sanitize_keeps_dots_and_colons() {
        assert_eq!(sanitize_term("Node.js"), "Node.js");
        assert_eq!(sanitize_term("U.S. election"), "U.S. election");
        assert_eq!(sanitize_term("GPT-3.5"), "GPT-3.5");
        assert_eq!(sanitize_term("10:30 briefing"), "10:30 briefing");
    }
}
