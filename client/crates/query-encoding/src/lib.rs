//! Canonical query-string encoding for optional and repeated filter values.
//!
//! Browse endpoints accept many optional filters. Absent values must not be
//! sent at all (an empty `dateLowerBound=` is not the same as no bound), and
//! list filters are sent as repeated keys. [`QueryParams`] collects pairs in
//! call order and renders them the way a browser's `URLSearchParams` would:
//! `application/x-www-form-urlencoded`, prefixed with `?` when non-empty.
//!
//! # Example
//!
//! ```
//! use query_encoding::QueryParams;
//!
//! let court_ids = Some(vec![3_u64, 1]);
//! let query = QueryParams::new()
//!     .optional("sessionId", Some(7))
//!     .optional("dateLowerBound", None::<&str>)
//!     .optional("courtNameLike", Some(""))
//!     .repeated("courtIds", court_ids.iter().flatten())
//!     .to_query_string();
//!
//! assert_eq!(query, "?sessionId=7&courtIds=3&courtIds=1");
//! assert_eq!(QueryParams::new().to_query_string(), "");
//! ```

use std::fmt::{self, Display};

use url::form_urlencoded;

/// Ordered query pairs built from optional and repeated filter values.
///
/// ## Invariants
/// - No pair carries an empty scalar value added through
///   [`QueryParams::optional`].
/// - Pairs keep the order in which they were appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Start an empty parameter list.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append `key=value` when `value` is present and renders non-empty.
    ///
    /// Values are converted with [`Display`] only, so numbers and booleans
    /// appear verbatim (`7`, `true`).
    #[must_use]
    pub fn optional(mut self, key: &str, value: Option<impl Display>) -> Self {
        if let Some(rendered) = value
            .map(|inner| inner.to_string())
            .filter(|rendered| !rendered.is_empty())
        {
            self.pairs.push((key.to_owned(), rendered));
        }
        self
    }

    /// Append one `key=value` pair per element, preserving element order.
    ///
    /// An empty iterator appends nothing. Elements are not filtered.
    #[must_use]
    pub fn repeated<I>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.pairs.extend(
            values
                .into_iter()
                .map(|value| (key.to_owned(), value.to_string())),
        );
        self
    }

    /// Whether no pair has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of appended pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterate over the raw, unencoded pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Render the pairs as `""` or a string starting with `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish();
        format!("?{encoded}")
    }

    /// Append the rendered query to `path`.
    ///
    /// ```
    /// use query_encoding::QueryParams;
    ///
    /// let path = QueryParams::new()
    ///     .optional("courtNameLike", Some("A court"))
    ///     .append_to("/browse/court");
    /// assert_eq!(path, "/browse/court?courtNameLike=A+court");
    /// ```
    #[must_use]
    pub fn append_to(&self, path: &str) -> String {
        format!("{path}{}", self.to_query_string())
    }
}

impl Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for omission and repetition rules.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::absent(None)]
    #[case::empty(Some(""))]
    fn omits_absent_and_empty_scalars(#[case] value: Option<&str>) {
        let params = QueryParams::new().optional("dateLowerBound", value);
        assert!(params.is_empty());
        assert_eq!(params.to_query_string(), "");
    }

    #[rstest]
    #[case::number(Some(42_i64), "?slotId=42")]
    #[case::zero(Some(0_i64), "?slotId=0")]
    #[case::negative(Some(-3_i64), "?slotId=-3")]
    fn stringifies_numbers_verbatim(#[case] value: Option<i64>, #[case] expected: &str) {
        let query = QueryParams::new()
            .optional("slotId", value)
            .to_query_string();
        assert_eq!(query, expected);
    }

    #[test]
    fn stringifies_booleans_verbatim() {
        let query = QueryParams::new()
            .optional("active", Some(false))
            .to_query_string();
        assert_eq!(query, "?active=false");
    }

    #[test]
    fn repeats_array_elements_in_order() {
        let statuses = ["PENDING", "CONFIRMED", "PENDING"];
        let params = QueryParams::new().repeated("statuses", statuses);
        let pairs: Vec<_> = params.pairs().collect();
        assert_eq!(
            pairs,
            vec![
                ("statuses", "PENDING"),
                ("statuses", "CONFIRMED"),
                ("statuses", "PENDING"),
            ]
        );
        assert_eq!(
            params.to_query_string(),
            "?statuses=PENDING&statuses=CONFIRMED&statuses=PENDING"
        );
    }

    #[test]
    fn omits_absent_and_empty_arrays() {
        let absent: Option<Vec<u64>> = None;
        let empty: Option<Vec<u64>> = Some(Vec::new());
        let params = QueryParams::new()
            .repeated("courtIds", absent.iter().flatten())
            .repeated("courtIds", empty.iter().flatten());
        assert_eq!(params.to_query_string(), "");
    }

    #[test]
    fn keeps_append_order_across_kinds() {
        let query = QueryParams::new()
            .optional("sessionId", Some(1))
            .optional("dateLowerBound", Some("2025-01-01"))
            .repeated("courtIds", [5, 2])
            .optional("startTimeLowerBound", Some("08:00"))
            .to_query_string();
        assert_eq!(
            query,
            "?sessionId=1&dateLowerBound=2025-01-01&courtIds=5&courtIds=2&startTimeLowerBound=08%3A00"
        );
    }

    #[test]
    fn form_encodes_reserved_characters() {
        let query = QueryParams::new()
            .optional("courtNameLike", Some("A&B court"))
            .to_query_string();
        assert_eq!(query, "?courtNameLike=A%26B+court");
    }

    #[test]
    fn display_matches_query_string() {
        let params = QueryParams::new().optional("slotId", Some(9));
        assert_eq!(params.to_string(), "?slotId=9");
        assert_eq!(params.len(), 1);
    }
}
