//! Filter query-string parsing shared by the page, the JSON view and the
//! downloads.

use stories_core::models::Granularity;
use stories_core::time_utils::parse_date;
use stories_core::{DashboardError, Result};
use stories_runtime::view::ViewQuery;

fn invalid(param: &str, value: &str) -> DashboardError {
    DashboardError::InvalidQuery {
        param: param.to_string(),
        value: value.to_string(),
    }
}

/// Parse `brand`, `content_type` (both repeatable), `from`, `to` and
/// `granularity`. Empty values are ignored, unknown keys are skipped.
pub fn parse_view_query(raw: Option<&str>) -> Result<ViewQuery> {
    let mut query = ViewQuery::default();
    let Some(raw) = raw else {
        return Ok(query);
    };

    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "brand" => {
                query.filter.brands.insert(value.to_string());
            }
            "content_type" => {
                query.filter.content_types.insert(value.to_string());
            }
            "from" => {
                query.filter.from = Some(parse_date(value).ok_or_else(|| invalid("from", value))?);
            }
            "to" => {
                query.filter.to = Some(parse_date(value).ok_or_else(|| invalid("to", value))?);
            }
            "granularity" => {
                query.granularity =
                    Some(Granularity::parse(value).ok_or_else(|| invalid("granularity", value))?);
            }
            _ => {}
        }
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stories_core::ErrorKind;

    #[test]
    fn no_query_is_unrestricted() {
        let query = parse_view_query(None).unwrap();
        assert!(query.filter.is_unrestricted());
        assert_eq!(query.granularity, None);
        assert_eq!(parse_view_query(Some("")).unwrap(), ViewQuery::default());
    }

    #[test]
    fn repeatable_brands_and_types() {
        let query = parse_view_query(Some(
            "brand=Acme&brand=Globex+Group&content_type=Reel&content_type=Photo%20carousel",
        ))
        .unwrap();
        let brands: Vec<_> = query.filter.brands.iter().map(String::as_str).collect();
        assert_eq!(brands, vec!["Acme", "Globex Group"]);
        assert!(query.filter.content_types.contains("Photo carousel"));
        assert!(query.filter.content_types.contains("Reel"));
    }

    #[test]
    fn dates_and_granularity() {
        let query =
            parse_view_query(Some("from=2024-01-01&to=2024-03-31&granularity=quarterly")).unwrap();
        assert_eq!(query.filter.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(query.filter.to, NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(query.granularity, Some(Granularity::Quarterly));
    }

    #[test]
    fn empty_form_fields_are_ignored() {
        let query = parse_view_query(Some("from=&to=&brand=&other=1")).unwrap();
        assert!(query.filter.is_unrestricted());
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = parse_view_query(Some("from=31/01/2024")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("'from'"));

        let err = parse_view_query(Some("granularity=weekly")).unwrap_err();
        assert!(err.to_string().contains("weekly"));
    }
}
