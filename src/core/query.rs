//! Pagination parameters and the page-metadata wire contract

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

/// Pagination parameters as they arrive from a query string.
///
/// Both fields are optional; [`Paginate::page`] and [`Paginate::limit`]
/// apply the normalization every listing strategy relies on: absolute
/// value, with zero/missing falling back to page 1 and limit 10.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Paginate {
    pub per_page: Option<i64>,
    pub current_page: Option<i64>,
}

impl Paginate {
    /// Requested page, normalized (>= 1).
    pub fn page(&self) -> i64 {
        match self.current_page.map(i64::abs) {
            Some(0) | None => DEFAULT_PAGE,
            Some(p) => p,
        }
    }

    /// Requested page size, normalized (>= 1).
    pub fn limit(&self) -> i64 {
        match self.per_page.map(i64::abs) {
            Some(0) | None => DEFAULT_LIMIT,
            Some(l) => l,
        }
    }
}

/// Caller-specified sort for [`find_with_options`].
///
/// `sort_order` must be `1` (ascending) or `-1` (descending); anything else
/// is rejected as a bad request before any query runs.
///
/// [`find_with_options`]: crate::storage::Repository::find_with_options
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub sort_by: String,
    pub sort_order: i32,
}

/// Page metadata returned alongside every listing result.
///
/// The serialized field names are a wire contract consumed by API clients;
/// they must not change. `next_page`/`previous_page` serialize as `null`
/// when out of range, not as absent keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Total live records matching the filter.
    pub total_index: i64,
    pub total_page: i64,
    pub current_page: i64,
    pub next_page: Option<i64>,
    pub previous_page: Option<i64>,
    pub starting_index: i64,
    pub ending_index: i64,
    pub items_on_current_page: i64,
    pub limit: i64,
    pub sort_by: String,
    pub sort_order: i32,
}

impl PageInfo {
    /// Compute page metadata from a matched count.
    ///
    /// This is the single implementation shared by the two-query and the
    /// aggregation listing strategies; `page` and `limit` are expected to be
    /// already normalized via [`Paginate`].
    pub fn compute(total_index: i64, page: i64, limit: i64, sort_by: &str, sort_order: i32) -> Self {
        let total_page = if total_index <= 0 {
            0
        } else {
            (total_index + limit - 1) / limit
        };

        Self {
            total_index,
            total_page,
            current_page: page,
            next_page: (total_page > page).then(|| page + 1),
            previous_page: (page > 1).then(|| page - 1),
            starting_index: limit * (page - 1) + 1,
            ending_index: limit * page,
            items_on_current_page: i64::min(limit, total_index - limit * (page - 1)),
            limit,
            sort_by: sort_by.to_string(),
            sort_order,
        }
    }
}

/// A page of data plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub page: PageInfo,
    pub data: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_defaults() {
        let p = Paginate::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn paginate_normalizes_negative_and_zero() {
        let p = Paginate {
            per_page: Some(-25),
            current_page: Some(-3),
        };
        assert_eq!(p.page(), 3);
        assert_eq!(p.limit(), 25);

        let zeroed = Paginate {
            per_page: Some(0),
            current_page: Some(0),
        };
        assert_eq!(zeroed.page(), 1);
        assert_eq!(zeroed.limit(), 10);
    }

    #[test]
    fn paginate_deserializes_camel_case() {
        let p: Paginate = serde_json::from_str(r#"{"perPage": 5, "currentPage": 2}"#).unwrap();
        assert_eq!(p.limit(), 5);
        assert_eq!(p.page(), 2);
    }

    #[test]
    fn twenty_five_records_page_two_of_ten() {
        let info = PageInfo::compute(25, 2, 10, "_id", -1);
        assert_eq!(info.total_index, 25);
        assert_eq!(info.total_page, 3);
        assert_eq!(info.current_page, 2);
        assert_eq!(info.next_page, Some(3));
        assert_eq!(info.previous_page, Some(1));
        assert_eq!(info.starting_index, 11);
        assert_eq!(info.ending_index, 20);
        assert_eq!(info.items_on_current_page, 10);
    }

    #[test]
    fn last_partial_page() {
        let info = PageInfo::compute(25, 3, 10, "_id", -1);
        assert_eq!(info.next_page, None);
        assert_eq!(info.previous_page, Some(2));
        assert_eq!(info.items_on_current_page, 5);
    }

    #[test]
    fn first_page_has_no_previous() {
        let info = PageInfo::compute(25, 1, 10, "_id", -1);
        assert_eq!(info.previous_page, None);
        assert_eq!(info.next_page, Some(2));
        assert_eq!(info.starting_index, 1);
        assert_eq!(info.ending_index, 10);
    }

    #[test]
    fn empty_result_set() {
        let info = PageInfo::compute(0, 1, 10, "_id", -1);
        assert_eq!(info.total_page, 0);
        assert_eq!(info.next_page, None);
        assert_eq!(info.previous_page, None);
        assert_eq!(info.items_on_current_page, 0);
    }

    #[test]
    fn metadata_invariants_hold_across_page_limit_pairs() {
        for &total in &[0i64, 1, 9, 10, 11, 25, 100, 101] {
            for &limit in &[1i64, 3, 10, 50] {
                for page in 1..=6 {
                    let info = PageInfo::compute(total, page, limit, "_id", -1);
                    let expected_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
                    assert_eq!(info.total_page, expected_pages);
                    assert_eq!(
                        info.items_on_current_page,
                        i64::min(limit, total - limit * (page - 1))
                    );
                    match info.next_page {
                        Some(n) => assert_eq!(n, page + 1),
                        None => assert!(expected_pages <= page),
                    }
                    match info.previous_page {
                        Some(p) => assert_eq!(p, page - 1),
                        None => assert_eq!(page, 1),
                    }
                }
            }
        }
    }

    #[test]
    fn wire_contract_field_names() {
        let info = PageInfo::compute(25, 2, 10, "_id", -1);
        let json = serde_json::to_value(&info).unwrap();
        for key in [
            "totalIndex",
            "totalPage",
            "currentPage",
            "nextPage",
            "previousPage",
            "startingIndex",
            "endingIndex",
            "itemsOnCurrentPage",
            "limit",
            "sortBy",
            "sortOrder",
        ] {
            assert!(json.get(key).is_some(), "missing wire field {key}");
        }
        assert_eq!(json["totalIndex"], 25);
        assert_eq!(json["sortBy"], "_id");
        assert_eq!(json["sortOrder"], -1);
    }

    #[test]
    fn out_of_range_next_page_serializes_as_null() {
        let info = PageInfo::compute(5, 1, 10, "_id", -1);
        let json = serde_json::to_value(&info).unwrap();
        assert!(json["nextPage"].is_null());
        assert!(json["previousPage"].is_null());
    }
}
