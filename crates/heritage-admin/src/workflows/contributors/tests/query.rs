use std::collections::HashSet;
use std::sync::Arc;

use super::common::{summary, MemoryStore};
use crate::workflows::contributors::domain::{ApplicationId, ContributorStatus};
use crate::workflows::contributors::query::{
    filter_sort_paginate, ContributorSearch, QueryError, SearchError, SearchQuery, SortOrder,
};

fn query(page: u32, page_size: u32) -> SearchQuery {
    SearchQuery {
        page,
        page_size,
        ..SearchQuery::default()
    }
}

fn fixture(count: u32) -> Vec<crate::workflows::contributors::domain::ContributorSummary> {
    (1..=count)
        .map(|i| {
            summary(
                i,
                &format!("Curator {i:02}"),
                &format!("curator{i:02}@heritage.example"),
                ContributorStatus::Applied,
                1 + (i % 28),
            )
        })
        .collect()
}

#[test]
fn pagination_splits_25_elements_into_3_pages_of_10() {
    let page1 = filter_sort_paginate(fixture(25), &query(1, 10));
    assert_eq!(page1.total_elements, 25);
    assert_eq!(page1.total_pages, 3);
    assert_eq!(page1.items.len(), 10);

    let page3 = filter_sort_paginate(fixture(25), &query(3, 10));
    assert_eq!(page3.items.len(), 5);
    assert_eq!(page3.total_pages, 3);
}

#[test]
fn page_beyond_the_last_is_empty_with_totals_intact() {
    let page4 = filter_sort_paginate(fixture(25), &query(4, 10));
    assert!(page4.items.is_empty());
    assert_eq!(page4.total_elements, 25);
    assert_eq!(page4.total_pages, 3);
    assert_eq!(page4.page, 4);
}

#[test]
fn name_ties_break_by_id_ascending() {
    let mut items = vec![
        summary(3, "Ada Nkemelu", "ada@heritage.example", ContributorStatus::Active, 5),
        summary(1, "Ada Nkemelu", "ada2@heritage.example", ContributorStatus::Active, 9),
        summary(2, "Ada Nkemelu", "ada3@heritage.example", ContributorStatus::Active, 7),
    ];
    items.reverse();

    let page = filter_sort_paginate(
        items,
        &SearchQuery {
            sort: SortOrder::NameAsc,
            ..query(1, 10)
        },
    );
    let ids: Vec<&ApplicationId> = page.items.iter().map(|item| &item.id).collect();
    assert_eq!(ids[0].0, "contrib-000001");
    assert_eq!(ids[1].0, "contrib-000002");
    assert_eq!(ids[2].0, "contrib-000003");
}

#[test]
fn date_ties_break_by_id_ascending_in_both_directions() {
    let items = vec![
        summary(2, "B", "b@heritage.example", ContributorStatus::Active, 5),
        summary(1, "A", "a@heritage.example", ContributorStatus::Active, 5),
    ];

    for sort in [SortOrder::DateAsc, SortOrder::DateDesc] {
        let page = filter_sort_paginate(items.clone(), &SearchQuery { sort, ..query(1, 10) });
        assert_eq!(page.items[0].id.0, "contrib-000001", "{sort:?}");
        assert_eq!(page.items[1].id.0, "contrib-000002", "{sort:?}");
    }
}

#[test]
fn keyword_matches_name_and_email_case_insensitively() {
    let items = vec![
        summary(1, "Marguerite Okonkwo", "m.okonkwo@heritage.example", ContributorStatus::Active, 3),
        summary(2, "Jan Smit", "jan@archief.example", ContributorStatus::Active, 4),
    ];

    let by_name = filter_sort_paginate(
        items.clone(),
        &SearchQuery {
            keyword: Some("OKONKWO".to_string()),
            ..query(1, 10)
        },
    );
    assert_eq!(by_name.items.len(), 1);
    assert_eq!(by_name.items[0].id.0, "contrib-000001");

    let by_email = filter_sort_paginate(
        items,
        &SearchQuery {
            keyword: Some("archief".to_string()),
            ..query(1, 10)
        },
    );
    assert_eq!(by_email.items.len(), 1);
    assert_eq!(by_email.items[0].id.0, "contrib-000002");
}

#[test]
fn blank_keyword_applies_no_text_filter() {
    let page = filter_sort_paginate(
        fixture(4),
        &SearchQuery {
            keyword: Some("   ".to_string()),
            ..query(1, 10)
        },
    );
    assert_eq!(page.total_elements, 4);
}

#[test]
fn status_filters_partition_the_snapshot() {
    let mut items = fixture(6);
    items[1].status = ContributorStatus::Active;
    items[4].status = ContributorStatus::Active;

    let applied = filter_sort_paginate(
        items.clone(),
        &SearchQuery {
            status: Some(ContributorStatus::Applied),
            ..query(1, 10)
        },
    );
    let active = filter_sort_paginate(
        items,
        &SearchQuery {
            status: Some(ContributorStatus::Active),
            ..query(1, 10)
        },
    );

    let applied_ids: HashSet<_> = applied.items.iter().map(|item| item.id.clone()).collect();
    let active_ids: HashSet<_> = active.items.iter().map(|item| item.id.clone()).collect();
    assert!(applied_ids.is_disjoint(&active_ids));
    assert_eq!(applied_ids.len() + active_ids.len(), 6);
}

#[test]
fn zero_page_size_is_a_validation_error_not_a_clamp() {
    let search = ContributorSearch::new(Arc::new(MemoryStore::default()));
    let result = search.search(&query(1, 0));
    assert!(matches!(
        result,
        Err(SearchError::Query(QueryError::InvalidPageSize))
    ));
}

#[test]
fn zero_page_is_rejected_because_pages_are_one_based() {
    let search = ContributorSearch::new(Arc::new(MemoryStore::default()));
    let result = search.search(&query(0, 10));
    assert!(matches!(
        result,
        Err(SearchError::Query(QueryError::InvalidPage))
    ));
}

#[test]
fn default_sort_is_newest_first() {
    assert_eq!(SortOrder::default(), SortOrder::DateDesc);
    let items = vec![
        summary(1, "A", "a@heritage.example", ContributorStatus::Applied, 2),
        summary(2, "B", "b@heritage.example", ContributorStatus::Applied, 9),
    ];
    let page = filter_sort_paginate(items, &query(1, 10));
    assert_eq!(page.items[0].id.0, "contrib-000002");
}
