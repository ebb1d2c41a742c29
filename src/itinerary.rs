use std::hash::Hash;

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::models::activity::Activity;

/// Key of one day-group. `None` is the "No Dates" bucket, which the
/// store sorts ahead of dated entries.
pub type DayKey = Option<NaiveDate>;

/// Buckets an already-sorted activity list by date, preserving both
/// the relative order of activities within a day and the order in
/// which days first appear. No sorting happens here; the persistence
/// gateway delivers rows ordered by (date, time, id).
pub fn group_by_date(activities: Vec<Activity>) -> IndexMap<DayKey, Vec<Activity>> {
    let mut groups: IndexMap<DayKey, Vec<Activity>> = IndexMap::new();
    for activity in activities {
        groups.entry(activity.at_date).or_default().push(activity);
    }
    groups
}

/// A pure slice of the grouping's keys for a 1-indexed page; values
/// are copied unchanged. Concatenating every page in order rebuilds
/// the original key order exactly.
pub fn paginate<K, V>(groups: &IndexMap<K, V>, page: i64, per_page: i64) -> IndexMap<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    let start = ((page - 1) * per_page).max(0) as usize;
    groups
        .iter()
        .skip(start)
        .take(per_page.max(0) as usize)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Ceiling division with a floor of 1: an empty collection still
/// renders as a single (empty) page.
pub fn total_pages(total_items: i64, per_page: i64) -> i64 {
    let pages = (total_items + per_page - 1) / per_page;
    pages.max(1)
}

/// Outcome of checking a requested page number against the page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCheck {
    /// The requested page is in range; show it as-is.
    Keep(i64),
    /// The request was out of range; redirect to the corrected page
    /// and tell the user.
    Correct(i64),
}

pub fn clamp_page(requested: i64, total_pages: i64) -> PageCheck {
    if requested < 1 {
        PageCheck::Correct(1)
    } else if requested > total_pages {
        PageCheck::Correct(total_pages)
    } else {
        PageCheck::Keep(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: i64, date: Option<&str>, title: &str) -> Activity {
        Activity {
            id,
            at_date: date.map(|d| d.parse().expect("test date")),
            at_time: None,
            title: title.to_string(),
            cost: None,
            note: None,
            trip_id: 1,
        }
    }

    #[test]
    fn total_pages_has_a_floor_of_one() {
        assert_eq!(total_pages(0, 4), 1);
        assert_eq!(total_pages(0, 8), 1);
        assert_eq!(total_pages(1, 4), 1);
        assert_eq!(total_pages(4, 4), 1);
        assert_eq!(total_pages(5, 4), 2);
        assert_eq!(total_pages(17, 8), 3);
    }

    #[test]
    fn clamp_page_corrects_out_of_range_requests() {
        assert_eq!(clamp_page(7, 3), PageCheck::Correct(3));
        assert_eq!(clamp_page(0, 3), PageCheck::Correct(1));
        assert_eq!(clamp_page(-2, 3), PageCheck::Correct(1));
        assert_eq!(clamp_page(1, 3), PageCheck::Keep(1));
        assert_eq!(clamp_page(3, 3), PageCheck::Keep(3));
    }

    #[test]
    fn grouping_preserves_order_and_buckets_undated_first() {
        // Query order: no-date rows first, then dated ones.
        let rows = vec![
            activity(3, None, "pack bags"),
            activity(7, None, "book flights"),
            activity(1, Some("2024-03-15"), "museum"),
            activity(2, Some("2024-03-15"), "dinner"),
            activity(5, Some("2024-03-16"), "hike"),
        ];
        let groups = group_by_date(rows);

        let keys: Vec<DayKey> = groups.keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                None,
                Some("2024-03-15".parse().unwrap()),
                Some("2024-03-16".parse().unwrap()),
            ]
        );

        let undated: Vec<i64> = groups[&None].iter().map(|a| a.id).collect();
        assert_eq!(undated, vec![3, 7]);

        let march_15: Vec<i64> = groups[&Some("2024-03-15".parse().unwrap())]
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(march_15, vec![1, 2]);
    }

    #[test]
    fn grouping_an_empty_itinerary_is_empty() {
        assert!(group_by_date(Vec::new()).is_empty());
    }

    #[test]
    fn pages_concatenate_back_to_the_original_keys() {
        let mut groups: IndexMap<i32, Vec<i32>> = IndexMap::new();
        for key in 0..10 {
            groups.insert(key, vec![key * 10]);
        }

        let per_page = 4;
        let pages = total_pages(groups.len() as i64, per_page);
        assert_eq!(pages, 3);

        let mut rebuilt: Vec<i32> = Vec::new();
        for page in 1..=pages {
            let slice = paginate(&groups, page, per_page);
            rebuilt.extend(slice.keys().copied());
        }
        let original: Vec<i32> = groups.keys().copied().collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn paginate_copies_values_unchanged() {
        let mut groups: IndexMap<i32, Vec<i32>> = IndexMap::new();
        groups.insert(1, vec![1, 2, 3]);
        groups.insert(2, vec![4]);

        let page = paginate(&groups, 1, 1);
        assert_eq!(page.len(), 1);
        assert_eq!(page[&1], vec![1, 2, 3]);

        let page = paginate(&groups, 2, 1);
        assert_eq!(page.len(), 1);
        assert_eq!(page[&2], vec![4]);
    }
}
