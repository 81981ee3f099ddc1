//! Snapshot comparison: the core of the price-watch provider's
//! change-detection logic, including the zero-result spam-protection
//! override.

use std::collections::HashMap;

use super::model::{DiffKind, Product, ProductDiff};

/// Compare a freshly fetched/filtered product list against the previous
/// snapshot (`None` on first run).
///
/// Returns the ordered list of reportable diffs and whether *anything*
/// changed (including metadata-only drift and deletions, which force a
/// snapshot refresh without producing a diff entry).
///
/// `current` is sorted in place by `(low_price asc, title asc)` — this is
/// both the order diffs are reported in and the order the current-list
/// rendering uses.
pub fn compare(current: &mut Vec<Product>, prev: Option<&[Product]>) -> (Vec<ProductDiff>, bool) {
    let prev_by_key: HashMap<&str, &Product> = prev
        .unwrap_or(&[])
        .iter()
        .map(|p| (p.product_id.as_str(), p))
        .collect();

    current.sort_by(|a, b| {
        a.low_price
            .cmp(&b.low_price)
            .then_with(|| a.title.cmp(&b.title))
    });

    let mut diffs = Vec::new();
    let mut has_changes = false;

    for product in current.iter() {
        match prev_by_key.get(product.product_id.as_str()) {
            None => {
                diffs.push(ProductDiff {
                    kind: DiffKind::New,
                    product: product.clone(),
                    prev: None,
                });
                has_changes = true;
            }
            Some(prev_product) => {
                if product.low_price != prev_product.low_price {
                    diffs.push(ProductDiff {
                        kind: DiffKind::PriceChanged,
                        product: product.clone(),
                        prev: Some((*prev_product).clone()),
                    });
                    has_changes = true;
                } else if !product.content_equals(prev_product) {
                    has_changes = true;
                }
            }
        }
    }

    let prev_len = prev.map(|p| p.len()).unwrap_or(0);

    // Spam protection: a previously non-empty snapshot going to zero results
    // is far more likely to be a transient upstream hiccup than real
    // delisting of every product — never let it through, regardless of
    // anything computed above.
    if current.is_empty() && prev_len > 0 {
        return (Vec::new(), false);
    }

    if current.len() != prev_len {
        has_changes = true;
    }

    (diffs, has_changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, title: &str, price: i64) -> Product {
        Product {
            product_id: id.into(),
            product_type: "1".into(),
            title: title.into(),
            link: format!("https://link/{id}"),
            low_price: price,
            mall_name: "TestMall".into(),
        }
    }

    #[test]
    fn empty_current_against_no_prev_has_no_changes() {
        let (diffs, changed) = compare(&mut Vec::new(), None);
        assert!(diffs.is_empty());
        assert!(!changed);
    }

    #[test]
    fn first_run_reports_all_as_new() {
        let mut current = vec![product("1", "A", 100), product("2", "B", 50)];
        let (diffs, changed) = compare(&mut current, None);
        assert!(changed);
        assert_eq!(diffs.len(), 2);
        assert!(diffs.iter().all(|d| d.kind == DiffKind::New));
        // sorted ascending by price
        assert_eq!(diffs[0].product.product_id, "2");
        assert_eq!(diffs[1].product.product_id, "1");
    }

    #[test]
    fn identical_current_and_prev_has_no_changes() {
        let prev = vec![product("1", "A", 100)];
        let mut current = vec![product("1", "A", 100)];
        let (diffs, changed) = compare(&mut current, Some(&prev));
        assert!(diffs.is_empty());
        assert!(!changed);
    }

    #[test]
    fn price_change_is_reported_with_prev() {
        let prev = vec![product("789", "Widget", 10000)];
        let mut current = vec![product("789", "Widget", 8000)];
        let (diffs, changed) = compare(&mut current, Some(&prev));
        assert!(changed);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DiffKind::PriceChanged);
        assert_eq!(diffs[0].prev.as_ref().unwrap().low_price, 10000);
        assert_eq!(diffs[0].product.low_price, 8000);
    }

    #[test]
    fn metadata_only_drift_refreshes_without_a_diff_entry() {
        let prev = vec![product("1", "Old Title", 100)];
        let mut current = vec![product("1", "New Title", 100)];
        let (diffs, changed) = compare(&mut current, Some(&prev));
        assert!(diffs.is_empty());
        assert!(changed);
    }

    #[test]
    fn zero_results_against_nonempty_prev_is_spam_protected() {
        let prev = vec![product("1", "A", 100)];
        let mut current = Vec::new();
        let (diffs, changed) = compare(&mut current, Some(&prev));
        assert!(diffs.is_empty());
        assert!(!changed);
    }

    #[test]
    fn zero_results_against_empty_prev_has_no_changes() {
        let mut current = Vec::new();
        let (diffs, changed) = compare(&mut current, Some(&[]));
        assert!(diffs.is_empty());
        assert!(!changed);
    }

    #[test]
    fn removed_item_refreshes_without_a_diff_entry() {
        let prev = vec![product("1", "A", 100), product("2", "B", 200)];
        let mut current = vec![product("1", "A", 100)];
        let (diffs, changed) = compare(&mut current, Some(&prev));
        assert!(diffs.is_empty());
        assert!(changed);
    }

    #[test]
    fn diffs_are_sorted_by_price_then_title() {
        let mut current = vec![
            product("1", "Zeta", 500),
            product("2", "Alpha", 100),
            product("3", "Beta", 100),
        ];
        let (diffs, _) = compare(&mut current, None);
        let titles: Vec<&str> = diffs.iter().map(|d| d.product.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Zeta"]);
    }
}
