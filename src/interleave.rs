// src/interleave.rs
//! Interleaving of content and advertisement items.
//!
//! After every `frequency`-th content item (positions N, 2N, 3N, ...) one advertisement
//! slot is inserted. Slot `k` (1-based) takes advertisement `k - 1` if the feed has it and
//! the default placeholder otherwise, so exactly `M / N` slots are emitted and a trailing
//! group shorter than N gets none.

use std::num::NonZeroUsize;

use crate::feed::types::{AdvItem, ContentItem, DefaultAdv};
use crate::response::ResponseItem;

pub fn interleave(
    content: Vec<ContentItem>,
    ads: Vec<AdvItem>,
    frequency: NonZeroUsize,
    default_label: &str,
) -> Vec<ResponseItem> {
    let n = frequency.get();
    let mut out = Vec::with_capacity(content.len() + content.len() / n);
    let mut ads = ads.into_iter();

    for (i, item) in content.into_iter().enumerate() {
        out.push(ResponseItem::Content(item));
        if (i + 1) % n == 0 {
            out.push(match ads.next() {
                Some(ad) => ResponseItem::Advertisement(ad),
                None => ResponseItem::DefaultAdv(DefaultAdv::new(default_label)),
            });
        }
    }

    out
}

/// Number of advertisement slots `interleave` emits for `content_len` items.
pub fn slot_count(content_len: usize, frequency: NonZeroUsize) -> usize {
    content_len / frequency.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn articles(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| ContentItem {
                kind: "Article".into(),
                harvester_id: format!("a-{i}"),
                ..Default::default()
            })
            .collect()
    }

    fn ads(n: usize) -> Vec<AdvItem> {
        (0..n)
            .map(|i| AdvItem {
                kind: "Ad".into(),
                harvester_id: format!("ad-{i}"),
                ..Default::default()
            })
            .collect()
    }

    fn is_slot(item: &ResponseItem) -> bool {
        !matches!(item, ResponseItem::Content(_))
    }

    #[test]
    fn slots_land_on_every_nth_position() {
        for (m, n) in [(0, 1), (1, 1), (4, 2), (7, 3), (10, 5), (3, 4), (136, 5)] {
            let out = interleave(articles(m), ads(2), nz(n), "Default");
            assert_eq!(out.len(), m + m / n, "m={m} n={n}");
            assert_eq!(out.iter().filter(|i| is_slot(i)).count(), slot_count(m, nz(n)));

            // In output coordinates a slot follows every run of n content items.
            for (pos, item) in out.iter().enumerate() {
                assert_eq!(is_slot(item), (pos + 1) % (n + 1) == 0, "m={m} n={n} pos={pos}");
            }
        }
    }

    #[test]
    fn content_order_is_preserved() {
        let out = interleave(articles(9), ads(5), nz(2), "Default");
        let ids: Vec<_> = out
            .iter()
            .filter_map(|i| match i {
                ResponseItem::Content(c) => Some(c.harvester_id.clone()),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = (0..9).map(|i| format!("a-{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn exhausted_ads_fall_back_to_default() {
        let out = interleave(articles(3), ads(1), nz(1), "Sponsored");
        assert_eq!(out.len(), 6);
        match &out[1] {
            ResponseItem::Advertisement(ad) => assert_eq!(ad.harvester_id, "ad-0"),
            other => panic!("expected real ad, got {other:?}"),
        }
        for pos in [3, 5] {
            assert_eq!(
                out[pos],
                ResponseItem::DefaultAdv(DefaultAdv::new("Sponsored")),
                "pos={pos}"
            );
        }
    }

    #[test]
    fn ads_are_taken_in_feed_order() {
        let out = interleave(articles(6), ads(3), nz(2), "Default");
        let ad_ids: Vec<_> = out
            .iter()
            .filter_map(|i| match i {
                ResponseItem::Advertisement(a) => Some(a.harvester_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ad_ids, ["ad-0", "ad-1", "ad-2"]);
    }

    #[test]
    fn empty_content_yields_empty_output() {
        assert!(interleave(Vec::new(), ads(4), nz(1), "Default").is_empty());
    }

    #[test]
    fn trailing_partial_group_gets_no_slot() {
        let out = interleave(articles(7), ads(10), nz(3), "Default");
        assert_eq!(out.len(), 9);
        assert!(matches!(out.last(), Some(ResponseItem::Content(_))));
    }
}
