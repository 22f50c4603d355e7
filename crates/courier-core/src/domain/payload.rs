//! DeliveryPayload - 配送プラットフォームへ渡すメッセージ
//!
//! プラットフォーム固有の整形（embed など）はアダプタ側の責務です。
//! ここでは表示上限に合わせたタイトルの切り詰めと、リンクの組み立てだけを行います。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::item::Item;

/// Marker appended to truncated titles.
pub const ELLIPSIS: &str = "...";

/// Accent color used for item notifications.
pub const ITEM_ACCENT_COLOR: u32 = 0xffa500;

/// Everything a delivery adapter needs to render one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    pub title: String,
    pub title_url: String,
    pub author: String,
    pub author_url: String,
    pub summary: String,
    pub scope_label: String,
    pub timestamp: DateTime<Utc>,
    pub accent_color: u32,
}

impl DeliveryPayload {
    /// Build the payload for `item`.
    ///
    /// `base_url` is the content provider's site root (no trailing slash).
    pub fn for_item(item: &Item, base_url: &str, title_limit: usize) -> Self {
        Self {
            title: truncate_title(&item.title, title_limit),
            title_url: item_url(base_url, &item.permalink),
            author: item.author.clone(),
            author_url: author_url(base_url, &item.author),
            summary: engagement_summary(item.score, item.comment_count),
            scope_label: format!("On r/{}", item.scope),
            timestamp: item.created_at,
            accent_color: ITEM_ACCENT_COLOR,
        }
    }
}

/// Truncate `title` to at most `limit` characters.
///
/// Titles longer than `limit` keep `limit - ELLIPSIS.len()` characters followed
/// by [`ELLIPSIS`]. Counted in chars so multi-byte titles never split.
pub fn truncate_title(title: &str, limit: usize) -> String {
    if title.chars().count() <= limit {
        return title.to_string();
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = title.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Canonical URL of an item.
pub fn item_url(base_url: &str, permalink: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), permalink)
}

/// Profile URL of an author. The name is form-urlencoded.
pub fn author_url(base_url: &str, author: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(author.as_bytes()).collect();
    format!("{}/u/{}", base_url.trim_end_matches('/'), encoded)
}

pub fn engagement_summary(score: i64, comment_count: u64) -> String {
    format!("{score} votes and {comment_count} comments so far")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemId, Scope};
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case::short("hello", 10, "hello")]
    #[case::exactly_at_limit("abcdefghij", 10, "abcdefghij")]
    #[case::one_over("abcdefghijk", 10, "abcdefg...")]
    #[case::multibyte("ロケット打ち上げ成功です", 8, "ロケット打...")]
    fn truncate_title_cases(#[case] title: &str, #[case] limit: usize, #[case] expected: &str) {
        let out = truncate_title(title, limit);
        assert_eq!(out, expected);
        assert!(out.chars().count() <= limit);
    }

    #[test]
    fn long_title_truncated_to_platform_limit() {
        let title = "x".repeat(300);
        let out = truncate_title(&title, 256);
        assert_eq!(out.chars().count(), 256);
        assert!(out.ends_with(ELLIPSIS));
        assert_eq!(&out[..253], &title[..253]);
    }

    #[test]
    fn author_url_is_form_encoded() {
        assert_eq!(
            author_url("https://www.reddit.com", "a b&c"),
            "https://www.reddit.com/u/a+b%26c"
        );
    }

    #[test]
    fn payload_for_item() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 11, 50, 0).unwrap();
        let item = Item {
            id: ItemId::new("t3_p1"),
            scope: Scope::named("space"),
            permalink: "/r/space/comments/p1/launch/".into(),
            author: "astro".into(),
            title: "Launch today".into(),
            created_at: created,
            score: 42,
            comment_count: 7,
        };

        let payload = DeliveryPayload::for_item(&item, "https://www.reddit.com/", 256);

        assert_eq!(payload.title, "Launch today");
        assert_eq!(
            payload.title_url,
            "https://www.reddit.com/r/space/comments/p1/launch/"
        );
        assert_eq!(payload.author_url, "https://www.reddit.com/u/astro");
        assert_eq!(payload.summary, "42 votes and 7 comments so far");
        assert_eq!(payload.scope_label, "On r/space");
        assert_eq!(payload.timestamp, created);
        assert_eq!(payload.accent_color, ITEM_ACCENT_COLOR);
    }

    #[test]
    fn scope_label_keeps_provider_casing() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "id": "t3_p2",
            "scope": "SpaceX",
            "permalink": "/r/SpaceX/comments/p2/",
            "author": "astro",
            "title": "Static fire",
            "created_at": "2024-01-01T11:50:00Z",
            "score": 1,
            "comment_count": 0,
        }))
        .unwrap();

        let payload = DeliveryPayload::for_item(&item, "https://www.reddit.com", 256);

        assert_eq!(payload.scope_label, "On r/SpaceX");
    }
}
