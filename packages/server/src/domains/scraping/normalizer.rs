//! Maps provider items onto [`NormalizedRecord`].
//!
//! Provider items change shape between actor versions, so each output field
//! has an ordered list of source keys. The first key holding a usable value
//! wins; if none does, the field gets its default. Normalization never fails.

use serde_json::Value;

use super::models::NormalizedRecord;

const POST_TITLE_KEYS: &[&str] = &["postTitle", "post_title", "title"];
const TEXT_KEYS: &[&str] = &["text", "comment", "message"];
const LIKES_KEYS: &[&str] = &["likesCount", "likes", "reactions"];
const SOURCE_URL_KEYS: &[&str] = &["sourceUrl", "facebookUrl", "facebook_url", "postUrl", "url"];
const PROFILE_ID_KEYS: &[&str] = &["profileId", "profile_id"];
const PROFILE_NAME_KEYS: &[&str] = &["profileName", "profile_name", "author"];
const PROFILE_PICTURE_KEYS: &[&str] = &["profilePicture", "profile_picture"];

const DEFAULT_LIKES: &str = "0";
const PROFILE_URL_PREFIX: &str = "https://www.facebook.com/";

/// Normalize one provider item. `fallback_url` is used when the item carries
/// no URL of its own.
pub fn normalize_item(item: &Value, fallback_url: &str) -> NormalizedRecord {
    let profile_id = first_text(item, PROFILE_ID_KEYS).unwrap_or_default();
    let profile_url = profile_url(&profile_id);

    NormalizedRecord {
        post_title: first_text(item, POST_TITLE_KEYS).unwrap_or_default(),
        text: first_text(item, TEXT_KEYS).unwrap_or_default(),
        likes_count: first_text(item, LIKES_KEYS).unwrap_or_else(|| DEFAULT_LIKES.to_string()),
        source_url: first_text(item, SOURCE_URL_KEYS).unwrap_or_else(|| fallback_url.to_string()),
        profile_id,
        profile_name: first_text(item, PROFILE_NAME_KEYS).unwrap_or_default(),
        profile_url,
        profile_picture: first_text(item, PROFILE_PICTURE_KEYS).unwrap_or_default(),
    }
}

/// Truncate `items` to `limit` and normalize what is left.
///
/// Returns the kept raw items alongside their records, in provider order.
pub fn normalize_items(
    mut items: Vec<Value>,
    limit: usize,
    fallback_url: &str,
) -> (Vec<Value>, Vec<NormalizedRecord>) {
    if items.len() > limit {
        tracing::debug!(
            returned = items.len(),
            limit,
            "Provider returned more items than requested, discarding the excess"
        );
        items.truncate(limit);
    }

    let records = items
        .iter()
        .map(|item| normalize_item(item, fallback_url))
        .collect();

    (items, records)
}

fn profile_url(profile_id: &str) -> String {
    if profile_id.is_empty() {
        String::new()
    } else {
        format!("{PROFILE_URL_PREFIX}{profile_id}")
    }
}

fn first_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find_map(scalar_text)
}

/// Strings (non-empty), numbers and booleans count as present. Null, empty
/// strings, arrays and objects do not.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn basic(record: &NormalizedRecord) -> (&str, &str, &str, &str) {
        (
            &record.post_title,
            &record.text,
            &record.likes_count,
            &record.source_url,
        )
    }

    #[test]
    fn falls_back_across_alternate_keys() {
        let record = normalize_item(
            &json!({"title": "T", "comment": "C", "likes": 5}),
            "https://fb.example/post/1",
        );
        assert_eq!(basic(&record), ("T", "C", "5", "https://fb.example/post/1"));
    }

    #[test]
    fn empty_item_gets_defaults() {
        let record = normalize_item(&json!({}), "U");
        assert_eq!(basic(&record), ("", "", "0", "U"));
        assert_eq!(record.profile_id, "");
        assert_eq!(record.profile_name, "");
        assert_eq!(record.profile_url, "");
        assert_eq!(record.profile_picture, "");
    }

    #[test]
    fn empty_fallback_url_yields_empty_source() {
        let record = normalize_item(&json!({"text": "hi"}), "");
        assert_eq!(record.source_url, "");
    }

    #[test]
    fn earlier_keys_win() {
        let record = normalize_item(
            &json!({
                "postTitle": "primary",
                "title": "secondary",
                "text": "body",
                "message": "other body",
                "likesCount": "12",
                "reactions": 99,
                "facebookUrl": "https://fb.example/a",
                "url": "https://fb.example/b",
            }),
            "https://fb.example/fallback",
        );
        assert_eq!(basic(&record), ("primary", "body", "12", "https://fb.example/a"));
    }

    #[test]
    fn null_and_empty_values_fall_through() {
        let record = normalize_item(
            &json!({"postTitle": null, "post_title": "", "title": "T", "likesCount": null, "likes": 0}),
            "U",
        );
        assert_eq!(record.post_title, "T");
        assert_eq!(record.likes_count, "0");
    }

    #[test]
    fn url_keys_in_order() {
        let record = normalize_item(&json!({"postUrl": "https://fb.example/p", "url": "https://fb.example/u"}), "U");
        assert_eq!(record.source_url, "https://fb.example/p");

        let record = normalize_item(&json!({"url": "https://fb.example/u"}), "U");
        assert_eq!(record.source_url, "https://fb.example/u");
    }

    #[test]
    fn profile_url_only_when_profile_id_present() {
        let record = normalize_item(
            &json!({"profileId": "100012345", "profileName": "Ana", "profilePicture": "https://cdn.example/a.jpg"}),
            "U",
        );
        assert_eq!(record.profile_id, "100012345");
        assert_eq!(record.profile_name, "Ana");
        assert_eq!(record.profile_url, "https://www.facebook.com/100012345");
        assert_eq!(record.profile_picture, "https://cdn.example/a.jpg");
    }

    #[test]
    fn total_over_odd_shapes() {
        let odd_inputs = [
            json!(null),
            json!(42),
            json!("just a string"),
            json!([1, 2, 3]),
            json!({"text": {"nested": true}, "likes": [1], "title": false}),
        ];

        for input in odd_inputs {
            let record = normalize_item(&input, "U");
            assert_eq!(record.source_url, "U");
            assert!(!record.likes_count.is_empty());
        }

        let record = normalize_item(&json!({"text": {"nested": true}, "title": false}), "U");
        assert_eq!(record.text, "");
        assert_eq!(record.post_title, "false");
    }

    #[test]
    fn normalizing_a_normalized_record_is_identity() {
        let original = normalize_item(
            &json!({
                "title": "Post",
                "comment": "Nice \"quote\"",
                "reactions": 17,
                "url": "https://fb.example/c/9",
                "profile_id": "77",
                "author": "Bo",
            }),
            "https://fb.example/fallback",
        );

        let as_raw = serde_json::to_value(&original).unwrap();
        assert_eq!(normalize_item(&as_raw, "https://elsewhere.example"), original);
    }

    #[test]
    fn excess_items_are_discarded_before_normalizing() {
        let items: Vec<Value> = (0..10).map(|i| json!({"text": format!("c{i}")})).collect();
        let (kept, records) = normalize_items(items, 4, "U");

        assert_eq!(kept.len(), 4);
        assert_eq!(records.len(), 4);
        assert_eq!(records[3].text, "c3");
    }

    #[test]
    fn short_sequences_are_untouched() {
        let items = vec![json!({"text": "only"})];
        let (kept, records) = normalize_items(items, 50, "U");
        assert_eq!(kept.len(), 1);
        assert_eq!(records[0].text, "only");
    }
}
