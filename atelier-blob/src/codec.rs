//! Filename codec: the path is the schema.
//!
//! Object-store metadata proved unreliable across uploads, so every field
//! a gallery entry needs is encoded into its blob path and recovered from
//! it. This module is the single formatter/parser pair for that grammar;
//! nothing else in the workspace derives fields from paths by hand.
//!
//! Final objects: `<gallery_prefix>/<category>-<cleaned>-<millis>-<suffix>.<ext>`
//! Temp chunks:   `<temp_prefix>/<file_id>/chunk-<index, zero-padded to 4>`

use chrono::Utc;
use uuid::Uuid;

use crate::{Category, GalleryConfig, MediaType};

/// Fields recovered from a blob path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMedia {
    pub category: Category,
    pub name: String,
    pub media_type: MediaType,
}

/// Encode a final media path.
///
/// Always produces a path; callers reject unknown categories before this
/// point. The millisecond timestamp plus random suffix make the path
/// practically unique even for identical names uploaded concurrently.
pub fn encode_media_key(
    config: &GalleryConfig,
    category: Category,
    original_name: &str,
    media_type: MediaType,
) -> String {
    let mut cleaned = clean_name(original_name, config.max_name_len);
    if cleaned.is_empty() {
        cleaned = "untitled".to_string();
    }
    let ext = extension_of(original_name)
        .unwrap_or_else(|| media_type.default_extension().to_string());
    let stamp = Utc::now().timestamp_millis();
    let suffix = short_suffix();

    format!(
        "{}/{}-{}-{}-{}.{}",
        config.gallery_prefix,
        category.as_str(),
        cleaned,
        stamp,
        suffix,
        ext
    )
}

/// Decode category, display name, and media type from an arbitrary blob path.
///
/// Total: the store may hold paths from older naming schemes or partially
/// corrupt keys, so unrecognizable input degrades to defaults instead of
/// failing. Category resolution tries the leading token, then a substring
/// scan, then [`Category::FALLBACK`].
pub fn decode_media_key(key: &str, content_type: Option<&str>) -> DecodedMedia {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((s, e)) if !e.is_empty() => (s, Some(e)),
        _ => (file_name, None),
    };

    let leading = Category::ALL
        .iter()
        .copied()
        .find(|c| stem == c.as_str() || stem.starts_with(&format!("{}-", c.as_str())));
    let category = leading
        .or_else(|| {
            Category::ALL
                .iter()
                .copied()
                .find(|c| stem.contains(c.as_str()))
        })
        .unwrap_or(Category::FALLBACK);

    let mut rest = stem;
    if let Some(c) = leading {
        rest = stem[c.as_str().len()..].trim_start_matches('-');
    }
    let name = humanize(strip_upload_suffix(rest));

    let media_type = MediaType::from_hints(content_type, extension);

    DecodedMedia {
        category,
        name,
        media_type,
    }
}

/// Prefix holding every temp chunk of one transfer
pub fn chunk_prefix(temp_prefix: &str, file_id: &str) -> String {
    format!("{temp_prefix}/{file_id}/")
}

/// Temp path for one chunk. Zero padding keeps lexicographic listings
/// aligned with numeric order for common chunk counts, but assembly order
/// always comes from [`parse_chunk_index`], never from the listing.
pub fn chunk_key(temp_prefix: &str, file_id: &str, index: u32) -> String {
    format!("{temp_prefix}/{file_id}/chunk-{index:04}")
}

/// Recover the numeric index from a temp chunk path
pub fn parse_chunk_index(key: &str) -> Option<u32> {
    let name = key.rsplit('/').next().unwrap_or(key);
    name.strip_prefix("chunk-")?.parse().ok()
}

fn short_suffix() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[..8].to_string()
}

fn is_extension(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= 5
        && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Lowercased extension of a filename, when it has a plausible one
pub(crate) fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, e)| e)
        .filter(|e| is_extension(e))
        .map(|e| e.to_ascii_lowercase())
}

fn clean_name(original: &str, max_len: usize) -> String {
    let stem = match original.rsplit_once('.') {
        Some((s, e)) if is_extension(e) => s,
        _ => original,
    };
    let filtered: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .collect();
    let dashed = filtered.split_whitespace().collect::<Vec<_>>().join("-");
    let truncated: String = dashed.to_lowercase().chars().take(max_len).collect();
    truncated.trim_matches('-').to_string()
}

fn is_timestamp(token: &str) -> bool {
    token.len() >= 10 && token.chars().all(|c| c.is_ascii_digit())
}

fn is_suffix_token(token: &str) -> bool {
    (4..=12).contains(&token.len()) && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Strip the trailing `-<timestamp>-<suffix>` (or bare `-<timestamp>`,
/// from the older scheme) off a name slug
fn strip_upload_suffix(stem: &str) -> &str {
    if let Some((head, tail)) = stem.rsplit_once('-') {
        if is_suffix_token(tail) {
            if let Some((head2, ts)) = head.rsplit_once('-') {
                if is_timestamp(ts) {
                    return head2;
                }
            }
        }
        if is_timestamp(tail) {
            return head;
        }
    }
    stem
}

fn humanize(slug: &str) -> String {
    let words: Vec<String> = slug
        .split(|c| c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(title_case_word)
        .collect();
    if words.is_empty() {
        "Untitled".to_string()
    } else {
        words.join(" ")
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GalleryConfig {
        GalleryConfig::default()
    }

    #[test]
    fn encodes_mead_making_video() {
        let key = encode_media_key(
            &config(),
            Category::MeadMaking,
            "First Batch!! 2024.mov",
            MediaType::Video,
        );
        assert!(
            key.starts_with("gallery/mead-making-first-batch-2024-"),
            "unexpected key: {key}"
        );
        assert!(key.ends_with(".mov"));
    }

    #[test]
    fn decode_recovers_name_from_encoded_key() {
        let key = encode_media_key(
            &config(),
            Category::MeadMaking,
            "First Batch!! 2024.mov",
            MediaType::Video,
        );
        let decoded = decode_media_key(&key, None);
        assert_eq!(decoded.category, Category::MeadMaking);
        assert_eq!(decoded.media_type, MediaType::Video);
        assert_eq!(decoded.name, "First Batch 2024");
    }

    #[test]
    fn category_and_type_round_trip_for_entire_set() {
        for category in Category::ALL {
            for media_type in [MediaType::Image, MediaType::Video] {
                // No extension on the input, so the type's default decides
                let key = encode_media_key(&config(), category, "Sample Piece", media_type);
                let decoded = decode_media_key(&key, None);
                assert_eq!(decoded.category, category, "key: {key}");
                assert_eq!(decoded.media_type, media_type, "key: {key}");
            }
        }
    }

    #[test]
    fn decode_falls_back_on_unrecognizable_paths() {
        for key in ["random/IMG_4032.JPG", "", "///", "no-category-here", "🦀🦀"] {
            let decoded = decode_media_key(key, None);
            assert_eq!(decoded.category, Category::FALLBACK, "key: {key}");
        }
        let decoded = decode_media_key("random/IMG_4032.JPG", None);
        assert_eq!(decoded.name, "IMG 4032");
        assert_eq!(decoded.media_type, MediaType::Image);
    }

    #[test]
    fn decode_substitutes_untitled_for_empty_names() {
        let key = encode_media_key(&config(), Category::Watercolors, "???.jpg", MediaType::Image);
        let decoded = decode_media_key(&key, None);
        assert_eq!(decoded.name, "Untitled");
    }

    #[test]
    fn content_type_hint_outranks_extension() {
        let decoded = decode_media_key("gallery/sketches-clip-1722945600000-a1b2c3d4.jpg", Some("video/mp4"));
        assert_eq!(decoded.media_type, MediaType::Video);
    }

    #[test]
    fn cleaned_name_is_truncated_and_collapsed() {
        let key = encode_media_key(
            &config(),
            Category::Vegetables,
            "The   Very First Heirloom Tomato Harvest Of The Season.png",
            MediaType::Image,
        );
        let token = key
            .strip_prefix("gallery/vegetables-")
            .unwrap()
            .split('-')
            .collect::<Vec<_>>();
        // cleaned portion is everything before timestamp and suffix
        let cleaned = token[..token.len() - 2].join("-");
        assert!(cleaned.len() <= 30, "cleaned token too long: {cleaned}");
        assert!(cleaned.starts_with("the-very-first"));
        assert!(!cleaned.contains("--"));
    }

    #[test]
    fn chunk_indices_sort_numerically_regardless_of_listing_order() {
        let indices = [7u32, 0, 10_000, 3, 9_999, 12, 1];
        let mut keys: Vec<String> = indices
            .iter()
            .map(|i| chunk_key("temp-chunks", "f1", *i))
            .collect();

        // Lexicographic order puts chunk-10000 before chunk-9999
        keys.sort();
        let pos_10000 = keys.iter().position(|k| k.ends_with("chunk-10000")).unwrap();
        let pos_9999 = keys.iter().position(|k| k.ends_with("chunk-9999")).unwrap();
        assert!(pos_10000 < pos_9999);

        // Parsing restores true numeric order
        let mut parsed: Vec<u32> = keys.iter().map(|k| parse_chunk_index(k).unwrap()).collect();
        parsed.sort_unstable();
        assert_eq!(parsed, vec![0, 1, 3, 7, 12, 9_999, 10_000]);
    }

    #[test]
    fn chunk_index_parser_rejects_foreign_keys() {
        assert_eq!(parse_chunk_index("temp-chunks/f1/chunk-0004"), Some(4));
        assert_eq!(parse_chunk_index("temp-chunks/f1/manifest"), None);
        assert_eq!(parse_chunk_index("temp-chunks/f1/chunk-12ab"), None);
        assert_eq!(parse_chunk_index("chunk-7"), Some(7));
    }

    #[test]
    fn underscores_survive_cleaning_and_humanize_as_spaces() {
        let key = encode_media_key(&config(), Category::Sketches, "barn_owl_study.png", MediaType::Image);
        assert!(key.starts_with("gallery/sketches-barn_owl_study-"));
        let decoded = decode_media_key(&key, None);
        assert_eq!(decoded.name, "Barn Owl Study");
    }
}
