// Splits raw dish entries into display lines.
//
// NEIS dish names carry allergen footnotes glued to the name
// (e.g. "된장국5.6.13.") or lead with an index ("1.백미밥"). The menu shows
// the name and the footnote on separate lines, and the first line is used
// as the emphasis key by the presenter, so this must stay a pure function.

/// Delimiter separating dishes inside a `DDISH_NM` blob.
pub const DISH_DELIMITER: &str = "<br/>";

const ANNOTATION_MARKER: char = '*';

/// Finds the split marker: the first `(`, `*`, or ASCII digit that is not
/// immediately followed by `/` (fractions like "1/2" are left alone).
fn find_marker(entry: &str) -> Option<(usize, char)> {
    let mut chars = entry.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            '(' | ANNOTATION_MARKER => return Some((idx, c)),
            d if d.is_ascii_digit() => {
                let before_slash = matches!(chars.peek(), Some((_, '/')));
                if !before_slash {
                    return Some((idx, d));
                }
            }
            _ => {}
        }
    }
    None
}

/// Segments one dish entry into one or two display lines.
///
/// - no marker: the entry as a single line
/// - leading marker (`"1.백미밥"`): `["1", ".백미밥"]`
/// - marker after text (`"된장국5.6."`): `["된장국", "5.6."]`, the marker is
///   kept at the front of the tail
/// - `*` is never re-prepended: `"밥*국"` gives `["밥", "국"]`, and an entry
///   that starts with `*` (or ends on it) stays a single unsplit line
/// - empty input gives no lines
pub fn segment_dish(entry: &str) -> Vec<String> {
    if entry.is_empty() {
        return Vec::new();
    }
    let Some((idx, marker)) = find_marker(entry) else {
        return vec![entry.to_string()];
    };

    let head = &entry[..idx];
    let rest = &entry[idx + marker.len_utf8()..];

    if marker == ANNOTATION_MARKER {
        if head.is_empty() || rest.is_empty() {
            return vec![entry.to_string()];
        }
        return vec![head.to_string(), rest.to_string()];
    }

    if head.is_empty() {
        if rest.is_empty() {
            return vec![entry.to_string()];
        }
        return vec![marker.to_string(), rest.to_string()];
    }

    let mut tail = String::with_capacity(rest.len() + marker.len_utf8());
    tail.push(marker);
    tail.push_str(rest);
    vec![head.to_string(), tail]
}

/// Tokenizes a raw dish blob: strips every whitespace character, then splits
/// on [`DISH_DELIMITER`]. Empty tokens are dropped.
pub fn split_dishes(blob: &str) -> Vec<String> {
    let compact: String = blob.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .split(DISH_DELIMITER)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_index_splits_into_marker_and_text() {
        assert_eq!(segment_dish("1.백미밥"), vec!["1", ".백미밥"]);
        assert_eq!(segment_dish("3.김치찌개"), vec!["3", ".김치찌개"]);
    }

    #[test]
    fn footnote_after_name_keeps_marker_on_tail() {
        assert_eq!(segment_dish("된장국5.6.13."), vec!["된장국", "5.6.13."]);
        assert_eq!(segment_dish("우유(200ml)"), vec!["우유", "(200ml)"]);
    }

    #[test]
    fn plain_dish_is_single_line() {
        assert_eq!(segment_dish("포크등심까스"), vec!["포크등심까스"]);
    }

    #[test]
    fn empty_entry_has_no_lines() {
        assert!(segment_dish("").is_empty());
    }

    #[test]
    fn star_marker_at_start_is_not_split() {
        assert_eq!(segment_dish("*자기주도학습"), vec!["*자기주도학습"]);
    }

    #[test]
    fn star_marker_mid_entry_is_dropped_not_prepended() {
        assert_eq!(segment_dish("밥*국"), vec!["밥", "국"]);
        assert_eq!(segment_dish("밥*"), vec!["밥*"]);
    }

    #[test]
    fn digit_before_slash_is_not_a_marker() {
        // '1' is skipped, '2' is the first eligible digit
        assert_eq!(segment_dish("사과1/2쪽"), vec!["사과1/", "2쪽"]);
        assert_eq!(segment_dish("1/"), vec!["1/"]);
    }

    #[test]
    fn lone_marker_stays_whole() {
        assert_eq!(segment_dish("7"), vec!["7"]);
        assert_eq!(segment_dish("김치1"), vec!["김치", "1"]);
    }

    #[test]
    fn segmentation_is_stable() {
        for entry in ["1.백미밥", "된장국5.6.", "*주의", "포크등심까스", ""] {
            assert_eq!(segment_dish(entry), segment_dish(entry));
        }
    }

    #[test]
    fn split_dishes_strips_whitespace_and_tokenizes() {
        let blob = "쌀밥 <br/>된장국 5.6.<br/> 배추김치 9.13.<br/>";
        assert_eq!(
            split_dishes(blob),
            vec!["쌀밥", "된장국5.6.", "배추김치9.13."]
        );
        assert!(split_dishes("   ").is_empty());
    }
}
