//! Announcement text
//!
//! Hashtags come from the album's top tags: the first tag is skipped and up
//! to the next four are kept in order. Albums with one tag or none get no
//! hashtags at all.

use crate::types::{Tag, TopAlbum};

/// Number of hashtags appended at most
pub const MAX_HASHTAGS: usize = 4;

/// Build the announcement for `album` over the month named `month_name`
pub fn compose_message(album: &TopAlbum, month_name: &str) -> String {
    let mut message = format!(
        "In {}, I thought the album {} by {} was 🔥 I've scrobbled songs from it {} times. {}\n",
        month_name, album.title, album.artist, album.playcount, album.url
    );

    for tag in hashtags(&album.tags) {
        message.push_str(&tag);
        message.push(' ');
    }

    message
}

/// Select and format the hashtags for a tag list
pub fn hashtags(tags: &[Tag]) -> Vec<String> {
    tags.iter()
        .skip(1)
        .take(MAX_HASHTAGS)
        .map(|tag| format!("#{}", normalize_tag(&tag.name)))
        .collect()
}

/// Trim, lower-case and strip spaces from a tag name
pub fn normalize_tag(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "")
}
