//! crates/lms_core/src/video.rs
//!
//! Video-link helpers: extracting a playable id from the stored link,
//! building the embed URL, and recognizing live-class links.

use std::sync::OnceLock;

use regex::Regex;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&?/]+)")
            .expect("video url pattern is valid")
    })
}

fn bare_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id pattern is valid"))
}

/// Extracts the video id from a stored link. Accepts `watch?v=`, `youtu.be/`
/// and `embed/` URLs, plus a bare 11-character id. A link that yields no id
/// is unplayable.
pub fn youtube_video_id(url: &str) -> Option<&str> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if let Some(captures) = url_pattern().captures(url) {
        return captures.get(1).map(|m| m.as_str());
    }
    if bare_id_pattern().is_match(url) {
        return Some(url);
    }
    None
}

/// The privacy-enhanced embed URL with the player locked down: no related
/// videos, no keyboard control, no player-level fullscreen button (fullscreen
/// goes through the app's own control instead).
pub fn embed_url(video_id: &str) -> String {
    format!(
        "https://www.youtube-nocookie.com/embed/{video_id}?autoplay=1&rel=0&modestbranding=1&controls=1&disablekb=1&fs=0&iv_load_policy=3&playsinline=1"
    )
}

/// Whether a course's live-session link points at a service we know how to
/// hand off to. Anything else never surfaces the live-class button.
pub fn is_live_class_link(url: &str) -> bool {
    let lower = url.to_lowercase();
    ["zoom.us", "meet.google.com", "youtube.com", "teams.microsoft.com"]
        .iter()
        .any(|host| lower.contains(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_ids_from_all_supported_url_forms() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn id_stops_at_query_separators() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn rejects_non_video_links() {
        assert_eq!(youtube_video_id(""), None);
        assert_eq!(youtube_video_id("   "), None);
        assert_eq!(youtube_video_id("https://example.com/watch?v=x"), None);
        assert_eq!(youtube_video_id("tooshort"), None);
    }

    #[test]
    fn embed_url_pins_the_player_parameters() {
        let url = embed_url("dQw4w9WgXcQ");
        assert!(url.starts_with("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?"));
        assert!(url.contains("fs=0"));
        assert!(url.contains("disablekb=1"));
    }

    #[test]
    fn recognizes_live_class_hosts_case_insensitively() {
        assert!(is_live_class_link("https://us02web.Zoom.us/j/123"));
        assert!(is_live_class_link("https://meet.google.com/abc-defg-hij"));
        assert!(is_live_class_link("https://teams.microsoft.com/l/meetup"));
        assert!(is_live_class_link("https://www.youtube.com/live/xyz"));
        assert!(!is_live_class_link("https://example.com/live"));
        assert!(!is_live_class_link(""));
    }
}
