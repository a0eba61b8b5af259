use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;

/// Browser identity sent with every request
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("user-agent", USER_AGENT),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("connection", "keep-alive"),
    ("referer", "https://www.linkedin.com/"),
    ("cache-control", "max-age=0"),
];

/// Fixed header set emulating a desktop Chrome session.
/// Accept-Encoding is left to reqwest so it can decode what it advertises.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in BROWSER_HEADERS {
        if let (Ok(name), Ok(value)) = (
            header::HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

/// `base + U(-jitter, +jitter)` seconds, never negative
pub fn jittered_delay(base_seconds: f64, jitter_seconds: f64) -> Duration {
    // the sampled range must have a finite width
    let offset = if jitter_seconds > 0.0 && (jitter_seconds * 2.0).is_finite() {
        rand::rng().random_range(-jitter_seconds..=jitter_seconds)
    } else {
        0.0
    };
    seconds(base_seconds + offset)
}

pub fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Percent-encode spaces only, matching what the listing endpoint expects
pub fn encode_spaces(value: &str) -> String {
    value.replace(' ', "%20")
}

/// `"Software Intern"` -> `"Software_Intern"`
pub fn file_slug(value: &str) -> String {
    value.replace(' ', "_")
}

pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        assert_eq!(headers.len(), BROWSER_HEADERS.len());
        assert_eq!(headers.get(header::USER_AGENT).unwrap(), USER_AGENT);
        assert_eq!(
            headers.get(header::REFERER).unwrap(),
            "https://www.linkedin.com/"
        );
    }

    #[test]
    fn test_jittered_delay_bounds() {
        for _ in 0..100 {
            let delay = jittered_delay(15.0, 5.0).as_secs_f64();
            assert!((10.0..=20.0).contains(&delay));
        }
        assert_eq!(jittered_delay(0.0, 0.0), Duration::ZERO);
        for _ in 0..100 {
            assert!(jittered_delay(1.0, 5.0) <= Duration::from_secs(6));
        }
    }

    #[test]
    fn test_negative_delay_clamps_to_zero() {
        assert_eq!(seconds(-3.0), Duration::ZERO);
        assert_eq!(seconds(f64::NAN), Duration::ZERO);
        assert_eq!(seconds(2.5), Duration::from_millis(2500));
    }

    #[test]
    fn test_out_of_range_delays_do_not_panic() {
        assert_eq!(seconds(1e20), Duration::MAX);
        assert_eq!(jittered_delay(1.0, 1e308), Duration::from_secs(1));
        assert_eq!(jittered_delay(f64::MAX, 0.0), Duration::MAX);
    }

    #[test]
    fn test_encode_spaces() {
        assert_eq!(encode_spaces("Data Analyst Intern"), "Data%20Analyst%20Intern");
        assert_eq!(encode_spaces("Ireland"), "Ireland");
        assert_eq!(file_slug("New York"), "New_York");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("  <ul><li>", 5), "<ul");
        assert_eq!(preview("short", 100), "short");
    }
}
