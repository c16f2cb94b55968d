//! Field cleaners that turn raw corpus text into presentable values.
//!
//! Every function here is total: malformed input degrades to a documented
//! default (empty list, `"N/A"`, the fallback image, `None`) instead of an
//! error, so one bad row never affects the rest of the corpus.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?").expect("valid duration pattern"));

/// Remove the `c(...)` vector wrapper and embedded quotes left by the export
fn strip_wrappers(raw: &str) -> String {
    raw.replace("c(", "").replace(')', "").replace('"', "")
}

/// Split an ingredient blob on `;` or `,`
pub fn clean_ingredients(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    strip_wrappers(raw)
        .split([';', ','])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split instructions into steps on sentence terminators and newlines
pub fn clean_instructions(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    strip_wrappers(raw)
        .split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(str::to_string)
        .collect()
}

fn duration_parts(raw: Option<&str>) -> Option<(u32, u32)> {
    let caps = DURATION_RE.captures(raw?.trim())?;
    let part = |i: usize| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let (hours, minutes) = (part(1)?, part(2)?);
    if hours == 0 && minutes == 0 {
        return None;
    }
    Some((hours, minutes))
}

/// Format a `PT#H#M` duration as `"{h}h {m}m"`, or `"N/A"`
pub fn parse_duration(raw: Option<&str>) -> String {
    match duration_parts(raw) {
        Some((hours, minutes)) => format!("{hours}h {minutes}m"),
        None => "N/A".to_string(),
    }
}

/// Duration in whole minutes, `None` wherever [`parse_duration`] yields `"N/A"`
pub fn duration_minutes(raw: Option<&str>) -> Option<u32> {
    let (hours, minutes) = duration_parts(raw)?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// Pick the first usable image URL out of a possibly multi-valued field.
///
/// Never returns an empty string: the result is either an `http`-prefixed
/// URL from the field or `fallback`.
pub fn clean_image(raw: Option<&str>, fallback: &str) -> String {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return fallback.to_string(),
    };

    // The image scraper wrote its failures into the column
    if raw.starts_with("Error") {
        return fallback.to_string();
    }

    let cleaned = strip_wrappers(raw);
    let mut seen = HashSet::new();
    cleaned
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|url| !url.is_empty())
        .filter(|url| seen.insert(*url))
        .find(|url| url.starts_with("http"))
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Parse a numeric field, treating blanks, junk and non-finite values as unknown
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().and_then(finite)
}

pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "https://fallback.example.com/plate.jpg";

    #[test]
    fn test_clean_ingredients_strips_wrappers() {
        assert_eq!(
            clean_ingredients(Some(r#"c("chicken", "broth"; "carrot")"#)),
            vec!["chicken", "broth", "carrot"]
        );
        assert_eq!(clean_ingredients(Some(" , ;; ")), Vec::<String>::new());
        assert_eq!(clean_ingredients(None), Vec::<String>::new());
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let once = clean_ingredients(Some("salt, pepper"));
        assert_eq!(once, vec!["salt", "pepper"]);
        let twice = clean_ingredients(Some(&once.join(", ")));
        assert_eq!(once, twice);

        let steps = clean_instructions(Some("Boil water.\nAdd pasta! Drain?"));
        assert_eq!(steps, vec!["Boil water", "Add pasta", "Drain"]);
        assert_eq!(clean_instructions(Some(&steps.join(". "))), steps);

        let url = clean_image(Some(r#"c("http://a.jpg")"#), FALLBACK);
        assert_eq!(clean_image(Some(&url), FALLBACK), url);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(Some("PT1H20M")), "1h 20m");
        assert_eq!(parse_duration(Some("PT45M")), "0h 45m");
        assert_eq!(parse_duration(Some("PT2H")), "2h 0m");
        assert_eq!(parse_duration(Some("PT0H0M")), "N/A");
        assert_eq!(parse_duration(Some("PT")), "N/A");
        assert_eq!(parse_duration(Some("forty minutes")), "N/A");
        assert_eq!(parse_duration(Some("")), "N/A");
        assert_eq!(parse_duration(None), "N/A");
    }

    #[test]
    fn test_parse_duration_round_trips_all_components() {
        for h in [0u32, 1, 3, 24] {
            for m in [0u32, 5, 59] {
                let token = format!("PT{h}H{m}M");
                let expected = if h == 0 && m == 0 {
                    "N/A".to_string()
                } else {
                    format!("{h}h {m}m")
                };
                assert_eq!(parse_duration(Some(&token)), expected, "token {token}");
            }
        }
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(duration_minutes(Some("PT1H20M")), Some(80));
        assert_eq!(duration_minutes(Some("PT0H0M")), None);
        assert_eq!(duration_minutes(Some("PT99999999999H")), None);
        assert_eq!(duration_minutes(None), None);
    }

    #[test]
    fn test_clean_image_first_valid_url() {
        assert_eq!(
            clean_image(Some(r#"c("http://a.jpg","http://b.jpg")"#), FALLBACK),
            "http://a.jpg"
        );
        assert_eq!(
            clean_image(Some("character(0) https://x.com/1.jpg https://x.com/1.jpg"), FALLBACK),
            "https://x.com/1.jpg"
        );
    }

    #[test]
    fn test_clean_image_falls_back() {
        assert_eq!(clean_image(None, FALLBACK), FALLBACK);
        assert_eq!(clean_image(Some("   "), FALLBACK), FALLBACK);
        assert_eq!(clean_image(Some("character(0"), FALLBACK), FALLBACK);
        assert_eq!(
            clean_image(Some("Error: Message: timeout waiting for thumbnail"), FALLBACK),
            FALLBACK
        );
    }

    #[test]
    fn test_clean_image_never_empty() {
        for raw in ["", "c()", "\"\"", ",,,", "NA", "c(\"\")", "http", "Error"] {
            let url = clean_image(Some(raw), FALLBACK);
            assert!(!url.is_empty());
            assert!(url.starts_with("http"));
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some("170.9")), Some(170.9));
        assert_eq!(parse_number(Some(" 12 ")), Some(12.0));
        assert_eq!(parse_number(Some("NA")), None);
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(Some("inf")), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(None), None);
    }
}
