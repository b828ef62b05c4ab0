//! Text rendering for plans.
//!
//! This module formats human-readable lines for text mode: section
//! headings with icons, the destination map line, and the preview line
//! used by `plans list`.

use crate::model::{GeoPoint, SavedPlan, TravelRequest};
use crate::sectionize::{sectionize, SectionedPlan};

/// Pre-formatted lines for text output.
pub struct PlanSummary {
    pub lines: Vec<String>,
}

/// Strip markdown emphasis markers and leading non-word symbols so
/// `**✈️ Flights**` renders as `Flights`.
pub fn display_title(title: &str) -> String {
    let stripped: String = title.chars().filter(|c| *c != '*').collect();
    stripped
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim()
        .to_string()
}

/// Pick a marker icon from keywords in the section title.
pub fn icon_for_section(title: &str) -> &'static str {
    let t = title.to_lowercase();
    if t.contains("flight") || t.contains("airline") {
        "✈️"
    } else if t.contains("hotel") || t.contains("accommodation") || t.contains("stay") {
        "🏨"
    } else if t.contains("activit") || t.contains("itinerary") || t.contains("day") {
        "🗺️"
    } else if t.contains("weather") || t.contains("climate") {
        "🌦️"
    } else if t.contains("food") || t.contains("dining") || t.contains("restaurant") {
        "🍽️"
    } else {
        "✨"
    }
}

/// The card preview: the first line with enough substance to stand alone.
pub fn preview_line(plan_text: &str) -> &str {
    plan_text
        .lines()
        .find(|line| line.chars().count() > 50)
        .unwrap_or("Your travel plan...")
}

fn push_header(lines: &mut Vec<String>, request: &TravelRequest) {
    lines.push(format!(
        "Trip to {} (from {})",
        request.destination, request.origin
    ));
    match request.return_date {
        Some(ret) => lines.push(format!("{} to {}", request.departure_date, ret)),
        None => lines.push(format!("departing {}", request.departure_date)),
    }
}

/// Build the full text summary for a finished plan.
pub fn build_plan_summary(
    request: &TravelRequest,
    plan_text: &str,
    map: Option<GeoPoint>,
) -> PlanSummary {
    let mut lines = Vec::new();
    push_header(&mut lines, request);
    if let Some(point) = map {
        lines.push(format!("Map: {:.5}, {:.5}", point.lat, point.lon));
    }
    lines.push(String::new());

    let SectionedPlan { intro, sections } = sectionize(plan_text);
    if !intro.is_empty() {
        lines.push(intro);
        lines.push(String::new());
    }
    for section in &sections {
        lines.push(format!(
            "{} {}",
            icon_for_section(&section.title),
            display_title(&section.title)
        ));
        if !section.content.is_empty() {
            lines.push(section.content.clone());
        }
        lines.push(String::new());
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    PlanSummary { lines }
}

/// One row of `plans list` output.
pub fn list_entry(plan: &SavedPlan) -> String {
    let req = &plan.request;
    let dates = match req.return_date {
        Some(ret) => format!("{} to {}", req.departure_date, ret),
        None => req.departure_date.to_string(),
    };
    format!(
        "{}\n  {} -> {} | {}\n  {}",
        plan.id,
        req.origin,
        req.destination,
        dates,
        preview_line(&plan.plan_text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> TravelRequest {
        TravelRequest {
            origin: "Porto".to_string(),
            destination: "Rome".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            return_date: Some(NaiveDate::from_ymd_opt(2026, 9, 8).unwrap()),
            total_budget: 3000.0,
            nightly_budget: 200.0,
            preferences: "ruins, pasta, long evening walks".to_string(),
        }
    }

    #[test]
    fn display_title_strips_emphasis_and_leading_symbols() {
        assert_eq!(display_title("**Flights**"), "Flights");
        assert_eq!(display_title("✈️ Flights"), "Flights");
        assert_eq!(display_title("-- Day 1: Arrival"), "Day 1: Arrival");
        assert_eq!(display_title("Hotels"), "Hotels");
    }

    #[test]
    fn icons_match_section_keywords() {
        assert_eq!(icon_for_section("Flights and airlines"), "✈️");
        assert_eq!(icon_for_section("Hotel options"), "🏨");
        assert_eq!(icon_for_section("Day-by-day itinerary"), "🗺️");
        assert_eq!(icon_for_section("Weather outlook"), "🌦️");
        assert_eq!(icon_for_section("Food and dining"), "🍽️");
        assert_eq!(icon_for_section("Packing tips"), "✨");
    }

    #[test]
    fn preview_skips_short_lines() {
        let text = "# Title\nshort\nThis line is comfortably longer than fifty characters, promise.\nrest";
        assert!(preview_line(text).starts_with("This line"));
        assert_eq!(preview_line("all\nshort\nlines"), "Your travel plan...");
    }

    #[test]
    fn summary_contains_header_sections_and_map() {
        let plan = "Welcome to Rome### Flights\nGRU to FCO### Hotels\nTrastevere";
        let map = Some(GeoPoint {
            lat: 41.89332,
            lon: 12.48293,
        });
        let summary = build_plan_summary(&request(), plan, map);
        let text = summary.lines.join("\n");
        assert!(text.contains("Trip to Rome (from Porto)"));
        assert!(text.contains("Map: 41.89332, 12.48293"));
        assert!(text.contains("✈️ Flights"));
        assert!(text.contains("🏨 Hotels"));
        assert!(text.contains("Welcome to Rome"));
    }

    #[test]
    fn summary_without_map_has_no_map_line() {
        let summary = build_plan_summary(&request(), "just intro", None);
        assert!(!summary.lines.iter().any(|l| l.starts_with("Map:")));
    }
}
