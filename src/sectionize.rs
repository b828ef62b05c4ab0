//! Plan sectionizer.
//!
//! Splits generated plan text into an intro block and titled sections on
//! the backend's level-3 heading convention. Pure and total: safe to call
//! on any prefix of a still-streaming plan.

/// The heading token the backend emits before every section title.
const SECTION_DELIMITER: &str = "### ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionedPlan {
    pub intro: String,
    pub sections: Vec<PlanSection>,
}

/// Split `text` at every occurrence of `### `. Text before the first
/// occurrence is the intro; each later piece's first line is a section
/// title and the remainder its content, all trimmed.
pub fn sectionize(text: &str) -> SectionedPlan {
    let mut pieces = text.split(SECTION_DELIMITER);

    // `split` always yields at least one piece, even for the empty string.
    let intro = pieces.next().unwrap_or_default().trim().to_string();

    let sections = pieces
        .map(|piece| {
            let (title, content) = match piece.split_once('\n') {
                Some((first, rest)) => (first, rest),
                None => (piece, ""),
            };
            PlanSection {
                title: title.trim().to_string(),
                content: content.trim().to_string(),
            }
        })
        .collect();

    SectionedPlan { intro, sections }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_delimiter_is_all_intro() {
        let got = sectionize("  A plain paragraph.\n");
        assert_eq!(got.intro, "A plain paragraph.");
        assert!(got.sections.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_plan() {
        let got = sectionize("");
        assert_eq!(got.intro, "");
        assert!(got.sections.is_empty());
    }

    #[test]
    fn splits_into_titled_sections() {
        let got = sectionize("A### T1\nB\n### T2\nC");
        assert_eq!(got.intro, "A");
        assert_eq!(
            got.sections,
            vec![
                PlanSection {
                    title: "T1".to_string(),
                    content: "B".to_string(),
                },
                PlanSection {
                    title: "T2".to_string(),
                    content: "C".to_string(),
                },
            ]
        );
    }

    #[test]
    fn delimiter_at_start_leaves_empty_intro() {
        let got = sectionize("### Flights\nBook early.");
        assert_eq!(got.intro, "");
        assert_eq!(got.sections.len(), 1);
        assert_eq!(got.sections[0].title, "Flights");
        assert_eq!(got.sections[0].content, "Book early.");
    }

    #[test]
    fn adjacent_delimiters_yield_empty_section() {
        let got = sectionize("intro### ### Hotels\ncheap");
        assert_eq!(got.intro, "intro");
        assert_eq!(got.sections.len(), 2);
        assert_eq!(got.sections[0].title, "");
        assert_eq!(got.sections[0].content, "");
        assert_eq!(got.sections[1].title, "Hotels");
    }

    #[test]
    fn title_only_section_has_empty_content() {
        let got = sectionize("### Weather");
        assert_eq!(got.sections.len(), 1);
        assert_eq!(got.sections[0].title, "Weather");
        assert_eq!(got.sections[0].content, "");
    }

    #[test]
    fn delimiter_mid_line_still_splits() {
        // The delimiter is matched anywhere, not only at line starts.
        let got = sectionize("see below### Food\ntapas");
        assert_eq!(got.intro, "see below");
        assert_eq!(got.sections[0].title, "Food");
    }

    #[test]
    fn is_idempotent_on_identical_input() {
        let text = "Intro\n### Flights\nGRU-LIS\n### Hotels\nAlfama";
        assert_eq!(sectionize(text), sectionize(text));
    }

    #[test]
    fn tolerates_streaming_prefixes() {
        let full = "Intro text### Flights\nFlight info### Hotels\nHotel info";
        for end in 0..=full.len() {
            if full.is_char_boundary(end) {
                // Must never panic, whatever the cut point.
                let _ = sectionize(&full[..end]);
            }
        }
        let got = sectionize(full);
        assert_eq!(got.intro, "Intro text");
        assert_eq!(got.sections.len(), 2);
        assert_eq!(got.sections[0].title, "Flights");
        assert_eq!(got.sections[1].title, "Hotels");
    }
}
