use blinkwise_model::HighlightRecord;
use scraper::{Html, Selector};

use crate::ExtractError;

pub const CLASS_BOOK_TITLE: &str = "text-markersV2__items__item__subheadline";
pub const CLASS_HIGHLIGHT: &str = "text-markersV2__items__item__highlight__text";
pub const CLASS_CHAPTER: &str = "text-markersV2__items__item__highlight__chapter";

/// Parse every highlight visible on a rendered Blinkist highlights page.
///
/// Titles, highlight texts and chapters are interleaved in document order.
/// A chapter marker closes one highlight, combining it with the most recent
/// title and highlight text seen before it. Records come back in page
/// order, which is most recent first once the page is sorted by date.
///
/// A page with no markers at all is an error. A page whose markers never
/// reach a chapter yields an empty list.
pub fn parse_highlights_page(html: &str) -> Result<Vec<HighlightRecord>, ExtractError> {
    let document = Html::parse_document(html);

    let selector_str = [CLASS_BOOK_TITLE, CLASS_HIGHLIGHT, CLASS_CHAPTER]
        .iter()
        .map(|class| format!("div.{class}"))
        .collect::<Vec<_>>()
        .join(", ");
    let markers = Selector::parse(&selector_str).expect("valid selector");

    let mut records = Vec::new();
    let mut book_title = String::new();
    let mut highlight = String::new();
    let mut seen = 0usize;

    for element in document.select(&markers) {
        seen += 1;
        let text: String = element.text().collect();
        let classes: Vec<&str> = element.value().classes().collect();

        if classes.contains(&CLASS_BOOK_TITLE) {
            book_title = text;
        } else if classes.contains(&CLASS_HIGHLIGHT) {
            highlight = text;
        } else {
            records.push(HighlightRecord {
                source_title: book_title.clone(),
                chapter: text,
                text: highlight.clone(),
            });
        }
    }

    if seen == 0 {
        return Err(ExtractError::NoHighlightMarkers);
    }

    tracing::debug!(markers = seen, highlights = records.len(), "Parsed highlights page");
    Ok(records)
}

/// Whether an inline `style` attribute leaves the element displayed as a block.
pub fn is_displayed_block(style: &str) -> bool {
    style.split(';').any(|decl| {
        let mut parts = decl.splitn(2, ':');
        let property = parts.next().unwrap_or_default().trim();
        let value = parts.next().unwrap_or_default().trim();
        property.eq_ignore_ascii_case("display") && value.eq_ignore_ascii_case("block")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, highlights: &[(&str, &str)]) -> String {
        let mut html = format!(r#"<div class="text-markersV2__items__item">
            <div class="text-markersV2__items__item__subheadline">{title}</div>"#);
        for (text, chapter) in highlights {
            html.push_str(&format!(
                r#"<div class="text-markersV2__items__item__highlight">
                    <div class="text-markersV2__items__item__highlight__text">{text}</div>
                    <div class="text-markersV2__items__item__highlight__chapter">{chapter}</div>
                </div>"#
            ));
        }
        html.push_str("</div>");
        html
    }

    #[test]
    fn test_parse_interleaved_markers() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            item("Deep Work", &[("Focus is a skill.", "Rule #1"), ("Embrace boredom.", "Rule #2")]),
            item("Atomic Habits", &[("Small habits compound.", "Introduction")]),
        );

        let records = parse_highlights_page(&html).unwrap();

        assert_eq!(
            records,
            vec![
                HighlightRecord::new("Deep Work", "Rule #1", "Focus is a skill."),
                HighlightRecord::new("Deep Work", "Rule #2", "Embrace boredom."),
                HighlightRecord::new("Atomic Habits", "Introduction", "Small habits compound."),
            ]
        );
    }

    #[test]
    fn test_text_is_not_trimmed() {
        let html = item("Deep Work", &[("\n  Focus is a skill.  \n", "Rule #1")]);
        let records = parse_highlights_page(&html).unwrap();
        assert_eq!(records[0].text, "\n  Focus is a skill.  \n");
    }

    #[test]
    fn test_nested_markup_text_is_collected() {
        let html = r#"<div class="text-markersV2__items__item__subheadline">Deep <b>Work</b></div>
            <div class="text-markersV2__items__item__highlight__text">Focus <em>is</em> a skill.</div>
            <div class="text-markersV2__items__item__highlight__chapter">Rule #1</div>"#;
        let records = parse_highlights_page(html).unwrap();
        assert_eq!(records[0].source_title, "Deep Work");
        assert_eq!(records[0].text, "Focus is a skill.");
    }

    #[test]
    fn test_no_markers_is_an_error() {
        let html = "<html><body><p>You have no highlights yet.</p></body></html>";
        assert!(matches!(
            parse_highlights_page(html),
            Err(ExtractError::NoHighlightMarkers)
        ));
    }

    #[test]
    fn test_markers_without_chapter_give_empty_list() {
        let html = r#"<div class="text-markersV2__items__item__subheadline">Deep Work</div>"#;
        assert_eq!(parse_highlights_page(html).unwrap(), vec![]);
    }

    #[test]
    fn test_markers_on_other_tags_are_ignored() {
        let html = r#"<span class="text-markersV2__items__item__highlight__chapter">Rule #1</span>"#;
        assert!(parse_highlights_page(html).is_err());
    }

    #[test]
    fn test_is_displayed_block() {
        assert!(is_displayed_block("display: block;"));
        assert!(is_displayed_block("color: red; display:block"));
        assert!(!is_displayed_block("display: none;"));
        assert!(!is_displayed_block(""));
    }
}
