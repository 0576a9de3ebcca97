//! DOM helpers shared by the country extractors.
//!
//! All functions are synchronous: `scraper` types are `!Send`, so a parsed
//! document must never live across an `.await`.

use crate::error::ExtractionError;
use scraper::{ElementRef, Html, Selector};

/// Parse a CSS selector, reporting failures as parse errors.
pub fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Parse(format!("bad selector {css:?}: {e}")))
}

/// Visible text of an element with whitespace collapsed to single spaces.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of every element matching `css` inside `scope`.
pub fn texts_in(scope: ElementRef<'_>, css: &str) -> Result<Vec<String>, ExtractionError> {
    let sel = selector(css)?;
    Ok(scope.select(&sel).map(|el| element_text(&el)).collect())
}

/// First `<tag>` whose text satisfies `predicate`.
pub fn find_heading<'a, P>(
    document: &'a Html,
    tag: &str,
    predicate: P,
) -> Result<Option<ElementRef<'a>>, ExtractionError>
where
    P: Fn(&str) -> bool,
{
    let sel = selector(tag)?;
    Ok(document
        .select(&sel)
        .find(|el| predicate(&element_text(el))))
}

/// First `<tag>` (optionally carrying `class`) after `after` in document order.
///
/// Descendants of `after` count as following it.
pub fn find_next<'a>(
    document: &'a Html,
    after: ElementRef<'a>,
    tag: &str,
    class: Option<&str>,
) -> Option<ElementRef<'a>> {
    document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != after.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == tag
                && class.map_or(true, |c| el.value().classes().any(|have| have == c))
        })
}

/// Nearest enclosing `<tag>` of `el`.
pub fn closest<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == tag)
}

/// First element matching `css`, if any.
pub fn first<'a>(document: &'a Html, css: &str) -> Result<Option<ElementRef<'a>>, ExtractionError> {
    let sel = selector(css)?;
    Ok(document.select(&sel).next())
}

/// Rows of `scope`'s tables rendered as `"first cell: second cell"`.
///
/// Rows with fewer than two `<td>` cells (header rows, spacers) are skipped.
pub fn table_rows(scope: ElementRef<'_>) -> Result<Vec<String>, ExtractionError> {
    rows_from(scope, 0)
}

/// Like [`table_rows`], but the first row is always treated as a header,
/// whatever cells it is made of.
pub fn table_body_rows(table: ElementRef<'_>) -> Result<Vec<String>, ExtractionError> {
    rows_from(table, 1)
}

fn rows_from(scope: ElementRef<'_>, skip: usize) -> Result<Vec<String>, ExtractionError> {
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;
    Ok(scope
        .select(&row_sel)
        .skip(skip)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&cell_sel).map(|c| element_text(&c)).collect();
            (cells.len() >= 2).then(|| format!("{}: {}", cells[0], cells[1]))
        })
        .collect())
}

/// All visible text of the document.
pub fn document_text(document: &Html) -> String {
    element_text(&document.root_element())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <section id="intro"><h2>Gather   Required
            Documentation</h2><p>intro</p></section>
          <ul class="first"><li>Passport</li><li>Photo</li></ul>
          <div class="rich-text"><ul><li>Later</li></ul></div>
          <table>
            <tr><th>Type</th><th>Purpose</th></tr>
            <tr><td>F-1</td><td>Academic</td></tr>
            <tr><td>lonely</td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_element_text_collapses_whitespace() {
        let doc = Html::parse_document(PAGE);
        let h2 = find_heading(&doc, "h2", |t| t == "Gather Required Documentation")
            .unwrap()
            .expect("heading found");
        assert_eq!(element_text(&h2), "Gather Required Documentation");
    }

    #[test]
    fn test_find_next_follows_document_order() {
        let doc = Html::parse_document(PAGE);
        let h2 = find_heading(&doc, "h2", |t| t.contains("Documentation"))
            .unwrap()
            .unwrap();
        let ul = find_next(&doc, h2, "ul", None).expect("ul after heading");
        assert_eq!(texts_in(ul, "li").unwrap(), vec!["Passport", "Photo"]);

        let rich = find_next(&doc, h2, "div", Some("rich-text")).expect("rich-text div");
        assert_eq!(texts_in(rich, "li").unwrap(), vec!["Later"]);
    }

    #[test]
    fn test_closest_finds_enclosing_section() {
        let doc = Html::parse_document(PAGE);
        let h2 = first(&doc, "h2").unwrap().unwrap();
        let section = closest(h2, "section").expect("section ancestor");
        assert_eq!(section.value().id(), Some("intro"));
        let ul = first(&doc, "ul.first").unwrap().unwrap();
        assert!(closest(ul, "section").is_none());
    }

    #[test]
    fn test_table_rows_skip_short_rows() {
        let doc = Html::parse_document(PAGE);
        let table = first(&doc, "table").unwrap().unwrap();
        assert_eq!(table_rows(table).unwrap(), vec!["F-1: Academic"]);
    }

    #[test]
    fn test_table_body_rows_drop_td_header() {
        let doc = Html::parse_document(
            "<table><tr><td>Visa Category</td><td>Purpose</td></tr>\
             <tr><td>F</td><td>Academic</td></tr></table>",
        );
        let table = first(&doc, "table").unwrap().unwrap();
        assert_eq!(table_body_rows(table).unwrap(), vec!["F: Academic"]);
        assert_eq!(
            table_rows(table).unwrap(),
            vec!["Visa Category: Purpose", "F: Academic"]
        );
    }

    #[test]
    fn test_bad_selector_is_parse_error() {
        assert!(matches!(selector("li[["), Err(ExtractionError::Parse(_))));
    }
}
