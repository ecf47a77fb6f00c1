//! Declarative markup
//!
//! Finds custom elements in an HTML fragment. Only the outermost custom
//! elements are returned; anything nested inside one stays part of its
//! inner markup.

use scraper::{ElementRef, Html};

use super::props::Attribute;
use super::registry::is_valid_custom_element_name;

/// A custom element as written in markup
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedElement {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub inner_html: String,
}

/// Parse an HTML fragment and collect its outermost custom elements in
/// document order.
///
/// Tag and attribute names come back lowercased, as the HTML parser
/// normalizes them.
pub fn parse_custom_elements(markup: &str) -> Vec<ParsedElement> {
    let fragment = Html::parse_fragment(markup);

    fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| is_custom(element) && !has_custom_ancestor(element))
        .map(|element| ParsedElement {
            tag: element.value().name().to_string(),
            attributes: element
                .value()
                .attrs()
                .map(|(name, value)| Attribute::new(name, value))
                .collect(),
            inner_html: element.inner_html(),
        })
        .collect()
}

fn is_custom(element: &ElementRef) -> bool {
    is_valid_custom_element_name(element.value().name())
}

fn has_custom_ancestor(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_custom(&ancestor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_and_content() {
        let parsed = parse_custom_elements(concat!(
            r#"<main><example-component world="Earth" another-attribute="42">"#,
            r#"<p>loading</p></example-component></main>"#,
        ));

        assert_eq!(parsed.len(), 1);
        let element = &parsed[0];
        assert_eq!(element.tag, "example-component");
        assert_eq!(element.inner_html, "<p>loading</p>");
        assert_eq!(
            element.attributes,
            vec![
                Attribute::new("world", "Earth"),
                Attribute::new("another-attribute", "42"),
            ]
        );
    }

    #[test]
    fn test_parse_keeps_source_attribute_order() {
        let parsed = parse_custom_elements(
            r#"<example-component world="Earth" another-attribute="42" zoom="1" data-zoom="2"></example-component>"#,
        );

        let names: Vec<&str> = parsed[0].attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["world", "another-attribute", "zoom", "data-zoom"]);
    }

    #[test]
    fn test_parse_skips_plain_and_nested_elements() {
        let parsed = parse_custom_elements(concat!(
            "<div><foo-bar><inner-widget></inner-widget></foo-bar></div>",
            "<section></section><example-timer></example-timer>",
        ));

        let tags: Vec<&str> = parsed.iter().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec!["foo-bar", "example-timer"]);
        assert_eq!(parsed[0].inner_html, "<inner-widget></inner-widget>");
    }

    #[test]
    fn test_parse_normalizes_case_and_flags() {
        let parsed =
            parse_custom_elements(r#"<Mapbox-Component Controls accessToken="pk.x"></Mapbox-Component>"#);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].tag, "mapbox-component");
        assert_eq!(
            parsed[0].attributes,
            vec![Attribute::new("controls", ""), Attribute::new("accesstoken", "pk.x")]
        );
    }

    #[test]
    fn test_parse_keeps_json_attributes_verbatim() {
        let parsed = parse_custom_elements(r#"<map-view center='[-74.5, 40]'></map-view>"#);
        assert_eq!(parsed[0].attributes, vec![Attribute::new("center", "[-74.5, 40]")]);
    }
}
