//! Example widget
//!
//! A pure widget: its markup is a function of its props alone.

use crate::elements::{MountResult, PropMap, RenderCallback};

/// Render a prop the way a template literal would, `undefined` when absent
pub(crate) fn display_prop(props: &PropMap, key: &str) -> String {
    props
        .get(key)
        .map(ToString::to_string)
        .unwrap_or_else(|| "undefined".to_string())
}

/// Greets `world`, echoes `anotherAttribute` and dumps every prop as JSON.
pub fn example_component(props: &PropMap, _render: &RenderCallback) -> MountResult {
    Ok(Some(format!(
        r#"
  <div class="block-text border border-red-500 p-5">
    <h1>Example Function Client Component</h1>
    <h4>Hello, {world}!</h4>
    <p>Example function component content</p>
    <p>{another}</p>

    <p>
    This is a function component that is registered as a custom element.
    </p>
    <h4>Props:</h4>
    <pre><code>{json}</code></pre>
  </div>"#,
        world = display_prop(props, "world"),
        another = display_prop(props, "anotherAttribute"),
        json = props.to_pretty_json(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Attribute, Document, ElementRegistry, Widget, register_components};
    use std::rc::Rc;

    fn mount(attributes: &[(&str, &str)]) -> String {
        let attributes: Vec<Attribute> = attributes.iter().map(|&a| a.into()).collect();
        let props = PropMap::from_attributes(&attributes).unwrap();
        let document = Document::new(ElementRegistry::new());
        let element = document.create_element("scratch-element").unwrap();
        example_component(&props, &RenderCallback::new(element)).unwrap().unwrap()
    }

    #[test]
    fn test_greets_world() {
        let html = mount(&[("world", "Earth"), ("another-attribute", "42")]);
        assert!(html.contains("<h4>Hello, Earth!</h4>"));
        assert!(html.contains("<p>42</p>"));
        assert!(html.contains(r#""anotherAttribute": 42"#));
        assert!(html.contains(r#""world": "Earth""#));
    }

    #[test]
    fn test_missing_props_print_undefined() {
        let html = mount(&[]);
        assert!(html.contains("Hello, undefined!"));
        assert!(html.contains("<p>undefined</p>"));
        assert!(html.contains("<pre><code>{}</code></pre>"));
    }

    #[test]
    fn test_structured_props_are_pretty_printed() {
        let html = mount(&[("options", r#"{"a":1}"#), ("tags", "[1,2]")]);
        assert!(html.contains("\"options\": {\n    \"a\": 1\n  }"));
        assert!(html.contains("\"tags\": [\n    1,\n    2\n  ]"));
    }

    #[test]
    fn test_mounts_through_document() {
        let registry = ElementRegistry::new();
        let widget: Rc<dyn Widget> = Rc::new(example_component);
        register_components(&registry, [("example-component", widget)]).unwrap();
        let document = Document::new(registry);

        let elements = document.parse(r#"<example-component world="Earth"></example-component>"#);
        assert!(elements[0].inner_html().contains("Hello, Earth!"));
    }
}
