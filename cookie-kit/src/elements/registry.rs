//! Custom Element Registry
//!
//! Maps tag names to element constructors. A definition is write-once: once a
//! tag name is defined its behavior is fixed for the registry's lifetime.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::component::{Component, Lifecycle, Widget};
use super::element::ElementRef;
use super::error::{ElementError, Result};

/// Builds the lifecycle for a freshly created element of a defined tag.
pub type ElementConstructor = Rc<dyn Fn(&ElementRef) -> Result<Box<dyn Lifecycle>>>;

/// Names reserved by SVG and MathML that can never be custom elements.
const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Check whether `name` may be used as a custom element tag.
///
/// The name must start with a lowercase ASCII letter, contain a hyphen,
/// contain no uppercase ASCII letters and not be one of the reserved names.
pub fn is_valid_custom_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_lowercase = chars.next().is_some_and(|c| c.is_ascii_lowercase());

    starts_lowercase
        && name.contains('-')
        && name.chars().all(|c| {
            c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || matches!(c, '-' | '.' | '_')
                || !c.is_ascii()
        })
        && !RESERVED_NAMES.contains(&name)
}

/// The document-wide table of custom element definitions.
///
/// Clones share the same table, so one registry can be handed to every part
/// of the page that registers or creates elements.
///
/// # Example
///
/// ```rust,ignore
/// let registry = ElementRegistry::new();
/// register_components(&registry, [("example-component", widget)])?;
///
/// assert!(registry.is_defined("example-component"));
/// ```
#[derive(Clone, Default)]
pub struct ElementRegistry {
    definitions: Rc<RefCell<IndexMap<String, ElementConstructor>>>,
}

impl fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

impl ElementRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a tag name.
    ///
    /// Fails if the name is invalid or already defined, like the platform's
    /// `define`. Use [`ElementRegistry::define_if_absent`] for idempotent
    /// registration.
    pub fn define(&self, tag: &str, constructor: ElementConstructor) -> Result<()> {
        if !is_valid_custom_element_name(tag) {
            return Err(ElementError::InvalidTagName(tag.to_string()));
        }

        let mut definitions = self.definitions.borrow_mut();
        if definitions.contains_key(tag) {
            return Err(ElementError::AlreadyDefined(tag.to_string()));
        }
        definitions.insert(tag.to_string(), constructor);
        log::debug!("[registry] defined <{}>", tag);
        Ok(())
    }

    /// Define a tag name unless it already has a definition.
    ///
    /// Returns whether a new definition was installed. The first definition
    /// always wins.
    pub fn define_if_absent(&self, tag: &str, constructor: ElementConstructor) -> Result<bool> {
        if self.is_defined(tag) {
            log::debug!("[registry] <{}> already defined, skipping", tag);
            return Ok(false);
        }
        self.define(tag, constructor)?;
        Ok(true)
    }

    /// Get the constructor for a tag name
    pub fn get(&self, tag: &str) -> Option<ElementConstructor> {
        self.definitions.borrow().get(tag).cloned()
    }

    /// Check if a tag name is defined
    pub fn is_defined(&self, tag: &str) -> bool {
        self.definitions.borrow().contains_key(tag)
    }

    /// Defined tag names, in definition order
    pub fn tags(&self) -> Vec<String> {
        self.definitions.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.borrow().is_empty()
    }
}

/// Wrap a widget in a constructor that builds a [`Component`] around it
pub fn component_constructor(widget: Rc<dyn Widget>) -> ElementConstructor {
    Rc::new(move |element: &ElementRef| -> Result<Box<dyn Lifecycle>> {
        let component = Component::new(element, widget.clone())?;
        Ok(Box::new(component) as Box<dyn Lifecycle>)
    })
}

/// Register widgets under their tag names.
///
/// Tags that are already defined are skipped silently, so registering the
/// same set twice (a script evaluated again after navigation) is harmless.
/// Returns how many tags were newly defined.
pub fn register_components<I, K>(registry: &ElementRegistry, components: I) -> Result<usize>
where
    I: IntoIterator<Item = (K, Rc<dyn Widget>)>,
    K: AsRef<str>,
{
    let mut defined = 0;
    for (tag, widget) in components {
        if registry.define_if_absent(tag.as_ref(), component_constructor(widget))? {
            defined += 1;
        }
    }
    Ok(defined)
}

/// Register a hand-written lifecycle under a tag name, unless already defined
pub fn register_element<F, L>(registry: &ElementRegistry, tag: &str, constructor: F) -> Result<bool>
where
    F: Fn(&ElementRef) -> Result<L> + 'static,
    L: Lifecycle + 'static,
{
    registry.define_if_absent(
        tag,
        Rc::new(move |element: &ElementRef| {
            constructor(element).map(|l| Box::new(l) as Box<dyn Lifecycle>)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::component::{MountResult, RenderCallback};
    use crate::elements::props::PropMap;

    fn widget(label: &'static str) -> Rc<dyn Widget> {
        Rc::new(move |_: &PropMap, _: &RenderCallback| -> MountResult {
            Ok(Some(label.to_string()))
        })
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_custom_element_name("foo-bar"));
        assert!(is_valid_custom_element_name("example-timer"));
        assert!(is_valid_custom_element_name("x-1.2_3"));
        assert!(is_valid_custom_element_name("emoji-😀"));
    }

    #[test]
    fn test_invalid_names() {
        let names = ["foobar", "Foo-bar", "foo-Bar", "-foo", "1-foo", "", "font-face", "foo bar-x"];
        for name in names {
            assert!(!is_valid_custom_element_name(name), "{name} should be invalid");
        }
    }

    #[test]
    fn test_define_rejects_duplicates_and_bad_names() {
        let registry = ElementRegistry::new();
        registry.define("foo-bar", component_constructor(widget("a"))).unwrap();

        assert!(matches!(
            registry.define("foo-bar", component_constructor(widget("b"))),
            Err(ElementError::AlreadyDefined(_))
        ));
        assert!(matches!(
            registry.define("foobar", component_constructor(widget("b"))),
            Err(ElementError::InvalidTagName(_))
        ));
    }

    #[test]
    fn test_register_components_first_wins() {
        let registry = ElementRegistry::new();

        let defined = register_components(&registry, [("foo-bar", widget("a"))]).unwrap();
        assert_eq!(defined, 1);
        let defined = register_components(&registry, [("foo-bar", widget("b"))]).unwrap();
        assert_eq!(defined, 0);

        let element = ElementRef::new(1, "foo-bar", Vec::new(), "");
        let constructor = registry.get("foo-bar").unwrap();
        element.construct(&constructor).unwrap();
        element.connect().unwrap();
        assert_eq!(element.inner_html(), "a");
    }

    #[test]
    fn test_register_components_invalid_tag() {
        let registry = ElementRegistry::new();
        let result = register_components(&registry, [("nohyphen", widget("a"))]);
        assert!(matches!(result, Err(ElementError::InvalidTagName(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_tags_in_definition_order() {
        let registry = ElementRegistry::new();
        register_components(
            &registry,
            [("b-tag", widget("b")), ("a-tag", widget("a")), ("c-tag", widget("c"))],
        )
        .unwrap();

        assert_eq!(registry.tags(), vec!["b-tag", "a-tag", "c-tag"]);
        assert_eq!(registry.len(), 3);
    }

    struct Static;

    impl Lifecycle for Static {
        fn connected(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_register_element() {
        let registry = ElementRegistry::new();
        assert!(register_element(&registry, "raw-element", |_| Ok(Static)).unwrap());
        assert!(!register_element(&registry, "raw-element", |_| Ok(Static)).unwrap());
        assert!(registry.is_defined("raw-element"));
    }
}
