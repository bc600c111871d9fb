use ripples_dom::element::CLASS_NAME;
use ripples_dom::markup::escape;

use crate::{DomError, Element, Fragment, PropValue};

/// Empty property list for [`node`].
pub const NO_PROPS: [(&str, PropValue); 0] = [];

/// Content of a template node.
#[derive(Clone, Debug, PartialEq)]
pub enum Children {
    Nodes(Vec<Template>),
    /// Raw inner markup, inserted without escaping.
    Markup(String),
}

impl Default for Children {
    fn default() -> Self {
        Children::Markup(String::new())
    }
}

impl From<Vec<Template>> for Children {
    fn from(v: Vec<Template>) -> Self {
        Children::Nodes(v)
    }
}

impl From<&str> for Children {
    fn from(v: &str) -> Self {
        Children::Markup(v.to_string())
    }
}

impl From<String> for Children {
    fn from(v: String) -> Self {
        Children::Markup(v)
    }
}

/// Declarative `(tag, properties, children)` descriptor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Template {
    pub tag: String,
    pub props: Vec<(String, PropValue)>,
    pub children: Children,
}

/// Builds a template from the `[tag, props, children]` triple.
pub fn node<K, V>(
    tag: &str,
    props: impl IntoIterator<Item = (K, V)>,
    children: impl Into<Children>,
) -> Template
where
    K: Into<String>,
    V: Into<PropValue>,
{
    Template {
        tag: tag.to_string(),
        props: props
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
        children: children.into(),
    }
}

impl<P, K, V, C> From<(&str, P, C)> for Template
where
    P: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<PropValue>,
    C: Into<Children>,
{
    fn from((tag, props, children): (&str, P, C)) -> Self {
        node(tag, props, children)
    }
}

impl Template {
    pub fn new(tag: impl Into<String>) -> Self {
        Template {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.push((name.into(), value.into()));
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.prop(CLASS_NAME, class.into())
    }

    pub fn children(mut self, kids: Vec<Template>) -> Self {
        self.children = Children::Nodes(kids);
        self
    }

    /// Raw markup. Callers must not pass untrusted text here.
    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.children = Children::Markup(markup.into());
        self
    }

    /// Escaped text content.
    pub fn text(self, text: &str) -> Self {
        self.markup(escape(text))
    }

    /// Materializes this node (and its subtree) as a detached element.
    pub fn build(&self) -> Result<Element, DomError> {
        let element = Element::create(&self.tag)?;
        for (name, value) in &self.props {
            element.set_property(name, value.clone());
        }
        match &self.children {
            Children::Nodes(kids) => element.append_fragment(render(kids)?)?,
            Children::Markup(markup) => element.set_inner_html(markup.clone()),
        }
        Ok(element)
    }
}

/// Renders `templates` into a fresh fragment, in order. Never touches
/// existing DOM; inserting the fragment is up to the caller.
pub fn render(templates: &[Template]) -> Result<Fragment, DomError> {
    let mut fragment = Fragment::new();
    for template in templates {
        fragment.push(template.build()?);
    }
    Ok(fragment)
}
