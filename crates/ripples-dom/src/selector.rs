use smallvec::SmallVec;

use crate::Element;

/// Compound selector: `tag`, `.class`, `tag.class.other`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: SmallVec<[String; 2]>,
}

impl Selector {
    /// Returns `None` for empty input or anything beyond a compound selector.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return None;
        }
        let mut parts = input.split('.');
        let tag = match parts.next() {
            Some("") | None => None,
            Some(t) => Some(t.to_ascii_lowercase()),
        };
        let mut classes = SmallVec::new();
        for class in parts {
            if class.is_empty() {
                return None;
            }
            classes.push(class.to_string());
        }
        Some(Self { tag, classes })
    }

    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag
            && element.tag() != tag.as_str()
        {
            return false;
        }
        self.classes.iter().all(|c| element.has_class(c))
    }
}
