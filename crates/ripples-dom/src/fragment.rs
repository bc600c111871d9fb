use crate::{Element, Node};

/// Detached, ordered list of nodes. Appending a fragment moves its nodes.
#[derive(Clone, Debug, Default)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.nodes.push(Node::Element(element));
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> Vec<Element> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(e.clone()),
                Node::Markup(_) => None,
            })
            .collect()
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn to_html(&self) -> String {
        self.nodes.iter().map(Node::to_html).collect()
    }
}
