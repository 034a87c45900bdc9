//! Small DOM vocabulary over `markup5ever_rcdom`
//!
//! The rest of the crate never touches `NodeData` directly. Moving nodes between child
//! lists goes through these helpers so parent pointers stay consistent.

use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Append `child` to `parent`, updating the child's parent pointer.
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Detach and return all children of `parent`.
pub fn take_children(parent: &Handle) -> Vec<Handle> {
    std::mem::take(&mut *parent.children.borrow_mut())
}

/// Swap in a freshly built child list in one step.
pub fn replace_children(parent: &Handle, children: Vec<Handle>) {
    for child in &children {
        child.parent.set(Some(Rc::downgrade(parent)));
    }
    *parent.children.borrow_mut() = children;
}

/// Snapshot of the current child list.
pub fn child_nodes(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

pub fn has_child_elements(node: &Handle) -> bool {
    node.children.borrow().iter().any(is_element)
}

/// Text payload of a text node, `None` for anything else.
pub fn text_of(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some((**contents.borrow()).to_string()),
        _ => None,
    }
}

/// Local tag name of an element.
pub fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn is_tag(node: &Handle, tag: &str) -> bool {
    tag_name(node) == Some(tag)
}

/// Concatenated text of every text node below `node`, in document order.
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, text: &mut String) {
    match &node.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Document | NodeData::Element { .. } => {
            for child in node.children.borrow().iter() {
                collect_text(child, text);
            }
        }
        _ => {}
    }
}

pub fn get_attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| (*attr.value).to_string()),
        _ => None,
    }
}

pub fn has_attr(node: &Handle, name: &str) -> bool {
    get_attr(node, name).is_some()
}

/// Set an attribute, replacing any existing value. No-op on non-elements.
pub fn set_attr(node: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|attr| &*attr.name.local == name) {
            Some(attr) => attr.value = value.to_string().into(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(name)),
                value: value.to_string().into(),
            }),
        }
    }
}

pub fn classes(node: &Handle) -> Vec<String> {
    get_attr(node, "class")
        .map(|class| class.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    classes(node).iter().any(|existing| existing == class)
}

/// Add every whitespace-separated class in `class` that is not already present.
pub fn add_class(node: &Handle, class: &str) {
    let mut current = classes(node);
    let before = current.len();
    for name in class.split_whitespace() {
        if !current.iter().any(|existing| existing == name) {
            current.push(name.to_string());
        }
    }
    if current.len() != before {
        set_attr(node, "class", &current.join(" "));
    }
}

/// Opening tag of an element, used to point diagnostics at their source.
pub fn describe_element(node: &Handle) -> String {
    match &node.data {
        NodeData::Element { name, attrs, .. } => {
            let mut out = format!("<{}", &*name.local);
            for attr in attrs.borrow().iter() {
                out.push_str(&format!(" {}=\"{}\"", &*attr.name.local, &*attr.value));
            }
            out.push('>');
            out
        }
        NodeData::Text { .. } => "#text".to_string(),
        _ => "#node".to_string(),
    }
}

/// First element with the given tag, depth first, including `root` itself.
pub fn find_first(root: &Handle, tag: &str) -> Option<Handle> {
    if is_tag(root, tag) {
        return Some(root.clone());
    }
    root.children
        .borrow()
        .iter()
        .find_map(|child| find_first(child, tag))
}

/// Serialize a node and its subtree to HTML.
pub fn serialize_node(node: &Handle) -> io::Result<String> {
    serialize_with_scope(node, TraversalScope::IncludeNode)
}

/// Serialize a parsed document, doctype included.
pub fn serialize_document(dom: &RcDom) -> io::Result<String> {
    serialize_with_scope(&dom.document, TraversalScope::ChildrenOnly(None))
}

fn serialize_with_scope(node: &Handle, traversal_scope: TraversalScope) -> io::Result<String> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(node.clone());
    serialize(&mut output, &serializable, opts)?;
    String::from_utf8(output).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Parse a complete HTML document.
pub fn parse_document(html: &str) -> RcDom {
    html5ever::parse_document(RcDom::default(), Default::default()).one(html)
}

/// Parse an HTML snippet and return its nodes under a fresh `div` container.
pub fn parse_fragment(html: &str) -> Handle {
    let dom = parse_document(html);
    let container = create_element("div", vec![]);
    let body = find_first(&dom.document, "body");
    if let Some(body) = body {
        for child in take_children(&body) {
            append_child(&container, child);
        }
    }
    container
}
