//! Element descriptions - the lightweight, ephemeral input to reconciliation.
//!
//! Descriptions are pure data: they carry a type, an optional identity key,
//! and props, and they are rebuilt from scratch on every render. The fiber
//! tree is the persistent side; reconciliation diffs a description against the
//! current generation to decide which fibers survive.
//!
//! A child position is described by [`Child`]: a single composite element, a
//! single text run, or a list. The enum tag plays the role a sentinel marker
//! field would in a dynamically typed description; there is no way to hand
//! the reconciler an untagged shape.

/// External identity hint used to match a description against a prior fiber.
pub type Key = String;

/// The underlying kind of a described node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementType {
    /// A host tag name, e.g. `"div"`, materialized by the host backend.
    Tag(String),
    /// An opaque identifier of a functional unit. Not yet reconciled.
    Component(String),
}

impl ElementType {
    /// The identifier as a plain string, whichever variant it is.
    pub fn name(&self) -> &str {
        match self {
            ElementType::Tag(tag) => tag,
            ElementType::Component(name) => name,
        }
    }
}

/// Parameters of a described node.
///
/// The reconciler itself only interprets `children`; attributes and the ref
/// slot are carried through to the host backend untouched.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Props {
    /// Host attributes, opaque to the reconciler.
    pub attrs: Vec<(String, String)>,
    /// Opaque reference slot carried from the description. No core consumer.
    pub node_ref: Option<String>,
    /// The child description under this node, if any.
    pub children: Option<Child>,
}

/// A composite element description.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// What this node is: a host tag or a functional unit.
    pub element_type: ElementType,
    /// Optional identity hint for matching across renders.
    pub key: Option<Key>,
    /// The described parameters, including children.
    pub props: Props,
}

impl Element {
    /// A host element description with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            element_type: ElementType::Tag(tag.into()),
            key: None,
            props: Props::default(),
        }
    }

    /// A functional-unit description with the given identifier.
    pub fn component(name: impl Into<String>) -> Self {
        Element {
            element_type: ElementType::Component(name.into()),
            key: None,
            props: Props::default(),
        }
    }

    /// Sets the identity key.
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Appends a host attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.attrs.push((name.into(), value.into()));
        self
    }

    /// Sets the opaque reference slot.
    pub fn node_ref(mut self, reference: impl Into<String>) -> Self {
        self.props.node_ref = Some(reference.into());
        self
    }

    /// Adds a child description.
    ///
    /// A first child occupies the single-child slot directly; adding further
    /// children promotes the slot to a [`Child::Many`] list.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.props.children = Some(match self.props.children.take() {
            None => child.into(),
            Some(Child::Many(mut list)) => {
                list.push(child.into());
                Child::Many(list)
            }
            Some(existing) => Child::Many(vec![existing, child.into()]),
        });
        self
    }
}

/// What occupies a child position in a description.
#[derive(Clone, Debug, PartialEq)]
pub enum Child {
    /// A single composite element.
    Element(Box<Element>),
    /// A single text run.
    Text(String),
    /// An ordered list of children. Describable, but multi-child
    /// reconciliation is an unimplemented extension point.
    Many(Vec<Child>),
}

impl Child {
    /// A text child from anything displayable; numbers are stringified.
    pub fn text(content: impl ToString) -> Self {
        Child::Text(content.to_string())
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(Box::new(element))
    }
}

impl From<&str> for Child {
    fn from(content: &str) -> Self {
        Child::Text(content.to_owned())
    }
}

impl From<String> for Child {
    fn from(content: String) -> Self {
        Child::Text(content)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Text(value.to_string())
    }
}
