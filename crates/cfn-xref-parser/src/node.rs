//! Uniform node model over the parsed YAML tree.
//!
//! Every lookup that misses yields [`EMPTY_NODE`], a shared sentinel, so
//! traversal code chains `get` calls without null checks:
//!
//! ```
//! # use cfn_xref_parser::parse;
//! let document = parse("Resources:\n  Bucket:\n    Type: AWS::S3::Bucket\n").unwrap();
//! let bucket_type = document.root().get("Resources").get("Bucket").get("Type");
//! assert_eq!(bucket_type.as_str(), Some("AWS::S3::Bucket"));
//!
//! let missing = document.root().get("Outputs").get("Anything").get("Value");
//! assert!(missing.is_empty());
//! ```

use crate::span::Span;

/// The shared Empty sentinel returned by every lookup miss.
pub static EMPTY_NODE: Node = Node::empty();

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// A `|` or `>` block scalar.
    Block,
}

impl ScalarStyle {
    /// Width of the opening quote preceding the scalar's value.
    pub fn quote_width(&self) -> usize {
        match self {
            ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted => 1,
            ScalarStyle::Plain | ScalarStyle::Block => 0,
        }
    }
}

/// The closed set of node shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A mapping; every child is a [`NodeKind::Pair`].
    Map(Vec<Node>),
    Sequence(Vec<Node>),
    /// One `key: value` entry of a mapping.
    Pair { key: Box<Node>, value: Box<Node> },
    Scalar { style: ScalarStyle, value: String },
    Empty,
}

/// A position in the parsed document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    tag: Option<String>,
    span: Span,
    string_key: Option<String>,
    /// Where the value token begins, after any tag and line break.
    value_start: usize,
    /// Whether the scalar's text appears unchanged in the source.
    verbatim: bool,
}

impl Node {
    /// Create a node whose value starts where its span does.
    pub fn new(kind: NodeKind, tag: Option<String>, span: Span) -> Self {
        Self {
            kind,
            tag,
            span,
            string_key: None,
            value_start: span.start(),
            verbatim: true,
        }
    }

    /// Record where the value token starts and whether its text can be
    /// located in the source character by character.
    pub fn with_value_start(mut self, value_start: usize, verbatim: bool) -> Self {
        self.value_start = value_start;
        self.verbatim = verbatim;
        self
    }

    /// Create a `key: value` pair. Both the pair and its value remember the
    /// key string when the key is a scalar.
    pub fn pair(key: Node, mut value: Node) -> Self {
        let string_key = key.as_str().map(str::to_string);
        if value.string_key.is_none() {
            value.string_key = string_key.clone();
        }
        let span = key.span.union(value.span);
        Self {
            kind: NodeKind::Pair {
                key: Box::new(key),
                value: Box::new(value),
            },
            tag: None,
            span,
            string_key,
            value_start: span.start(),
            verbatim: true,
        }
    }

    /// The same node, forgetting the key it was first reached under.
    pub(crate) fn detached(mut self) -> Self {
        self.string_key = None;
        self
    }

    const fn empty() -> Self {
        Self {
            kind: NodeKind::Empty,
            tag: None,
            span: Span::new(0..0),
            string_key: None,
            value_start: 0,
            verbatim: true,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The intrinsic-function tag (`!Ref`, `!Sub`, ...), if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Byte range of the node. A tagged node starts at its tag.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Byte offset of the value itself. Differs from the span start for a
    /// tagged node: `!Ref\n  Name` starts at the tag but its value at `Name`.
    pub fn value_start(&self) -> usize {
        self.value_start
    }

    /// False when escapes, folding or a block indicator make the scalar's
    /// text differ from the source bytes at [`value_start`](Self::value_start).
    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    /// The mapping key under which this node was reached.
    pub fn string_key(&self) -> Option<&str> {
        self.string_key.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, NodeKind::Empty)
    }

    pub fn is_pair(&self) -> bool {
        matches!(self.kind, NodeKind::Pair { .. })
    }

    /// The scalar value, or `None` for anything that is not a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The scalar style, or `None` for anything that is not a scalar.
    pub fn scalar_style(&self) -> Option<ScalarStyle> {
        match &self.kind {
            NodeKind::Scalar { style, .. } => Some(*style),
            _ => None,
        }
    }

    /// Whether this node is a YAML null (`~`, `null`, or an omitted value).
    pub fn is_null(&self) -> bool {
        match &self.kind {
            NodeKind::Scalar {
                style: ScalarStyle::Plain,
                value,
            } => matches!(value.as_str(), "" | "~" | "null" | "Null" | "NULL"),
            NodeKind::Empty => true,
            _ => false,
        }
    }

    /// The key node of a pair; the Empty sentinel otherwise.
    pub fn key(&self) -> &Node {
        match &self.kind {
            NodeKind::Pair { key, .. } => key,
            _ => &EMPTY_NODE,
        }
    }

    /// The pair's value for a pair, otherwise the node itself.
    ///
    /// Every kind-based branch goes through this first, so callers never
    /// special-case pairs.
    pub fn value_of(&self) -> &Node {
        match &self.kind {
            NodeKind::Pair { value, .. } => value,
            _ => self,
        }
    }

    /// Child nodes: pairs for a map, items for a sequence, the value for a pair.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Map(children) | NodeKind::Sequence(children) => children,
            NodeKind::Pair { value, .. } => std::slice::from_ref(&**value),
            NodeKind::Scalar { .. } | NodeKind::Empty => &[],
        }
    }

    /// Find the pair whose key is `key`; the Empty sentinel on a miss.
    pub fn child_by_key(&self, key: &str) -> &Node {
        self.value_of()
            .children()
            .iter()
            .find(|child| child.is_pair() && child.string_key() == Some(key))
            .unwrap_or(&EMPTY_NODE)
    }

    /// The value stored under `key`; the Empty sentinel on a miss.
    pub fn get(&self, key: &str) -> &Node {
        self.child_by_key(key).value_of()
    }

    /// The keys of this node's children, skipping children without one.
    pub fn keys(&self) -> Vec<&str> {
        self.value_of()
            .children()
            .iter()
            .filter_map(Node::string_key)
            .collect()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::empty()
    }
}
