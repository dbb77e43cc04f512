//! Builds the [`Node`] tree from `yaml-rust2` parser events.
//!
//! The YAML scanner reports where each value token begins, but not where a
//! tag in front of it begins. A tagged node's span is moved back onto its tag
//! literal here, and scalars also keep the start of their value token.

use std::collections::HashMap;

use log::trace;
use yaml_rust2::{
    parser::{Event, MarkedEventReceiver, Parser, Tag},
    scanner::{Marker, TScalarStyle},
};

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    node::{Node, NodeKind, ScalarStyle},
    span::Span,
};

/// Parse `source` and build the node tree of its first YAML document.
pub(crate) fn load(source: &str) -> Result<Node, ParseError> {
    let mut builder = TreeBuilder::new(source);
    let mut parser = Parser::new(source.chars());

    if let Err(err) = parser.load(&mut builder, false) {
        let offset = builder.byte_offset(err.marker().index());
        let diagnostic = Diagnostic::error(err.to_string())
            .with_code(ErrorCode::E001)
            .with_label(Span::with_len(offset, 0), "invalid YAML here");
        return Err(diagnostic.into());
    }

    Ok(builder.root.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Map,
    Sequence,
}

/// A collection whose end event has not arrived yet.
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    tag: Option<String>,
    start: usize,
    anchor: usize,
    children: Vec<Node>,
    pending_key: Option<Node>,
}

struct TreeBuilder<'a> {
    source: &'a str,
    /// Byte offset of every char index; the scanner counts chars.
    char_offsets: Vec<usize>,
    stack: Vec<Frame>,
    anchors: HashMap<usize, Node>,
    root: Option<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        let char_offsets = source.char_indices().map(|(offset, _)| offset).collect();
        Self {
            source,
            char_offsets,
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.char_offsets
            .get(char_index)
            .copied()
            .unwrap_or(self.source.len())
    }

    /// Where a node starts: at its tag literal when one directly precedes
    /// the value, otherwise at the value itself.
    fn node_start(&self, value_start: usize, tag: Option<&str>) -> usize {
        let Some(tag) = tag else {
            return value_start;
        };
        let before = &self.source[..value_start];
        match before.rfind(tag) {
            Some(tag_start) if before[tag_start + tag.len()..].trim().is_empty() => tag_start,
            _ => value_start,
        }
    }

    fn scalar(&self, value: String, style: TScalarStyle, tag: Option<Tag>, mark: Marker) -> Node {
        let tag = tag.map(render_tag);
        let value_start = self.byte_offset(mark.index());
        let start = self.node_start(value_start, tag.as_deref());
        let style = scalar_style(style);
        let raw_len = value.len() + 2 * style.quote_width();
        let end = (value_start + raw_len).min(self.source.len()).max(start);
        let verbatim = self.is_verbatim(&value, style, value_start);
        Node::new(NodeKind::Scalar { style, value }, tag, Span::new(start..end))
            .with_value_start(value_start, verbatim)
    }

    /// Whether `value` is written unchanged right after its opening quote.
    /// Escapes, folded lines and block scalars are not.
    fn is_verbatim(&self, value: &str, style: ScalarStyle, value_start: usize) -> bool {
        if style == ScalarStyle::Block {
            return false;
        }
        let text_start = value_start + style.quote_width();
        self.source.get(text_start..text_start + value.len()) == Some(value)
    }

    fn open(&mut self, kind: FrameKind, anchor: usize, tag: Option<Tag>, mark: Marker) {
        let tag = tag.map(render_tag);
        let start = self.node_start(self.byte_offset(mark.index()), tag.as_deref());
        self.stack.push(Frame {
            kind,
            tag,
            start,
            anchor,
            children: Vec::new(),
            pending_key: None,
        });
    }

    fn close(&mut self, mark: Marker) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let end = self.byte_offset(mark.index()).max(frame.start);
        let mut children = frame.children;
        if let Some(key) = frame.pending_key {
            // A key without a value (`? key` form) still counts as an entry.
            children.push(Node::pair(key, Node::default()));
        }
        let kind = match frame.kind {
            FrameKind::Map => NodeKind::Map(children),
            FrameKind::Sequence => NodeKind::Sequence(children),
        };
        let node = Node::new(kind, frame.tag, Span::new(frame.start..end));
        self.finish(node, frame.anchor);
    }

    /// Record an anchor and attach a completed node to its parent.
    fn finish(&mut self, node: Node, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
        let Some(frame) = self.stack.last_mut() else {
            if self.root.is_none() {
                self.root = Some(node);
            }
            return;
        };
        match frame.kind {
            FrameKind::Sequence => frame.children.push(node),
            FrameKind::Map => match frame.pending_key.take() {
                Some(key) => frame.children.push(Node::pair(key, node)),
                None => frame.pending_key = Some(node),
            },
        }
    }
}

impl MarkedEventReceiver for TreeBuilder<'_> {
    fn on_event(&mut self, event: Event, mark: Marker) {
        trace!(event:? = event, index = mark.index(); "YAML event");
        match event {
            Event::Scalar(value, style, anchor, tag) => {
                let node = self.scalar(value, style, tag, mark);
                self.finish(node, anchor);
            }
            Event::SequenceStart(anchor, tag) => self.open(FrameKind::Sequence, anchor, tag, mark),
            Event::MappingStart(anchor, tag) => self.open(FrameKind::Map, anchor, tag, mark),
            Event::SequenceEnd | Event::MappingEnd => self.close(mark),
            Event::Alias(anchor) => {
                let node = self.anchors.get(&anchor).cloned().unwrap_or_default();
                self.finish(node.detached(), 0);
            }
            _ => {}
        }
    }
}

fn render_tag(tag: Tag) -> String {
    format!("{}{}", tag.handle, tag.suffix)
}

fn scalar_style(style: TScalarStyle) -> ScalarStyle {
    match style {
        TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        TScalarStyle::Literal | TScalarStyle::Folded => ScalarStyle::Block,
        _ => ScalarStyle::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_at<'n>(node: &'n Node, path: &[&str]) -> &'n Node {
        path.iter().fold(node, |node, key| node.get(key))
    }

    #[test]
    fn test_load_map_of_scalars() {
        let root = load("A: 1\nB: two\n").unwrap();
        assert_eq!(root.keys(), vec!["A", "B"]);
        assert_eq!(root.get("B").as_str(), Some("two"));
        assert_eq!(root.get("B").string_key(), Some("B"));
    }

    #[test]
    fn test_tagged_scalar_span_starts_at_tag() {
        let source = "Value: !Ref Bucket\n";
        let root = load(source).unwrap();
        let value = root.get("Value");
        assert_eq!(value.tag(), Some("!Ref"));
        assert_eq!(value.as_str(), Some("Bucket"));
        assert_eq!(value.span().start(), source.find("!Ref").unwrap());
    }

    #[test]
    fn test_untagged_scalar_span_starts_at_value() {
        let source = "Key:   value\n";
        let root = load(source).unwrap();
        assert_eq!(root.get("Key").span().start(), source.find("value").unwrap());
    }

    #[test]
    fn test_quoted_scalar_span_starts_at_quote() {
        let source = "Key: \"quoted\"\n";
        let value = load(source).unwrap().get("Key").clone();
        assert_eq!(value.scalar_style(), Some(ScalarStyle::DoubleQuoted));
        assert_eq!(value.span().start(), source.find('"').unwrap());
        assert_eq!(value.span().len(), "\"quoted\"".len());
    }

    #[test]
    fn test_tagged_scalar_value_on_next_line() {
        let source = "Value: !Ref\n  Bucket\n";
        let value = load(source).unwrap().get("Value").clone();
        assert_eq!(value.span().start(), source.find("!Ref").unwrap());
        assert_eq!(value.value_start(), source.find("Bucket").unwrap());
        assert!(value.is_verbatim());
    }

    #[test]
    fn test_escaped_and_folded_scalars_are_not_verbatim() {
        let source = "A: \"a\\tb\"\nB: first\n  second\nC: |\n  text\nD: 'plain'\n";
        let root = load(source).unwrap();
        assert!(!root.get("A").is_verbatim());
        assert!(!root.get("B").is_verbatim());
        assert!(!root.get("C").is_verbatim());
        assert!(root.get("D").is_verbatim());
    }

    #[test]
    fn test_tagged_flow_sequence() {
        let source = "Value: !If [IsProd, a, b]\n";
        let root = load(source).unwrap();
        let value = root.get("Value");
        assert_eq!(value.tag(), Some("!If"));
        assert_eq!(value.span().start(), source.find("!If").unwrap());
        let NodeKind::Sequence(items) = value.kind() else {
            panic!("Expected sequence");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].tag(), None);
        assert_eq!(items[0].span().start(), source.find("IsProd").unwrap());
    }

    #[test]
    fn test_tagged_block_sequence() {
        let source = "Value: !FindInMap\n  - RegionMap\n  - !Ref AWS::Region\n  - Ami\n";
        let root = load(source).unwrap();
        let value = root.get("Value");
        assert_eq!(value.tag(), Some("!FindInMap"));
        let NodeKind::Sequence(items) = value.kind() else {
            panic!("Expected sequence");
        };
        assert_eq!(items[0].as_str(), Some("RegionMap"));
        assert_eq!(items[1].tag(), Some("!Ref"));
    }

    #[test]
    fn test_nested_lookup() {
        let source = "Resources:\n  Stack:\n    Type: AWS::CloudFormation::Stack\n    Properties:\n      TemplateURL: ./child.yml\n";
        let root = load(source).unwrap();
        let url = scalar_at(&root, &["Resources", "Stack", "Properties", "TemplateURL"]);
        assert_eq!(url.as_str(), Some("./child.yml"));
        assert_eq!(url.span().start(), source.find("./child.yml").unwrap());
    }

    #[test]
    fn test_multibyte_text_uses_byte_offsets() {
        let source = "Description: \"ünïcödé\"\nValue: !Ref Target\n";
        let root = load(source).unwrap();
        assert_eq!(
            root.get("Value").span().start(),
            source.find("!Ref").unwrap()
        );
    }

    #[test]
    fn test_alias_expands_anchor() {
        let source = "Base: &base\n  Name: x\nCopy: *base\n";
        let root = load(source).unwrap();
        assert_eq!(root.get("Copy").get("Name").as_str(), Some("x"));
        assert_eq!(root.get("Copy").string_key(), Some("Copy"));
    }

    #[test]
    fn test_empty_stream() {
        let root = load("").unwrap();
        assert!(root.is_empty());
    }

    #[test]
    fn test_scan_error() {
        let err = load("A: [unclosed\n").unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
    }

    #[test]
    fn test_only_first_document() {
        let root = load("A: 1\n---\nB: 2\n").unwrap();
        assert_eq!(root.keys(), vec!["A"]);
    }
}
