//! Reference extraction.
//!
//! Walks the `Resources` and `Outputs` sections and records every name used
//! through an intrinsic function or a `DependsOn` entry, together with the
//! byte offset where that name is written. The tree is not modified; the
//! result is a flat list of [`Reference`]s.
//!
//! Offsets are taken from the start of each scalar's value token, past the
//! opening quote if any. A `!Sub` string whose text differs from its source
//! (escapes, folded lines, block scalars) reports every placeholder at the
//! start of the value.
//!
//! An anchored node reused through aliases yields each reference once.

use std::fmt;

use indexmap::IndexSet;
use log::trace;

use cfn_xref_parser::{
    Node, NodeKind, Span,
    error::{Diagnostic, ErrorCode},
};

use crate::sub;

/// Prefix of the built-in pseudo parameters, which are never checked.
pub const PSEUDO_PARAMETER_PREFIX: &str = "AWS::";

/// How a name was referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Ref,
    Sub,
    GetAtt,
    If,
    FindInMap,
    DependsOn,
}

impl ReferenceKind {
    /// The reference kind introduced by an intrinsic-function tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "!Ref" => Some(Self::Ref),
            "!Sub" => Some(Self::Sub),
            "!GetAtt" => Some(Self::GetAtt),
            "!If" => Some(Self::If),
            "!FindInMap" => Some(Self::FindInMap),
            _ => None,
        }
    }

    /// The diagnostic message for an unresolved name of this kind.
    pub fn unresolved_message(&self, name: &str) -> String {
        match self {
            Self::Ref | Self::Sub => format!("Unable to find referenced value, '{name}'"),
            Self::If => format!("Unable to find referenced condition, '{name}'"),
            Self::FindInMap => format!("Unable to find referenced map, '{name}'"),
            Self::DependsOn => format!("Unable to find referenced resource, '{name}'"),
            Self::GetAtt => format!("Unable to find referenced sub stack output, '{name}'"),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Ref | Self::Sub => ErrorCode::E100,
            Self::If => ErrorCode::E101,
            Self::FindInMap => ErrorCode::E102,
            Self::DependsOn => ErrorCode::E103,
            Self::GetAtt => ErrorCode::E104,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ref => "Ref",
            Self::Sub => "Sub",
            Self::GetAtt => "GetAtt",
            Self::If => "If",
            Self::FindInMap => "FindInMap",
            Self::DependsOn => "DependsOn",
        };
        f.write_str(name)
    }
}

/// One use of a name in the template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    kind: ReferenceKind,
    name: String,
    offset: usize,
    computed_attribute: bool,
}

impl Reference {
    pub fn new(kind: ReferenceKind, name: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            offset,
            computed_attribute: false,
        }
    }

    /// Mark a `GetAtt` whose attribute name is computed by another function,
    /// as in `!GetAtt [Bucket, !Ref Attribute]`.
    pub fn with_computed_attribute(mut self) -> Self {
        self.computed_attribute = true;
        self
    }

    /// Whether only the resource part of the name is known.
    pub fn has_computed_attribute(&self) -> bool {
        self.computed_attribute
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// The referenced name, e.g. `Bucket` or `Stack.Outputs.Arn`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset of the first character of the name.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The span covering the name.
    pub fn span(&self) -> Span {
        Span::with_len(self.offset, self.name.len())
    }

    /// The diagnostic reported when this reference does not resolve.
    pub fn unresolved(&self) -> Diagnostic {
        Diagnostic::error(self.kind.unresolved_message(&self.name))
            .with_code(self.kind.error_code())
            .with_label(self.span(), format!("unknown {} target", self.kind))
    }
}

/// Extract every reference made inside the `Resources` and `Outputs` nodes.
pub fn extract_references(resources: &Node, outputs: &Node) -> Vec<Reference> {
    let mut extractor = Extractor::default();
    extractor.walk(resources, Context::default());
    extractor.walk(outputs, Context::default());
    extractor.references.into_iter().collect()
}

/// What an untagged node inherits from its parent.
#[derive(Debug, Clone, Copy, Default)]
struct Context<'a> {
    kind: Option<ReferenceKind>,
    /// Variable names declared by the enclosing `!Sub` variable map.
    sub_locals: &'a [&'a str],
}

impl<'a> Context<'a> {
    fn inherit(kind: ReferenceKind) -> Self {
        Self {
            kind: Some(kind),
            sub_locals: &[],
        }
    }
}

#[derive(Debug, Default)]
struct Extractor {
    references: IndexSet<Reference>,
}

impl Extractor {
    fn walk(&mut self, node: &Node, context: Context<'_>) {
        let node = node.value_of();
        let own = node.tag().and_then(ReferenceKind::from_tag);

        match node.kind() {
            NodeKind::Map(pairs) => {
                for pair in pairs {
                    let value = pair.value_of();
                    let context = if value.tag().is_none() && pair.string_key() == Some("DependsOn")
                    {
                        Context::inherit(ReferenceKind::DependsOn)
                    } else {
                        Context::default()
                    };
                    self.walk(value, context);
                }
            }
            NodeKind::Sequence(items) => {
                // Another function's tag (`!Join`, `!Select`) drops the inherited kind.
                let inherited = context.kind.filter(|_| node.tag().is_none());
                self.walk_sequence(items, own.or(inherited));
            }
            NodeKind::Scalar { .. } => match (own, context.kind) {
                (Some(kind), _) => self.scalar(node, kind, &[]),
                (None, Some(kind)) if node.tag().is_none() => {
                    self.scalar(node, kind, context.sub_locals)
                }
                _ => {}
            },
            NodeKind::Pair { .. } | NodeKind::Empty => {}
        }
    }

    fn walk_sequence(&mut self, items: &[Node], kind: Option<ReferenceKind>) {
        let Some(kind) = kind else {
            for item in items {
                self.walk(item, Context::default());
            }
            return;
        };

        match kind {
            ReferenceKind::DependsOn => {
                for item in items {
                    self.walk(item, Context::inherit(kind));
                }
            }
            ReferenceKind::GetAtt => self.get_att_sequence(items),
            ReferenceKind::Sub => {
                let Some((template, rest)) = items.split_first() else {
                    return;
                };
                let variables = rest.first().map(Node::keys).unwrap_or_default();
                self.walk(
                    template,
                    Context {
                        kind: Some(kind),
                        sub_locals: &variables,
                    },
                );
                for item in rest {
                    self.walk(item, Context::default());
                }
            }
            ReferenceKind::Ref | ReferenceKind::If | ReferenceKind::FindInMap => {
                let Some((first, rest)) = items.split_first() else {
                    return;
                };
                self.walk(first, Context::inherit(kind));
                for item in rest {
                    self.walk(item, Context::default());
                }
            }
        }
    }

    /// `!GetAtt [Resource, Attribute]`: leading scalars join into a dotted name.
    fn get_att_sequence(&mut self, items: &[Node]) {
        let scalars: Vec<&str> = items
            .iter()
            .map_while(|item| item.tag().is_none().then(|| item.as_str()).flatten())
            .collect();
        if let Some(first) = items.first().filter(|_| !scalars.is_empty()) {
            let mut reference = Reference::new(
                ReferenceKind::GetAtt,
                scalars.join("."),
                first.value_start() + quote_width(first),
            );
            if scalars.len() < items.len() {
                reference = reference.with_computed_attribute();
            }
            self.emit(reference);
        }
        for item in &items[scalars.len()..] {
            self.walk(item, Context::default());
        }
    }

    /// Record the names carried by one scalar.
    fn scalar(&mut self, node: &Node, kind: ReferenceKind, sub_locals: &[&str]) {
        let Some(value) = node.as_str() else {
            return;
        };
        let start = node.value_start() + quote_width(node);

        if kind != ReferenceKind::Sub {
            self.emit(Reference::new(kind, value, start));
            return;
        }

        for placeholder in sub::placeholders(value) {
            if placeholder.is_literal() || sub_locals.contains(&placeholder.name) {
                continue;
            }
            let offset = if node.is_verbatim() {
                start + placeholder.index + 2
            } else {
                start
            };
            self.emit(Reference::new(kind, placeholder.name, offset));
        }
    }

    fn emit(&mut self, reference: Reference) {
        let name = reference.name();
        if name.is_empty() || name.starts_with(PSEUDO_PARAMETER_PREFIX) {
            return;
        }
        trace!(kind:% = reference.kind(), name, offset = reference.offset(); "Reference found");
        self.references.insert(reference);
    }
}

fn quote_width(node: &Node) -> usize {
    node.scalar_style().map_or(0, |style| style.quote_width())
}
