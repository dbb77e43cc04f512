//! # cfn-xref parser
//!
//! Position-preserving document model for CloudFormation-style YAML
//! templates. This crate turns template text into a tree of [`Node`]s that
//! keeps intrinsic-function tags and byte offsets, and provides the
//! diagnostic types used to report problems against that text.
//!
//! ## Usage
//!
//! ```
//! # use cfn_xref_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//! Parameters:
//!   Env:
//!     Type: String
//! Resources:
//!   Bucket:
//!     Type: AWS::S3::Bucket
//!     Properties:
//!       BucketName: !Ref Env
//! "#;
//!
//!     let document = parse(source)?;
//!     assert_eq!(document.section("Parameters").keys(), vec!["Env"]);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod position;

mod loader;
mod node;
mod span;

pub use node::{EMPTY_NODE, Node, NodeKind, ScalarStyle};
pub use position::{LineRange, RowColumn, row_column_of};
pub use span::Span;

use log::debug;

use error::ParseError;

/// A parsed template: the root node of its first YAML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// The root node; the Empty sentinel for an empty file.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// A top-level section such as `Resources` or `Outputs`.
    pub fn section(&self, name: &str) -> &Node {
        self.root.get(name)
    }
}

/// Parse template text into a [`Document`].
///
/// # Errors
///
/// Returns a [`ParseError`] with one `E001` diagnostic when the text is not
/// valid YAML.
pub fn parse(source: &str) -> Result<Document, ParseError> {
    let root = loader::load(source)?;
    debug!(sections:? = root.keys(); "Template parsed");
    Ok(Document { root })
}
