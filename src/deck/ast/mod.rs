//! Formatting-preserving syntax tree
//!
//! Every byte of a record ends up in exactly one node: values hold their spelling,
//! [`PaddingNode`]s hold the trivia after them. Formatting a tree that was never
//! mutated reproduces the record text exactly.

pub mod classifier;
pub mod lists;
pub mod node;
pub mod padding;
pub mod syntax;
pub mod value;

pub use classifier::ClassifierNode;
pub use lists::{parameter, IsotopesNode, ParametersNode};
pub use node::Node;
pub use padding::PaddingNode;
pub use syntax::{ListNode, SyntaxNode};
pub use value::{Value, ValueNode, ValueType};

macro_rules! impl_into_node {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(node: $ty) -> Self {
                    Node::$variant(node)
                }
            }
        )*
    };
}

impl_into_node!(
    ValueNode => Value,
    PaddingNode => Padding,
    SyntaxNode => Syntax,
    ClassifierNode => Classifier,
    ListNode => List,
    ParametersNode => Parameters,
    IsotopesNode => Isotopes,
);
