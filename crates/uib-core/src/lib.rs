pub mod canonical;
pub mod components;
pub mod data;
pub mod fields;
pub mod id;
pub mod model;
pub mod patch;
pub mod path;
pub mod project;
pub mod sheet;
pub mod styles;
pub mod tree;

pub use canonical::{CanonicalCodec, CanonicalDocument, ContainerCodec, from_canonical_json, to_canonical_json};
pub use data::{ApiBinding, DataMapping, DataModelEntry, apply_bindings, binding_patches};
pub use fields::{FieldError, NodeError};
pub use id::NodeId;
pub use model::*;
pub use patch::{NodePatch, apply_update, apply_updates};
pub use path::{get_value_at_path, set_value_at_path};
pub use project::{Project, Screen, default_project, normalize_project};
pub use tree::{
    add_node, find_node, find_parent, has_descendant, move_node, path_to_node, remove_node,
};
