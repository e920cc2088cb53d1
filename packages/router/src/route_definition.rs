//! Route definitions, and the compiled route tree built from them.

mod definition;
pub use definition::*;

mod path;
pub use path::{join_paths, PathPattern, WILDCARD};
pub(crate) use path::{fill_path, fixed_prefix, trim_trailing_slash};

mod tree;
pub use tree::*;

mod validate;
