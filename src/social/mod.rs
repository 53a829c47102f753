pub mod comment;
pub mod common;
pub mod follow;
pub mod post;

pub use comment::*;
pub use common::*;
pub use follow::*;
pub use post::*;
