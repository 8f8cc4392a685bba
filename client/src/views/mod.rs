//! View models for the three screens. They hold the screen's local state and
//! go through `PostsContext` for anything that touches the server.

pub mod detail;
pub mod form;
pub mod list;

pub use detail::DetailView;
pub use form::{CommentField, FormErrors, FormFields, FormView, Navigation};
pub use list::{DEFAULT_PAGE_SIZE, ListStatus, ListView, PostCard};
