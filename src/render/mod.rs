pub mod context;
pub mod file;
pub mod walker;

pub use context::{build_context, build_parameters, derived_variables, APPNAME};
pub use walker::{render_resource, RenderSettings, RenderedFile, RenderedFileSet};
