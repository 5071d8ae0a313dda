use std::path::Path;

use tera::{Context, Tera};

use crate::error::{GraftError, Result};
use crate::render::context::register_filters;

/// A Tera instance with the string-case filters and without HTML/XML autoescaping.
///
/// Autoescaping would mangle generated XML such as `pom.xml` fragments.
pub fn engine() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    register_filters(&mut tera);
    tera
}

pub fn render_file_content(template_name: &str, content: &str, context: &Context) -> Result<String> {
    let mut tera = engine();
    tera.add_raw_template(template_name, content)
        .and_then(|_| tera.render(template_name, context))
        .map_err(|e| GraftError::RenderError {
            file: template_name.to_string(),
            source: e,
        })
}

/// Render template expressions in a path component (e.g. `{{appname}}`).
pub fn render_path_component(component: &str, context: &Context) -> Result<String> {
    if !component.contains("{{") && !component.contains("{%") {
        return Ok(component.to_string());
    }

    let mut tera = engine();
    tera.add_raw_template("__path__", component).map_err(|e| {
        GraftError::FilenameRenderError {
            filename: component.to_string(),
            source: e,
        }
    })?;

    tera.render("__path__", context)
        .map_err(|e| GraftError::FilenameRenderError {
            filename: component.to_string(),
            source: e,
        })
}

/// Detect binary content using content_inspector (BOM-aware, null-byte scanning).
///
/// Only the first 8KB are inspected.
pub fn is_binary(content: &[u8]) -> bool {
    let head = &content[..content.len().min(8192)];
    !content_inspector::inspect(head).is_text()
}

pub fn is_binary_file(path: &Path) -> bool {
    use std::io::Read;

    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };

    let mut buf = [0u8; 8192];
    let Ok(n) = file.take(8192).read(&mut buf) else {
        return false;
    };

    is_binary(&buf[..n])
}
