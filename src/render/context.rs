use std::collections::{BTreeMap, HashMap};

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use tera::{Context, Tera, Value};

use crate::error::{GraftError, Result};

/// Name under which the project identifier is exposed to templates.
pub const APPNAME: &str = "appname";

pub fn build_context(variables: &BTreeMap<String, Value>) -> Context {
    let mut context = Context::new();
    for (key, value) in variables {
        context.insert(key, value);
    }
    context
}

/// Values derived from the project identifier, as seen by every template.
pub fn derived_variables(appname: &str) -> BTreeMap<String, Value> {
    let mut vars = BTreeMap::new();
    let mut put = |key: &str, value: String| {
        vars.insert(key.to_string(), Value::String(value));
    };
    put(APPNAME, appname.to_string());
    put("appname_camel", appname.to_lower_camel_case());
    put("appname_class", appname.to_upper_camel_case());
    put("appname_dash", appname.to_kebab_case());
    put("appname_underscore", appname.to_snake_case());
    put("appname_capitalized", capitalize_first(appname));
    vars
}

/// Merge caller-supplied parameters with the derived ones.
///
/// A parameter may not reuse the name of a derived value: the identifier
/// always comes from the descriptor.
pub fn build_parameters(
    params: &BTreeMap<String, Value>,
    appname: &str,
) -> Result<BTreeMap<String, Value>> {
    let derived = derived_variables(appname);
    let mut variables = BTreeMap::new();

    for (key, value) in params {
        if derived.contains_key(key) {
            return Err(GraftError::InvalidOption {
                name: key.clone(),
                reason: "this name is derived from pom.xml and cannot be set".into(),
            });
        }
        variables.insert(key.clone(), value.clone());
    }
    variables.extend(derived);

    Ok(variables)
}

/// Register the string-case filters (`camelize`, `classify`, `dasherize`,
/// `underscore`, `capitalize_first`) on a Tera instance.
pub fn register_filters(tera: &mut Tera) {
    tera.register_filter("camelize", case_filter(|s| s.to_lower_camel_case()));
    tera.register_filter("classify", case_filter(|s| s.to_upper_camel_case()));
    tera.register_filter("dasherize", case_filter(|s| s.to_kebab_case()));
    tera.register_filter("underscore", case_filter(|s| s.to_snake_case()));
    tera.register_filter("capitalize_first", case_filter(capitalize_first));
}

fn case_filter(
    transform: fn(&str) -> String,
) -> impl Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Sync + Send {
    move |value, _args| {
        let s = tera::try_get_value!("case", "value", String, value);
        Ok(Value::String(transform(&s)))
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
