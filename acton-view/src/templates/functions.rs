//! Helper table registered in every template environment.
//!
//! | name | kind |
//! |------|------|
//! | `yesno`, `humanize`, `slugify` | function and filter |
//! | `input_attrs`, `class_map`, `srcset` | function |
//! | `is_even`, `is_odd`, `int`, `pluralize` | function |
//! | `contains`, `has_prefix`, `has_suffix`, `split`, `trim_prefix`, `trim_suffix`, `truncate` | function |
//! | `is_blank`, `not_blank` | function |
//! | `now`, `current_year` | function |
//!
//! `lower`, `upper`, `join`, `replace`, `trim` and `safe` are minijinja built-ins.

use std::fmt::Write as _;

use chrono::Datelike;
use minijinja::value::{Rest, Value, ValueKind};
use minijinja::{Environment, Error as TemplateError, ErrorKind};

use super::helpers;

fn invalid(msg: impl Into<String>) -> TemplateError {
    TemplateError::new(ErrorKind::InvalidOperation, msg.into())
}

fn value_to_int(value: &Value) -> Result<i64, TemplateError> {
    if let Some(s) = value.as_str() {
        return helpers::to_int(s).map_err(|err| invalid(err.to_string()));
    }
    i64::try_from(value.clone())
        .map_err(|_| invalid(format!("unable to convert {} to int", value.kind())))
}

fn yesno(value: Value) -> String {
    helpers::yesno(value.is_true()).to_string()
}

fn input_attrs(name_id: String, pairs: Rest<Value>) -> Result<Value, TemplateError> {
    if pairs.len() % 2 != 0 {
        return Err(invalid(
            "input_attrs expects attributes as key/value pairs, received odd number of arguments",
        ));
    }

    let mut collected = Vec::with_capacity(pairs.len() / 2);
    for (i, pair) in pairs.chunks(2).enumerate() {
        let key = pair[0].as_str().ok_or_else(|| {
            invalid(format!(
                "input_attrs: attribute key at position {} is not a string",
                i * 2
            ))
        })?;
        let value = pair[1].as_str().unwrap_or_default();
        collected.push((key.to_string(), value.to_string()));
    }

    Ok(Value::from_serialize(helpers::input_attrs(&name_id, collected)))
}

fn class_map(pairs: Rest<Value>) -> Result<String, TemplateError> {
    if pairs.len() % 2 != 0 {
        return Err(invalid("class_map expects an even number of arguments"));
    }

    let mut collected = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks(2) {
        let name = pair[0]
            .as_str()
            .ok_or_else(|| invalid("class_map: expected class name to be a string"))?;
        if pair[1].kind() != ValueKind::Bool {
            return Err(invalid("class_map: expected condition to be a boolean"));
        }
        collected.push((name.to_string(), pair[1].is_true()));
    }

    Ok(helpers::class_map(collected))
}

fn int(value: Value) -> Result<i64, TemplateError> {
    value_to_int(&value)
}

fn pluralize(count: Value, singular: String, plural: String) -> Result<String, TemplateError> {
    let n = value_to_int(&count)?;
    Ok(helpers::pluralize(n, &singular, &plural).to_string())
}

fn split(s: &str, sep: &str) -> Vec<String> {
    s.split(sep).map(str::to_string).collect()
}

fn trim_prefix(s: &str, prefix: &str) -> String {
    s.strip_prefix(prefix).unwrap_or(s).to_string()
}

fn trim_suffix(s: &str, suffix: &str) -> String {
    s.strip_suffix(suffix).unwrap_or(s).to_string()
}

fn srcset(src: &str, sizes: Rest<String>) -> String {
    helpers::srcset(src, sizes.as_slice())
}

fn now(format: Option<&str>) -> Result<String, TemplateError> {
    let now = chrono::Local::now();
    let Some(format) = format else {
        return Ok(now.to_rfc3339());
    };

    let mut out = String::new();
    write!(out, "{}", now.format(format))
        .map_err(|_| invalid(format!("now: invalid time format {format:?}")))?;
    Ok(out)
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Add the helper table to `env`
pub fn register(env: &mut Environment<'static>) {
    env.add_function("yesno", yesno);
    env.add_filter("yesno", yesno);
    env.add_function("input_attrs", input_attrs);
    env.add_function("class_map", class_map);
    env.add_function("is_even", helpers::is_even);
    env.add_function("is_odd", helpers::is_odd);
    env.add_function("int", int);
    env.add_function("contains", |s: &str, sub: &str| s.contains(sub));
    env.add_function("has_prefix", |s: &str, prefix: &str| s.starts_with(prefix));
    env.add_function("has_suffix", |s: &str, suffix: &str| s.ends_with(suffix));
    env.add_function("humanize", helpers::humanize);
    env.add_filter("humanize", helpers::humanize);
    env.add_function("is_blank", helpers::is_blank);
    env.add_function("not_blank", helpers::not_blank);
    env.add_function("pluralize", pluralize);
    env.add_function("slugify", helpers::slugify);
    env.add_filter("slugify", helpers::slugify);
    env.add_function("split", split);
    env.add_function("trim_prefix", trim_prefix);
    env.add_function("trim_suffix", trim_suffix);
    env.add_function("truncate", |s: &str, n: usize| helpers::truncate(s, n));
    env.add_function("srcset", srcset);
    env.add_function("now", now);
    env.add_function("current_year", current_year);
}
