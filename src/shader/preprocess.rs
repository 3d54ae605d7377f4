//! Shader template expansion
//!
//! Two constructs are expanded, in order:
//!
//! 1. `@name` is replaced by the value of define `name`. WGSL attributes such
//!    as `@group` and `@binding`, and anything after `//`, pass through
//!    untouched.
//! 2. A block between `@foreach var list` and `@endforeach` (each on its own
//!    line) is repeated once per comma separated item of `list`, with `$var`
//!    replaced by the item. Blocks may nest.

use super::{DefineMap, ShaderError, ShaderResult};

const FOREACH: &str = "foreach";
const ENDFOREACH: &str = "endforeach";

const WGSL_ATTRIBUTES: &[&str] = &[
    "align",
    "binding",
    "blend_src",
    "builtin",
    "compute",
    "const",
    "diagnostic",
    "fragment",
    "group",
    "id",
    "interpolate",
    "invariant",
    "location",
    "must_use",
    "size",
    "vertex",
    "workgroup_size",
];

/// Expand `template` with `defines`.
pub fn preprocess(template: &str, defines: &DefineMap) -> ShaderResult<String> {
    let lines = template
        .split('\n')
        .enumerate()
        .map(|(index, line)| substitute_defines(line, index + 1, defines))
        .collect::<ShaderResult<Vec<_>>>()?;

    Ok(expand_loops(&lines, 1)?.join("\n"))
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn substitute_defines(line: &str, line_number: usize, defines: &DefineMap) -> ShaderResult<String> {
    // Line comments pass through verbatim
    let (code, comment) = line.split_at(line.find("//").unwrap_or(line.len()));

    let mut out = String::with_capacity(line.len());
    let mut rest = code;

    while let Some(pos) = rest.find('@') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let len = after
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(after.len());
        let name = &after[..len];

        if name.is_empty()
            || name == FOREACH
            || name == ENDFOREACH
            || WGSL_ATTRIBUTES.contains(&name)
        {
            out.push('@');
            out.push_str(name);
        } else if let Some(value) = defines.get(name) {
            out.push_str(value);
        } else {
            return Err(ShaderError::UndefinedDefine {
                name: name.to_string(),
                line: line_number,
            });
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out.push_str(comment);
    Ok(out)
}

/// The directive keyword a line starts with, and the text after it.
fn directive(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix('@')?;
    let len = rest
        .find(|c: char| !is_identifier_char(c))
        .unwrap_or(rest.len());
    match &rest[..len] {
        keyword @ (FOREACH | ENDFOREACH) => Some((keyword, &rest[len..])),
        _ => None,
    }
}

fn expand_loops(lines: &[String], first_line: usize) -> ShaderResult<Vec<String>> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line_number = first_line + i;
        match directive(&lines[i]) {
            Some((FOREACH, args)) => {
                let args = args.trim();
                let var_len = args
                    .find(|c: char| !is_identifier_char(c))
                    .unwrap_or(args.len());
                let var = &args[..var_len];
                if var.is_empty() {
                    return Err(ShaderError::MalformedForeach { line: line_number });
                }
                let items: Vec<&str> = args[var_len..]
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .collect();

                let end = matching_end(lines, i).ok_or(ShaderError::UnterminatedForeach {
                    line: line_number,
                })?;
                let body = &lines[i + 1..end];

                for item in items {
                    let iteration: Vec<String> = body
                        .iter()
                        .map(|line| replace_variable(line, var, item))
                        .collect();
                    out.extend(expand_loops(&iteration, line_number + 1)?);
                }
                i = end + 1;
            }
            Some(_) => return Err(ShaderError::MalformedForeach { line: line_number }),
            None => {
                out.push(lines[i].clone());
                i += 1;
            }
        }
    }

    Ok(out)
}

fn matching_end(lines: &[String], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, line) in lines[start..].iter().enumerate() {
        match directive(line) {
            Some((FOREACH, _)) => depth += 1,
            Some(_) => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            None => {}
        }
    }
    None
}

/// Replace whole-word occurrences of `$var` with `value`.
fn replace_variable(line: &str, var: &str, value: &str) -> String {
    let pattern = format!("${var}");
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(pos) = rest.find(&pattern) {
        let after = &rest[pos + pattern.len()..];
        out.push_str(&rest[..pos]);
        if after.starts_with(is_identifier_char) {
            out.push_str(&pattern);
        } else {
            out.push_str(value);
        }
        rest = after;
    }

    out.push_str(rest);
    out
}
