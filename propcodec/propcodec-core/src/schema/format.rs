use std::fmt::{Error, Result, Write as _};

use super::{PropDef, TypeDescriptor};
use crate::registry::TypeRegistry;

/// Format prop definitions in a readable style:
/// leaf props are rendered in one line, compound props are pretty-printed.
/// Nested element/key/value types follow the same rule.
pub fn format_prop_defs(
    registry: &TypeRegistry,
    props: impl AsRef<[PropDef]>,
) -> std::result::Result<String, Error> {
    let mut out = String::new();

    for prop in props.as_ref() {
        format_prop(registry, prop, &mut out)?;
    }

    Ok(out)
}

fn prop_attributes(prop: &PropDef) -> String {
    let mut attrs = format!("required: {}", prop.is_required());
    if let Some(name) = &prop.serialized_name {
        attrs.push_str(&format!(", stored_as: {name}"));
    }
    if prop.default.is_some() {
        attrs.push_str(", default: true");
    }
    if prop.dont_store {
        attrs.push_str(", dont_store: true");
    }
    attrs
}

fn format_prop(registry: &TypeRegistry, prop: &PropDef, out: &mut String) -> Result {
    let attrs = prop_attributes(prop);
    if prop.ty.is_compound() {
        writeln!(out, "{}:", prop.name)?;
        writeln!(out, "    {attrs}")?;
        format_type(registry, &prop.ty, 4, out)
    } else {
        writeln!(
            out,
            "{}: {{ type: {}, {attrs} }}",
            prop.name,
            prop.ty.describe(registry)
        )
    }
}

fn format_type(
    registry: &TypeRegistry,
    ty: &TypeDescriptor,
    indent: usize,
    out: &mut String,
) -> Result {
    let pad = " ".repeat(indent);
    writeln!(out, "{pad}type: {}", ty.kind_name())?;

    match ty {
        TypeDescriptor::Array(element) | TypeDescriptor::Set(element) => {
            format_labeled_type(registry, "element", element, indent, out)?;
        }
        TypeDescriptor::Map { key, value } => {
            format_labeled_type(registry, "key", key, indent, out)?;
            format_labeled_type(registry, "value", value, indent, out)?;
        }
        TypeDescriptor::Union(members) => match ty.as_nilable() {
            Some(inner) => format_labeled_type(registry, "inner", inner, indent, out)?,
            None => {
                for member in members {
                    format_labeled_type(registry, "member", member, indent, out)?;
                }
            }
        },
        _ => unreachable!("{ty:?} is not a compound type"),
    }

    Ok(())
}

fn format_labeled_type(
    registry: &TypeRegistry,
    label: &str,
    ty: &TypeDescriptor,
    indent: usize,
    out: &mut String,
) -> Result {
    let pad = " ".repeat(indent);
    if ty.is_compound() {
        writeln!(out, "{pad}{label}:")?;
        format_type(registry, ty, indent + 4, out)?;
    } else {
        writeln!(out, "{pad}{label}: {{ type: {} }}", ty.describe(registry))?;
    }
    Ok(())
}
