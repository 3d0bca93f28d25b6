//! Attribute parsing for the Entity derive macro.
//!
//! Container: `#[entity(name = "...", rename_all = "...")]`.
//! Field: `#[entity(rename = "...")]` and `#[entity(skip)]`.
//!
//! When the entity attributes say nothing, the serde attributes of the same
//! item are consulted so that field names match the serialized records.

use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta, Result, Token,
};

/// Case convention applied to field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
}

impl RenameRule {
    /// Parses a serde-style rule name.
    pub fn from_lit(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "lowercase" => Ok(RenameRule::Lower),
            "UPPERCASE" => Ok(RenameRule::Upper),
            "PascalCase" => Ok(RenameRule::Pascal),
            "camelCase" => Ok(RenameRule::Camel),
            "snake_case" => Ok(RenameRule::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(RenameRule::ScreamingSnake),
            "kebab-case" => Ok(RenameRule::Kebab),
            other => Err(Error::new(
                lit.span(),
                format!(
                    "unknown rename rule: '{}'. Expected one of: lowercase, UPPERCASE, \
                     PascalCase, camelCase, snake_case, SCREAMING_SNAKE_CASE, kebab-case",
                    other
                ),
            )),
        }
    }

    /// Applies the rule to a snake_case Rust field name.
    pub fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::Pascal | RenameRule::Camel => {
                let mut out = String::with_capacity(field.len());
                let mut upper_next = self == RenameRule::Pascal;
                for c in field.chars() {
                    if c == '_' {
                        upper_next = true;
                    } else if upper_next {
                        out.push(c.to_ascii_uppercase());
                        upper_next = false;
                    } else {
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}

/// Container-level attributes from `#[entity(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    /// Entity name (default: the type name).
    pub name: Option<String>,
    /// Field naming rule.
    pub rename_all: Option<RenameRule>,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            let Meta::NameValue(nv) = &meta else {
                return Err(Error::new(
                    meta.span(),
                    "unknown entity attribute. Expected: name = \"...\" or rename_all = \"...\"",
                ));
            };
            let lit = string_lit(&nv.value)?;
            if nv.path.is_ident("name") {
                attr.name = Some(lit.value());
            } else if nv.path.is_ident("rename_all") {
                attr.rename_all = Some(RenameRule::from_lit(lit)?);
            } else {
                return Err(Error::new(
                    nv.path.span(),
                    "unknown attribute. Expected: name or rename_all",
                ));
            }
        }

        Ok(attr)
    }
}

/// Field-level attributes from `#[entity(...)]`.
#[derive(Debug, Clone, Default)]
pub struct FieldAttr {
    /// Leave the field out of the declared field list.
    pub skip: bool,
    /// Record name of the field.
    pub rename: Option<String>,
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_lit(&nv.value)?.value());
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown entity field attribute. Expected: skip or rename = \"...\"",
                    ))
                }
            }
        }

        Ok(attr)
    }
}

fn string_lit(expr: &Expr) -> Result<&LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        other => Err(Error::new(other.span(), "expected a string literal")),
    }
}

/// Reads `#[entity(...)]` on the container, falling back to serde's
/// `rename_all`.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    let mut attr = ContainerAttr::default();
    for a in attrs {
        if a.path().is_ident("entity") {
            attr = a.parse_args::<ContainerAttr>()?;
        }
    }
    if attr.rename_all.is_none() {
        if let Some(lit) = serde_value(attrs, "rename_all") {
            attr.rename_all = RenameRule::from_lit(&lit).ok();
        }
    }
    Ok(attr)
}

/// Reads `#[entity(...)]` on a field, falling back to serde's `rename` and
/// `skip`.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    let mut attr = FieldAttr::default();
    for a in attrs {
        if a.path().is_ident("entity") {
            attr = a.parse_args::<FieldAttr>()?;
        }
    }
    if attr.rename.is_none() {
        attr.rename = serde_value(attrs, "rename").map(|lit| lit.value());
    }
    if !attr.skip {
        attr.skip = serde_flag(attrs, "skip");
    }
    Ok(attr)
}

/// Finds `key = "..."` inside `#[serde(...)]`. Unparseable serde attributes
/// are serde's business and are ignored here.
fn serde_value(attrs: &[Attribute], key: &str) -> Option<LitStr> {
    serde_metas(attrs).into_iter().find_map(|meta| match meta {
        Meta::NameValue(nv) if nv.path.is_ident(key) => string_lit(&nv.value).ok().cloned(),
        _ => None,
    })
}

fn serde_flag(attrs: &[Attribute], key: &str) -> bool {
    serde_metas(attrs)
        .iter()
        .any(|meta| matches!(meta, Meta::Path(p) if p.is_ident(key)))
}

fn serde_metas(attrs: &[Attribute]) -> Vec<Meta> {
    attrs
        .iter()
        .filter(|a| a.path().is_ident("serde"))
        .filter_map(|a| {
            a.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .collect()
}
