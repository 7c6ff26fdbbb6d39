//! The sum-type registry: maps each declared enum name to its variants,
//! populated in a first discovery pass before any match is lowered.
//!
//! Enum declarations are authored directly as already-Go-parseable type
//! declarations carrying a `// DINGO_ENUM: <Name>` leading comment plus one
//! `// DINGO_VARIANT: <Name>(<field>: <Type>, ...)` comment per variant —
//! see DESIGN.md for why this convention, rather than surface `enum { }`
//! syntax, is what reaches the AST phase.

use dingo_goast::{Ast, NodeData, NodeId, TypeExpr};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantKind {
    Unit,
    /// Named fields, e.g. a struct variant.
    Struct(Vec<(String, TypeExpr)>),
    /// Positional fields, e.g. a tuple variant.
    Tuple(Vec<TypeExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub kind: VariantKind,
}

impl Variant {
    /// Every `Option_<T>` instantiation shares the one `OptionTag` type and
    /// its `OptionTagSome`/`OptionTagNone` constants with the bare `Option`
    /// builtin, rather than each T declaring its own tag type; same for
    /// `Result_<T>_<E>` and `ResultTag`. A user-declared enum's variants
    /// fall back to the per-enum `<Variant>Tag` scheme.
    pub fn tag_name(&self, enum_name: &str) -> String {
        let family = if enum_name == "Option" || enum_name.starts_with("Option_") {
            "Option"
        } else if enum_name == "Result" || enum_name.starts_with("Result_") {
            "Result"
        } else {
            enum_name
        };
        match (family, self.name.as_str()) {
            ("Result", "Ok") => "ResultTagOk".to_string(),
            ("Result", "Err") => "ResultTagErr".to_string(),
            ("Option", "Some") => "OptionTagSome".to_string(),
            ("Option", "None") => "OptionTagNone".to_string(),
            _ => format!("{}Tag", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<Variant>,
    pub decl_node: NodeId,
}

/// Keyed by enum name, in declaration/registration order: `IndexMap` rather
/// than a hash map so the synthesized tag/union/constructor decls come out
/// in the same order on every run instead of hash-iteration order.
#[derive(Debug, Clone, Default)]
pub struct SumTypeRegistry {
    enums: IndexMap<String, EnumDef>,
}

impl SumTypeRegistry {
    pub fn get(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    pub fn insert(&mut self, def: EnumDef) {
        self.enums.insert(def.name.clone(), def);
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnumDef> {
        self.enums.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.enums.keys().map(String::as_str)
    }

    /// Discovery pass: starts from the two built-in sum types every file
    /// gets for free (`Option`, `Result`), then scans all top-level type
    /// declarations for `DINGO_ENUM`/`DINGO_VARIANT` markers and adds
    /// whatever user enums they declare, before any match is lowered.
    pub fn discover(ast: &Ast) -> Self {
        let mut registry = Self::with_builtins();
        let NodeData::File { decls, .. } = ast.get(ast.root) else {
            return registry;
        };
        for decl_id in decls {
            let NodeData::TypeDecl { .. } = ast.get(*decl_id) else {
                continue;
            };
            let comments = ast.leading_comments(*decl_id);
            let Some(name) = comments.iter().find_map(|c| parse_enum_marker(c)) else {
                continue;
            };
            let variants: Vec<Variant> = comments
                .iter()
                .filter_map(|c| parse_variant_marker(c))
                .collect();
            registry.insert(EnumDef {
                name,
                variants,
                decl_node: *decl_id,
            });
        }
        registry
    }

    /// `Option` and `Result` are monomorphic union structs: their payload
    /// fields are typed `any` rather than generated per instantiation, so
    /// one `Option`/`Result` type serves every `T`/`E`. Pre-registering
    /// them here means a file never has to spell out a `DINGO_ENUM` marker
    /// for either.
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        registry.insert(EnumDef {
            name: "Option".to_string(),
            variants: vec![
                Variant {
                    name: "Some".to_string(),
                    kind: VariantKind::Tuple(vec![TypeExpr::Any]),
                },
                Variant {
                    name: "None".to_string(),
                    kind: VariantKind::Unit,
                },
            ],
            decl_node: NodeId(0),
        });
        registry.insert(EnumDef {
            name: "Result".to_string(),
            variants: vec![
                Variant {
                    name: "Ok".to_string(),
                    kind: VariantKind::Tuple(vec![TypeExpr::Any]),
                },
                Variant {
                    name: "Err".to_string(),
                    kind: VariantKind::Tuple(vec![TypeExpr::Any]),
                },
            ],
            decl_node: NodeId(0),
        });
        registry
    }
}

fn parse_enum_marker(comment: &str) -> Option<String> {
    comment
        .strip_prefix("// DINGO_ENUM:")
        .map(|rest| rest.trim().to_string())
}

fn parse_variant_marker(comment: &str) -> Option<Variant> {
    let rest = comment.strip_prefix("// DINGO_VARIANT:")?.trim();
    let (name, rest) = rest.split_once('(')?;
    let name = name.trim().to_string();
    let body = rest.strip_suffix(')')?;
    if body.trim().is_empty() {
        return Some(Variant {
            name,
            kind: VariantKind::Unit,
        });
    }
    let fields: Vec<&str> = body.split(',').map(str::trim).collect();
    if fields.iter().all(|f| !f.contains(':')) {
        let types = fields
            .iter()
            .map(|f| TypeExpr::Named(f.to_string()))
            .collect();
        return Some(Variant {
            name,
            kind: VariantKind::Tuple(types),
        });
    }
    let mut struct_fields = Vec::new();
    for field in fields {
        let (fname, ftype) = field.split_once(':')?;
        struct_fields.push((fname.trim().to_string(), TypeExpr::Named(ftype.trim().to_string())));
    }
    Some(Variant {
        name,
        kind: VariantKind::Struct(struct_fields),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_goast::parse;

    #[test]
    fn discovers_tuple_and_struct_variants() {
        let src = concat!(
            "package main\n",
            "// DINGO_ENUM: Shape\n",
            "// DINGO_VARIANT: Circle(radius: float64)\n",
            "// DINGO_VARIANT: Rect(w: float64, h: float64)\n",
            "// DINGO_VARIANT: Empty()\n",
            "type Shape__dingo_sum struct{}\n",
        );
        let ast = parse(src).unwrap();
        let registry = SumTypeRegistry::discover(&ast);
        let shape = registry.get("Shape").unwrap();
        assert_eq!(shape.variants.len(), 3);
        assert!(matches!(shape.variants[0].kind, VariantKind::Struct(_)));
        assert!(matches!(shape.variants[2].kind, VariantKind::Unit));
    }

    #[test]
    fn builtin_tag_names_follow_fixed_scheme() {
        let ok = Variant {
            name: "Ok".into(),
            kind: VariantKind::Unit,
        };
        assert_eq!(ok.tag_name("Result"), "ResultTagOk");
        let some = Variant {
            name: "Some".into(),
            kind: VariantKind::Unit,
        };
        assert_eq!(some.tag_name("Option"), "OptionTagSome");
        let custom = Variant {
            name: "Circle".into(),
            kind: VariantKind::Unit,
        };
        assert_eq!(custom.tag_name("Shape"), "CircleTag");
    }

    #[test]
    fn instantiated_option_and_result_share_the_builtin_tag_names() {
        let some = Variant {
            name: "Some".into(),
            kind: VariantKind::Unit,
        };
        assert_eq!(some.tag_name("Option_User"), "OptionTagSome");
        let err = Variant {
            name: "Err".into(),
            kind: VariantKind::Unit,
        };
        assert_eq!(err.tag_name("Result_int_error"), "ResultTagErr");
    }
}
