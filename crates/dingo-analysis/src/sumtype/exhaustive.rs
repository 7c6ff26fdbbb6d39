//! Exhaustiveness checking for tag-switch matches.

use super::registry::EnumDef;

/// Single-scrutinee exhaustiveness: returns the variant names from `enum_def`
/// that no arm in `covered` handles. A `_` (wildcard) arm covers everything.
pub fn missing_single(enum_def: &EnumDef, covered: &[String]) -> Vec<String> {
    if covered.iter().any(|c| c == "_") {
        return Vec::new();
    }
    enum_def
        .variants
        .iter()
        .map(|v| v.name.clone())
        .filter(|name| !covered.contains(name))
        .collect()
}

/// Decision-tree exhaustiveness over a tuple scrutinee: recursively
/// enumerates each position's variants against the covered `rows`. `rows`
/// is the list of tuple-arm patterns, each a `position_enums.len()`-long
/// vector of variant names or `"_"`. Returns the list of missing patterns,
/// each the same shape as a row.
pub fn missing_tuple_patterns(
    position_enums: &[&EnumDef],
    rows: &[Vec<String>],
) -> Vec<Vec<String>> {
    // A fully-wildcard row is always exhaustive on its own.
    if rows
        .iter()
        .any(|row| row.iter().all(|cell| cell == "_"))
    {
        return Vec::new();
    }
    let Some((enum0, rest_enums)) = position_enums.split_first() else {
        return if rows.is_empty() {
            vec![Vec::new()]
        } else {
            Vec::new()
        };
    };
    let mut missing = Vec::new();
    for variant in &enum0.variants {
        let sub_rows: Vec<Vec<String>> = rows
            .iter()
            .filter(|row| row[0] == variant.name || row[0] == "_")
            .map(|row| row[1..].to_vec())
            .collect();
        for sub in missing_tuple_patterns(rest_enums, &sub_rows) {
            let mut full = vec![variant.name.clone()];
            full.extend(sub);
            missing.push(full);
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sumtype::registry::{Variant, VariantKind};
    use dingo_goast::NodeId;

    fn result_enum() -> EnumDef {
        EnumDef {
            name: "Result".to_string(),
            variants: vec![
                Variant {
                    name: "Ok".into(),
                    kind: VariantKind::Tuple(vec![]),
                },
                Variant {
                    name: "Err".into(),
                    kind: VariantKind::Tuple(vec![]),
                },
            ],
            decl_node: NodeId(0),
        }
    }

    #[test]
    fn scenario_d_non_exhaustive_match() {
        let def = result_enum();
        let missing = missing_single(&def, &["Ok".to_string()]);
        assert_eq!(missing, vec!["Err".to_string()]);
    }

    #[test]
    fn single_wildcard_arm_is_exhaustive() {
        let def = result_enum();
        let missing = missing_single(&def, &["_".to_string()]);
        assert!(missing.is_empty());
    }

    #[test]
    fn tuple_exhaustiveness_finds_missing_combination() {
        let def = result_enum();
        let enums = [&def, &def];
        // Covers (Ok, Ok) and (Err, _) only, missing (Ok, Err).
        let rows = vec![
            vec!["Ok".to_string(), "Ok".to_string()],
            vec!["Err".to_string(), "_".to_string()],
        ];
        let missing = missing_tuple_patterns(&enums, &rows);
        assert_eq!(missing, vec![vec!["Ok".to_string(), "Err".to_string()]]);
    }

    #[test]
    fn tuple_fully_wildcard_row_is_exhaustive() {
        let def = result_enum();
        let enums = [&def, &def];
        let rows = vec![vec!["_".to_string(), "_".to_string()]];
        assert!(missing_tuple_patterns(&enums, &rows).is_empty());
    }
}
