//! Bidirectional source-map engine.
//!
//! A [`SourceMap`] is an ordered collection of [`Mapping`] records tying a
//! position in generated (target-language) text back to a position in the
//! original (surface-language) text. Positions are 1-based throughout, to
//! match how editors and compilers report line/column.
//!
//! Mappings are append-only while a file is being processed; the only
//! post-processing step is [`SourceMap::shift_generated_lines_from`], which
//! accounts for import blocks spliced in after the fact.

use serde::{Deserialize, Serialize};

/// One generated-position -> original-position correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub generated_line: usize,
    pub generated_column: usize,
    pub original_line: usize,
    pub original_column: usize,
    /// Length, in columns, of the generated span this mapping covers.
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Mapping {
    pub fn new(
        generated_line: usize,
        generated_column: usize,
        original_line: usize,
        original_column: usize,
        length: usize,
    ) -> Self {
        Self {
            generated_line,
            generated_column,
            original_line,
            original_column,
            length,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn generated_range(&self) -> std::ops::Range<usize> {
        self.generated_column..self.generated_column + self.length.max(1)
    }
}

/// The on-disk JSON schema for a serialized source map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMapFile {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dingo_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_file: Option<String>,
    pub mappings: Vec<Mapping>,
}

/// An ordered collection of mappings supporting bidirectional queries.
///
/// Mappings are kept sorted by `(generated_line, generated_column)`; this
/// invariant is restored by [`SourceMap::push`] and [`SourceMap::merge`] and
/// relied on by [`SourceMap::map_to_original`] for its first matching pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    mappings: Vec<Mapping>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mapping: Mapping) {
        let pos = self
            .mappings
            .partition_point(|m| Self::order_key(m) <= Self::order_key(&mapping));
        self.mappings.insert(pos, mapping);
    }

    fn order_key(m: &Mapping) -> (usize, usize) {
        (m.generated_line, m.generated_column)
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Concatenates `other`'s mappings into `self` and restores sort order.
    pub fn merge(&mut self, other: &SourceMap) {
        self.mappings.extend(other.mappings.iter().cloned());
        self.mappings.sort_by_key(Self::order_key);
    }

    /// Resolves a generated position back to its original position.
    ///
    /// When multiple mappings share `generated_line`, the one whose
    /// generated-column range contains `generated_column` wins; ties (no
    /// range contains the column) resolve to the mapping with the nearest
    /// `generated_column`.
    pub fn map_to_original(
        &self,
        generated_line: usize,
        generated_column: usize,
    ) -> Option<(usize, usize)> {
        let candidates: Vec<&Mapping> = self
            .mappings
            .iter()
            .filter(|m| m.generated_line == generated_line)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        if let Some(containing) = candidates
            .iter()
            .find(|m| m.generated_range().contains(&generated_column))
        {
            return Some((containing.original_line, containing.original_column));
        }
        let nearest = candidates.into_iter().min_by_key(|m| {
            (m.generated_column as isize - generated_column as isize).unsigned_abs()
        })?;
        Some((nearest.original_line, nearest.original_column))
    }

    /// Shifts every mapping whose `generated_line >= anchor` by `delta`
    /// lines. Used after import-block injection: mappings already past the
    /// insertion point move, mappings before it do not.
    pub fn shift_generated_lines_from(&mut self, anchor: usize, delta: i64) {
        if delta == 0 {
            return;
        }
        for m in &mut self.mappings {
            if m.generated_line >= anchor {
                m.generated_line = (m.generated_line as i64 + delta).max(1) as usize;
            }
        }
    }

    pub fn to_file(&self, dingo_file: Option<String>, go_file: Option<String>) -> SourceMapFile {
        SourceMapFile {
            version: 1,
            dingo_file,
            go_file,
            mappings: self.mappings.clone(),
        }
    }

    pub fn to_json(&self, dingo_file: Option<String>, go_file: Option<String>) -> String {
        serde_json::to_string_pretty(&self.to_file(dingo_file, go_file))
            .expect("SourceMap serializes to JSON")
    }

    pub fn from_file(file: SourceMapFile) -> Self {
        Self {
            mappings: file.mappings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_sorted_order() {
        let mut map = SourceMap::new();
        map.push(Mapping::new(3, 1, 3, 1, 1));
        map.push(Mapping::new(1, 1, 1, 1, 1));
        map.push(Mapping::new(2, 5, 2, 5, 1));
        let lines: Vec<usize> = map.mappings().iter().map(|m| m.generated_line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn roundtrip_for_every_mapping() {
        let mut map = SourceMap::new();
        map.push(Mapping::new(1, 1, 1, 1, 4));
        map.push(Mapping::new(1, 10, 1, 20, 3));
        map.push(Mapping::new(5, 0, 9, 0, 1));
        for m in map.mappings().to_vec() {
            let resolved = map.map_to_original(m.generated_line, m.generated_column);
            assert_eq!(resolved, Some((m.original_line, m.original_column)));
        }
    }

    #[test]
    fn column_tie_resolves_to_nearest() {
        let mut map = SourceMap::new();
        map.push(Mapping::new(1, 0, 10, 0, 1));
        map.push(Mapping::new(1, 20, 20, 0, 1));
        // Column 8 is not inside either [0,1) or [20,21), nearest is the one at 0.
        assert_eq!(map.map_to_original(1, 8), Some((10, 0)));
        // Column 15 is nearer to the mapping at column 20.
        assert_eq!(map.map_to_original(1, 15), Some((20, 0)));
    }

    #[test]
    fn missing_generated_line_returns_none() {
        let map = SourceMap::new();
        assert_eq!(map.map_to_original(1, 1), None);
    }

    #[test]
    fn merge_concatenates_and_resorts() {
        let mut a = SourceMap::new();
        a.push(Mapping::new(5, 0, 5, 0, 1));
        let mut b = SourceMap::new();
        b.push(Mapping::new(1, 0, 1, 0, 1));
        a.merge(&b);
        let lines: Vec<usize> = a.mappings().iter().map(|m| m.generated_line).collect();
        assert_eq!(lines, vec![1, 5]);
    }

    #[test]
    fn shift_moves_only_mappings_at_or_past_anchor() {
        let mut map = SourceMap::new();
        map.push(Mapping::new(1, 0, 1, 0, 1));
        map.push(Mapping::new(3, 0, 3, 0, 1));
        map.push(Mapping::new(5, 0, 5, 0, 1));
        map.shift_generated_lines_from(3, 2);
        let lines: Vec<usize> = map.mappings().iter().map(|m| m.generated_line).collect();
        assert_eq!(lines, vec![1, 5, 7]);
    }

    #[test]
    fn zero_delta_shift_is_noop() {
        let mut map = SourceMap::new();
        map.push(Mapping::new(3, 0, 3, 0, 1));
        let before = map.clone();
        map.shift_generated_lines_from(1, 0);
        assert_eq!(before.mappings(), map.mappings());
    }

    #[test]
    fn json_schema_roundtrips() {
        let mut map = SourceMap::new();
        map.push(Mapping::new(2, 3, 2, 3, 1).with_name("x"));
        let json = map.to_json(Some("a.dingo".into()), Some("a.go".into()));
        let file: SourceMapFile = serde_json::from_str(&json).unwrap();
        assert_eq!(file.version, 1);
        assert_eq!(file.mappings.len(), 1);
        let restored = SourceMap::from_file(file);
        assert_eq!(restored.mappings(), map.mappings());
    }

    proptest::proptest! {
        #[test]
        fn prop_every_pushed_mapping_is_queryable(
            gl in 1usize..50, gc in 0usize..50, ol in 1usize..50, oc in 0usize..50, len in 1usize..10
        ) {
            let mut map = SourceMap::new();
            map.push(Mapping::new(gl, gc, ol, oc, len));
            let resolved = map.map_to_original(gl, gc);
            proptest::prop_assert_eq!(resolved, Some((ol, oc)));
        }
    }
}
