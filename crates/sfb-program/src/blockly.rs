//! Import of the editor's own JSON serialization
//!
//! Blockly nests every successor inside its predecessor
//! (`"next": { "block": { ... } }`). We flatten that into the array-backed
//! [`Workspace`] and order chain heads the way the editor's ordered
//! top-block query does: by a slightly tilted scan line, top to bottom.

use crate::block::{Block, BlockIndex, NumericField};
use crate::error::ProgramError;
use crate::workspace::Workspace;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Tilt of the editor's scan line, in degrees
const SCAN_ANGLE_DEG: f64 = 3.0;

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    blocks: TopLevel,
}

#[derive(Debug, Default, Deserialize)]
struct TopLevel {
    #[serde(default)]
    blocks: Vec<NestedBlock>,
}

#[derive(Debug, Deserialize)]
struct NestedBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    fields: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    next: Option<NextConnection>,
}

#[derive(Debug, Deserialize)]
struct NextConnection {
    #[serde(default)]
    block: Option<Box<NestedBlock>>,
}

impl NestedBlock {
    fn scan_key(&self) -> f64 {
        let offset = SCAN_ANGLE_DEG.to_radians().sin();
        self.y.unwrap_or(0.0) + offset * self.x.unwrap_or(0.0)
    }
}

impl Workspace {
    /// Decode a Blockly workspace serialization
    ///
    /// Numeric fields are imported unbounded; any other field type is ignored
    /// since no block kind consumes it. Chains may be arbitrarily long.
    ///
    /// # Errors
    /// - `ProgramError::Malformed` if the JSON does not match the format
    /// - any error from [`Workspace::validate`]
    pub fn from_blockly_json(json: &str) -> Result<Self, ProgramError> {
        // Every successor nests two levels deeper, so long chains exceed
        // serde_json's default depth; the stacker grows the stack instead.
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let document = Document::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;

        let mut heads = document.blocks.blocks;
        heads.sort_by(|a, b| a.scan_key().total_cmp(&b.scan_key()));

        let mut workspace = Workspace::new();
        for head in heads {
            let mut current = Some(head);
            let mut previous: Option<BlockIndex> = None;

            while let Some(nested) = current {
                let mut block = Block::new(nested.kind);
                for (name, value) in nested.fields {
                    if let Some(number) = value.as_i64() {
                        block.fields.insert(name, NumericField::new(number, i64::MIN, i64::MAX));
                    }
                }

                let index = workspace.push(block);
                match previous {
                    Some(prev) => workspace.blocks[prev.0].next = Some(index),
                    None => workspace.top_blocks.push(index),
                }
                previous = Some(index);
                current = nested.next.and_then(|next| next.block).map(|boxed| *boxed);
            }
        }

        tracing::debug!(
            blocks = workspace.len(),
            chains = workspace.top_blocks.len(),
            "imported blockly workspace"
        );

        workspace.validate()?;
        Ok(workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::BlockSource;

    #[test]
    fn flattens_nested_chain() {
        let json = r#"{
            "blocks": {
                "languageVersion": 0,
                "blocks": [
                    {
                        "type": "take_off", "id": "a", "x": 10, "y": 10,
                        "next": { "block": {
                            "type": "forward_1s", "id": "b",
                            "next": { "block": { "type": "land", "id": "c" } }
                        } }
                    }
                ]
            }
        }"#;
        let ws = Workspace::from_blockly_json(json).unwrap();

        assert_eq!(ws.len(), 3);
        assert_eq!(ws.top_blocks(), vec![BlockIndex(0)]);
        assert_eq!(ws.next_block(BlockIndex(0)), Some(BlockIndex(1)));
        assert_eq!(ws.next_block(BlockIndex(1)), Some(BlockIndex(2)));
        assert_eq!(ws.kind_of(BlockIndex(2)), Some("land"));
    }

    #[test]
    fn orders_chain_heads_top_to_bottom() {
        let json = r#"{ "blocks": { "blocks": [
            { "type": "land", "x": 0, "y": 300 },
            { "type": "take_off", "x": 0, "y": 20 }
        ] } }"#;
        let ws = Workspace::from_blockly_json(json).unwrap();

        let heads: Vec<_> = ws
            .top_blocks()
            .into_iter()
            .filter_map(|i| ws.kind_of(i))
            .collect();
        assert_eq!(heads, vec!["take_off", "land"]);
    }

    #[test]
    fn empty_document_is_empty_workspace() {
        let ws = Workspace::from_blockly_json("{}").unwrap();
        assert!(ws.is_empty());
    }

    #[test]
    fn keeps_numeric_fields_only() {
        let json = r#"{ "blocks": { "blocks": [
            { "type": "hover", "fields": { "SECONDS": 3, "LABEL": "x" } }
        ] } }"#;
        let ws = Workspace::from_blockly_json(json).unwrap();
        let block = ws.get(BlockIndex(0)).unwrap();

        assert_eq!(block.fields.len(), 1);
        assert_eq!(block.fields["SECONDS"].value, 3);
    }

    fn nested_chain(len: usize) -> String {
        let mut block = r#"{ "type": "land" }"#.to_string();
        for _ in 1..len {
            block = format!(r#"{{ "type": "forward_1s", "next": {{ "block": {block} }} }}"#);
        }
        format!(r#"{{ "blocks": {{ "blocks": [ {block} ] }} }}"#)
    }

    #[test]
    fn long_chains_are_not_depth_limited() {
        let ws = Workspace::from_blockly_json(&nested_chain(300)).unwrap();
        let kinds = crate::walk(Some(&ws)).unwrap();

        assert_eq!(kinds.len(), 300);
        assert_eq!(kinds.last().map(String::as_str), Some("land"));
        assert_eq!(ws.top_blocks(), vec![BlockIndex(0)]);
    }

    #[test]
    fn trailing_input_is_malformed() {
        let err = Workspace::from_blockly_json("{} {}").unwrap_err();
        assert!(matches!(err, ProgramError::Malformed(_)));
    }
}
