//! Renderable attributes and their derivation from stylesheet records.
//!
//! Every visual attribute is derived deterministically from the domain object's
//! `style` map. Nodes without an explicit position get pseudo-random
//! coordinates seeded by `id + axis`, so the same id always lands on the same
//! spot until it is explicitly positioned.

use crate::constants::*;
use crate::types::{Node, Relation, StyleProperties};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How the renderer should draw a relation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    #[default]
    Straight,
    Curved,
}

/// A node as the renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: String,
    pub label: Option<String>,
    pub label_color: String,
    pub border_color: String,
    /// Border width relative to the node size
    pub border_size: f64,
    pub highlighted: bool,
    pub hidden: bool,
    /// Client-only element that has not been persisted
    pub provisional: bool,
    /// Lookup association to the domain node; the items cache owns the canonical copy
    pub data: Node,
}

/// A relation as the renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderRelation {
    pub source: String,
    pub target: String,
    pub size: f64,
    pub color: String,
    pub label: Option<String>,
    pub label_color: String,
    pub label_background_color: String,
    pub label_padding: f64,
    pub kind: RelationKind,
    /// Signed curvature, expressed relative to the pair's canonical orientation
    /// (lexicographically smaller endpoint id towards the larger one)
    pub curvature: f64,
    pub parallel_index: Option<i32>,
    pub parallel_min_index: Option<i32>,
    pub parallel_max_index: Option<i32>,
    pub highlighted: bool,
    pub hidden: bool,
    pub provisional: bool,
    pub data: Relation,
}

impl RenderRelation {
    pub fn is_self_relation(&self) -> bool {
        self.source == self.target
    }
}

/// Parse a stylesheet number the way CSS-ish values are written (`"5px"`, `"12.5"`).
///
/// Returns `None` for missing, empty or non-numeric values.
pub fn parse_style_number(value: Option<&String>) -> Option<f64> {
    let value = value?.trim();
    let end = value
        .char_indices()
        .take_while(|(i, c)| {
            c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))
        })
        .last()
        .map(|(i, c)| i + c.len_utf8())?;

    value[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Reproducible value in `[0, 1)` for a seed string.
pub fn seeded_unit(seed: &str) -> f64 {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    let mut rng = StdRng::from_seed(bytes);
    rng.gen_range(0.0..1.0)
}

/// Line breaks are encoded as runs of four or more spaces in captions.
pub fn format_caption(caption: &str) -> String {
    let mut out = String::with_capacity(caption.len());
    let mut spaces = 0usize;

    for c in caption.chars() {
        if c == ' ' {
            spaces += 1;
            continue;
        }
        push_spaces(&mut out, spaces);
        spaces = 0;
        out.push(c);
    }
    push_spaces(&mut out, spaces);
    out
}

fn push_spaces(out: &mut String, spaces: usize) {
    if spaces >= 4 {
        out.push('\n');
    } else {
        out.extend(std::iter::repeat_n(' ', spaces));
    }
}

fn style_or<'a>(style: &'a StyleProperties, key: &str, default: &'a str) -> String {
    style
        .get(key)
        .filter(|v| !v.is_empty())
        .map(String::as_str)
        .unwrap_or(default)
        .to_string()
}

fn label_for(style: &StyleProperties, title: &str) -> Option<String> {
    let caption = style
        .get("caption")
        .filter(|c| !c.is_empty())
        .map(String::as_str)
        .unwrap_or(title);
    if caption.is_empty() {
        None
    } else {
        Some(format_caption(caption))
    }
}

/// Graph size of a node given its style diameter.
pub fn node_graph_size(diameter: Option<f64>, node_size_factor: f64) -> f64 {
    diameter.unwrap_or(DEFAULT_NODE_SIZE) * NODE_SCALE_FACTOR * node_size_factor
}

/// Derive renderable node attributes from a domain node.
pub fn node_attributes(node: &Node, node_size_factor: f64) -> RenderNode {
    let style = &node.style;
    let x = parse_style_number(style.get("x"))
        .unwrap_or_else(|| seeded_unit(&format!("{}x", node.id)));
    let y = parse_style_number(style.get("y"))
        .unwrap_or_else(|| seeded_unit(&format!("{}y", node.id)));
    let size = node_graph_size(parse_style_number(style.get("diameter")), node_size_factor);
    let border_width =
        parse_style_number(style.get("border-width")).unwrap_or(DEFAULT_NODE_BORDER_WIDTH);

    RenderNode {
        x,
        y,
        size,
        color: style_or(style, "color", DEFAULT_NODE_COLOR),
        label: label_for(style, &node.title),
        label_color: style_or(style, "text-color-internal", DEFAULT_NODE_LABEL_COLOR),
        border_color: style_or(style, "border-color", DEFAULT_NODE_BORDER_COLOR),
        border_size: border_width / size,
        highlighted: false,
        hidden: false,
        provisional: false,
        data: node.clone(),
    }
}

/// Color a relation falls back to when it is not highlighted.
pub fn relation_color(relation: &Relation) -> String {
    style_or(&relation.style, "color", DEFAULT_RELATION_COLOR)
}

/// Derive renderable relation attributes from a domain relation.
pub fn relation_attributes(relation: &Relation) -> RenderRelation {
    let style = &relation.style;
    let size = parse_style_number(style.get("shaft-width")).unwrap_or(DEFAULT_RELATION_SIZE)
        * RELATION_SCALE_FACTOR;

    RenderRelation {
        source: relation.source_id.clone(),
        target: relation.target_id.clone(),
        size,
        color: relation_color(relation),
        label: label_for(style, &relation.title),
        label_color: style_or(style, "text-color-internal", DEFAULT_RELATION_LABEL_COLOR),
        label_background_color: style_or(
            style,
            "text-color-external",
            DEFAULT_RELATION_LABEL_BACKGROUND_COLOR,
        ),
        label_padding: parse_style_number(style.get("padding"))
            .unwrap_or(DEFAULT_RELATION_LABEL_PADDING),
        kind: RelationKind::Straight,
        curvature: 0.0,
        parallel_index: None,
        parallel_min_index: None,
        parallel_max_index: None,
        highlighted: false,
        hidden: false,
        provisional: false,
        data: relation.clone(),
    }
}
