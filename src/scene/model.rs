use std::sync::Arc;

use crate::{
    assets::{color::Rgba8, store::PreparedImage},
    foundation::core::{Affine, Canvas, Vec2},
    foundation::error::{FramecastError, FramecastResult},
};

/// Stable index of a node inside its [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Animatable node property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    /// Left edge of the node box, in canvas pixels.
    X,
    /// Top edge of the node box, in canvas pixels.
    Y,
    /// Opacity. Stored unclamped; renderers clamp into `[0, 1]`.
    Opacity,
}

/// One property assignment produced by an animation for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyUpdate {
    /// Node being updated.
    pub target: NodeId,
    /// Property being updated.
    pub property: Property,
    /// New value.
    pub value: f64,
}

impl PropertyUpdate {
    /// Build an update record.
    pub fn new(target: NodeId, property: Property, value: f64) -> Self {
        Self {
            target,
            property,
            value,
        }
    }
}

/// Current values of a node's animatable properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeProps {
    /// See [`Property::X`].
    pub x: f64,
    /// See [`Property::Y`].
    pub y: f64,
    /// See [`Property::Opacity`].
    pub opacity: f64,
}

impl Default for NodeProps {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            opacity: 1.0,
        }
    }
}

impl NodeProps {
    /// Read one property.
    pub fn get(&self, property: Property) -> f64 {
        match property {
            Property::X => self.x,
            Property::Y => self.y,
            Property::Opacity => self.opacity,
        }
    }

    /// Overwrite one property.
    pub fn set(&mut self, property: Property, value: f64) {
        match property {
            Property::X => self.x = value,
            Property::Y => self.y = value,
            Property::Opacity => self.opacity = value,
        }
    }

    /// Translation placing the node box's top-left corner.
    pub fn translation(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y))
    }

    /// Opacity clamped into `[0, 1]` as the rasterizer expects.
    pub fn draw_opacity(&self) -> f32 {
        if self.opacity.is_nan() {
            return 0.0;
        }
        self.opacity.clamp(0.0, 1.0) as f32
    }
}

/// Raw font file contents shared between nodes.
#[derive(Clone, Debug)]
pub struct FontData {
    /// TrueType/OpenType bytes.
    pub bytes: Arc<Vec<u8>>,
}

/// Single-line text horizontally centered inside a box of `box_width` pixels.
#[derive(Clone, Debug)]
pub struct TextNode {
    /// Text to shape.
    pub text: String,
    /// Font to shape with.
    pub font: FontData,
    /// Font size in pixels.
    pub size_px: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Width of the alignment box.
    pub box_width: f64,
}

/// Raster image drawn at `width x height` canvas pixels.
#[derive(Clone, Debug)]
pub struct ImageNode {
    /// Decoded premultiplied pixels.
    pub image: Arc<PreparedImage>,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
}

/// Drawable content of a node.
#[derive(Clone, Debug)]
pub enum NodeContent {
    /// Shaped text.
    Text(TextNode),
    /// Bitmap image.
    Image(ImageNode),
}

/// A drawable element of the overlay.
#[derive(Clone, Debug)]
pub struct Node {
    /// Index in the owning scene.
    pub id: NodeId,
    /// Human readable name, used in diagnostics.
    pub name: String,
    /// What to draw.
    pub content: NodeContent,
    /// Property values before any animation runs.
    pub initial: NodeProps,
}

/// Static description of the overlay: canvas plus nodes in paint order.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Output canvas.
    pub canvas: Canvas,
    nodes: Vec<Node>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            nodes: Vec::new(),
        }
    }

    /// Append a node on top of the existing ones and return its id.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        content: NodeContent,
        initial: NodeProps,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name: name.into(),
            content,
            initial,
        });
        id
    }

    /// Nodes in paint order (first is bottom-most).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Fresh state holding each node's initial properties.
    pub fn initial_state(&self) -> SceneState {
        SceneState {
            props: self.nodes.iter().map(|n| n.initial).collect(),
        }
    }
}

/// Mutable per-run property values, exclusively owned by the render loop.
///
/// Values persist from frame to frame: a property that no active clip touches keeps whatever value
/// was last written.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneState {
    props: Vec<NodeProps>,
}

impl SceneState {
    /// Properties of `id`, if it exists.
    pub fn get(&self, id: NodeId) -> Option<&NodeProps> {
        self.props.get(id.0 as usize)
    }

    /// Apply one update in place.
    pub fn apply(&mut self, update: &PropertyUpdate) -> FramecastResult<()> {
        let len = self.props.len();
        let props = self.props.get_mut(update.target.0 as usize).ok_or_else(|| {
            FramecastError::animation(format!(
                "update targets unknown node {:?} ({len} nodes in scene)",
                update.target
            ))
        })?;
        props.set(update.property, update.value);
        Ok(())
    }

    /// Apply updates in order; later updates to the same property win.
    pub fn apply_all(&mut self, updates: &[PropertyUpdate]) -> FramecastResult<()> {
        for u in updates {
            self.apply(u)?;
        }
        Ok(())
    }

    /// Number of nodes tracked.
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Return `true` when no nodes are tracked.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
