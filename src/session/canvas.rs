//! Freehand annotation layer drawn over an image, and compositing.
//!
//! The layer is stored in `canvasData` as a data URL carrying the strokes as
//! JSON. Data written by other tools (a PNG snapshot of the old drawing
//! canvas, say) cannot be replayed; it is kept verbatim as an underlay so it
//! survives another save.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::errors::StudioResult;

/// Prefix of serialized annotation layers.
pub const ANNOTATIONS_PREFIX: &str = "data:application/vnd.ai-studio.annotations+json;base64,";

/// Prefix of composites made by [`DataUrlCompositor`].
pub const COMPOSITE_PREFIX: &str = "data:application/vnd.ai-studio.composite+json;base64,";

/// Drawing tool.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Paints with the stroke colour.
    #[default]
    Brush,
    /// Clears pixels under the stroke.
    Eraser,
}

/// Canvas coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

/// One pointer-down to pointer-up gesture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Brush or eraser.
    pub tool: Tool,
    /// CSS colour.
    pub color: String,
    /// Line width in pixels.
    pub width: f64,
    /// Path in drawing order.
    pub points: Vec<Point>,
}

impl Stroke {
    /// Brush stroke.
    #[must_use]
    pub fn brush(color: impl Into<String>, width: f64, points: Vec<Point>) -> Self {
        Self {
            tool: Tool::Brush,
            color: color.into(),
            width,
            points,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct EncodedLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    underlay: Option<String>,
    strokes: Vec<Stroke>,
}

/// Ordered strokes with an undo/redo history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationLayer {
    underlay: Option<String>,
    strokes: Vec<Stroke>,
    undone: Vec<Stroke>,
}

impl AnnotationLayer {
    /// Empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a layer from stored `canvasData`.
    #[must_use]
    pub fn from_canvas_data(data: Option<&str>) -> Self {
        let Some(data) = data.filter(|d| !d.is_empty()) else {
            return Self::new();
        };

        let decoded = data
            .strip_prefix(ANNOTATIONS_PREFIX)
            .and_then(|payload| STANDARD.decode(payload).ok())
            .and_then(|bytes| serde_json::from_slice::<EncodedLayer>(&bytes).ok());

        match decoded {
            Some(layer) => Self {
                underlay: layer.underlay,
                strokes: layer.strokes,
                undone: Vec::new(),
            },
            None => {
                debug!("canvas data is not an annotation layer; keeping it as underlay");
                Self {
                    underlay: Some(data.to_string()),
                    ..Self::new()
                }
            }
        }
    }

    /// Serialized form for `canvasData`, or `None` when nothing is drawn.
    ///
    /// # Errors
    /// Returns an error if the strokes cannot be serialized.
    pub fn to_canvas_data(&self) -> StudioResult<Option<String>> {
        if self.strokes.is_empty() {
            return Ok(self.underlay.clone());
        }
        let json = serde_json::to_vec(&EncodedLayer {
            underlay: self.underlay.clone(),
            strokes: self.strokes.clone(),
        })?;
        Ok(Some(format!("{ANNOTATIONS_PREFIX}{}", STANDARD.encode(json))))
    }

    /// Strokes currently visible.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Foreign canvas data carried under the strokes.
    #[must_use]
    pub fn underlay(&self) -> Option<&str> {
        self.underlay.as_deref()
    }

    /// No strokes and no underlay.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.strokes.is_empty() && self.underlay.is_none()
    }

    /// Add a stroke. Clears the redo history.
    pub fn draw(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
        self.undone.clear();
    }

    /// Take back the last stroke. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        match self.strokes.pop() {
            Some(stroke) => {
                self.undone.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Restore the last undone stroke. Returns false when there is none.
    pub fn redo(&mut self) -> bool {
        match self.undone.pop() {
            Some(stroke) => {
                self.strokes.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Erase everything, underlay included.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Flattens a base image and an annotation overlay into one displayable URL.
pub trait Compositor: Send + Sync {
    /// Composite `overlay` on top of `base`.
    ///
    /// # Errors
    /// Returns an error if the inputs cannot be combined.
    fn composite(&self, base: &str, overlay: Option<&str>) -> StudioResult<String>;
}

#[derive(Serialize)]
struct CompositeDoc<'a> {
    base: &'a str,
    overlay: &'a str,
}

/// Deterministic compositor: the same inputs always give the same URL.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataUrlCompositor;

impl Compositor for DataUrlCompositor {
    fn composite(&self, base: &str, overlay: Option<&str>) -> StudioResult<String> {
        let Some(overlay) = overlay else {
            return Ok(base.to_string());
        };
        let json = serde_json::to_vec(&CompositeDoc { base, overlay })?;
        Ok(format!("{COMPOSITE_PREFIX}{}", STANDARD.encode(json)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Stroke {
        Stroke::brush(
            "#ff0000",
            4.0,
            vec![Point { x: 1.0, y: 2.0 }, Point { x: 10.5, y: 20.25 }],
        )
    }

    #[test]
    fn test_blank_layer_has_no_canvas_data() {
        let layer = AnnotationLayer::from_canvas_data(None);
        assert!(layer.is_blank());
        assert_eq!(layer.to_canvas_data().unwrap(), None);
    }

    #[test]
    fn test_strokes_survive_serialization() {
        let mut layer = AnnotationLayer::new();
        layer.draw(line());
        let data = layer.to_canvas_data().unwrap().unwrap();
        assert!(data.starts_with(ANNOTATIONS_PREFIX));

        let restored = AnnotationLayer::from_canvas_data(Some(&data));
        assert_eq!(restored.strokes(), layer.strokes());
        assert_eq!(restored.to_canvas_data().unwrap(), Some(data));
    }

    #[test]
    fn test_foreign_data_kept_as_underlay() {
        let png = "data:image/png;base64,iVBORw0KGgo=";
        let mut layer = AnnotationLayer::from_canvas_data(Some(png));
        assert_eq!(layer.underlay(), Some(png));
        assert_eq!(layer.to_canvas_data().unwrap().as_deref(), Some(png));

        layer.draw(line());
        let data = layer.to_canvas_data().unwrap().unwrap();
        let restored = AnnotationLayer::from_canvas_data(Some(&data));
        assert_eq!(restored.underlay(), Some(png));
        assert_eq!(restored.strokes().len(), 1);
    }

    #[test]
    fn test_undo_redo() {
        let mut layer = AnnotationLayer::new();
        assert!(!layer.undo());
        layer.draw(line());
        layer.draw(line());
        assert!(layer.undo());
        assert_eq!(layer.strokes().len(), 1);
        assert!(layer.redo());
        assert_eq!(layer.strokes().len(), 2);
        assert!(!layer.redo());

        layer.undo();
        layer.draw(line());
        assert!(!layer.redo());
    }

    #[test]
    fn test_compositor_is_deterministic() {
        let compositor = DataUrlCompositor;
        assert_eq!(compositor.composite("https://img/a.png", None).unwrap(), "https://img/a.png");

        let a = compositor.composite("https://img/a.png", Some("overlay")).unwrap();
        let b = compositor.composite("https://img/a.png", Some("overlay")).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with(COMPOSITE_PREFIX));
    }
}
