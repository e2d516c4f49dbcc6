//! Geometry: layout boxes, normalized origins and actor transforms

use serde::{Deserialize, Serialize};

/// Animatable property of an element
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum Property {
    /// Vertical displacement in pixels (negative is up)
    TranslateY,
    /// Uniform scale
    Scale,
    /// Horizontal scale on top of `Scale`
    ScaleX,
    /// Vertical scale on top of `Scale`
    ScaleY,
    /// Rotation in degrees
    Rotate,
    Opacity,
    /// SVG stroke dash offset
    DashOffset,
}

impl Property {
    /// The five transform properties, in composition order
    pub const TRANSFORM: [Property; 5] = [
        Property::TranslateY,
        Property::Scale,
        Property::ScaleX,
        Property::ScaleY,
        Property::Rotate,
    ];

    /// Value of this property when nothing animates it
    pub fn rest_value(self) -> f32 {
        match self {
            Property::TranslateY | Property::Rotate | Property::DashOffset => 0.0,
            Property::Scale | Property::ScaleX | Property::ScaleY | Property::Opacity => 1.0,
        }
    }
}

/// Transform applied to an actor's container, origin at bottom center
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Transform {
    pub offset_y: f32,
    pub scale: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
}

impl Transform {
    /// Canonical resting transform
    pub const IDENTITY: Transform = Transform {
        offset_y: 0.0,
        scale: 1.0,
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: 0.0,
    };

    /// Read a property. Non-transform properties report their rest value.
    pub fn get(&self, property: Property) -> f32 {
        match property {
            Property::TranslateY => self.offset_y,
            Property::Scale => self.scale,
            Property::ScaleX => self.scale_x,
            Property::ScaleY => self.scale_y,
            Property::Rotate => self.rotation,
            other => other.rest_value(),
        }
    }

    /// Write a property. Non-transform properties are ignored.
    pub fn set(&mut self, property: Property, value: f32) {
        match property {
            Property::TranslateY => self.offset_y = value,
            Property::Scale => self.scale = value,
            Property::ScaleX => self.scale_x = value,
            Property::ScaleY => self.scale_y = value,
            Property::Rotate => self.rotation = value,
            Property::Opacity | Property::DashOffset => {}
        }
    }

    /// Offset, uniform scale and rotation are at rest (within `eps`)
    pub fn is_resting(&self, eps: f32) -> bool {
        self.offset_y.abs() <= eps
            && (self.scale - 1.0).abs() <= eps
            && self.rotation.abs() <= eps
    }

    /// Every component, including the axis scales, is at rest
    pub fn is_identity(&self, eps: f32) -> bool {
        self.is_resting(eps)
            && (self.scale_x - 1.0).abs() <= eps
            && (self.scale_y - 1.0).abs() <= eps
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Bounding box in viewport pixels
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Visible area of the page
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Normalized origin of the center of `anchor`
    pub fn origin_of(&self, anchor: &Rect) -> Origin {
        let (cx, cy) = anchor.center();
        Origin {
            x: if self.width > 0.0 { cx / self.width } else { 0.5 },
            y: if self.height > 0.0 { cy / self.height } else { 0.5 },
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1440.0, 900.0)
    }
}

/// Screen-space point normalized to the viewport, (0, 0) top left
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Origin {
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_resting() {
        assert!(Transform::IDENTITY.is_identity(0.0));
        assert!(Transform::default().is_resting(0.0));
    }

    #[test]
    fn test_set_ignores_non_transform() {
        let mut t = Transform::IDENTITY;
        t.set(Property::Opacity, 0.2);
        t.set(Property::DashOffset, 60.0);
        assert_eq!(t, Transform::IDENTITY);

        t.set(Property::Rotate, -8.0);
        assert_eq!(t.get(Property::Rotate), -8.0);
        assert!(!t.is_resting(0.01));
    }

    #[test]
    fn test_origin_of_anchor() {
        let viewport = Viewport::new(1000.0, 800.0);
        let anchor = Rect::new(100.0, 400.0, 200.0, 400.0);
        let origin = viewport.origin_of(&anchor);

        assert!((origin.x - 0.2).abs() < 1e-6);
        assert!((origin.y - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_origin_of_degenerate_viewport() {
        let origin = Viewport::new(0.0, 0.0).origin_of(&Rect::default());
        assert_eq!(origin, Origin { x: 0.5, y: 0.5 });
    }
}
