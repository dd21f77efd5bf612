//! Element model
//!
//! Elements are the headless stand-in for page nodes: a label (used as the
//! anchor id), an optional `href`, a parent/child structure, layout geometry
//! and a bag of animatable style properties.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    /// Handle to an element in the stage
    pub struct ElementId;
}

/// Animatable style properties
///
/// Every property has a neutral default that is reported when the element
/// has never had the property written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// 0.0 (transparent) to 1.0 (opaque)
    Opacity,
    /// Gaussian blur radius in pixels
    Blur,
    /// Horizontal translation in pixels
    X,
    /// Vertical translation in pixels
    Y,
    /// Uniform scale factor
    Scale,
    /// Rotation in degrees
    Rotate,
    /// Width as a percentage of the parent (progress bars)
    WidthPct,
    /// Box-shadow glow intensity (0.0 to 1.0)
    Glow,
    /// Drop-shadow filter intensity (0.0 to 1.0)
    DropShadow,
    /// 0.0 hidden, 1.0 visible
    Visibility,
    /// Vertical offset applied while an element is pinned in the viewport
    PinShift,
}

impl Property {
    /// Value reported for an element that never had this property written
    pub fn default_value(self) -> f32 {
        match self {
            Property::Opacity | Property::Scale | Property::Visibility => 1.0,
            Property::Blur
            | Property::X
            | Property::Y
            | Property::Rotate
            | Property::WidthPct
            | Property::Glow
            | Property::DropShadow
            | Property::PinShift => 0.0,
        }
    }

    /// Short lowercase name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Property::Opacity => "opacity",
            Property::Blur => "blur",
            Property::X => "x",
            Property::Y => "y",
            Property::Scale => "scale",
            Property::Rotate => "rotate",
            Property::WidthPct => "width",
            Property::Glow => "glow",
            Property::DropShadow => "drop-shadow",
            Property::Visibility => "visibility",
            Property::PinShift => "pin-shift",
        }
    }
}

/// Current style values of an element
#[derive(Debug, Clone, Default)]
pub struct Style {
    values: FxHashMap<Property, f32>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property value, falling back to its default
    pub fn get(&self, property: Property) -> f32 {
        self.values
            .get(&property)
            .copied()
            .unwrap_or_else(|| property.default_value())
    }

    /// Whether the property has been written explicitly
    pub fn is_set(&self, property: Property) -> bool {
        self.values.contains_key(&property)
    }

    pub fn set(&mut self, property: Property, value: f32) {
        self.values.insert(property, value);
    }

    pub fn clear(&mut self, property: Property) {
        self.values.remove(&property);
    }
}

/// Layout geometry of an element, in document coordinates
///
/// `top` is measured from the top of the document (not the viewport).
/// `scroll_width` is the full content width including overflow; it equals
/// `width` for elements that do not overflow horizontally.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Layout {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
    pub scroll_width: f32,
}

impl Layout {
    pub fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
            scroll_width: width,
        }
    }

    /// Set the overflowing content width
    pub fn with_scroll_width(mut self, scroll_width: f32) -> Self {
        self.scroll_width = scroll_width;
        self
    }

    /// Visible width of the element (the DOM `offsetWidth`)
    pub fn offset_width(&self) -> f32 {
        self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Viewport dimensions in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 900.0,
        }
    }
}

/// A node in the element tree
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub(crate) label: String,
    pub(crate) href: Option<String>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: SmallVec<[ElementId; 4]>,
    pub(crate) layout: Layout,
    pub(crate) style: Style,
    pub(crate) classes: FxHashSet<String>,
    /// Extra document height inserted after this element while it is pinned
    pub(crate) pin_spacing: f32,
}

impl Element {
    pub(crate) fn new(label: impl Into<String>, parent: Option<ElementId>) -> Self {
        Self {
            label: label.into(),
            parent,
            ..Default::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn pin_spacing(&self) -> f32 {
        self.pin_spacing
    }
}
