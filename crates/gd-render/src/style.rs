//! Style properties → visual primitives.
//!
//! Translates the abstract, partially-defined [`StyleProperties`] of a
//! feature into concrete primitives a renderer can draw directly. Icons and
//! fill patterns go through the [`GeometryCache`], so translating the same
//! style every frame costs a few map lookups.

use crate::cache::{GeometryCache, Rasterize, ResourceKind, ResourceStore, SvgRasterizer};
use gd_core::{Color, FillProperties, PointProperties, StyleProperties};
use std::rc::Rc;

/// Pattern tiles are always rendered at this size.
pub const PATTERN_TILE_PX: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct StrokePrimitive {
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FillPrimitive {
    Solid(Color),
    Pattern { tile: Rc<str>, background: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointPrimitive {
    Icon { image: Rc<str>, size: u32 },
    Circle { radius: f64, fill: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub value: String,
    pub color: Color,
    pub size: f64,
}

/// Everything needed to draw one feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualStyle {
    pub stroke: Option<StrokePrimitive>,
    pub fill: Option<FillPrimitive>,
    pub point: Option<PointPrimitive>,
    pub text: Option<TextPrimitive>,
    pub z_index: i32,
}

fn pixel_size(size: f64) -> u32 {
    size.round().clamp(1.0, u32::MAX as f64) as u32
}

/// Resource store plus cache.
#[derive(Debug)]
pub struct StyleFactory<R = SvgRasterizer> {
    resources: ResourceStore,
    cache: GeometryCache<R>,
}

impl StyleFactory<SvgRasterizer> {
    pub fn new(resources: ResourceStore) -> Self {
        Self::with_cache(resources, GeometryCache::default())
    }
}

impl<R: Rasterize> StyleFactory<R> {
    pub fn with_cache(resources: ResourceStore, cache: GeometryCache<R>) -> Self {
        Self { resources, cache }
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn cache(&self) -> &GeometryCache<R> {
        &self.cache
    }

    pub fn visual_style(&self, props: &StyleProperties) -> VisualStyle {
        VisualStyle {
            stroke: props.stroke.as_ref().map(|s| StrokePrimitive {
                color: s.color,
                width: s.width,
            }),
            fill: props.fill.as_ref().map(|f| self.fill(f)),
            point: props.point.as_ref().map(|p| self.point(p)),
            text: props.text.as_ref().map(|t| TextPrimitive {
                value: t.value.clone(),
                color: t.color,
                size: t.size,
            }),
            z_index: props.z_index.unwrap_or(0),
        }
    }

    fn fill(&self, fill: &FillProperties) -> FillPrimitive {
        let Some(pattern) = &fill.pattern else {
            return FillPrimitive::Solid(fill.color1);
        };
        match self.resources.get(pattern) {
            Some(resource) if resource.kind == ResourceKind::Pattern => {
                let foreground = fill.color2.unwrap_or(Color::BLACK);
                FillPrimitive::Pattern {
                    tile: self.cache.prepare_cached(resource, PATTERN_TILE_PX, foreground),
                    background: fill.color1,
                }
            }
            _ => {
                log::warn!("unknown fill pattern {pattern:?}, falling back to solid fill");
                FillPrimitive::Solid(fill.color1)
            }
        }
    }

    fn point(&self, point: &PointProperties) -> PointPrimitive {
        let circle = PointPrimitive::Circle {
            radius: point.size / 2.0,
            fill: point.color,
        };
        let Some(icon) = &point.icon else {
            return circle;
        };
        match self.resources.get(icon) {
            Some(resource) if resource.kind == ResourceKind::Icon => {
                let size = pixel_size(point.size);
                PointPrimitive::Icon {
                    image: self.cache.prepare_cached(resource, size, point.color),
                    size,
                }
            }
            _ => {
                log::warn!("unknown point icon {icon:?}, falling back to circle");
                circle
            }
        }
    }
}
