//! Memoized icon and pattern renderings.
//!
//! Rendering a resource at a given size and color is pure but expensive, and
//! it happens on every frame for every styled feature. The cache key is
//! derived from every visually relevant input, so an entry never needs to be
//! invalidated: it is written once and then only read. A hit is one
//! `HashMap` lookup.

use gd_core::Color;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// What a resource is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Point symbol, drawn centered on the feature.
    Icon,
    /// Tile repeated across a polygon fill.
    Pattern,
}

/// A drawable asset: an SVG body with a square view box.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: String,
    pub kind: ResourceKind,
    /// Inner SVG markup. `currentColor` is replaced by the requested color.
    pub svg_body: String,
    /// Side length of the source view box.
    pub view_box: u32,
}

impl Resource {
    pub fn icon(id: impl Into<String>, svg_body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ResourceKind::Icon,
            svg_body: svg_body.into(),
            view_box: 24,
        }
    }

    pub fn pattern(id: impl Into<String>, svg_body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ResourceKind::Pattern,
            svg_body: svg_body.into(),
            view_box: 16,
        }
    }
}

/// Opaque keyed store of drawable resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    resources: HashMap<String, Resource>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: Resource) {
        self.resources.insert(resource.id.clone(), resource);
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl FromIterator<Resource> for ResourceStore {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut store = Self::new();
        for r in iter {
            store.insert(r);
        }
        store
    }
}

/// The expensive, pure render step.
pub trait Rasterize {
    fn rasterize(&self, resource: &Resource, size: u32, color: Color) -> String;
}

impl<F> Rasterize for F
where
    F: Fn(&Resource, u32, Color) -> String,
{
    fn rasterize(&self, resource: &Resource, size: u32, color: Color) -> String {
        self(resource, size, color)
    }
}

/// Default renderer: a standalone SVG document scaled to `size` pixels,
/// with `currentColor` resolved to `color`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRasterizer;

impl Rasterize for SvgRasterizer {
    fn rasterize(&self, resource: &Resource, size: u32, color: Color) -> String {
        let body = resource.svg_body.replace("currentColor", &color.to_hex());
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {vb} {vb}">{body}</svg>"#,
            vb = resource.view_box,
        )
    }
}

/// Cache key: resource identity, requested size, requested color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub resource_id: String,
    pub size: u32,
    pub color: Color,
}

/// Derive the cache key for a request. Pure.
pub fn cache_key(resource_id: &str, size: u32, color: Color) -> CacheKey {
    CacheKey {
        resource_id: resource_id.to_string(),
        size,
        color,
    }
}

/// Write-once cache of rendered resources.
///
/// Interior mutability lets the render path call [`prepare_cached`]
/// through a shared reference. The cache is not `Sync`: it lives on the
/// editing thread.
///
/// [`prepare_cached`]: GeometryCache::prepare_cached
#[derive(Debug)]
pub struct GeometryCache<R = SvgRasterizer> {
    rasterizer: R,
    entries: RefCell<HashMap<CacheKey, Rc<str>>>,
    hits: Cell<u64>,
}

impl Default for GeometryCache<SvgRasterizer> {
    fn default() -> Self {
        Self::new(SvgRasterizer)
    }
}

impl<R: Rasterize> GeometryCache<R> {
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            entries: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
        }
    }

    /// Rendered form of `resource` at `size` px in `color`.
    /// Renders at most once per distinct key.
    pub fn prepare_cached(&self, resource: &Resource, size: u32, color: Color) -> Rc<str> {
        let key = cache_key(&resource.id, size, color);
        if let Some(hit) = self.entries.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return Rc::clone(hit);
        }

        log::trace!("render {} @{}px {}", resource.id, size, color);
        let rendered: Rc<str> = self.rasterizer.rasterize(resource, size, color).into();
        self.entries.borrow_mut().insert(key, Rc::clone(&rendered));
        rendered
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of requests served without rendering.
    pub fn hits(&self) -> u64 {
        self.hits.get()
    }
}
