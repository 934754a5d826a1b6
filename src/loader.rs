//! GeoJSON loading into fences.

use geo::{Coord, LineString, Polygon};
use geojson::{feature::Id, GeoJson, Geometry, Value};
use serde_json::Map;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::fence::{Fence, Strategy};
use crate::models::{Feature, Shape};
use crate::registry::FenceRegistry;

/// Parse a FeatureCollection, a single Feature, or a bare Geometry.
///
/// Every polygon becomes one shape (holes included); points and lines carry
/// no area and contribute no shapes.
pub fn features_from_geojson(text: &str) -> Result<Vec<Feature>> {
    let geojson: GeoJson = text.parse()?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .map(convert_feature)
            .collect(),
        GeoJson::Feature(feature) => vec![convert_feature(feature)],
        GeoJson::Geometry(geometry) => {
            let mut shapes = Vec::new();
            collect_shapes(&geometry, &mut shapes);
            vec![Feature::new(shapes)]
        }
    };

    Ok(features)
}

fn convert_feature(feature: geojson::Feature) -> Feature {
    let mut shapes = Vec::new();
    if let Some(geometry) = &feature.geometry {
        collect_shapes(geometry, &mut shapes);
    }

    let id = feature.id.map(|id| match id {
        Id::String(s) => s,
        Id::Number(n) => n.to_string(),
    });

    if shapes.is_empty() {
        debug!("Feature {:?} has no polygonal geometry", id);
    }

    Feature {
        id,
        shapes,
        properties: feature.properties.unwrap_or_else(Map::new),
    }
}

fn collect_shapes(geometry: &Geometry, shapes: &mut Vec<Shape>) {
    match &geometry.value {
        Value::Polygon(rings) => shapes.extend(polygon_from_rings(rings)),
        Value::MultiPolygon(polygons) => {
            shapes.extend(polygons.iter().filter_map(|rings| polygon_from_rings(rings)))
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_shapes(g, shapes);
            }
        }
        _ => {}
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Option<Shape> {
    let mut rings = rings.iter().map(|ring| {
        let coords: Vec<Coord<f64>> = ring
            .iter()
            .filter(|position| position.len() >= 2)
            .map(|position| Coord {
                x: position[0],
                y: position[1],
            })
            .collect();
        LineString::from(coords)
    });

    let exterior = rings.next()?;
    Some(Shape::new(Polygon::new(exterior, rings.collect())))
}

/// Build a fence of the given strategy from GeoJSON text
pub fn load_fence(strategy: Strategy, resolution: u8, text: &str) -> Result<Fence> {
    let features = features_from_geojson(text)?;
    info!(
        "Loaded {} features, building {} fence",
        features.len(),
        strategy
    );

    let mut fence = Fence::new(strategy, resolution);
    fence.extend(features.into_iter().map(Arc::new));
    Ok(fence)
}

/// Build a fence from a GeoJSON file on disk
pub fn load_fence_file<P: AsRef<Path>>(strategy: Strategy, resolution: u8, path: P) -> Result<Fence> {
    let path = path.as_ref();
    info!("Reading {}", path.display());
    let text = std::fs::read_to_string(path)?;
    load_fence(strategy, resolution, &text)
}

/// Build a registry holding a single fence under `name`
pub fn load_fence_index(
    strategy: Strategy,
    resolution: u8,
    name: &str,
    text: &str,
) -> Result<FenceRegistry> {
    let registry = FenceRegistry::new();
    registry.set(name, load_fence(strategy, resolution, text)?);
    Ok(registry)
}
