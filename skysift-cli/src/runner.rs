//! Demo session runner.
//!
//! Builds the request tree from CLI options and runs it against a small
//! built-in catalog with the in-process engine: filter, mask, composite,
//! clip, and optionally build and submit an export. With `--emit-request`
//! the serialized tree is printed instead of being evaluated, which is
//! what a remote engine would receive.

use chrono::{TimeZone, Utc};
use skysift::collection::{Feature, ImageMeta, Scene};
use skysift::composite::CompositePolicy;
use skysift::display::{MapContext, VisParams};
use skysift::engine::{Engine, LocalEngine, MemoryCatalog};
use skysift::export::ExportRequest;
use skysift::expr::{CollectionExpr, FeatureQuery, ImageExpr};
use skysift::filter::Filter;
use skysift::geometry::{Geometry, Point, Polygon};
use skysift::raster::{GeoTransform, RasterImage, S2_QA_BAND};
use tracing::info;

use crate::error::CliError;

/// Collection id served by the demo catalog.
pub const DEMO_COLLECTION: &str = "COPERNICUS/S2";

/// Feature collection id served by the demo catalog.
pub const DEMO_FEATURES: &str = "users/demo/urban_areas";

/// What one session run should do.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub collection: String,
    pub start: String,
    pub end: String,
    pub max_cloud: f64,
    pub lon: f64,
    pub lat: f64,
    pub policy: CompositePolicy,
    pub skip_mask: bool,
    pub select: Option<String>,
    pub emit_request: bool,
    pub export: Option<ExportOptions>,
}

/// Export parameters, filled from flags and config defaults.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub folder: String,
    pub description: String,
    pub scale: f64,
    pub max_pixels: u64,
}

/// Runs one session. Returns the export handle id when an export was
/// submitted.
pub fn run(options: &SessionOptions) -> Result<Option<String>, CliError> {
    let engine = LocalEngine::new(demo_catalog());

    let filtered = CollectionExpr::load(&options.collection)
        .filter(Filter::lt("CLOUDY_PIXEL_PERCENTAGE", options.max_cloud))
        .filter(Filter::date_range(&options.start, &options.end)?)
        .filter(Filter::bounds(Geometry::point(options.lon, options.lat)));

    let masked = if options.skip_mask {
        filtered.clone()
    } else {
        filtered.clone().mask_s2_clouds()
    };

    let region = engine.resolve_geometry(&FeatureQuery::load(DEMO_FEATURES))?;
    let mut image = masked.composite(options.policy).clip(region.clone());
    if let Some(pattern) = &options.select {
        image = image.select(pattern.clone());
    }

    if options.emit_request {
        emit_request(&image, options, region)?;
        return Ok(None);
    }

    let size = engine.collection_size(&filtered)?;
    println!("Scenes matching filters: {}", size);
    info!(collection = %options.collection, size, "filtered collection");

    let composite = engine.evaluate(&image)?;
    println!(
        "Composite: {}x{} pixels, {} bands",
        composite.width(),
        composite.height(),
        composite.bands().len()
    );
    for (name, valid, min, max) in band_stats(&composite) {
        match (min, max) {
            (Some(lo), Some(hi)) => {
                println!("  {:<8} {:>3} valid px  range [{:.4}, {:.4}]", name, valid, lo, hi)
            }
            _ => println!("  {:<8} {:>3} valid px", name, valid),
        }
    }

    let mut map = MapContext::new();
    map.set_center(Point::new(options.lon, options.lat), 12);
    map.add_collection_layer(
        "Filtered Collection",
        filtered,
        VisParams::rgb("B4", "B3", "B2", 0.0, 3000.0),
    );
    map.add_image_layer("Composite", image.clone(), VisParams::rgb("B4", "B3", "B2", 0.0, 0.3));
    map.add_feature_layer("Urban Areas", FeatureQuery::load(DEMO_FEATURES), VisParams::colored("blue"));
    println!("Map layers: {}", map.layer_names().join(", "));

    if let Some(export) = &options.export {
        let spec = ExportRequest::new(image, export.description.clone())
            .to_drive(export.folder.clone())
            .region(region)
            .scale(export.scale)
            .max_pixels(export.max_pixels)
            .build()?;
        let handle = engine.submit_export(&spec)?;
        println!("Export submitted: {} ({})", handle.id, handle.description);
        return Ok(Some(handle.id));
    }

    Ok(None)
}

fn emit_request(
    image: &ImageExpr,
    options: &SessionOptions,
    region: Geometry,
) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(image)?);
    if let Some(export) = &options.export {
        let spec = ExportRequest::new(image.clone(), export.description.clone())
            .to_drive(export.folder.clone())
            .region(region)
            .scale(export.scale)
            .max_pixels(export.max_pixels)
            .build()?;
        println!("{}", serde_json::to_string_pretty(&spec)?);
    }
    Ok(())
}

/// Per-band valid-pixel count and value range.
fn band_stats(image: &RasterImage) -> Vec<(String, usize, Option<f64>, Option<f64>)> {
    image
        .bands()
        .iter()
        .map(|band| {
            let valid: Vec<f64> = band.pixels().iter().flatten().copied().collect();
            let min = valid.iter().copied().fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.min(v)))
            });
            let max = valid.iter().copied().fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.max(v)))
            });
            (band.name().to_string(), valid.len(), min, max)
        })
        .collect()
}

/// Synthetic Sentinel-2-like catalog: six scenes over 2019 around
/// (-117.18, 46.73) with varying cloudiness, plus one urban boundary.
pub fn demo_catalog() -> MemoryCatalog {
    const WIDTH: usize = 4;
    const HEIGHT: usize = 4;
    const CLOUD: u64 = 1 << 10;
    const CIRRUS: u64 = 1 << 11;

    let transform = GeoTransform::new(-118.0, 47.0, 0.5, 0.5);
    let footprint = Geometry::Polygon(Polygon::rect(-118.0, 45.0, -116.0, 47.0));
    let months_and_clouds = [(1u32, 5.0), (3, 35.0), (5, 10.0), (7, 60.0), (9, 20.0), (11, 15.0)];

    let mut catalog = MemoryCatalog::new();
    for (index, (month, cloud_pct)) in months_and_clouds.iter().enumerate() {
        let mut b4 = Vec::with_capacity(WIDTH * HEIGHT);
        let mut b3 = Vec::with_capacity(WIDTH * HEIGHT);
        let mut b2 = Vec::with_capacity(WIDTH * HEIGHT);
        let mut qa = Vec::with_capacity(WIDTH * HEIGHT);
        for pixel in 0..(WIDTH * HEIGHT) {
            let base = 800.0 + *month as f64 * 120.0 + pixel as f64 * 15.0;
            b4.push(Some(base));
            b3.push(Some(base * 0.9));
            b2.push(Some(base * 0.8));
            // Deterministic cloud pattern: denser for cloudier scenes.
            let flags = match (pixel + index) % 7 {
                0 if *cloud_pct > 30.0 => CLOUD,
                1 if *cloud_pct > 50.0 => CIRRUS,
                _ => 0,
            };
            qa.push(Some(flags as f64));
        }

        let meta = ImageMeta::new(
            format!("S2A_2019{:02}", month),
            Utc.with_ymd_and_hms(2019, *month, 10, 10, 30, 0).unwrap(),
            footprint.clone(),
        )
        .with_property("CLOUDY_PIXEL_PERCENTAGE", *cloud_pct);

        let image = RasterImage::with_transform(WIDTH, HEIGHT, transform)
            .with_band("B4", b4)
            .expect("demo band dimensions match")
            .with_band("B3", b3)
            .expect("demo band dimensions match")
            .with_band("B2", b2)
            .expect("demo band dimensions match")
            .with_band(S2_QA_BAND, qa)
            .expect("demo band dimensions match");

        catalog.add_scene(DEMO_COLLECTION, Scene::new(meta, image));
    }

    catalog.add_feature(
        DEMO_FEATURES,
        Feature::new(
            "00000000000000002bf8",
            Geometry::Polygon(Polygon::rect(-118.0, 45.5, -117.0, 47.0)),
        )
        .with_property("system:index", "00000000000000002bf8"),
    );

    catalog
}
