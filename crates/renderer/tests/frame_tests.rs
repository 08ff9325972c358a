//! Tests for frame composition against a recording surface.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use forecast_common::{
    build_catalog, BoundingBox, ForecastCatalog, GridDataSource, GridError, GridResult,
    GridSample, LevelSelector,
};
use renderer::surface::FeatureLayer;
use renderer::{
    BasemapRenderer, Color, ColorBandTable, ColoredMesh, DrawingSurface, FrameRenderer,
    GridlineStyle, MapConfig, Projection, RenderError, RenderState,
};

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Clear,
    SetExtent(BoundingBox),
    Basemap(usize),
    Mesh(ColoredMesh),
    CreateColorBar(String),
    RefreshColorBar,
    Gridlines,
    Title(String),
    Present,
}

#[derive(Default)]
struct RecordingSurface {
    calls: Vec<Call>,
}

impl RecordingSurface {
    fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    fn meshes(&self) -> Vec<&ColoredMesh> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Mesh(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn titles(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Title(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TestColorBar {
    label: String,
    refreshes: u32,
}

impl DrawingSurface for RecordingSurface {
    type ColorBar = TestColorBar;

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn set_extent(&mut self, extent: &BoundingBox, _projection: Projection) {
        self.calls.push(Call::SetExtent(*extent));
    }

    fn draw_mesh(&mut self, mesh: &ColoredMesh) {
        self.calls.push(Call::Mesh(mesh.clone()));
    }

    fn create_colorbar(&mut self, _table: &ColorBandTable, label: &str) -> TestColorBar {
        self.calls.push(Call::CreateColorBar(label.to_string()));
        TestColorBar {
            label: label.to_string(),
            refreshes: 0,
        }
    }

    fn refresh_colorbar(&mut self, colorbar: &mut TestColorBar, _table: &ColorBandTable) {
        colorbar.refreshes += 1;
        self.calls.push(Call::RefreshColorBar);
    }

    fn draw_gridlines(&mut self, _style: &GridlineStyle) {
        self.calls.push(Call::Gridlines);
    }

    fn set_title(&mut self, title: &str) {
        self.calls.push(Call::Title(title.to_string()));
    }

    fn present(&mut self) {
        self.calls.push(Call::Present);
    }
}

struct RecordingBasemap;

impl BasemapRenderer<RecordingSurface> for RecordingBasemap {
    fn draw(
        &self,
        surface: &mut RecordingSurface,
        _extent: &BoundingBox,
        _projection: Projection,
        layers: &[FeatureLayer],
    ) {
        surface.calls.push(Call::Basemap(layers.len()));
    }
}

/// Returns a fixed 2x2 Kelvin grid, failing for paths containing "broken".
#[derive(Default)]
struct FakeSource {
    requests: Mutex<Vec<(PathBuf, LevelSelector)>>,
}

impl GridDataSource for FakeSource {
    fn load(&self, path: &Path, level: &LevelSelector) -> GridResult<GridSample> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_path_buf(), level.clone()));
        if path.to_string_lossy().contains("broken") {
            return Err(GridError::Decode {
                path: path.to_path_buf(),
                message: "truncated".to_string(),
            });
        }
        GridSample::new(
            vec![233.15, 273.15, 288.15, f32::NAN],
            vec![0.0, 10.0],
            vec![50.0, 40.0],
        )
    }
}

fn three_frame_catalog() -> ForecastCatalog {
    build_catalog([
        "/data/gfs_20240101_f000.grib2",
        "/data/gfs_20240101_f006.grib2",
        "/data/gfs_20240101_f012.grib2",
    ])
    .unwrap()
}

fn renderer() -> FrameRenderer<FakeSource, RecordingBasemap> {
    FrameRenderer::new(FakeSource::default(), RecordingBasemap, MapConfig::default())
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_render_composes_layers_in_order() {
    let catalog = three_frame_catalog();
    let table = ColorBandTable::temperature();
    let renderer = renderer();
    let mut state = RenderState::new(RecordingSurface::default());

    renderer.render(0, &catalog, &table, &mut state).unwrap();

    let kinds: Vec<&'static str> = state
        .surface()
        .calls
        .iter()
        .map(|c| match c {
            Call::Clear => "clear",
            Call::SetExtent(_) => "extent",
            Call::Basemap(_) => "basemap",
            Call::Mesh(_) => "mesh",
            Call::CreateColorBar(_) => "create_colorbar",
            Call::RefreshColorBar => "refresh_colorbar",
            Call::Gridlines => "gridlines",
            Call::Title(_) => "title",
            Call::Present => "present",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "clear",
            "extent",
            "basemap",
            "mesh",
            "create_colorbar",
            "gridlines",
            "title",
            "present"
        ]
    );
    assert_eq!(
        state.surface().calls[1],
        Call::SetExtent(BoundingBox::new(-20.0, 25.0, 50.0, 60.0))
    );
    assert_eq!(state.surface().calls[2], Call::Basemap(6));
}

#[test]
fn test_mesh_colors_come_from_celsius_values() {
    let catalog = three_frame_catalog();
    let table = ColorBandTable::temperature();
    let renderer = renderer();
    let mut state = RenderState::new(RecordingSurface::default());

    let rendered = renderer.render(0, &catalog, &table, &mut state).unwrap();

    let meshes = state.surface().meshes();
    let mesh = meshes[0];
    assert_eq!(mesh.cell(0, 0), Some(Color::new(255, 0, 203)));
    assert_eq!(mesh.cell(1, 0), Some(Color::new(69, 117, 255)));
    assert_eq!(mesh.cell(0, 1), Some(Color::new(165, 0, 38)));
    assert_eq!(mesh.cell(1, 1), None);

    assert_eq!(rendered.missing_values, 1);
    let min = rendered.min_celsius.unwrap();
    let max = rendered.max_celsius.unwrap();
    assert!((min + 40.0).abs() < 1e-3);
    assert!((max - 15.0).abs() < 1e-3);
}

#[test]
fn test_colorbar_created_once_then_refreshed() {
    let catalog = three_frame_catalog();
    let table = ColorBandTable::temperature();
    let renderer = renderer();
    let mut state = RenderState::new(RecordingSurface::default());

    renderer.render(0, &catalog, &table, &mut state).unwrap();
    renderer.render(1, &catalog, &table, &mut state).unwrap();
    renderer.render(2, &catalog, &table, &mut state).unwrap();

    let surface = state.surface();
    assert_eq!(surface.count(&Call::CreateColorBar("°C".to_string())), 1);
    assert_eq!(surface.count(&Call::RefreshColorBar), 2);
    assert_eq!(surface.count(&Call::Clear), 3);
    assert_eq!(state.colorbar().unwrap().refreshes, 2);
    assert_eq!(state.colorbar().unwrap().label, "°C");
}

#[test]
fn test_rendering_same_index_twice_is_identical() {
    let catalog = three_frame_catalog();
    let table = ColorBandTable::temperature();
    let renderer = renderer();
    let mut state = RenderState::new(RecordingSurface::default());

    let first = renderer.render(1, &catalog, &table, &mut state).unwrap();
    let second = renderer.render(1, &catalog, &table, &mut state).unwrap();
    assert_eq!(first, second);

    let meshes = state.surface().meshes();
    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[0], meshes[1]);
    let titles = state.surface().titles();
    assert_eq!(titles[0], titles[1]);
}

// ============================================================================
// Frame selection
// ============================================================================

#[test]
fn test_middle_frame_is_six_hours_in() {
    let catalog = three_frame_catalog();
    let table = ColorBandTable::temperature();
    let renderer = renderer();
    let mut state = RenderState::new(RecordingSurface::default());

    let rendered = renderer.render(1, &catalog, &table, &mut state).unwrap();

    assert_eq!(rendered.index, 1);
    assert_eq!(rendered.file_name, "gfs_20240101_f006.grib2");
    assert_eq!(
        rendered.title,
        "850 hPa Temperature (°C)\nForecast: 2024-01-01 06:00 UTC"
    );
    assert_eq!(state.surface().titles(), vec![rendered.title.as_str()]);

    let requests = renderer.source().requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, PathBuf::from("/data/gfs_20240101_f006.grib2"));
    assert_eq!(requests[0].1, LevelSelector::isobaric_hpa(850));
}

#[test]
fn test_index_out_of_range() {
    let catalog = three_frame_catalog();
    let table = ColorBandTable::temperature();
    let renderer = renderer();
    let mut state = RenderState::new(RecordingSurface::default());

    let err = renderer.render(3, &catalog, &table, &mut state).unwrap_err();
    assert!(matches!(err, RenderError::IndexOutOfRange { index: 3, len: 3 }));
    assert!(state.surface().calls.is_empty());
    assert!(renderer.source().requests.lock().unwrap().is_empty());
}

// ============================================================================
// Load failures
// ============================================================================

#[test]
fn test_load_failure_keeps_previous_frame() {
    let catalog = build_catalog([
        "/data/gfs_20240601_f000.grib2",
        "/data/broken_20240601_f006.grib2",
    ])
    .unwrap();
    let table = ColorBandTable::temperature();
    let renderer = renderer();
    let mut state = RenderState::new(RecordingSurface::default());

    let good = renderer.render(0, &catalog, &table, &mut state).unwrap();
    let calls_before = state.surface().calls.len();

    let err = renderer.render(1, &catalog, &table, &mut state).unwrap_err();
    assert!(err.is_frame_load());
    match err {
        RenderError::FrameLoad { path, .. } => {
            assert_eq!(path, PathBuf::from("/data/broken_20240601_f006.grib2"))
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(state.surface().calls.len(), calls_before);
    assert_eq!(state.current_frame(), Some(&good));

    // The surface is still usable afterwards.
    renderer.render(0, &catalog, &table, &mut state).unwrap();
    assert_eq!(state.surface().count(&Call::Present), 2);
}
