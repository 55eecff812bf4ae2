use std::sync::Arc;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::picking::events::{Click, Out, Over, Pointer};
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use bevy::sprite_render::AlphaMode2d;
use bevy::window::{PrimaryWindow, WindowResized};

use super::HexGridConfig;
use super::entities::{
    ActiveGrid, GridRoot, GridTweens, HexTile, TeardownGrid, TileCoord, WidgetSurface,
};
use crate::hex_grid::HexGrid;
use crate::math;
use crate::surface::RenderSurface;
use crate::tile::TileEvent;
use crate::tween::TweenEngine;

// ── Startup ────────────────────────────────────────────────────────

/// Applies the configured outline width to the default gizmo group.
pub fn configure_outlines(mut store: ResMut<GizmoConfigStore>, cfg: Res<HexGridConfig>) {
    let (config, _) = store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = cfg.style.stroke_width;
}

/// Spawns the camera and grid root, and builds the grid on a fresh [`WidgetSurface`].
pub fn setup_grid(
    mut commands: Commands,
    cfg: Res<HexGridConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    commands.spawn((Camera2d, Name::new("HexGridCamera")));

    let size = match cfg.surface_size {
        Some(size) => size,
        None => {
            let Ok(window) = windows.single() else {
                warn!("no primary window and no fixed surface size; hex grid not created");
                return;
            };
            window.size()
        }
    };

    let engine = Arc::new(TweenEngine::new(cfg.easing));
    let grid = match HexGrid::new(&cfg, WidgetSurface::new(size), engine.clone()) {
        Ok(grid) => grid,
        Err(err) => {
            error!("cannot build hex grid: {err}");
            return;
        }
    };

    commands.spawn((
        GridRoot,
        Name::new("HexGrid"),
        Transform::from_translation(math::surface_origin(size).extend(0.0)),
        Visibility::default(),
    ));
    commands.insert_resource(GridTweens(engine));
    commands.insert_resource(ActiveGrid(grid));
}

// ── Update: animation and drawing ──────────────────────────────────

/// Steps every running fade by the frame time.
pub fn advance_tweens(time: Res<Time>, tweens: Option<Res<GridTweens>>) {
    let Some(tweens) = tweens else { return };
    tweens.advance(time.delta_secs());
}

/// Spawns a mesh entity for every shape the surface has queued.
pub fn spawn_tile_shapes(
    mut commands: Commands,
    grid: Option<ResMut<ActiveGrid>>,
    root_q: Query<Entity, With<GridRoot>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let Some(mut grid) = grid else { return };
    let Ok(root) = root_q.single() else { return };
    let shapes = grid.surface_mut().take_pending();
    let Some(first) = shapes.first() else { return };

    // Every tile of one grid shares a size, so one mesh serves the batch.
    let mesh = meshes.add(build_hexagon_mesh(first.points()));
    let count = shapes.len();

    commands.entity(root).with_children(|parent| {
        for shape in shapes {
            let tile = shape.tile().clone();
            let coord = tile.coord();
            let fill = shape.style().fill;
            let material = materials.add(ColorMaterial {
                color: fill.with_alpha(fill.alpha() * shape.opacity()),
                alpha_mode: AlphaMode2d::Blend,
                ..default()
            });
            let position = math::surface_to_world(shape.position());

            let (over, out, click) = (tile.clone(), tile.clone(), tile);
            parent
                .spawn((
                    HexTile { shape },
                    TileCoord(coord),
                    Name::new(format!("Tile{coord}")),
                    Mesh2d(mesh.clone()),
                    MeshMaterial2d(material),
                    Transform::from_translation(position.extend(0.0)),
                ))
                .observe(move |_: On<Pointer<Over>>| over.emit(TileEvent::PointerOver))
                .observe(move |_: On<Pointer<Out>>| out.emit(TileEvent::PointerOut))
                .observe(move |_: On<Pointer<Click>>| click.emit(TileEvent::Click));
        }
    });
    debug!("spawned {count} tile meshes");
}

/// Copies each tile's opacity into its material.
pub fn sync_tile_opacity(
    tiles: Query<(&HexTile, &MeshMaterial2d<ColorMaterial>)>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (hex, handle) in &tiles {
        let alpha = hex.shape.style().fill.alpha() * hex.shape.opacity();
        let current = materials.get(&handle.0).map(|mat| mat.color.alpha());
        if current.is_none_or(|a| a == alpha) {
            continue;
        }
        if let Some(mat) = materials.get_mut(&handle.0) {
            mat.color.set_alpha(alpha);
        }
    }
}

/// Strokes the outline of every visible tile with the same opacity as its fill.
pub fn draw_tile_outlines(mut gizmos: Gizmos, tiles: Query<(&HexTile, &GlobalTransform)>) {
    for (hex, transform) in &tiles {
        let opacity = hex.shape.opacity();
        if opacity <= 0.0 {
            continue;
        }
        let stroke = hex.shape.style().stroke;
        let color = stroke.with_alpha(stroke.alpha() * opacity);
        let centre = transform.translation().truncate();
        let corners = hex.shape.points().map(|p| centre + math::surface_to_world(p));
        gizmos.linestrip_2d(corners.into_iter().chain([corners[0]]), color);
    }
}

// ── Update: resize and teardown ────────────────────────────────────

/// Feeds window size changes into the grid's resize debounce.
pub fn forward_window_resize(
    mut resized: MessageReader<WindowResized>,
    grid: Option<ResMut<ActiveGrid>>,
    cfg: Res<HexGridConfig>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    if cfg.surface_size.is_some() {
        return;
    }
    let Some(mut grid) = grid else { return };
    grid.request_resize(Vec2::new(last.width, last.height));
}

/// Applies a debounced resize and re-anchors the grid at the surface's top-left corner.
pub fn apply_debounced_resize(
    time: Res<Time>,
    grid: Option<ResMut<ActiveGrid>>,
    mut root_q: Query<&mut Transform, With<GridRoot>>,
) {
    let Some(mut grid) = grid else { return };
    let Some(size) = grid.tick(time.delta_secs()) else {
        return;
    };
    for mut transform in &mut root_q {
        transform.translation = math::surface_origin(size).extend(0.0);
    }
}

/// Tears the widget down when a [`TeardownGrid`] message arrives.
pub fn teardown_on_request(
    mut commands: Commands,
    mut requests: MessageReader<TeardownGrid>,
    roots: Query<Entity, With<GridRoot>>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    commands.queue(|world: &mut World| {
        if let Some(ActiveGrid(grid)) = world.remove_resource::<ActiveGrid>() {
            let surface = grid.teardown();
            debug!("detached {} surface", surface.size());
        }
        world.remove_resource::<GridTweens>();
    });
    for root in &roots {
        commands.entity(root).despawn();
    }
}

// ── Mesh helpers ───────────────────────────────────────────────────

/// Triangle fan over the six corners, in world space around the local origin.
fn build_hexagon_mesh(corners: [Vec2; 6]) -> Mesh {
    let mut positions = vec![[0.0, 0.0, 0.0]];
    positions.extend(corners.map(|c| math::surface_to_world(c).extend(0.0).to_array()));
    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
    let extent = corners
        .iter()
        .map(|c| c.abs().max_element())
        .fold(f32::EPSILON, f32::max);
    let uvs: Vec<[f32; 2]> = positions
        .iter()
        .map(|p| [0.5 + p[0] / (2.0 * extent), 0.5 - p[1] / (2.0 * extent)])
        .collect();

    // Corners run clockwise once y is flipped, so each triangle walks them backwards.
    let mut indices = Vec::with_capacity(18);
    for i in 1..=6u16 {
        let next = i % 6 + 1;
        indices.extend([0, next, i]);
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U16(indices))
}

#[cfg(test)]
mod tests {
    use bevy::mesh::VertexAttributeValues;

    use super::*;

    #[test]
    fn hexagon_mesh_is_a_closed_fan() {
        let mesh = build_hexagon_mesh(math::hexagon_vertices(10.0));
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("positions missing");
        };
        assert_eq!(positions.len(), 7);
        assert_eq!(positions[2], [0.0, 20.0, 0.0]);

        let Some(Indices::U16(indices)) = mesh.indices() else {
            panic!("indices missing");
        };
        assert_eq!(indices.len(), 18);
        assert_eq!(&indices[15..], &[0, 1, 6]);
    }
}
