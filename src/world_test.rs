use super::*;

#[test]
fn chunk_derivation_uses_floor_division() {
    assert_eq!(WorldPosition::new(0, 64, 0).chunk(), ChunkKey { x: 0, z: 0 });
    assert_eq!(WorldPosition::new(15, 64, 15).chunk(), ChunkKey { x: 0, z: 0 });
    assert_eq!(WorldPosition::new(16, 64, 0).chunk(), ChunkKey { x: 1, z: 0 });
    assert_eq!(WorldPosition::new(-1, 64, -16).chunk(), ChunkKey { x: -1, z: -1 });
    assert_eq!(WorldPosition::new(-17, 64, 31).chunk(), ChunkKey { x: -2, z: 1 });
}

#[test]
fn chunk_ignores_vertical_coordinate() {
    assert_eq!(
        WorldPosition::new(5, 0, 5).chunk(),
        WorldPosition::new(5, 255, 5).chunk()
    );
}

#[test]
fn region_normalizes_corner_order() {
    let a = WorldRegion::new(WorldPosition::new(5, 70, 2), WorldPosition::new(0, 64, 8));
    let b = WorldRegion::new(WorldPosition::new(0, 64, 8), WorldPosition::new(5, 70, 2));
    assert!(a.contains(WorldPosition::new(3, 66, 4)));
    assert!(b.contains(WorldPosition::new(3, 66, 4)));
    assert!(!a.contains(WorldPosition::new(6, 66, 4)));
}

#[test]
fn region_positions_cover_the_box_in_order() {
    let region = WorldRegion::new(WorldPosition::new(0, 0, 0), WorldPosition::new(1, 1, 1));
    let all: Vec<WorldPosition> = region.positions().collect();
    assert_eq!(all.len(), 8);
    assert_eq!(all[0], WorldPosition::new(0, 0, 0));
    assert_eq!(all[7], WorldPosition::new(1, 1, 1));
    // Deterministic x → y → z nesting.
    assert_eq!(all[1], WorldPosition::new(0, 0, 1));
    assert_eq!(all[2], WorldPosition::new(0, 1, 0));
}

#[test]
fn grid_marker_source_reports_placed_markers() {
    let mut source = GridMarkerSource::new();
    assert!(source.is_empty());
    let pos = WorldPosition::new(2, 70, 3);
    source.place(pos, PaletteColor::Red);

    assert_eq!(source.marker_at(pos), Some(PaletteColor::Red));
    assert_eq!(source.marker_at(WorldPosition::new(2, 70, 4)), None);
    assert_eq!(source.len(), 1);
}
