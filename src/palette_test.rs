use super::*;
use crate::world::GridMarkerSource;

fn pos(x: i32, y: i32, z: i32) -> WorldPosition {
    WorldPosition::new(x, y, z)
}

#[test]
fn buckets_markers_by_color() {
    let mut source = GridMarkerSource::new();
    source.place(pos(0, 70, 0), PaletteColor::Red);
    source.place(pos(1, 70, 0), PaletteColor::Red);
    source.place(pos(2, 70, 0), PaletteColor::Red);
    source.place(pos(0, 69, 0), PaletteColor::Blue);
    source.place(pos(1, 69, 0), PaletteColor::Blue);

    let region = WorldRegion::new(pos(0, 69, 0), pos(2, 70, 0));
    let areas = create_areas(&region, &source);

    assert_eq!(areas.len(), 2, "one area per distinct color");
    let red = areas.iter().find(|a| a.color() == PaletteColor::Red).unwrap();
    let blue = areas.iter().find(|a| a.color() == PaletteColor::Blue).unwrap();
    assert_eq!(red.len(), 3);
    assert_eq!(blue.len(), 2);

    assert!(red.is_within(pos(1, 70, 0)));
    assert!(!red.is_within(pos(1, 69, 0)));
    assert!(blue.is_within(pos(1, 69, 0)));
}

#[test]
fn unmarked_positions_are_skipped_silently() {
    let mut source = GridMarkerSource::new();
    source.place(pos(5, 70, 5), PaletteColor::Lime);

    let region = WorldRegion::new(pos(0, 70, 0), pos(9, 70, 9));
    let areas = create_areas(&region, &source);

    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].len(), 1);
}

#[test]
fn markers_outside_the_region_are_invisible() {
    let mut source = GridMarkerSource::new();
    source.place(pos(50, 70, 50), PaletteColor::Red);

    let region = WorldRegion::new(pos(0, 70, 0), pos(9, 70, 9));
    assert!(create_areas(&region, &source).is_empty());
}

#[test]
fn areas_preserve_first_seen_order() {
    let mut source = GridMarkerSource::new();
    // Scan order is x → y → z, so (0,.) comes before (1,.).
    source.place(pos(0, 70, 0), PaletteColor::Cyan);
    source.place(pos(1, 70, 0), PaletteColor::Orange);

    let region = WorldRegion::new(pos(0, 70, 0), pos(1, 70, 0));
    let areas = create_areas(&region, &source);
    assert_eq!(areas[0].color(), PaletteColor::Cyan);
    assert_eq!(areas[1].color(), PaletteColor::Orange);
}

#[test]
fn color_at_resolves_swatch_hits() {
    let mut source = GridMarkerSource::new();
    source.place(pos(0, 70, 0), PaletteColor::Purple);
    let region = WorldRegion::new(pos(0, 70, 0), pos(0, 70, 0));
    let areas = create_areas(&region, &source);

    assert_eq!(color_at(&areas, pos(0, 70, 0)), Some(PaletteColor::Purple));
    assert_eq!(color_at(&areas, pos(0, 71, 0)), None);
}
