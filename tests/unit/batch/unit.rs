use super::*;

fn flame() -> Flame {
    let mut f = Flame::new(400, 400, 50.0);
    f.cam_zoom = 1.5;
    f.centre_x = 0.3;
    f.centre_y = -0.2;
    f
}

const LOGICAL: Canvas = Canvas {
    width: 800,
    height: 800,
};

#[test]
fn tile_coords_stay_inside_grid() {
    assert!(TileCoord::new(7, 7).is_some());
    assert!(TileCoord::new(8, 0).is_none());
    assert!(TileCoord::new(0, 8).is_none());

    let all: Vec<_> = TileCoord::all().collect();
    assert_eq!(all.len(), 64);
    let unique: std::collections::BTreeSet<_> = all.iter().copied().collect();
    assert_eq!(unique.len(), 64);
    assert_eq!(all[0], TileCoord::new(0, 0).unwrap());
    assert_eq!(all[1], TileCoord::new(0, 1).unwrap());
    assert_eq!(all[63], TileCoord::new(7, 7).unwrap());
}

#[test]
fn grid_pair_encodes_unit_kind() {
    let mut unit = RenderUnit::whole("a.json".into(), 800, 800, 10);
    assert_eq!(unit.grid(), None);
    unit.kind = UnitKind::Tile(TileCoord::new(2, 5).unwrap());
    assert_eq!(unit.grid(), Some((2, 5)));
    assert_eq!(unit.label(), "a.json[2:5]");
    unit.kind = UnitKind::Reassemble;
    assert_eq!(unit.grid(), Some((8, 8)));
}

#[test]
fn corner_tiles_sit_on_opposite_sides_of_centre() {
    let f = flame();
    let g00 = TileGeometry::compute(&f, LOGICAL, TileCoord::new(0, 0).unwrap());
    assert!(g00.centre_x < f.centre_x);
    assert!(g00.centre_y < f.centre_y);

    let g77 = TileGeometry::compute(&f, LOGICAL, TileCoord::new(7, 7).unwrap());
    assert!(g77.centre_x > f.centre_x);
    assert!(g77.centre_y > f.centre_y);

    let nearest = [3u8, 4]
        .iter()
        .flat_map(|&ix| [3u8, 4].map(|iy| (ix, iy)))
        .map(|(ix, iy)| {
            let g = TileGeometry::compute(&f, LOGICAL, TileCoord::new(ix, iy).unwrap());
            (g.centre_x - f.centre_x).abs() + (g.centre_y - f.centre_y).abs()
        })
        .fold(f64::INFINITY, f64::min);
    for t in TileCoord::all() {
        let g = TileGeometry::compute(&f, LOGICAL, t);
        let d = (g.centre_x - f.centre_x).abs() + (g.centre_y - f.centre_y).abs();
        assert!(d >= nearest - 1e-12);
    }
    // Symmetric about the centre.
    assert!(((g00.centre_x + g77.centre_x) * 0.5 - f.centre_x).abs() < 1e-12);
}

#[test]
fn geometry_sizes_and_zoom() {
    let f = flame();
    let g = TileGeometry::compute(&f, LOGICAL, TileCoord::new(1, 6).unwrap());
    assert_eq!((g.width, g.height), (100, 100));
    assert_eq!(g.zoom_scale, 8.0);

    let mut tile_flame = f.clone();
    g.apply(&mut tile_flame);
    assert_eq!(tile_flame.cam_zoom, 12.0);
    assert_eq!((tile_flame.centre_x, tile_flame.centre_y), (g.centre_x, g.centre_y));
    // The source flame is untouched.
    assert_eq!(f.cam_zoom, 1.5);
}

#[test]
fn tiles_tile_the_logical_image_pixel_for_pixel() {
    let f = flame();
    let mut logical = f.clone();
    logical.fit_to(LOGICAL);

    let project = |fl: &Flame, x: f64, y: f64| {
        let s = fl.pixel_scale();
        (
            (x - fl.centre_x) * s + f64::from(fl.width) * 0.5,
            (y - fl.centre_y) * s + f64::from(fl.height) * 0.5,
        )
    };

    for (x, y) in [(0.0, 0.0), (-2.1, 1.3), (1.9, -1.7), (0.77, 0.01)] {
        let (px, py) = project(&logical, x, y);
        let tile = TileCoord::new((px / 100.0) as u8, (py / 100.0) as u8).unwrap();
        let g = TileGeometry::compute(&f, LOGICAL, tile);
        let mut tf = f.clone();
        g.apply(&mut tf);
        tf.fit_to(Canvas {
            width: g.width,
            height: g.height,
        });
        let (tx, ty) = project(&tf, x, y);
        let (ox, oy) = TileGeometry::pixel_origin(tile, LOGICAL);
        assert!((tx + f64::from(ox) - px).abs() < 1e-9, "x for {tile}");
        assert!((ty + f64::from(oy) - py).abs() < 1e-9, "y for {tile}");
    }
}
