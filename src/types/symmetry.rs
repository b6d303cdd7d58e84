//! Symmetry kinds and mirror generation.
//!
//! A layer with symmetry stores only its seed instances. Mirrors are
//! generated when the layer is written and dropped again when it is read,
//! so editing a seed moves its mirrors with it.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::instance::{Instance, Vec2};

/// Default pivot for every kind.
const CENTRE: Vec2 = Vec2::new(0.5, 0.5);

/// Instances within this distance of an edge are repeated on the
/// opposite edge by grid symmetry.
const GRID_EDGE_THRESHOLD: f64 = 0.01;

/// Allowed fold counts for rotational symmetry.
pub const ROTATIONAL_COUNT: RangeInclusive<u32> = 2..=12;

/// Allowed column and row counts for grid symmetry.
pub const GRID_COUNT: RangeInclusive<u32> = 1..=8;

fn clamp_count(count: u32, range: &RangeInclusive<u32>) -> u32 {
    count.clamp(*range.start(), *range.end())
}

/// How a layer's seed instances are repeated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Symmetry {
    #[default]
    None,
    /// Reflection across a line through `offset` at `rotation_offset`
    /// degrees; `double` adds the perpendicular line.
    Bisector {
        offset: Vec2,
        rotation_offset: f64,
        double: bool,
    },
    /// `count`-fold rotation around `offset`; `kaleidoscope` also reflects
    /// each wedge.
    Rotational {
        offset: Vec2,
        count: u32,
        kaleidoscope: bool,
        rotation_offset: f64,
    },
    /// Repeat into every cell of a `count_x` by `count_y` grid, or every
    /// other cell when `checkerboard` is set.
    Grid {
        offset: Vec2,
        count_x: u32,
        count_y: u32,
        checkerboard: bool,
    },
}

impl Symmetry {
    pub fn bisector() -> Self {
        Symmetry::Bisector {
            offset: CENTRE,
            rotation_offset: 0.0,
            double: false,
        }
    }

    /// `count`-fold rotation, clamped to [`ROTATIONAL_COUNT`].
    pub fn rotational(count: u32) -> Self {
        Symmetry::Rotational {
            offset: CENTRE,
            count: clamp_count(count, &ROTATIONAL_COUNT),
            kaleidoscope: false,
            rotation_offset: 0.0,
        }
    }

    /// A grid with counts clamped to [`GRID_COUNT`].
    pub fn grid(count_x: u32, count_y: u32) -> Self {
        Symmetry::Grid {
            offset: CENTRE,
            count_x: clamp_count(count_x, &GRID_COUNT),
            count_y: clamp_count(count_y, &GRID_COUNT),
            checkerboard: false,
        }
    }

    /// The same symmetry with its counts brought into range.
    pub fn clamped(self) -> Self {
        match self {
            Symmetry::Rotational {
                offset,
                count,
                kaleidoscope,
                rotation_offset,
            } => Symmetry::Rotational {
                offset,
                count: clamp_count(count, &ROTATIONAL_COUNT),
                kaleidoscope,
                rotation_offset,
            },
            Symmetry::Grid {
                offset,
                count_x,
                count_y,
                checkerboard,
            } => Symmetry::Grid {
                offset,
                count_x: clamp_count(count_x, &GRID_COUNT),
                count_y: clamp_count(count_y, &GRID_COUNT),
                checkerboard,
            },
            other => other,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Symmetry::None)
    }

    /// Kind name as written in definition files.
    pub fn kind(&self) -> &'static str {
        match self {
            Symmetry::None => "none",
            Symmetry::Bisector { .. } => "bisector",
            Symmetry::Rotational { .. } => "rotational",
            Symmetry::Grid { .. } => "grid",
        }
    }

    /// Flat property list as written in definition files.
    pub fn properties(&self) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            Symmetry::None => Vec::new(),
            Symmetry::Bisector {
                offset,
                rotation_offset,
                double,
            } => vec![offset.x, offset.y, *rotation_offset, flag(*double)],
            Symmetry::Rotational {
                offset,
                count,
                kaleidoscope,
                rotation_offset,
            } => vec![
                offset.x,
                offset.y,
                *count as f64,
                flag(*kaleidoscope),
                *rotation_offset,
            ],
            Symmetry::Grid {
                offset,
                count_x,
                count_y,
                checkerboard,
            } => vec![
                offset.x,
                offset.y,
                *count_x as f64,
                *count_y as f64,
                flag(*checkerboard),
            ],
        }
    }

    /// Rebuild from a kind name and property list. Missing properties take
    /// their defaults, counts are clamped, and an unknown kind yields `None`.
    pub fn from_properties(kind: &str, props: &[f64]) -> Self {
        let get = |i: usize, default: f64| props.get(i).copied().unwrap_or(default);
        let count = |v: f64| v.max(1.0).round() as u32;
        let symmetry = match kind {
            "bisector" => Symmetry::Bisector {
                offset: Vec2::new(get(0, 0.5), get(1, 0.5)),
                rotation_offset: get(2, 0.0),
                double: get(3, 0.0) != 0.0,
            },
            "rotational" => Symmetry::Rotational {
                offset: Vec2::new(get(0, 0.5), get(1, 0.5)),
                count: count(get(2, 4.0)),
                kaleidoscope: get(3, 0.0) != 0.0,
                rotation_offset: get(4, 0.0),
            },
            "grid" => Symmetry::Grid {
                offset: Vec2::new(get(0, 0.5), get(1, 0.5)),
                count_x: count(get(2, 2.0)),
                count_y: count(get(3, 2.0)),
                checkerboard: get(4, 0.0) != 0.0,
            },
            "none" | "" => Symmetry::None,
            other => {
                tracing::warn!(kind = other, "unknown symmetry kind, ignoring");
                Symmetry::None
            }
        };
        symmetry.clamped()
    }

    /// Generated copies of `seed`, excluding the seed itself.
    pub fn mirrors(&self, seed: &Instance) -> Vec<Instance> {
        match self {
            Symmetry::None => Vec::new(),
            Symmetry::Bisector {
                offset,
                rotation_offset,
                double,
            } => {
                let first = reflect(seed, *offset, *rotation_offset);
                if !*double {
                    return vec![first];
                }
                let perpendicular = rotation_offset + 90.0;
                let second = reflect(seed, *offset, perpendicular);
                let third = reflect(&first, *offset, perpendicular);
                vec![first, second, third]
            }
            Symmetry::Rotational {
                offset,
                count,
                kaleidoscope,
                rotation_offset,
            } => {
                let count = clamp_count(*count, &ROTATIONAL_COUNT);
                let step = 360.0 / count as f64;
                let mut out = Vec::new();
                for i in 1..count {
                    out.push(rotate(seed, *offset, i as f64 * step));
                }
                if *kaleidoscope {
                    let wedge = step / 2.0 + rotation_offset;
                    let mut mirror_seed = reflect(seed, *offset, wedge);
                    mirror_seed.set_rotation(2.0 * wedge - seed.rotation() - 180.0);
                    for i in 0..count {
                        out.push(rotate(&mirror_seed, *offset, i as f64 * step));
                    }
                }
                out
            }
            Symmetry::Grid {
                count_x,
                count_y,
                checkerboard,
                ..
            } => grid_mirrors(
                seed,
                clamp_count(*count_x, &GRID_COUNT),
                clamp_count(*count_y, &GRID_COUNT),
                *checkerboard,
            ),
        }
    }
}

fn with_transform(seed: &Instance, position: Vec2, rotation: f64) -> Instance {
    Instance::from_parts(position, seed.scale(), rotation, seed.depth())
}

/// Reflect across the line through `pivot` at `angle` degrees.
fn reflect(inst: &Instance, pivot: Vec2, angle: f64) -> Instance {
    let rel = inst.position().offset(-pivot.x, -pivot.y);
    let theta = angle.to_radians();
    let (sin2, cos2) = (2.0 * theta).sin_cos();
    let position = Vec2::new(
        rel.x * cos2 + rel.y * sin2 + pivot.x,
        rel.x * sin2 - rel.y * cos2 + pivot.y,
    );
    with_transform(inst, position, 2.0 * angle - inst.rotation())
}

/// Rotate around `pivot` by `angle` degrees, clamping the result to 0..1.
fn rotate(inst: &Instance, pivot: Vec2, angle: f64) -> Instance {
    let rel = inst.position().offset(-pivot.x, -pivot.y);
    let (sin, cos) = angle.to_radians().sin_cos();
    let position = Vec2::new(
        (rel.x * cos - rel.y * sin + pivot.x).clamp(0.0, 1.0),
        (rel.x * sin + rel.y * cos + pivot.y).clamp(0.0, 1.0),
    );
    with_transform(inst, position, inst.rotation() + angle)
}

fn grid_mirrors(seed: &Instance, count_x: u32, count_y: u32, checkerboard: bool) -> Vec<Instance> {
    let cell_w = 1.0 / count_x as f64;
    let cell_h = 1.0 / count_y as f64;
    let pos = seed.position();

    let seed_col = ((pos.x / cell_w) as i64).clamp(0, count_x as i64 - 1);
    let seed_row = ((pos.y / cell_h) as i64).clamp(0, count_y as i64 - 1);
    let parity = (seed_row + seed_col) % 2;
    let dx = pos.x - (seed_col as f64 + 0.5) * cell_w;
    let dy = pos.y - (seed_row as f64 + 0.5) * cell_h;

    let mut cells = Vec::new();
    for row in 0..count_y as i64 {
        for col in 0..count_x as i64 {
            if (row, col) == (seed_row, seed_col) {
                continue;
            }
            if checkerboard && (row + col) % 2 != parity {
                continue;
            }
            let position = Vec2::new(
                ((col as f64 + 0.5) * cell_w + dx).clamp(0.0, 1.0),
                ((row as f64 + 0.5) * cell_h + dy).clamp(0.0, 1.0),
            );
            cells.push(with_transform(seed, position, seed.rotation()));
        }
    }

    let mut out = Vec::new();
    for (i, inst) in std::iter::once(seed).chain(cells.iter()).enumerate() {
        if i > 0 {
            out.push(inst.clone());
        }
        out.extend(edge_wraps(inst));
    }
    out
}

/// Copies on the far side of any edge the instance touches.
fn edge_wraps(inst: &Instance) -> Vec<Instance> {
    let p = inst.position();
    let mut shifts_x = vec![0.0];
    let mut shifts_y = vec![0.0];
    if p.x <= GRID_EDGE_THRESHOLD {
        shifts_x.push(1.0);
    }
    if p.x >= 1.0 - GRID_EDGE_THRESHOLD {
        shifts_x.push(-1.0);
    }
    if p.y <= GRID_EDGE_THRESHOLD {
        shifts_y.push(1.0);
    }
    if p.y >= 1.0 - GRID_EDGE_THRESHOLD {
        shifts_y.push(-1.0);
    }

    let mut out = Vec::new();
    for &sx in &shifts_x {
        for &sy in &shifts_y {
            if sx == 0.0 && sy == 0.0 {
                continue;
            }
            out.push(with_transform(inst, p.offset(sx, sy), inst.rotation()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(x: f64, y: f64, rotation: f64) -> Instance {
        Instance::from_parts(Vec2::new(x, y), Vec2::new(0.5, 0.5), rotation, 0.0)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_none_has_no_mirrors() {
        assert!(Symmetry::None.mirrors(&seed(0.2, 0.2, 0.0)).is_empty());
    }

    #[test]
    fn test_bisector_horizontal_line() {
        // Line through the centre at 0 degrees reflects y around 0.5
        let mirrors = Symmetry::bisector().mirrors(&seed(0.3, 0.2, 30.0));
        assert_eq!(mirrors.len(), 1);
        let m = &mirrors[0];
        assert!(close(m.position().x, 0.3));
        assert!(close(m.position().y, 0.8));
        assert!(close(m.rotation(), -30.0));
        assert_eq!(m.scale(), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_bisector_double_gives_three() {
        let sym = Symmetry::Bisector {
            offset: CENTRE,
            rotation_offset: 0.0,
            double: true,
        };
        let mirrors = sym.mirrors(&seed(0.3, 0.2, 0.0));
        assert_eq!(mirrors.len(), 3);
        // Vertical line reflects x around 0.5
        assert!(close(mirrors[1].position().x, 0.7));
        assert!(close(mirrors[1].position().y, 0.2));
        // Both lines: point reflection through the centre
        assert!(close(mirrors[2].position().x, 0.7));
        assert!(close(mirrors[2].position().y, 0.8));
    }

    #[test]
    fn test_rotational_quarter_turns() {
        let mirrors = Symmetry::rotational(4).mirrors(&seed(0.5, 0.25, 0.0));
        assert_eq!(mirrors.len(), 3);
        assert!(close(mirrors[0].position().x, 0.75));
        assert!(close(mirrors[0].position().y, 0.5));
        assert!(close(mirrors[0].rotation(), 90.0));
        assert!(close(mirrors[1].position().y, 0.75));
        assert!(close(mirrors[2].rotation(), 270.0));
    }

    #[test]
    fn test_kaleidoscope_doubles_count() {
        let sym = Symmetry::Rotational {
            offset: CENTRE,
            count: 3,
            kaleidoscope: true,
            rotation_offset: 0.0,
        };
        assert_eq!(sym.mirrors(&seed(0.5, 0.3, 0.0)).len(), 5);
    }

    #[test]
    fn test_grid_full_and_checkerboard() {
        let full = Symmetry::grid(2, 2).mirrors(&seed(0.25, 0.25, 0.0));
        assert_eq!(full.len(), 3);
        assert!(full
            .iter()
            .any(|m| close(m.position().x, 0.75) && close(m.position().y, 0.75)));

        let checker = Symmetry::Grid {
            offset: CENTRE,
            count_x: 2,
            count_y: 2,
            checkerboard: true,
        };
        let mirrors = checker.mirrors(&seed(0.25, 0.25, 0.0));
        assert_eq!(mirrors.len(), 1);
        assert!(close(mirrors[0].position().x, 0.75));
        assert!(close(mirrors[0].position().y, 0.75));
    }

    #[test]
    fn test_grid_wraps_edges() {
        // A seed on the left edge of a 1x1 grid wraps to the right edge
        let mirrors = Symmetry::grid(1, 1).mirrors(&seed(0.0, 0.5, 0.0));
        assert_eq!(mirrors.len(), 1);
        assert!(close(mirrors[0].position().x, 1.0));
    }

    #[test]
    fn test_properties_round_trip() {
        let syms = [
            Symmetry::Bisector {
                offset: Vec2::new(0.4, 0.6),
                rotation_offset: 45.0,
                double: true,
            },
            Symmetry::Rotational {
                offset: CENTRE,
                count: 6,
                kaleidoscope: true,
                rotation_offset: 10.0,
            },
            Symmetry::grid(3, 2),
        ];
        for sym in syms {
            assert_eq!(Symmetry::from_properties(sym.kind(), &sym.properties()), sym);
        }
    }

    #[test]
    fn test_from_properties_defaults_and_unknown() {
        assert_eq!(Symmetry::from_properties("rotational", &[]), Symmetry::rotational(4));
        assert_eq!(Symmetry::from_properties("spiral", &[1.0]), Symmetry::None);
    }

    #[test]
    fn test_counts_are_clamped() {
        let huge = Symmetry::from_properties("rotational", &[0.5, 0.5, 200_000.0, 0.0, 0.0]);
        assert_eq!(huge, Symmetry::rotational(12));
        assert_eq!(huge.mirrors(&seed(0.5, 0.25, 0.0)).len(), 11);
        assert_eq!(Symmetry::rotational(1), Symmetry::rotational(2));

        let grid = Symmetry::from_properties("grid", &[0.5, 0.5, 50.0, 0.0, 0.0]);
        assert_eq!(grid, Symmetry::grid(8, 1));

        let built = Symmetry::Rotational {
            offset: CENTRE,
            count: 1_000,
            kaleidoscope: false,
            rotation_offset: 0.0,
        };
        assert_eq!(built.mirrors(&seed(0.5, 0.25, 0.0)).len(), 11);
        assert_eq!(built.clamped(), Symmetry::rotational(12));
    }
}
