use crate::core::Particle;
use std::collections::HashMap;

/// Broadphase cell edge length, in world units.
///
/// Must exceed the largest possible radius sum of two particles (the largest
/// registry radius is 10), so that any overlapping pair lands in the same or
/// an adjacent cell; `cell_size_covers_registry` in the tests pins this
/// against the registry data.
pub const CELL_SIZE: f64 = 24.0;

#[inline]
fn cell_of(p: &Particle) -> (i64, i64) {
    (
        (p.r[0] / CELL_SIZE).floor() as i64,
        (p.r[1] / CELL_SIZE).floor() as i64,
    )
}

/// Compute broadphase candidate pairs for the current particle positions.
///
/// Particles are hashed into uniform cells; each occupied cell pairs its
/// members with members of all 9 cells in its Moore neighborhood (itself
/// included). Each unordered pair is emitted exactly once, enforced by the
/// `i < j` ordering rather than a dedup set. The result is sorted so every
/// downstream pass scans pairs in a deterministic order.
///
/// Guarantee: any two particles whose circles overlap appear in the output
/// (no false negatives); same-neighborhood pairs that do not actually
/// overlap are expected and filtered by the overlap detector.
pub fn candidate_pairs(particles: &[Particle]) -> Vec<(usize, usize)> {
    let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, p) in particles.iter().enumerate() {
        cells.entry(cell_of(p)).or_default().push(i);
    }

    let mut pairs = Vec::new();
    for (&(cx, cy), members) in &cells {
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(neighbors) = cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &i in members {
                    for &j in neighbors {
                        if i < j {
                            pairs.push((i, j));
                        }
                    }
                }
            }
        }
    }

    pairs.sort_unstable();
    pairs
}
