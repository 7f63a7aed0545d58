use crate::core::Particle;

/// Minimum center distance substituted for coincident particles so the
/// contact normal stays defined; the direction falls back to +x.
const EPS_DIST: f64 = 1e-12;

/// Exact overlap predicate: strictly intersecting circles.
///
/// This is the single geometric test used for both reaction eligibility and
/// bounce eligibility, so the two passes can never disagree on "touching".
#[inline]
pub fn overlap(a: &Particle, b: &Particle) -> bool {
    let dx = b.r[0] - a.r[0];
    let dy = b.r[1] - a.r[1];
    let r_sum = a.radius + b.radius;
    dx * dx + dy * dy < r_sum * r_sum
}

/// Filter broadphase candidates down to pairs whose circles actually
/// intersect. Preserves the candidate ordering; does not mutate state.
pub fn colliding_pairs(particles: &[Particle], candidates: &[(usize, usize)]) -> Vec<(usize, usize)> {
    candidates
        .iter()
        .copied()
        .filter(|&(i, j)| overlap(&particles[i], &particles[j]))
        .collect()
}

/// Resolve every colliding pair as a frictionless elastic collision.
///
/// For each pair: separate the two circles to exact tangency (half the
/// overlap each, along the center line), then — only if the pair is still
/// approaching — exchange the normal velocity components with the standard
/// mass-weighted elastic formula. Momentum is conserved exactly and kinetic
/// energy is conserved when the exchange applies; the tangential components
/// are untouched.
///
/// Pairs are a snapshot: positions shift as earlier pairs separate, so each
/// pair re-checks overlap before being resolved.
pub fn elastic_bounce(particles: &mut [Particle], pairs: &[(usize, usize)]) {
    for &(i, j) in pairs {
        let dx = particles[j].r[0] - particles[i].r[0];
        let dy = particles[j].r[1] - particles[i].r[1];
        let mut dist = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = if dist <= EPS_DIST {
            dist = EPS_DIST;
            (1.0, 0.0)
        } else {
            (dx / dist, dy / dist)
        };

        let overlap = (particles[i].radius + particles[j].radius) - dist;
        if overlap <= 0.0 {
            continue;
        }

        let half = 0.5 * overlap;
        particles[i].r[0] -= nx * half;
        particles[i].r[1] -= ny * half;
        particles[j].r[0] += nx * half;
        particles[j].r[1] += ny * half;

        // Relative velocity of j with respect to i along the contact normal;
        // non-negative means the pair is already separating.
        let u_n = (particles[j].v[0] - particles[i].v[0]) * nx
            + (particles[j].v[1] - particles[i].v[1]) * ny;
        if u_n >= 0.0 {
            continue;
        }

        let (mi, mj) = (particles[i].mass, particles[j].mass);
        let fi = (2.0 * mj / (mi + mj)) * u_n;
        let fj = (2.0 * mi / (mi + mj)) * u_n;
        particles[i].v[0] += fi * nx;
        particles[i].v[1] += fi * ny;
        particles[j].v[0] -= fj * nx;
        particles[j].v[1] -= fj * ny;
    }
}
