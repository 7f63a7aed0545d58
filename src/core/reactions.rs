use crate::core::{Particle, Registry};
use crate::error::Result;

/// Lateral offset between the two product particles of a two-product rule,
/// so they never spawn exactly co-located.
const PRODUCT_OFFSET: f64 = 5.0;

/// One reaction: a multiset of reactant symbols consumed on mutual contact,
/// and the product symbols emitted in their place.
///
/// Products inherit the summed reactant mass split evenly (registry mass is
/// only a spawn-time property) and the combined momentum, so every rule
/// conserves total mass exactly and total momentum up to float error.
#[derive(Debug, Clone, Copy)]
pub struct ReactionRule {
    /// Reactant symbols as an order-independent multiset.
    pub reactants: &'static [&'static str],
    /// One or two product symbols.
    pub products: &'static [&'static str],
}

/// Two-body rules: diatomic formation and extended pairwise synthesis.
pub const PAIR_RULES: &[ReactionRule] = &[
    ReactionRule { reactants: &["H", "H"], products: &["H₂"] },
    ReactionRule { reactants: &["N", "N"], products: &["N₂"] },
    ReactionRule { reactants: &["O", "O"], products: &["O₂"] },
    ReactionRule { reactants: &["He", "He"], products: &["He₂"] },
    ReactionRule { reactants: &["Li", "Li"], products: &["Li₂"] },
    ReactionRule { reactants: &["Be", "Be"], products: &["Be₂"] },
    ReactionRule { reactants: &["B", "B"], products: &["B₂"] },
    ReactionRule { reactants: &["F", "F"], products: &["F₂"] },
    ReactionRule { reactants: &["C", "O₂"], products: &["CO₂"] },
    ReactionRule { reactants: &["CO", "O"], products: &["CO₂"] },
    ReactionRule { reactants: &["N", "O"], products: &["NO"] },
    ReactionRule { reactants: &["He", "H"], products: &["HeH"] },
    ReactionRule { reactants: &["Li", "H"], products: &["LiH"] },
    ReactionRule { reactants: &["Be", "O"], products: &["BeO"] },
    ReactionRule { reactants: &["B", "F"], products: &["BF"] },
    ReactionRule { reactants: &["Ne", "F"], products: &["NeF"] },
    ReactionRule { reactants: &["N₂", "O₂"], products: &["NO", "NO"] },
];

/// Three-body stoichiometric rules.
pub const TRIPLE_RULES: &[ReactionRule] = &[
    ReactionRule { reactants: &["H₂", "H₂", "O₂"], products: &["H₂O", "H₂O"] },
    ReactionRule { reactants: &["N₂", "N₂", "O₂"], products: &["N₂O", "N₂O"] },
];

/// Four-body stoichiometric rules.
pub const QUAD_RULES: &[ReactionRule] = &[
    ReactionRule { reactants: &["N₂", "H₂", "H₂", "H₂"], products: &["NH₃", "NH₃"] },
];

/// Run the full reaction pipeline over one colliding-pairs snapshot.
///
/// Passes run quadruple → triple → pairwise, so higher-arity, more specific
/// rules are never starved of reactants by a lower-arity rule firing first
/// (e.g. a mutually-overlapping {N₂, N₂, O₂} group becomes N₂O, never NO).
/// A single consumed-index set spans all passes; any combination touching a
/// consumed index is skipped. The particle list is not touched until every
/// pass has finished, then consumed indices are removed in descending order
/// and products appended — `pairs` indices stay valid for the whole
/// pipeline, and the caller recomputes collisions afterwards.
///
/// `pairs` must be `i < j` ordered and sorted; each group of k mutually
/// colliding particles is then visited exactly once, in ascending index
/// order, which makes matching deterministic.
pub fn resolve(
    particles: &mut Vec<Particle>,
    pairs: &[(usize, usize)],
    registry: &Registry,
) -> Result<()> {
    if pairs.is_empty() {
        return Ok(());
    }

    let adj = adjacency(particles.len(), pairs);
    let mut consumed = vec![false; particles.len()];
    let mut products: Vec<Particle> = Vec::new();

    quad_pass(particles, pairs, &adj, &mut consumed, &mut products, registry)?;
    triple_pass(particles, pairs, &adj, &mut consumed, &mut products, registry)?;
    pair_pass(particles, pairs, &mut consumed, &mut products, registry)?;

    // Descending order keeps the remaining indices valid during removal.
    for i in (0..particles.len()).rev() {
        if consumed[i] {
            particles.remove(i);
        }
    }
    particles.append(&mut products);
    Ok(())
}

/// Per-particle sorted lists of currently-colliding neighbors, so triple and
/// quadruple matching is neighbor-list intersection instead of scanning all
/// pair combinations.
fn adjacency(n: usize, pairs: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adj = vec![Vec::new(); n];
    for &(i, j) in pairs {
        adj[i].push(j);
        adj[j].push(i);
    }
    for neighbors in &mut adj {
        neighbors.sort_unstable();
    }
    adj
}

/// Intersection of two sorted index lists.
fn common_neighbors(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::new();
    let (mut x, mut y) = (0, 0);
    while x < a.len() && y < b.len() {
        match a[x].cmp(&b[y]) {
            std::cmp::Ordering::Less => x += 1,
            std::cmp::Ordering::Greater => y += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[x]);
                x += 1;
                y += 1;
            }
        }
    }
    out
}

/// Find the first rule whose reactant multiset matches the group's symbols.
fn match_rule<'a>(rules: &'a [ReactionRule], symbols: &[&str]) -> Option<&'a ReactionRule> {
    rules.iter().find(|r| multiset_eq(r.reactants, symbols))
}

/// Exact multiset equality: same length and same count for every symbol.
fn multiset_eq(rule: &[&str], group: &[&str]) -> bool {
    if rule.len() != group.len() {
        return false;
    }
    rule.iter().all(|sym| {
        let want = rule.iter().filter(|s| *s == sym).count();
        let got = group.iter().filter(|s| *s == sym).count();
        want == got
    })
}

/// Build the product particles for a matched group: spawned at the group
/// centroid (two products offset ±PRODUCT_OFFSET laterally), each carrying
/// an even share of the combined mass and the momentum-preserving velocity.
fn react(
    particles: &[Particle],
    members: &[usize],
    rule: &ReactionRule,
    registry: &Registry,
) -> Result<Vec<Particle>> {
    let mut mass_sum = 0.0;
    let mut momentum = [0.0_f64; 2];
    let mut centroid = [0.0_f64; 2];
    for &idx in members {
        let p = &particles[idx];
        mass_sum += p.mass;
        momentum[0] += p.mass * p.v[0];
        momentum[1] += p.mass * p.v[1];
        centroid[0] += p.r[0];
        centroid[1] += p.r[1];
    }
    centroid[0] /= members.len() as f64;
    centroid[1] /= members.len() as f64;

    let v = [momentum[0] / mass_sum, momentum[1] / mass_sum];
    let each_mass = mass_sum / rule.products.len() as f64;

    let mut out = Vec::with_capacity(rule.products.len());
    for (slot, symbol) in rule.products.iter().enumerate() {
        let data = registry.get(symbol)?;
        let dx = match (rule.products.len(), slot) {
            (2, 0) => -PRODUCT_OFFSET,
            (2, 1) => PRODUCT_OFFSET,
            _ => 0.0,
        };
        out.push(Particle::new(
            *symbol,
            [centroid[0] + dx, centroid[1]],
            v,
            data.radius,
            each_mass,
            data.color,
        )?);
    }
    Ok(out)
}

fn quad_pass(
    particles: &[Particle],
    pairs: &[(usize, usize)],
    adj: &[Vec<usize>],
    consumed: &mut [bool],
    products: &mut Vec<Particle>,
    registry: &Registry,
) -> Result<()> {
    // Every mutually-colliding quadruple {i,j,k,l} (i<j<k<l) is reachable
    // from its lowest pair (i,j): k and l are common neighbors of i and j,
    // and the k-l edge is checked explicitly to complete all six pairs.
    'pairs: for &(i, j) in pairs {
        if consumed[i] || consumed[j] {
            continue;
        }
        let shared = common_neighbors(&adj[i], &adj[j]);
        for (a, &k) in shared.iter().enumerate() {
            if k <= j || consumed[k] {
                continue;
            }
            for &l in &shared[a + 1..] {
                if consumed[l] || adj[k].binary_search(&l).is_err() {
                    continue;
                }
                let symbols = [
                    particles[i].symbol.as_str(),
                    particles[j].symbol.as_str(),
                    particles[k].symbol.as_str(),
                    particles[l].symbol.as_str(),
                ];
                if let Some(rule) = match_rule(QUAD_RULES, &symbols) {
                    let members = [i, j, k, l];
                    for &m in &members {
                        consumed[m] = true;
                    }
                    products.extend(react(particles, &members, rule, registry)?);
                    continue 'pairs;
                }
            }
        }
    }
    Ok(())
}

fn triple_pass(
    particles: &[Particle],
    pairs: &[(usize, usize)],
    adj: &[Vec<usize>],
    consumed: &mut [bool],
    products: &mut Vec<Particle>,
    registry: &Registry,
) -> Result<()> {
    'pairs: for &(i, j) in pairs {
        if consumed[i] || consumed[j] {
            continue;
        }
        for &k in &common_neighbors(&adj[i], &adj[j]) {
            if k <= j || consumed[k] {
                continue;
            }
            let symbols = [
                particles[i].symbol.as_str(),
                particles[j].symbol.as_str(),
                particles[k].symbol.as_str(),
            ];
            if let Some(rule) = match_rule(TRIPLE_RULES, &symbols) {
                let members = [i, j, k];
                for &m in &members {
                    consumed[m] = true;
                }
                products.extend(react(particles, &members, rule, registry)?);
                continue 'pairs;
            }
        }
    }
    Ok(())
}

fn pair_pass(
    particles: &[Particle],
    pairs: &[(usize, usize)],
    consumed: &mut [bool],
    products: &mut Vec<Particle>,
    registry: &Registry,
) -> Result<()> {
    for &(i, j) in pairs {
        if consumed[i] || consumed[j] {
            continue;
        }
        let symbols = [particles[i].symbol.as_str(), particles[j].symbol.as_str()];
        if let Some(rule) = match_rule(PAIR_RULES, &symbols) {
            consumed[i] = true;
            consumed[j] = true;
            products.extend(react(particles, &[i, j], rule, registry)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collision;
    use crate::core::grid;

    fn registry() -> Registry {
        Registry::standard()
    }

    fn spawn(reg: &Registry, symbol: &str, x: f64, y: f64, v: [f64; 2]) -> Particle {
        let data = reg.get(symbol).unwrap();
        Particle::new(symbol, [x, y], v, data.radius, data.mass, data.color).unwrap()
    }

    fn resolve_all(particles: &mut Vec<Particle>, reg: &Registry) {
        let candidates = grid::candidate_pairs(particles);
        let pairs = collision::colliding_pairs(particles, &candidates);
        resolve(particles, &pairs, reg).unwrap();
    }

    #[test]
    fn multiset_matching_is_order_independent() {
        assert!(multiset_eq(&["N₂", "O₂"], &["O₂", "N₂"]));
        assert!(multiset_eq(&["H₂", "H₂", "O₂"], &["O₂", "H₂", "H₂"]));
        assert!(!multiset_eq(&["H₂", "H₂", "O₂"], &["H₂", "O₂", "O₂"]));
        assert!(!multiset_eq(&["H", "H"], &["H", "He"]));
        assert!(!multiset_eq(&["H", "H"], &["H"]));
    }

    #[test]
    fn match_rule_finds_swapped_reactants() {
        assert!(match_rule(PAIR_RULES, &["O₂", "C"]).is_some());
        assert!(match_rule(PAIR_RULES, &["O₂", "H"]).is_none());
    }

    #[test]
    fn hydrogen_pair_fuses() {
        let reg = registry();
        let mut particles = vec![
            spawn(&reg, "H", 100.0, 100.0, [0.0, 0.0]),
            spawn(&reg, "H", 105.0, 100.0, [0.0, 0.0]),
        ];
        resolve_all(&mut particles, &reg);
        assert_eq!(particles.len(), 1);
        assert_eq!(particles[0].symbol, "H₂");
        assert_eq!(particles[0].mass, 2.0);
        assert_eq!(particles[0].v, [0.0, 0.0]);
        assert_eq!(particles[0].r, [102.5, 100.0]);
    }

    #[test]
    fn reaction_conserves_mass_and_momentum() {
        let reg = registry();
        let mut particles = vec![
            spawn(&reg, "H", 100.0, 100.0, [30.0, -10.0]),
            spawn(&reg, "H", 105.0, 102.0, [-6.0, 4.0]),
        ];
        let mass0: f64 = particles.iter().map(|p| p.mass).sum();
        let px0: f64 = particles.iter().map(|p| p.momentum()[0]).sum();
        let py0: f64 = particles.iter().map(|p| p.momentum()[1]).sum();

        resolve_all(&mut particles, &reg);

        let mass1: f64 = particles.iter().map(|p| p.mass).sum();
        let px1: f64 = particles.iter().map(|p| p.momentum()[0]).sum();
        let py1: f64 = particles.iter().map(|p| p.momentum()[1]).sum();
        assert_eq!(mass0, mass1);
        assert!((px0 - px1).abs() < 1e-9);
        assert!((py0 - py1).abs() < 1e-9);
    }

    #[test]
    fn two_product_pair_rule_splits_mass() {
        let reg = registry();
        let mut particles = vec![
            spawn(&reg, "N₂", 200.0, 200.0, [0.0, 0.0]),
            spawn(&reg, "O₂", 206.0, 200.0, [0.0, 0.0]),
        ];
        resolve_all(&mut particles, &reg);
        assert_eq!(particles.len(), 2);
        assert!(particles.iter().all(|p| p.symbol == "NO"));
        // (28 + 32) / 2 per product.
        assert!(particles.iter().all(|p| p.mass == 30.0));
        // Offset laterally around the centroid.
        assert_eq!(particles[0].r, [198.0, 200.0]);
        assert_eq!(particles[1].r, [208.0, 200.0]);
    }

    #[test]
    fn triple_synthesis_makes_water() {
        let reg = registry();
        let mut particles = vec![
            spawn(&reg, "H₂", 200.0, 200.0, [0.0, 0.0]),
            spawn(&reg, "H₂", 206.0, 200.0, [0.0, 0.0]),
            spawn(&reg, "O₂", 203.0, 206.0, [0.0, 0.0]),
        ];
        resolve_all(&mut particles, &reg);
        assert_eq!(particles.len(), 2);
        assert!(particles.iter().all(|p| p.symbol == "H₂O"));
        // (2 + 2 + 32) / 2 per product.
        assert!(particles.iter().all(|p| p.mass == 18.0));
        assert!(particles.iter().all(|p| p.v == [0.0, 0.0]));
    }

    #[test]
    fn chain_overlap_does_not_trigger_triple() {
        let reg = registry();
        // A-B and B-C overlap, A-C does not: no all-pairs contact, no rule.
        let mut particles = vec![
            spawn(&reg, "H₂", 100.0, 100.0, [0.0, 0.0]),
            spawn(&reg, "H₂", 112.0, 100.0, [0.0, 0.0]),
            spawn(&reg, "O₂", 124.5, 100.0, [0.0, 0.0]),
        ];
        resolve_all(&mut particles, &reg);
        assert_eq!(particles.len(), 3);
        assert!(particles.iter().all(|p| p.symbol != "H₂O"));
    }

    #[test]
    fn quadruple_synthesis_makes_ammonia() {
        let reg = registry();
        let mut particles = vec![
            spawn(&reg, "N₂", 300.0, 300.0, [0.0, 0.0]),
            spawn(&reg, "H₂", 306.0, 300.0, [0.0, 0.0]),
            spawn(&reg, "H₂", 300.0, 306.0, [0.0, 0.0]),
            spawn(&reg, "H₂", 306.0, 306.0, [0.0, 0.0]),
        ];
        resolve_all(&mut particles, &reg);
        assert_eq!(particles.len(), 2);
        assert!(particles.iter().all(|p| p.symbol == "NH₃"));
        // (28 + 3*2) / 2 per product.
        assert!(particles.iter().all(|p| p.mass == 17.0));
    }

    #[test]
    fn triple_outranks_pair_rule() {
        let reg = registry();
        // {N₂, N₂, O₂} matches both the N₂+O₂ pair rule and the triple
        // rule; the triple pass runs first and must win.
        let mut particles = vec![
            spawn(&reg, "N₂", 350.0, 300.0, [0.0, 0.0]),
            spawn(&reg, "N₂", 362.0, 300.0, [0.0, 0.0]),
            spawn(&reg, "O₂", 356.0, 308.0, [0.0, 0.0]),
        ];
        resolve_all(&mut particles, &reg);
        assert_eq!(particles.len(), 2);
        assert!(particles.iter().all(|p| p.symbol == "N₂O"));
        assert!(particles.iter().all(|p| p.mass == 44.0));
    }

    #[test]
    fn consumed_particles_skip_later_matches() {
        let reg = registry();
        // Three mutually-overlapping H atoms: the (0,1) pair fuses, the
        // third H survives untouched.
        let mut particles = vec![
            spawn(&reg, "H", 100.0, 100.0, [0.0, 0.0]),
            spawn(&reg, "H", 105.0, 100.0, [0.0, 0.0]),
            spawn(&reg, "H", 102.0, 104.0, [0.0, 0.0]),
        ];
        resolve_all(&mut particles, &reg);
        let mut symbols: Vec<_> = particles.iter().map(|p| p.symbol.clone()).collect();
        symbols.sort();
        assert_eq!(symbols, vec!["H", "H₂"]);
    }

    #[test]
    fn unmatched_group_is_untouched() {
        let reg = registry();
        let mut particles = vec![
            spawn(&reg, "H", 100.0, 100.0, [0.0, 0.0]),
            spawn(&reg, "C", 105.0, 100.0, [0.0, 0.0]),
        ];
        resolve_all(&mut particles, &reg);
        assert_eq!(particles.len(), 2);
    }

    #[test]
    fn carbon_oxygen_synthesis() {
        let reg = registry();
        let mut particles = vec![
            spawn(&reg, "C", 100.0, 100.0, [0.0, 0.0]),
            spawn(&reg, "O₂", 106.0, 100.0, [0.0, 0.0]),
        ];
        resolve_all(&mut particles, &reg);
        assert_eq!(particles.len(), 1);
        assert_eq!(particles[0].symbol, "CO₂");
        assert_eq!(particles[0].mass, 44.0);
    }

    #[test]
    fn common_neighbors_intersects_sorted_lists() {
        assert_eq!(common_neighbors(&[1, 3, 5, 7], &[2, 3, 6, 7]), vec![3, 7]);
        assert_eq!(common_neighbors(&[], &[1, 2]), Vec::<usize>::new());
    }

    #[test]
    fn reactions_never_grow_the_population() {
        // Every rule consumes at least as many particles as it emits.
        for rule in PAIR_RULES.iter().chain(TRIPLE_RULES).chain(QUAD_RULES) {
            assert!(rule.products.len() <= rule.reactants.len());
            assert!(!rule.products.is_empty() && rule.products.len() <= 2);
        }
    }
}
