use eframe::egui::{Vec2, vec2};

use super::{SimLink, SimNode};

const LINK_STRENGTH: f32 = 0.3;
const CHARGE_STRENGTH: f32 = 120.0;
const CHARGE_MIN_DISTANCE: f32 = 6.0;
const COLLIDE_PADDING: f32 = 4.0;
const COLLIDE_PASSES: usize = 3;
const COLLIDE_STRENGTH: f32 = 0.7;

// Deterministic push direction for coincident nodes, so a degenerate
// distance never turns into a NaN or a division fault.
fn separation_direction(delta: Vec2, distance: f32, from: usize, to: usize) -> Vec2 {
    if distance > 1e-4 {
        delta / distance
    } else {
        let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    }
}

/// Spring force: pulls each resolved pair toward the rest length, split
/// evenly between the two endpoints.
pub(super) fn apply_link(nodes: &mut [SimNode], links: &[SimLink], alpha: f32) {
    for link in links {
        let delta = nodes[link.source].pos - nodes[link.target].pos;
        let distance = delta.length();
        let direction = separation_direction(delta, distance, link.source, link.target);

        let correction = (distance - super::LINK_DISTANCE) * LINK_STRENGTH * alpha;
        let half = direction * (correction * 0.5);
        nodes[link.source].vel -= half;
        nodes[link.target].vel += half;
    }
}

/// All-pairs inverse-square repulsion. O(n²), acceptable under the ~300-node
/// snapshot cap; the distance is floored before the division so coincident
/// nodes stay finite.
pub(super) fn apply_charge(nodes: &mut [SimNode], alpha: f32) {
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let delta = nodes[i].pos - nodes[j].pos;
            let distance = delta.length();
            let direction = separation_direction(delta, distance, i, j);

            let floored = distance.max(CHARGE_MIN_DISTANCE);
            let push = direction * (CHARGE_STRENGTH / (floored * floored) * alpha);
            nodes[i].vel += push;
            nodes[j].vel -= push;
        }
    }
}

/// Centering force: translates the layout so its centroid returns to the
/// world origin, preventing long-run drift off the visible area.
pub(super) fn apply_center(nodes: &mut [SimNode]) {
    if nodes.is_empty() {
        return;
    }

    let mut centroid = Vec2::ZERO;
    for node in nodes.iter() {
        centroid += node.pos;
    }
    centroid /= nodes.len() as f32;

    if centroid.length_sq() > 1e-6 {
        for node in nodes {
            node.pos -= centroid;
        }
    }
}

/// Collision force: treats nodes as padded disks and runs several relaxation
/// passes, separating overlapping pairs proportionally to overlap depth.
/// Positional, not temperature-scaled, so overlaps resolve even as the
/// simulation cools. A pinned node never yields; its partner takes the full
/// correction instead.
pub(super) fn apply_collision(nodes: &mut [SimNode]) {
    for _ in 0..COLLIDE_PASSES {
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let delta = nodes[i].pos - nodes[j].pos;
                let distance = delta.length();
                let min_separation = nodes[i].radius + nodes[j].radius + 2.0 * COLLIDE_PADDING;
                if distance >= min_separation {
                    continue;
                }

                let direction = separation_direction(delta, distance, i, j);
                let push = direction * ((min_separation - distance) * COLLIDE_STRENGTH * 0.5);

                match (nodes[i].pinned.is_some(), nodes[j].pinned.is_some()) {
                    (true, true) => {}
                    (true, false) => nodes[j].pos -= push * 2.0,
                    (false, true) => nodes[i].pos += push * 2.0,
                    (false, false) => {
                        nodes[i].pos += push;
                        nodes[j].pos -= push;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::node_radius;

    fn raw_node(id: &str, pos: Vec2) -> SimNode {
        SimNode {
            id: id.to_owned(),
            label: id.to_owned(),
            weight: 9.0,
            flagged: false,
            pos,
            vel: Vec2::ZERO,
            pinned: None,
            radius: node_radius(9.0),
        }
    }

    #[test]
    fn coincident_nodes_produce_finite_repulsion() {
        let mut nodes = vec![raw_node("a", Vec2::ZERO), raw_node("b", Vec2::ZERO)];
        apply_charge(&mut nodes, 1.0);

        for node in &nodes {
            assert!(node.vel.x.is_finite() && node.vel.y.is_finite());
        }
        // Pushed apart in opposite directions.
        assert!((nodes[0].vel + nodes[1].vel).length() < 1e-5);
        assert!(nodes[0].vel.length() > 0.0);
    }

    #[test]
    fn forces_are_noops_on_empty_and_singleton_sets() {
        let mut empty: Vec<SimNode> = Vec::new();
        apply_charge(&mut empty, 1.0);
        apply_center(&mut empty);
        apply_collision(&mut empty);

        let mut single = vec![raw_node("solo", vec2(40.0, -10.0))];
        apply_charge(&mut single, 1.0);
        apply_collision(&mut single);
        assert_eq!(single[0].vel, Vec2::ZERO);

        // Only centering acts on a lone node.
        apply_center(&mut single);
        assert_eq!(single[0].pos, Vec2::ZERO);
    }

    #[test]
    fn collision_leaves_pinned_nodes_in_place() {
        let mut nodes = vec![raw_node("a", Vec2::ZERO), raw_node("b", vec2(2.0, 0.0))];
        nodes[0].pinned = Some(Vec2::ZERO);

        let before = nodes[0].pos;
        apply_collision(&mut nodes);
        assert_eq!(nodes[0].pos, before);
        assert!(nodes[1].pos.x > 2.0);
    }

    #[test]
    fn centering_recenters_the_centroid() {
        let mut nodes = vec![
            raw_node("a", vec2(100.0, 100.0)),
            raw_node("b", vec2(300.0, 100.0)),
        ];
        apply_center(&mut nodes);

        let centroid = (nodes[0].pos + nodes[1].pos) / 2.0;
        assert!(centroid.length() < 1e-3);
        // Relative geometry is preserved.
        assert!(((nodes[1].pos - nodes[0].pos).length() - 200.0).abs() < 1e-3);
    }
}
