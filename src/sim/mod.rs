mod forces;

use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, Vec2, vec2};

use crate::api::{GraphLink, GraphNode};
use crate::util::seeded_pair;

pub const MIN_RADIUS: f32 = 4.0;
pub const MAX_RADIUS: f32 = 22.0;
pub const MIN_LINK_WIDTH: f32 = 0.3;
pub const MAX_LINK_WIDTH: f32 = 3.0;
pub const LINK_DISTANCE: f32 = 80.0;
pub const DRAG_REHEAT: f32 = 0.3;
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 8.0;

const ALPHA_DECAY: f32 = 0.0228;
const ALPHA_MIN: f32 = 0.001;
const VELOCITY_DAMPING: f32 = 0.6;
const SCATTER_EXTENT: f32 = 0.15;

/// Disk radius for a node weight. Square-root scaling keeps visual area,
/// not radius, proportional to weight.
pub fn node_radius(weight: f32) -> f32 {
    weight.max(0.0).sqrt().clamp(MIN_RADIUS, MAX_RADIUS)
}

/// Stroke width for an edge weight, linear against the snapshot maximum.
pub fn link_width(weight: f32, max_weight: f32) -> f32 {
    if max_weight <= 0.0 {
        return MIN_LINK_WIDTH;
    }
    let t = (weight.max(0.0) / max_weight).clamp(0.0, 1.0);
    MIN_LINK_WIDTH + t * (MAX_LINK_WIDTH - MIN_LINK_WIDTH)
}

pub struct SimNode {
    pub id: String,
    pub label: String,
    pub weight: f32,
    pub flagged: bool,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Position override, present only while the node is dragged. A pinned
    /// node still exerts forces on its neighbors.
    pub pinned: Option<Vec2>,
    pub radius: f32,
}

pub struct SimLink {
    pub source: usize,
    pub target: usize,
    pub width: f32,
}

/// Affine world-to-screen mapping (pan offset + zoom scale).
///
/// Applied only when drawing and when translating pointer coordinates back
/// into world space; it never touches simulated node positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom by `factor`, keeping the world point under `pointer` fixed.
    pub fn zoom_about(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        let world_before = self.screen_to_world(rect, pointer);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - world_before * self.zoom;
    }
}

/// One graph snapshot under simulation: node positions and velocities, the
/// resolved link set, a decaying temperature, and the current view transform.
///
/// The engine is headless; rendering is a separate projection of this state.
pub struct Simulation {
    pub nodes: Vec<SimNode>,
    pub links: Vec<SimLink>,
    pub view: ViewTransform,
    alpha: f32,
}

impl Simulation {
    /// Build a fresh snapshot. Initial placement is deterministic in
    /// `(seed, node id)`; links with an unresolved endpoint or a self-loop
    /// are dropped here and never reach force computation or rendering.
    pub fn new(nodes: &[GraphNode], links: &[GraphLink], bounds: Vec2, seed: u64) -> Self {
        let extent = bounds * SCATTER_EXTENT;
        let sim_nodes = nodes
            .iter()
            .map(|node| {
                let (sx, sy) = seeded_pair(seed, &node.id);
                let weight = node.count.max(0.0);
                let label = if node.name.is_empty() {
                    node.email.clone()
                } else {
                    node.name.clone()
                };
                SimNode {
                    id: node.id.clone(),
                    label,
                    weight,
                    flagged: node.flagged,
                    pos: vec2(sx * extent.x, sy * extent.y),
                    vel: Vec2::ZERO,
                    pinned: None,
                    radius: node_radius(weight),
                }
            })
            .collect::<Vec<_>>();

        let mut index_by_id = HashMap::with_capacity(sim_nodes.len());
        for (index, node) in sim_nodes.iter().enumerate() {
            index_by_id.insert(node.id.as_str(), index);
        }

        let mut resolved = Vec::with_capacity(links.len());
        for link in links {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(link.source.as_str()),
                index_by_id.get(link.target.as_str()),
            ) else {
                log::warn!(
                    "dropping link {} -> {}: unresolved endpoint",
                    link.source,
                    link.target
                );
                continue;
            };
            if source == target {
                continue;
            }
            resolved.push((source, target, link.weight.max(0.0)));
        }

        let max_weight = resolved
            .iter()
            .map(|&(_, _, weight)| weight)
            .fold(0.0_f32, f32::max);
        let sim_links = resolved
            .into_iter()
            .map(|(source, target, weight)| SimLink {
                source,
                target,
                width: link_width(weight, max_weight),
            })
            .collect();

        Self {
            nodes: sim_nodes,
            links: sim_links,
            view: ViewTransform::default(),
            alpha: 1.0,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Advance the simulation by one discrete step: forces in fixed order
    /// (link, charge, center, collision), then damped integration, then
    /// geometric temperature decay. Returns whether the layout is still hot.
    pub fn step(&mut self) -> bool {
        if self.nodes.is_empty() {
            self.alpha = 0.0;
            return false;
        }
        if self.alpha <= ALPHA_MIN {
            return false;
        }

        forces::apply_link(&mut self.nodes, &self.links, self.alpha);
        forces::apply_charge(&mut self.nodes, self.alpha);
        forces::apply_center(&mut self.nodes);
        forces::apply_collision(&mut self.nodes);

        for node in &mut self.nodes {
            if let Some(pin) = node.pinned {
                node.pos = pin;
                node.vel = Vec2::ZERO;
            } else {
                node.vel *= VELOCITY_DAMPING;
                node.pos += node.vel;
            }
        }

        self.alpha = (self.alpha * (1.0 - ALPHA_DECAY)).clamp(0.0, 1.0);
        self.alpha > ALPHA_MIN
    }

    /// Raise the temperature toward `target` so the layout visibly responds
    /// to interaction. Never lowers it and never exceeds 1.0.
    pub fn reheat(&mut self, target: f32) {
        self.alpha = self.alpha.max(target.clamp(0.0, 1.0));
    }

    pub fn pin(&mut self, index: usize, world_pos: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = Some(world_pos);
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, count: f32) -> GraphNode {
        GraphNode {
            id: id.to_owned(),
            name: id.to_owned(),
            email: format!("{id}@example.com"),
            count,
            flagged: false,
        }
    }

    fn link(source: &str, target: &str, weight: f32) -> GraphLink {
        GraphLink {
            source: source.to_owned(),
            target: target.to_owned(),
            weight,
        }
    }

    const BOUNDS: Vec2 = vec2(800.0, 600.0);

    fn settle(sim: &mut Simulation) {
        let mut steps = 0;
        while sim.step() {
            steps += 1;
            assert!(steps < 1000, "simulation failed to converge");
        }
    }

    #[test]
    fn radius_is_monotone_and_clamped() {
        assert_eq!(node_radius(0.0), MIN_RADIUS);
        assert_eq!(node_radius(-3.0), MIN_RADIUS);
        assert_eq!(node_radius(1e12), MAX_RADIUS);

        let weights = [0.0, 1.0, 16.0, 100.0, 484.0, 1000.0, 1e9];
        for pair in weights.windows(2) {
            assert!(node_radius(pair[1]) >= node_radius(pair[0]));
        }
        for weight in weights {
            let radius = node_radius(weight);
            assert!((MIN_RADIUS..=MAX_RADIUS).contains(&radius));
        }
    }

    #[test]
    fn link_width_is_clamped() {
        assert_eq!(link_width(0.0, 50.0), MIN_LINK_WIDTH);
        assert_eq!(link_width(50.0, 50.0), MAX_LINK_WIDTH);
        assert_eq!(link_width(10.0, 0.0), MIN_LINK_WIDTH);
        let mid = link_width(25.0, 50.0);
        assert!(mid > MIN_LINK_WIDTH && mid < MAX_LINK_WIDTH);
    }

    #[test]
    fn unresolved_links_are_dropped() {
        let nodes = [node("a", 10.0), node("b", 10.0)];
        let links = [
            link("a", "b", 5.0),
            link("a", "ghost", 9.0),
            link("ghost", "b", 9.0),
            link("a", "a", 2.0),
        ];
        let sim = Simulation::new(&nodes, &links, BOUNDS, 1);
        assert_eq!(sim.links.len(), 1);
        assert_eq!(sim.links[0].source, 0);
        assert_eq!(sim.links[0].target, 1);
    }

    #[test]
    fn empty_snapshot_is_idle_immediately() {
        let mut sim = Simulation::new(&[], &[], BOUNDS, 1);
        assert!(!sim.step());
        assert_eq!(sim.alpha(), 0.0);
        assert!(!sim.step());
    }

    #[test]
    fn single_node_settles_at_center() {
        let mut sim = Simulation::new(&[node("solo", 4.0)], &[], BOUNDS, 9);
        settle(&mut sim);
        assert!(sim.nodes[0].pos.length() < 1.0);
    }

    #[test]
    fn initial_placement_is_seed_deterministic() {
        let nodes = [node("a", 3.0), node("b", 7.0), node("c", 1.0)];
        let first = Simulation::new(&nodes, &[], BOUNDS, 1234);
        let second = Simulation::new(&nodes, &[], BOUNDS, 1234);
        for (left, right) in first.nodes.iter().zip(&second.nodes) {
            assert_eq!(left.pos, right.pos);
            assert_eq!(left.vel, Vec2::ZERO);
        }

        let other_seed = Simulation::new(&nodes, &[], BOUNDS, 99);
        assert!(
            first
                .nodes
                .iter()
                .zip(&other_seed.nodes)
                .any(|(left, right)| left.pos != right.pos)
        );
    }

    #[test]
    fn stepped_runs_stay_within_tolerance() {
        let nodes = [node("a", 9.0), node("b", 4.0), node("c", 25.0)];
        let links = [link("a", "b", 3.0), link("b", "c", 1.0)];
        let mut first = Simulation::new(&nodes, &links, BOUNDS, 7);
        let mut second = Simulation::new(&nodes, &links, BOUNDS, 7);

        for _ in 0..50 {
            first.step();
            second.step();
        }
        for (left, right) in first.nodes.iter().zip(&second.nodes) {
            assert!((left.pos - right.pos).length() < 1e-4);
        }
    }

    #[test]
    fn temperature_is_clamped_and_non_increasing() {
        let nodes = [node("a", 1.0), node("b", 1.0)];
        let mut sim = Simulation::new(&nodes, &[], BOUNDS, 3);
        assert_eq!(sim.alpha(), 1.0);

        let mut previous = sim.alpha();
        for _ in 0..400 {
            sim.step();
            let alpha = sim.alpha();
            assert!((0.0..=1.0).contains(&alpha));
            assert!(alpha <= previous);
            previous = alpha;
        }
        assert!(sim.alpha() <= 0.001);

        sim.reheat(DRAG_REHEAT);
        assert_eq!(sim.alpha(), DRAG_REHEAT);
        sim.reheat(0.1);
        assert_eq!(sim.alpha(), DRAG_REHEAT);
        sim.reheat(5.0);
        assert_eq!(sim.alpha(), 1.0);
    }

    #[test]
    fn releasing_a_drag_frees_the_node_within_one_step() {
        let nodes = [node("a", 9.0), node("b", 9.0)];
        let links = [link("a", "b", 4.0)];
        let mut sim = Simulation::new(&nodes, &links, BOUNDS, 11);

        let pin_at = vec2(210.0, -140.0);
        sim.pin(0, pin_at);
        sim.reheat(DRAG_REHEAT);
        sim.step();
        assert_eq!(sim.nodes[0].pos, pin_at);
        assert_eq!(sim.nodes[0].vel, Vec2::ZERO);

        sim.unpin(0);
        assert!(sim.nodes[0].pinned.is_none());
        sim.step();
        assert_ne!(sim.nodes[0].pos, pin_at);
    }

    #[test]
    fn zero_edge_layout_converges_without_overlap() {
        let nodes = (0..8)
            .map(|n| node(&format!("n{n}"), 30.0 + (n as f32) * 25.0))
            .collect::<Vec<_>>();
        let mut sim = Simulation::new(&nodes, &[], BOUNDS, 21);
        settle(&mut sim);

        for i in 0..sim.nodes.len() {
            for j in (i + 1)..sim.nodes.len() {
                let distance = (sim.nodes[i].pos - sim.nodes[j].pos).length();
                let min_separation = sim.nodes[i].radius + sim.nodes[j].radius;
                assert!(
                    distance >= min_separation - 0.5,
                    "nodes {i} and {j} overlap: {distance} < {min_separation}"
                );
            }
        }
    }

    #[test]
    fn linked_pair_converges_near_rest_length() {
        // Upstream filtering already removed the weight-1 B-C edge; the core
        // sees three nodes and a single A-B link.
        let nodes = [node("a", 25.0), node("b", 16.0), node("c", 9.0)];
        let links = [link("a", "b", 5.0)];
        let mut sim = Simulation::new(&nodes, &links, BOUNDS, 5);
        settle(&mut sim);

        let pair_distance = (sim.nodes[0].pos - sim.nodes[1].pos).length();
        assert!(
            (pair_distance - LINK_DISTANCE).abs() < 20.0,
            "pair settled at {pair_distance}, expected near {LINK_DISTANCE}"
        );

        // C has no edges: repulsion plus centering keep it near the canvas
        // center rather than flinging it away.
        assert!(sim.nodes[2].pos.length() < 250.0);
    }

    #[test]
    fn zoom_and_pan_never_touch_world_coordinates() {
        let nodes = [node("a", 9.0), node("b", 4.0), node("c", 1.0)];
        let links = [link("a", "b", 2.0)];
        let mut sim = Simulation::new(&nodes, &links, BOUNDS, 17);
        for _ in 0..20 {
            sim.step();
        }

        let rect = Rect::from_min_size(Pos2::ZERO, BOUNDS);
        let before = sim.nodes.iter().map(|n| n.pos).collect::<Vec<_>>();

        sim.view.zoom_about(rect, Pos2::new(120.0, 300.0), 1.8);
        sim.view.pan_by(vec2(-45.0, 12.0));
        sim.view.zoom_about(rect, rect.center(), 0.4);

        for (node, original) in sim.nodes.iter().zip(&before) {
            assert_eq!(node.pos, *original);
        }
    }

    #[test]
    fn zoom_about_keeps_pointer_world_point_fixed() {
        let rect = Rect::from_min_size(Pos2::ZERO, BOUNDS);
        let pointer = Pos2::new(250.0, 410.0);
        let mut view = ViewTransform::default();

        let world_before = view.screen_to_world(rect, pointer);
        view.zoom_about(rect, pointer, 2.5);
        let world_after = view.screen_to_world(rect, pointer);
        assert!((world_after - world_before).length() < 1e-3);
        assert_eq!(view.zoom, 2.5);

        // Zoom stays inside its documented extent.
        view.zoom_about(rect, pointer, 100.0);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.zoom_about(rect, pointer, 1e-6);
        assert_eq!(view.zoom, MIN_ZOOM);
    }
}
