//! Force-directed layout solver.
//!
//! Bodies live in a flat arena indexed by insertion order. Only the methods
//! on [`Simulation`] move them; renderers read positions between ticks.

use serde::Deserialize;

const MIN_DISTANCE: f64 = 0.1;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
	/// Pairwise repulsion; force falls off with `1 / distance`.
	pub force_charge: f64,
	/// Spring stiffness along links.
	pub force_spring: f64,
	/// Rest length of link springs.
	pub spring_length: f64,
	/// Pull of every body toward the layout center.
	pub force_gravity: f64,
	/// Upper bound on the net force applied to one body per tick.
	pub force_max: f64,
	pub node_speed: f64,
	/// Fraction of velocity kept after each tick.
	pub damping_factor: f64,
	/// Largest per-tick displacement still counted as motion.
	pub rest_threshold: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			spring_length: 30.0,
			force_gravity: 0.02,
			force_max: 100.0,
			node_speed: 300.0,
			damping_factor: 0.9,
			rest_threshold: 0.01,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	pub x: f64,
	pub y: f64,
	vx: f64,
	vy: f64,
	/// Anchored bodies ignore forces; they only move through `set_position`.
	pub anchored: bool,
}

impl Body {
	fn at(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			..Default::default()
		}
	}
}

pub struct Simulation {
	params: SimulationParameters,
	bodies: Vec<Body>,
	springs: Vec<(usize, usize)>,
	center: (f64, f64),
	forces: Vec<(f64, f64)>,
	settled: bool,
	generation: u64,
}

impl Simulation {
	pub fn new(params: SimulationParameters, center: (f64, f64)) -> Self {
		Self {
			params,
			bodies: Vec::new(),
			springs: Vec::new(),
			center,
			forces: Vec::new(),
			settled: false,
			generation: 0,
		}
	}

	/// Add a body at an explicit position and return its arena index.
	pub fn add_body(&mut self, x: f64, y: f64) -> usize {
		self.bodies.push(Body::at(x, y));
		self.touch();
		self.bodies.len() - 1
	}

	/// Add a body on a ring around the center. Successive bodies get
	/// distinct angles and radii so no two start on top of each other.
	pub fn add_body_on_ring(&mut self, ring_index: usize, ring_size: usize) -> usize {
		let n = ring_size.max(1) as f64;
		let i = ring_index as f64;
		let angle = (i + 0.25 * (i * GOLDEN_ANGLE).sin()) * 2.0 * std::f64::consts::PI / n;
		let radius = self.params.spring_length * (1.0 + n.sqrt()) + (i * GOLDEN_ANGLE).cos() * 5.0;
		self.add_body(
			self.center.0 + radius * angle.cos(),
			self.center.1 + radius * angle.sin(),
		)
	}

	/// Connect two bodies with a spring. Unknown indices and self-loops are ignored.
	pub fn add_spring(&mut self, a: usize, b: usize) {
		if a == b || a >= self.bodies.len() || b >= self.bodies.len() {
			return;
		}
		self.springs.push((a, b));
		self.wake();
	}

	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	pub fn position(&self, index: usize) -> Option<(f64, f64)> {
		self.bodies.get(index).map(|b| (b.x, b.y))
	}

	pub fn params(&self) -> &SimulationParameters {
		&self.params
	}

	pub fn is_settled(&self) -> bool {
		self.settled
	}

	/// Changes whenever any body moved; lets readers cache derived data.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn wake(&mut self) {
		self.settled = false;
	}

	pub fn set_center(&mut self, x: f64, y: f64) {
		if self.center != (x, y) {
			self.center = (x, y);
			self.wake();
		}
	}

	/// Move a body and anchor it there (used while dragging).
	pub fn set_position(&mut self, index: usize, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(index) {
			*body = Body {
				x,
				y,
				vx: 0.0,
				vy: 0.0,
				anchored: true,
			};
			self.touch();
		}
	}

	/// Hand an anchored body back to the solver.
	pub fn release(&mut self, index: usize) {
		if let Some(body) = self.bodies.get_mut(index) {
			body.anchored = false;
			self.wake();
		}
	}

	fn touch(&mut self) {
		self.generation = self.generation.wrapping_add(1);
		self.settled = false;
	}

	/// Advance by `dt` seconds. Returns whether anything moved.
	pub fn tick(&mut self, dt: f64) -> bool {
		if self.settled || self.bodies.is_empty() {
			return false;
		}

		self.accumulate_forces();

		let p = &self.params;
		let max_sq = p.force_max * p.force_max;
		let mut max_step = 0.0_f64;
		for (body, &(fx, fy)) in self.bodies.iter_mut().zip(&self.forces) {
			if body.anchored {
				continue;
			}
			let (mut fx, mut fy) = (fx, fy);
			let f_sq = fx * fx + fy * fy;
			if !f_sq.is_finite() {
				(fx, fy) = (0.0, 0.0);
			} else if f_sq > max_sq {
				let scale = p.force_max / f_sq.sqrt();
				(fx, fy) = (fx * scale, fy * scale);
			}

			body.vx = (body.vx + fx * p.node_speed * dt) * p.damping_factor;
			body.vy = (body.vy + fy * p.node_speed * dt) * p.damping_factor;
			let (sx, sy) = (body.vx * dt, body.vy * dt);
			if !(sx.is_finite() && sy.is_finite()) {
				body.vx = 0.0;
				body.vy = 0.0;
				continue;
			}
			body.x += sx;
			body.y += sy;
			max_step = max_step.max((sx * sx + sy * sy).sqrt());
		}

		if max_step < self.params.rest_threshold {
			self.settled = true;
		}
		if max_step > 0.0 {
			self.generation = self.generation.wrapping_add(1);
			true
		} else {
			false
		}
	}

	fn accumulate_forces(&mut self) {
		let n = self.bodies.len();
		self.forces.clear();
		self.forces.resize(n, (0.0, 0.0));
		let p = &self.params;

		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (&self.bodies[i], &self.bodies[j]);
				let (mut dx, mut dy) = (a.x - b.x, a.y - b.y);
				let mut dist = (dx * dx + dy * dy).sqrt();
				if dist < MIN_DISTANCE {
					// Coincident bodies: push apart along a per-pair direction.
					let angle = (i * n + j) as f64 * GOLDEN_ANGLE;
					(dx, dy) = (angle.cos() * MIN_DISTANCE, angle.sin() * MIN_DISTANCE);
					dist = MIN_DISTANCE;
				}
				let f = p.force_charge / dist;
				let (fx, fy) = (dx / dist * f, dy / dist * f);
				self.forces[i].0 += fx;
				self.forces[i].1 += fy;
				self.forces[j].0 -= fx;
				self.forces[j].1 -= fy;
			}
		}

		for &(a, b) in &self.springs {
			let (ba, bb) = (&self.bodies[a], &self.bodies[b]);
			let (dx, dy) = (bb.x - ba.x, bb.y - ba.y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < f64::EPSILON {
				continue;
			}
			let f = p.force_spring * (dist - p.spring_length);
			let (fx, fy) = (dx / dist * f, dy / dist * f);
			self.forces[a].0 += fx;
			self.forces[a].1 += fy;
			self.forces[b].0 -= fx;
			self.forces[b].1 -= fy;
		}

		for (force, body) in self.forces.iter_mut().zip(&self.bodies) {
			force.0 -= (body.x - self.center.0) * p.force_gravity;
			force.1 -= (body.y - self.center.1) * p.force_gravity;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const DT: f64 = 0.016;

	fn run(sim: &mut Simulation, ticks: usize) {
		for _ in 0..ticks {
			sim.tick(DT);
		}
	}

	fn distance(sim: &Simulation, a: usize, b: usize) -> f64 {
		let (pa, pb) = (sim.position(a).unwrap(), sim.position(b).unwrap());
		((pa.0 - pb.0).powi(2) + (pa.1 - pb.1).powi(2)).sqrt()
	}

	#[test]
	fn lone_body_drifts_to_center_and_settles() {
		let mut sim = Simulation::new(SimulationParameters::default(), (400.0, 300.0));
		sim.add_body(600.0, 100.0);

		run(&mut sim, 5000);
		let (x, y) = sim.position(0).unwrap();
		assert!((x - 400.0).abs() < 1.0, "x = {x}");
		assert!((y - 300.0).abs() < 1.0, "y = {y}");
		assert!(sim.is_settled());
		assert!(!sim.tick(DT));
	}

	#[test]
	fn linked_bodies_end_closer_than_unlinked() {
		let params = SimulationParameters::default();
		let mut linked = Simulation::new(params.clone(), (0.0, 0.0));
		let mut apart = Simulation::new(params, (0.0, 0.0));
		for sim in [&mut linked, &mut apart] {
			sim.add_body(-200.0, 0.0);
			sim.add_body(200.0, 0.0);
		}
		linked.add_spring(0, 1);

		run(&mut linked, 3000);
		run(&mut apart, 3000);
		assert!(distance(&linked, 0, 1) < distance(&apart, 0, 1));
		assert!(distance(&linked, 0, 1) > linked.params().spring_length);
	}

	#[test]
	fn repulsion_separates_coincident_bodies() {
		let mut sim = Simulation::new(SimulationParameters::default(), (0.0, 0.0));
		sim.add_body(0.0, 0.0);
		sim.add_body(0.0, 0.0);

		run(&mut sim, 200);
		assert!(distance(&sim, 0, 1) > 1.0);
	}

	#[test]
	fn self_loop_is_inert() {
		let mut sim = Simulation::new(SimulationParameters::default(), (0.0, 0.0));
		sim.add_body(10.0, 10.0);
		sim.add_spring(0, 0);
		sim.add_spring(0, 7);

		run(&mut sim, 500);
		let (x, y) = sim.position(0).unwrap();
		assert!(x.is_finite() && y.is_finite());
	}

	#[test]
	fn anchored_body_stays_put_until_released() {
		let mut sim = Simulation::new(SimulationParameters::default(), (0.0, 0.0));
		sim.add_body(0.0, 0.0);
		sim.add_body(50.0, 0.0);
		sim.add_spring(0, 1);
		sim.set_position(1, 300.0, 300.0);

		run(&mut sim, 100);
		assert_eq!(sim.position(1), Some((300.0, 300.0)));

		sim.release(1);
		run(&mut sim, 100);
		assert_ne!(sim.position(1), Some((300.0, 300.0)));
	}

	#[test]
	fn perturbing_a_settled_layout_wakes_it() {
		let mut sim = Simulation::new(SimulationParameters::default(), (0.0, 0.0));
		sim.add_body(0.0, 0.0);
		run(&mut sim, 10);
		assert!(sim.is_settled());

		let before = sim.generation();
		sim.set_position(0, 40.0, 0.0);
		sim.release(0);
		assert!(!sim.is_settled());
		assert!(sim.tick(DT));
		assert!(sim.generation() > before);
	}

	#[test]
	fn moving_the_center_pulls_the_layout_along() {
		let mut sim = Simulation::new(SimulationParameters::default(), (0.0, 0.0));
		sim.add_body(0.0, 0.0);
		run(&mut sim, 10);
		assert!(sim.is_settled());

		sim.set_center(100.0, -50.0);
		run(&mut sim, 5000);
		let (x, y) = sim.position(0).unwrap();
		assert!((x - 100.0).abs() < 1.0 && (y + 50.0).abs() < 1.0);
	}

	#[test]
	fn ring_placement_never_overlaps() {
		let mut sim = Simulation::new(SimulationParameters::default(), (0.0, 0.0));
		for i in 0..50 {
			sim.add_body_on_ring(i, 50);
		}
		for a in 0..50 {
			for b in (a + 1)..50 {
				assert!(distance(&sim, a, b) > 1.0);
			}
		}
	}
}
