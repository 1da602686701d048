//! Convergence control and frame scheduling for the force simulation.
//!
//! The host calls back once per display refresh. Every callback carries the
//! [`FrameToken`] it was armed with; re-arming bumps the generation so callbacks
//! queued by an earlier loop find themselves stale and do nothing. Only one
//! loop can therefore mutate the positions at a time.

use super::force::ForceParams;

/// Identifies the armed simulation loop a frame callback belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameToken(u64);

/// What a frame callback should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameAction {
	/// Take a step, render, and request another frame.
	Step,
	/// Take a final step and render, but do not request another frame.
	Finish,
	/// The callback is stale or the loop is stopped.
	Skip,
}

#[derive(Clone, Debug)]
pub struct Simulation {
	alpha: f64,
	running: bool,
	generation: u64,
	alpha_decay: f64,
	alpha_min: f64,
}

impl Simulation {
	pub fn new(params: &ForceParams) -> Self {
		Self {
			alpha: params.alpha_min,
			running: false,
			generation: 0,
			alpha_decay: params.alpha_decay,
			alpha_min: params.alpha_min,
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Resets alpha to 1, marks the loop running and invalidates older tokens.
	pub fn arm(&mut self) -> FrameToken {
		self.alpha = 1.0;
		self.running = true;
		self.generation += 1;
		FrameToken(self.generation)
	}

	/// Stops the loop and invalidates every outstanding token.
	pub fn cancel(&mut self) {
		self.running = false;
		self.generation += 1;
	}

	pub fn is_current(&self, token: FrameToken) -> bool {
		token.0 == self.generation
	}

	/// Decides a frame callback's fate and, for live callbacks, decays alpha.
	pub fn on_frame(&mut self, token: FrameToken) -> FrameAction {
		if !self.running || !self.is_current(token) {
			return FrameAction::Skip;
		}
		self.alpha = (self.alpha - self.alpha_decay).max(self.alpha_min);
		if self.alpha > self.alpha_min {
			FrameAction::Step
		} else {
			self.running = false;
			FrameAction::Finish
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run_to_end(sim: &mut Simulation, token: FrameToken) -> usize {
		let mut steps = 0;
		loop {
			match sim.on_frame(token) {
				FrameAction::Step => steps += 1,
				FrameAction::Finish => return steps + 1,
				FrameAction::Skip => return steps,
			}
		}
	}

	#[test]
	fn starts_idle() {
		let sim = Simulation::new(&ForceParams::default());
		assert!(!sim.is_running());
	}

	#[test]
	fn converges_in_fixed_number_of_steps() {
		let mut sim = Simulation::new(&ForceParams::default());
		let token = sim.arm();

		assert_eq!(run_to_end(&mut sim, token), 44);
		assert!(!sim.is_running());
		assert_eq!(sim.alpha(), 0.001);
		assert_eq!(sim.on_frame(token), FrameAction::Skip);
	}

	#[test]
	fn alpha_decays_monotonically() {
		let mut sim = Simulation::new(&ForceParams::default());
		let token = sim.arm();
		let mut last = sim.alpha();
		while sim.on_frame(token) != FrameAction::Skip {
			assert!(sim.alpha() < last || sim.alpha() == 0.001);
			last = sim.alpha();
		}
	}

	#[test]
	fn rearming_makes_old_callbacks_stale() {
		let mut sim = Simulation::new(&ForceParams::default());
		let first = sim.arm();
		sim.on_frame(first);
		let second = sim.arm();

		assert_eq!(sim.on_frame(first), FrameAction::Skip);
		assert_eq!(sim.alpha(), 1.0);
		assert_eq!(sim.on_frame(second), FrameAction::Step);
	}

	#[test]
	fn cancel_stops_the_loop() {
		let mut sim = Simulation::new(&ForceParams::default());
		let token = sim.arm();
		sim.cancel();

		assert!(!sim.is_running());
		assert_eq!(sim.on_frame(token), FrameAction::Skip);
	}
}
