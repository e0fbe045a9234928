//! Interaction controller: owns the escalation state and drives the page
//! through the [`Surface`] boundary.
//!
//! Flow per event:
//! - evasive trigger: escalate, swap text/image, shake for a moment, grow Yes, move No
//! - affirmative trigger: reveal the completion panel and launch confetti
//! - resize: reclassify the viewport and rebind the No button's trigger event
//!
//! All timing goes through a [`Scheduler`]; deferred work comes back in via
//! [`Controller::run_task`].

use crate::celebration::{FallKeyframes, Particle, PARTICLE_CLASS};
use crate::config::{ConfigError, WidgetConfig};
use crate::escalation::{EscalationStep, InteractionState, Phase};
use crate::geometry::{Bounds, Point, ViewportMode, classify_viewport, compute_evasive_position, initial_position};
use crate::rng::RandomSource;
use crate::schedule::{ParticleId, Scheduler, Task, VirtualScheduler};
use tracing::{debug, info};

/// DOM event the No button listens on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputBinding {
    /// `click`, default action prevented.
    Tap,
    /// `mouseenter`.
    Hover,
}

impl InputBinding {
    pub fn for_mode(mode: ViewportMode) -> Self {
        match mode {
            ViewportMode::Compact => InputBinding::Tap,
            ViewportMode::Desktop => InputBinding::Hover,
        }
    }

    pub fn event_name(self) -> &'static str {
        match self {
            InputBinding::Tap => "click",
            InputBinding::Hover => "mouseenter",
        }
    }

    pub fn prevents_default(self) -> bool {
        matches!(self, InputBinding::Tap)
    }
}

/// Which page element a class toggle targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Image,
    CompletionPanel,
}

/// The presentation boundary. Implemented over `web-sys` for the browser and
/// by recording fakes in tests.
pub trait Surface {
    fn viewport_width(&self) -> f64;
    fn container_bounds(&self) -> Bounds;
    fn evasive_bounds(&self) -> Bounds;

    fn set_message(&mut self, text: &str);
    fn set_image(&mut self, src: &str);
    fn set_class(&mut self, target: Target, class: &str, on: bool);
    fn grow_affirmative(&mut self, scale: f64, font_rem: f64);
    fn place_evasive(&mut self, at: Point);

    fn install_style(&mut self, css: &str);
    /// Adds a confetti piece; returns `false` if the page could not host it.
    fn spawn_particle(&mut self, id: ParticleId, class: &str, css: &str) -> bool;
    fn remove_particle(&mut self, id: ParticleId);

    fn bind_evasive(&mut self, binding: InputBinding);
    fn unbind_evasive(&mut self, binding: InputBinding);
}

pub struct Controller<S: Surface, Q: Scheduler, R: RandomSource> {
    surface: S,
    scheduler: Q,
    rng: R,
    config: WidgetConfig,
    state: InteractionState,
    mode: ViewportMode,
    keyframes: FallKeyframes,
    next_particle: u32,
    live_particles: u32,
}

impl<S: Surface, Q: Scheduler, R: RandomSource> Controller<S, Q, R> {
    /// Validates `config`, injects the confetti keyframes and binds the No
    /// button for the current viewport.
    pub fn new(surface: S, scheduler: Q, mut rng: R, config: WidgetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mode = classify_viewport(surface.viewport_width(), config.compact_max_width);
        let keyframes = FallKeyframes::random(&mut rng);
        let mut ctrl = Self {
            surface,
            scheduler,
            rng,
            config,
            state: InteractionState::new(mode.is_compact()),
            mode,
            keyframes,
            next_particle: 0,
            live_particles: 0,
        };
        ctrl.surface.install_style(&ctrl.keyframes.css_rule());
        ctrl.surface.bind_evasive(InputBinding::for_mode(mode));
        debug!(?mode, "widget initialised");
        Ok(ctrl)
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    pub fn binding(&self) -> InputBinding {
        InputBinding::for_mode(self.mode)
    }

    pub fn keyframes(&self) -> FallKeyframes {
        self.keyframes
    }

    pub fn live_particles(&self) -> u32 {
        self.live_particles
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &Q {
        &self.scheduler
    }

    /// Switches input mode, unbinding the old trigger before binding the new one.
    /// Returns whether anything changed.
    pub fn set_mode(&mut self, mode: ViewportMode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.surface.unbind_evasive(InputBinding::for_mode(self.mode));
        self.surface.bind_evasive(InputBinding::for_mode(mode));
        self.mode = mode;
        self.state.set_compact(mode.is_compact());
        debug!(?mode, "viewport mode changed");
        true
    }

    /// Window `resize`: reclassify and rebind if the threshold was crossed.
    pub fn on_resize(&mut self) -> bool {
        let mode = classify_viewport(self.surface.viewport_width(), self.config.compact_max_width);
        self.set_mode(mode)
    }

    /// Window `load`: park the No button right of centre on the top edge.
    pub fn on_load(&mut self) {
        let at = initial_position(self.surface.container_bounds(), self.config.initial_offset_x);
        self.surface.place_evasive(at);
    }

    /// Event arriving from the No button through `binding`. Events from a
    /// binding that is no longer active are dropped.
    pub fn handle_evasive(&mut self, binding: InputBinding) -> bool {
        if binding != self.binding() {
            debug!(event = binding.event_name(), "ignoring event from inactive binding");
            return false;
        }
        self.on_evasive_trigger()
    }

    /// One "No": escalate and update the page.
    ///
    /// Once the Yes button has been pressed the interaction is over: further
    /// triggers return `false` and leave the counter and page untouched, even
    /// though the No button may still receive events.
    pub fn on_evasive_trigger(&mut self) -> bool {
        if self.state.phase() == Phase::Completed {
            return false;
        }
        let count = self.state.escalate();
        let step = EscalationStep::for_count(count, &self.config.messages, &self.config.images);
        if let Some(text) = &step.message {
            self.surface.set_message(text);
        }
        if let Some(src) = &step.image {
            self.surface.set_image(src);
        }
        self.surface.set_class(Target::Image, &self.config.shake_class, true);
        self.scheduler.schedule(self.config.shake_ms, Task::ClearShake);
        if step.distressed {
            self.surface.set_class(Target::Image, &self.config.distressed_class, true);
        }
        self.surface.grow_affirmative(step.yes_scale, step.yes_font_rem);
        self.move_evasive();
        debug!(count, "escalated");
        true
    }

    /// Relocates the No button to a random spot inside the container.
    pub fn move_evasive(&mut self) -> Point {
        let padding = self.config.padding(self.mode);
        let at = compute_evasive_position(
            self.surface.container_bounds(),
            self.surface.evasive_bounds(),
            padding,
            &mut self.rng,
        );
        self.surface.place_evasive(at);
        at
    }

    /// The "Yes": show the completion panel and celebrate.
    pub fn on_affirmative_trigger(&mut self) {
        self.state.complete();
        self.surface.set_class(Target::CompletionPanel, &self.config.hidden_class, false);
        self.launch_celebration();
    }

    /// Schedules a staggered burst of confetti. Returns how many spawns were queued.
    pub fn launch_celebration(&mut self) -> u32 {
        let burst = self.config.burst();
        for i in 0..burst.count {
            let id = ParticleId(self.next_particle);
            self.next_particle = self.next_particle.wrapping_add(1);
            let particle = Particle::random(&self.config.palette, &mut self.rng);
            self.scheduler.schedule(burst.spawn_delay(i), Task::SpawnParticle(id, particle));
        }
        info!(count = burst.count, total_ms = burst.total_ms(), "celebration launched");
        burst.count
    }

    /// Runs a task handed back by the scheduler.
    pub fn run_task(&mut self, task: Task) {
        match task {
            Task::ClearShake => {
                self.surface.set_class(Target::Image, &self.config.shake_class, false);
            }
            Task::SpawnParticle(id, particle) => {
                // nothing to clean up for a piece the page refused
                if self.surface.spawn_particle(id, PARTICLE_CLASS, &particle.css_text()) {
                    self.live_particles += 1;
                    self.scheduler.schedule(self.config.particle_lifetime_ms, Task::RemoveParticle(id));
                }
            }
            Task::RemoveParticle(id) => {
                self.surface.remove_particle(id);
                self.live_particles = self.live_particles.saturating_sub(1);
            }
        }
    }
}

impl<S: Surface, R: RandomSource> Controller<S, VirtualScheduler, R> {
    /// Moves virtual time forward by `ms`, running every task that falls due,
    /// including tasks scheduled by those tasks.
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now_ms() + ms;
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task);
        }
        self.scheduler.settle(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRandom;

    #[derive(Default)]
    struct Page {
        width: f64,
        bound: Vec<InputBinding>,
        binds: u32,
        unbinds: u32,
        image_classes: Vec<String>,
        panel_hidden: bool,
        placed: Vec<Point>,
        particles: Vec<ParticleId>,
        refuse_particles: bool,
    }

    impl Surface for Page {
        fn viewport_width(&self) -> f64 {
            self.width
        }
        fn container_bounds(&self) -> Bounds {
            Bounds::new(300.0, 120.0)
        }
        fn evasive_bounds(&self) -> Bounds {
            Bounds::new(80.0, 40.0)
        }
        fn set_message(&mut self, _text: &str) {}
        fn set_image(&mut self, _src: &str) {}
        fn set_class(&mut self, target: Target, class: &str, on: bool) {
            match target {
                Target::Image => {
                    self.image_classes.retain(|c| c != class);
                    if on {
                        self.image_classes.push(class.to_string());
                    }
                }
                Target::CompletionPanel => self.panel_hidden = on,
            }
        }
        fn grow_affirmative(&mut self, _scale: f64, _font_rem: f64) {}
        fn place_evasive(&mut self, at: Point) {
            self.placed.push(at);
        }
        fn install_style(&mut self, _css: &str) {}
        fn spawn_particle(&mut self, id: ParticleId, _class: &str, _css: &str) -> bool {
            if self.refuse_particles {
                return false;
            }
            self.particles.push(id);
            true
        }
        fn remove_particle(&mut self, id: ParticleId) {
            self.particles.retain(|p| *p != id);
        }
        fn bind_evasive(&mut self, binding: InputBinding) {
            self.binds += 1;
            self.bound.push(binding);
        }
        fn unbind_evasive(&mut self, binding: InputBinding) {
            self.unbinds += 1;
            self.bound.retain(|b| *b != binding);
        }
    }

    fn controller(width: f64) -> Controller<Page, VirtualScheduler, SeededRandom> {
        let page = Page { width, panel_hidden: true, ..Default::default() };
        Controller::new(page, VirtualScheduler::new(), SeededRandom::new(1), WidgetConfig::default()).unwrap()
    }

    #[test]
    fn binds_once_for_initial_mode() {
        let c = controller(1024.0);
        assert_eq!(c.surface().bound, vec![InputBinding::Hover]);
        let c = controller(600.0);
        assert_eq!(c.surface().bound, vec![InputBinding::Tap]);
        assert!(c.state().is_compact());
    }

    #[test]
    fn set_mode_is_idempotent() {
        let mut c = controller(1024.0);
        assert!(!c.set_mode(ViewportMode::Desktop));
        assert!(c.set_mode(ViewportMode::Compact));
        assert!(!c.set_mode(ViewportMode::Compact));
        assert_eq!(c.surface().bound, vec![InputBinding::Tap]);
        assert_eq!((c.surface().binds, c.surface().unbinds), (2, 1));
    }

    #[test]
    fn stale_binding_is_ignored() {
        let mut c = controller(1024.0);
        assert!(!c.handle_evasive(InputBinding::Tap));
        assert_eq!(c.state().escalation_count(), 0);
        assert!(c.handle_evasive(InputBinding::Hover));
        assert_eq!(c.state().escalation_count(), 1);
    }

    #[test]
    fn shake_clears_after_one_second() {
        let mut c = controller(1024.0);
        c.on_evasive_trigger();
        assert!(c.surface().image_classes.contains(&"shake".to_string()));
        assert!(c.surface().image_classes.contains(&"sad".to_string()));
        c.advance(999);
        assert!(c.surface().image_classes.contains(&"shake".to_string()));
        c.advance(1);
        assert_eq!(c.surface().image_classes, vec!["sad".to_string()]);
    }

    #[test]
    fn load_places_button_right_of_centre() {
        let mut c = controller(1024.0);
        c.on_load();
        assert_eq!(c.surface().placed, vec![Point { x: 200.0, y: 0.0 }]);
    }

    #[test]
    fn completed_ignores_evasive() {
        let mut c = controller(1024.0);
        c.on_evasive_trigger();
        c.on_affirmative_trigger();
        assert_eq!(c.phase(), Phase::Completed);
        assert!(!c.surface().panel_hidden);
        assert!(!c.on_evasive_trigger());
        assert_eq!(c.state().escalation_count(), 1);
    }

    #[test]
    fn binding_follows_viewport_mode() {
        let tap = InputBinding::for_mode(ViewportMode::Compact);
        assert_eq!(tap, InputBinding::Tap);
        assert_eq!(tap.event_name(), "click");
        assert!(tap.prevents_default());

        let hover = InputBinding::for_mode(ViewportMode::Desktop);
        assert_eq!(hover, InputBinding::Hover);
        assert_eq!(hover.event_name(), "mouseenter");
        assert!(!hover.prevents_default());
    }

    #[test]
    fn refused_particles_are_not_counted() {
        let mut c = controller(1024.0);
        c.surface_mut().refuse_particles = true;
        c.on_affirmative_trigger();
        c.advance(c.config().burst().total_ms() as u64);
        assert_eq!(c.live_particles(), 0);
        assert_eq!(c.scheduler().pending(), 0);
    }

    #[test]
    fn confetti_lives_five_seconds() {
        let mut c = controller(1024.0);
        c.on_affirmative_trigger();
        c.advance(0);
        assert_eq!(c.live_particles(), 1);
        c.advance(1980);
        assert_eq!(c.live_particles(), 100);
        c.advance(3020);
        // particle 0 spawned at t=0 is gone at t=5000
        assert_eq!(c.live_particles(), 99);
        c.advance((c.config().burst().total_ms() - 5000) as u64);
        assert_eq!(c.live_particles(), 0);
        assert!(c.surface().particles.is_empty());
    }
}
