/// System lifecycle.
///
/// A system runs `pre_update`, `update` and `post_update` once per tick
/// against a context it borrows for the tick. `ScheduledSystem` adds the
/// per-system settings: an update interval, an enable switch and a
/// priority used to order systems.

/// A per-frame system working on a context of type `Ctx`.
pub trait System<Ctx: ?Sized> {
    /// Name used in logs
    fn name(&self) -> &str;

    fn pre_update(&mut self, _ctx: &mut Ctx, _dt: f32) {}

    fn update(&mut self, ctx: &mut Ctx, dt: f32);

    fn post_update(&mut self, _ctx: &mut Ctx, _dt: f32) {}
}

/// Scheduling settings of one system
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSettings {
    /// Minimum time between two updates in seconds (0 = every tick)
    pub update_interval: f32,
    pub enabled: bool,
    /// Higher runs first
    pub priority: u16,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            update_interval: 0.0,
            enabled: true,
            priority: 0,
        }
    }
}

/// A system plus its scheduling state.
pub struct ScheduledSystem<S> {
    system: S,
    settings: SystemSettings,
    /// Time accumulated since the last update
    pending: f32,
}

impl<S> ScheduledSystem<S> {
    pub fn new(system: S, settings: SystemSettings) -> Self {
        Self {
            system,
            settings,
            pending: 0.0,
        }
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut S {
        &mut self.system
    }

    pub fn settings(&self) -> &SystemSettings {
        &self.settings
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
    }

    pub fn set_update_interval(&mut self, interval: f32) {
        self.settings.update_interval = interval;
    }

    pub fn priority(&self) -> u16 {
        self.settings.priority
    }

    /// Advance by `dt` and run the system if its interval has elapsed.
    ///
    /// The system receives the whole time accumulated since its previous
    /// run. A disabled system neither runs nor accumulates time.
    /// Returns whether the system ran.
    pub fn tick<Ctx: ?Sized>(&mut self, ctx: &mut Ctx, dt: f32) -> bool
    where
        S: System<Ctx>,
    {
        if !self.settings.enabled {
            return false;
        }

        self.pending += dt;
        if self.pending < self.settings.update_interval {
            return false;
        }

        let elapsed = std::mem::take(&mut self.pending);
        self.system.pre_update(ctx, elapsed);
        self.system.update(ctx, elapsed);
        self.system.post_update(ctx, elapsed);
        true
    }
}

/// Sort systems so that higher priorities run first (stable for ties).
pub fn sort_by_priority<S>(systems: &mut [ScheduledSystem<S>]) {
    systems.sort_by(|a, b| b.priority().cmp(&a.priority()));
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
