use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Timing (and, with the `cli` feature, resident memory) of one engine phase.
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: &'static str,
    pub elapsed: Duration,
    pub memory_mb: Option<u64>,
}

pub struct RunMonitor {
    enabled: bool,
    started: Instant,
    phase_started: Instant,
    phases: Vec<PhaseStats>,
    #[cfg(feature = "cli")]
    system: Option<(System, Pid)>,
}

impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            started: now,
            phase_started: now,
            phases: Vec::new(),
            #[cfg(feature = "cli")]
            system: if enabled {
                sysinfo::get_current_pid().ok().map(|pid| (System::new(), pid))
            } else {
                None
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(feature = "cli")]
    fn memory_mb(&mut self) -> Option<u64> {
        let (system, pid) = self.system.as_mut()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[*pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        system.process(*pid).map(|p| p.memory() / 1024 / 1024)
    }

    #[cfg(not(feature = "cli"))]
    fn memory_mb(&mut self) -> Option<u64> {
        None
    }

    /// Closes the current phase and starts timing the next one.
    pub fn finish_phase(&mut self, phase: &'static str) {
        if !self.enabled {
            return;
        }
        let elapsed = self.phase_started.elapsed();
        let memory_mb = self.memory_mb();
        match memory_mb {
            Some(mb) => tracing::info!("📊 {} - {:?}, memory {}MB", phase, elapsed, mb),
            None => tracing::info!("📊 {} - {:?}", phase, elapsed),
        }
        self.phases.push(PhaseStats {
            phase,
            elapsed,
            memory_mb,
        });
        self.phase_started = Instant::now();
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let peak = self.phases.iter().filter_map(|p| p.memory_mb).max();
        match peak {
            Some(mb) => tracing::info!(
                "📊 Total time {:?}, peak memory {}MB",
                self.started.elapsed(),
                mb
            ),
            None => tracing::info!("📊 Total time {:?}", self.started.elapsed()),
        }
    }

    pub fn phases(&self) -> &[PhaseStats] {
        &self.phases
    }
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
