//! Scriptable liveness probe for tests. Unknown pids are reported dead.

use std::collections::HashMap;
use std::sync::Mutex;

use super::liveness::{Liveness, LivenessProbe};

#[derive(Debug, Default)]
pub(crate) struct FakeProbe {
    states: Mutex<HashMap<u32, Liveness>>,
    calls: Mutex<HashMap<u32, usize>>,
}

impl FakeProbe {
    pub(crate) fn set(&self, pid: u32, liveness: Liveness) {
        self.states.lock().unwrap().insert(pid, liveness);
    }

    pub(crate) fn spawn_owner(&self, pid: u32) {
        self.set(pid, Liveness::Alive);
    }

    pub(crate) fn kill(&self, pid: u32) {
        self.set(pid, Liveness::Dead);
    }

    pub(crate) fn calls(&self, pid: u32) -> usize {
        self.calls.lock().unwrap().get(&pid).copied().unwrap_or(0)
    }
}

impl LivenessProbe for FakeProbe {
    fn probe(&self, pid: u32) -> Liveness {
        *self.calls.lock().unwrap().entry(pid).or_default() += 1;
        self.states
            .lock()
            .unwrap()
            .get(&pid)
            .cloned()
            .unwrap_or(Liveness::Dead)
    }
}
