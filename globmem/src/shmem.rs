//! An in-process engine: every unit is a thread, and every unit's
//! segment is a byte buffer shared by all threads of the launch.

use std::io;
use std::panic;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::thread;

use crate::address::GlobalAddress;
use crate::address::SegmentId;
use crate::address::TeamId;
use crate::address::UnitId;
use crate::config::ConfigError;
use crate::config::PgasConfig;
use crate::context::Context;
use crate::engine::AddressError;
use crate::engine::CommEngine;
use crate::engine::EngineError;
use crate::team::Team;

/// The segment every unit registers at launch.
pub const SHARED_SEGMENT: SegmentId = 0;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn unit thread: {0}")]
    Spawn(#[from] io::Error),
}

type Segments = Arc<[Mutex<Vec<u8>>]>;

/// The engine as seen from one unit.
pub struct SharedMemory {
    segments: Segments,
    segment_bytes: u64,
    team: TeamId,
    unit: UnitId,
}

impl SharedMemory {
    /// Run `f` once per unit, each on its own thread with its own
    /// [`Context`], and return the results in unit order.
    ///
    /// A panic on any unit is propagated to the caller once every unit
    /// has finished. A unit that panics marks the team as failed: its
    /// peers' barriers then fail instead of waiting for it, which is fatal
    /// on those units too.
    pub fn launch<R, F>(config: &PgasConfig, f: F) -> Result<Vec<R>, LaunchError>
    where
        R: Send,
        F: Fn(&Context) -> R + Sync,
    {
        pgas_telemetry::initialize_logging();
        config.validate()?;
        tracing::info!(
            units = config.units,
            segment_bytes = config.segment_bytes,
            team = config.team_id,
            "launching units"
        );

        let segments: Segments = config
            .unit_ids()
            .map(|_| Mutex::new(vec![0u8; config.segment_bytes]))
            .collect();
        let barrier = Arc::new(TeamBarrier::new(config.units));
        let f = &f;

        thread::scope(|scope| {
            let handles = config
                .unit_ids()
                .map(|unit| {
                    let engine = SharedMemory {
                        segments: Arc::clone(&segments),
                        segment_bytes: config.segment_bytes as u64,
                        team: config.team_id,
                        unit,
                    };
                    let team = LocalTeam {
                        id: config.team_id,
                        unit,
                        size: config.units,
                        barrier: Arc::clone(&barrier),
                    };
                    let guard = FailureGuard {
                        barrier: Arc::clone(&barrier),
                        unit,
                    };
                    thread::Builder::new()
                        .name(format!("pgas-unit-{}", unit))
                        .spawn_scoped(scope, move || {
                            let _guard = guard;
                            let ctx =
                                Context::new(Box::new(engine), Box::new(team), SHARED_SEGMENT);
                            tracing::debug!(unit, "unit started");
                            f(&ctx)
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let mut results = Vec::with_capacity(handles.len());
            for handle in handles {
                match handle.join() {
                    Ok(result) => results.push(result),
                    Err(payload) => panic::resume_unwind(payload),
                }
            }
            Ok(results)
        })
    }

    fn segment(&self, address: &GlobalAddress) -> Result<&Mutex<Vec<u8>>, EngineError> {
        if address.team_id() != self.team {
            return Err(EngineError::UnknownTeam {
                team: address.team_id(),
            });
        }
        if address.segment_id() != SHARED_SEGMENT {
            return Err(EngineError::UnknownSegment {
                segment: address.segment_id(),
            });
        }
        usize::try_from(address.unit_id())
            .ok()
            .and_then(|unit| self.segments.get(unit))
            .ok_or(EngineError::UnknownUnit {
                unit: address.unit_id(),
            })
    }

    /// Lock the segment `address` points into and hand `f` the byte range
    /// `[offset, offset + len)` of it.
    fn with_range<R>(
        &self,
        address: GlobalAddress,
        len: usize,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R, EngineError> {
        let mut segment = self
            .segment(&address)?
            .lock()
            .map_err(|_| EngineError::Poisoned {
                unit: address.unit_id(),
            })?;
        let size = self.segment_bytes;
        let range = usize::try_from(address.offset())
            .ok()
            .and_then(|start| Some(start..start.checked_add(len)?))
            .filter(|range| range.end <= segment.len())
            .ok_or(EngineError::OutOfBounds { address, len, size })?;
        Ok(f(&mut segment[range]))
    }
}

impl CommEngine for SharedMemory {
    fn get_blocking(&self, address: GlobalAddress, dest: &mut [u8]) -> Result<(), EngineError> {
        self.with_range(address, dest.len(), |bytes| dest.copy_from_slice(bytes))
    }

    fn put_blocking(&self, address: GlobalAddress, src: &[u8]) -> Result<(), EngineError> {
        self.with_range(address, src.len(), |bytes| bytes.copy_from_slice(src))
    }

    fn increment_address(
        &self,
        address: GlobalAddress,
        increment: i64,
    ) -> Result<GlobalAddress, AddressError> {
        if self.segment(&address).is_err() {
            return Err(AddressError::UnknownSegment { address });
        }
        let size = self.segment_bytes;
        let out_of_range = AddressError::OutOfRange {
            address,
            increment,
            size,
        };
        // One past the end is a valid address.
        let offset = i64::try_from(address.offset())
            .ok()
            .and_then(|offset| offset.checked_add(increment))
            .and_then(|offset| u64::try_from(offset).ok())
            .filter(|offset| *offset <= size)
            .ok_or(out_of_range)?;
        Ok(address.with_offset(offset))
    }

    fn resolve_local_unit(&self, team: TeamId) -> Result<UnitId, EngineError> {
        if team == self.team {
            Ok(self.unit)
        } else {
            Err(EngineError::UnknownTeam { team })
        }
    }
}

#[derive(Debug, Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    failed: Option<UnitId>,
}

/// A reusable barrier that stops waiting once any unit has failed.
#[derive(Debug)]
struct TeamBarrier {
    size: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl TeamBarrier {
    fn new(size: usize) -> Self {
        Self {
            size,
            state: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
        }
    }

    fn wait(&self, unit: UnitId) -> Result<(), EngineError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| EngineError::Poisoned { unit })?;
        if let Some(failed) = state.failed {
            return Err(EngineError::UnitFailed { unit: failed });
        }
        state.arrived += 1;
        if state.arrived == self.size {
            state.arrived = 0;
            state.generation += 1;
            self.released.notify_all();
            return Ok(());
        }
        let generation = state.generation;
        let state = self
            .released
            .wait_while(state, |state| {
                state.generation == generation && state.failed.is_none()
            })
            .map_err(|_| EngineError::Poisoned { unit })?;
        match state.failed {
            Some(failed) if state.generation == generation => {
                Err(EngineError::UnitFailed { unit: failed })
            }
            _ => Ok(()),
        }
    }

    /// Record that `unit` will never arrive again and wake every waiter.
    /// The first failure recorded is kept.
    fn fail(&self, unit: UnitId) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.failed.get_or_insert(unit);
        self.released.notify_all();
    }
}

/// Marks the team as failed when a unit's thread unwinds.
struct FailureGuard {
    barrier: Arc<TeamBarrier>,
    unit: UnitId,
}

impl Drop for FailureGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::error!(unit = self.unit, "unit failed");
            self.barrier.fail(self.unit);
        }
    }
}

/// The team formed by the units of one launch.
struct LocalTeam {
    id: TeamId,
    unit: UnitId,
    size: usize,
    barrier: Arc<TeamBarrier>,
}

impl Team for LocalTeam {
    fn id(&self) -> TeamId {
        self.id
    }

    fn my_unit_id(&self) -> UnitId {
        self.unit
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<(), EngineError> {
        self.barrier.wait(self.unit)
    }
}
