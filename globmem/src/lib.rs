//! Global memory for partitioned global address space programs.
//!
//! A [`GlobalAddress`] names a byte in some unit's segment. [`GlobPtr`]
//! and [`GlobRef`] are typed handles over such addresses that move data
//! with blocking one-sided transfers through a [`CommEngine`].
//! [`GlobSpan`] lays a distributed index space over the team's segments
//! and is where view chains from [`ndview`] bottom out.
//!
//! All handles borrow the [`Context`] of the unit that created them.
//! [`SharedMemory`] runs a team of units as threads of one process.
//!
//! Engine failures are fatal: they are logged and the calling process
//! terminates.

mod access;
pub use access::Access;
pub use access::Const;
pub use access::JoinAccess;
pub use access::Mut;

mod address;
pub use address::GlobalAddress;
pub use address::SegmentId;
pub use address::TeamId;
pub use address::UnitId;

mod config;
pub use config::ConfigError;
pub use config::MAX_UNITS;
pub use config::PGAS_SEGMENT_BYTES;
pub use config::PGAS_TEAM_ID;
pub use config::PGAS_UNITS;
pub use config::PgasConfig;

mod context;
pub use context::Context;

mod engine;
pub use engine::AddressError;
pub use engine::CommEngine;
pub use engine::EngineError;
pub use engine::status;

mod glob_ptr;
pub use glob_ptr::GlobPtr;

mod glob_ref;
pub use glob_ref::GlobRef;
pub use glob_ref::One;
pub use glob_ref::swap;

pub mod shmem;
pub use shmem::LaunchError;
pub use shmem::SharedMemory;

mod span;
pub use span::GlobSpan;

mod team;
pub use team::Team;
