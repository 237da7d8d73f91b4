pub mod clock;
pub mod entity;
pub mod storage;

pub use clock::{Clock, SystemClock};
pub use entity::{EntityKind, TrackedEntity};
pub use storage::IAuditStorage;
