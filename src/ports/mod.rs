//! Port traits defining the generator's external boundaries.
//!
//! The pipeline core never touches the clock, the disk, or a random source
//! directly. Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
