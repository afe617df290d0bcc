//! Module discovery subsystem.
//!
//! # Data Flow
//! ```text
//! module root
//!     → global.rs (registry document: descriptor filename, hide lists)
//!     → scanner.rs (list module directories, primary + Api variant)
//!     → loader.rs (parse each descriptor, drop broken ones)
//!     → registry.rs (primary / variant / merged views, memoized)
//!     → consumed by routing::registrar
//! ```
//!
//! # Design Decisions
//! - Discovery misses are never errors: a missing root or a corrupt
//!   descriptor simply yields fewer modules
//! - All filesystem access goes through `fs::ModuleFs`

pub mod descriptor;
pub mod fs;
pub mod global;
pub mod loader;
pub mod registry;
pub mod scanner;

pub use descriptor::{ControllerEntry, ModuleDescriptor, ModuleKind, Origin};
pub use fs::{DirEntry, ModuleFs, StdFs};
pub use global::RegistryDocument;
pub use registry::{Discovery, ModuleRegistry};
pub use scanner::ScanFilter;
