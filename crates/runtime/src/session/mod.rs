//! Client-side session state owned by the reconciler.

mod registry;
mod tentative;
mod view;

pub(crate) use registry::InFlight;
pub use registry::{ActiveSession, Phase, RegistryError, SessionRegistry};
pub use tentative::{Modifiers, Tentative};
pub use view::{ModifierView, SessionView};
