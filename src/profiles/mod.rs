//! Profiles: named, typed property bags persisted in the config file.
//!
//! [`ProfileStore`] holds the profiles available to an invocation.
//! [`ProfileResolver`] picks the profiles a command asks for and turns
//! their properties into option values for the argument mapper.

mod credentials;
mod profile;
mod resolver;
mod store;

pub use credentials::{CredentialStore, MemoryCredentials};
pub use profile::Profile;
pub use resolver::{ProfileArgument, ProfileResolver, ResolvedProfiles};
pub use store::ProfileStore;

#[cfg(test)]
mod tests;
