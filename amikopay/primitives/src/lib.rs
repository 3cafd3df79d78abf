//! Primitives crate defines the base identifiers, amount types and hashing
//! helpers shared by every other crate in the amikopay workspace.

/// Base constants.
pub mod constants;
/// Double-hashing (`RIPEMD160(SHA256(x))`) and token/transaction id derivation.
pub mod hashing;
#[cfg(test)]
mod tests;
/// Base types: identifiers, amounts, timestamps.
pub mod types;
