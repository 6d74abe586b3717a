//! ABI infrastructure - descriptor loading and dynamic bindings via alloy-dyn-abi

mod binding;
mod loader;
pub mod values;

pub use binding::ContractBinding;
pub use loader::{parse_abi, AbiLoader, AbiSource};
