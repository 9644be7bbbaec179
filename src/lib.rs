#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "secure", feature = "nonsecure"))]
compile_error!("features `secure` and `nonsecure` are mutually exclusive");

#[cfg(not(any(feature = "secure", feature = "nonsecure")))]
compile_error!("enable either the `secure` or the `nonsecure` feature");

#[macro_use]
mod macros;
#[macro_use]
mod fmt;

pub mod poll;
pub mod regs;
pub mod sys;
pub mod time;

#[cfg(test)]
mod sim;
