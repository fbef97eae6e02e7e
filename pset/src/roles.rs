pub mod creator;

pub mod constructor;

pub mod updater;

pub mod signer;
