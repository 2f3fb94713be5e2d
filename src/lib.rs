
// External data representation, a protocol for serializing data to be sent over the network
pub mod xdr;

// Remote procedure call, a protocol build on top of XDR to provide something like C-style function calls over the network
pub mod rpc;

// A protocol using RPC that's meant to communicate with instruments like oscilloscopes, power supplies, waveform generators, etc
pub mod vxi11;

// Byte-level instrument connection, with a VXI-11 implementation
pub mod session;

// Newline-terminated SCPI commands and queries on top of a session
pub mod scpi;

// IEEE-488.2 definite-length arbitrary blocks
pub mod block;

// Scaling raw waveform bytes into time/voltage samples
pub mod waveform;

// Manufacturer/model/serial parsed out of an *IDN? reply
pub mod identity;

// Writing converted samples to the output file
pub mod export;

// Command line options for a run
pub mod config;

// Error type shared by the command layer and the run
pub mod error;

// The fixed scope setup and transfer sequence
pub mod acquire;

pub use error::{Error, Result};
