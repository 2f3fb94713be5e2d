//! ONC-RPC v2 (RFC 5531) client pieces: call/reply headers, record marking over TCP,
//! and the portmapper lookup used to find the VXI-11 core channel.

pub mod xdr_pack;
pub mod xdr_unpack;
pub mod tcp_clients;
pub mod port_mapping;

pub const RPCVERSION:u32 = 2;

// msg_type
pub const CALL:i32  = 0;
pub const REPLY:i32 = 1;

// reply_stat
pub const MSG_ACCEPTED:i32 = 0;
pub const MSG_DENIED:i32   = 1;

// reject_stat
pub const RPC_MISMATCH:i32 = 0;
pub const AUTH_ERROR:i32   = 1;

// accept_stat
pub const SUCCESS:i32       = 0;
pub const PROG_UNAVAIL:i32  = 1;
pub const PROG_MISMATCH:i32 = 2;
pub const PROC_UNAVAIL:i32  = 3;
pub const GARBAGE_ARGS:i32  = 4;
pub const SYSTEM_ERR:i32    = 5;

pub const IPPROTO_TCP:u32 = 6;
pub const IPPROTO_UDP:u32 = 17;

// High bit of a record marking header flags the last fragment of a record
pub const LAST_FRAGMENT:u32 = 0x8000_0000;
