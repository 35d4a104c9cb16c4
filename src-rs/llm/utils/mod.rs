pub mod network;
pub mod string_util;
