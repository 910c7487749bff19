pub mod acquisition;
pub mod fix_source;
pub mod indicators;
pub mod stop_signal;
pub mod transducer;
