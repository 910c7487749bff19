pub mod clock;
pub mod delegate;
pub mod fix_service;
pub mod indicator;
pub mod transducer;
