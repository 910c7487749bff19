pub mod fix_time;
pub mod record_assembler;
