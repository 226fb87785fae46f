pub mod time_entry;
pub mod timer_key;
pub mod timer_state;
