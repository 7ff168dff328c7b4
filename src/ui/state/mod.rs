pub mod explorer_state;
