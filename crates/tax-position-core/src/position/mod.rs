pub mod tax_position;
