pub mod deduction;
pub mod hours;
