// Core trading domain entities and value objects
pub mod fees;
pub mod ledger;
pub mod types;
