pub mod audit;
pub mod expense;
pub mod group;
pub mod settlement;
pub mod settlement_record;
pub mod transaction;
