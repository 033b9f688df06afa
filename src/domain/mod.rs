pub mod entities;
pub mod ledger;
pub mod lifecycle;
