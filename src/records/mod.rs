//! Commission book record types and CSV loaders

mod data;
pub mod loader;

pub use data::{
    month_index, months_between, ClientRecord, ClientValueRow, CommissionRecord, CommissionStatus,
    ExpenseRecord, PolicyRecord, PolicyStatus,
};
pub use loader::{load_clients, load_commissions, load_expenses, load_policies};
