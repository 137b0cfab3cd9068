//! Record store gateway
//!
//! The analytics engine reads the commission book through this narrow
//! repository interface: filtered per-entity finds plus the two count
//! aggregates the assembler needs. All engine logic depends only on the
//! trait, so the backing store can be swapped without touching any
//! forecasting or insight code.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::records::{ClientRecord, ClientValueRow, CommissionRecord, ExpenseRecord, PolicyRecord};
use crate::report::ReportFilters;
use async_trait::async_trait;

/// Read contract over commission/expense/policy/client records for one agent
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Commissions whose effective date (payment date for paid, creation date
    /// otherwise) falls inside the filter range
    async fn commissions_in_range(
        &self,
        agent_id: &str,
        filters: &ReportFilters,
    ) -> Result<Vec<CommissionRecord>, StoreError>;

    /// Every commission for the agent, regardless of date
    async fn all_commissions(&self, agent_id: &str) -> Result<Vec<CommissionRecord>, StoreError>;

    /// Expenses dated inside the filter range
    async fn expenses_in_range(
        &self,
        agent_id: &str,
        filters: &ReportFilters,
    ) -> Result<Vec<ExpenseRecord>, StoreError>;

    /// Policies whose effective date falls inside the filter range,
    /// narrowed by any carrier/product/client id sets on the filter
    async fn policies_effective_in_range(
        &self,
        agent_id: &str,
        filters: &ReportFilters,
    ) -> Result<Vec<PolicyRecord>, StoreError>;

    /// Every policy for the agent, regardless of date
    async fn all_policies(&self, agent_id: &str) -> Result<Vec<PolicyRecord>, StoreError>;

    /// Every client for the agent
    async fn clients(&self, agent_id: &str) -> Result<Vec<ClientRecord>, StoreError>;

    /// Precomputed client lifetime-value view, one row per client
    async fn client_values(&self, agent_id: &str) -> Result<Vec<ClientValueRow>, StoreError>;

    /// Total policy count for the agent (cheap existence probe)
    async fn policy_count(&self, agent_id: &str) -> Result<usize, StoreError>;

    /// Total client count for the agent
    async fn client_count(&self, agent_id: &str) -> Result<usize, StoreError>;
}
