//! Load commission book records from CSV exports

use super::{ClientRecord, CommissionRecord, CommissionStatus, ExpenseRecord, PolicyRecord, PolicyStatus};
use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::path::Path;

const DATE_FMT: &str = "%Y-%m-%d";

fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::parse_from_str(s, DATE_FMT).map_err(|e| format!("bad date '{}': {}", s, e).into())
}

fn parse_opt_date(s: &str) -> Result<Option<NaiveDate>, Box<dyn Error>> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(s).map(Some)
    }
}

/// Raw CSV row for commissions
#[derive(Debug, serde::Deserialize)]
struct CommissionCsvRow {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "AgentId")]
    agent_id: String,
    #[serde(rename = "PolicyId")]
    policy_id: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "PaymentDate")]
    payment_date: String,
    #[serde(rename = "CreatedAt")]
    created_at: String,
    #[serde(rename = "MonthsPaid")]
    months_paid: u32,
    #[serde(rename = "UnearnedAmount")]
    unearned_amount: f64,
    #[serde(rename = "ChargebackAmount")]
    chargeback_amount: String,
}

impl CommissionCsvRow {
    fn to_record(self) -> Result<CommissionRecord, Box<dyn Error>> {
        let status = match self.status.as_str() {
            "pending" => CommissionStatus::Pending,
            "paid" => CommissionStatus::Paid,
            "earned" => CommissionStatus::Earned,
            "charged_back" => CommissionStatus::ChargedBack,
            other => return Err(format!("Unknown commission status: {}", other).into()),
        };

        let chargeback_amount = if self.chargeback_amount.trim().is_empty() {
            None
        } else {
            Some(self.chargeback_amount.parse::<f64>()?)
        };

        Ok(CommissionRecord {
            id: self.id,
            agent_id: self.agent_id,
            policy_id: self.policy_id,
            amount: self.amount,
            status,
            payment_date: parse_opt_date(&self.payment_date)?,
            created_at: parse_date(&self.created_at)?,
            months_paid: self.months_paid,
            unearned_amount: self.unearned_amount,
            chargeback_amount,
        })
    }
}

/// Raw CSV row for expenses
#[derive(Debug, serde::Deserialize)]
struct ExpenseCsvRow {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "AgentId")]
    agent_id: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "IsRecurring")]
    is_recurring: bool,
}

impl ExpenseCsvRow {
    fn to_record(self) -> Result<ExpenseRecord, Box<dyn Error>> {
        Ok(ExpenseRecord {
            id: self.id,
            agent_id: self.agent_id,
            amount: self.amount,
            category: self.category,
            date: parse_date(&self.date)?,
            is_recurring: self.is_recurring,
        })
    }
}

/// Raw CSV row for policies
#[derive(Debug, serde::Deserialize)]
struct PolicyCsvRow {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "AgentId")]
    agent_id: String,
    #[serde(rename = "PolicyNumber")]
    policy_number: String,
    #[serde(rename = "ClientId")]
    client_id: String,
    #[serde(rename = "CarrierId")]
    carrier_id: String,
    #[serde(rename = "CarrierName")]
    carrier_name: String,
    #[serde(rename = "ProductId")]
    product_id: String,
    #[serde(rename = "ProductName")]
    product_name: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "EffectiveDate")]
    effective_date: String,
    #[serde(rename = "CancellationDate")]
    cancellation_date: String,
    #[serde(rename = "AnnualPremium")]
    annual_premium: f64,
}

impl PolicyCsvRow {
    fn to_record(self) -> Result<PolicyRecord, Box<dyn Error>> {
        let status = match self.status.as_str() {
            "pending" => PolicyStatus::Pending,
            "active" => PolicyStatus::Active,
            "lapsed" => PolicyStatus::Lapsed,
            "cancelled" => PolicyStatus::Cancelled,
            other => return Err(format!("Unknown policy status: {}", other).into()),
        };

        Ok(PolicyRecord {
            id: self.id,
            agent_id: self.agent_id,
            policy_number: self.policy_number,
            client_id: self.client_id,
            carrier_id: self.carrier_id,
            carrier_name: self.carrier_name,
            product_id: self.product_id,
            product_name: self.product_name,
            status,
            effective_date: parse_date(&self.effective_date)?,
            cancellation_date: parse_opt_date(&self.cancellation_date)?,
            annual_premium: self.annual_premium,
        })
    }
}

/// Raw CSV row for clients
#[derive(Debug, serde::Deserialize)]
struct ClientCsvRow {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "AgentId")]
    agent_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "State")]
    state: String,
}

impl ClientCsvRow {
    fn to_record(self) -> ClientRecord {
        let state = if self.state.trim().is_empty() {
            None
        } else {
            Some(self.state)
        };
        ClientRecord {
            id: self.id,
            agent_id: self.agent_id,
            name: self.name,
            state,
        }
    }
}

/// Load all commission records from a CSV file
pub fn load_commissions<P: AsRef<Path>>(path: P) -> Result<Vec<CommissionRecord>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let row: CommissionCsvRow = result?;
        records.push(row.to_record()?);
    }
    Ok(records)
}

/// Load commission records from any reader (e.g., string buffer, network stream)
pub fn load_commissions_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<CommissionRecord>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut records = Vec::new();
    for result in csv_reader.deserialize() {
        let row: CommissionCsvRow = result?;
        records.push(row.to_record()?);
    }
    Ok(records)
}

/// Load all expense records from a CSV file
pub fn load_expenses<P: AsRef<Path>>(path: P) -> Result<Vec<ExpenseRecord>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let row: ExpenseCsvRow = result?;
        records.push(row.to_record()?);
    }
    Ok(records)
}

/// Load all policy records from a CSV file
pub fn load_policies<P: AsRef<Path>>(path: P) -> Result<Vec<PolicyRecord>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let row: PolicyCsvRow = result?;
        records.push(row.to_record()?);
    }
    Ok(records)
}

/// Load all client records from a CSV file
pub fn load_clients<P: AsRef<Path>>(path: P) -> Result<Vec<ClientRecord>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let row: ClientCsvRow = result?;
        records.push(row.to_record());
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_commissions_from_reader() {
        let csv = "\
Id,AgentId,PolicyId,Amount,Status,PaymentDate,CreatedAt,MonthsPaid,UnearnedAmount,ChargebackAmount
c1,a1,p1,1200.50,paid,2025-06-15,2025-06-01,4,600.25,
c2,a1,p2,800.00,charged_back,,2025-03-10,1,0.00,800.00
";
        let records = load_commissions_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, CommissionStatus::Paid);
        assert!(records[0].payment_date.is_some());
        assert_eq!(records[1].chargeback_amount, Some(800.0));
        assert!(records[1].payment_date.is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let csv = "\
Id,AgentId,PolicyId,Amount,Status,PaymentDate,CreatedAt,MonthsPaid,UnearnedAmount,ChargebackAmount
c1,a1,p1,100.0,refunded,,2025-01-01,0,0.0,
";
        assert!(load_commissions_from_reader(csv.as_bytes()).is_err());
    }
}
