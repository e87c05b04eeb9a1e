//! In-process ledger imitating a blockchain's data shape for display.
//!
//! Entries and transactions live in plain maps and a vector behind a lock;
//! hashes and addresses are random hex strings. Nothing here persists across
//! restarts and no cryptography is involved.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process-wide ledger, shared by handlers through `Arc` clones.
pub static LEDGER: Lazy<Arc<Ledger>> = Lazy::new(|| Arc::new(Ledger::with_sample_data()));

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("allocation {0} does not exist on the ledger")]
    UnknownAllocation(u64),
    #[error("release {0} does not exist on the ledger")]
    UnknownRelease(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "ALLOCATION")]
    Allocation,
    #[serde(rename = "RELEASE")]
    Release,
    #[serde(rename = "EXPENDITURE")]
    Expenditure,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Allocation => "ALLOCATION",
            EntryKind::Release => "RELEASE",
            EntryKind::Expenditure => "EXPENDITURE",
        }
    }
}

impl FromStr for EntryKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALLOCATION" => Ok(EntryKind::Allocation),
            "RELEASE" => Ok(EntryKind::Release),
            "EXPENDITURE" => Ok(EntryKind::Expenditure),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerAllocation {
    pub id: u64,
    pub agency: String,
    pub project: String,
    pub amount: f64,
    pub timestamp: i64,
    pub exists: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerRelease {
    pub id: u64,
    pub allocation_id: u64,
    pub amount: f64,
    pub timestamp: i64,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerExpenditure {
    pub id: u64,
    pub release_id: u64,
    pub amount: f64,
    pub beneficiary: String,
    pub document_hash: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub tx_hash: String,
    pub block_number: u64,
    pub from_address: String,
    pub to_address: Option<String>,
    pub amount: Option<f64>,
    pub gas_used: u64,
    pub gas_price: u64,
    pub status: String,
    pub data_type: EntryKind,
    pub data_id: String,
    pub metadata: Option<String>,
    pub timestamp: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LedgerStats {
    pub total_allocations: usize,
    pub total_releases: usize,
    pub total_expenditures: usize,
    pub total_transactions: usize,
    pub latest_block: u64,
    pub total_value: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LedgerSnapshot {
    pub allocations: Vec<LedgerAllocation>,
    pub releases: Vec<LedgerRelease>,
    pub expenditures: Vec<LedgerExpenditure>,
    pub transactions: Vec<LedgerTransaction>,
    pub stats: LedgerStats,
}

/// Outcome of comparing a database allocation with its ledger counterpart.
#[derive(Clone, Debug, Serialize)]
pub struct AllocationVerification {
    pub is_valid: bool,
    pub differences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_data: Option<LedgerAllocation>,
}

#[derive(Default)]
struct LedgerState {
    allocations: HashMap<u64, LedgerAllocation>,
    releases: HashMap<u64, LedgerRelease>,
    expenditures: HashMap<u64, LedgerExpenditure>,
    transactions: Vec<LedgerTransaction>,
    allocation_counter: u64,
    release_counter: u64,
    expenditure_counter: u64,
    block_counter: u64,
}

/// Owned ledger state behind a lock; all mutation goes through `&self`
/// methods so concurrent handlers stay consistent.
pub struct Ledger {
    state: RwLock<LedgerState>,
}

fn now_unix() -> i64 {
    Utc::now().timestamp()
}

fn random_hex(len: usize) -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    (0..len).map(|_| HEX[rng.gen_range(0..HEX.len())] as char).collect()
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState { block_counter: 1, ..Default::default() }),
        }
    }

    /// Ledger pre-loaded with the demo entries the dashboard expects.
    pub fn with_sample_data() -> Self {
        let ledger = Self::new();
        {
            let mut state = ledger.state.write().expect("ledger lock poisoned");
            let now = now_unix();
            state.allocations.insert(1, LedgerAllocation {
                id: 1,
                agency: "Department of Public Works and Highways".into(),
                project: "Flood Control Management System".into(),
                amount: 1_500_000_000.0,
                timestamp: now - 86_400 * 30,
                exists: true,
            });
            state.allocations.insert(2, LedgerAllocation {
                id: 2,
                agency: "Department of Health".into(),
                project: "Health Facility Enhancement Program".into(),
                amount: 800_000_000.0,
                timestamp: now - 86_400 * 25,
                exists: true,
            });
            state.releases.insert(1, LedgerRelease {
                id: 1,
                allocation_id: 1,
                amount: 600_000_000.0,
                timestamp: now - 86_400 * 20,
                description: "Initial release for flood control projects".into(),
            });
            state.releases.insert(2, LedgerRelease {
                id: 2,
                allocation_id: 2,
                amount: 300_000_000.0,
                timestamp: now - 86_400 * 15,
                description: "First release for health facility upgrades".into(),
            });
            state.expenditures.insert(1, LedgerExpenditure {
                id: 1,
                release_id: 1,
                amount: 45_000_000.0,
                beneficiary: "XYZ Engineering Services".into(),
                document_hash: "QmNkWk8v8z4J7Y6t5r4e3w2q1p9o8i7u6y5t4r3e2w1q".into(),
                timestamp: now - 86_400 * 10,
            });
            state.allocation_counter = 2;
            state.release_counter = 2;
            state.expenditure_counter = 1;
        }
        ledger
    }

    fn push_transaction(
        state: &mut LedgerState,
        data_type: EntryKind,
        data_id: String,
        amount: Option<f64>,
        metadata: Option<String>,
    ) -> LedgerTransaction {
        let mut rng = rand::thread_rng();
        let tx = LedgerTransaction {
            tx_hash: format!("0x{}", random_hex(64)),
            block_number: state.block_counter,
            from_address: format!("0x{}", random_hex(40)),
            to_address: Some(format!("0x{}", random_hex(40))),
            amount,
            gas_used: rng.gen_range(21_000..71_000),
            gas_price: rng.gen_range(20..120),
            status: "SUCCESS".into(),
            data_type,
            data_id,
            metadata,
            timestamp: now_unix(),
        };
        state.block_counter += 1;
        state.transactions.push(tx.clone());
        tx
    }

    pub fn record_allocation(
        &self,
        agency: &str,
        project: &str,
        amount: f64,
    ) -> (LedgerAllocation, LedgerTransaction) {
        let mut state = self.state.write().expect("ledger lock poisoned");
        state.allocation_counter += 1;
        let id = state.allocation_counter;
        let entry = LedgerAllocation {
            id,
            agency: agency.to_string(),
            project: project.to_string(),
            amount,
            timestamp: now_unix(),
            exists: true,
        };
        state.allocations.insert(id, entry.clone());
        let metadata = serde_json::json!({ "agency": agency, "project": project }).to_string();
        let tx = Self::push_transaction(
            &mut state,
            EntryKind::Allocation,
            id.to_string(),
            Some(amount),
            Some(metadata),
        );
        (entry, tx)
    }

    pub fn record_release(
        &self,
        allocation_id: u64,
        amount: f64,
        description: &str,
    ) -> Result<(LedgerRelease, LedgerTransaction), LedgerError> {
        let mut state = self.state.write().expect("ledger lock poisoned");
        match state.allocations.get(&allocation_id) {
            Some(a) if a.exists => {}
            _ => return Err(LedgerError::UnknownAllocation(allocation_id)),
        }
        state.release_counter += 1;
        let id = state.release_counter;
        let entry = LedgerRelease {
            id,
            allocation_id,
            amount,
            timestamp: now_unix(),
            description: description.to_string(),
        };
        state.releases.insert(id, entry.clone());
        let metadata =
            serde_json::json!({ "allocation_id": allocation_id, "description": description }).to_string();
        let tx = Self::push_transaction(
            &mut state,
            EntryKind::Release,
            id.to_string(),
            Some(amount),
            Some(metadata),
        );
        Ok((entry, tx))
    }

    pub fn record_expenditure(
        &self,
        release_id: u64,
        amount: f64,
        beneficiary: &str,
        document_hash: &str,
    ) -> Result<(LedgerExpenditure, LedgerTransaction), LedgerError> {
        let mut state = self.state.write().expect("ledger lock poisoned");
        if !state.releases.contains_key(&release_id) {
            return Err(LedgerError::UnknownRelease(release_id));
        }
        state.expenditure_counter += 1;
        let id = state.expenditure_counter;
        let entry = LedgerExpenditure {
            id,
            release_id,
            amount,
            beneficiary: beneficiary.to_string(),
            document_hash: document_hash.to_string(),
            timestamp: now_unix(),
        };
        state.expenditures.insert(id, entry.clone());
        let metadata = serde_json::json!({
            "release_id": release_id,
            "beneficiary": beneficiary,
            "document_hash": document_hash,
        })
        .to_string();
        let tx = Self::push_transaction(
            &mut state,
            EntryKind::Expenditure,
            id.to_string(),
            Some(amount),
            Some(metadata),
        );
        Ok((entry, tx))
    }

    pub fn allocation(&self, id: u64) -> Option<LedgerAllocation> {
        self.state.read().expect("ledger lock poisoned").allocations.get(&id).cloned()
    }

    pub fn release(&self, id: u64) -> Option<LedgerRelease> {
        self.state.read().expect("ledger lock poisoned").releases.get(&id).cloned()
    }

    pub fn expenditure(&self, id: u64) -> Option<LedgerExpenditure> {
        self.state.read().expect("ledger lock poisoned").expenditures.get(&id).cloned()
    }

    /// Ledger allocations carry no database key; the project title is the
    /// stable field shared by both sides and is how counterparts are found.
    pub fn find_allocation_by_project(&self, project: &str) -> Option<LedgerAllocation> {
        let state = self.state.read().expect("ledger lock poisoned");
        state.allocations.values().find(|a| a.exists && a.project == project).cloned()
    }

    pub fn allocations(&self) -> Vec<LedgerAllocation> {
        let state = self.state.read().expect("ledger lock poisoned");
        let mut out: Vec<_> = state.allocations.values().filter(|a| a.exists).cloned().collect();
        out.sort_by_key(|a| a.id);
        out
    }

    pub fn releases(&self) -> Vec<LedgerRelease> {
        let state = self.state.read().expect("ledger lock poisoned");
        let mut out: Vec<_> = state.releases.values().cloned().collect();
        out.sort_by_key(|r| r.id);
        out
    }

    pub fn expenditures(&self) -> Vec<LedgerExpenditure> {
        let state = self.state.read().expect("ledger lock poisoned");
        let mut out: Vec<_> = state.expenditures.values().cloned().collect();
        out.sort_by_key(|e| e.id);
        out
    }

    pub fn transactions(&self, data_type: Option<EntryKind>) -> Vec<LedgerTransaction> {
        let state = self.state.read().expect("ledger lock poisoned");
        match data_type {
            Some(kind) => state.transactions.iter().filter(|t| t.data_type == kind).cloned().collect(),
            None => state.transactions.clone(),
        }
    }

    pub fn transaction(&self, tx_hash: &str) -> Option<LedgerTransaction> {
        let state = self.state.read().expect("ledger lock poisoned");
        state.transactions.iter().find(|t| t.tx_hash == tx_hash).cloned()
    }

    pub fn stats(&self) -> LedgerStats {
        let state = self.state.read().expect("ledger lock poisoned");
        LedgerStats {
            total_allocations: state.allocations.len(),
            total_releases: state.releases.len(),
            total_expenditures: state.expenditures.len(),
            total_transactions: state.transactions.len(),
            latest_block: state.block_counter,
            total_value: state.transactions.iter().filter_map(|t| t.amount).sum(),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            allocations: self.allocations(),
            releases: self.releases(),
            expenditures: self.expenditures(),
            transactions: self.transactions(None),
            stats: self.stats(),
        }
    }

    /// Field-by-field comparison of a database allocation against the
    /// ledger entry for the same project title.
    pub fn verify_allocation(&self, agency: &str, title: &str, amount: f64) -> AllocationVerification {
        let entry = self.find_allocation_by_project(title);
        let Some(entry) = entry else {
            return AllocationVerification {
                is_valid: false,
                differences: vec!["Allocation not found on ledger".into()],
                ledger_data: None,
            };
        };

        let mut differences = Vec::new();
        if entry.agency != agency {
            differences.push(format!(
                "Agency mismatch: ledger={}, database={}",
                entry.agency, agency
            ));
        }
        if entry.project != title {
            differences.push(format!(
                "Project mismatch: ledger={}, database={}",
                entry.project, title
            ));
        }
        if entry.amount != amount {
            differences.push(format!(
                "Amount mismatch: ledger={}, database={}",
                entry.amount, amount
            ));
        }

        AllocationVerification {
            is_valid: differences.is_empty(),
            differences,
            ledger_data: Some(entry),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_data_shapes_the_initial_state() {
        let ledger = Ledger::with_sample_data();
        let stats = ledger.stats();
        assert_eq!(stats.total_allocations, 2);
        assert_eq!(stats.total_releases, 2);
        assert_eq!(stats.total_expenditures, 1);
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.latest_block, 1);
    }

    #[test]
    fn record_allocation_assigns_increasing_ids_and_blocks() {
        let ledger = Ledger::with_sample_data();
        let (a1, t1) = ledger.record_allocation("Department of Education", "School Building Program", 500.0);
        let (a2, t2) = ledger.record_allocation("Department of Health", "Immunization Drive", 800.0);
        assert_eq!(a1.id, 3);
        assert_eq!(a2.id, 4);
        assert!(t2.block_number > t1.block_number);
        assert!(t1.tx_hash.starts_with("0x"));
        assert_eq!(t1.tx_hash.len(), 66);
        assert!(t1.tx_hash[2..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(t1.status, "SUCCESS");
        assert!((21_000..71_000).contains(&t1.gas_used));
        assert!((20..120).contains(&t1.gas_price));
    }

    #[test]
    fn release_requires_existing_allocation() {
        let ledger = Ledger::new();
        assert!(matches!(
            ledger.record_release(99, 10.0, "nothing to draw from"),
            Err(LedgerError::UnknownAllocation(99))
        ));
        let (a, _) = ledger.record_allocation("Department of Finance", "Tax Modernization", 1000.0);
        let (r, tx) = ledger.record_release(a.id, 250.0, "first tranche").unwrap();
        assert_eq!(r.allocation_id, a.id);
        assert_eq!(tx.data_type, EntryKind::Release);
        assert_eq!(tx.data_id, r.id.to_string());
    }

    #[test]
    fn expenditure_requires_existing_release() {
        let ledger = Ledger::new();
        assert!(ledger.record_expenditure(1, 5.0, "Vendor", "QmHash").is_err());
        let (a, _) = ledger.record_allocation("DPWH", "Bridge Repair", 100.0);
        let (r, _) = ledger.record_release(a.id, 50.0, "tranche").unwrap();
        let (e, tx) = ledger.record_expenditure(r.id, 20.0, "Vendor", "QmHash").unwrap();
        assert_eq!(e.release_id, r.id);
        assert_eq!(tx.data_type, EntryKind::Expenditure);
    }

    #[test]
    fn transactions_filter_by_kind() {
        let ledger = Ledger::new();
        let (a, _) = ledger.record_allocation("DOH", "Health Program", 100.0);
        ledger.record_release(a.id, 40.0, "tranche").unwrap();
        assert_eq!(ledger.transactions(Some(EntryKind::Allocation)).len(), 1);
        assert_eq!(ledger.transactions(Some(EntryKind::Release)).len(), 1);
        assert_eq!(ledger.transactions(Some(EntryKind::Expenditure)).len(), 0);
        assert_eq!(ledger.transactions(None).len(), 2);
    }

    #[test]
    fn transaction_lookup_by_hash() {
        let ledger = Ledger::new();
        let (_, tx) = ledger.record_allocation("DBM", "Budget Reform", 42.0);
        assert_eq!(ledger.transaction(&tx.tx_hash).unwrap().tx_hash, tx.tx_hash);
        assert!(ledger.transaction("0xdeadbeef").is_none());
    }

    #[test]
    fn verification_flags_mismatches() {
        let ledger = Ledger::with_sample_data();

        let ok = ledger.verify_allocation(
            "Department of Public Works and Highways",
            "Flood Control Management System",
            1_500_000_000.0,
        );
        assert!(ok.is_valid);
        assert!(ok.differences.is_empty());

        let bad_amount = ledger.verify_allocation(
            "Department of Public Works and Highways",
            "Flood Control Management System",
            1_400_000_000.0,
        );
        assert!(!bad_amount.is_valid);
        assert_eq!(bad_amount.differences.len(), 1);
        assert!(bad_amount.differences[0].contains("Amount mismatch"));

        let missing = ledger.verify_allocation("DOST", "Unknown Program", 1.0);
        assert!(!missing.is_valid);
        assert_eq!(missing.differences, vec!["Allocation not found on ledger".to_string()]);
    }

    #[test]
    fn stats_sum_transaction_values() {
        let ledger = Ledger::new();
        let (a, _) = ledger.record_allocation("DepEd", "Textbooks", 100.0);
        ledger.record_release(a.id, 60.0, "tranche").unwrap();
        let stats = ledger.stats();
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.total_value, 160.0);
        assert_eq!(stats.latest_block, 3);
    }
}
