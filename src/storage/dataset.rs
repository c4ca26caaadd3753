//! Built-in challenge dataset
//!
//! Generates the simulated log tables the dojo challenges run against: a
//! handful of hand-placed rows carrying the flags, padded with filler rows
//! drawn from a seeded RNG. Filler timestamps count back from a fixed
//! reference instant, so one seed always produces the same tables.

use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Builder;

use crate::core::record::Record;
use crate::core::value::Value;
use super::memory::MemoryStore;

/// Seed used when none is given
pub const DEFAULT_SEED: u64 = 42;

/// 2024-01-22T00:00:00Z, the "now" of the simulated environment
const REFERENCE_MILLIS: i64 = 1_705_881_600_000;
const HOUR_MILLIS: i64 = 3_600_000;
const DAY_MILLIS: i64 = 24 * HOUR_MILLIS;

const SIGNIN_FILLER_ROWS: usize = 1329;
const SECURITY_EVENT_FILLER_ROWS: usize = 96;
const SCANNER_IP: &str = "192.168.100.50";
const SCANNED_PORTS: i64 = 443;

const FILLER_APPS: [&str; 4] = ["Microsoft Office 365", "Azure Portal", "Teams", "SharePoint"];
const FILLER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120";
const BRUTE_FORCE_AGENT: &str = "Mozilla/5.0 FLAG{kql_kung_fu_brut3_f0rc3_d3t3ct3d} BruteForcer/1.0";

const SECURITY_EVENTS: [(i64, &str); 5] = [
    (4624, "An account was successfully logged on"),
    (4625, "An account failed to log on"),
    (4634, "An account was logged off"),
    (4672, "Special privileges assigned to new logon"),
    (4688, "A new process has been created"),
];
const COMPUTERS: [&str; 4] = [
    "SERVER01.yourcompany.com",
    "SERVER02.yourcompany.com",
    "DC01.yourcompany.com",
    "WKS042.yourcompany.com",
];
const ACCOUNTS: [&str; 5] = ["alice", "bob", "carol", "admin", "svc_backup"];

/// Build the built-in tables for `seed`
pub fn builtin(seed: u64) -> MemoryStore {
    DatasetGenerator::new(seed).generate()
}

/// Seeded generator for the challenge tables
pub struct DatasetGenerator {
    rng: StdRng,
}

impl DatasetGenerator {
    pub fn new(seed: u64) -> Self {
        DatasetGenerator {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate every table, in the order the challenges introduce them
    pub fn generate(mut self) -> MemoryStore {
        let store = MemoryStore::new()
            .with_table("SigninLogs", self.signin_logs())
            .with_table("SecurityEvent", self.security_events())
            .with_table("AzureActivity", azure_activity())
            .with_table("AzureNetworkAnalytics_CL", self.network_flows())
            .with_table("SecurityAlert", security_alerts());

        info!("Generated built-in dataset with {} tables", store.len());
        store
    }

    fn signin_logs(&mut self) -> Vec<Record> {
        let fixed = [
            ("2024-01-15T10:30:00Z", "alice.wong@yourcompany.com", 0, "10.0.1.50", "Mozilla/5.0 Chrome/120", "Microsoft Office 365"),
            ("2024-01-15T10:31:00Z", "bob.chen@yourcompany.com", 0, "10.0.1.51", "Mozilla/5.0 Firefox/121", "Azure Portal"),
            ("2024-01-15T02:15:00Z", "hacker@evil.com", 0, "185.234.72.100", "Mozilla/5.0", "FLAG{kql_kung_fu_midnight_hacker}"),
            ("2024-01-15T11:00:00Z", "admin@yourcompany.com", 50126, "185.234.72.100", BRUTE_FORCE_AGENT, "Azure Portal"),
            ("2024-01-15T11:00:05Z", "admin@yourcompany.com", 50126, "185.234.72.100", BRUTE_FORCE_AGENT, "Azure Portal"),
            ("2024-01-15T11:00:10Z", "admin@yourcompany.com", 50126, "185.234.72.100", BRUTE_FORCE_AGENT, "Azure Portal"),
            ("2024-01-15T12:00:00Z", "FLAG{kql_kung_fu_proj3ct_m4st3r}@yourcompany.com", 0, "10.0.1.99", "Mozilla/5.0", "Microsoft Teams"),
            ("2024-01-15T12:30:00Z", "FLAG{kql_kung_fu_unique_find}@yourcompany.com", 0, "10.0.1.100", "Mozilla/5.0", "SharePoint"),
        ];

        let mut rows = Vec::with_capacity(fixed.len() + SIGNIN_FILLER_ROWS);
        for (time, user, result_type, ip, agent, app) in fixed {
            let correlation = self.correlation_id();
            rows.push(signin(time.to_string(), user.to_string(), result_type, ip.to_string(), agent, app, correlation));
        }

        for i in 0..SIGNIN_FILLER_ROWS {
            let time = self.timestamp_within(7 * DAY_MILLIS);
            let result_type = if self.rng.gen::<f64>() > 0.95 { 50126 } else { 0 };
            let correlation = self.correlation_id();
            rows.push(signin(
                time,
                format!("user{}@yourcompany.com", i % 50),
                result_type,
                format!("10.0.{}.{}", i / 255, i % 255),
                FILLER_AGENT,
                FILLER_APPS[i % FILLER_APPS.len()],
                correlation,
            ));
        }

        rows
    }

    fn security_events(&mut self) -> Vec<Record> {
        let fixed = [
            ("2024-01-15T09:00:00Z", 4624, "4624 - An account was successfully logged on", "SERVER01.yourcompany.com", "alice"),
            ("2024-01-15T09:05:00Z", 4625, "4625 - An account failed to log on", "SERVER01.yourcompany.com", "bob"),
            ("2024-01-15T09:10:00Z", 9999, "FLAG{kql_kung_fu_first_steps}", "SECRETSERVER.yourcompany.com", "system"),
            ("2024-01-15T09:15:00Z", 4672, "4672 - Special privileges assigned to new logon", "DC01.yourcompany.com", "admin"),
        ];

        let mut rows: Vec<Record> = fixed
            .iter()
            .map(|(time, id, activity, computer, account)| security_event(time.to_string(), *id, activity.to_string(), computer, account))
            .collect();

        for _ in 0..SECURITY_EVENT_FILLER_ROWS {
            let time = self.timestamp_within(7 * DAY_MILLIS);
            let (id, description) = SECURITY_EVENTS[self.rng.gen_range(0..SECURITY_EVENTS.len())];
            let computer = COMPUTERS[self.rng.gen_range(0..COMPUTERS.len())];
            let account = ACCOUNTS[self.rng.gen_range(0..ACCOUNTS.len())];
            rows.push(security_event(time, id, format!("{} - {}", id, description), computer, account));
        }

        rows
    }

    fn network_flows(&mut self) -> Vec<Record> {
        let mut rows = vec![
            flow("2024-01-15T10:00:00Z".to_string(), "10.0.1.50", "10.0.2.100", 54321, 443, "A", "O"),
            flow("2024-01-15T10:01:00Z".to_string(), "185.234.72.100", "10.13.37.100", 12345, 22, "D", "I"),
        ];

        for port in 1..=SCANNED_PORTS {
            let time = self.timestamp_within(HOUR_MILLIS);
            rows.push(flow(time, SCANNER_IP, "10.0.2.100", 40000 + port, port, "D", "I"));
        }

        // The most recent denied inbound flow points at the flag host
        rows.push(flow(iso_timestamp(REFERENCE_MILLIS), "185.234.72.100", "10.13.37.100", 55555, 3389, "D", "I"));
        rows
    }

    /// Random instant within `window` milliseconds strictly before the
    /// reference time
    fn timestamp_within(&mut self, window: i64) -> String {
        let offset = self.rng.gen_range(1..=window);
        iso_timestamp(REFERENCE_MILLIS - offset)
    }

    fn correlation_id(&mut self) -> String {
        Builder::from_random_bytes(self.rng.gen()).into_uuid().to_string()
    }
}

fn azure_activity() -> Vec<Record> {
    [
        ("2024-01-15T10:00:00Z", "Microsoft.Compute/virtualMachines/start/action", "alice.wong@yourcompany.com", "vm-prod-01"),
        ("2024-01-15T10:30:00Z", "Microsoft.Storage/storageAccounts/write", "bob.chen@yourcompany.com", "storageaccount01"),
        ("2024-01-15T11:00:00Z", "FLAG{kql_kung_fu_1ns1d3r_f0und}", "sarah.jones@yourcompany.com", "secret-keyvault"),
        ("2024-01-15T11:30:00Z", "Microsoft.Authorization/roleAssignments/write", "john.smith@yourcompany.com", "subscription-prod"),
        ("2024-01-15T12:00:00Z", "Microsoft.KeyVault/vaults/secrets/read", "mike.wilson@yourcompany.com", "keyvault-prod"),
    ]
    .into_iter()
    .map(|(time, operation, caller, resource)| {
        vec![
            ("TimeGenerated", time),
            ("OperationName", operation),
            ("Caller", caller),
            ("Resource", resource),
        ]
        .into_iter()
        .collect()
    })
    .collect()
}

fn security_alerts() -> Vec<Record> {
    [
        ("2024-01-15T08:00:00Z", "Suspicious sign-in activity", "Medium", "Unusual sign-in detected"),
        ("2024-01-15T08:30:00Z", "Credential theft attempt detected", "High", "Credential access attempt"),
        ("2024-01-15T09:00:00Z", "FLAG{kql_kung_fu_str1ng_n1nja} - Credential Alert", "High", "Credential harvesting detected"),
        ("2024-01-15T09:30:00Z", "Malware detected", "High", "Malicious file execution"),
        ("2024-01-15T10:00:00Z", "CREDENTIAL ACCESS detected", "Medium", "Suspicious credential activity"),
    ]
    .into_iter()
    .map(|(time, name, severity, description)| {
        vec![
            ("TimeGenerated", time),
            ("AlertName", name),
            ("AlertSeverity", severity),
            ("Description", description),
        ]
        .into_iter()
        .collect()
    })
    .collect()
}

fn signin(
    time: String,
    user: String,
    result_type: i64,
    ip: String,
    agent: &str,
    app: &str,
    correlation: String,
) -> Record {
    let mut record = Record::with_capacity(7);
    record.insert("TimeGenerated", time);
    record.insert("UserPrincipalName", user);
    record.insert("ResultType", result_type);
    record.insert("IPAddress", ip);
    record.insert("UserAgent", agent);
    record.insert("AppDisplayName", app);
    record.insert("CorrelationId", correlation);
    record
}

fn security_event(time: String, id: i64, activity: String, computer: &str, account: &str) -> Record {
    let mut record = Record::with_capacity(5);
    record.insert("TimeGenerated", time);
    record.insert("EventID", id);
    record.insert("Activity", activity);
    record.insert("Computer", computer);
    record.insert("Account", account);
    record
}

fn flow(time: String, src: &str, dest: &str, src_port: i64, dest_port: i64, status: &str, direction: &str) -> Record {
    let mut record = Record::with_capacity(7);
    record.insert("TimeGenerated", time);
    record.insert("SrcIP_s", src);
    record.insert("DestIP_s", dest);
    record.insert("SrcPort_d", Value::Integer(src_port));
    record.insert("DestPort_d", Value::Integer(dest_port));
    record.insert("FlowStatus_s", status);
    record.insert("FlowDirection_s", direction);
    record
}

fn iso_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::TableStore;

    #[test]
    fn test_table_sizes() {
        let store = builtin(DEFAULT_SEED);

        assert_eq!(store.table_names(), vec![
            "SigninLogs",
            "SecurityEvent",
            "AzureActivity",
            "AzureNetworkAnalytics_CL",
            "SecurityAlert",
        ]);
        assert_eq!(store.table("SigninLogs").map(<[Record]>::len), Some(1337));
        assert_eq!(store.table("SecurityEvent").map(<[Record]>::len), Some(100));
        assert_eq!(store.table("AzureNetworkAnalytics_CL").map(<[Record]>::len), Some(446));
    }

    #[test]
    fn test_same_seed_same_tables() {
        let first = builtin(7);
        let second = builtin(7);
        assert_eq!(first.table("SigninLogs"), second.table("SigninLogs"));

        let other = builtin(8);
        assert_ne!(first.table("SigninLogs"), other.table("SigninLogs"));
    }

    #[test]
    fn test_tables_are_homogeneous() {
        let store = builtin(DEFAULT_SEED);
        for name in store.table_names() {
            let rows = store.table(&name).unwrap();
            let first: Vec<&str> = rows[0].columns().collect();
            assert!(rows.iter().all(|r| r.columns().collect::<Vec<_>>() == first), "{} is ragged", name);
        }
    }

    #[test]
    fn test_latest_flow_is_the_flag_host() {
        let store = builtin(DEFAULT_SEED);
        let flows = store.table("AzureNetworkAnalytics_CL").unwrap();
        let latest = flows.iter().max_by_key(|r| r.text("TimeGenerated")).unwrap();

        assert_eq!(latest.text("DestIP_s"), "10.13.37.100");
        assert_eq!(latest.text("TimeGenerated"), "2024-01-22T00:00:00.000Z");
    }
}
