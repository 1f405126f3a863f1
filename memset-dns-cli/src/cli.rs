//! Command line definition

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use memset_dns_core::types::{
    DesiredState, Manifest, RecordType, ZoneDomainSpec, ZoneRecordSpec, ZoneSpec,
};
use memset_dns_core::{PollConfig, ReconcileOptions};

#[derive(Debug, Parser)]
#[command(name = "memset-dns")]
#[command(about = "Reconcile Memset DNS zones, domains and records", long_about = None)]
pub struct Cli {
    /// Report what would change without modifying anything
    #[arg(long, global = true)]
    pub check: bool,

    /// Seconds between reload job status checks
    #[arg(
        long,
        global = true,
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: u64,

    /// Status checks per polling cycle
    #[arg(
        long,
        global = true,
        default_value_t = 6,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub poll_attempts: u32,

    /// Maximum polling cycles before giving up
    #[arg(
        long,
        global = true,
        default_value_t = 4,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub poll_cycles: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply a JSON manifest of zones, domains and records
    Apply {
        /// Path to the manifest file
        manifest: PathBuf,
    },

    /// Ensure a zone exists (or not)
    Zone {
        /// Zone nickname
        name: String,

        /// Default TTL for the zone's records
        #[arg(long, default_value_t = 0)]
        ttl: u32,

        /// Delete the zone
        #[arg(long)]
        absent: bool,

        /// Delete even if the zone still has domains or records
        #[arg(long, requires = "absent")]
        force: bool,
    },

    /// Ensure a domain is bound to a zone (or not)
    Domain {
        /// Domain name
        domain: String,

        /// Nickname of the parent zone
        #[arg(short, long)]
        zone: String,

        /// Remove the domain
        #[arg(long)]
        absent: bool,
    },

    /// Ensure a zone record exists (or not)
    Record {
        /// Nickname of the parent zone
        #[arg(short, long)]
        zone: String,

        /// Record type: A, AAAA, CNAME, MX, NS, SRV or TXT
        #[arg(short = 't', long = "type")]
        record_type: RecordType,

        /// Record label; empty for the zone apex
        #[arg(short, long, default_value = "")]
        record: String,

        /// Record value (IP address, target host, text)
        #[arg(short, long, default_value = "")]
        address: String,

        #[arg(long, default_value_t = 0)]
        ttl: u32,

        #[arg(long, default_value_t = 0)]
        priority: u32,

        /// Address is relative to the zone (CNAME, MX, NS and SRV only)
        #[arg(long)]
        relative: bool,

        /// Delete every record with this zone, label and type
        #[arg(long)]
        absent: bool,
    },

    /// Request a DNS reload
    Reload {
        /// Wait for the reload job to finish
        #[arg(long)]
        poll: bool,
    },
}

/// A parsed command, ready to run.
#[derive(Debug, PartialEq)]
pub enum Operation {
    Apply(Manifest),
    Zone(ZoneSpec),
    Domain(ZoneDomainSpec),
    Record(ZoneRecordSpec),
    Reload { poll: bool },
}

impl Cli {
    pub fn options(&self) -> ReconcileOptions {
        ReconcileOptions {
            check_mode: self.check,
            poll: PollConfig {
                interval: Duration::from_secs(self.poll_interval),
                attempts_per_cycle: self.poll_attempts,
                max_cycles: self.poll_cycles,
            },
        }
    }
}

impl Command {
    pub async fn into_operation(self) -> anyhow::Result<Operation> {
        Ok(match self {
            Self::Apply { manifest } => {
                let text = tokio::fs::read_to_string(&manifest)
                    .await
                    .with_context(|| format!("Failed to read manifest {}", manifest.display()))?;
                let parsed = Manifest::from_json(&text)
                    .with_context(|| format!("Invalid manifest {}", manifest.display()))?;
                Operation::Apply(parsed)
            }
            Self::Zone {
                name,
                ttl,
                absent,
                force,
            } => Operation::Zone(ZoneSpec {
                nickname: name,
                ttl,
                state: state(absent),
                force,
            }),
            Self::Domain {
                domain,
                zone,
                absent,
            } => Operation::Domain(ZoneDomainSpec {
                domain,
                zone,
                state: state(absent),
            }),
            Self::Record {
                zone,
                record_type,
                record,
                address,
                ttl,
                priority,
                relative,
                absent,
            } => Operation::Record(ZoneRecordSpec {
                zone,
                record_type,
                record,
                address,
                ttl,
                priority,
                relative,
                state: state(absent),
            }),
            Self::Reload { poll } => Operation::Reload { poll },
        })
    }
}

fn state(absent: bool) -> DesiredState {
    if absent {
        DesiredState::Absent
    } else {
        DesiredState::Present
    }
}
