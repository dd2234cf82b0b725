//! Read-only queries, printed as pretty JSON

use super::{or_empty, print_json, CommandResult};
use chrono::{DateTime, Utc};
use clap::Args;
use gcr_store::{RecorderStore, SnapshotStore};

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

#[derive(Debug, Args)]
pub struct NodesArgs {
    /// Cutoff, e.g. 2024-03-01T10:00:00Z
    #[arg(long, value_parser = parse_timestamp)]
    pub before: DateTime<Utc>,

    /// Latest snapshot per node, leaving out deleted nodes
    #[arg(long)]
    pub active: bool,
}

#[derive(Debug, Args)]
pub struct PodsArgs {
    #[arg(long, value_parser = parse_timestamp)]
    pub before: DateTime<Utc>,

    /// Only pods bound to a node
    #[arg(long, conflicts_with = "unscheduled")]
    pub scheduled: bool,

    /// Only pods still waiting for a node
    #[arg(long)]
    pub unscheduled: bool,
}

#[derive(Debug, Args)]
pub struct MachineDeploymentArgs {
    #[arg(long)]
    pub name: String,
}

pub fn nodes(store: &RecorderStore, args: NodesArgs) -> CommandResult {
    let nodes = store.nodes()?;
    let infos = if args.active {
        nodes.latest_not_deleted_before(args.before)?
    } else {
        or_empty(nodes.load_before(args.before))?
    };
    print_json(&infos)
}

pub fn pods(store: &RecorderStore, args: PodsArgs) -> CommandResult {
    let pods = store.pods()?;
    let result = if args.scheduled {
        pods.scheduled_before(args.before)
    } else if args.unscheduled {
        pods.unscheduled_before(args.before)
    } else {
        pods.latest_before_snapshot_time(args.before)
    };
    print_json(&or_empty(result)?)
}

pub fn machine_deployment(store: &RecorderStore, args: MachineDeploymentArgs) -> CommandResult {
    let info = store.machine_deployments()?.load_latest(&args.name)?;
    print_json(&info)
}

pub fn events(store: &RecorderStore) -> CommandResult {
    print_json(&or_empty(store.events()?.load_all())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_normalises_to_utc() {
        let ts = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }
}
