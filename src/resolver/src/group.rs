use std::collections::HashMap;

use common::model::{EndpointGroup, EndpointRecord};

/// Group a flat list of endpoint records into one group per distinct port.
///
/// Groups come out in first-occurrence order of their port, and within a
/// group the IPs keep input order, duplicates included. A port of `0` ("no
/// port recorded") is grouped like any other value, never dropped or merged
/// into another group.
pub fn group_by_port(records: &[EndpointRecord]) -> Vec<EndpointGroup> {
    let mut groups: Vec<EndpointGroup> = Vec::new();
    let mut by_port: HashMap<u16, usize> = HashMap::new();

    for rec in records {
        match by_port.get(&rec.port) {
            Some(&idx) => groups[idx].ips.push(rec.ip.clone()),
            None => {
                by_port.insert(rec.port, groups.len());
                groups.push(EndpointGroup {
                    port: rec.port,
                    ips: vec![rec.ip.clone()],
                });
            }
        }
    }

    // TODO: decide how a zero port should reconcile with multiple non-zero
    // ports for the same service; until then zero stays its own group.
    groups
}
