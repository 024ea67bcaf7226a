// Scenario coverage from the membership protocol's testable properties:
// basic join, failure detection + revival, re-join, gossip quiescence, and
// self-exclusion. Durations are scaled down from the spec's illustrative
// values but keep the same ratios, and run under a paused tokio clock so
// they're deterministic instead of flaky under real sleeps.

use std::sync::Arc;
use std::time::Duration;
use swimcore::{BasicRecord, Config, LocalNetwork, LocalTransport, Node, Status};

fn fast_config() -> Config {
    Config {
        ping_interval: Duration::from_millis(20),
        probe_timeout: Duration::from_millis(6),
        send_cap: 3,
        event_sink: None,
    }
}

async fn spawn_cluster(network: &LocalNetwork, count: usize, base_port: u16) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(count);
    for i in 0..count {
        let seed = nodes.first().map(|n: &Node| n.address().to_string());
        let node = Node::new(
            "127.0.0.1",
            base_port + i as u16,
            seed,
            None,
            fast_config(),
            Arc::new(LocalTransport::new(network.clone())),
        );
        network.register(node.address(), node.peer_handler()).await;
        nodes.push(node);
    }
    nodes
}

#[tokio::test(start_paused = true)]
async fn basic_join_converges_to_full_mutual_view() {
    let network = LocalNetwork::new();
    let nodes = spawn_cluster(&network, 10, 9200).await;

    tokio::time::advance(Duration::from_millis(1200)).await;
    tokio::task::yield_now().await;

    for node in &nodes {
        let members = node.members().await.unwrap();
        assert_eq!(members.len(), nodes.len() - 1, "node {} view size", node.address());
        assert!(members.iter().all(|m| m.status() == Status::Alive));
    }
}

#[tokio::test(start_paused = true)]
async fn killed_node_is_declared_failed_then_revives() {
    let network = LocalNetwork::new();
    let nodes = spawn_cluster(&network, 6, 9300).await;

    tokio::time::advance(Duration::from_millis(600)).await;
    tokio::task::yield_now().await;

    let victim_index = 3;
    nodes[victim_index].kill();

    tokio::time::advance(Duration::from_millis(1200)).await;
    tokio::task::yield_now().await;

    let victim_address = nodes[victim_index].address().to_string();
    for (i, node) in nodes.iter().enumerate() {
        if i == victim_index {
            continue;
        }
        let members = node.members().await.unwrap();
        let victim_view = members.iter().find(|m| m.address() == victim_address).unwrap();
        assert_eq!(victim_view.status(), Status::Failed);
    }

    nodes[victim_index].revive();
    tokio::time::advance(Duration::from_millis(600)).await;
    tokio::task::yield_now().await;

    for (i, node) in nodes.iter().enumerate() {
        if i == victim_index {
            continue;
        }
        let members = node.members().await.unwrap();
        let victim_view = members.iter().find(|m| m.address() == victim_address).unwrap();
        assert_eq!(victim_view.status(), Status::Alive);
    }
}

#[tokio::test(start_paused = true)]
async fn rejoin_expands_every_existing_member_table() {
    let network = LocalNetwork::new();
    let nodes = spawn_cluster(&network, 10, 9400).await;

    tokio::time::advance(Duration::from_millis(1200)).await;
    tokio::task::yield_now().await;

    let seed_for_newcomer = nodes[2].address().to_string();
    let newcomer = Node::new(
        "127.0.0.1",
        9411,
        Some(seed_for_newcomer),
        None,
        fast_config(),
        Arc::new(LocalTransport::new(network.clone())),
    );
    network.register(newcomer.address(), newcomer.peer_handler()).await;

    tokio::time::advance(Duration::from_millis(1200)).await;
    tokio::task::yield_now().await;

    for node in &nodes {
        let members = node.members().await.unwrap();
        assert_eq!(members.len(), 10, "node {} should now see 10 peers", node.address());
    }
}

#[tokio::test(start_paused = true)]
async fn gossip_quiescence_drains_pick_members_to_empty() {
    let network = LocalNetwork::new();
    let nodes = spawn_cluster(&network, 4, 9500).await;

    tokio::time::advance(Duration::from_millis(600)).await;
    tokio::task::yield_now().await;

    // Each record's send_count saturates at send_cap regardless of how many
    // probe rounds run afterward, so continuing to tick long past
    // convergence must drain every node's selector to empty.
    tokio::time::advance(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;

    for node in &nodes {
        let members = node.members().await.unwrap();
        assert_eq!(members.len(), nodes.len() - 1, "node {} should still see every peer", node.address());

        let picked = node.pick_members().await.unwrap();
        assert!(picked.is_empty(), "node {} selector should be quiescent", node.address());
    }
}

#[tokio::test]
async fn self_exclusion_ignores_recipient_addressed_record() {
    let network = LocalNetwork::new();
    let recipient = Node::new(
        "127.0.0.1",
        9600,
        None,
        None,
        fast_config(),
        Arc::new(LocalTransport::new(network.clone())),
    );
    network
        .register(recipient.address(), recipient.peer_handler())
        .await;

    let handler = recipient.peer_handler();
    let poison = BasicRecord::new(recipient.address(), Status::Failed);
    let response = handler
        .handle(swimcore::PingRequest {
            address: "127.0.0.1:9601".to_string(),
            metadata: None,
            nodes: vec![poison],
        })
        .await
        .unwrap();
    assert!(response.ack);

    let members = recipient.members().await.unwrap();
    assert!(members.iter().all(|m| m.address() != recipient.address()));
}
