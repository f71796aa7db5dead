use meshcast::{Address, Config, Event, Node, UdpTransport};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Answers the few commands this demo understands
fn run_command(payload: &str) -> meshcast::Result<String> {
    match payload.split_whitespace().next() {
        Some("STATUS") => Ok("up".to_string()),
        Some("ECHO") => Ok(payload.trim_start().trim_start_matches("ECHO").trim().to_string()),
        Some(other) => Err(meshcast::Error::executor(format!("unknown command {}", other))),
        None => Err(meshcast::Error::executor("empty command")),
    }
}

#[tokio::main]
async fn main() -> meshcast::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Usage: mesh_node [config.toml]
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    println!("Starting mesh node:");
    println!("- Node id: {}", config.node_id);
    println!("- Address: {}:{}", config.address, config.port);
    println!("- Static peers: {}", config.peers.len());
    println!("- Session capacity: {} ({:?})", config.session_capacity, config.eviction);
    println!("\nCommands:");
    println!("  b <payload>        broadcast to the mesh");
    println!("  d <ip> <message>   send a direct message");
    println!("  u <message>        send a datagram on the broadcast channel");
    println!("  clear              drop in-flight broadcasts");

    let transport = UdpTransport::bind(&config).await?;
    let (node, handle, mut events) = Node::new(&config, transport, run_command);
    let node_task = tokio::spawn(node.run());

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                Event::Completed { id, response } => {
                    println!("\nBroadcast {} complete:", id);
                    for c in meshcast::contributions(&response) {
                        println!("- {}: {}", c.node, c.result);
                    }
                }
                Event::Direct { origin, payload, .. } => println!("\nMessage from {}: {}", origin, payload),
                Event::Datagram { payload, .. } => println!("\nDatagram: {}", payload),
                Event::Connected { from } => println!("\nNeighbor {} connected", from),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let result = match command {
            "b" => handle.broadcast(rest).await.map(|id| println!("Broadcast {} started", id)),
            "d" => match rest.split_once(' ') {
                Some((ip, message)) => match ip.parse::<Address>() {
                    Ok(to) => handle.direct(to, message).await.map(|_| ()),
                    Err(e) => Err(e),
                },
                None => {
                    eprintln!("Usage: d <ip> <message>");
                    continue;
                }
            },
            "u" => handle.datagram(rest).await.map(|_| ()),
            "clear" => handle
                .clear_sessions()
                .await
                .map(|cleared| println!("Cleared {} broadcasts", cleared)),
            "" => continue,
            other => {
                eprintln!("Unknown command: {}", other);
                continue;
            }
        };
        if let Err(e) = result {
            eprintln!("Error: {}", e);
        }
    }

    drop(handle);
    match node_task.await {
        Ok(result) => result,
        Err(e) => Err(meshcast::Error::network(format!("Node task failed: {}", e))),
    }
}
