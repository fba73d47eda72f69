use anyhow::Result;
use kinship::config::ServerConfig;
use kinship::http::HttpServer;
use kinship::persistence::SnapshotStore;
use kinship::seed::seed_demo_space;
use kinship::space::SpaceManager;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Kinship Family Tree Server v{}", kinship::version());
    println!("==========================================");
    println!();

    let config = ServerConfig::load()?;

    let manager = match &config.data_path {
        Some(path) => SpaceManager::with_snapshots(SnapshotStore::open(path)?)?,
        None => SpaceManager::new(),
    };

    let (spaces, users, people, relationships) = manager.counts();
    if spaces == 0 && users == 0 && config.seed_demo {
        let (admin, space) = seed_demo_space(&manager)?;
        println!("Seeded demo space: {space}");
        println!("Admin user id:     {admin}");
    } else {
        println!(
            "Loaded {spaces} spaces, {users} users, {people} people, {relationships} relationships"
        );
    }
    println!();
    println!("Caller identity comes from the x-user-id header.");
    println!();

    let server = HttpServer::new(Arc::new(manager), config.address.clone(), config.port);
    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    Ok(())
}
