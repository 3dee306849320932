use outlook_bridge::{Config, OutlookBridge};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    let bridge = OutlookBridge::from_config(&config);

    println!("Checking whether {} is running...", config.app_name);
    if !bridge.is_running().await {
        println!("❌ {} is not running (or automation access was denied)", config.app_name);
        std::process::exit(1);
    }
    println!("✅ {} is running", config.app_name);

    println!("\n=== Folders ===");
    let folders = bridge.list_folders().await?;
    for folder in &folders {
        println!("  {:<50} {:>8}", folder.name, folder.message_count);
    }
    println!("\n{} folders reported", folders.len());

    Ok(())
}
