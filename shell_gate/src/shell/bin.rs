// Binary entry point for shell_gate
// This is a thin wrapper that delegates to the library implementation

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = shell_gate::shell::run().await {
        eprintln!("shell_gate fatal error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
