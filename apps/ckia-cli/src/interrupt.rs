//! Ctrl-C handling: the first interrupt cancels the run, a second one exits

use ckia_core::CancellationToken;
use std::future::Future;
use tracing::warn;

/// Exit status after a second interrupt
const INTERRUPTED: i32 = 130;

/// Cancel `token` on Ctrl-C from a background listener thread
pub fn cancel_on_interrupt(token: CancellationToken) {
    let spawned = std::thread::Builder::new()
        .name("ckia-interrupt".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("Interrupt handling unavailable: {}", e);
                    return;
                }
            };

            runtime.block_on(async {
                if cancel_on(tokio::signal::ctrl_c(), &token).await
                    && tokio::signal::ctrl_c().await.is_ok()
                {
                    std::process::exit(INTERRUPTED);
                }
            });
        });

    if let Err(e) = spawned {
        warn!("Interrupt handling unavailable: {}", e);
    }
}

/// Wait for `signal`, then cancel; false if the signal could not be awaited
async fn cancel_on<F>(signal: F, token: &CancellationToken) -> bool
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            warn!("Interrupted; cancelling remaining checks");
            token.cancel();
            true
        }
        Err(e) => {
            warn!("Cannot listen for interrupts: {}", e);
            false
        }
    }
}
