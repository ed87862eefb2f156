#![allow(dead_code)]

pub use syncserver_test_utils::builders;
pub use syncserver_test_utils::fake_spawner::FakeSpawner;
pub use syncserver_test_utils::{init_tracing, settle, with_timeout};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use syncserver::control::OperatorCommand;
use syncserver::engine::{RuntimeEvent, ShutdownReason};
use syncserver::errors::Result;
use syncserver::types::ChangeKind;
use syncserver::watch::WatchEvent;

use self::builders::RuntimeBuilder;

/// A running runtime plus the handles a test needs to drive it.
pub struct Harness {
    pub tx: mpsc::Sender<RuntimeEvent>,
    pub spawner: FakeSpawner,
    pub handle: JoinHandle<Result<()>>,
}

impl Harness {
    /// Spawn the runtime and let it start the first child.
    pub async fn start(builder: RuntimeBuilder, spawner: FakeSpawner) -> Self {
        init_tracing();
        let (runtime, tx) = builder.build(spawner.clone());
        let handle = tokio::spawn(runtime.run());
        settle().await;
        Self { tx, spawner, handle }
    }

    pub async fn send(&self, event: RuntimeEvent) {
        self.tx.send(event).await.expect("runtime is gone");
        settle().await;
    }

    pub async fn change(&self, path: &str) {
        self.send(RuntimeEvent::FileChanged(WatchEvent::new(
            path,
            ChangeKind::Modified,
            Instant::now(),
        )))
        .await;
    }

    pub async fn command(&self, command: OperatorCommand) {
        self.send(RuntimeEvent::Operator(command)).await;
    }

    pub async fn signal(&self, reason: ShutdownReason) {
        self.send(RuntimeEvent::ShutdownRequested { reason }).await;
    }

    /// Request shutdown and wait for the runtime to return.
    pub async fn shutdown(self) -> Result<()> {
        // The runtime may already have exited; a failed send is fine then.
        let _ = self
            .tx
            .send(RuntimeEvent::ShutdownRequested {
                reason: ShutdownReason::Operator,
            })
            .await;
        with_timeout(self.handle)
            .await
            .expect("runtime task panicked")
    }
}
