use crate::coach::{CoachError, CoachProxy, CoachStatus};
use crate::event::AppEvent;
use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use tokio::runtime::Handle;
use tokio::sync::Mutex;

/// Runs coach turns on the async runtime and reports back over the UI channel.
///
/// At most one turn is in flight; `send` refuses new prompts until the
/// previous reply has been delivered.
#[derive(Clone)]
pub struct CoachClient {
    tx: mpsc::Sender<AppEvent>,
    proxy: Arc<Mutex<CoachProxy>>,
    runtime_handle: Handle,
    in_flight: Arc<AtomicBool>,
    initial_status: CoachStatus,
}

impl CoachClient {
    pub fn new(proxy: CoachProxy, tx: mpsc::Sender<AppEvent>) -> Result<Self, CoachError> {
        let runtime_handle = Handle::try_current()
            .map_err(|err| CoachError::RuntimeUnavailable(err.to_string()))?;

        Ok(Self {
            tx,
            initial_status: proxy.status(),
            proxy: Arc::new(Mutex::new(proxy)),
            runtime_handle,
            in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn initial_status(&self) -> CoachStatus {
        self.initial_status
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Opens the session in the background so the first turn is quicker.
    pub fn start(&self) {
        let tx = self.tx.clone();
        let proxy = Arc::clone(&self.proxy);

        self.runtime_handle.spawn(async move {
            let mut proxy = proxy.lock().await;
            match proxy.init().await {
                Ok(status) => {
                    let _ = tx.send(AppEvent::CoachStatus(status));
                }
                Err(err) => {
                    warn!("coach session not ready yet: {err}");
                    let _ = tx.send(AppEvent::Diagnostic(format!(
                        "coach session not ready yet: {err}"
                    )));
                    let _ = tx.send(AppEvent::CoachStatus(proxy.status()));
                }
            }
        });
    }

    pub fn send(&self, prompt: String) -> bool {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let tx = self.tx.clone();
        let proxy = Arc::clone(&self.proxy);
        let in_flight = Arc::clone(&self.in_flight);

        self.runtime_handle.spawn(async move {
            let (reply, status) = {
                let mut proxy = proxy.lock().await;
                let reply = proxy.send(&prompt).await;
                (reply, proxy.status())
            };
            in_flight.store(false, Ordering::SeqCst);
            let _ = tx.send(AppEvent::CoachStatus(status));
            let _ = tx.send(AppEvent::CoachReply(reply));
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::CoachClient;
    use crate::coach::testing::ScriptedBackend;
    use crate::coach::{
        ChatBackend, CoachProxy, CoachStatus, SessionConfig, MISSING_CREDENTIAL_REPLY,
    };
    use crate::event::AppEvent;
    use std::sync::mpsc::{self, Receiver};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn next_reply(rx: &Receiver<AppEvent>) -> String {
        loop {
            match rx.recv_timeout(Duration::from_secs(5)) {
                Ok(AppEvent::CoachReply(text)) => return text,
                Ok(_) => continue,
                Err(err) => panic!("no coach reply: {err}"),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn only_one_turn_is_admitted_at_a_time() {
        let gate = Arc::new(Semaphore::new(0));
        let backend = ScriptedBackend::with_replies(vec![Ok("Five more sets."), Ok("Rest.")])
            .gated(Arc::clone(&gate));
        let proxy = CoachProxy::new(
            Some(Arc::new(backend.clone()) as Arc<dyn ChatBackend>),
            SessionConfig::coaching("test-model"),
            Duration::from_secs(5),
        );
        let (tx, rx) = mpsc::channel();
        let client = CoachClient::new(proxy, tx).expect("runtime should be available");

        assert!(client.send("first".to_string()));
        assert!(client.is_busy());
        assert!(!client.send("second".to_string()));

        gate.add_permits(1);
        let reply = tokio::task::spawn_blocking(move || {
            let reply = next_reply(&rx);
            (reply, rx)
        })
        .await
        .expect("receiver task should finish");
        let (text, rx) = reply;
        assert_eq!(text, "Five more sets.");
        assert!(!client.is_busy());

        gate.add_permits(1);
        assert!(client.send("third".to_string()));
        let text = tokio::task::spawn_blocking(move || next_reply(&rx))
            .await
            .expect("receiver task should finish");
        assert_eq!(text, "Rest.");

        assert_eq!(
            *backend.turns.lock().expect("turns lock"),
            vec!["first".to_string(), "third".to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unavailable_coach_replies_without_backend() {
        let proxy = CoachProxy::new(None, SessionConfig::coaching("unused"), Duration::from_secs(1));
        let (tx, rx) = mpsc::channel();
        let client = CoachClient::new(proxy, tx).expect("runtime should be available");
        assert_eq!(client.initial_status(), CoachStatus::Unavailable);

        client.start();
        assert!(client.send("anyone there?".to_string()));
        let text = tokio::task::spawn_blocking(move || next_reply(&rx))
            .await
            .expect("receiver task should finish");
        assert_eq!(text, MISSING_CREDENTIAL_REPLY);
    }

    #[test]
    fn construction_requires_a_runtime() {
        let proxy = CoachProxy::new(None, SessionConfig::coaching("unused"), Duration::from_secs(1));
        let (tx, _rx) = mpsc::channel();
        assert!(CoachClient::new(proxy, tx).is_err());
    }
}
