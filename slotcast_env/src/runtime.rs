//! The real-time interpreter: one tokio task per agent, real sleeps, one
//! shared broadcast transport.

use crate::error::RunError;
use crate::sink::OutputSink;
use slotcast_core::{Agent, Instr};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::debug;

/// Tuning knobs for a real-time run.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Real-time length of one `pause` unit.
    pub tick: Duration,

    /// Capacity of the shared broadcast transport. A receiver that falls
    /// further behind than this is surfaced as [`RunError::Lagged`].
    pub transport_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            transport_capacity: 1024,
        }
    }
}

/// The concurrent interpreter.
///
/// [`TokioRuntime::run`] executes a list of agents to completion, each on
/// its own task of the surrounding tokio runtime. The caller blocks until
/// every agent finishes; protocol agents never do, so callers bound such
/// runs externally (`tokio::time::timeout`, process signal). Cancelling the
/// returned future aborts all agent tasks.
pub struct TokioRuntime {
    config: RuntimeConfig,
    sink: Arc<dyn OutputSink>,
}

impl TokioRuntime {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            config: RuntimeConfig::default(),
            sink,
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the agents and returns their results in input order.
    ///
    /// A fault in one agent (panic, lagged transport) occupies that agent's
    /// result slot without stopping the others; shared resources stay
    /// usable because sink and transport locks are scoped per operation.
    pub async fn run<M, A>(&self, agents: Vec<Agent<M, A>>) -> Result<Vec<Result<A, RunError>>, RunError>
    where
        M: Clone + fmt::Display + Send + 'static,
        A: Send + 'static,
    {
        if self.config.transport_capacity == 0 {
            return Err(RunError::config("transport capacity must be at least 1"));
        }

        let total = agents.len();
        let (tx, _) = broadcast::channel::<M>(self.config.transport_capacity);

        let mut tasks = JoinSet::new();
        let mut index_of = HashMap::new();
        for (index, agent) in agents.into_iter().enumerate() {
            // Subscribe before any task can run, so every agent observes
            // every broadcast from the start of the run.
            let rx = tx.subscribe();
            let tx = tx.clone();
            let sink = Arc::clone(&self.sink);
            let tick = self.config.tick;
            let handle = tasks.spawn(drive(index, agent, tx, rx, sink, tick));
            index_of.insert(handle.id(), index);
        }
        drop(tx);

        let mut results: Vec<Option<Result<A, RunError>>> =
            std::iter::repeat_with(|| None).take(total).collect();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    if let Some(&index) = index_of.get(&id) {
                        results[index] = Some(result);
                    }
                }
                Err(join_err) => {
                    debug!("agent task fault: {join_err}");
                    if let Some(&index) = index_of.get(&join_err.id()) {
                        results[index] = Some(Err(RunError::AgentFailed(join_err.to_string())));
                    }
                }
            }
        }

        Ok(results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(RunError::AgentFailed("agent produced no result".into())))
            })
            .collect())
    }
}

/// Drives one agent: an iterative loop pattern-matching the current
/// instruction and resuming the continuation with its reply.
async fn drive<M, A>(
    index: usize,
    mut agent: Agent<M, A>,
    tx: broadcast::Sender<M>,
    mut rx: broadcast::Receiver<M>,
    sink: Arc<dyn OutputSink>,
    tick: Duration,
) -> Result<A, RunError>
where
    M: Clone + fmt::Display + Send + 'static,
    A: Send + 'static,
{
    loop {
        agent = match agent {
            Agent::Done(value) => {
                debug!(agent = index, "agent finished");
                return Ok(value);
            }
            Agent::Yield(Instr::Pause(resume)) => {
                tokio::time::sleep(tick).await;
                resume()
            }
            Agent::Yield(Instr::Broadcast(msg, resume)) => {
                sink.emit(&msg.to_string()).await?;
                // Our own receiver is subscribed, so the send cannot fail
                // while this task is alive and the message reaches
                // ourselves as well.
                tx.send(msg).map_err(|_| RunError::TransportClosed)?;
                resume()
            }
            Agent::Yield(Instr::Receive(resume)) => match rx.recv().await {
                Ok(msg) => resume(msg),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(agent = index, missed, "receiver lagged");
                    return Err(RunError::Lagged(missed));
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(RunError::TransportClosed);
                }
            },
        };
    }
}
