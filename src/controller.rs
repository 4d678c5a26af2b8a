use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::bus::ActionBus;
use crate::config::AppConfig;
use crate::domain::{CFError, Message, TableKey};
use crate::model::{ColumnPreference, Model};
use crate::sync::SyncTrigger;

#[derive(Debug, PartialEq)]
pub enum Status {
    RUNNING,
    QUITTING,
}

enum Command {
    Dispatch(Message),
    Columns {
        table: TableKey,
        reply: oneshot::Sender<ColumnPreference>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
    Quit,
}

/// Owns the column preferences of all tables and applies messages one at a
/// time, in the order they were sent.
pub struct Controller {
    model: Model,
    sync: SyncTrigger,
    bus: ActionBus,
    receiver: mpsc::Receiver<Command>,
    pending_saves: Vec<JoinHandle<()>>,
    status: Status,
}

/// Cheap handle to send commands to a running [`Controller`].
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<Command>,
}

impl Controller {
    pub fn new(cfg: &AppConfig, sync: SyncTrigger, bus: ActionBus) -> (Self, ControllerHandle) {
        let (sender, receiver) = mpsc::channel(cfg.command_buffer.max(1));
        let controller = Self {
            model: Model::new(),
            sync,
            bus,
            receiver,
            pending_saves: Vec::new(),
            status: Status::RUNNING,
        };
        (controller, ControllerHandle { sender })
    }

    /// Processes commands until asked to quit or every handle is dropped.
    /// Waits for outstanding saves before handing back the final state.
    pub async fn run(mut self) -> Model {
        info!("Column controller started");
        while self.status == Status::RUNNING {
            let Some(command) = self.receiver.recv().await else {
                debug!("All controller handles dropped");
                break;
            };
            self.handle(command).await;
        }
        self.status = Status::QUITTING;
        self.flush().await;
        info!("Column controller stopped");
        self.model
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Dispatch(message) => self.dispatch(message),
            Command::Columns { table, reply } => {
                let columns = self.model.preference(&table).cloned().unwrap_or_default();
                let _ = reply.send(columns);
            }
            Command::Flush { reply } => {
                self.flush().await;
                let _ = reply.send(());
            }
            Command::Quit => self.status = Status::QUITTING,
        }
    }

    fn dispatch(&mut self, message: Message) {
        self.model.update(&message);
        if let Some(save) = self.sync.on_message(&message, &self.model) {
            self.pending_saves.retain(|h| !h.is_finished());
            self.pending_saves.push(save);
        }
        self.bus.publish(&message);
    }

    async fn flush(&mut self) {
        trace!("Waiting for {} saves", self.pending_saves.len());
        for save in self.pending_saves.drain(..) {
            if let Err(e) = save.await {
                warn!("Save task did not finish: {e}");
            }
        }
    }
}

impl ControllerHandle {
    pub async fn dispatch(&self, message: Message) -> Result<(), CFError> {
        self.send(Command::Dispatch(message)).await
    }

    /// Current columns of `table`; empty lists if it was never set.
    pub async fn columns(&self, table: &TableKey) -> Result<ColumnPreference, CFError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Columns {
            table: table.clone(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| CFError::ControllerClosed)
    }

    /// Resolves once every save triggered by earlier messages has finished.
    pub async fn flush(&self) -> Result<(), CFError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Flush { reply }).await?;
        rx.await.map_err(|_| CFError::ControllerClosed)
    }

    pub async fn quit(&self) -> Result<(), CFError> {
        self.send(Command::Quit).await
    }

    async fn send(&self, command: Command) -> Result<(), CFError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| CFError::ControllerClosed)
    }
}
