//! MAC actor
//!
//! A single worker thread owns the MAC engine and the radio driver. Every
//! other thread talks to it through a bounded mailbox:
//! - Callers send commands and wait for a single-use reply
//! - The radio interrupt and timeout timers post events without blocking
//! - Engine confirms and indications are turned into terminal events
//!
//! Every accepted join or send carries its own single-use reply endpoint. The
//! terminal event of that operation reopens the Idle/Busy gate and is delivered
//! only there; terminal events with no matching operation in flight are dropped.
//! Downlinks arriving outside an uplink cycle go to threads waiting in
//! `receive()` without an operation of their own.

mod callbacks;
mod context;
mod handlers;
mod mailbox;
mod message;
mod radio_events;
mod timer;
mod worker;

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};

use crate::error::ActorError;
use crate::lorawan::engine::MacEngine;
use crate::lorawan::primitives::LoRaMacStatus;
use crate::radio::traits::RadioDriver;

pub use context::{LinkCheckInfo, MacState, RxData};
pub use mailbox::MAILBOX_CAPACITY;
pub use message::TimerCallback;
pub use radio_events::RadioNotifier;
pub use timer::TimerDispatcher;

pub(crate) use context::{lock, MacContext, SharedContext};
pub(crate) use mailbox::Mailbox;
pub(crate) use message::{Command, CommandReply, Message};

use worker::Worker;

/// Name of the worker thread
pub const WORKER_NAME: &str = "loramac";

/// Spawn the worker and wait until the engine reports its start-up status
pub(crate) fn spawn<E, R>(
    engine: E,
    radio: R,
    context: SharedContext,
    mailbox: Mailbox<E>,
    inbox: Receiver<Message<E>>,
) -> Result<JoinHandle<()>, ActorError>
where
    E: MacEngine + Send + 'static,
    R: RadioDriver + Send + 'static,
{
    let (ready_tx, ready_rx) = bounded(1);
    let worker = Worker::new(engine, radio, context, mailbox);
    let handle = thread::Builder::new()
        .name(WORKER_NAME.into())
        .spawn(move || worker.start(inbox, ready_tx))?;

    match ready_rx.recv() {
        Ok(LoRaMacStatus::Ok) => Ok(handle),
        Ok(status) => {
            let _ = handle.join();
            Err(ActorError::EngineInit(status))
        }
        Err(_) => {
            let _ = handle.join();
            Err(ActorError::Disconnected)
        }
    }
}
