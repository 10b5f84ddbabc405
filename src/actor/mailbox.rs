use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, warn};

use crate::error::ActorError;

use super::message::{Command, CommandReply, Message};

/// Number of messages the actor can have queued
pub const MAILBOX_CAPACITY: usize = 16;

/// Producer side of the actor mailbox.
///
/// Interrupt, timer and engine producers use [`Mailbox::post`], which never
/// blocks. Caller threads use [`Mailbox::call`], which blocks until the actor
/// has executed the command.
pub(crate) struct Mailbox<E> {
    tx: Sender<Message<E>>,
}

impl<E> Clone for Mailbox<E> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<E> Mailbox<E> {
    /// Create the mailbox and its single consumer end
    pub(crate) fn new() -> (Self, Receiver<Message<E>>) {
        let (tx, rx) = bounded(MAILBOX_CAPACITY);
        (Self { tx }, rx)
    }

    /// Enqueue without blocking. A full mailbox drops the message.
    pub(crate) fn post(&self, msg: Message<E>) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(msg)) => {
                warn!("mailbox full, dropped {} message", msg.tag());
                false
            }
            Err(TrySendError::Disconnected(msg)) => {
                debug!("worker stopped, dropped {} message", msg.tag());
                false
            }
        }
    }

    /// Run `command` on the actor and wait for its reply
    pub(crate) fn call(&self, command: Command) -> Result<CommandReply, ActorError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(Message::Command(command, Some(ReplyTo(reply_tx))))
            .map_err(|_| ActorError::Disconnected)?;
        reply_rx.recv().map_err(|_| ActorError::Disconnected)
    }

    /// Enqueue `command` without waiting for it to run
    pub(crate) fn cast(&self, command: Command) -> Result<(), ActorError> {
        self.tx
            .send(Message::Command(command, None))
            .map_err(|_| ActorError::Disconnected)
    }

    /// Enqueue, blocking while the mailbox is full
    pub(crate) fn send_blocking(&self, msg: Message<E>) -> Result<(), ActorError> {
        self.tx.send(msg).map_err(|_| ActorError::Disconnected)
    }
}

/// Single-use reply slot of a [`Mailbox::call`]
#[derive(Debug)]
pub(crate) struct ReplyTo(Sender<CommandReply>);

impl ReplyTo {
    pub(crate) fn send(self, reply: CommandReply) {
        if self.0.send(reply).is_err() {
            debug!("caller went away before reply {:?}", reply);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    type TestMailbox = Mailbox<()>;

    #[test]
    fn test_post_fails_without_blocking_when_full() {
        let (mailbox, inbox) = TestMailbox::new();
        for _ in 0..MAILBOX_CAPACITY {
            assert!(mailbox.post(Message::Isr));
        }
        assert!(!mailbox.post(Message::Isr));
        assert_eq!(inbox.len(), MAILBOX_CAPACITY);
    }

    #[test]
    fn test_post_after_consumer_dropped() {
        let (mailbox, inbox) = TestMailbox::new();
        drop(inbox);
        assert!(!mailbox.post(Message::TxDone));
    }

    #[test]
    fn test_call_waits_for_reply() {
        let (mailbox, inbox) = TestMailbox::new();
        let actor = thread::spawn(move || match inbox.recv().unwrap() {
            Message::Command(Command::LinkCheck, Some(reply)) => reply.send(CommandReply::Queued),
            other => panic!("unexpected {}", other.tag()),
        });

        assert_eq!(mailbox.call(Command::LinkCheck).unwrap(), CommandReply::Queued);
        actor.join().unwrap();
    }

    #[test]
    fn test_call_without_consumer() {
        let (mailbox, inbox) = TestMailbox::new();
        drop(inbox);
        assert!(matches!(
            mailbox.call(Command::LinkCheck),
            Err(ActorError::Disconnected)
        ));
    }

    #[test]
    fn test_reply_dropped_by_actor() {
        let (mailbox, inbox) = TestMailbox::new();
        let actor = thread::spawn(move || drop(inbox.recv().unwrap()));
        assert!(matches!(
            mailbox.call(Command::LinkCheck),
            Err(ActorError::Disconnected)
        ));
        actor.join().unwrap();
    }
}
