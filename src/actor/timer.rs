use super::mailbox::Mailbox;
use super::message::Message;

/// Routes timer expiries through the actor thread.
///
/// The callback runs on the actor with exclusive access to the engine, so
/// timer-driven engine work is serialized with everything else.
pub struct TimerDispatcher<E> {
    mailbox: Mailbox<E>,
}

impl<E> Clone for TimerDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            mailbox: self.mailbox.clone(),
        }
    }
}

impl<E> TimerDispatcher<E> {
    pub(crate) fn new(mailbox: Mailbox<E>) -> Self {
        Self { mailbox }
    }

    /// Queue `callback` for the actor. Returns false if the mailbox was full.
    pub fn expire<F>(&self, callback: F) -> bool
    where
        F: FnOnce(&mut E) + Send + 'static,
    {
        self.mailbox.post(Message::TimerExpired(Box::new(callback)))
    }
}
