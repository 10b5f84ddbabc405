use log::{debug, warn};

use crate::lorawan::engine::RadioEvents;
use crate::radio::traits::{RadioDriver, RadioEvent, RX_BUFFER_SIZE};

use super::mailbox::Mailbox;
use super::message::Message;

/// Interrupt-context producer for radio events.
///
/// Hand a clone to the platform's DIO interrupt handler and timeout timers.
/// Every method is non-blocking; a full mailbox loses the event and is logged.
pub struct RadioNotifier<E> {
    mailbox: Mailbox<E>,
}

impl<E> Clone for RadioNotifier<E> {
    fn clone(&self) -> Self {
        Self {
            mailbox: self.mailbox.clone(),
        }
    }
}

impl<E> RadioNotifier<E> {
    pub(crate) fn new(mailbox: Mailbox<E>) -> Self {
        Self { mailbox }
    }

    /// The radio interrupt line fired
    pub fn interrupt(&self) -> bool {
        self.forward(Message::Isr)
    }

    /// The receive window timed out
    pub fn rx_timeout(&self) -> bool {
        self.forward(Message::RxTimeout)
    }

    /// The transmission timed out
    pub fn tx_timeout(&self) -> bool {
        self.forward(Message::TxTimeout)
    }

    fn forward(&self, msg: Message<E>) -> bool {
        let tag = msg.tag();
        let queued = self.mailbox.post(msg);
        if !queued {
            warn!("{}: possibly lost interrupt", tag);
        }
        queued
    }
}

/// Routes driver events to the engine on the actor thread.
///
/// Completion events are forwarded synchronously; timeouts go back through
/// the mailbox so they are ordered with the rest of the actor's work.
pub(crate) struct RadioEventAdapter<E> {
    notifier: RadioNotifier<E>,
}

impl<E: RadioEvents> RadioEventAdapter<E> {
    pub(crate) fn new(mailbox: Mailbox<E>) -> Self {
        Self {
            notifier: RadioNotifier::new(mailbox),
        }
    }

    /// Run the driver's interrupt service routine and dispatch its events
    pub(crate) fn service<R: RadioDriver>(&self, radio: &mut R, engine: &mut E) {
        match radio.isr() {
            Ok(events) => {
                for event in events {
                    self.dispatch(event, radio, engine);
                }
            }
            Err(e) => warn!("radio ISR failed: {:?}", e),
        }
    }

    pub(crate) fn dispatch<R: RadioDriver>(&self, event: RadioEvent, radio: &mut R, engine: &mut E) {
        match event {
            // Already being serviced; reposting would loop on a level-triggered report
            RadioEvent::Isr => debug!("ignoring ISR event reported by the driver"),
            RadioEvent::TxComplete => {
                if let Err(e) = radio.sleep() {
                    warn!("radio sleep failed: {:?}", e);
                }
                engine.tx_done();
                debug!("transmission completed");
            }
            RadioEvent::TxTimeout => {
                self.notifier.tx_timeout();
            }
            RadioEvent::RxComplete => {
                let mut buffer = [0u8; RX_BUFFER_SIZE];
                match radio.read_packet(&mut buffer) {
                    Ok((len, info)) => engine.rx_done(&buffer[..len], info.rssi, info.snr),
                    Err(e) => {
                        warn!("reading received frame failed: {:?}", e);
                        engine.rx_error();
                    }
                }
            }
            RadioEvent::RxTimeout => {
                self.notifier.rx_timeout();
            }
            RadioEvent::CrcError => {
                debug!("RX CRC error");
                engine.rx_error();
            }
            RadioEvent::FhssChangeChannel => {
                debug!("FHSS channel change");
                engine.fhss_change_channel(radio.last_channel());
            }
            RadioEvent::CadDone => {
                debug!("CAD done");
                engine.cad_done(radio.last_cad_success());
            }
            RadioEvent::CadDetected => debug!("CAD detected"),
            RadioEvent::ValidHeader => debug!("valid header received"),
        }
    }
}
