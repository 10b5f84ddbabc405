use crossbeam_channel::Sender;

use crate::config::device::JoinType;
use crate::device::{JoinOutcome, ReceiveOutcome};
use crate::lorawan::primitives::{McpsIndication, Payload};

use super::mailbox::ReplyTo;

/// Deferred work executed on the actor thread with exclusive engine access
pub type TimerCallback<E> = Box<dyn FnOnce(&mut E) + Send>;

/// Single-use endpoint receiving the result of one OTAA join
pub(crate) type JoinWaiter = Sender<JoinOutcome>;

/// Single-use endpoint receiving one uplink outcome or downlink
pub(crate) type UplinkWaiter = Sender<ReceiveOutcome>;

/// Operation a caller asks the actor to run
#[derive(Debug)]
pub(crate) enum Command {
    /// Activate with the given procedure; the OTAA result goes to `reply_to`
    Join {
        join_type: JoinType,
        reply_to: JoinWaiter,
    },
    /// Uplink the payload on the configured port; the outcome goes to `reply_to`
    Send {
        payload: Payload,
        reply_to: UplinkWaiter,
    },
    /// Wait for the next downlink outside of an uplink cycle
    Listen(UplinkWaiter),
    /// Queue a LinkCheckReq
    LinkCheck,
}

/// Immediate answer to a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandReply {
    /// Another operation is in flight
    Busy,
    /// Send attempted before activation
    NotJoined,
    /// OTAA join dispatched, result follows on the join waiter
    JoinPending,
    /// ABP activation complete
    Joined,
    /// Uplink handed to the engine
    TxScheduled,
    /// Fire-and-forget request accepted
    Queued,
}

/// Everything the actor loop consumes
pub(crate) enum Message<E> {
    /// Radio interrupt pending
    Isr,
    /// Radio receive timeout
    RxTimeout,
    /// Radio transmit timeout
    TxTimeout,
    /// Timer expiry to run against the engine
    TimerExpired(TimerCallback<E>),
    /// Caller command, with a reply slot unless fire-and-forget
    Command(Command, Option<ReplyTo>),
    /// OTAA join finished
    JoinResult(JoinOutcome),
    /// LinkCheckAns received
    LinkCheckResult {
        demod_margin: u8,
        nb_gateways: u8,
    },
    /// Uplink cycle finished
    TxDone,
    /// Engine or network wants an uplink as soon as possible
    TxScheduleRequest,
    /// Uplink failed
    TxConfirmFailed,
    /// Downlink with application data
    RxData(McpsIndication),
    /// Owner dropped, stop the loop
    Shutdown,
}

impl<E> Message<E> {
    /// Short name used in logs
    pub(crate) fn tag(&self) -> &'static str {
        match self {
            Message::Isr => "ISR",
            Message::RxTimeout => "RX timeout",
            Message::TxTimeout => "TX timeout",
            Message::TimerExpired(_) => "timer",
            Message::Command(..) => "command",
            Message::JoinResult(_) => "join result",
            Message::LinkCheckResult { .. } => "link check",
            Message::TxDone => "TX done",
            Message::TxScheduleRequest => "TX schedule",
            Message::TxConfirmFailed => "TX confirm failed",
            Message::RxData(_) => "RX data",
            Message::Shutdown => "shutdown",
        }
    }
}
