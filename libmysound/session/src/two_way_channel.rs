use flume::{Receiver, RecvError, SendError, Sender, WeakSender};
use tokio::sync::oneshot::{Sender as OneShotSender, channel as oneshot_channel};

pub(crate) fn two_way_channel<TIn, TOut>() -> (TwoWaySender<TIn, TOut>, TwoWayReceiver<TIn, TOut>) {
    let (main_tx, main_rx) = flume::unbounded();
    (TwoWaySender::new(main_tx), TwoWayReceiver::new(main_rx))
}

type Responder<TIn, TOut> = (TIn, Option<OneShotSender<TOut>>);

#[derive(Debug)]
pub(crate) struct TwoWaySender<TIn, TOut> {
    main_tx: Sender<Responder<TIn, TOut>>,
}

// Derived Clone would require TIn: Clone
impl<TIn, TOut> Clone for TwoWaySender<TIn, TOut> {
    fn clone(&self) -> Self {
        Self {
            main_tx: self.main_tx.clone(),
        }
    }
}

/// A sender that doesn't keep the receiving loop alive. Background tasks hold one of these so the
/// loop still ends once every public handle is gone.
#[derive(Debug)]
pub(crate) struct WeakTwoWaySender<TIn, TOut> {
    main_tx: WeakSender<Responder<TIn, TOut>>,
}

impl<TIn, TOut> Clone for WeakTwoWaySender<TIn, TOut> {
    fn clone(&self) -> Self {
        Self {
            main_tx: self.main_tx.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TwoWayReceiver<TIn, TOut> {
    main_rx: Receiver<Responder<TIn, TOut>>,
    oneshot: Option<OneShotSender<TOut>>,
}

impl<TIn, TOut> TwoWaySender<TIn, TOut> {
    pub(crate) fn new(main_tx: Sender<Responder<TIn, TOut>>) -> Self {
        Self { main_tx }
    }

    pub(crate) fn send(&self, message: TIn) -> Result<(), SendError<Responder<TIn, TOut>>> {
        self.main_tx.send((message, None))
    }

    pub(crate) async fn get_response(&self, message: TIn) -> Result<TOut, String> {
        let (oneshot_tx, oneshot_rx) = oneshot_channel();
        self.main_tx
            .send_async((message, Some(oneshot_tx)))
            .await
            .map_err(|e| format!("Error sending oneshot response {e:?}"))?;
        oneshot_rx
            .await
            .map_err(|e| format!("Error receiving oneshot response {e:?}"))
    }

    pub(crate) fn downgrade(&self) -> WeakTwoWaySender<TIn, TOut> {
        WeakTwoWaySender {
            main_tx: self.main_tx.downgrade(),
        }
    }
}

impl<TIn, TOut> WeakTwoWaySender<TIn, TOut> {
    /// Returns false once the receiving side is gone or every strong sender has been dropped.
    pub(crate) async fn send_async(&self, message: TIn) -> bool {
        match self.main_tx.upgrade() {
            Some(main_tx) => main_tx.send_async((message, None)).await.is_ok(),
            None => false,
        }
    }
}

impl<TIn, TOut> TwoWayReceiver<TIn, TOut> {
    pub(crate) fn new(main_rx: Receiver<Responder<TIn, TOut>>) -> Self {
        Self {
            main_rx,
            oneshot: None,
        }
    }

    pub(crate) async fn recv_async(&mut self) -> Result<TIn, RecvError> {
        match self.main_rx.recv_async().await {
            Ok((res, oneshot)) => {
                self.oneshot = oneshot;
                Ok(res)
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn respond(&mut self, response: TOut) -> Result<(), TOut> {
        if let Some(oneshot) = self.oneshot.take() {
            oneshot.send(response)
        } else {
            Ok(())
        }
    }
}
