use tokio::sync::mpsc;
use tokio::task;
use tokio::time::{self, Duration};
use crossterm::event::{self, Event as CEvent, KeyEvent, KeyEventKind, MouseEvent};
use tracing::{debug, warn};

/// Wrapper for terminal input and tick events
#[derive(Debug, Clone)]
pub enum Event {
    Input(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
    Stop,
}

/// Pumps crossterm events and periodic ticks into one channel
pub struct EventSpawner {
    rx: mpsc::Receiver<Event>,
}

impl EventSpawner {
    pub fn new(tick: Duration) -> Self {
        let (tx, rx) = mpsc::channel(64);

        let input_tx = tx.clone();
        tokio::spawn(async move {
            let poll_timeout = Duration::from_millis(50);
            loop {
                match task::spawn_blocking(move || event::poll(poll_timeout)).await {
                    Ok(Ok(true)) => {}
                    Ok(Ok(false)) => continue,
                    Ok(Err(e)) => {
                        warn!(error = %e, "polling terminal events failed");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "terminal poll task panicked");
                        break;
                    }
                }
                let event = match task::spawn_blocking(event::read).await {
                    Ok(Ok(CEvent::Key(key))) if key.kind == KeyEventKind::Press => Event::Input(key),
                    Ok(Ok(CEvent::Mouse(mouse))) => Event::Mouse(mouse),
                    Ok(Ok(CEvent::Resize(_, _))) => Event::Resize,
                    Ok(Ok(_)) => continue,
                    Ok(Err(e)) => {
                        warn!(error = %e, "reading terminal event failed");
                        break;
                    }
                    Err(_) => break,
                };
                if input_tx.send(event).await.is_err() {
                    debug!("event receiver dropped, stopping input pump");
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut interval = time::interval(tick);
            loop {
                interval.tick().await;
                if tx.send(Event::Tick).await.is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Receive the next event; `Stop` once every producer is gone
    pub async fn next(&mut self) -> Event {
        self.rx.recv().await.unwrap_or(Event::Stop)
    }
}
