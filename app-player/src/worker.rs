use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use failure::Error;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use xmidi_core::xmidi::{EventListRef, Sequence};

use crate::config::Player as PlayerConfig;
use crate::handler::{LogHandler, Summary};

const SEQUENCE_ID: u16 = 0;

/// Transport commands accepted by a [`PlayerWorker`].
#[derive(Debug, Clone, PartialEq)]
pub enum Protocol {
  Pause,
  Unpause,
  Volume(u8),
  Speed(i32),
  Stop,
}

struct PlayerThread {
  sequence: Sequence,
  handler: LogHandler,
}

impl PlayerThread {
  fn new(list: EventListRef, config: &PlayerConfig) -> PlayerThread {
    let mut handler = LogHandler::new();
    let mut sequence = Sequence::new(
      &mut handler,
      SEQUENCE_ID,
      list,
      config.repeat,
      config.volume,
      config.branch,
    );
    sequence.set_speed(config.speed);

    PlayerThread { sequence, handler }
  }

  /// Plays until the end, a fault or a stop command.
  fn run(&mut self, rx: &Receiver<Protocol>) {
    loop {
      let wait = match self.sequence.play_event(&mut self.handler) {
        Ok(wait) if wait < 0 => {
          info!("Finished playing");
          break;
        }
        Ok(0) => continue,
        Ok(_) => self.sequence.time_till_next(&self.handler),
        Err(fault) => {
          error!("Playback failed: {}", fault);
          break;
        }
      };

      match rx.recv_timeout(Duration::from_millis(wait.max(1) as u64)) {
        Ok(command) => {
          debug!("Received {:?}", command);
          if !self.handle(command) {
            break;
          }
        }
        Err(RecvTimeoutError::Timeout) => {}
        Err(RecvTimeoutError::Disconnected) => {
          warn!("Player commands disconnected");
          break;
        }
      }
    }
  }

  fn handle(&mut self, command: Protocol) -> bool {
    match command {
      Protocol::Pause => self.sequence.pause(&mut self.handler),
      Protocol::Unpause => self.sequence.unpause(&mut self.handler),
      Protocol::Volume(volume) => self.sequence.set_volume(&mut self.handler, volume),
      Protocol::Speed(speed) => self.sequence.set_speed(speed),
      Protocol::Stop => return false,
    }
    true
  }

  fn finish(self) -> Summary {
    let PlayerThread {
      sequence,
      mut handler,
    } = self;
    sequence.stop(&mut handler);
    handler.summary().clone()
  }
}

/// Plays one event list on its own thread.
pub struct PlayerWorker {
  tx: Sender<Protocol>,
  finished_rx: Receiver<Summary>,
}

impl PlayerWorker {
  pub fn start(list: EventListRef, config: &PlayerConfig) -> Result<PlayerWorker, Error> {
    info!("Starting Player ...");

    let (tx, rx) = crossbeam_channel::unbounded::<Protocol>();
    let (finished_tx, finished_rx) = crossbeam_channel::bounded::<Summary>(1);
    let config = config.clone();

    thread::Builder::new()
      .name("player".into())
      .spawn(move || {
        let mut player = PlayerThread::new(list, &config);
        player.run(&rx);
        drop(finished_tx.send(player.finish()));
      })?;

    Ok(PlayerWorker { tx, finished_rx })
  }

  pub fn sender(&self) -> Sender<Protocol> {
    self.tx.clone()
  }

  /// Waits for the playback to end, stopping it after `timeout` if given.
  pub fn wait(self, timeout: Option<Duration>) -> Option<Summary> {
    if let Some(timeout) = timeout {
      match self.finished_rx.recv_timeout(timeout) {
        Ok(summary) => return Some(summary),
        Err(_) => {
          info!("Stopping Player after {:?}", timeout);
          drop(self.tx.send(Protocol::Stop));
        }
      }
    }
    self.finished_rx.recv().ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use xmidi_core::xmidi::{Event, EventList};

  fn list() -> EventListRef {
    EventList::new(
      vec![
        Event::program_change(0, 0, 5),
        Event::note_on(0, 0x90, 60, 100, 6),
        Event::controller(12, 0, 7, 100),
      ],
      1,
    )
    .into_ref()
  }

  #[test]
  fn plays_to_the_end() {
    let worker = PlayerWorker::start(list(), &PlayerConfig::default()).unwrap();
    let summary = worker.wait(None).unwrap();
    assert_eq!(summary.programs, 1);
    assert_eq!(summary.notes, 2);
    assert_eq!(summary.callbacks, 0);
  }

  #[test]
  fn stops_on_request() {
    let config = PlayerConfig {
      repeat: true,
      ..PlayerConfig::default()
    };
    let worker = PlayerWorker::start(list(), &config).unwrap();
    worker.sender().send(Protocol::Volume(100)).unwrap();
    let summary = worker.wait(Some(Duration::from_millis(300))).unwrap();
    assert!(summary.programs >= 1);
  }
}
