// event_loop.rs

use crate::midi::{MidiBlock, MidiEngine, MidiEvent};
use crate::processor::TuningProcessor;
use crate::ui::TuningMonitor;
use crossbeam::channel::{select, Receiver};
use log::{error, info, trace, warn};
use std::sync::Arc;

/// Control messages for a running [`EventLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMessage {
    /// Forget the last played note
    Reset,
    Shutdown,
}

/// Pulls MIDI from an engine, retunes it block by block and sends it back
/// out through the same engine.
pub struct EventLoop<E: MidiEngine> {
    processor: TuningProcessor,
    engine: E,
    input_rx: Receiver<MidiEvent>,
    control_rx: Receiver<EngineMessage>,
    block: MidiBlock,
    monitor: Arc<TuningMonitor>,
}

impl<E: MidiEngine> EventLoop<E> {
    pub fn new(
        processor: TuningProcessor,
        engine: E,
        control_rx: Receiver<EngineMessage>,
        monitor: Arc<TuningMonitor>,
    ) -> Self {
        let input_rx = engine.receiver();
        let block = processor.create_block();
        EventLoop {
            processor,
            engine,
            input_rx,
            control_rx,
            block,
            monitor,
        }
    }

    /// Runs until a shutdown message arrives or either channel closes.
    pub fn run(&mut self) {
        info!(
            "Event loop started (max {} events per block)",
            self.processor.max_block_events()
        );
        let input_rx = self.input_rx.clone();
        let control_rx = self.control_rx.clone();
        loop {
            select! {
                recv(input_rx) -> msg => match msg {
                    Ok(event) => {
                        self.process_from(event);
                    }
                    Err(_) => {
                        info!("MIDI input closed");
                        break;
                    }
                },
                recv(control_rx) -> msg => match msg {
                    Ok(EngineMessage::Reset) => {
                        info!("Resetting last played note");
                        self.processor.reset();
                    }
                    Ok(EngineMessage::Shutdown) | Err(_) => {
                        info!("Event loop shutting down");
                        break;
                    }
                },
            }
        }
        self.monitor.stop();
    }

    /// Builds one block starting with `first` plus whatever input is already
    /// queued, retunes it and sends the result. A failed send does not stop
    /// the rest of the block. Returns the number of events sent.
    pub fn process_from(&mut self, first: MidiEvent) -> usize {
        let max_events = self.processor.max_block_events();

        self.block.clear();
        self.block.push(first);
        while self.block.len() < max_events {
            match self.input_rx.try_recv() {
                Ok(event) => {
                    self.block.push(event);
                }
                Err(_) => break,
            }
        }
        let events_in = self.block.len();

        self.processor.process_midi(&mut self.block);

        let overflowed = self.block.has_overflowed();
        if overflowed {
            warn!(
                "Block overflow: {} incoming events did not fit, output truncated",
                events_in
            );
        }

        let mut events_out = 0;
        let mut failures = 0;
        for event in self.block.events() {
            match self.engine.send(event) {
                Ok(()) => events_out += 1,
                Err(e) => {
                    if failures == 0 {
                        error!("Failed to forward MIDI: {}", e);
                    }
                    failures += 1;
                }
            }
        }
        if failures > 0 {
            error!(
                "{} of {} events in block were not sent",
                failures,
                self.block.len()
            );
            self.monitor.record_send_failures(failures);
        }

        self.monitor.record_block(
            events_in,
            events_out,
            self.processor.last_played_note(),
            overflowed,
        );
        trace!(
            "Block processed: {} in, {} out, last note {}",
            events_in,
            events_out,
            self.processor.last_played_note()
        );
        events_out
    }

    pub fn processor(&self) -> &TuningProcessor {
        &self.processor
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Hands the engine back, closing nothing.
    pub fn into_engine(self) -> E {
        self.engine
    }
}
