//! Host tests for the line handoff under arbitrary interleavings

use std::thread;

use proptest::prelude::*;

use tspectrum_core::handoff::{HandoffError, LineQueue, LineSink, LineSource};
use tspectrum_core::{Arbiter, Line, LinePrinter, WakeSource, LINE_WIDTH};

/// Printer that records every transmitted line
#[derive(Default)]
struct RecordingPrinter {
    printed: Vec<Line>,
}

impl LinePrinter for RecordingPrinter {
    fn print_line(&mut self, line: &Line) {
        self.printed.push(*line);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Publish(u8),
    Wake(WakeSource),
}

fn wake_source() -> impl Strategy<Value = WakeSource> {
    prop_oneof![
        Just(WakeSource::Strobe),
        Just(WakeSource::CaptureTick),
        Just(WakeSource::PrinterTick),
        Just(WakeSource::SampleReady),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u8>().prop_map(Op::Publish),
        2 => wake_source().prop_map(Op::Wake),
    ]
}

/// Line carrying a sequence number in every byte group
fn numbered_line(n: u32) -> Line {
    let mut bytes = [0u8; LINE_WIDTH];
    for chunk in bytes.chunks_mut(4) {
        chunk.copy_from_slice(&n.to_le_bytes());
    }
    Line::from_bytes(bytes)
}

fn line_number(line: &Line) -> Option<u32> {
    let bytes = line.as_bytes();
    let first = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    bytes
        .chunks(4)
        .all(|chunk| chunk == first.to_le_bytes())
        .then_some(first)
}

proptest! {
    #[test]
    fn prop_counters_monotonic_and_ordered(ops in prop::collection::vec(op(), 0..200)) {
        let mut queue = LineQueue::<4>::new();
        let (mut producer, consumer) = queue.split();
        let mut arbiter = Arbiter::new(consumer);
        let mut printer = RecordingPrinter::default();

        let mut accepted = Vec::new();
        let mut refused = 0u32;
        let mut last_in = 0u32;
        let mut last_out = 0u32;

        for op in ops {
            match op {
                Op::Publish(value) => match producer.publish(&Line::filled(value)) {
                    Ok(_) => accepted.push(Line::filled(value)),
                    Err(HandoffError::Full) => refused += 1,
                    Err(e) => prop_assert!(false, "unexpected {:?}", e),
                },
                Op::Wake(source) => {
                    let before = printer.printed.len();
                    let pending = arbiter.source().pending();
                    let printed = arbiter.service(source, &mut printer);
                    prop_assert_eq!(printed, pending);
                    prop_assert_eq!(printer.printed.len() - before, printed as usize);
                }
            }

            let produced = arbiter.source().produced();
            let consumed = arbiter.source().consumed();
            prop_assert!(produced >= last_in);
            prop_assert!(consumed >= last_out);
            prop_assert!(consumed <= produced);
            prop_assert!(produced - consumed <= 4);
            last_in = produced;
            last_out = consumed;
        }

        // Everything accepted and drained came out once, in order
        prop_assert_eq!(&printer.printed[..], &accepted[..printer.printed.len()]);
        prop_assert_eq!(producer.dropped(), refused);
    }

    #[test]
    fn prop_no_loss_when_drained_between_publishes(values in prop::collection::vec(any::<u8>(), 1..100)) {
        let mut queue = LineQueue::<2>::new();
        let (mut producer, consumer) = queue.split();
        let mut arbiter = Arbiter::new(consumer);
        let mut printer = RecordingPrinter::default();

        for &value in &values {
            producer.publish(&Line::filled(value)).unwrap();
            prop_assert_eq!(arbiter.service(WakeSource::Strobe, &mut printer), 1);
        }

        let expected: Vec<Line> = values.iter().copied().map(Line::filled).collect();
        prop_assert_eq!(printer.printed, expected);
        prop_assert_eq!(producer.dropped(), 0);
    }
}

#[test]
fn test_cross_thread_delivery() {
    const LINES: u32 = 20_000;

    let mut queue = LineQueue::<4>::new();
    let (mut producer, consumer) = queue.split();

    thread::scope(|s| {
        s.spawn(move || {
            let mut n = 0;
            while n < LINES {
                match producer.publish(&numbered_line(n)) {
                    Ok(_) => n += 1,
                    Err(HandoffError::Full) => thread::yield_now(),
                    Err(e) => panic!("unexpected {e:?}"),
                }
            }
        });

        s.spawn(move || {
            let mut arbiter = Arbiter::new(consumer);
            let mut expected = 0;
            while expected < LINES {
                if !arbiter.on_wake(WakeSource::Strobe) {
                    thread::yield_now();
                    continue;
                }
                while let Some(line) = arbiter.begin_drain() {
                    assert_eq!(line_number(line), Some(expected), "torn or reordered line");
                    arbiter.finish_drain().unwrap();
                    expected += 1;
                }
            }
            assert_eq!(arbiter.source().consumed(), LINES);
        });
    });
}
