//! Sans-IO resynchronization state machine shared by the blocking and async
//! readers.
//!
//! A read call is driven as:
//! 1. [`Resync::begin`] hands back a queued element, if any.
//! 2. [`Resync::poll`] is called until it yields an element or exhaustion.
//!    Whenever it asks for a byte, the driver reads one with the requested
//!    timeout and passes the outcome to [`Resync::feed`].

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use ikbus_transport::ByteRead;
use tracing::{debug, trace};

use crate::codec::{checksum, Packet, MIN_PACKET_LEN};
use crate::element::StreamElement;

/// Next action requested by the scanner.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Emit(StreamElement),
    /// Nothing buffered and the source reached end of stream.
    Exhausted,
    /// Read one byte, waiting at most the given duration (`None` waits
    /// indefinitely).
    NeedByte(Option<Duration>),
}

#[derive(Debug)]
pub(crate) struct Resync {
    byte_timeout: Duration,
    /// Bytes not yet classified. The front is byte 0 of a candidate packet.
    pending: VecDeque<u8>,
    /// Bytes classified as noise, flushed before the next valid packet.
    corrupted: Vec<u8>,
    /// Packet found right after a corrupted run, returned on the next call.
    queued: Option<StreamElement>,
    end_of_stream: bool,
    /// After a timeout, drain what is buffered instead of reading more.
    suspend: bool,
    /// No further byte can be obtained during the current read call.
    no_more_data: bool,
}

impl Resync {
    pub(crate) fn new(byte_timeout: Duration) -> Self {
        Self {
            byte_timeout,
            pending: VecDeque::new(),
            corrupted: Vec::new(),
            queued: None,
            end_of_stream: false,
            suspend: false,
            no_more_data: false,
        }
    }

    pub(crate) fn byte_timeout(&self) -> Duration {
        self.byte_timeout
    }

    pub(crate) fn set_byte_timeout(&mut self, timeout: Duration) {
        self.byte_timeout = timeout;
    }

    /// Start a read call.
    pub(crate) fn begin(&mut self) -> Option<StreamElement> {
        self.no_more_data = self.end_of_stream;
        self.suspend = self.suspend && !self.pending.is_empty();
        self.queued.take()
    }

    pub(crate) fn poll(&mut self) -> Step {
        loop {
            if self.no_more_data && self.pending.len() < MIN_PACKET_LEN {
                if !self.pending.is_empty() || !self.corrupted.is_empty() {
                    return Step::Emit(self.flush());
                }
                if self.end_of_stream {
                    return Step::Exhausted;
                }
                // A timeout with nothing left to drain: go back to reading.
                self.no_more_data = false;
                continue;
            }

            if let Some(element) = self.scan() {
                return Step::Emit(element);
            }

            if self.no_more_data || self.suspend {
                if self.pending.len() > MIN_PACKET_LEN {
                    self.discard_front();
                    continue;
                }
                if !self.pending.is_empty() || !self.corrupted.is_empty() {
                    return Step::Emit(self.flush());
                }
                self.suspend = false;
                continue;
            }

            // The first byte of a packet may follow an arbitrarily long idle
            // period, so only bytes after it are timed.
            let timeout = if self.pending.is_empty() {
                None
            } else {
                Some(self.byte_timeout)
            };
            return Step::NeedByte(timeout);
        }
    }

    pub(crate) fn feed(&mut self, read: ByteRead) {
        match read {
            ByteRead::Byte(byte) => self.pending.push_back(byte),
            ByteRead::Timeout | ByteRead::EndOfStream => {
                if read == ByteRead::EndOfStream {
                    debug!(buffered = self.pending.len(), "end of stream reached");
                    self.end_of_stream = true;
                } else {
                    trace!(buffered = self.pending.len(), "byte timeout, packet abandoned");
                }
                self.no_more_data = true;
                self.suspend = true;
                self.discard_front();
            }
        }
    }

    /// Look for a valid packet at the front of the pending buffer, discarding
    /// bytes that cannot start one. Returns `None` when more bytes are needed.
    fn scan(&mut self) -> Option<StreamElement> {
        while self.pending.len() >= 2 {
            let expected = self.pending[1] as usize + 2;
            if expected >= MIN_PACKET_LEN {
                if self.pending.len() < expected {
                    return None;
                }
                let (front, back) = self.pending.as_slices();
                let sum = if front.len() >= expected {
                    checksum(&front[..expected])
                } else {
                    checksum(front) ^ checksum(&back[..expected - front.len()])
                };
                if sum == 0 {
                    let wire: Vec<u8> = self.pending.drain(..expected).collect();
                    let element = StreamElement::Valid(Packet::from_verified_wire(&wire));
                    trace!(len = expected, "valid packet recognized");

                    if self.corrupted.is_empty() {
                        return Some(element);
                    }
                    self.queued = Some(element);
                    return Some(self.take_corrupted());
                }
            }
            self.discard_front();
        }
        None
    }

    fn discard_front(&mut self) {
        if let Some(byte) = self.pending.pop_front() {
            self.corrupted.push(byte);
        }
    }

    fn take_corrupted(&mut self) -> StreamElement {
        let run = std::mem::take(&mut self.corrupted);
        debug!(len = run.len(), "corrupted run");
        StreamElement::Invalid(Bytes::from(run))
    }

    fn flush(&mut self) -> StreamElement {
        self.corrupted.extend(self.pending.drain(..));
        self.take_corrupted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::parse_hex;

    const TIMEOUT: Duration = Duration::from_millis(50);

    fn feed_all(resync: &mut Resync, hex: &str) {
        for byte in parse_hex(hex).unwrap() {
            assert!(matches!(resync.poll(), Step::NeedByte(_)));
            resync.feed(ByteRead::Byte(byte));
        }
    }

    #[test]
    fn test_first_byte_is_untimed() {
        let mut resync = Resync::new(TIMEOUT);
        assert!(resync.begin().is_none());
        assert_eq!(resync.poll(), Step::NeedByte(None));

        resync.feed(ByteRead::Byte(0x50));
        assert_eq!(resync.poll(), Step::NeedByte(Some(TIMEOUT)));
    }

    #[test]
    fn test_packet_emitted_on_last_byte() {
        let mut resync = Resync::new(TIMEOUT);
        resync.begin();
        feed_all(&mut resync, "50 03 C8 01");
        resync.feed(ByteRead::Byte(0x9A));

        let Step::Emit(StreamElement::Valid(packet)) = resync.poll() else {
            panic!("expected a valid packet");
        };
        assert_eq!(packet.source(), 0x50);
        assert_eq!(resync.poll(), Step::NeedByte(None));
    }

    #[test]
    fn test_noise_is_flushed_before_queued_packet() {
        let mut resync = Resync::new(TIMEOUT);
        resync.begin();
        // 0x00 as a length byte rules out a packet at 0x11 immediately.
        feed_all(&mut resync, "11 00 00 04 BF 72 22");
        resync.feed(ByteRead::Byte(0xEB));

        assert_eq!(
            resync.poll(),
            Step::Emit(StreamElement::Invalid(Bytes::from_static(&[0x11, 0x00])))
        );
        let queued = resync.begin();
        assert_eq!(queued.map(|el| el.to_string()).as_deref(), Some("00 04 BF 72 22 EB"));
    }

    #[test]
    fn test_timeout_flushes_short_buffer() {
        let mut resync = Resync::new(TIMEOUT);
        resync.begin();
        feed_all(&mut resync, "72 05 BF 78");
        assert_eq!(resync.poll(), Step::NeedByte(Some(TIMEOUT)));
        resync.feed(ByteRead::Timeout);

        assert_eq!(
            resync.poll(),
            Step::Emit(StreamElement::Invalid(Bytes::from_static(&[0x72, 0x05, 0xBF, 0x78])))
        );

        // Not at end of stream: the next call waits for a fresh packet.
        assert!(resync.begin().is_none());
        assert_eq!(resync.poll(), Step::NeedByte(None));
    }

    #[test]
    fn test_suspend_survives_into_next_read() {
        let mut resync = Resync::new(TIMEOUT);
        resync.begin();
        feed_all(&mut resync, "AA 50 03 C8 01 9A 01 05 AA BB CC");
        assert_eq!(resync.poll(), Step::NeedByte(Some(TIMEOUT)));
        resync.feed(ByteRead::Timeout);

        assert_eq!(
            resync.poll(),
            Step::Emit(StreamElement::Invalid(Bytes::from_static(&[0xAA])))
        );
        let queued = resync.begin();
        assert_eq!(queued.map(|el| el.to_string()).as_deref(), Some("50 03 C8 01 9A"));

        // Still suspended: the leftover bytes are flushed without another read.
        assert!(resync.begin().is_none());
        assert_eq!(
            resync.poll(),
            Step::Emit(StreamElement::Invalid(Bytes::from_static(&[
                0x01, 0x05, 0xAA, 0xBB, 0xCC
            ])))
        );
        assert!(resync.begin().is_none());
        assert_eq!(resync.poll(), Step::NeedByte(None));
    }

    #[test]
    fn test_end_of_stream_exhausts() {
        let mut resync = Resync::new(TIMEOUT);
        resync.begin();
        resync.feed(ByteRead::EndOfStream);
        assert_eq!(resync.poll(), Step::Exhausted);

        assert!(resync.begin().is_none());
        assert_eq!(resync.poll(), Step::Exhausted);
    }

    #[test]
    fn test_set_byte_timeout() {
        let mut resync = Resync::new(TIMEOUT);
        resync.set_byte_timeout(Duration::from_millis(5));
        assert_eq!(resync.byte_timeout(), Duration::from_millis(5));

        resync.begin();
        feed_all(&mut resync, "50");
        assert_eq!(resync.poll(), Step::NeedByte(Some(Duration::from_millis(5))));
    }
}
