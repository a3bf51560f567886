//! Collective operations between in-process ranks
//!
//! The distributed runner is an SPMD program: every participant executes the
//! same sequence of collectives, identified by an integer rank, with rank 0
//! privileged as the root. The transport is a channel per rank rather than a
//! network, which keeps the partition/broadcast/gather protocol exercisable
//! from an ordinary test run; the calling convention mirrors the usual
//! message-passing collectives (rooted broadcast, variable-length gather,
//! max reduction, barrier), and every collective blocks its caller until the
//! data for it has arrived.
//!
//! There are no timeouts and no retries. If a participant dies, its channel
//! endpoints disconnect and every peer that touches it gets
//! [`Error::Collective`] naming the phase that failed.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Barrier};

use crate::error::{Error, Result};

/// The root rank for all rooted collectives
pub const ROOT: usize = 0;

/// A typed payload crossing between ranks
///
/// Three datatypes cover the whole protocol: index arrays (metadata, column
/// indices, row-pointer tails), value arrays, and a scalar for timing
/// reductions.
#[derive(Clone, Debug)]
pub enum Frame {
    /// An array of indices or counts
    Indices(Vec<usize>),
    /// An array of matrix values
    Values(Vec<f64>),
    /// A single scalar, used by reductions
    Scalar(f64),
}

/// Conversion between collective payloads and [`Frame`]s
///
/// Implemented for exactly the types the protocol sends. A frame arriving
/// with the wrong variant means the ranks have fallen out of step, which is
/// reported as a collective failure.
pub trait Transferable: Clone + Send + Sized {
    /// Wraps the value in a frame
    fn pack(self) -> Frame;
    /// Unwraps the frame, or `None` if it holds a different datatype
    fn unpack(frame: Frame) -> Option<Self>;
}

impl Transferable for Vec<usize> {
    fn pack(self) -> Frame {
        Frame::Indices(self)
    }

    fn unpack(frame: Frame) -> Option<Self> {
        match frame {
            Frame::Indices(v) => Some(v),
            _ => None,
        }
    }
}

impl Transferable for Vec<f64> {
    fn pack(self) -> Frame {
        Frame::Values(self)
    }

    fn unpack(frame: Frame) -> Option<Self> {
        match frame {
            Frame::Values(v) => Some(v),
            _ => None,
        }
    }
}

impl Transferable for f64 {
    fn pack(self) -> Frame {
        Frame::Scalar(self)
    }

    fn unpack(frame: Frame) -> Option<Self> {
        match frame {
            Frame::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

struct Envelope {
    src: usize,
    frame: Frame,
}

/// One rank's endpoint into the group of participants
///
/// Created in bulk by [`Communicator::create`]; each handle is moved onto
/// the thread that plays its rank.
pub struct Communicator {
    rank: usize,
    size: usize,
    // Senders to every other rank's inbox; the slot for this rank is None so
    // that a rank never keeps its own inbox artificially alive (a peer's
    // death must surface as a disconnect, not a hang)
    peers: Vec<Option<Sender<Envelope>>>,
    inbox: Receiver<Envelope>,
    // Frames that arrived ahead of the collective that wants them, per source
    pending: Vec<VecDeque<Frame>>,
    barrier: Arc<Barrier>,
}

impl Communicator {
    /// Creates a fully connected group of `size` ranks
    ///
    /// Returns one communicator per rank, in rank order.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn create(size: usize) -> Vec<Communicator> {
        assert!(size > 0, "communicator size must be at least 1");

        let barrier = Arc::new(Barrier::new(size));
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..size).map(|_| channel::<Envelope>()).unzip();

        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| {
                let peers = senders
                    .iter()
                    .enumerate()
                    .map(|(dst, tx)| (dst != rank).then(|| tx.clone()))
                    .collect();
                Communicator {
                    rank,
                    size,
                    peers,
                    inbox,
                    pending: vec![VecDeque::new(); size],
                    barrier: Arc::clone(&barrier),
                }
            })
            .collect()
    }

    /// This participant's rank
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of participants in the group
    pub fn size(&self) -> usize {
        self.size
    }

    /// True on the privileged root rank
    pub fn is_root(&self) -> bool {
        self.rank == ROOT
    }

    fn send_to(&self, dst: usize, frame: Frame, phase: &'static str) -> Result<()> {
        let envelope = Envelope { src: self.rank, frame };
        self.peers[dst]
            .as_ref()
            .ok_or(Error::Collective { phase })?
            .send(envelope)
            .map_err(|_| Error::Collective { phase })
    }

    /// Receives the next frame from `src`, draining the shared inbox into
    /// per-source queues so frames from other ranks keep their order
    fn recv_from(&mut self, src: usize, phase: &'static str) -> Result<Frame> {
        loop {
            if let Some(frame) = self.pending[src].pop_front() {
                return Ok(frame);
            }
            let envelope = self.inbox.recv().map_err(|_| Error::Collective { phase })?;
            self.pending[envelope.src].push_back(envelope.frame);
        }
    }

    /// One-to-all replication rooted at rank 0
    ///
    /// The root must supply `Some(value)` and gets it back; every other rank
    /// passes `None` and receives the root's copy. Blocks until this rank
    /// has the data.
    pub fn broadcast<T: Transferable>(
        &mut self,
        value: Option<T>,
        phase: &'static str,
    ) -> Result<T> {
        if self.is_root() {
            let value = value.ok_or(Error::Collective { phase })?;
            for dst in 1..self.size {
                self.send_to(dst, value.clone().pack(), phase)?;
            }
            Ok(value)
        } else {
            let frame = self.recv_from(ROOT, phase)?;
            T::unpack(frame).ok_or(Error::Collective { phase })
        }
    }

    /// All-to-one collection rooted at rank 0
    ///
    /// Contributions may differ in length per rank. The root receives
    /// `Some(vec)` with one entry per rank in ascending rank order; every
    /// other rank sends its contribution and receives `None`.
    pub fn gather<T: Transferable>(
        &mut self,
        value: T,
        phase: &'static str,
    ) -> Result<Option<Vec<T>>> {
        if self.is_root() {
            let mut collected = Vec::with_capacity(self.size);
            collected.push(value);
            for src in 1..self.size {
                let frame = self.recv_from(src, phase)?;
                collected.push(T::unpack(frame).ok_or(Error::Collective { phase })?);
            }
            Ok(Some(collected))
        } else {
            self.send_to(ROOT, value.pack(), phase)?;
            Ok(None)
        }
    }

    /// All-to-one maximum reduction rooted at rank 0
    pub fn reduce_max(&mut self, value: f64, phase: &'static str) -> Result<Option<f64>> {
        Ok(self
            .gather(value, phase)?
            .map(|contributions| contributions.into_iter().fold(f64::MIN, f64::max)))
    }

    /// Blocks until every rank in the group has reached the barrier
    pub fn barrier(&self) {
        self.barrier.wait();
    }
}
