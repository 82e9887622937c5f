//! Unreliable datagram links
//!
//! A `Transport` is fire-and-forget: `send` may fail or the datagram may
//! vanish, and `try_receive` never blocks. Pairing and addressing are fixed
//! when the transport is built.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::rc::Rc;

use thiserror::Error;

/// Largest payload we expect on the link
const MAX_DATAGRAM: usize = 512;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("link busy")]
    Busy,
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Datagram link to the paired device
pub trait Transport {
    /// Send one datagram to the peer. Delivery is never confirmed.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
    /// Next buffered datagram, if any. Never blocks.
    fn try_receive(&mut self) -> Option<Vec<u8>>;
}

type Queue = Rc<RefCell<VecDeque<Vec<u8>>>>;
type LossFilter = Box<dyn FnMut(&[u8]) -> bool>;

/// One end of an in-process link. Useful for tests and simulations.
pub struct MemoryEndpoint {
    inbox: Queue,
    outbox: Queue,
    loss: Option<LossFilter>,
    busy: bool,
}

/// Build a connected pair of in-memory endpoints
pub fn memory_link() -> (MemoryEndpoint, MemoryEndpoint) {
    let a_to_b: Queue = Rc::default();
    let b_to_a: Queue = Rc::default();
    (
        MemoryEndpoint::new(b_to_a.clone(), a_to_b.clone()),
        MemoryEndpoint::new(a_to_b, b_to_a),
    )
}

impl MemoryEndpoint {
    fn new(inbox: Queue, outbox: Queue) -> Self {
        Self {
            inbox,
            outbox,
            loss: None,
            busy: false,
        }
    }

    /// Drop outgoing datagrams for which `filter` returns true
    pub fn with_loss(mut self, filter: impl FnMut(&[u8]) -> bool + 'static) -> Self {
        self.loss = Some(Box::new(filter));
        self
    }

    /// Make every `send` fail until cleared
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Queue raw bytes as if they had arrived from the other end
    pub fn inject(&self, bytes: &[u8]) {
        self.inbox.borrow_mut().push_back(bytes.to_vec());
    }

    /// Datagrams waiting to be received on this end
    pub fn pending(&self) -> usize {
        self.inbox.borrow().len()
    }
}

impl Transport for MemoryEndpoint {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.busy {
            return Err(TransportError::Busy);
        }
        if let Some(loss) = self.loss.as_mut() {
            if loss(bytes) {
                return Ok(());
            }
        }
        self.outbox.borrow_mut().push_back(bytes.to_vec());
        Ok(())
    }

    fn try_receive(&mut self) -> Option<Vec<u8>> {
        self.inbox.borrow_mut().pop_front()
    }
}

/// Non-blocking UDP link for desktop builds
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
    buf: Vec<u8>,
}

impl UdpTransport {
    pub fn bind<A: ToSocketAddrs>(local: A, peer: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;
        log::info!("Link bound on {} -> peer {}", socket.local_addr()?, peer);
        Ok(Self {
            socket,
            peer,
            buf: vec![0u8; MAX_DATAGRAM],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        match self.socket.send_to(bytes, self.peer) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Err(TransportError::Busy),
            Err(e) => Err(e.into()),
        }
    }

    fn try_receive(&mut self) -> Option<Vec<u8>> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, from)) => {
                log::trace!("Received {} bytes from {}", len, from);
                Some(self.buf[..len].to_vec())
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => None,
            Err(e) => {
                log::debug!("Receive failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_link_delivers_in_order() {
        let (mut a, mut b) = memory_link();
        a.send(b"one").unwrap();
        a.send(b"two").unwrap();
        assert_eq!(b.pending(), 2);
        assert_eq!(b.try_receive().as_deref(), Some(&b"one"[..]));
        assert_eq!(b.try_receive().as_deref(), Some(&b"two"[..]));
        assert_eq!(b.try_receive(), None);
        assert_eq!(a.try_receive(), None);
    }

    #[test]
    fn test_memory_link_loss_is_silent() {
        let (a, mut b) = memory_link();
        let mut count = 0;
        let mut a = a.with_loss(move |_| {
            count += 1;
            count % 2 == 0
        });
        for payload in [b"1", b"2", b"3"] {
            assert!(a.send(payload).is_ok());
        }
        assert_eq!(b.try_receive().as_deref(), Some(&b"1"[..]));
        assert_eq!(b.try_receive().as_deref(), Some(&b"3"[..]));
    }

    #[test]
    fn test_busy_link_fails_send() {
        let (mut a, b) = memory_link();
        a.set_busy(true);
        assert!(matches!(a.send(b"x"), Err(TransportError::Busy)));
        assert_eq!(b.pending(), 0);
    }

    #[test]
    fn test_udp_round_trip_on_loopback() {
        let mut a = UdpTransport::bind("127.0.0.1:0", "127.0.0.1:9".parse().unwrap()).unwrap();
        let a_addr = a.local_addr().unwrap();
        let mut b = UdpTransport::bind("127.0.0.1:0", a_addr).unwrap();

        assert_eq!(a.try_receive(), None);
        b.send(b"ping").unwrap();

        let mut received = None;
        for _ in 0..200 {
            received = a.try_receive();
            if received.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(received.as_deref(), Some(&b"ping"[..]));
    }
}
