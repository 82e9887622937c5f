//! Host/peer synchronization over an unreliable datagram link

pub mod protocol;
pub mod sync;
pub mod transport;

pub use protocol::{NetworkMessage, ProtocolError};
pub use sync::{HostSync, LinkStats, MessageLink, PeerReplica, ReplicaEvent, state_snapshot};
pub use transport::{MemoryEndpoint, Transport, TransportError, UdpTransport, memory_link};
