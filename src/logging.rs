use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::{Reply, ReplyClass};

/// A unique identifier for a particular request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. This wraps around back to zero if you somehow exceed a usize.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Log an incoming request line.
pub fn log_request(id: RequestId, peer: SocketAddr, command: &str) {
    info!("->req{id} {peer} {command}");
}

/// Log the reply sent for a request. Successful replies may carry voter
/// records, so only their size is logged.
pub fn log_reply(id: RequestId, command: &str, reply: &Reply) {
    match reply.class() {
        ReplyClass::Error => warn!("<-rsp{id} {command}: {reply}"),
        ReplyClass::Sentinel => info!("<-rsp{id} {command}: {reply}"),
        ReplyClass::Success => info!("<-rsp{id} {command}: OK ({} bytes)", reply.as_str().len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_increase() {
        let first = RequestId::next();
        let second = RequestId::next();
        assert!(second > first);
        assert_eq!(format!("{}", RequestId(7)), "7");
    }
}
