//! Scripted in-memory sockets for driving the state machine in tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::net::SocketAddrV4;
use std::rc::Rc;

use super::socket::{Connector, Descriptor, Socket};

#[derive(Default)]
pub struct FakeNet {
    pub connects: usize,
    pub open_sockets: usize,
    /// Error kinds returned by successive `connect` calls; empty means success.
    pub connect_errors: VecDeque<ErrorKind>,
    /// Results of successive `finish_connect` calls; empty means established.
    pub finish: VecDeque<io::Result<bool>>,
    /// Successive read results; an empty vec is end of stream, an exhausted
    /// queue is `WouldBlock`.
    pub reads: VecDeque<io::Result<Vec<u8>>>,
    pub written: Vec<u8>,
    /// Upper bound on bytes accepted per `write`.
    pub write_chunk: Option<usize>,
    pub write_error: Option<ErrorKind>,
}

#[derive(Clone, Default)]
pub struct FakeConnector(pub Rc<RefCell<FakeNet>>);

impl FakeConnector {
    pub fn net(&self) -> std::cell::RefMut<'_, FakeNet> {
        self.0.borrow_mut()
    }

    pub fn push_read(&self, bytes: &[u8]) {
        self.net().reads.push_back(Ok(bytes.to_vec()));
    }
}

pub struct FakeSocket(Rc<RefCell<FakeNet>>);

impl Connector for FakeConnector {
    type Socket = FakeSocket;

    fn connect(&mut self, _addr: SocketAddrV4) -> io::Result<FakeSocket> {
        let mut net = self.0.borrow_mut();
        net.connects += 1;
        if let Some(kind) = net.connect_errors.pop_front() {
            return Err(kind.into());
        }
        net.open_sockets += 1;
        Ok(FakeSocket(self.0.clone()))
    }
}

impl Socket for FakeSocket {
    fn finish_connect(&mut self) -> io::Result<bool> {
        self.0.borrow_mut().finish.pop_front().unwrap_or(Ok(true))
    }

    fn descriptor(&self) -> Descriptor {
        7
    }
}

impl Read for FakeSocket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut net = self.0.borrow_mut();
        match net.reads.pop_front() {
            None => Err(ErrorKind::WouldBlock.into()),
            Some(Err(e)) => Err(e),
            Some(Ok(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    net.reads.push_front(Ok(bytes[n..].to_vec()));
                }
                Ok(n)
            }
        }
    }
}

impl Write for FakeSocket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut net = self.0.borrow_mut();
        if let Some(kind) = net.write_error {
            return Err(kind.into());
        }
        let n = net.write_chunk.map_or(buf.len(), |c| c.min(buf.len()));
        net.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for FakeSocket {
    fn drop(&mut self) {
        self.0.borrow_mut().open_sockets -= 1;
    }
}
