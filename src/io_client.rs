//! IO service client (TCP port 50242).

use crate::Timeouts;
use crate::error::Error;
use crate::message::{
    MessageBody, ReadIoBit, ReadIoGroup, ResultType, SimpleMessage, WriteIoBit, WriteIoGroup,
};
use crate::transport::Transport;
use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default TCP port of the IO service.
pub const TCP_PORT_IO: u16 = 50242;

/// Request/reply client for the controller's concurrent IO.
///
/// Same serialisation discipline as the motion client: one request in flight at a time.
#[derive(Debug)]
pub struct IoClient {
    transport: Mutex<Transport>,
}

impl IoClient {
    /// Connect to the IO service at `addr`.
    pub fn connect(addr: SocketAddr, timeouts: &Timeouts) -> Result<Self, Error> {
        let transport = Transport::connect(addr, timeouts.connect)?;

        transport.set_read_timeout(Some(timeouts.request))?;

        Ok(Self {
            transport: Mutex::new(transport),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Transport> {
        self.transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check(result_code: u32) -> Result<(), Error> {
        if result_code == 0 {
            return Ok(());
        }

        Err(Error::RemoteFailure {
            result: ResultType::Unknown(result_code as i32),
            subcode: 0,
        })
    }

    /// Read one IO bit.
    pub fn read_bit(&self, address: u32) -> Result<u32, Error> {
        let reply = self
            .lock()
            .send_and_recv(&SimpleMessage::service_request(ReadIoBit { address }))?;

        match reply.body {
            MessageBody::ReadIoBitReply(reply) => {
                Self::check(reply.result_code)?;

                Ok(reply.value)
            }
            _ => Err(Error::RemoteFailure {
                result: ResultType::Unknown(-1),
                subcode: 0,
            }),
        }
    }

    /// Write one IO bit.
    pub fn write_bit(&self, address: u32, value: u32) -> Result<(), Error> {
        let reply = self
            .lock()
            .send_and_recv(&SimpleMessage::service_request(WriteIoBit { address, value }))?;

        match reply.body {
            MessageBody::WriteIoBitReply(reply) => Self::check(reply.result_code),
            _ => Err(Error::RemoteFailure {
                result: ResultType::Unknown(-1),
                subcode: 0,
            }),
        }
    }

    /// Read one byte-wide IO group.
    pub fn read_group(&self, address: u32) -> Result<u32, Error> {
        let reply = self
            .lock()
            .send_and_recv(&SimpleMessage::service_request(ReadIoGroup { address }))?;

        match reply.body {
            MessageBody::ReadIoGroupReply(reply) => {
                Self::check(reply.result_code)?;

                Ok(reply.value)
            }
            _ => Err(Error::RemoteFailure {
                result: ResultType::Unknown(-1),
                subcode: 0,
            }),
        }
    }

    /// Write one byte-wide IO group.
    pub fn write_group(&self, address: u32, value: u32) -> Result<(), Error> {
        let reply = self
            .lock()
            .send_and_recv(&SimpleMessage::service_request(WriteIoGroup { address, value }))?;

        match reply.body {
            MessageBody::WriteIoGroupReply(reply) => Self::check(reply.result_code),
            _ => Err(Error::RemoteFailure {
                result: ResultType::Unknown(-1),
                subcode: 0,
            }),
        }
    }
}
