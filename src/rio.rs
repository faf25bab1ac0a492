//! Robust I/O primitives over blocking byte streams.
//!
//! Two layers share one retry discipline:
//! - Unbuffered full-transfer loops ([`read_n`], [`write_n`]) that keep
//!   issuing the underlying call until the request completes or the stream
//!   ends. A short read or write is never an error.
//! - [`RioStream`], a buffered byte source with a fixed internal buffer,
//!   refilled only when fully drained, plus a line reader on top.
//!
//! `ErrorKind::Interrupted` is always retried in place without advancing
//! any cursor; every other error aborts the current call. End-of-stream is
//! reported as a zero or short count, never as an error.

use bytes::{BufMut, BytesMut};
use std::io::{self, Read, Write};

/// Internal buffer capacity of a [`RioStream`].
pub const RIO_BUFSIZE: usize = 8192;

/// Read exactly `buf.len()` bytes unless end-of-stream occurs first.
///
/// Returns the number of bytes actually read: `buf.len()` on a full read,
/// fewer (possibly zero) if the stream ended early.
pub fn read_n<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break, // end of stream
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Write all of `buf`, retrying short writes and interruptions.
///
/// On success exactly `buf.len()` bytes were handed to the sink, in one or
/// more underlying writes. A sink that reports zero progress is an error.
pub fn write_n<W: Write + ?Sized>(w: &mut W, buf: &[u8]) -> io::Result<()> {
    let mut sent = 0;
    while sent < buf.len() {
        match w.write(&buf[sent..]) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
            }
            Ok(n) => sent += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Buffered byte source with an unbuffered write bypass.
///
/// Wraps a stream with a fixed [`RIO_BUFSIZE`] internal buffer. All
/// buffered reads drain through [`read_buffered`](Self::read_buffered), so
/// at most one underlying read is issued per buffer exhaustion no matter
/// how small the caller's requests are. Writes skip the buffer entirely.
///
/// A `RioStream` must be exclusively owned by one caller; it holds no lock
/// and supports no concurrent use.
pub struct RioStream<S> {
    inner: S,
    /// Internal buffer storage.
    buf: Box<[u8]>,
    /// Position of the next unread byte in `buf`.
    pos: usize,
    /// Unread bytes remaining in `buf`, starting at `pos`.
    cnt: usize,
}

impl<S> RioStream<S> {
    /// Wrap a stream with an empty internal buffer.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buf: vec![0u8; RIO_BUFSIZE].into_boxed_slice(),
            pos: 0,
            cnt: 0,
        }
    }

    /// Bytes currently buffered and not yet consumed.
    pub fn buffered(&self) -> usize {
        self.cnt
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Get a mutable reference to the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwrap the stream, discarding any buffered bytes.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read> RioStream<S> {
    /// Refill the internal buffer with one underlying read.
    ///
    /// Only called when the buffer is empty. Returns the number of bytes
    /// now available; zero means end-of-stream. Interruptions retry.
    fn fill(&mut self) -> io::Result<usize> {
        while self.cnt == 0 {
            match self.inner.read(&mut self.buf) {
                Ok(0) => return Ok(0), // end of stream
                Ok(n) => {
                    self.pos = 0;
                    self.cnt = n;
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(self.cnt)
    }

    /// Copy `min(out.len(), buffered)` bytes out of the internal buffer,
    /// refilling it first if empty.
    ///
    /// This is the single funnel every buffered consumer drains through.
    /// Returns 0 only at end-of-stream (or for an empty `out`).
    pub fn read_buffered(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.cnt == 0 && self.fill()? == 0 {
            return Ok(0);
        }
        let n = out.len().min(self.cnt);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        self.cnt -= n;
        Ok(n)
    }

    /// Buffered counterpart of [`read_n`]: fill `out` completely unless the
    /// stream ends first, returning the bytes actually read.
    pub fn read_n(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < out.len() {
            match self.read_buffered(&mut out[filled..])? {
                0 => break, // end of stream
                n => filled += n,
            }
        }
        Ok(filled)
    }

    /// Read one newline-terminated line into `out`.
    ///
    /// Consumes bytes until a newline is consumed (included in the output
    /// and the count), `out.len() - 1` bytes have been consumed without
    /// one, or the stream ends. Returns 0 if the stream ended before any
    /// byte was consumed; a partial line (no trailing newline) otherwise.
    /// The byte after the last consumed one is set to NUL, so a line
    /// occupies at most `out.len() - 1` bytes. An overlong line is split:
    /// the next call resumes at the remainder.
    pub fn read_line(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let maxlen = out.len();
        if maxlen == 0 {
            return Ok(0);
        }
        let mut n = 0;
        while n < maxlen - 1 {
            let mut c = [0u8; 1];
            if self.read_buffered(&mut c)? == 0 {
                break; // end of stream; n == 0 means nothing was consumed
            }
            out[n] = c[0];
            n += 1;
            if c[0] == b'\n' {
                break;
            }
        }
        out[n] = 0;
        Ok(n)
    }

    /// Like [`read_line`](Self::read_line), appending to a growable buffer
    /// instead of filling a slice. Same consumption bound (`maxlen - 1`
    /// bytes), no NUL terminator.
    pub fn append_line(&mut self, out: &mut BytesMut, maxlen: usize) -> io::Result<usize> {
        if maxlen == 0 {
            return Ok(0);
        }
        let mut n = 0;
        while n < maxlen - 1 {
            let mut c = [0u8; 1];
            if self.read_buffered(&mut c)? == 0 {
                break;
            }
            out.put_u8(c[0]);
            n += 1;
            if c[0] == b'\n' {
                break;
            }
        }
        Ok(n)
    }
}

impl<S: Write> RioStream<S> {
    /// Unbuffered full write to the underlying stream (see [`write_n`]).
    pub fn write_n(&mut self, buf: &[u8]) -> io::Result<()> {
        write_n(&mut self.inner, buf)
    }
}
