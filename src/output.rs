//! Growable in-memory sink for encoder output.

use std::io;

/// Capacity reserved before the first write.
pub(crate) const INITIAL_CAPACITY: usize = 4096;

/// `io::Write` sink that starts at [`INITIAL_CAPACITY`] and doubles its
/// capacity whenever a write would not fit, so the copy cost stays O(1)
/// amortized per byte.
///
/// Reservation is fallible: a failed grow surfaces as an
/// [`io::ErrorKind::OutOfMemory`] error from `write`, which the encoder
/// turns into `NoMemory` and aborts on.
#[derive(Debug, Default)]
pub(crate) struct GrowableOutput {
    buf: Vec<u8>,
}

impl GrowableOutput {
    pub(crate) fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn ensure_room(&mut self, additional: usize) -> io::Result<()> {
        let needed = self
            .buf
            .len()
            .checked_add(additional)
            .ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))?;
        if needed <= self.buf.capacity() {
            return Ok(());
        }
        let mut target = self.buf.capacity().max(INITIAL_CAPACITY);
        while target < needed {
            target = target
                .checked_mul(2)
                .ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))?;
        }
        self.buf
            .try_reserve_exact(target - self.buf.len())
            .map_err(|_| io::Error::from(io::ErrorKind::OutOfMemory))
    }
}

impl io::Write for GrowableOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.ensure_room(data.len())?;
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
